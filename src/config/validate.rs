// src/config/validate.rs

use std::time::Duration;

use tracing::warn;

use crate::config::model::{ConfigFile, LogFileSpec, RawConfigFile};
use crate::errors::{Result, TailshipError};
use crate::pipeline::{ExclusionSet, TransformRules};
use crate::tail::TailOptions;
use crate::types::{TailMode, parse_duration};

/// Smallest accepted rescan interval.
pub const MINIMUM_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = TailshipError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        ensure_has_files(&raw)?;

        let new_file_check_interval =
            duration_field("new_file_check_interval", &raw.config.new_file_check_interval)?;
        if new_file_check_interval < MINIMUM_REFRESH_INTERVAL {
            return Err(TailshipError::ConfigError(format!(
                "[config].new_file_check_interval must be >= {:?} (got {:?})",
                MINIMUM_REFRESH_INTERVAL, new_file_check_interval
            )));
        }

        let poll_interval = duration_field("poll_interval", &raw.config.poll_interval)?;
        if poll_interval.is_zero() {
            return Err(TailshipError::ConfigError(
                "[config].poll_interval must be greater than zero".to_string(),
            ));
        }
        let reopen_grace = duration_field("reopen_grace", &raw.config.reopen_grace)?;

        if raw.config.channel_capacity == 0 {
            return Err(TailshipError::ConfigError(
                "[config].channel_capacity must be >= 1 (got 0)".to_string(),
            ));
        }

        let excluded_files = ExclusionSet::compile(&raw.exclude.files)?;
        let excluded_patterns = ExclusionSet::compile(&raw.exclude.patterns)?;
        let transform = TransformRules::new(
            &raw.transform.group_pattern,
            &raw.transform.timestamp_prefix_pattern,
        )?;

        let hostname = match raw.config.hostname {
            Some(h) if !h.trim().is_empty() => h,
            _ => system_hostname(),
        };

        Ok(ConfigFile {
            files: raw.files.into_iter().map(LogFileSpec::from).collect(),
            hostname,
            severity: raw.config.severity,
            facility: raw.config.facility,
            new_file_check_interval,
            tail: TailOptions {
                mode: TailMode::from_poll_flag(raw.config.poll),
                poll_interval,
                reopen_grace,
            },
            channel_capacity: raw.config.channel_capacity,
            excluded_files,
            excluded_patterns,
            transform,
        })
    }
}

fn ensure_has_files(cfg: &RawConfigFile) -> Result<()> {
    if cfg.files.is_empty() {
        return Err(TailshipError::ConfigError(
            "config must list at least one entry in `files`".to_string(),
        ));
    }
    for entry in &cfg.files {
        let spec = LogFileSpec::from(entry.clone());
        if spec.path.trim().is_empty() {
            return Err(TailshipError::ConfigError(
                "`files` entries must have a non-empty path".to_string(),
            ));
        }
    }
    Ok(())
}

fn duration_field(name: &str, value: &str) -> Result<Duration> {
    parse_duration(value)
        .map_err(|e| TailshipError::ConfigError(format!("[config].{name}: {e}")))
}

fn system_hostname() -> String {
    let name = gethostname::gethostname().to_string_lossy().into_owned();
    if name.is_empty() {
        warn!("system hostname is empty; using \"localhost\"");
        "localhost".to_string()
    } else {
        name
    }
}
