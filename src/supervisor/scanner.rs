// src/supervisor/scanner.rs

use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::{debug, error, info, warn};

use crate::config::LogFileSpec;
use crate::pipeline::ExclusionSet;

use super::registry::WorkerRegistry;
use super::spawner::WorkerSpawner;
use super::TailJob;

/// Outcome of one pass over the file specs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Paths handed to the spawner during this scan, in discovery order.
    pub spawned: Vec<PathBuf>,
    /// Matches skipped because a worker already holds them.
    pub already_running: usize,
    /// Matches skipped by the path exclusion set.
    pub excluded: usize,
    /// Patterns reported as matching nothing (first scan only).
    pub missing: Vec<String>,
    /// Patterns that could not be expanded.
    pub failed: Vec<String>,
}

/// Expands file specs against the filesystem and starts a worker for every
/// file that has none yet.
pub struct GlobScanner<S: WorkerSpawner> {
    specs: Vec<LogFileSpec>,
    excluded_files: ExclusionSet,
    registry: WorkerRegistry,
    spawner: S,
}

impl<S: WorkerSpawner> std::fmt::Debug for GlobScanner<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobScanner")
            .field("specs", &self.specs)
            .field("excluded_files", &self.excluded_files)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl<S: WorkerSpawner> GlobScanner<S> {
    pub fn new(
        specs: Vec<LogFileSpec>,
        excluded_files: ExclusionSet,
        registry: WorkerRegistry,
        spawner: S,
    ) -> Self {
        Self {
            specs,
            excluded_files,
            registry,
            spawner,
        }
    }

    pub fn registry(&self) -> &WorkerRegistry {
        &self.registry
    }

    /// Evaluate every spec once.
    ///
    /// `log_missing` enables the warning for patterns that match no file;
    /// the rescan loop only sets it on its first scan.
    pub fn scan(&self, log_missing: bool) -> ScanReport {
        debug!("evaluating file globs");
        let mut report = ScanReport::default();

        for spec in &self.specs {
            let pattern = resolve_pattern(&spec.path);
            let entries = match glob::glob(&pattern) {
                Ok(entries) => entries,
                Err(e) => {
                    error!(pattern = %spec.path, error = %e, "failed to expand file pattern");
                    report.failed.push(spec.path.clone());
                    continue;
                }
            };

            let mut matched = 0usize;
            for entry in entries {
                let path = match entry {
                    Ok(path) => path,
                    Err(e) => {
                        debug!(pattern = %spec.path, error = %e, "skipping unreadable glob entry");
                        continue;
                    }
                };
                if path.is_dir() {
                    continue;
                }
                matched += 1;
                self.consider(path, spec, &mut report);
            }

            if matched == 0 && log_missing {
                warn!(pattern = %spec.path, "cannot forward {}, it may not exist", spec.path);
                report.missing.push(spec.path.clone());
            }
        }

        report
    }

    fn consider(&self, path: PathBuf, spec: &LogFileSpec, report: &mut ScanReport) {
        if self.registry.exists(&path) {
            debug!(path = %path.display(), "skipping because it is already running");
            report.already_running += 1;
            return;
        }

        if self.excluded_files.matches(&path.to_string_lossy()) {
            debug!(path = %path.display(), "skipping because it is excluded by regular expression");
            report.excluded += 1;
            return;
        }

        // Claimed before spawning, so overlapping specs cannot both win a path.
        let Some(registration) = self.registry.register(path.clone()) else {
            report.already_running += 1;
            return;
        };

        info!(path = %path.display(), "forwarding");
        self.spawner.spawn(TailJob {
            path: path.clone(),
            tag: spec.tag.clone(),
            registration,
        });
        report.spawned.push(path);
    }
}

/// Turn a configured pattern into an absolute glob pattern.
///
/// A leading `~` expands to the home directory and relative patterns are
/// anchored at the working directory. The prepended directory is escaped so
/// that glob metacharacters in it match literally.
pub fn resolve_pattern(pattern: &str) -> String {
    if let Some(rest) = pattern.strip_prefix('~') {
        if rest.is_empty() || rest.starts_with('/') {
            if let Some(home) = dirs::home_dir() {
                return format!("{}{}", Pattern::escape(&home.to_string_lossy()), rest);
            }
        }
    }

    if Path::new(pattern).is_absolute() {
        return pattern.to_string();
    }

    match std::env::current_dir() {
        Ok(cwd) => format!(
            "{}/{}",
            Pattern::escape(cwd.to_string_lossy().trim_end_matches('/')),
            pattern.trim_start_matches("./")
        ),
        Err(_) => pattern.to_string(),
    }
}
