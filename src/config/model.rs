// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::pipeline::transform::{DEFAULT_GROUP_PATTERN, DEFAULT_TIMESTAMP_PREFIX_PATTERN};
use crate::pipeline::{ExclusionSet, TransformRules};
use crate::tail::TailOptions;
use crate::types::{Facility, Severity};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// files = ["/var/log/app/*.log", { path = "/srv/*/log/*.log", tag = "srv" }]
///
/// [config]
/// severity = "notice"
/// facility = "user"
/// new_file_check_interval = "10s"
///
/// [exclude]
/// files = ['\.gz$']
/// patterns = ['DEBUG']
/// ```
///
/// `files` is a top-level key and therefore has to come before the first
/// `[section]`. Everything except `files` is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// File patterns to tail, either bare strings or `{ path, tag }` tables.
    #[serde(default)]
    pub files: Vec<FileEntry>,

    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub exclude: ExcludeSection,

    #[serde(default)]
    pub transform: TransformSection,
}

/// One entry of the top-level `files` list.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum FileEntry {
    Path(String),
    Spec {
        path: String,
        #[serde(default)]
        tag: Option<String>,
    },
}

impl From<FileEntry> for LogFileSpec {
    fn from(entry: FileEntry) -> Self {
        match entry {
            FileEntry::Path(path) => LogFileSpec { path, tag: None },
            FileEntry::Spec { path, tag } => LogFileSpec { path, tag },
        }
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Hostname stamped on messages; defaults to the system hostname.
    #[serde(default)]
    pub hostname: Option<String>,

    #[serde(default)]
    pub severity: Severity,

    #[serde(default)]
    pub facility: Facility,

    /// How often the file globs are re-evaluated, e.g. `"10s"`.
    #[serde(default = "default_new_file_check_interval")]
    pub new_file_check_interval: String,

    /// Poll for new content instead of using filesystem notifications.
    #[serde(default)]
    pub poll: bool,

    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,

    /// How long a removed file may stay missing before its worker ends.
    #[serde(default = "default_reopen_grace")]
    pub reopen_grace: String,

    /// Bound of the outbound message channel.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_new_file_check_interval() -> String {
    "10s".to_string()
}

fn default_poll_interval() -> String {
    "250ms".to_string()
}

fn default_reopen_grace() -> String {
    "5s".to_string()
}

fn default_channel_capacity() -> usize {
    100
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            hostname: None,
            severity: Severity::default(),
            facility: Facility::default(),
            new_file_check_interval: default_new_file_check_interval(),
            poll: false,
            poll_interval: default_poll_interval(),
            reopen_grace: default_reopen_grace(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// `[exclude]` section. Both lists hold regular expressions.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ExcludeSection {
    /// Files whose path matches are never tailed.
    #[serde(default)]
    pub files: Vec<String>,

    /// Lines whose transformed text matches are never forwarded.
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// `[transform]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TransformSection {
    /// Regex whose first capture group becomes the group label.
    #[serde(default = "default_group_pattern")]
    pub group_pattern: String,

    /// Regex for a leading timestamp to strip from every line.
    #[serde(default = "default_timestamp_prefix_pattern")]
    pub timestamp_prefix_pattern: String,
}

fn default_group_pattern() -> String {
    DEFAULT_GROUP_PATTERN.to_string()
}

fn default_timestamp_prefix_pattern() -> String {
    DEFAULT_TIMESTAMP_PREFIX_PATTERN.to_string()
}

impl Default for TransformSection {
    fn default() -> Self {
        Self {
            group_pattern: default_group_pattern(),
            timestamp_prefix_pattern: default_timestamp_prefix_pattern(),
        }
    }
}

/// A path pattern (may contain glob wildcards) plus an optional tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFileSpec {
    pub path: String,
    pub tag: Option<String>,
}

impl LogFileSpec {
    pub fn new(path: impl Into<String>, tag: Option<&str>) -> Self {
        Self {
            path: path.into(),
            tag: tag.map(str::to_string),
        }
    }
}

/// Validated configuration with every pattern compiled and every duration
/// parsed. Build it from a [`RawConfigFile`] via `TryFrom`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub files: Vec<LogFileSpec>,
    pub hostname: String,
    pub severity: Severity,
    pub facility: Facility,
    pub new_file_check_interval: Duration,
    pub tail: TailOptions,
    pub channel_capacity: usize,
    pub excluded_files: ExclusionSet,
    pub excluded_patterns: ExclusionSet,
    pub transform: TransformRules,
}
