// src/pipeline/transform.rs

use std::fmt;
use std::path::Path;

use regex::Regex;

use crate::errors::{Result, TailshipError};

/// Default group convention: the directory right under `/srv`.
pub const DEFAULT_GROUP_PATTERN: &str = r"^/srv/([^/]+)/";

/// Default timestamp prefix, e.g. `[2024-01-02 03-04-05] `.
pub const DEFAULT_TIMESTAMP_PREFIX_PATTERN: &str = r"^\[\d+-\d+-\d+ \d+-\d+-\d+\] ";

/// Tag used when a file spec does not carry one.
pub const DEFAULT_TAG: &str = "-";

/// Compiled rules used to rewrite lines before they are forwarded.
#[derive(Clone)]
pub struct TransformRules {
    group: Regex,
    timestamp_prefix: Regex,
}

impl fmt::Debug for TransformRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformRules")
            .field("group", &self.group.as_str())
            .field("timestamp_prefix", &self.timestamp_prefix.as_str())
            .finish()
    }
}

impl TransformRules {
    /// Rules built from [`DEFAULT_GROUP_PATTERN`] and
    /// [`DEFAULT_TIMESTAMP_PREFIX_PATTERN`].
    pub fn standard() -> Result<Self> {
        Self::new(DEFAULT_GROUP_PATTERN, DEFAULT_TIMESTAMP_PREFIX_PATTERN)
    }

    pub fn new(group_pattern: &str, timestamp_prefix_pattern: &str) -> Result<Self> {
        Ok(Self {
            group: compile(group_pattern)?,
            timestamp_prefix: compile(timestamp_prefix_pattern)?,
        })
    }

    pub fn group_pattern(&self) -> &str {
        self.group.as_str()
    }

    pub fn timestamp_prefix_pattern(&self) -> &str {
        self.timestamp_prefix.as_str()
    }

    /// Derive the labels for a file. Done once per worker since they only
    /// depend on the path.
    pub fn labels_for(&self, path: &Path) -> PathLabels {
        let path_str = path.to_string_lossy();

        let group = self
            .group
            .captures(&path_str)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        let base = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let category = base
            .strip_suffix(".log")
            .map(str::to_string)
            .unwrap_or(base);

        PathLabels { group, category }
    }

    /// Remove a leading timestamp prefix, if present.
    pub fn strip_timestamp<'a>(&self, line: &'a str) -> &'a str {
        match self.timestamp_prefix.find(line) {
            Some(m) => &line[m.end()..],
            None => line,
        }
    }

    /// Full rewrite of one raw line: strip the timestamp, then prefix the
    /// labels.
    pub fn apply(&self, labels: &PathLabels, line: &str) -> String {
        labels.render(self.strip_timestamp(line))
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| TailshipError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Labels derived from a tailed file's path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathLabels {
    /// Path segment captured by the group pattern; empty when it does not
    /// match.
    pub group: String,
    /// File base name without a trailing `.log`.
    pub category: String,
}

impl PathLabels {
    pub fn render(&self, line: &str) -> String {
        format!("{}: {}: {}", self.group, self.category, line)
    }
}

/// Tag carried by forwarded messages: the `LogFileSpec` tag, or `-` when it is
/// missing or empty.
pub fn effective_tag(tag: Option<&str>) -> String {
    match tag {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => DEFAULT_TAG.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_srv_convention() {
        let rules = TransformRules::standard().unwrap();
        let labels = rules.labels_for(Path::new("/srv/appA/exception.log"));
        assert_eq!(labels.group, "appA");
        assert_eq!(labels.category, "exception");
        assert_eq!(rules.apply(&labels, "boom"), "appA: exception: boom");
    }

    #[test]
    fn timestamp_prefix_is_stripped_before_labels() {
        let rules = TransformRules::standard().unwrap();
        let labels = rules.labels_for(Path::new("/srv/appA/exception.log"));
        assert_eq!(
            rules.apply(&labels, "[2024-01-02 03-04-05] boom"),
            "appA: exception: boom"
        );
    }

    #[test]
    fn timestamp_must_be_a_prefix() {
        let rules = TransformRules::standard().unwrap();
        assert_eq!(
            rules.strip_timestamp("boom [2024-01-02 03-04-05] "),
            "boom [2024-01-02 03-04-05] "
        );
    }

    #[test]
    fn paths_outside_srv_have_empty_group() {
        let rules = TransformRules::standard().unwrap();
        let labels = rules.labels_for(Path::new("/var/log/syslog"));
        assert_eq!(labels.group, "");
        assert_eq!(labels.category, "syslog");
        assert_eq!(rules.apply(&labels, "x"), ": syslog: x");
    }

    #[test]
    fn only_trailing_log_extension_is_removed() {
        let rules = TransformRules::standard().unwrap();
        assert_eq!(
            rules.labels_for(Path::new("/srv/a/b/info.log.1")).category,
            "info.log.1"
        );
        assert_eq!(
            rules.labels_for(Path::new("/srv/a/b/catalog")).category,
            "catalog"
        );
        // Nested directories still take the first segment after /srv.
        assert_eq!(rules.labels_for(Path::new("/srv/a/b/info.log")).group, "a");
    }

    #[test]
    fn empty_tag_defaults_to_dash() {
        assert_eq!(effective_tag(None), "-");
        assert_eq!(effective_tag(Some("")), "-");
        assert_eq!(effective_tag(Some("custom")), "custom");
    }

    #[test]
    fn custom_rules_are_honoured() {
        let rules = TransformRules::new(r"^/opt/([^/]+)/", r"^\d+ ").unwrap();
        let labels = rules.labels_for(Path::new("/opt/billing/error.log"));
        assert_eq!(rules.apply(&labels, "1700000000 failed"), "billing: error: failed");
    }
}
