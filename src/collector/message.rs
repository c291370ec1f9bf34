// src/collector/message.rs

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::types::{Facility, Severity};

/// One forwarded line, handed to the collector by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardMessage {
    pub severity: Severity,
    pub facility: Facility,
    /// Time of forwarding, not of the original write.
    pub timestamp: DateTime<Utc>,
    pub hostname: String,
    pub tag: String,
    pub message: String,
}

impl ForwardMessage {
    /// Build a message stamped with the current time.
    pub fn now(
        severity: Severity,
        facility: Facility,
        hostname: impl Into<String>,
        tag: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            facility,
            timestamp: Utc::now(),
            hostname: hostname.into(),
            tag: tag.into(),
            message: message.into(),
        }
    }
}

/// Human-readable single-line rendering:
/// `<rfc3339> <hostname> <tag>[<facility>.<severity>]: <message>`.
impl fmt::Display for ForwardMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}[{}.{}]: {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.hostname,
            self.tag,
            self.facility,
            self.severity,
            self.message
        )
    }
}
