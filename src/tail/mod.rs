// src/tail/mod.rs

//! Following a single file as it grows.
//!
//! A [`Tailer`] starts at the current end of a file and yields each newly
//! appended line. It survives rotation (the path is replaced by a new file)
//! and truncation, and reports a permanent end once the file has been gone
//! for longer than the configured grace period.
//!
//! - [`reader`] owns the read loop.
//! - [`identity`] detects that a path now refers to a different file.
//! - [`signal`] wakes the reader on filesystem notifications (`notify`).

pub mod identity;
pub mod reader;
pub mod signal;

use std::time::Duration;

pub use crate::types::TailMode;
pub use identity::FileId;
pub use reader::Tailer;

/// Knobs shared by every tailer.
#[derive(Debug, Clone, Copy)]
pub struct TailOptions {
    pub mode: TailMode,
    /// Wait between end-of-file checks in poll mode; fallback timeout in
    /// notify mode.
    pub poll_interval: Duration,
    /// How long a removed file may stay missing before the stream ends.
    pub reopen_grace: Duration,
}

impl Default for TailOptions {
    fn default() -> Self {
        Self {
            mode: TailMode::Notify,
            poll_interval: Duration::from_millis(250),
            reopen_grace: Duration::from_secs(5),
        }
    }
}
