// src/collector/mod.rs

//! Boundary towards the outbound collector.
//!
//! Workers only ever see the sending half of a bounded channel of
//! [`ForwardMessage`]s. A full channel suspends the sending worker, which is
//! how a slow collector throttles tailing. Whatever sits behind the channel
//! reports failures asynchronously on a separate error stream, which the main
//! task drains and logs.

pub mod message;
pub mod stdout;

use thiserror::Error;
use tokio::sync::mpsc;

pub use message::ForwardMessage;
pub use stdout::StdoutCollector;

/// Errors reported by a collector on its error stream.
#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("failed to write message: {0}")]
    Write(#[from] std::io::Error),

    #[error("collector stopped: {0}")]
    Stopped(String),
}

/// Handles returned by a started collector.
#[derive(Debug)]
pub struct Outbound {
    pub packets: mpsc::Sender<ForwardMessage>,
    pub errors: mpsc::Receiver<CollectorError>,
}

/// Something that consumes forwarded messages.
pub trait Collector {
    /// Start consuming in the background and return the channel handles.
    ///
    /// `capacity` bounds the packet channel.
    fn start(self, capacity: usize) -> Outbound;
}
