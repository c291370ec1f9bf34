// src/supervisor/mod.rs

//! Discovery and supervision of tail workers.
//!
//! - [`registry`] is the shared set of paths with a live worker; it is the
//!   only state mutated by more than one task.
//! - [`scanner`] expands the configured glob patterns and hands new files to
//!   a [`WorkerSpawner`].
//! - [`rescan`] drives the scanner forever on a fixed interval.
//! - [`worker`] is the per-file task: tail, transform, filter, forward.
//! - [`spawner`] is the seam between discovery and the runtime, so tests can
//!   observe what would be tailed without starting real workers.
//!
//! Workers are never cancelled from the outside. A worker ends when its file
//! goes away (or cannot be read), and its registration ends with it.

pub mod registry;
pub mod rescan;
pub mod scanner;
pub mod spawner;
pub mod worker;

use std::path::PathBuf;

pub use registry::{Registration, WorkerRegistry};
pub use rescan::RescanLoop;
pub use scanner::{GlobScanner, ScanReport, resolve_pattern};
pub use spawner::{TokioWorkerSpawner, WorkerSpawner};
pub use worker::{WorkerContext, run_worker};

/// Everything a worker needs to start tailing one file.
#[derive(Debug)]
pub struct TailJob {
    pub path: PathBuf,
    /// Tag of the file spec that matched this path.
    pub tag: Option<String>,
    /// Held for the worker's whole lifetime; releases the path on drop.
    pub registration: Registration,
}
