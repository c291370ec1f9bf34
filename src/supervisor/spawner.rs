// src/supervisor/spawner.rs

//! Pluggable worker spawning.
//!
//! The scanner talks to a `WorkerSpawner` instead of calling `tokio::spawn`
//! directly.
//!
//! - `TokioWorkerSpawner` is the production implementation: one Tokio task
//!   per file running [`run_worker`].
//! - Tests can record jobs instead, keeping their registrations alive to
//!   simulate running workers.

use std::sync::Arc;

use super::TailJob;
use super::worker::{WorkerContext, run_worker};

/// Trait abstracting how a discovered file gets its worker.
pub trait WorkerSpawner: Send + Sync + 'static {
    /// Start a worker for `job`. Called from the blocking pool during a
    /// rescan; must not block.
    fn spawn(&self, job: TailJob);
}

/// Spawns each worker as an independent Tokio task.
#[derive(Debug, Clone)]
pub struct TokioWorkerSpawner {
    ctx: Arc<WorkerContext>,
}

impl TokioWorkerSpawner {
    pub fn new(ctx: Arc<WorkerContext>) -> Self {
        Self { ctx }
    }
}

impl WorkerSpawner for TokioWorkerSpawner {
    fn spawn(&self, job: TailJob) {
        tokio::spawn(run_worker(Arc::clone(&self.ctx), job));
    }
}
