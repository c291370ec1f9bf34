// src/supervisor/registry.rs

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

/// Set of file paths that currently have a running tail worker.
///
/// Cloning is cheap and every clone shares the same underlying set. Each
/// operation takes the lock for a single set lookup or mutation and never
/// holds it across I/O.
#[derive(Clone, Default)]
pub struct WorkerRegistry {
    paths: Arc<Mutex<HashSet<PathBuf>>>,
}

impl fmt::Debug for WorkerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerRegistry")
            .field("active", &self.len())
            .finish()
    }
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a worker is active for `path`.
    ///
    /// Returns false if the path was already present.
    pub fn add(&self, path: impl Into<PathBuf>) -> bool {
        self.lock().insert(path.into())
    }

    /// Clear `path`. Removing an absent path is a no-op.
    pub fn remove(&self, path: &Path) {
        if self.lock().remove(path) {
            debug!(path = %path.display(), "worker deregistered");
        }
    }

    pub fn exists(&self, path: &Path) -> bool {
        self.lock().contains(path)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Atomically add `path` and return a guard that removes it again when
    /// dropped.
    ///
    /// Returns `None` if another worker already holds the path. The guard
    /// travels with the worker, so the path is released however the worker
    /// ends, including by panic.
    pub fn register(&self, path: impl Into<PathBuf>) -> Option<Registration> {
        let path = path.into();
        if self.add(path.clone()) {
            Some(Registration {
                registry: self.clone(),
                path,
            })
        } else {
            None
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<PathBuf>> {
        // A panic while holding the lock cannot leave the set half-updated,
        // so the poisoned state is safe to reuse.
        self.paths.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Proof that a path is registered; deregisters on drop.
pub struct Registration {
    registry: WorkerRegistry,
    path: PathBuf,
}

impl Registration {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Registration").field(&self.path).finish()
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.remove(&self.path);
    }
}
