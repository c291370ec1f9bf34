use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tailship::supervisor::{TailJob, WorkerSpawner};

/// A fake spawner that:
/// - records every job it is asked to start
/// - keeps the job (and so its registration) alive, as a running worker would
///
/// `finish` drops a job, simulating its worker ending.
#[derive(Clone, Default)]
pub struct RecordingSpawner {
    jobs: Arc<Mutex<Vec<TailJob>>>,
}

impl RecordingSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths of all live jobs, in spawn order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.jobs.lock().unwrap().iter().map(|j| j.path.clone()).collect()
    }

    /// Tag carried by the live job for `path`.
    pub fn tag_of(&self, path: &Path) -> Option<Option<String>> {
        self.jobs
            .lock()
            .unwrap()
            .iter()
            .find(|j| j.path == path)
            .map(|j| j.tag.clone())
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop the job for `path`, releasing its registration.
    pub fn finish(&self, path: &Path) {
        self.jobs.lock().unwrap().retain(|j| j.path != path);
    }
}

impl WorkerSpawner for RecordingSpawner {
    fn spawn(&self, job: TailJob) {
        self.jobs.lock().unwrap().push(job);
    }
}
