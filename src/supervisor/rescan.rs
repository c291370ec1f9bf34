// src/supervisor/rescan.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::task::spawn_blocking;
use tokio::time::sleep;
use tracing::{debug, error};

use super::scanner::{GlobScanner, ScanReport};
use super::spawner::WorkerSpawner;

/// Re-evaluates the file globs forever so that files created after startup
/// are picked up.
///
/// Workers that were already started are never touched; the loop only
/// discovers files the registry does not know yet.
#[derive(Debug)]
pub struct RescanLoop<S: WorkerSpawner> {
    scanner: Arc<GlobScanner<S>>,
    interval: Duration,
    completed_scans: u64,
}

impl<S: WorkerSpawner> RescanLoop<S> {
    pub fn new(scanner: GlobScanner<S>, interval: Duration) -> Self {
        Self {
            scanner: Arc::new(scanner),
            interval,
            completed_scans: 0,
        }
    }

    pub fn completed_scans(&self) -> u64 {
        self.completed_scans
    }

    /// Run a single scan on the current thread. Missing files are only
    /// reported on the very first scan.
    pub fn scan_once(&mut self) -> ScanReport {
        let report = self.scanner.scan(self.completed_scans == 0);
        self.finish_scan(&report);
        report
    }

    /// Scan immediately, then once per interval. Never returns.
    ///
    /// Each scan runs on the blocking pool, since glob expansion walks
    /// directories and stats every match.
    pub async fn run(mut self) {
        debug!(interval = ?self.interval, "evaluating globs on a fixed interval");
        loop {
            let scanner = Arc::clone(&self.scanner);
            let log_missing = self.completed_scans == 0;
            match spawn_blocking(move || scanner.scan(log_missing)).await {
                Ok(report) => self.finish_scan(&report),
                Err(e) => {
                    error!(error = %e, "file glob scan aborted");
                    self.completed_scans += 1;
                }
            }
            sleep(self.interval).await;
        }
    }

    fn finish_scan(&mut self, report: &ScanReport) {
        self.completed_scans += 1;
        debug!(
            scan = self.completed_scans,
            spawned = report.spawned.len(),
            already_running = report.already_running,
            excluded = report.excluded,
            "file glob scan finished"
        );
    }
}
