// src/tail/signal.rs

use std::path::Path;

use anyhow::Result;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

/// Wakes a tailer when something changes in the directory of its file.
///
/// The parent directory is watched rather than the file itself so that
/// rotation (the file being replaced) is still observed. Dropping the signal
/// stops the watch.
pub struct ChangeSignal {
    _watcher: RecommendedWatcher,
    rx: mpsc::UnboundedReceiver<()>,
}

impl std::fmt::Debug for ChangeSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeSignal").finish_non_exhaustive()
    }
}

impl ChangeSignal {
    pub fn watch(file: &Path) -> Result<Self> {
        let dir = match file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => Path::new(".").to_path_buf(),
        };

        let (tx, rx) = mpsc::unbounded_channel::<()>();

        // Called synchronously on notify's thread; only a wake-up is
        // forwarded, the tailer re-reads state itself.
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                if res.is_ok() {
                    let _ = tx.send(());
                }
            },
            Config::default(),
        )?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        Ok(Self {
            _watcher: watcher,
            rx,
        })
    }

    /// Wait for the next change notification.
    ///
    /// Returns false once the watcher has shut down and no more
    /// notifications will arrive.
    pub async fn changed(&mut self) -> bool {
        let alive = self.rx.recv().await.is_some();
        // Coalesce a burst of events into a single wake-up.
        while self.rx.try_recv().is_ok() {}
        alive
    }
}
