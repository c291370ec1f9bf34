// src/tail/reader.rs

use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use super::identity::FileId;
use super::signal::ChangeSignal;
use super::{TailMode, TailOptions};

/// What the tailer found when it re-checked the path at end-of-file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathState {
    /// Same file, nothing new yet (or the file is briefly missing).
    Unchanged,
    /// Same file but shorter than what was already read.
    Truncated,
    /// The path now points to a different file.
    Rotated,
    /// The file has been missing for longer than the grace period.
    Gone,
}

/// Follows one file from its current end, yielding complete lines.
#[derive(Debug)]
pub struct Tailer {
    path: PathBuf,
    options: TailOptions,
    reader: BufReader<File>,
    identity: Option<FileId>,
    offset: u64,
    /// Bytes of a line whose terminating newline has not been written yet.
    partial: Vec<u8>,
    missing_since: Option<Instant>,
    signal: Option<ChangeSignal>,
}

impl Tailer {
    /// Open `path` and position at its end. Fails if the file does not
    /// exist or cannot be read.
    pub async fn open(path: impl AsRef<Path>, options: &TailOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let mut file = File::open(&path)
            .await
            .with_context(|| format!("opening {:?} for tailing", path))?;
        let identity = FileId::from_metadata(
            &file
                .metadata()
                .await
                .with_context(|| format!("reading metadata of {:?}", path))?,
        );
        let offset = file
            .seek(SeekFrom::End(0))
            .await
            .with_context(|| format!("seeking to end of {:?}", path))?;

        let signal = match options.mode {
            TailMode::Poll => None,
            TailMode::Notify => match ChangeSignal::watch(&path) {
                Ok(signal) => Some(signal),
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "filesystem notifications unavailable; falling back to polling"
                    );
                    None
                }
            },
        };

        debug!(path = %path.display(), offset, mode = ?options.mode, "tailer opened");

        Ok(Self {
            path,
            options: *options,
            reader: BufReader::new(file),
            identity,
            offset,
            partial: Vec::new(),
            missing_since: None,
            signal,
        })
    }

    /// Byte offset of the next unread byte in the current file.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Wait for the next complete line.
    ///
    /// - `Ok(Some(line))`: a line, without its trailing `\n` / `\r\n`.
    /// - `Ok(None)`: the file is gone for good; the stream has ended.
    /// - `Err(_)`: an unrecoverable I/O error.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        loop {
            let n = self
                .reader
                .read_until(b'\n', &mut self.partial)
                .await
                .with_context(|| format!("reading {:?}", self.path))?;
            self.offset += n as u64;

            if self.partial.last() == Some(&b'\n') {
                return Ok(Some(self.take_line()));
            }
            if n > 0 {
                // Partial line at EOF; the next read confirms there is no more.
                continue;
            }

            match self.check_path().await? {
                PathState::Unchanged => self.wait().await,
                PathState::Truncated => {
                    info!(path = %self.path.display(), "file truncated; reading from start");
                    self.reader
                        .seek(SeekFrom::Start(0))
                        .await
                        .with_context(|| format!("rewinding {:?}", self.path))?;
                    self.offset = 0;
                    self.partial.clear();
                }
                PathState::Rotated => {
                    // The old file is fully drained; a dangling partial line
                    // will never be completed, so hand it out as is.
                    let leftover = (!self.partial.is_empty()).then(|| self.take_line());
                    if self.reopen().await? {
                        info!(path = %self.path.display(), "file rotated; following new file");
                    }
                    if leftover.is_some() {
                        return Ok(leftover);
                    }
                }
                PathState::Gone => {
                    info!(path = %self.path.display(), "file removed; ending tail");
                    return Ok(None);
                }
            }
        }
    }

    async fn check_path(&mut self) -> Result<PathState> {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) => {
                self.missing_since = None;
                let current = FileId::from_metadata(&meta);
                if current.is_some() && current != self.identity {
                    Ok(PathState::Rotated)
                } else if meta.len() < self.offset {
                    Ok(PathState::Truncated)
                } else {
                    Ok(PathState::Unchanged)
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let since = *self.missing_since.get_or_insert_with(Instant::now);
                if since.elapsed() >= self.options.reopen_grace {
                    Ok(PathState::Gone)
                } else {
                    Ok(PathState::Unchanged)
                }
            }
            Err(e) => Err(e).with_context(|| format!("checking {:?}", self.path)),
        }
    }

    /// Switch to the file currently at `path`, reading it from the start.
    ///
    /// Returns false if the file vanished again before it could be opened;
    /// the next check then treats it as missing.
    async fn reopen(&mut self) -> Result<bool> {
        let file = match File::open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e).with_context(|| format!("reopening {:?}", self.path)),
        };
        self.identity = FileId::from_metadata(
            &file
                .metadata()
                .await
                .with_context(|| format!("reading metadata of {:?}", self.path))?,
        );
        self.reader = BufReader::new(file);
        self.offset = 0;
        self.partial.clear();
        Ok(true)
    }

    async fn wait(&mut self) {
        let interval = self.options.poll_interval;
        match self.signal.as_mut() {
            Some(signal) => {
                if let Ok(false) = timeout(interval, signal.changed()).await {
                    debug!(path = %self.path.display(), "notification channel closed; polling");
                    self.signal = None;
                }
            }
            None => sleep(interval).await,
        }
    }

    fn take_line(&mut self) -> String {
        let mut bytes = std::mem::take(&mut self.partial);
        if bytes.last() == Some(&b'\n') {
            bytes.pop();
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
        }
        String::from_utf8(bytes)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
    }
}
