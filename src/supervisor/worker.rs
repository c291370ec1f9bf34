// src/supervisor/worker.rs

use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};

use crate::collector::ForwardMessage;
use crate::config::ConfigFile;
use crate::pipeline::{ExclusionSet, PathLabels, TransformRules, effective_tag};
use crate::tail::{TailOptions, Tailer};
use crate::types::{Facility, Severity};

use super::TailJob;

/// Settings shared by every tail worker.
#[derive(Debug)]
pub struct WorkerContext {
    pub content_exclusions: ExclusionSet,
    pub rules: TransformRules,
    pub severity: Severity,
    pub facility: Facility,
    pub hostname: String,
    pub tail: TailOptions,
    pub packets: mpsc::Sender<ForwardMessage>,
}

impl WorkerContext {
    pub fn from_config(cfg: &ConfigFile, packets: mpsc::Sender<ForwardMessage>) -> Self {
        Self {
            content_exclusions: cfg.excluded_patterns.clone(),
            rules: cfg.transform.clone(),
            severity: cfg.severity,
            facility: cfg.facility,
            hostname: cfg.hostname.clone(),
            tail: cfg.tail,
            packets,
        }
    }

    /// Transform a raw line and apply the content exclusions.
    ///
    /// Returns `None` if the line must not be forwarded.
    pub fn prepare_line(&self, labels: &PathLabels, line: &str) -> Option<String> {
        let text = self.rules.apply(labels, line);
        if self.content_exclusions.matches(&text) {
            None
        } else {
            Some(text)
        }
    }

    pub fn message(&self, tag: &str, text: String) -> ForwardMessage {
        ForwardMessage::now(self.severity, self.facility, self.hostname.as_str(), tag, text)
    }
}

/// Tail one file until it goes away, forwarding every surviving line.
///
/// The job's registration is dropped when this future completes (or is
/// dropped after a panic), which frees the path for a later rescan.
pub async fn run_worker(ctx: Arc<WorkerContext>, job: TailJob) {
    let TailJob {
        path,
        tag,
        registration,
    } = job;
    let _registration = registration;

    let mut tailer = match Tailer::open(&path, &ctx.tail).await {
        Ok(t) => t,
        Err(e) => {
            error!(path = %path.display(), error = %format!("{e:#}"), "failed to start tailing");
            return;
        }
    };

    let labels = ctx.rules.labels_for(&path);
    let tag = effective_tag(tag.as_deref());
    debug!(
        path = %path.display(),
        group = %labels.group,
        category = %labels.category,
        tag = %tag,
        "tail worker started"
    );

    loop {
        match tailer.next_line().await {
            Ok(Some(line)) => {
                if !forward(&ctx, &path, &labels, &tag, &line).await {
                    warn!(path = %path.display(), "outbound channel closed; stopping tail worker");
                    return;
                }
            }
            Ok(None) => {
                info!(path = %path.display(), "tail stream ended");
                break;
            }
            Err(e) => {
                error!(path = %path.display(), error = %format!("{e:#}"), "tail stream failed");
                break;
            }
        }
    }

    // Workers are expected to run for as long as the process does.
    error!(path = %path.display(), "tail worker exited abnormally");
}

/// Returns false once the outbound channel is closed.
async fn forward(
    ctx: &WorkerContext,
    path: &Path,
    labels: &PathLabels,
    tag: &str,
    line: &str,
) -> bool {
    match ctx.prepare_line(labels, line) {
        Some(text) => {
            trace!(path = %path.display(), "forwarding: {}", text);
            // Awaiting here is the backpressure point: a full channel
            // throttles this file only.
            ctx.packets.send(ctx.message(tag, text)).await.is_ok()
        }
        None => {
            trace!(path = %path.display(), "not forwarding: {}", line);
            true
        }
    }
}
