// src/lib.rs

pub mod cli;
pub mod collector;
pub mod config;
pub mod errors;
pub mod logging;
pub mod pipeline;
pub mod supervisor;
pub mod tail;
pub mod types;

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, error, info};

use crate::cli::CliArgs;
use crate::collector::{Collector, CollectorError, Outbound, StdoutCollector};
use crate::config::{ConfigFile, load_and_validate};
use crate::supervisor::{
    GlobScanner, RescanLoop, TokioWorkerSpawner, WorkerContext, WorkerRegistry,
};
use crate::types::TailMode;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the outbound collector
/// - the glob scanner and its rescan loop (which spawns the tail workers)
/// - draining collector errors until Ctrl-C
pub async fn run(args: CliArgs) -> Result<()> {
    let mut cfg = load_and_validate(&args.config)?;
    apply_overrides(&mut cfg, &args);

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let Outbound { packets, errors } = StdoutCollector::new().start(cfg.channel_capacity);

    let registry = WorkerRegistry::new();
    let ctx = Arc::new(WorkerContext::from_config(&cfg, packets));
    let scanner = GlobScanner::new(
        cfg.files.clone(),
        cfg.excluded_files.clone(),
        registry,
        TokioWorkerSpawner::new(ctx),
    );

    info!(
        files = cfg.files.len(),
        hostname = %cfg.hostname,
        mode = ?cfg.tail.mode,
        "tailship started"
    );
    tokio::spawn(RescanLoop::new(scanner, cfg.new_file_check_interval).run());

    tokio::select! {
        _ = drain_errors(errors) => {}
        res = tokio::signal::ctrl_c() => {
            match res {
                Ok(()) => info!("received Ctrl-C; shutting down"),
                Err(e) => error!(error = %e, "failed to listen for Ctrl-C"),
            }
        }
    }

    Ok(())
}

fn apply_overrides(cfg: &mut ConfigFile, args: &CliArgs) {
    if args.poll {
        cfg.tail.mode = TailMode::Poll;
    }
    if let Some(hostname) = args.hostname.as_ref().filter(|h| !h.trim().is_empty()) {
        cfg.hostname = hostname.clone();
    }
}

/// Log every collector error; never stops on its own while the collector is
/// alive. Once the collector hangs up, wait forever so tailing continues
/// until the process is told to exit.
async fn drain_errors(mut errors: tokio::sync::mpsc::Receiver<CollectorError>) {
    while let Some(err) = errors.recv().await {
        error!(error = %err, "collector error");
    }
    debug!("collector error stream closed");
    std::future::pending::<()>().await;
}

/// Simple dry-run output: print the effective configuration.
fn print_dry_run(cfg: &ConfigFile) {
    println!("tailship dry-run");
    println!("  hostname = {}", cfg.hostname);
    println!("  severity = {}", cfg.severity);
    println!("  facility = {}", cfg.facility);
    println!("  new_file_check_interval = {:?}", cfg.new_file_check_interval);
    println!("  tail.mode = {:?}", cfg.tail.mode);
    println!("  tail.poll_interval = {:?}", cfg.tail.poll_interval);
    println!("  tail.reopen_grace = {:?}", cfg.tail.reopen_grace);
    println!("  channel_capacity = {}", cfg.channel_capacity);
    println!("  transform.group_pattern = {}", cfg.transform.group_pattern());
    println!(
        "  transform.timestamp_prefix_pattern = {}",
        cfg.transform.timestamp_prefix_pattern()
    );
    println!();

    println!("files ({}):", cfg.files.len());
    for spec in &cfg.files {
        match spec.tag.as_deref() {
            Some(tag) => println!("  - {} (tag: {tag})", spec.path),
            None => println!("  - {}", spec.path),
        }
    }

    if !cfg.excluded_files.is_empty() {
        println!("exclude.files:");
        for p in cfg.excluded_files.sources() {
            println!("  - {p}");
        }
    }
    if !cfg.excluded_patterns.is_empty() {
        println!("exclude.patterns:");
        for p in cfg.excluded_patterns.sources() {
            println!("  - {p}");
        }
    }

    debug!("dry-run complete (nothing tailed)");
}
