use std::error::Error;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tempfile::tempdir;
use tokio::time::sleep;

use tailship::collector::{Collector, Outbound};
use tailship::config::LogFileSpec;
use tailship::pipeline::transform::DEFAULT_TIMESTAMP_PREFIX_PATTERN;
use tailship::pipeline::{ExclusionSet, TransformRules};
use tailship::supervisor::{
    GlobScanner, RescanLoop, TailJob, TokioWorkerSpawner, WorkerContext, WorkerRegistry,
    run_worker,
};
use tailship::tail::{TailMode, TailOptions};
use tailship::types::{Facility, Severity};
use tailship_test_utils::{init_tracing, with_timeout, CapturingCollector};

type TestResult = Result<(), Box<dyn Error>>;

fn append(path: &Path, data: &str) -> std::io::Result<()> {
    let mut f = OpenOptions::new().append(true).open(path)?;
    f.write_all(data.as_bytes())?;
    f.flush()
}

/// Treat the temp dir like `/srv`: its first sub-directory is the group.
fn rules_rooted_at(root: &Path) -> Result<TransformRules, Box<dyn Error>> {
    let group = format!("^{}/([^/]+)/", regex::escape(&root.to_string_lossy()));
    Ok(TransformRules::new(&group, DEFAULT_TIMESTAMP_PREFIX_PATTERN)?)
}

fn context(
    root: &Path,
    exclude: &[&str],
    collector: &CapturingCollector,
) -> Result<Arc<WorkerContext>, Box<dyn Error>> {
    let Outbound { packets, .. } = collector.clone().start(8);
    Ok(Arc::new(WorkerContext {
        content_exclusions: ExclusionSet::compile(exclude)?,
        rules: rules_rooted_at(root)?,
        severity: Severity::Notice,
        facility: Facility::Local0,
        hostname: "test-host".to_string(),
        tail: TailOptions {
            mode: TailMode::Poll,
            poll_interval: Duration::from_millis(10),
            reopen_grace: Duration::from_millis(100),
        },
        packets,
    }))
}

#[tokio::test]
async fn worker_forwards_transformed_lines_and_drops_excluded_ones() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    fs::create_dir(dir.path().join("appA"))?;
    let file = dir.path().join("appA/exception.log");
    fs::write(&file, "history that must not be replayed\n")?;

    let collector = CapturingCollector::new();
    let ctx = context(dir.path(), &["secret"], &collector)?;
    let registry = WorkerRegistry::new();
    let registration = registry.register(&file).ok_or("path already registered")?;

    let handle = tokio::spawn(run_worker(
        ctx,
        TailJob {
            path: file.clone(),
            tag: None,
            registration,
        },
    ));
    // Give the worker time to open the file at its current end.
    sleep(Duration::from_millis(200)).await;

    append(&file, "[2024-01-02 03-04-05] boom\nsecret stuff\nsecond\n")?;
    with_timeout(collector.wait_for(2)).await;

    assert_eq!(
        collector.texts(),
        vec!["appA: exception: boom", "appA: exception: second"]
    );
    let messages = collector.messages();
    assert!(messages.iter().all(|m| m.tag == "-"));
    assert!(messages.iter().all(|m| m.hostname == "test-host"));
    assert!(messages.iter().all(|m| m.facility == Facility::Local0));
    assert!(registry.exists(&file));

    fs::remove_file(&file)?;
    with_timeout(handle).await?;
    assert!(!registry.exists(&file), "registration must not leak");
    Ok(())
}

#[tokio::test]
async fn failed_open_releases_registration() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let file = dir.path().join("vanished.log");

    let collector = CapturingCollector::new();
    let ctx = context(dir.path(), &[], &collector)?;
    let registry = WorkerRegistry::new();
    let registration = registry.register(&file).ok_or("path already registered")?;

    with_timeout(run_worker(
        ctx,
        TailJob {
            path: file.clone(),
            tag: Some("x".to_string()),
            registration,
        },
    ))
    .await;

    assert!(registry.is_empty());
    assert!(collector.messages().is_empty());
    Ok(())
}

#[tokio::test]
async fn discovered_files_are_tailed_end_to_end() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    fs::create_dir(dir.path().join("billing"))?;
    let early = dir.path().join("billing/info.log");
    fs::write(&early, "")?;

    let collector = CapturingCollector::new();
    let ctx = context(dir.path(), &[], &collector)?;
    let registry = WorkerRegistry::new();
    let scanner = GlobScanner::new(
        vec![LogFileSpec::new(
            format!("{}/*/*.log", dir.path().display()),
            Some("custom"),
        )],
        ExclusionSet::compile([r"ignored\.log$"])?,
        registry.clone(),
        TokioWorkerSpawner::new(ctx),
    );
    let rescan = tokio::spawn(RescanLoop::new(scanner, Duration::from_millis(50)).run());

    sleep(Duration::from_millis(200)).await;
    append(&early, "first\n")?;
    with_timeout(collector.wait_for(1)).await;

    // A file created after startup is found by a later rescan.
    let late = dir.path().join("billing/error.log");
    fs::write(&late, "")?;
    fs::write(dir.path().join("billing/ignored.log"), "")?;
    with_timeout(async {
        while !registry.exists(&late) {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    sleep(Duration::from_millis(200)).await;
    append(&late, "second\n")?;
    with_timeout(collector.wait_for(2)).await;

    assert_eq!(
        collector.texts(),
        vec!["billing: info: first", "billing: error: second"]
    );
    assert!(collector.messages().iter().all(|m| m.tag == "custom"));
    assert!(!registry.exists(&dir.path().join("billing/ignored.log")));
    assert_eq!(registry.len(), 2);

    rescan.abort();
    Ok(())
}
