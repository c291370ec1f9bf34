use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use tailship::config::{
    ConfigFile, FileEntry, LogFileSpec, MINIMUM_REFRESH_INTERVAL, load_and_validate,
    load_from_str,
};
use tailship::errors::TailshipError;
use tailship::tail::TailMode;
use tailship::types::{Facility, Severity};

type TestResult = Result<(), Box<dyn Error>>;

fn validate(toml: &str) -> Result<ConfigFile, TailshipError> {
    ConfigFile::try_from(load_from_str(toml)?)
}

#[test]
fn sample_config_loads() -> TestResult {
    let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let cfg = load_and_validate(manifest.join("configs/tailship.toml"))?;

    assert_eq!(
        cfg.files,
        vec![
            LogFileSpec::new("/var/log/nginx/*.log", None),
            LogFileSpec::new("/srv/*/log/*.log", Some("srv")),
        ]
    );
    assert_eq!(cfg.severity, Severity::Notice);
    assert_eq!(cfg.facility, Facility::Local0);
    assert_eq!(cfg.new_file_check_interval, Duration::from_secs(10));
    assert_eq!(cfg.tail.mode, TailMode::Notify);
    assert_eq!(cfg.excluded_files.len(), 2);
    assert!(cfg.excluded_files.matches("/var/log/nginx/access.log.gz"));
    assert!(cfg.excluded_files.matches("/var/log/nginx/access.log.1"));
    assert!(!cfg.excluded_files.matches("/var/log/nginx/access.log"));
    assert!(cfg.excluded_patterns.matches(": access: GET /healthcheck"));

    Ok(())
}

#[test]
fn minimal_config_uses_defaults() -> TestResult {
    let cfg = validate(r#"files = ["/var/log/app.log"]"#)?;

    assert_eq!(cfg.severity, Severity::Notice);
    assert_eq!(cfg.facility, Facility::User);
    assert_eq!(cfg.new_file_check_interval, Duration::from_secs(10));
    assert_eq!(cfg.tail.mode, TailMode::Notify);
    assert_eq!(cfg.tail.poll_interval, Duration::from_millis(250));
    assert_eq!(cfg.tail.reopen_grace, Duration::from_secs(5));
    assert_eq!(cfg.channel_capacity, 100);
    assert!(cfg.excluded_files.is_empty());
    assert!(cfg.excluded_patterns.is_empty());
    assert!(!cfg.hostname.is_empty());
    assert_eq!(cfg.transform.group_pattern(), r"^/srv/([^/]+)/");

    Ok(())
}

#[test]
fn file_entries_accept_strings_and_tables() -> TestResult {
    let raw = load_from_str(
        r#"
        files = ["/a.log", { path = "/b/*.log", tag = "bee" }, { path = "/c.log" }]
        "#,
    )?;
    assert_eq!(raw.files[0], FileEntry::Path("/a.log".to_string()));
    assert_eq!(
        raw.files[1],
        FileEntry::Spec {
            path: "/b/*.log".to_string(),
            tag: Some("bee".to_string())
        }
    );

    let cfg = ConfigFile::try_from(raw)?;
    assert_eq!(cfg.files[0].tag, None);
    assert_eq!(cfg.files[1].tag.as_deref(), Some("bee"));
    assert_eq!(cfg.files[2].tag, None);

    Ok(())
}

#[test]
fn explicit_settings_override_defaults() -> TestResult {
    let cfg = validate(
        r#"
        files = ["/a.log"]

        [config]
        hostname = "edge-01"
        severity = "err"
        facility = "local7"
        new_file_check_interval = "2m"
        poll = true
        poll_interval = "1s"
        channel_capacity = 5
        "#,
    )?;

    assert_eq!(cfg.hostname, "edge-01");
    assert_eq!(cfg.severity, Severity::Err);
    assert_eq!(cfg.facility, Facility::Local7);
    assert_eq!(cfg.new_file_check_interval, Duration::from_secs(120));
    assert_eq!(cfg.tail.mode, TailMode::Poll);
    assert_eq!(cfg.tail.poll_interval, Duration::from_secs(1));
    assert_eq!(cfg.channel_capacity, 5);

    Ok(())
}

#[test]
fn empty_file_list_is_rejected() {
    let err = validate("files = []").unwrap_err();
    assert!(matches!(err, TailshipError::ConfigError(_)), "{err}");

    let err = validate("").unwrap_err();
    assert!(matches!(err, TailshipError::ConfigError(_)), "{err}");

    let err = validate(r#"files = [""]"#).unwrap_err();
    assert!(matches!(err, TailshipError::ConfigError(_)), "{err}");
}

#[test]
fn refresh_interval_has_a_floor() {
    let err = validate(
        r#"
        files = ["/a.log"]
        [config]
        new_file_check_interval = "500ms"
        "#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("new_file_check_interval"), "{err}");

    let at_floor = validate(
        r#"
        files = ["/a.log"]
        [config]
        new_file_check_interval = "1s"
        "#,
    )
    .unwrap();
    assert_eq!(at_floor.new_file_check_interval, MINIMUM_REFRESH_INTERVAL);
}

#[test]
fn malformed_durations_are_rejected() {
    let err = validate(
        r#"
        files = ["/a.log"]
        [config]
        poll_interval = "soon"
        "#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("poll_interval"), "{err}");
}

#[test]
fn invalid_exclusion_regex_is_reported() {
    let err = validate(
        r#"
        files = ["/a.log"]
        [exclude]
        patterns = ["(unclosed"]
        "#,
    )
    .unwrap_err();
    match err {
        TailshipError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "(unclosed"),
        other => panic!("expected InvalidPattern, got {other:?}"),
    }
}

#[test]
fn unknown_severity_is_a_toml_error() {
    let err = validate(
        r#"
        files = ["/a.log"]
        [config]
        severity = "loud"
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, TailshipError::TomlError(_)), "{err}");
}

#[test]
fn oversized_durations_are_rejected_not_wrapped() {
    let err = validate(
        r#"
        files = ["/a.log"]
        [config]
        new_file_check_interval = "6000000000000000h"
        "#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("out of range"), "{err}");
}
