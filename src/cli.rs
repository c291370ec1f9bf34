// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `tailship`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tailship",
    version,
    about = "Tail log files matched by glob patterns and forward each line to a collector.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `tailship.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "tailship.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TAILSHIP_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Poll files for new content instead of relying on filesystem
    /// notifications. Overrides `[config].poll`.
    #[arg(long)]
    pub poll: bool,

    /// Hostname stamped on every forwarded message. Overrides
    /// `[config].hostname`.
    #[arg(long, value_name = "NAME")]
    pub hostname: Option<String>,

    /// Parse + validate, print the effective configuration, but don't tail
    /// anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
