//! Tracing setup.
//!
//! Records go to stdout and, when a log file is configured, are appended to
//! that file as well. The file only receives `info` and above from this
//! workspace's crates: its last line is what the notification gate reads on
//! the next run, so debug detail must not end up there.

use std::fs::File;
use std::io;
use std::sync::Arc;

use tracing::Subscriber;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::prelude::*;

use crate::error::CliError;

/// Crates whose records are written to the log file.
const CRATE_TARGETS: [&str; 4] = ["check", "check_cli", "check_config", "check_alerts"];

/// Builds the console filter. `RUST_LOG` wins when set.
#[must_use]
pub fn console_filter(debug: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if debug { "debug" } else { "info" };
        let directives: Vec<String> = CRATE_TARGETS
            .iter()
            .map(|target| format!("{target}={level}"))
            .collect();
        EnvFilter::new(format!("warn,{}", directives.join(",")))
    })
}

/// Builds the filter for the log file layer.
#[must_use]
pub fn file_filter() -> Targets {
    CRATE_TARGETS
        .into_iter()
        .fold(Targets::new(), |targets, target| {
            targets.with_target(target, LevelFilter::INFO)
        })
}

/// A stdout-only subscriber used before the log path is known.
#[must_use]
pub fn bootstrap_subscriber(debug: bool) -> impl Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_env_filter(console_filter(debug))
        .with_writer(io::stdout)
        .finish()
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns [`CliError::Logging`] if a global subscriber is already set.
pub fn init(debug: bool, log_file: Option<Arc<File>>) -> Result<(), CliError> {
    let console = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_filter(console_filter(debug));
    let file = log_file.map(|writer| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(writer)
            .with_filter(file_filter())
    });

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))
}
