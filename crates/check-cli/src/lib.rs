//! # check-cli
//!
//! The `check` command: a single-shot uptime monitor.
//!
//! One invocation:
//! - merges the YAML config file with command-line overrides
//! - sends one GET request to the configured URL
//! - on failure, emails the operator unless the log shows the incident
//!   was already reported
//! - writes the merged settings back to the config file
//!
//! # Architecture
//!
//! ```text
//! ┌───────────┐  Settings  ┌────────────┐  CheckResult  ┌──────────────┐
//! │ check-cfg │───────────►│ HttpProbe  │──────────────►│ Notification │──► SMTP
//! └───────────┘            └────────────┘    LogTail ──►│     Gate     │
//!                                                       └──────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod probe;

pub use cli::Cli;
pub use commands::{CheckCommand, RunReport};
pub use error::CliError;
pub use probe::{CHECK_TIMEOUT, HttpProbe, Probe};
