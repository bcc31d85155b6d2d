//! Failure notifications for the `check` uptime monitor.
//!
//! `check-alerts` decides whether a failed check should produce an email
//! and sends it. Repeated failures of the same incident are reported once:
//! the gate reads the last record of the run log and suppresses the email
//! when that record already carries the configured subject.
//!
//! # Example
//!
//! ```rust
//! use check_alerts::{evaluate, CheckResult, Decision, LogTail};
//! use check_config::Settings;
//!
//! let settings = Settings {
//!     url: "http://x".to_string(),
//!     subject: "Down".to_string(),
//!     ..Default::default()
//! };
//!
//! // The previous run already reported this incident.
//! let tail = LogTail::from_text("2024-01-01 - Down: http://x\n");
//! let decision = evaluate(&CheckResult::Status(503), &tail, &settings);
//! assert_eq!(decision, Decision::Suppressed);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod channels;
pub mod error;
pub mod gate;
pub mod log_tail;
pub mod types;

// Re-export main types at crate root
pub use channels::{Notifier, SmtpNotifier};
pub use error::{AlertError, Result};
pub use gate::{GateReport, NotificationGate, compose, evaluate, missing_fields};
pub use log_tail::{LogStore, LogTail, TAIL_WINDOW_BYTES, last_line, read_tail};
pub use types::{CheckResult, Decision, Email, Relay};
