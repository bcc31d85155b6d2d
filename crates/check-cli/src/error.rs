//! CLI error types.

use std::fmt;

/// CLI-specific errors.
///
/// Only startup problems surface as errors; failures of the check, the
/// notification or the config save are logged by the run and never abort it.
#[derive(Debug)]
pub enum CliError {
    /// The HTTP client could not be set up.
    Http(String),
    /// The tracing subscriber could not be installed.
    Logging(String),
    /// IO error.
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(msg) => write!(f, "http client error: {msg}"),
            Self::Logging(msg) => write!(f, "logging error: {msg}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
