//! Core types for the notification gate.

use std::fmt;

/// The outcome of one reachability probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckResult {
    /// The server answered with this HTTP status code.
    Status(u16),
    /// No response: DNS failure, refused connection, timeout and the like.
    Transport(String),
}

impl CheckResult {
    /// Returns true when the probe got a 2xx response.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Status(code) if (200..300).contains(code))
    }

    /// Returns the status code, if a response was received.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status(code) => Some(*code),
            Self::Transport(_) => None,
        }
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "HTTP {code}"),
            Self::Transport(reason) => write!(f, "transport error: {reason}"),
        }
    }
}

/// What the gate decided to do about a check result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The check succeeded; nothing to report.
    NoAction,
    /// The failure was already reported according to the last log record.
    Suppressed,
    /// The failure is new and a notification can be sent.
    Notify,
    /// The failure is new but the notifier is not fully configured.
    Blocked {
        /// Names of the settings that are empty.
        missing: Vec<&'static str>,
    },
}

impl Decision {
    /// Returns the decision name as a static string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoAction => "no_action",
            Self::Suppressed => "suppressed",
            Self::Notify => "notify",
            Self::Blocked { .. } => "blocked",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blocked { missing } => write!(f, "blocked (missing {})", missing.join(", ")),
            other => f.write_str(other.as_str()),
        }
    }
}

/// An email to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    /// Sender address.
    pub sender: String,
    /// Recipient address.
    pub recipient: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

/// The SMTP server and the credentials used to log in.
#[derive(Clone, PartialEq, Eq)]
pub struct Relay {
    /// Server host name.
    pub host: String,
    /// Server port, as configured.
    pub port: String,
    /// Login name.
    pub login: String,
    /// Password.
    pub password: String,
}

impl fmt::Debug for Relay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relay")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("login", &self.login)
            .finish_non_exhaustive()
    }
}
