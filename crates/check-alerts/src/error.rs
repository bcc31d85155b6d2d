//! Error types for the check-alerts crate.

use thiserror::Error;

/// Errors that can occur while delivering a notification.
#[derive(Debug, Error)]
pub enum AlertError {
    /// Notification delivery failed.
    #[error("notification failed: {reason}")]
    NotificationFailed {
        /// The reason the notification failed.
        reason: String,
    },

    /// A sender or recipient is not a valid mailbox.
    #[error("invalid address '{address}': {reason}")]
    InvalidAddress {
        /// The rejected address.
        address: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The SMTP relay settings are unusable.
    #[error("invalid relay: {reason}")]
    InvalidRelay {
        /// The reason the relay is invalid.
        reason: String,
    },

    /// The email message could not be built.
    #[error("message error: {0}")]
    Message(String),
}

impl From<lettre::error::Error> for AlertError {
    fn from(err: lettre::error::Error) -> Self {
        Self::Message(err.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for AlertError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        Self::NotificationFailed {
            reason: err.to_string(),
        }
    }
}

/// Result type for alert operations.
pub type Result<T> = std::result::Result<T, AlertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_notification_failed() {
        let err = AlertError::NotificationFailed {
            reason: "connection refused".to_string(),
        };
        assert_eq!(err.to_string(), "notification failed: connection refused");
    }

    #[test]
    fn error_display_invalid_address() {
        let err = AlertError::InvalidAddress {
            address: "nobody".to_string(),
            reason: "missing domain".to_string(),
        };
        assert_eq!(err.to_string(), "invalid address 'nobody': missing domain");
    }

    #[test]
    fn error_display_invalid_relay() {
        let err = AlertError::InvalidRelay {
            reason: "port 'abc' is not a number".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid relay: port 'abc' is not a number"
        );
    }
}
