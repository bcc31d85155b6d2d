//! Notification delivery.
//!
//! This module provides the [`Notifier`] trait and [`SmtpNotifier`], which
//! delivers an [`Email`] through an SMTP relay with plain authentication.

use std::fmt;
use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Message, SmtpTransport, Transport};
use tracing::debug;

use crate::error::{AlertError, Result};
use crate::types::{Email, Relay};

/// Default SMTP connection timeout.
const DEFAULT_SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait for notification delivery.
///
/// Implementations send one email per call and report failures as errors;
/// they never retry.
pub trait Notifier: fmt::Debug {
    /// Returns the name of this notifier.
    fn name(&self) -> &str;

    /// Sends `email` through `relay`.
    ///
    /// # Errors
    ///
    /// Returns an [`AlertError`] if the email cannot be built or delivered.
    fn send(&self, relay: &Relay, email: &Email) -> Result<()>;
}

/// Sends email over SMTP.
///
/// STARTTLS is used when the server offers it, and the login is done with
/// PLAIN (or LOGIN as a fallback).
#[derive(Debug, Clone)]
pub struct SmtpNotifier {
    timeout: Duration,
}

impl SmtpNotifier {
    /// Creates a notifier with the default timeout.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: DEFAULT_SMTP_TIMEOUT,
        }
    }

    /// Sets the connection timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the message that would be sent for `email`.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::InvalidAddress`] for a malformed sender or
    /// recipient, [`AlertError::Message`] if the message cannot be built.
    pub fn build_message(email: &Email) -> Result<Message> {
        let from = mailbox(&email.sender)?;
        let to = mailbox(&email.recipient)?;
        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())?;
        Ok(message)
    }

    fn transport(&self, relay: &Relay) -> Result<SmtpTransport> {
        let port: u16 = relay.port.parse().map_err(|_| AlertError::InvalidRelay {
            reason: format!("port '{}' is not a number", relay.port),
        })?;
        let tls = TlsParameters::new(relay.host.clone())?;

        Ok(SmtpTransport::builder_dangerous(relay.host.as_str())
            .port(port)
            .tls(Tls::Opportunistic(tls))
            .credentials(Credentials::new(
                relay.login.clone(),
                relay.password.clone(),
            ))
            .authentication(vec![Mechanism::Plain, Mechanism::Login])
            .timeout(Some(self.timeout))
            .build())
    }
}

impl Default for SmtpNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for SmtpNotifier {
    fn name(&self) -> &str {
        "smtp"
    }

    fn send(&self, relay: &Relay, email: &Email) -> Result<()> {
        debug!(
            login = %relay.login,
            host = %relay.host,
            port = %relay.port,
            from = %email.sender,
            to = %email.recipient,
            subject = %email.subject,
            "sending email"
        );

        let message = Self::build_message(email)?;
        let transport = self.transport(relay)?;
        let response = transport.send(&message)?;

        debug!(code = %response.code(), "smtp server accepted message");
        Ok(())
    }
}

fn mailbox(address: &str) -> Result<Mailbox> {
    address.parse().map_err(|e: lettre::address::AddressError| AlertError::InvalidAddress {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    fn test_email() -> Email {
        Email {
            sender: "monitor@example.com".to_string(),
            recipient: "ops@example.com".to_string(),
            subject: "Down: http://x".to_string(),
            body: "Site is not reachable: http://x".to_string(),
        }
    }

    fn test_relay(port: String) -> Relay {
        Relay {
            host: "127.0.0.1".to_string(),
            port,
            login: "monitor".to_string(),
            password: "secret".to_string(),
        }
    }

    mod message_tests {
        use super::*;

        #[test]
        fn message_carries_headers_and_body() {
            let message = SmtpNotifier::build_message(&test_email()).unwrap();
            let raw = String::from_utf8(message.formatted()).unwrap();

            assert!(raw.contains("From: monitor@example.com"));
            assert!(raw.contains("To: ops@example.com"));
            assert!(raw.contains("Subject: Down: http://x"));
            assert!(raw.contains("Site is not reachable: http://x"));
        }

        #[test]
        fn invalid_sender_is_rejected() {
            let email = Email {
                sender: "not an address".to_string(),
                ..test_email()
            };
            let err = SmtpNotifier::build_message(&email).unwrap_err();
            assert!(matches!(err, AlertError::InvalidAddress { .. }));
        }

        #[test]
        fn invalid_recipient_is_rejected() {
            let email = Email {
                recipient: "ops".to_string(),
                ..test_email()
            };
            let err = SmtpNotifier::build_message(&email).unwrap_err();
            assert!(matches!(err, AlertError::InvalidAddress { address, .. } if address == "ops"));
        }
    }

    mod send_tests {
        use super::*;

        #[test]
        fn non_numeric_port_is_invalid_relay() {
            let notifier = SmtpNotifier::new();
            let err = notifier
                .send(&test_relay("smtp".to_string()), &test_email())
                .unwrap_err();
            assert!(matches!(err, AlertError::InvalidRelay { .. }));
        }

        #[test]
        fn unreachable_server_is_notification_failure() {
            let port = {
                let listener = TcpListener::bind("127.0.0.1:0").unwrap();
                listener.local_addr().unwrap().port()
            };
            let notifier = SmtpNotifier::new().with_timeout(Duration::from_secs(2));

            let err = notifier
                .send(&test_relay(port.to_string()), &test_email())
                .unwrap_err();

            assert!(matches!(err, AlertError::NotificationFailed { .. }));
        }

        #[test]
        fn notifier_name() {
            assert_eq!(SmtpNotifier::default().name(), "smtp");
        }
    }
}
