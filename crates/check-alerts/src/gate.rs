//! The notification gate.
//!
//! The gate decides, for one check result, whether an email goes out. A
//! success never notifies. A failure notifies once per incident: when the
//! most recent log record already mentions the configured subject, the
//! incident was reported by an earlier run and the email is suppressed.
//!
//! The records the gate writes keep that chain going. A sent notification
//! and a suppressed one both log the subject, so the next failing run finds
//! it; a failed send does not, so the next run tries again.

use check_config::Settings;
use tracing::{debug, error, info, warn};

use crate::channels::Notifier;
use crate::error::Result;
use crate::log_tail::LogTail;
use crate::types::{CheckResult, Decision, Email, Relay};

/// The outcome of [`NotificationGate::dispatch`].
#[derive(Debug)]
pub struct GateReport {
    /// What the gate decided.
    pub decision: Decision,
    /// The delivery result, present only when a send was attempted.
    pub delivery: Option<Result<()>>,
}

impl GateReport {
    /// Returns true if an email was handed to the relay successfully.
    #[must_use]
    pub fn delivered(&self) -> bool {
        matches!(self.delivery, Some(Ok(())))
    }
}

/// Decides whether a failed check is reported and sends the report.
#[derive(Debug)]
pub struct NotificationGate {
    notifier: Box<dyn Notifier>,
}

impl NotificationGate {
    /// Creates a gate that delivers through `notifier`.
    #[must_use]
    pub fn new(notifier: Box<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Returns the notifier name.
    #[must_use]
    pub fn notifier_name(&self) -> &str {
        self.notifier.name()
    }

    /// Decides and, on [`Decision::Notify`], sends exactly one email.
    ///
    /// Delivery failures are logged and returned in the report; they are
    /// never raised.
    pub fn dispatch(&self, result: &CheckResult, tail: &LogTail, settings: &Settings) -> GateReport {
        let decision = evaluate(result, tail, settings);

        let delivery = match &decision {
            Decision::NoAction => None,
            Decision::Suppressed => {
                info!(
                    subject = %settings.subject,
                    url = %settings.url,
                    "failure already reported; notification suppressed"
                );
                None
            }
            Decision::Blocked { missing } => {
                warn!(
                    missing = %missing.join(", "),
                    url = %settings.url,
                    "cannot send email notification; settings incomplete"
                );
                None
            }
            Decision::Notify => {
                let (relay, email) = compose(settings);
                let sent = self.notifier.send(&relay, &email);
                match &sent {
                    Ok(()) => info!(
                        subject = %settings.subject,
                        url = %settings.url,
                        to = %email.recipient,
                        sent_at = %chrono::Local::now().to_rfc2822(),
                        "email notification sent"
                    ),
                    Err(e) => error!(
                        error = %e,
                        url = %settings.url,
                        channel = %self.notifier.name(),
                        "failed to send email notification"
                    ),
                }
                Some(sent)
            }
        };

        GateReport { decision, delivery }
    }
}

/// Decides what to do about one check result.
///
/// 1. A successful result is [`Decision::NoAction`].
/// 2. A failure whose subject appears in the last non-empty log line is
///    [`Decision::Suppressed`]. The match is a plain, case-sensitive
///    substring test; an empty subject never matches.
/// 3. Any other failure is [`Decision::Notify`] if the relay, recipient and
///    subject are all set, [`Decision::Blocked`] otherwise.
///
/// The function is pure: the same inputs always give the same decision.
#[must_use]
pub fn evaluate(result: &CheckResult, tail: &LogTail, settings: &Settings) -> Decision {
    if result.is_success() {
        debug!(%result, "check succeeded; nothing to notify");
        return Decision::NoAction;
    }

    let last = tail.last_line();
    let subject = settings.subject.as_str();
    if !subject.is_empty() && last.is_some_and(|line| line.contains(subject)) {
        debug!(subject, "subject found in the last log entry; not sending email");
        return Decision::Suppressed;
    }
    debug!(
        subject,
        has_history = last.is_some(),
        "subject not found in the last log entry"
    );

    let missing = missing_fields(settings);
    if missing.is_empty() {
        Decision::Notify
    } else {
        debug!(missing = ?missing, "notifier settings incomplete");
        Decision::Blocked { missing }
    }
}

/// Returns the names of required notifier settings that are empty.
#[must_use]
pub fn missing_fields(settings: &Settings) -> Vec<&'static str> {
    [
        ("user", &settings.smtp_user),
        ("password", &settings.smtp_password),
        ("smtp", &settings.smtp_host),
        ("port", &settings.smtp_port),
        ("recipient", &settings.recipient),
        ("subject", &settings.subject),
    ]
    .into_iter()
    .filter(|(_, value)| value.is_empty())
    .map(|(name, _)| name)
    .collect()
}

/// Builds the relay and the email for a notification.
///
/// The sender is `author`, or the SMTP login when no author is set. Subject
/// and body get the checked URL appended as is.
#[must_use]
pub fn compose(settings: &Settings) -> (Relay, Email) {
    let sender = if settings.author.is_empty() {
        settings.smtp_user.clone()
    } else {
        settings.author.clone()
    };

    let relay = Relay {
        host: settings.smtp_host.clone(),
        port: settings.smtp_port.clone(),
        login: settings.smtp_user.clone(),
        password: settings.smtp_password.clone(),
    };
    let email = Email {
        sender,
        recipient: settings.recipient.clone(),
        subject: format!("{}{}", settings.subject, settings.url),
        body: format!("{}{}", settings.body, settings.url),
    };
    (relay, email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AlertError;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Sent = Rc<RefCell<Vec<(Relay, Email)>>>;

    #[derive(Debug, Default)]
    struct RecordingNotifier {
        sent: Sent,
        fail: bool,
    }

    impl Notifier for RecordingNotifier {
        fn name(&self) -> &str {
            "recording"
        }

        fn send(&self, relay: &Relay, email: &Email) -> Result<()> {
            self.sent.borrow_mut().push((relay.clone(), email.clone()));
            if self.fail {
                return Err(AlertError::NotificationFailed {
                    reason: "relay rejected".to_string(),
                });
            }
            Ok(())
        }
    }

    fn recording_gate(fail: bool) -> (NotificationGate, Sent) {
        let sent = Sent::default();
        let notifier = RecordingNotifier {
            sent: Rc::clone(&sent),
            fail,
        };
        (NotificationGate::new(Box::new(notifier)), sent)
    }

    fn complete_settings() -> Settings {
        Settings {
            url: "http://x".to_string(),
            author: "monitor@example.com".to_string(),
            recipient: "ops@example.com".to_string(),
            smtp_host: "mail.example.com".to_string(),
            smtp_port: "587".to_string(),
            smtp_user: "login@example.com".to_string(),
            smtp_password: "secret".to_string(),
            subject: "Down".to_string(),
            body: "Not reachable: ".to_string(),
            ..Default::default()
        }
    }

    fn failure() -> CheckResult {
        CheckResult::Status(503)
    }

    mod evaluate_tests {
        use super::*;

        #[test]
        fn success_is_no_action() {
            let tail = LogTail::from_text("anything\n");
            let decision = evaluate(&CheckResult::Status(200), &tail, &complete_settings());
            assert_eq!(decision, Decision::NoAction);
        }

        #[test]
        fn success_ignores_matching_log() {
            let tail = LogTail::from_text("2024-01-01 - Down: http://x\n");
            let decision = evaluate(&CheckResult::Status(200), &tail, &Settings::default());
            assert_eq!(decision, Decision::NoAction);
        }

        #[test]
        fn subject_in_last_line_is_suppressed() {
            let tail = LogTail::from_text("2024-01-01 - Down: http://x");
            let decision = evaluate(&failure(), &tail, &complete_settings());
            assert_eq!(decision, Decision::Suppressed);
        }

        #[test]
        fn subject_only_in_older_line_notifies() {
            let tail = LogTail::from_text("2024-01-01 - Down: http://x\n2024-01-02 - up again\n");
            let decision = evaluate(&failure(), &tail, &complete_settings());
            assert_eq!(decision, Decision::Notify);
        }

        #[test]
        fn match_is_case_sensitive() {
            let tail = LogTail::from_text("2024-01-01 - down: http://x\n");
            let decision = evaluate(&failure(), &tail, &complete_settings());
            assert_eq!(decision, Decision::Notify);
        }

        #[test]
        fn trailing_blank_lines_are_skipped() {
            let tail = LogTail::from_text("2024-01-01 - Down: http://x\n\n\n");
            let decision = evaluate(&failure(), &tail, &complete_settings());
            assert_eq!(decision, Decision::Suppressed);
        }

        #[test]
        fn transport_error_is_a_failure() {
            let result = CheckResult::Transport("connection refused".to_string());
            let decision = evaluate(&result, &LogTail::empty(), &complete_settings());
            assert_eq!(decision, Decision::Notify);
        }

        #[test]
        fn empty_log_never_suppresses() {
            let decision = evaluate(&failure(), &LogTail::empty(), &complete_settings());
            assert_eq!(decision, Decision::Notify);
        }

        #[test]
        fn missing_password_is_blocked() {
            let settings = Settings {
                smtp_password: String::new(),
                ..complete_settings()
            };
            let tail = LogTail::from_text("2024-01-01 - up\n");

            let decision = evaluate(&failure(), &tail, &settings);

            assert_eq!(
                decision,
                Decision::Blocked {
                    missing: vec!["password"]
                }
            );
        }

        #[test]
        fn empty_subject_never_matches() {
            let settings = Settings {
                subject: String::new(),
                ..complete_settings()
            };
            let tail = LogTail::from_text("some record\n");

            let decision = evaluate(&failure(), &tail, &settings);

            assert_eq!(
                decision,
                Decision::Blocked {
                    missing: vec!["subject"]
                }
            );
        }

        #[test]
        fn author_is_not_required() {
            let settings = Settings {
                author: String::new(),
                ..complete_settings()
            };
            assert_eq!(
                evaluate(&failure(), &LogTail::empty(), &settings),
                Decision::Notify
            );
        }

        #[test]
        fn missing_fields_lists_all_in_order() {
            assert_eq!(
                missing_fields(&Settings::default()),
                vec!["user", "password", "smtp", "port", "recipient", "subject"]
            );
            assert!(missing_fields(&complete_settings()).is_empty());
        }
    }

    mod compose_tests {
        use super::*;

        #[test]
        fn url_is_appended_literally() {
            let (_, email) = compose(&complete_settings());
            assert_eq!(email.subject, "Downhttp://x");
            assert_eq!(email.body, "Not reachable: http://x");
        }

        #[test]
        fn sender_falls_back_to_login() {
            let settings = Settings {
                author: String::new(),
                ..complete_settings()
            };
            let (relay, email) = compose(&settings);
            assert_eq!(email.sender, "login@example.com");
            assert_eq!(relay.login, "login@example.com");
        }

        #[test]
        fn relay_uses_smtp_settings() {
            let (relay, email) = compose(&complete_settings());
            assert_eq!(relay.host, "mail.example.com");
            assert_eq!(relay.port, "587");
            assert_eq!(relay.password, "secret");
            assert_eq!(email.sender, "monitor@example.com");
            assert_eq!(email.recipient, "ops@example.com");
        }
    }

    mod dispatch_tests {
        use super::*;

        #[test]
        fn success_sends_nothing() {
            let (gate, sent) = recording_gate(false);
            let report = gate.dispatch(&CheckResult::Status(200), &LogTail::empty(), &complete_settings());

            assert_eq!(report.decision, Decision::NoAction);
            assert!(report.delivery.is_none());
            assert!(sent.borrow().is_empty());
        }

        #[test]
        fn suppressed_sends_nothing() {
            let (gate, sent) = recording_gate(false);
            let tail = LogTail::from_text("2024-01-01 - Down: http://x\n");

            let report = gate.dispatch(&failure(), &tail, &complete_settings());

            assert_eq!(report.decision, Decision::Suppressed);
            assert!(sent.borrow().is_empty());
        }

        #[test]
        fn notify_sends_exactly_once() {
            let (gate, sent) = recording_gate(false);

            let report = gate.dispatch(&failure(), &LogTail::empty(), &complete_settings());

            assert_eq!(report.decision, Decision::Notify);
            assert!(report.delivered());
            let sent = sent.borrow();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].1.sender, "monitor@example.com");
        }

        #[test]
        fn notify_uses_login_when_author_empty() {
            let (gate, sent) = recording_gate(false);
            let settings = Settings {
                author: String::new(),
                ..complete_settings()
            };

            gate.dispatch(&failure(), &LogTail::empty(), &settings);

            let sent = sent.borrow();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].1.sender, "login@example.com");
        }

        #[test]
        fn blocked_never_invokes_notifier() {
            let (gate, sent) = recording_gate(false);
            let settings = Settings {
                smtp_password: String::new(),
                ..complete_settings()
            };
            let tail = LogTail::from_text("2024-01-01 - all good\n");

            let report = gate.dispatch(&failure(), &tail, &settings);

            assert!(matches!(report.decision, Decision::Blocked { .. }));
            assert!(report.delivery.is_none());
            assert!(sent.borrow().is_empty());
        }

        #[test]
        fn send_failure_is_reported_not_raised() {
            let (gate, sent) = recording_gate(true);

            let report = gate.dispatch(&failure(), &LogTail::empty(), &complete_settings());

            assert_eq!(report.decision, Decision::Notify);
            assert!(!report.delivered());
            assert!(matches!(
                report.delivery,
                Some(Err(AlertError::NotificationFailed { .. }))
            ));
            assert_eq!(sent.borrow().len(), 1);
        }

        #[test]
        fn gate_exposes_notifier_name() {
            let (gate, _) = recording_gate(false);
            assert_eq!(gate.notifier_name(), "recording");
        }
    }

    mod record_tests {
        use super::*;
        use crate::log_tail::last_line;
        use std::io;
        use std::sync::{Arc, Mutex};

        #[derive(Clone, Default)]
        struct Captured(Arc<Mutex<Vec<u8>>>);

        impl io::Write for Captured {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        /// Dispatches a failure and returns the log text it wrote.
        fn dispatch_logged(gate: &NotificationGate, tail: &LogTail) -> (GateReport, String) {
            let captured = Captured::default();
            let writer = captured.clone();
            let subscriber = tracing_subscriber::fmt()
                .with_ansi(false)
                .with_max_level(tracing::Level::INFO)
                .with_writer(move || writer.clone())
                .finish();

            let report = tracing::subscriber::with_default(subscriber, || {
                gate.dispatch(&failure(), tail, &complete_settings())
            });
            let text = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
            (report, text)
        }

        #[test]
        fn sent_record_suppresses_next_run() {
            let (gate, _) = recording_gate(false);

            let (report, text) = dispatch_logged(&gate, &LogTail::empty());

            assert!(report.delivered());
            let last = last_line(&text).expect("record written");
            assert!(last.contains("email notification sent"));
            assert!(last.contains("Down"));
            let next = evaluate(&failure(), &LogTail::from_text(text.clone()), &complete_settings());
            assert_eq!(next, Decision::Suppressed);
        }

        #[test]
        fn suppressed_record_keeps_the_chain() {
            let (gate, sent) = recording_gate(false);
            let tail = LogTail::from_text("2024-01-01 - Down: http://x\n");

            let (report, text) = dispatch_logged(&gate, &tail);

            assert_eq!(report.decision, Decision::Suppressed);
            assert!(sent.borrow().is_empty());
            let last = last_line(&text).expect("record written");
            assert!(last.contains("suppressed"));
            assert!(last.contains("Down"));
            let next = evaluate(&failure(), &LogTail::from_text(text.clone()), &complete_settings());
            assert_eq!(next, Decision::Suppressed);
        }

        #[test]
        fn failed_send_record_lets_next_run_retry() {
            let (gate, _) = recording_gate(true);

            let (report, text) = dispatch_logged(&gate, &LogTail::empty());

            assert!(!report.delivered());
            let last = last_line(&text).expect("record written");
            assert!(last.contains("failed to send email notification"));
            assert!(!last.contains("Down"));
            let next = evaluate(&failure(), &LogTail::from_text(text.clone()), &complete_settings());
            assert_eq!(next, Decision::Notify);
        }
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn any_result() -> impl Strategy<Value = CheckResult> {
            prop_oneof![
                (100u16..600).prop_map(CheckResult::Status),
                "[a-z ]{1,20}".prop_map(CheckResult::Transport),
            ]
        }

        proptest! {
            #[test]
            fn success_is_always_no_action(code in 200u16..300, log in ".{0,200}") {
                let tail = LogTail::from_text(log);
                let decision = evaluate(&CheckResult::Status(code), &tail, &complete_settings());
                prop_assert_eq!(decision, Decision::NoAction);
            }

            #[test]
            fn subject_in_last_line_always_suppresses(
                code in 300u16..600,
                prefix in "[a-zA-Z0-9 :-]{0,20}",
                suffix in "[a-zA-Z0-9 :/.-]{0,20}",
            ) {
                let tail = LogTail::from_text(format!("older\n{prefix}Down{suffix}\n"));
                let decision = evaluate(&CheckResult::Status(code), &tail, &complete_settings());
                prop_assert_eq!(decision, Decision::Suppressed);
            }

            #[test]
            fn any_missing_field_blocks(which in 0usize..6, code in 400u16..600) {
                let mut settings = complete_settings();
                match which {
                    0 => settings.smtp_user.clear(),
                    1 => settings.smtp_password.clear(),
                    2 => settings.smtp_host.clear(),
                    3 => settings.smtp_port.clear(),
                    4 => settings.recipient.clear(),
                    _ => settings.subject.clear(),
                }
                let tail = LogTail::from_text("2024-01-01 - unrelated\n");
                let decision = evaluate(&CheckResult::Status(code), &tail, &settings);
                prop_assert!(matches!(decision, Decision::Blocked { .. }), "got {:?}", decision);
            }

            #[test]
            fn evaluate_is_idempotent(result in any_result(), log in ".{0,120}") {
                let tail = LogTail::from_text(log);
                let settings = complete_settings();
                let first = evaluate(&result, &tail, &settings);
                let second = evaluate(&result, &tail, &settings);
                prop_assert_eq!(first, second);
            }
        }
    }
}
