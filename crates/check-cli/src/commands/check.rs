//! The check run.
//!
//! One run is strictly sequential:
//! - probe the URL once
//! - let the notification gate decide and possibly send an email
//! - write the settings back to the config file
//!
//! Nothing in here fails the run. Every problem is logged and the remaining
//! steps still happen; in particular the settings are saved even when no
//! URL is configured.

use std::path::PathBuf;

use check_alerts::{CheckResult, GateReport, LogTail, NotificationGate};
use check_config::{ConfigStore, Settings};
use tracing::{debug, info, warn};

use crate::probe::Probe;

/// What happened during one run.
#[derive(Debug)]
pub struct RunReport {
    /// The probe result, absent when no URL was configured.
    pub result: Option<CheckResult>,
    /// The gate outcome, absent when no check was made.
    pub gate: Option<GateReport>,
    /// Where the settings were saved, absent when saving failed.
    pub saved_to: Option<PathBuf>,
}

/// Check command executor.
pub struct CheckCommand<'a> {
    settings: &'a Settings,
    probe: &'a dyn Probe,
    gate: &'a NotificationGate,
}

impl<'a> CheckCommand<'a> {
    /// Creates a new check command.
    #[must_use]
    pub const fn new(settings: &'a Settings, probe: &'a dyn Probe, gate: &'a NotificationGate) -> Self {
        Self {
            settings,
            probe,
            gate,
        }
    }

    /// Runs the check, the notification decision and the config save.
    ///
    /// `tail` is the log tail captured before this run wrote anything.
    pub fn execute(&self, tail: &LogTail, store: &ConfigStore) -> RunReport {
        let (result, gate) = match self.settings.require_url() {
            Ok(url) => {
                let result = self.probe.probe(url);
                if result.is_success() {
                    info!(%result, "website reachable");
                } else {
                    warn!(%result, "website not reachable");
                }
                let report = self.gate.dispatch(&result, tail, self.settings);
                debug!(decision = %report.decision, "notification decision");
                (Some(result), Some(report))
            }
            Err(e) => {
                warn!(
                    error = %e,
                    "a URL is required to check; neither a config file entry nor a command line \
                     flag was provided, remaining configuration is still saved"
                );
                (None, None)
            }
        };

        let saved_to = match store.save(self.settings) {
            Ok(path) => {
                debug!(path = %path.display(), "configuration saved");
                Some(path)
            }
            Err(e) => {
                warn!(error = %e, "failed to save configuration");
                None
            }
        };

        RunReport {
            result,
            gate,
            saved_to,
        }
    }
}
