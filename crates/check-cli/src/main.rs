//! `check` binary entrypoint.

use std::process::ExitCode;

use check_alerts::{LogStore, NotificationGate, SmtpNotifier};
use check_cli::commands::CheckCommand;
use check_cli::{Cli, CliError, HttpProbe, logging};
use check_config::{ConfigStore, PartialSettings, Settings, resolve};
use clap::Parser;
use tracing::{debug, warn};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    // The log path is only known after the merge.
    let bootstrap = logging::bootstrap_subscriber(cli.debug);
    let (settings, store, log) = tracing::subscriber::with_default(bootstrap, || prepare(cli));

    logging::init(settings.debug, log.as_ref().map(LogStore::writer))?;
    debug!(?settings, "effective configuration");

    let probe = HttpProbe::new()?;
    let gate = NotificationGate::new(Box::new(SmtpNotifier::new()));
    let tail = log.map(|l| l.tail().clone()).unwrap_or_default();

    CheckCommand::new(&settings, &probe, &gate).execute(&tail, &store);
    Ok(())
}

/// Loads and merges the settings, then opens the log.
fn prepare(cli: &Cli) -> (Settings, ConfigStore, Option<LogStore>) {
    debug!("reading configuration file");
    let mut store = ConfigStore::new(cli.config_path());
    let persisted = store.load().unwrap_or_else(|e| {
        warn!(error = %e, "error reading config file");
        PartialSettings::default()
    });

    let settings = resolve(persisted, cli.overrides());
    let log = open_log(&settings.log_path);
    (settings, store, log)
}

fn open_log(path: &str) -> Option<LogStore> {
    if path.is_empty() {
        return None;
    }
    match LogStore::open(path) {
        Ok(log) => Some(log),
        Err(e) => {
            warn!(path, error = %e, "failed to open log file, no log will be saved");
            None
        }
    }
}
