//! Command-line argument parsing with clap.

use std::path::PathBuf;

use check_config::PartialSettings;
use clap::Parser;

const LONG_ABOUT: &str = "\
Check is a simple uptime monitor. It checks a URL once per run and sends an
email notification if the URL is not reachable. Run it from a scheduler such
as cron for periodic checks.

Settings can be given as flags or in a YAML config file (.check.yaml in
/etc/check/, the home directory or the working directory). Flags override
the file, and the merged settings are written back to the file at the end of
every run.

Example:
  check -U https://example.com -l monitor.log";

/// Check - a simple uptime monitor.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "check")]
#[command(version, about, long_about = LONG_ABOUT)]
pub struct Cli {
    /// URL to check.
    #[arg(short = 'U', long = "url", alias = "URL", env = "CHECK_URL")]
    pub url: Option<String>,

    /// Log file to write to.
    #[arg(short, long, env = "CHECK_LOG")]
    pub log: Option<String>,

    /// Sender address of the email notification.
    #[arg(short, long, env = "CHECK_AUTHOR")]
    pub author: Option<String>,

    /// Recipient of the email notification.
    #[arg(short, long, env = "CHECK_RECIPIENT")]
    pub recipient: Option<String>,

    /// Config file to use.
    #[arg(short, long, env = "CHECK_CONFIG")]
    pub config: Option<String>,

    /// SMTP server to use.
    #[arg(short, long, env = "CHECK_SMTP")]
    pub smtp: Option<String>,

    /// Port of the SMTP server.
    #[arg(short = 'o', long, env = "CHECK_PORT")]
    pub port: Option<String>,

    /// User login for the SMTP server.
    #[arg(short, long, env = "CHECK_USER")]
    pub user: Option<String>,

    /// Password for the SMTP server.
    #[arg(short, long, env = "CHECK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Subject of the email notification.
    #[arg(short = 'j', long, env = "CHECK_SUBJECT")]
    pub subject: Option<String>,

    /// Body of the email notification.
    #[arg(short, long, env = "CHECK_BODY")]
    pub body: Option<String>,

    /// Enable debug output.
    #[arg(short, long)]
    pub debug: bool,
}

impl Cli {
    /// Returns the explicit per-run overrides.
    #[must_use]
    pub fn overrides(&self) -> PartialSettings {
        PartialSettings {
            url: self.url.clone(),
            log_path: self.log.clone(),
            author: self.author.clone(),
            recipient: self.recipient.clone(),
            config_path: self.config.clone(),
            smtp_host: self.smtp.clone(),
            smtp_port: self.port.clone(),
            smtp_user: self.user.clone(),
            smtp_password: self.password.clone(),
            subject: self.subject.clone(),
            body: self.body.clone(),
            debug: self.debug.then_some(true),
        }
    }

    /// Returns the config file named on the command line, if any.
    #[must_use]
    pub fn config_path(&self) -> Option<PathBuf> {
        self.config
            .as_deref()
            .filter(|c| !c.is_empty())
            .map(PathBuf::from)
    }
}
