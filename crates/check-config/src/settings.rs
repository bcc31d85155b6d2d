//! The settings record and the merge that produces it.
//!
//! A run starts from two partial sources: what was persisted in the config
//! file and what was given explicitly for this run (flags or environment).
//! [`resolve`] folds them into one [`Settings`] value with a fixed
//! precedence: a non-empty override wins, otherwise the persisted value is
//! kept, even when that value is itself empty.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::error::{ConfigError, Result};

/// The effective configuration of one run.
///
/// YAML keys keep the names used by existing `.check.yaml` files.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// URL to check.
    #[serde(rename = "url", default)]
    pub url: String,
    /// Log file used for run diagnostics and notification dedup.
    #[serde(rename = "log", default)]
    pub log_path: String,
    /// Sender address of the notification email.
    #[serde(default)]
    pub author: String,
    /// Recipient address of the notification email.
    #[serde(default)]
    pub recipient: String,
    /// Explicit config file location for saving.
    #[serde(rename = "config", default)]
    pub config_path: String,
    /// SMTP server host name.
    #[serde(rename = "smtp", default)]
    pub smtp_host: String,
    /// SMTP server port.
    #[serde(rename = "port", default)]
    pub smtp_port: String,
    /// SMTP login.
    #[serde(rename = "user", default)]
    pub smtp_user: String,
    /// SMTP password.
    #[serde(rename = "password", default)]
    pub smtp_password: String,
    /// Subject of the notification; also the dedup marker in the log.
    #[serde(default)]
    pub subject: String,
    /// Body of the notification.
    #[serde(default)]
    pub body: String,
    /// Verbose diagnostics.
    #[serde(default)]
    pub debug: bool,
}

impl Settings {
    /// Returns the URL to check.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingUrl`] when no URL survived the merge.
    pub fn require_url(&self) -> Result<&str> {
        if self.url.is_empty() {
            return Err(ConfigError::MissingUrl);
        }
        Ok(&self.url)
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let password = if self.smtp_password.is_empty() {
            ""
        } else {
            "<redacted>"
        };
        f.debug_struct("Settings")
            .field("url", &self.url)
            .field("log_path", &self.log_path)
            .field("author", &self.author)
            .field("recipient", &self.recipient)
            .field("config_path", &self.config_path)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_user", &self.smtp_user)
            .field("smtp_password", &password)
            .field("subject", &self.subject)
            .field("body", &self.body)
            .field("debug", &self.debug)
            .finish()
    }
}

/// A settings record where any field may be absent.
///
/// An empty string is treated the same as an absent value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PartialSettings {
    /// URL to check.
    #[serde(rename = "url", default, deserialize_with = "scalar")]
    pub url: Option<String>,
    /// Log file path.
    #[serde(rename = "log", default, deserialize_with = "scalar")]
    pub log_path: Option<String>,
    /// Sender address.
    #[serde(default, deserialize_with = "scalar")]
    pub author: Option<String>,
    /// Recipient address.
    #[serde(default, deserialize_with = "scalar")]
    pub recipient: Option<String>,
    /// Config file location.
    #[serde(rename = "config", default, deserialize_with = "scalar")]
    pub config_path: Option<String>,
    /// SMTP host.
    #[serde(rename = "smtp", default, deserialize_with = "scalar")]
    pub smtp_host: Option<String>,
    /// SMTP port.
    #[serde(rename = "port", default, deserialize_with = "scalar")]
    pub smtp_port: Option<String>,
    /// SMTP login.
    #[serde(rename = "user", default, deserialize_with = "scalar")]
    pub smtp_user: Option<String>,
    /// SMTP password.
    #[serde(rename = "password", default, deserialize_with = "scalar")]
    pub smtp_password: Option<String>,
    /// Notification subject.
    #[serde(default, deserialize_with = "scalar")]
    pub subject: Option<String>,
    /// Notification body.
    #[serde(default, deserialize_with = "scalar")]
    pub body: Option<String>,
    /// Verbose diagnostics.
    #[serde(default)]
    pub debug: Option<bool>,
}

impl From<Settings> for PartialSettings {
    fn from(s: Settings) -> Self {
        Self {
            url: Some(s.url),
            log_path: Some(s.log_path),
            author: Some(s.author),
            recipient: Some(s.recipient),
            config_path: Some(s.config_path),
            smtp_host: Some(s.smtp_host),
            smtp_port: Some(s.smtp_port),
            smtp_user: Some(s.smtp_user),
            smtp_password: Some(s.smtp_password),
            subject: Some(s.subject),
            body: Some(s.body),
            debug: Some(s.debug),
        }
    }
}

/// Merges persisted settings with per-run overrides.
///
/// For every string field a non-empty override wins; otherwise the persisted
/// value is used as is. `debug` takes the override when one was given.
#[must_use]
pub fn resolve(persisted: PartialSettings, overrides: PartialSettings) -> Settings {
    Settings {
        url: pick(overrides.url, persisted.url),
        log_path: pick(overrides.log_path, persisted.log_path),
        author: pick(overrides.author, persisted.author),
        recipient: pick(overrides.recipient, persisted.recipient),
        config_path: pick(overrides.config_path, persisted.config_path),
        smtp_host: pick(overrides.smtp_host, persisted.smtp_host),
        smtp_port: pick(overrides.smtp_port, persisted.smtp_port),
        smtp_user: pick(overrides.smtp_user, persisted.smtp_user),
        smtp_password: pick(overrides.smtp_password, persisted.smtp_password),
        subject: pick(overrides.subject, persisted.subject),
        body: pick(overrides.body, persisted.body),
        debug: overrides.debug.or(persisted.debug).unwrap_or(false),
    }
}

fn pick(over: Option<String>, persisted: Option<String>) -> String {
    over.filter(|v| !v.is_empty())
        .or(persisted)
        .unwrap_or_default()
}

// Hand-edited files often carry `port: 587` as a number.
fn scalar<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(_) => Err(de::Error::custom("expected a scalar value")),
    }
}
