//! Error types for the check-config crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading, merging or saving settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file exists but could not be read.
    #[error("failed to read config file '{}': {source}", path.display())]
    Load {
        /// The file that failed to load.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A config file was read but is not valid YAML for the settings record.
    #[error("invalid config file '{}': {source}", path.display())]
    Parse {
        /// The file that failed to parse.
        path: PathBuf,
        /// The underlying YAML error.
        source: serde_yaml::Error,
    },

    /// The settings could not be written to the target location.
    #[error("failed to write config file '{}': {source}", path.display())]
    Save {
        /// The file that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The settings could not be rendered as YAML.
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_yaml::Error),

    /// No URL is configured, neither persisted nor as an override.
    #[error("no URL configured")]
    MissingUrl,

    /// No save target was given and no default location could be derived.
    #[error("no config location available")]
    NoLocation,
}

/// Result type for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
