//! Settings for the `check` uptime monitor.
//!
//! Settings come from two places: a persisted YAML file and explicit
//! per-run overrides. [`resolve`] merges them (a non-empty override always
//! wins) and [`ConfigStore`] finds, loads and writes back the YAML file.
//!
//! ```rust
//! use check_config::{resolve, PartialSettings};
//!
//! let persisted = PartialSettings {
//!     subject: Some("Down".to_string()),
//!     ..Default::default()
//! };
//! let overrides = PartialSettings {
//!     url: Some("http://x".to_string()),
//!     ..Default::default()
//! };
//!
//! let settings = resolve(persisted, overrides);
//! assert_eq!(settings.url, "http://x");
//! assert_eq!(settings.subject, "Down");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod settings;
pub mod store;

pub use error::{ConfigError, Result};
pub use settings::{PartialSettings, Settings, resolve};
pub use store::{CONFIG_FILE_NAMES, ConfigStore, SYSTEM_CONFIG_DIR};
