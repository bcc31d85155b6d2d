//! YAML persistence for [`Settings`].
//!
//! The store looks for `.check.yaml` (or `.check.yml`) in, by priority:
//! the explicit path given for this run, `/etc/check/`, the user's home
//! directory and the current working directory. The first file found is
//! loaded; saving goes to the explicit `config` setting, else back to the
//! loaded file, else to the home directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::settings::{PartialSettings, Settings};

/// File names probed in each search directory, in order.
pub const CONFIG_FILE_NAMES: [&str; 2] = [".check.yaml", ".check.yml"];

/// System-wide config directory.
pub const SYSTEM_CONFIG_DIR: &str = "/etc/check";

/// Loads and saves the persisted settings file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    explicit: Option<PathBuf>,
    search_dirs: Vec<PathBuf>,
    default_target: Option<PathBuf>,
    loaded_from: Option<PathBuf>,
}

impl ConfigStore {
    /// Creates a store using the standard search directories.
    #[must_use]
    pub fn new(explicit: Option<PathBuf>) -> Self {
        let home = dirs::home_dir();
        let mut search_dirs = vec![PathBuf::from(SYSTEM_CONFIG_DIR)];
        search_dirs.extend(home.clone());
        search_dirs.push(PathBuf::from("."));

        let default_target = home
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_FILE_NAMES[0]);

        Self {
            explicit,
            search_dirs,
            default_target: Some(default_target),
            loaded_from: None,
        }
    }

    /// Replaces the search directories.
    #[must_use]
    pub fn with_search_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.search_dirs = dirs;
        self
    }

    /// Sets where settings are saved when nothing else names a location.
    #[must_use]
    pub fn with_default_target(mut self, target: Option<PathBuf>) -> Self {
        self.default_target = target;
        self
    }

    /// Returns every candidate file in search order.
    #[must_use]
    pub fn candidates(&self) -> Vec<PathBuf> {
        let mut out: Vec<PathBuf> = self.explicit.iter().cloned().collect();
        for dir in &self.search_dirs {
            out.extend(CONFIG_FILE_NAMES.iter().map(|name| dir.join(name)));
        }
        out
    }

    /// Returns the file the settings were loaded from, if any.
    #[must_use]
    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded_from.as_deref()
    }

    /// Loads the first config file found.
    ///
    /// A missing file is not an error: the result is then empty.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] or [`ConfigError::Parse`] when a file
    /// exists but cannot be read or parsed.
    pub fn load(&mut self) -> Result<PartialSettings> {
        let Some(path) = self.candidates().into_iter().find(|p| p.is_file()) else {
            debug!("config file not found; ignoring");
            return Ok(PartialSettings::default());
        };

        debug!(path = %path.display(), "using config file");
        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Load {
            path: path.clone(),
            source,
        })?;
        self.loaded_from = Some(path.clone());

        if content.trim().is_empty() {
            return Ok(PartialSettings::default());
        }
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Resolves where [`save`](Self::save) will write.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoLocation`] when no location can be derived.
    pub fn target(&self, settings: &Settings) -> Result<PathBuf> {
        if !settings.config_path.is_empty() {
            return Ok(PathBuf::from(&settings.config_path));
        }
        self.loaded_from
            .clone()
            .or_else(|| self.default_target.clone())
            .ok_or(ConfigError::NoLocation)
    }

    /// Writes the full settings record as YAML and returns the path written.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Save`] if the target is not writable.
    pub fn save(&self, settings: &Settings) -> Result<PathBuf> {
        let path = self.target(settings)?;
        let dir = path.parent().map(|p| p.display().to_string()).unwrap_or_default();
        let file = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        debug!(%dir, %file, "saving config");

        let yaml = serde_yaml::to_string(settings)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Save {
                path: path.clone(),
                source,
            })?;
        }
        fs::write(&path, yaml).map_err(|source| ConfigError::Save {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}
