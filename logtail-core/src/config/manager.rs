//! Locating and loading `config.toml`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};
use crate::models::TargetConfig;

use super::settings::TailSettings;

/// Environment variable that overrides the configuration file location
pub const CONFIG_ENV_VAR: &str = "LOGTAIL_CONFIG";

/// Application directory name under the platform config dir
pub const APP_DIR_NAME: &str = "logtail";

/// File name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Parsed contents of `config.toml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    /// Engine settings
    #[serde(default)]
    pub settings: TailSettings,
    /// Configured targets, in file order
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}

impl ConfigFile {
    /// Parses configuration text and validates every target.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::InvalidTarget`] for the first target failing validation.
    pub fn parse(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        for target in &config.targets {
            target
                .validate()
                .map_err(|e| ConfigError::InvalidTarget {
                    name: target.display_name(),
                    reason: e.to_string(),
                })?;
        }
        Ok(config)
    }

    /// Finds a target by exact name, then case-insensitive name
    #[must_use]
    pub fn find_target(&self, name: &str) -> Option<&TargetConfig> {
        self.targets
            .iter()
            .find(|t| t.display_name() == name)
            .or_else(|| {
                self.targets
                    .iter()
                    .find(|t| t.display_name().eq_ignore_ascii_case(name))
            })
    }
}

/// Loads the configuration file from its resolved location
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /// Resolves the configuration path from [`CONFIG_ENV_VAR`] or the
    /// platform config directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoConfigDir`] when neither is available.
    pub fn new() -> ConfigResult<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|p| !p.is_empty()) {
            return Ok(Self::with_path(PathBuf::from(path)));
        }
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::with_path(dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME)))
    }

    /// Uses an explicit configuration file
    #[must_use]
    pub const fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path of the configuration file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the file. A missing file yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn load(&self) -> ConfigResult<ConfigFile> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => {
                let config = ConfigFile::parse(&text)?;
                tracing::debug!(
                    path = %self.path.display(),
                    targets = config.targets.len(),
                    "Configuration loaded"
                );
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No configuration file, using defaults");
                Ok(ConfigFile::default())
            }
            Err(e) => Err(ConfigError::Io(e)),
        }
    }
}
