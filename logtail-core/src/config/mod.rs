//! Configuration management for `logtail`
//!
//! This module provides the `ConfigManager` for loading the TOML
//! configuration file and the settings it carries.

mod manager;
pub mod settings;

pub use manager::{APP_DIR_NAME, CONFIG_ENV_VAR, CONFIG_FILE_NAME, ConfigFile, ConfigManager};
pub use settings::{
    DEFAULT_COMMAND_TIMEOUT_SECS, DEFAULT_IGNORE_PATTERN, DEFAULT_INTERVAL_SECS,
    DEFAULT_MAX_TARGETS, SshSettings, TailSettings,
};
