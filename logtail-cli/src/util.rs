//! Shared utility functions used across command modules.

use std::path::Path;
use std::time::Duration;

use logtail_core::config::ConfigManager;
use logtail_core::{
    ConfigFile, MonitorEvent, SessionRegistry, TailSettings, TargetConfig,
    default_executor_factory,
};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::error::CliError;

/// Creates a `ConfigManager` using the optional config file from CLI args
pub fn create_config_manager(config_path: Option<&Path>) -> Result<ConfigManager, CliError> {
    match config_path {
        Some(path) => Ok(ConfigManager::with_path(path.to_path_buf())),
        None => ConfigManager::new()
            .map_err(|e| CliError::Config(format!("Failed to initialize config: {e}"))),
    }
}

/// Loads the configuration file
pub fn load_config(config_path: Option<&Path>) -> Result<ConfigFile, CliError> {
    let manager = create_config_manager(config_path)?;
    manager
        .load()
        .map_err(|e| CliError::Config(format!("Failed to load {}: {e}", manager.path().display())))
}

/// Builds a registry running real `ssh`/local executors.
///
/// `interval` overrides the configured polling interval.
pub fn open_registry(
    settings: &TailSettings,
    interval: Option<u8>,
) -> (SessionRegistry, UnboundedReceiver<MonitorEvent>) {
    let (registry, events) = SessionRegistry::new(settings, default_executor_factory(settings));
    match interval {
        Some(secs) => (
            registry.with_interval(Duration::from_secs(u64::from(secs))),
            events,
        ),
        None => (registry, events),
    }
}

/// Find a target by name, falling back to an unambiguous name prefix
pub fn find_target<'a>(config: &'a ConfigFile, name: &str) -> Result<&'a TargetConfig, CliError> {
    if let Some(target) = config.find_target(name) {
        return Ok(target);
    }

    let prefix = name.to_lowercase();
    let matches: Vec<_> = config
        .targets
        .iter()
        .filter(|t| t.display_name().to_lowercase().starts_with(&prefix))
        .collect();

    match matches.len() {
        0 => Err(CliError::TargetNotFound(name.to_string())),
        1 => Ok(matches[0]),
        _ => {
            let names: Vec<_> = matches.iter().map(|t| t.display_name()).collect();
            Err(CliError::Config(format!(
                "Ambiguous target name '{}'. Matches: {}",
                name,
                names.join(", ")
            )))
        }
    }
}
