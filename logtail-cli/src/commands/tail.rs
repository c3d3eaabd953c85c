//! Ad hoc tail command.

use std::path::{Path, PathBuf};

use logtail_core::TargetConfig;
use logtail_core::models::DisplayOptions;

use super::fetch::fetch_once;
use super::watch::follow;
use crate::cli::DisplayArgs;
use crate::error::CliError;
use crate::util::{load_config, open_registry};

/// Parameters for the tail command
pub struct TailParams {
    pub host: Option<String>,
    pub port: u16,
    pub user: Option<String>,
    pub identity: Option<PathBuf>,
    pub path: Option<String>,
    pub local: Option<PathBuf>,
    pub display: DisplayArgs,
    pub once: bool,
    pub interval: Option<u8>,
}

impl TailParams {
    /// Builds the target described by the flags
    fn to_target_config(&self) -> Result<TargetConfig, CliError> {
        let mut target = if let Some(ref local) = self.local {
            TargetConfig::local(local.to_string_lossy())
        } else {
            let host = self
                .host
                .clone()
                .ok_or_else(|| CliError::Config("--host is required".into()))?;
            let path = self
                .path
                .clone()
                .ok_or_else(|| CliError::Config("--path is required".into()))?;
            let mut target = TargetConfig::new(host, path);
            target.port = self.port;
            target.user.clone_from(&self.user);
            target.identity_file = self
                .identity
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned());
            target
        };

        target = target.with_display(DisplayOptions {
            filter_duplicates: self.display.filter_duplicates,
            show_timestamp: !self.display.no_timestamp,
        });
        target.validate()?;
        Ok(target)
    }
}

/// Tail command handler
pub async fn cmd_tail(config_path: Option<&Path>, params: TailParams) -> Result<(), CliError> {
    let target = params.to_target_config()?;
    let settings = load_config(config_path)?.settings;
    let (registry, events) = open_registry(&settings, params.interval);

    if params.once {
        return fetch_once(&registry, &target).await;
    }

    let session = registry.add_target(&target)?;
    follow(registry, events, vec![session]).await
}
