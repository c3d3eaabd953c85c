//! Truncate remote log command.

use std::path::Path;

use crate::error::CliError;
use crate::util::{find_target, load_config, open_registry};

/// Truncate command handler
pub async fn cmd_truncate(config_path: Option<&Path>, name: &str) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let mut target = find_target(&config, name)?.clone();
    target.auto_connect = false;

    let (registry, _events) = open_registry(&config.settings, None);
    let session = registry.add_target(&target)?;
    registry.truncate_remote(session.id()).await?;

    println!("{}: {}", session.name(), session.status());
    Ok(())
}
