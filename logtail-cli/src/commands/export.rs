//! Export command.

use std::path::{Path, PathBuf};

use chrono::Local;
use logtail_core::export::{default_file_name, render_session, write_export};

use crate::error::CliError;
use crate::util::{find_target, load_config, open_registry};

/// Export command handler
pub async fn cmd_export(
    config_path: Option<&Path>,
    name: &str,
    output: Option<&Path>,
    force: bool,
) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let mut target = find_target(&config, name)?.clone();
    target.auto_connect = false;

    let (registry, _events) = open_registry(&config.settings, None);
    let session = registry.add_target(&target)?;
    registry.manual_refresh(session.id()).await?;

    let now = Local::now();
    let document = render_session(&session, now);
    let dest = output.map_or_else(|| PathBuf::from(default_file_name(now)), Path::to_path_buf);
    let written = write_export(&dest, &document, force)?;

    tracing::info!(path = %written.display(), session = session.name(), "Export written");
    println!("Exported {} to {}", session.name(), written.display());
    Ok(())
}
