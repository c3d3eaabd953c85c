//! One-shot fetch command.

use std::io::Write as _;
use std::path::Path;

use logtail_core::{SessionRegistry, TargetConfig};

use crate::cli::DisplayArgs;
use crate::error::CliError;
use crate::util::{find_target, load_config, open_registry};

/// Fetch command handler
pub async fn cmd_fetch(
    config_path: Option<&Path>,
    name: &str,
    display: DisplayArgs,
) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let mut target = find_target(&config, name)?.clone();
    display.apply(&mut target);

    let (registry, _events) = open_registry(&config.settings, None);
    fetch_once(&registry, &target).await
}

/// Registers `target`, refreshes it once and prints the rendered view to
/// stdout and the status line to stderr
pub(super) async fn fetch_once(
    registry: &SessionRegistry,
    target: &TargetConfig,
) -> Result<(), CliError> {
    let mut target = target.clone();
    target.auto_connect = false;
    let session = registry.add_target(&target)?;

    let result = registry.manual_refresh(session.id()).await;
    let view = session.rendered_view();
    if !view.is_empty() {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(view.as_bytes())?;
        stdout.flush()?;
    }

    let status = session.status();
    eprintln!("{}: {status}", session.name());
    result?;
    Ok(())
}
