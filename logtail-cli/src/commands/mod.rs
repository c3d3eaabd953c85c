//! Command handler modules for the CLI.

mod export;
mod fetch;
mod list;
mod tail;
mod truncate;
mod watch;

use std::path::Path;

use crate::cli::Commands;
use crate::error::CliError;

/// Dispatch a CLI command to the appropriate handler.
pub async fn dispatch(config_path: Option<&Path>, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::List => list::cmd_list(config_path),
        Commands::Watch {
            names,
            display,
            interval,
        } => watch::cmd_watch(config_path, &names, display, interval).await,
        Commands::Tail {
            host,
            port,
            user,
            identity,
            path,
            local,
            display,
            once,
            interval,
        } => {
            tail::cmd_tail(
                config_path,
                tail::TailParams {
                    host,
                    port,
                    user,
                    identity,
                    path,
                    local,
                    display,
                    once,
                    interval,
                },
            )
            .await
        }
        Commands::Fetch { name, display } => fetch::cmd_fetch(config_path, &name, display).await,
        Commands::Truncate { name } => truncate::cmd_truncate(config_path, &name).await,
        Commands::Export {
            name,
            output,
            force,
        } => export::cmd_export(config_path, &name, output.as_deref(), force).await,
    }
}
