//! `logtail` CLI - Command-line front-end for the `logtail` engine
//!
//! Provides commands for listing configured targets, following them live,
//! one-shot fetches, remote truncation and plain-text export.

mod cli;
mod commands;
mod error;
mod util;

use clap::Parser;
use cli::Cli;
use logtail_core::tracing::{TracingConfig, TracingLevel, init_tracing};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let tracing_config = TracingConfig::new()
        .with_level(TracingLevel::from_verbosity(cli.verbose, cli.quiet))
        .with_ansi(!cli.no_color);
    if let Err(e) = init_tracing(&tracing_config) {
        eprintln!("Warning: failed to initialize logging: {e}");
    }

    let result = commands::dispatch(cli.config.as_deref(), cli.command).await;

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(e.exit_code());
    }
}
