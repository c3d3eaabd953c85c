//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Follow log files on remote machines over `ssh`
#[derive(Parser)]
#[command(name = "logtail")]
#[command(author, version, about = "Incremental remote log tailing")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, env = "LOGTAIL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Display flags shared by the commands that render a session
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct DisplayArgs {
    /// Drop lines whose content was already shown
    #[arg(long)]
    pub filter_duplicates: bool,

    /// Do not prefix lines with the time they were received
    #[arg(long)]
    pub no_timestamp: bool,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// List configured targets
    #[command(about = "List the targets in the configuration file")]
    List,

    /// Monitor configured targets until interrupted
    #[command(about = "Follow one or more configured targets until Ctrl-C")]
    Watch {
        /// Target names (default: every configured target)
        names: Vec<String>,

        #[command(flatten)]
        display: DisplayArgs,

        /// Polling interval in seconds (1-60)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=60))]
        interval: Option<u8>,
    },

    /// Follow a file that is not in the configuration
    #[command(about = "Follow an ad hoc target given on the command line")]
    Tail {
        /// Remote host
        #[arg(short = 'H', long, required_unless_present = "local")]
        host: Option<String>,

        /// Remote SSH port
        #[arg(
            short,
            long,
            default_value_t = logtail_core::models::DEFAULT_SSH_PORT,
            value_parser = logtail_core::models::parse_port
        )]
        port: u16,

        /// Login user
        #[arg(short, long)]
        user: Option<String>,

        /// Private key file
        #[arg(short, long)]
        identity: Option<PathBuf>,

        /// Log file path on the remote host
        #[arg(long, required_unless_present = "local", conflicts_with = "local")]
        path: Option<String>,

        /// Follow a file on this machine instead
        #[arg(long, value_name = "FILE", conflicts_with_all = ["host", "user", "identity"])]
        local: Option<PathBuf>,

        #[command(flatten)]
        display: DisplayArgs,

        /// Refresh once, print the view and exit
        #[arg(long)]
        once: bool,

        /// Polling interval in seconds (1-60)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=60))]
        interval: Option<u8>,
    },

    /// Refresh a configured target once
    #[command(about = "Fetch a configured target once and print the result")]
    Fetch {
        /// Target name
        name: String,

        #[command(flatten)]
        display: DisplayArgs,
    },

    /// Truncate a remote log file
    #[command(about = "Empty the log file on the remote host")]
    Truncate {
        /// Target name
        name: String,
    },

    /// Export a target to a text file
    #[command(about = "Fetch a configured target and write it to a text file")]
    Export {
        /// Target name
        name: String,

        /// Output file (default: log_export_<timestamp>.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

impl DisplayArgs {
    /// Applies the flags on top of a configured target's own flags
    pub fn apply(self, config: &mut logtail_core::TargetConfig) {
        if self.filter_duplicates {
            config.filter_duplicates = true;
        }
        if self.no_timestamp {
            config.show_timestamp = false;
        }
    }
}
