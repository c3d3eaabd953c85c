//! List targets command.

use std::fmt::Write as _;
use std::path::Path;

use logtail_core::{TargetConfig, Transport};

use crate::error::CliError;
use crate::util::load_config;

/// List targets command handler
pub fn cmd_list(config_path: Option<&Path>) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    println!("{}", format_table(&config.targets));
    Ok(())
}

/// `user@host:port`, or `local` for files on this machine
fn endpoint(target: &TargetConfig) -> String {
    match target.transport {
        Transport::Local => Transport::Local.as_str().to_string(),
        Transport::Ssh => match target.user.as_deref().filter(|u| !u.is_empty()) {
            Some(user) => format!("{user}@{}:{}", target.host, target.port),
            None => format!("{}:{}", target.host, target.port),
        },
    }
}

fn flags(target: &TargetConfig) -> String {
    let mut flags = Vec::new();
    if target.filter_duplicates {
        flags.push("dedup");
    }
    if target.show_timestamp {
        flags.push("timestamps");
    }
    if target.auto_connect {
        flags.push("auto");
    }
    if flags.is_empty() {
        "-".to_string()
    } else {
        flags.join(",")
    }
}

/// Format targets as a table string
#[must_use]
pub fn format_table(targets: &[TargetConfig]) -> String {
    if targets.is_empty() {
        return "No targets configured.".to_string();
    }

    let rows: Vec<[String; 4]> = targets
        .iter()
        .map(|t| [t.display_name(), endpoint(t), t.path.clone(), flags(t)])
        .collect();

    let width = |col: usize, header: &str| {
        rows.iter()
            .map(|r| r[col].len())
            .max()
            .unwrap_or(0)
            .max(header.len())
    };
    let name_width = width(0, "NAME");
    let endpoint_width = width(1, "ENDPOINT");
    let path_width = width(2, "PATH");

    let mut output = String::new();
    let _ = writeln!(
        output,
        "{:<name_width$}  {:<endpoint_width$}  {:<path_width$}  FLAGS",
        "NAME", "ENDPOINT", "PATH"
    );
    let _ = writeln!(
        output,
        "{:-<name_width$}  {:-<endpoint_width$}  {:-<path_width$}  -----",
        "", "", ""
    );
    for [name, endpoint, path, flags] in &rows {
        let _ = writeln!(
            output,
            "{name:<name_width$}  {endpoint:<endpoint_width$}  {path:<path_width$}  {flags}"
        );
    }

    output.trim_end().to_string()
}
