//! Watch command: follow targets until Ctrl-C.

use std::collections::HashMap;
use std::io::Write as _;
use std::path::Path;
use std::sync::Arc;

use logtail_core::{MonitorEvent, Session, SessionRegistry, SessionStatus};
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

use crate::cli::DisplayArgs;
use crate::error::CliError;
use crate::util::{find_target, load_config, open_registry};

/// Watch command handler
pub async fn cmd_watch(
    config_path: Option<&Path>,
    names: &[String],
    display: DisplayArgs,
    interval: Option<u8>,
) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let selected = if names.is_empty() {
        config.targets.iter().collect::<Vec<_>>()
    } else {
        names
            .iter()
            .map(|name| find_target(&config, name))
            .collect::<Result<Vec<_>, _>>()?
    };
    if selected.is_empty() {
        return Err(CliError::Config("No targets configured".into()));
    }

    let (registry, events) = open_registry(&config.settings, interval);
    let mut sessions = Vec::with_capacity(selected.len());
    for target in selected {
        let mut target = target.clone();
        display.apply(&mut target);
        target.auto_connect = false;
        sessions.push(registry.add_target(&target)?);
    }

    follow(registry, events, sessions).await
}

/// Starts every session and prints their events until Ctrl-C
pub(super) async fn follow(
    registry: SessionRegistry,
    mut events: UnboundedReceiver<MonitorEvent>,
    sessions: Vec<Arc<Session>>,
) -> Result<(), CliError> {
    let mut printer = EventPrinter::new(&sessions);
    for session in &sessions {
        registry.start(session.id())?;
    }
    tracing::info!(targets = sessions.len(), interval = ?registry.interval(), "Watching");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                result?;
                break;
            }
            event = events.recv() => {
                let Some(event) = event else { break };
                printer.print(&event)?;
            }
        }
    }

    registry.shutdown().await;
    Ok(())
}

/// Writes rendered lines to stdout and status changes to stderr
struct EventPrinter {
    names: HashMap<Uuid, String>,
    prefixed: bool,
    last_status: HashMap<Uuid, (bool, String)>,
}

impl EventPrinter {
    fn new(sessions: &[Arc<Session>]) -> Self {
        Self {
            names: sessions
                .iter()
                .map(|s| (s.id(), s.name().to_string()))
                .collect(),
            prefixed: sessions.len() > 1,
            last_status: HashMap::new(),
        }
    }

    fn name(&self, id: Uuid) -> &str {
        self.names.get(&id).map_or("?", String::as_str)
    }

    fn format_line(&self, id: Uuid, line: &str) -> String {
        if self.prefixed {
            format!("{} | {line}", self.name(id))
        } else {
            line.to_string()
        }
    }

    /// Returns the text to print on stderr when the status differs from the
    /// previous one of the same session
    fn status_change(&mut self, id: Uuid, status: &SessionStatus) -> Option<String> {
        let key = (status.connected, status.message.clone());
        if self.last_status.get(&id) == Some(&key) {
            return None;
        }
        self.last_status.insert(id, key);
        Some(format!("[{}] {status}", self.name(id)))
    }

    fn print(&mut self, event: &MonitorEvent) -> std::io::Result<()> {
        match event {
            MonitorEvent::Appended { session, lines } => {
                let mut stdout = std::io::stdout().lock();
                for line in lines {
                    writeln!(stdout, "{}", self.format_line(*session, line))?;
                }
                stdout.flush()?;
            }
            MonitorEvent::Replaced { session, view } => {
                eprintln!("[{}] view cleared", self.name(*session));
                let mut stdout = std::io::stdout().lock();
                for line in view.lines() {
                    writeln!(stdout, "{}", self.format_line(*session, line))?;
                }
                stdout.flush()?;
            }
            MonitorEvent::Status { session, status } => {
                if let Some(text) = self.status_change(*session, status) {
                    eprintln!("{text}");
                }
            }
            MonitorEvent::Stopped { session } => {
                tracing::debug!(session = %session, name = self.name(*session), "Monitor stopped");
            }
        }
        Ok(())
    }
}
