//! In-memory remote host
//!
//! Serves files from a map and answers the exact command shapes the fetcher
//! issues, encoding reads the way GNU `base64` does (76-column lines).

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{TailError, TailResult};
use crate::fetch::{EXISTS_SENTINEL, NOT_FOUND_SENTINEL, RemoteCommand};

use super::RemoteExecutor;

/// Line width of GNU `base64` output
const BASE64_WRAP: usize = 76;

#[derive(Debug, Default)]
struct Host {
    files: HashMap<String, Vec<u8>>,
    commands: Vec<String>,
    scripted: VecDeque<TailResult<Vec<u8>>>,
}

/// A fake remote host holding files in memory
#[derive(Debug, Default)]
pub struct MemoryExecutor {
    host: Mutex<Host>,
    latency: Duration,
}

impl MemoryExecutor {
    /// Creates an empty host
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every response by `latency`
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn host(&self) -> MutexGuard<'_, Host> {
        self.host.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates or replaces a file
    pub fn set_file(&self, path: &str, contents: impl Into<Vec<u8>>) {
        self.host().files.insert(path.to_string(), contents.into());
    }

    /// Appends to a file, creating it when absent
    pub fn append(&self, path: &str, contents: impl AsRef<[u8]>) {
        self.host()
            .files
            .entry(path.to_string())
            .or_default()
            .extend_from_slice(contents.as_ref());
    }

    /// Deletes a file
    pub fn remove_file(&self, path: &str) {
        self.host().files.remove(path);
    }

    /// Current contents of a file
    #[must_use]
    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.host().files.get(path).cloned()
    }

    /// Answers the next command with `response` instead of interpreting it
    pub fn push_response(&self, response: TailResult<Vec<u8>>) {
        self.host().scripted.push_back(response);
    }

    /// Makes the next command fail as if the host were unreachable
    pub fn fail_next(&self, message: &str) {
        self.push_response(Err(TailError::TargetUnreachable(message.to_string())));
    }

    /// Every command received so far, in order
    #[must_use]
    pub fn commands(&self) -> Vec<String> {
        self.host().commands.clone()
    }

    /// Forgets the recorded commands
    pub fn clear_commands(&self) {
        self.host().commands.clear();
    }

    fn respond(&self, command: &str) -> TailResult<Vec<u8>> {
        let mut host = self.host();
        host.commands.push(command.to_string());
        if let Some(scripted) = host.scripted.pop_front() {
            return scripted;
        }

        let parsed = RemoteCommand::parse(command)
            .ok_or_else(|| TailError::CommandFailed(format!("unsupported command: {command}")))?;
        let missing =
            |path: &str| TailError::CommandFailed(format!("{path}: No such file or directory"));

        match parsed {
            RemoteCommand::Exists(path) => {
                let sentinel = if host.files.contains_key(&path) {
                    EXISTS_SENTINEL
                } else {
                    NOT_FOUND_SENTINEL
                };
                Ok(format!("{sentinel}\n").into_bytes())
            }
            RemoteCommand::Size(path) => {
                let file = host.files.get(&path).ok_or_else(|| missing(&path))?;
                Ok(format!("{}\n", file.len()).into_bytes())
            }
            RemoteCommand::ReadAll(path) => {
                let file = host.files.get(&path).ok_or_else(|| missing(&path))?;
                Ok(encode_wrapped(file))
            }
            RemoteCommand::ReadTail { path, bytes } => {
                let file = host.files.get(&path).ok_or_else(|| missing(&path))?;
                let start = file.len().saturating_sub(usize::try_from(bytes).unwrap_or(usize::MAX));
                Ok(encode_wrapped(&file[start..]))
            }
            RemoteCommand::Truncate(path) => {
                host.files
                    .get_mut(&path)
                    .ok_or_else(|| missing(&path))?
                    .clear();
                Ok(Vec::new())
            }
        }
    }
}

#[async_trait]
impl RemoteExecutor for MemoryExecutor {
    async fn execute(&self, command: &str) -> TailResult<Vec<u8>> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.respond(command)
    }
}

fn encode_wrapped(data: &[u8]) -> Vec<u8> {
    let encoded = STANDARD.encode(data);
    let mut out = Vec::with_capacity(encoded.len() + encoded.len() / BASE64_WRAP + 1);
    for chunk in encoded.as_bytes().chunks(BASE64_WRAP) {
        out.extend_from_slice(chunk);
        out.push(b'\n');
    }
    out
}
