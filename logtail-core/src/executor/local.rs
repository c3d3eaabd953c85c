//! Local command execution through `sh -c`.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::DEFAULT_COMMAND_TIMEOUT_SECS;
use crate::error::{TailError, TailResult};

use super::{RemoteExecutor, collect_output};

/// Runs commands on this machine, so local files can be tailed through the
/// same protocol as remote ones
#[derive(Debug, Clone)]
pub struct LocalExecutor {
    timeout: Duration,
}

impl LocalExecutor {
    /// Creates an executor with the default command timeout
    #[must_use]
    pub const fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS))
    }

    /// Creates an executor with a custom command timeout
    #[must_use]
    pub const fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for LocalExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteExecutor for LocalExecutor {
    async fn execute(&self, command: &str) -> TailResult<Vec<u8>> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => collect_output(output, None),
            Ok(Err(e)) => Err(TailError::TargetUnreachable(format!(
                "Failed to spawn shell: {e}"
            ))),
            Err(_) => Err(TailError::TargetUnreachable(format!(
                "Command timed out after {}s",
                self.timeout.as_secs()
            ))),
        }
    }
}
