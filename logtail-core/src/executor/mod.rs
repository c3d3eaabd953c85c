//! Remote command execution
//!
//! The engine only needs one capability from the outside world: run a shell
//! command against a target and hand back its stdout. [`RemoteExecutor`] is
//! that seam. [`SshExecutor`] drives the system `ssh` client,
//! [`LocalExecutor`] runs commands on this machine, and [`MemoryExecutor`]
//! serves files from memory for tests.

mod local;
mod memory;
mod ssh;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::TailSettings;
use crate::error::TailResult;
use crate::models::{Target, Transport};

pub use local::LocalExecutor;
pub use memory::MemoryExecutor;
pub use ssh::SshExecutor;

/// Runs one command string against a fixed target
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// Executes `command` and returns its raw stdout.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::TailError::TargetUnreachable`] when the
    /// command could not be delivered, and
    /// [`crate::error::TailError::CommandFailed`] when it ran but failed.
    async fn execute(&self, command: &str) -> TailResult<Vec<u8>>;
}

#[async_trait]
impl<T: RemoteExecutor + ?Sized> RemoteExecutor for Arc<T> {
    async fn execute(&self, command: &str) -> TailResult<Vec<u8>> {
        (**self).execute(command).await
    }
}

/// Builds an executor for a target. The registry calls this every time a
/// monitor starts so a changed target gets a fresh executor.
pub type ExecutorFactory = Arc<dyn Fn(&Target) -> Arc<dyn RemoteExecutor> + Send + Sync>;

/// Factory choosing [`SshExecutor`] or [`LocalExecutor`] by the target's transport
#[must_use]
pub fn default_executor_factory(settings: &TailSettings) -> ExecutorFactory {
    let ssh_settings = settings.ssh.clone();
    let timeout: Duration = settings.command_timeout();
    Arc::new(move |target: &Target| -> Arc<dyn RemoteExecutor> {
        match target.transport {
            Transport::Ssh => Arc::new(SshExecutor::new(
                target.clone(),
                ssh_settings.clone(),
                timeout,
            )),
            Transport::Local => Arc::new(LocalExecutor::with_timeout(timeout)),
        }
    })
}

/// Factory that hands every target the same executor
#[must_use]
pub fn shared_executor_factory(executor: Arc<dyn RemoteExecutor>) -> ExecutorFactory {
    Arc::new(move |_: &Target| Arc::clone(&executor))
}

/// Shared handling of a finished child process
pub(crate) fn collect_output(
    output: std::process::Output,
    unreachable_status: Option<i32>,
) -> TailResult<Vec<u8>> {
    use crate::error::TailError;

    if output.status.success() {
        return Ok(output.stdout);
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    let message = format!("{} ({})", stderr.trim(), output.status);
    if unreachable_status.is_some() && output.status.code() == unreachable_status {
        Err(TailError::TargetUnreachable(message))
    } else {
        Err(TailError::CommandFailed(message))
    }
}
