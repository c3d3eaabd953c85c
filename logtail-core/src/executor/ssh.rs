//! SSH command execution
//!
//! Runs commands on remote hosts via `ssh` (or `sshpass -e ssh` for
//! password-authenticated targets). Every command is its own `ssh` process;
//! with multiplexing enabled the processes share one master connection per
//! target through `ControlMaster`.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use tokio::process::Command;

use crate::config::SshSettings;
use crate::error::{TailError, TailResult};
use crate::models::{DEFAULT_SSH_PORT, Target};

use super::{RemoteExecutor, collect_output};

/// Exit status `ssh` uses for its own failures (as opposed to the remote command's)
const SSH_ERROR_STATUS: i32 = 255;

/// Executes commands on one target through the system `ssh` client
#[derive(Debug)]
pub struct SshExecutor {
    target: Target,
    settings: SshSettings,
    timeout: Duration,
    use_sshpass: bool,
}

impl SshExecutor {
    /// Creates an executor for `target`.
    ///
    /// `sshpass` availability is checked once here, not per command.
    #[must_use]
    pub fn new(target: Target, settings: SshSettings, timeout: Duration) -> Self {
        let use_sshpass = target.password.is_some() && sshpass_available();
        if target.password.is_some() && !use_sshpass {
            tracing::warn!(
                host = %target.host,
                "Password configured but sshpass is not installed, falling back to key authentication"
            );
        }
        Self {
            target,
            settings,
            timeout,
            use_sshpass,
        }
    }

    /// Target this executor talks to
    #[must_use]
    pub const fn target(&self) -> &Target {
        &self.target
    }

    /// Arguments passed to `ssh` (without the program name)
    #[must_use]
    pub fn ssh_args(&self, command: &str) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        let mut option = |value: String| {
            args.push("-o".into());
            args.push(value.into());
        };

        if !self.use_sshpass {
            // Batch mode only when NOT using password auth
            option("BatchMode=yes".to_string());
        }
        option(format!(
            "StrictHostKeyChecking={}",
            if self.settings.strict_host_key_checking {
                "yes"
            } else {
                "no"
            }
        ));
        option(format!(
            "ConnectTimeout={}",
            self.settings.connect_timeout_secs.max(1)
        ));
        if self.settings.multiplex {
            option("ControlMaster=auto".to_string());
            option(format!(
                "ControlPath={}",
                control_dir().join("logtail-%C").display()
            ));
            option(format!(
                "ControlPersist={}",
                self.settings.control_persist_secs
            ));
        }

        if self.target.port != DEFAULT_SSH_PORT {
            args.push("-p".into());
            args.push(self.target.port.to_string().into());
        }
        if let Some(ref key) = self.target.identity_file {
            args.push("-i".into());
            args.push(key.clone().into_os_string());
        }

        // end of options: the destination is never parsed as one
        args.push("--".into());
        args.push(self.target.destination().into());
        args.push(command.into());
        args
    }

    fn build_command(&self, command: &str) -> Command {
        let mut cmd = if self.use_sshpass {
            let mut cmd = Command::new("sshpass");
            cmd.arg("-e").arg("ssh");
            // sshpass reads SSHPASS with -e
            if let Some(ref password) = self.target.password {
                cmd.env("SSHPASS", password.expose_secret());
            }
            cmd
        } else {
            Command::new("ssh")
        };
        cmd.args(self.ssh_args(command))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl RemoteExecutor for SshExecutor {
    async fn execute(&self, command: &str) -> TailResult<Vec<u8>> {
        tracing::trace!(host = %self.target.host, command, "Running remote command");

        match tokio::time::timeout(self.timeout, self.build_command(command).output()).await {
            Ok(Ok(output)) => collect_output(output, Some(SSH_ERROR_STATUS)),
            Ok(Err(e)) => Err(TailError::TargetUnreachable(format!(
                "Failed to spawn SSH process: {e}"
            ))),
            Err(_) => Err(TailError::TargetUnreachable(format!(
                "SSH command timed out after {}s",
                self.timeout.as_secs()
            ))),
        }
    }
}

fn sshpass_available() -> bool {
    std::process::Command::new("sshpass")
        .arg("-V")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

/// Directory holding multiplexing control sockets
fn control_dir() -> PathBuf {
    dirs::runtime_dir().unwrap_or_else(std::env::temp_dir)
}
