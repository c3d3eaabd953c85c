//! Remote target description and its on-disk configuration form.

use std::path::PathBuf;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::{TailError, TailResult};

/// Default SSH port
pub const DEFAULT_SSH_PORT: u16 = 22;

/// How commands reach the machine holding the log file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Commands run through the system `ssh` client
    #[default]
    Ssh,
    /// Commands run through `sh -c` on this machine
    Local,
}

impl Transport {
    /// Returns the transport identifier as a lowercase string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ssh => "ssh",
            Self::Local => "local",
        }
    }
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ssh => write!(f, "SSH"),
            Self::Local => write!(f, "Local"),
        }
    }
}

/// One remote endpoint plus the log file watched on it.
///
/// Immutable for the duration of a monitoring run. Changing any field means
/// swapping the whole value and restarting the monitor loop.
#[derive(Debug, Clone)]
pub struct Target {
    /// Transport used to run commands
    pub transport: Transport,
    /// Remote hostname or IP
    pub host: String,
    /// Remote SSH port
    pub port: u16,
    /// Login user (the ssh client default applies when absent)
    pub user: Option<String>,
    /// Password handed to `sshpass`
    pub password: Option<SecretString>,
    /// Private key file
    pub identity_file: Option<PathBuf>,
    /// Absolute path of the log file on the remote host
    pub path: String,
}

impl Target {
    /// Creates an SSH target with default port and no credentials
    #[must_use]
    pub fn ssh(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            transport: Transport::Ssh,
            host: host.into(),
            port: DEFAULT_SSH_PORT,
            user: None,
            password: None,
            identity_file: None,
            path: path.into(),
        }
    }

    /// Creates a target for a file on this machine
    #[must_use]
    pub fn local(path: impl Into<String>) -> Self {
        Self {
            transport: Transport::Local,
            host: "localhost".to_string(),
            ..Self::ssh(String::new(), path)
        }
    }

    /// Sets the login user
    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Sets the port
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// True when both values address the same file. Credentials are ignored.
    #[must_use]
    pub fn same_endpoint(&self, other: &Self) -> bool {
        self.transport == other.transport
            && self.host == other.host
            && self.port == other.port
            && self.user == other.user
            && self.path == other.path
    }

    /// `user@host` or just `host`
    #[must_use]
    pub fn destination(&self) -> String {
        match self.user.as_deref() {
            Some(user) if !user.is_empty() => format!("{user}@{}", self.host),
            _ => self.host.clone(),
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.transport {
            Transport::Local => write!(f, "{}", self.path),
            Transport::Ssh => write!(f, "{}:{}:{}", self.destination(), self.port, self.path),
        }
    }
}

/// Display policy of a session, mutable at any time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayOptions {
    /// Drop lines whose content was already rendered
    pub filter_duplicates: bool,
    /// Prefix rendered lines with the render-time timestamp
    pub show_timestamp: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            filter_duplicates: false,
            show_timestamp: true,
        }
    }
}

/// A `[[targets]]` entry of the configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    /// Display name of the session (defaults to the file name)
    #[serde(default)]
    pub name: Option<String>,
    /// Transport used to run commands
    #[serde(default)]
    pub transport: Transport,
    /// Remote hostname or IP
    #[serde(default)]
    pub host: String,
    /// Remote SSH port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Login user
    #[serde(default)]
    pub user: Option<String>,
    /// Login password
    #[serde(default)]
    pub password: Option<SecretString>,
    /// Private key file, `~` is expanded
    #[serde(default)]
    pub identity_file: Option<String>,
    /// Log file path on the remote host
    pub path: String,
    /// Initial duplicate filtering flag
    #[serde(default)]
    pub filter_duplicates: bool,
    /// Initial timestamp flag
    #[serde(default = "default_true")]
    pub show_timestamp: bool,
    /// Start monitoring as soon as the target is added
    #[serde(default)]
    pub auto_connect: bool,
}

const fn default_port() -> u16 {
    DEFAULT_SSH_PORT
}

const fn default_true() -> bool {
    true
}

impl TargetConfig {
    /// Creates a config for an SSH target with defaults for everything else
    #[must_use]
    pub fn new(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: None,
            transport: Transport::Ssh,
            host: host.into(),
            port: DEFAULT_SSH_PORT,
            user: None,
            password: None,
            identity_file: None,
            path: path.into(),
            filter_duplicates: false,
            show_timestamp: true,
            auto_connect: false,
        }
    }

    /// Creates a config for a file on this machine
    #[must_use]
    pub fn local(path: impl Into<String>) -> Self {
        Self {
            transport: Transport::Local,
            ..Self::new("localhost", path)
        }
    }

    /// Sets the session name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the auto-connect flag
    #[must_use]
    pub const fn with_auto_connect(mut self, auto_connect: bool) -> Self {
        self.auto_connect = auto_connect;
        self
    }

    /// Sets the initial display flags
    #[must_use]
    pub const fn with_display(mut self, display: DisplayOptions) -> Self {
        self.filter_duplicates = display.filter_duplicates;
        self.show_timestamp = display.show_timestamp;
        self
    }

    /// Name shown for the session: the configured name or the file name
    #[must_use]
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.trim().to_string();
        }
        self.path
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or(&self.path)
            .to_string()
    }

    /// Initial display flags
    #[must_use]
    pub const fn display(&self) -> DisplayOptions {
        DisplayOptions {
            filter_duplicates: self.filter_duplicates,
            show_timestamp: self.show_timestamp,
        }
    }

    /// Checks that the entry describes a reachable file.
    ///
    /// # Errors
    ///
    /// Returns [`TailError::ConfigInvalid`] for an empty path, or for an SSH
    /// target with an empty host, port 0, or a host or user starting with `-`.
    pub fn validate(&self) -> TailResult<()> {
        if self.path.trim().is_empty() {
            return Err(TailError::ConfigInvalid("log file path is empty".into()));
        }
        if self.transport == Transport::Ssh {
            if self.host.trim().is_empty() {
                return Err(TailError::ConfigInvalid("host is empty".into()));
            }
            if self.port == 0 {
                return Err(TailError::ConfigInvalid("port must be 1-65535".into()));
            }
            // ssh would read these as options
            if self.host.trim().starts_with('-') {
                return Err(TailError::ConfigInvalid(format!(
                    "host must not start with '-': {}",
                    self.host.trim()
                )));
            }
            if self.user.as_deref().is_some_and(|u| u.starts_with('-')) {
                return Err(TailError::ConfigInvalid("user must not start with '-'".into()));
            }
        }
        Ok(())
    }

    /// Validates the entry and builds the runtime [`Target`].
    ///
    /// # Errors
    ///
    /// See [`Self::validate`].
    pub fn to_target(&self) -> TailResult<Target> {
        self.validate()?;
        Ok(Target {
            transport: self.transport,
            host: self.host.trim().to_string(),
            port: self.port,
            user: self.user.clone().filter(|u| !u.is_empty()),
            password: self.password.clone(),
            identity_file: self
                .identity_file
                .as_deref()
                .filter(|p| !p.is_empty())
                .map(|p| PathBuf::from(shellexpand::tilde(p).into_owned())),
            path: self.path.trim().to_string(),
        })
    }
}

/// Parses a port given as text.
///
/// # Errors
///
/// Returns [`TailError::ConfigInvalid`] when the text is not a number in 1-65535.
pub fn parse_port(value: &str) -> TailResult<u16> {
    match value.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(TailError::ConfigInvalid(format!(
            "port must be a number between 1 and 65535, got '{value}'"
        ))),
        Ok(port) => Ok(port),
    }
}
