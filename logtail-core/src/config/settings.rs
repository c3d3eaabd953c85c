//! Engine settings
//!
//! Stored in `config.toml` under `[settings]`. Every field has a default so an
//! empty or partial section is valid.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default polling interval in seconds
pub const DEFAULT_INTERVAL_SECS: u8 = 2;

/// Default cap on concurrently registered targets
pub const DEFAULT_MAX_TARGETS: usize = 100;

/// Default timeout for a single remote command in seconds
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 30;

/// Diagnostic line that is dropped unless the ignore list is overridden
pub const DEFAULT_IGNORE_PATTERN: &str = "JNI_OnLoad called";

/// Global tailing settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TailSettings {
    /// Polling interval in seconds (1–60, default: 2)
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u8,
    /// Maximum number of registered targets (default: 100)
    #[serde(default = "default_max_targets")]
    pub max_targets: usize,
    /// Lines containing any of these substrings are dropped
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,
    /// Timeout for one remote command in seconds
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
    /// SSH client options
    #[serde(default)]
    pub ssh: SshSettings,
}

const fn default_interval_secs() -> u8 {
    DEFAULT_INTERVAL_SECS
}

const fn default_max_targets() -> usize {
    DEFAULT_MAX_TARGETS
}

const fn default_command_timeout_secs() -> u64 {
    DEFAULT_COMMAND_TIMEOUT_SECS
}

fn default_ignore_patterns() -> Vec<String> {
    vec![DEFAULT_IGNORE_PATTERN.to_string()]
}

impl Default for TailSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            max_targets: default_max_targets(),
            ignore_patterns: default_ignore_patterns(),
            command_timeout_secs: default_command_timeout_secs(),
            ssh: SshSettings::default(),
        }
    }
}

impl TailSettings {
    /// Returns the interval clamped to the valid range (1–60 seconds)
    #[must_use]
    pub const fn effective_interval_secs(&self) -> u8 {
        if self.interval_secs == 0 {
            1
        } else if self.interval_secs > 60 {
            60
        } else {
            self.interval_secs
        }
    }

    /// Polling interval as a [`Duration`]
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.effective_interval_secs()))
    }

    /// Per-command timeout as a [`Duration`], at least one second
    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs.max(1))
    }
}

/// Options passed to the `ssh` client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SshSettings {
    /// Value of `StrictHostKeyChecking` (`false` means `no`)
    #[serde(default)]
    pub strict_host_key_checking: bool,
    /// Value of `ConnectTimeout` in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u32,
    /// Keep one master connection per target and reuse it across commands
    #[serde(default)]
    pub multiplex: bool,
    /// How long an idle master connection stays open
    #[serde(default = "default_control_persist_secs")]
    pub control_persist_secs: u32,
}

const fn default_connect_timeout_secs() -> u32 {
    30
}

const fn default_control_persist_secs() -> u32 {
    60
}

impl Default for SshSettings {
    fn default() -> Self {
        Self {
            strict_host_key_checking: false,
            connect_timeout_secs: default_connect_timeout_secs(),
            multiplex: false,
            control_persist_secs: default_control_persist_secs(),
        }
    }
}
