//! Error types for `logtail`
//!
//! Each concern has its own `thiserror` enum and a matching result alias.

use thiserror::Error;
use uuid::Uuid;

/// Errors raised while talking to a remote target or decoding its output
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TailError {
    /// Transport or authentication failure while running a remote command
    #[error("{0}")]
    TargetUnreachable(String),

    /// The configured remote path does not exist
    #[error("Log file not found: {0}")]
    FileNotFound(String),

    /// The transferred encoding could not be decoded
    #[error("Malformed transfer encoding: {0}")]
    DecodeFailure(String),

    /// The remote command ran but exited with a failure status
    #[error("Remote command failed: {0}")]
    CommandFailed(String),

    /// The size probe did not print a decimal byte count
    #[error("Invalid size reported by remote: {0}")]
    InvalidSize(String),

    /// Target configuration is not usable
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
}

impl TailError {
    /// Returns true for transport-level failures (as opposed to file or data errors)
    #[must_use]
    pub const fn is_connection_error(&self) -> bool {
        matches!(self, Self::TargetUnreachable(_))
    }
}

/// Result type for remote tailing operations
pub type TailResult<T> = Result<T, TailError>;

/// Errors raised by the session registry
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry already holds the maximum number of sessions
    #[error("Maximum number of targets reached ({max})")]
    CapacityReached {
        /// Configured cap
        max: usize,
    },

    /// No session with this id is registered
    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    /// The operation failed on the remote side
    #[error(transparent)]
    Tail(#[from] TailError),
}

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors raised while loading the configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the file failed
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for the expected schema
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// No configuration directory could be determined
    #[error("Could not determine configuration directory")]
    NoConfigDir,

    /// A target entry failed validation
    #[error("Invalid target '{name}': {reason}")]
    InvalidTarget {
        /// Target name from the file
        name: String,
        /// Validation failure
        reason: String,
    },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
