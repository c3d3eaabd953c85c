//! CLI error types and exit codes.

use logtail_core::{ConfigError, ExportError, RegistryError, TailError};

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - configuration, validation, or other non-connection errors
    pub const GENERAL_ERROR: i32 = 1;
    /// Connection failure - the target could not be reached
    pub const CONNECTION_FAILURE: i32 = 2;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Target not found in the configuration
    #[error("Target not found: {0}")]
    TargetNotFound(String),

    /// Target unreachable
    #[error("Connection error: {0}")]
    Connection(String),

    /// Remote read or command failure
    #[error("File read error: {0}")]
    Read(String),

    /// Export error
    #[error("Export error: {0}")]
    Export(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<TailError> for CliError {
    fn from(err: TailError) -> Self {
        match err {
            TailError::TargetUnreachable(msg) => Self::Connection(msg),
            TailError::ConfigInvalid(msg) => Self::Config(msg),
            other => Self::Read(other.to_string()),
        }
    }
}

impl From<RegistryError> for CliError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Tail(e) => e.into(),
            other => Self::Config(other.to_string()),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<ExportError> for CliError {
    fn from(err: ExportError) -> Self {
        Self::Export(err.to_string())
    }
}

impl CliError {
    /// Returns the appropriate exit code for this error type.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: General error (configuration, read, export, IO)
    /// - 2: Connection failure
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Connection(_) => exit_codes::CONNECTION_FAILURE,
            Self::Config(_)
            | Self::TargetNotFound(_)
            | Self::Read(_)
            | Self::Export(_)
            | Self::Io(_) => exit_codes::GENERAL_ERROR,
        }
    }
}
