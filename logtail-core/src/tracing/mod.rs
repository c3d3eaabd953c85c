//! Tracing subscriber setup
//!
//! The library only emits `tracing` events; front-ends call [`init_tracing`]
//! once at startup to decide where they go. `RUST_LOG` takes precedence over
//! the configured level.

use std::fs::File;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Errors raised while installing the subscriber
#[derive(Debug, Error)]
pub enum TracingError {
    /// A subscriber is already installed
    #[error("Tracing has already been initialized")]
    AlreadyInitialized,

    /// The filter directive does not parse
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter {
        /// Directive as given
        filter: String,
        /// Parser message
        reason: String,
    },

    /// The log file could not be opened
    #[error("Failed to create log file {path}: {source}")]
    LogFile {
        /// Requested path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The subscriber refused to install
    #[error("Failed to initialize tracing: {0}")]
    InitializationFailed(String),

    /// Unknown level name
    #[error("Unknown log level: {0}")]
    UnknownLevel(String),
}

/// Result type for tracing setup
pub type TracingResult<T> = Result<T, TracingError>;

/// Verbosity of the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum TracingLevel {
    /// Only errors
    Error,
    /// Unreachable targets, rotations
    #[default]
    Warn,
    /// Targets added, loops started and stopped
    Info,
    /// One line per poll
    Debug,
    /// Remote commands
    Trace,
}

impl TracingLevel {
    /// Lowercase directive name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// Maps `-v` counts and `-q` to a level
    #[must_use]
    pub const fn from_verbosity(verbose: u8, quiet: bool) -> Self {
        if quiet {
            return Self::Error;
        }
        match verbose {
            0 => Self::Warn,
            1 => Self::Info,
            2 => Self::Debug,
            _ => Self::Trace,
        }
    }
}

impl FromStr for TracingLevel {
    type Err = TracingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Self::Error,
            Self::Warn,
            Self::Info,
            Self::Debug,
            Self::Trace,
        ]
        .into_iter()
        .find(|level| level.as_str().eq_ignore_ascii_case(s))
        .or_else(|| s.eq_ignore_ascii_case("warning").then_some(Self::Warn))
        .ok_or_else(|| TracingError::UnknownLevel(s.to_string()))
    }
}

impl std::fmt::Display for TracingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where formatted events are written
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TracingOutput {
    /// Standard error, keeping stdout free for log content
    #[default]
    Stderr,
    /// A file, truncated on startup
    File {
        /// Path to the file
        path: PathBuf,
    },
}

/// Subscriber settings chosen by the front-end
#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Level for the `logtail` crates
    pub level: TracingLevel,
    /// Destination
    pub output: TracingOutput,
    /// Colorize stderr output
    pub ansi: bool,
    /// Full filter directive, replacing the level
    pub filter: Option<String>,
}

impl TracingConfig {
    /// Warn level on stderr without colors
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the level
    #[must_use]
    pub const fn with_level(mut self, level: TracingLevel) -> Self {
        self.level = level;
        self
    }

    /// Sets the destination
    #[must_use]
    pub fn with_output(mut self, output: TracingOutput) -> Self {
        self.output = output;
        self
    }

    /// Enables or disables ANSI colors on stderr
    #[must_use]
    pub const fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    /// Sets a full filter directive
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Directive applied when neither `RUST_LOG` nor a custom filter is set
    #[must_use]
    pub fn default_filter(&self) -> String {
        format!("logtail_core={0},logtail={0}", self.level)
    }

    fn env_filter(&self) -> TracingResult<EnvFilter> {
        if let Some(filter) = &self.filter {
            return EnvFilter::try_new(filter).map_err(|e| TracingError::InvalidFilter {
                filter: filter.clone(),
                reason: e.to_string(),
            });
        }
        Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_filter())))
    }

    fn writer(&self) -> TracingResult<(BoxMakeWriter, bool)> {
        match &self.output {
            TracingOutput::Stderr => Ok((BoxMakeWriter::new(std::io::stderr), self.ansi)),
            TracingOutput::File { path } => {
                let file = File::create(path).map_err(|source| TracingError::LogFile {
                    path: path.clone(),
                    source,
                })?;
                Ok((BoxMakeWriter::new(file), false))
            }
        }
    }
}

/// Installs the global subscriber. Only the first call succeeds.
///
/// # Errors
///
/// Returns [`TracingError::AlreadyInitialized`] on a second call, and the
/// filter, file or install error otherwise.
pub fn init_tracing(config: &TracingConfig) -> TracingResult<()> {
    if INSTALLED.swap(true, Ordering::SeqCst) {
        return Err(TracingError::AlreadyInitialized);
    }

    let installed = config.env_filter().and_then(|filter| {
        let (writer, ansi) = config.writer()?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_ansi(ansi)
                    .with_writer(writer),
            )
            .try_init()
            .map_err(|e| TracingError::InitializationFailed(e.to_string()))
    });
    if installed.is_err() {
        INSTALLED.store(false, Ordering::SeqCst);
    }
    installed?;

    tracing::debug!(level = %config.level, "Tracing initialized");
    Ok(())
}

/// True once [`init_tracing`] has succeeded
#[must_use]
pub fn is_tracing_initialized() -> bool {
    INSTALLED.load(Ordering::SeqCst)
}
