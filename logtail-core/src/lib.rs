//! `logtail` Core Library
//!
//! Incremental tailing of log files on remote machines that can only be
//! reached by running shell commands. Each poll transfers just the bytes
//! appended since the previous one, then renders them through a line
//! pipeline that understands in-band clear markers, optional duplicate
//! filtering and render-time timestamps.
//!
//! # Crate Structure
//!
//! - [`executor`] - The command execution seam (`ssh`, local shell, in-memory)
//! - [`fetch`] - Delta retrieval over the executor
//! - [`pipeline`] - Control markers, timestamps, duplicate filtering
//! - [`session`] - Per-target state and the poll/apply cycle
//! - [`monitor`] - Background polling loops
//! - [`registry`] - Bounded session set and user operations
//! - [`config`] / [`models`] - Configuration file and target descriptions
//! - [`export`] - Plain-text export of a session

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod executor;
pub mod export;
pub mod fetch;
pub mod models;
pub mod monitor;
pub mod pipeline;
pub mod registry;
pub mod session;
pub mod tracing;

pub use config::{ConfigFile, ConfigManager, SshSettings, TailSettings};
pub use error::{ConfigError, ConfigResult, RegistryError, RegistryResult, TailError, TailResult};
pub use executor::{
    ExecutorFactory, LocalExecutor, MemoryExecutor, RemoteExecutor, SshExecutor,
    default_executor_factory, shared_executor_factory,
};
pub use export::{ExportError, ExportResult};
pub use fetch::{DeltaFetcher, FetchOutcome, FetchStatus};
pub use models::{DisplayOptions, Target, TargetConfig, Transport};
pub use monitor::{MonitorEvent, MonitorHandle, start_monitor};
pub use pipeline::{LinePipeline, ViewChange};
pub use registry::SessionRegistry;
pub use session::{Session, SessionState, SessionStatus};
