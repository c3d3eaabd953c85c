//! Per-target mutable state.

use std::collections::HashSet;

use chrono::{DateTime, Local};

use crate::error::TailError;
use crate::fetch::FetchStatus;
use crate::models::DisplayOptions;
use crate::pipeline::timestamp::TIMESTAMP_FORMAT;

/// Connection state plus the last status message of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    /// Whether the last interaction with the target succeeded at transport level
    pub connected: bool,
    /// Last status message ("Updated", "No changes", ...)
    pub message: String,
    /// When the status was last set
    pub last_update: Option<DateTime<Local>>,
}

impl SessionStatus {
    /// Initial status of a session that has never polled
    #[must_use]
    pub fn disconnected() -> Self {
        Self {
            connected: false,
            message: String::new(),
            last_update: None,
        }
    }

    /// Creates a status stamped with `now`
    #[must_use]
    pub fn new(connected: bool, message: impl Into<String>, now: DateTime<Local>) -> Self {
        Self {
            connected,
            message: message.into(),
            last_update: Some(now),
        }
    }

    /// Status after a successful poll
    #[must_use]
    pub fn from_fetch(status: FetchStatus, now: DateTime<Local>) -> Self {
        let message = match status {
            FetchStatus::Updated => "Updated",
            FetchStatus::NoChanges => "No changes",
            FetchStatus::Rotated => "Log rotated, reloaded",
        };
        Self::new(true, message, now)
    }

    /// Status after a failed poll
    #[must_use]
    pub fn from_error(error: &TailError, now: DateTime<Local>) -> Self {
        match error {
            TailError::FileNotFound(_) => Self::new(true, "Log file not found", now),
            TailError::TargetUnreachable(msg) => {
                Self::new(false, format!("Connection error: {msg}"), now)
            }
            TailError::ConfigInvalid(msg) => {
                Self::new(false, format!("Configuration error: {msg}"), now)
            }
            TailError::CommandFailed(_)
            | TailError::DecodeFailure(_)
            | TailError::InvalidSize(_) => Self::new(false, format!("File read error: {error}"), now),
        }
    }

    /// "Last Update: YYYY-MM-DD HH:mm:ss", empty before the first update
    #[must_use]
    pub fn last_update_text(&self) -> String {
        self.last_update
            .map(|t| format!("Last Update: {}", t.format(TIMESTAMP_FORMAT)))
            .unwrap_or_default()
    }
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self::disconnected()
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = if self.connected {
            "Connected"
        } else {
            "Disconnected"
        };
        if self.message.is_empty() {
            write!(f, "{state}")
        } else {
            write!(f, "{state} - {}", self.message)
        }
    }
}

/// Buffers, offset and display policy of one target.
///
/// Mutated by the monitor loop and by user operations; callers serialize
/// access through the owning [`super::Session`].
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Bytes of the remote file already consumed
    pub(crate) offset: u64,
    /// Content of lines already rendered, used only while filtering duplicates
    pub(crate) seen_lines: HashSet<String>,
    /// Timestamped reconstruction of everything rendered
    pub(crate) raw_buffer: String,
    /// What is currently shown
    pub(crate) rendered_view: String,
    /// Display policy
    pub(crate) display: DisplayOptions,
    /// Bumped by every clear; a fetch started under an older generation is discarded
    pub(crate) generation: u64,
    /// Last status
    pub(crate) status: SessionStatus,
    /// Whether a monitor loop is bound to this state
    pub(crate) running: bool,
}

impl SessionState {
    /// Creates an empty state with the given display policy
    #[must_use]
    pub fn new(display: DisplayOptions) -> Self {
        Self {
            display,
            ..Self::default()
        }
    }

    /// Bytes of the remote file already consumed
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Timestamped reconstruction of all rendered content
    #[must_use]
    pub fn raw_buffer(&self) -> &str {
        &self.raw_buffer
    }

    /// Currently rendered text
    #[must_use]
    pub fn rendered_view(&self) -> &str {
        &self.rendered_view
    }

    /// Rendered lines without their newlines
    #[must_use]
    pub fn rendered_lines(&self) -> Vec<&str> {
        self.rendered_view.lines().collect()
    }

    /// Number of distinct contents remembered for duplicate filtering
    #[must_use]
    pub fn seen_count(&self) -> usize {
        self.seen_lines.len()
    }

    /// Display policy
    #[must_use]
    pub const fn display(&self) -> DisplayOptions {
        self.display
    }

    /// Replaces the display policy. The view is not regenerated; run
    /// [`crate::pipeline::LinePipeline::reprocess`] afterwards.
    pub const fn set_display(&mut self, display: DisplayOptions) {
        self.display = display;
    }

    /// Clear generation
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Last status
    #[must_use]
    pub const fn status(&self) -> &SessionStatus {
        &self.status
    }

    /// Whether a monitor loop is bound to this state
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Drops all buffered content and rewinds the offset to 0
    pub fn reset(&mut self) {
        self.raw_buffer.clear();
        self.rendered_view.clear();
        self.seen_lines.clear();
        self.offset = 0;
        self.generation = self.generation.wrapping_add(1);
    }
}
