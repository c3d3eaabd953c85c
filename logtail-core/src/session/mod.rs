//! Monitored sessions
//!
//! A [`Session`] binds one [`Target`] to its [`SessionState`]. The state sits
//! behind a synchronous mutex that is only held for short, non-awaiting
//! sections, so the monitor loop and user operations never observe a
//! half-applied poll. Polls themselves are serialized by an async guard.

mod state;

use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};

use chrono::Local;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use crate::error::TailResult;
use crate::executor::RemoteExecutor;
use crate::fetch::{DeltaFetcher, FetchStatus, RemoteCommand};
use crate::models::{DisplayOptions, Target};
use crate::monitor::{MonitorEvent, MonitorHandle};
use crate::pipeline::{LinePipeline, ViewChange};

pub use state::{SessionState, SessionStatus};

/// One monitored log file
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    name: String,
    target: RwLock<Target>,
    state: Mutex<SessionState>,
    poll_guard: tokio::sync::Mutex<()>,
    monitor: Mutex<Option<MonitorHandle>>,
}

impl Session {
    /// Creates a stopped session with empty buffers
    #[must_use]
    pub fn new(name: impl Into<String>, target: Target, display: DisplayOptions) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            target: RwLock::new(target),
            state: Mutex::new(SessionState::new(display)),
            poll_guard: tokio::sync::Mutex::new(()),
            monitor: Mutex::new(None),
        }
    }

    /// Session id
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Display name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current target
    #[must_use]
    pub fn target(&self) -> Target {
        self.target
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` against the locked state
    pub fn with_state<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        f(&self.lock_state())
    }

    /// Copy of the raw buffer
    #[must_use]
    pub fn raw_buffer(&self) -> String {
        self.lock_state().raw_buffer.clone()
    }

    /// Copy of the rendered view
    #[must_use]
    pub fn rendered_view(&self) -> String {
        self.lock_state().rendered_view.clone()
    }

    /// Last status
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.lock_state().status.clone()
    }

    /// Bytes of the remote file consumed so far
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.lock_state().offset
    }

    /// Current display flags
    #[must_use]
    pub fn display(&self) -> DisplayOptions {
        self.lock_state().display
    }

    /// Whether a monitor loop is attached
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.lock_state().running
    }

    /// Performs one fetch and applies it.
    ///
    /// The state lock is released while the remote commands run. If the
    /// session was cleared in the meantime the fetched bytes are dropped,
    /// since they were read against an offset that no longer exists, and
    /// [`FetchStatus::NoChanges`] is returned.
    ///
    /// # Errors
    ///
    /// Returns the fetch error after recording it in the session status.
    pub async fn poll(
        &self,
        executor: &dyn RemoteExecutor,
        pipeline: &LinePipeline,
        events: &UnboundedSender<MonitorEvent>,
    ) -> TailResult<FetchStatus> {
        let _guard = self.poll_guard.lock().await;

        let path = self.target().path;
        let (offset, generation) = {
            let state = self.lock_state();
            (state.offset, state.generation)
        };

        let result = DeltaFetcher::new().fetch(executor, &path, offset).await;
        let now = Local::now();

        let mut state = self.lock_state();
        if state.generation != generation {
            tracing::debug!(session = %self.id, "Session cleared during fetch, discarding result");
            // nothing was applied, so callers must not report an update
            return result.map(|_| FetchStatus::NoChanges);
        }

        match result {
            Ok(outcome) => {
                if !outcome.bytes.is_empty() {
                    let text = String::from_utf8_lossy(&outcome.bytes);
                    let change = pipeline.process(&mut state, &text, true, now);
                    self.emit_change(events, change);
                }
                state.offset = outcome.new_offset;
                state.status = SessionStatus::from_fetch(outcome.status, now);
                self.emit_status(events, &state.status);
                Ok(outcome.status)
            }
            Err(err) => {
                if err.is_connection_error() {
                    tracing::warn!(session = %self.id, error = %err, "Poll failed");
                } else {
                    tracing::debug!(session = %self.id, error = %err, "Poll failed");
                }
                state.status = SessionStatus::from_error(&err, now);
                self.emit_status(events, &state.status);
                Err(err)
            }
        }
    }

    /// Drops all local content and rewinds the offset.
    ///
    /// The next poll reads the remote file from the start.
    pub fn clear(&self, events: &UnboundedSender<MonitorEvent>) {
        let mut state = self.lock_state();
        state.reset();
        self.emit_change(events, ViewChange::Replaced(String::new()));
    }

    /// Empties the remote file, then clears local state
    ///
    /// # Errors
    ///
    /// Returns the executor error; local state is left untouched in that case.
    pub async fn truncate_remote(
        &self,
        executor: &dyn RemoteExecutor,
        events: &UnboundedSender<MonitorEvent>,
    ) -> TailResult<()> {
        let _guard = self.poll_guard.lock().await;

        let path = self.target().path;
        let result = executor
            .execute(&RemoteCommand::Truncate(path).render())
            .await;
        let now = Local::now();

        let mut state = self.lock_state();
        match result {
            Ok(_) => {
                state.reset();
                state.status = SessionStatus::new(true, "Log cleared", now);
                tracing::info!(session = %self.id, "Remote log truncated");
                self.emit_change(events, ViewChange::Replaced(String::new()));
                self.emit_status(events, &state.status);
                Ok(())
            }
            Err(err) => {
                state.status = SessionStatus::new(
                    !err.is_connection_error(),
                    format!("Error clearing log: {err}"),
                    now,
                );
                self.emit_status(events, &state.status);
                Err(err)
            }
        }
    }

    /// Changes the display flags and regenerates the view when they differ
    pub fn set_display(
        &self,
        display: DisplayOptions,
        pipeline: &LinePipeline,
        events: &UnboundedSender<MonitorEvent>,
    ) {
        let mut state = self.lock_state();
        if state.display == display {
            return;
        }
        state.set_display(display);
        let change = pipeline.reprocess(&mut state, Local::now());
        self.emit_change(events, change);
    }

    /// Swaps the target. Returns true when the connection fields changed,
    /// in which case local content is cleared as it belongs to another file.
    pub fn set_target(&self, target: Target, events: &UnboundedSender<MonitorEvent>) -> bool {
        let changed = {
            let mut current = self.target.write().unwrap_or_else(PoisonError::into_inner);
            let changed = !current.same_endpoint(&target);
            *current = target;
            changed
        };
        if changed {
            self.clear(events);
        }
        changed
    }

    /// Stores a monitor handle, stopping any loop it replaces
    pub(crate) fn attach_monitor(&self, handle: MonitorHandle) {
        let previous = self
            .monitor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.stop();
        }
        self.lock_state().running = true;
    }

    /// Takes the monitor handle out of the session
    pub(crate) fn detach_monitor(&self) -> Option<MonitorHandle> {
        let handle = self
            .monitor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.lock_state().running = false;
        handle
    }

    fn emit_change(&self, events: &UnboundedSender<MonitorEvent>, change: ViewChange) {
        if let Some(event) = MonitorEvent::from_change(self.id, change) {
            // receiver gone means nobody renders anymore
            let _ = events.send(event);
        }
    }

    fn emit_status(&self, events: &UnboundedSender<MonitorEvent>, status: &SessionStatus) {
        let _ = events.send(MonitorEvent::Status {
            session: self.id,
            status: status.clone(),
        });
    }
}
