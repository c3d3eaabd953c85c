//! Registry of monitored sessions
//!
//! Owns every [`Session`], the shared [`LinePipeline`] and the sending half
//! of the event channel. All user operations go through here so that starting,
//! stopping and restarting monitor loops stays consistent with the session
//! list.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::config::TailSettings;
use crate::error::{RegistryError, RegistryResult};
use crate::executor::{ExecutorFactory, RemoteExecutor};
use crate::fetch::FetchStatus;
use crate::models::TargetConfig;
use crate::monitor::{MonitorEvent, MonitorHandle, start_monitor};
use crate::pipeline::LinePipeline;
use crate::session::{Session, SessionStatus};

/// Bounded set of sessions with their monitor loops
pub struct SessionRegistry {
    sessions: RwLock<Vec<Arc<Session>>>,
    max_targets: usize,
    interval: Duration,
    pipeline: Arc<LinePipeline>,
    executor_factory: ExecutorFactory,
    events: mpsc::UnboundedSender<MonitorEvent>,
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &self.len())
            .field("max_targets", &self.max_targets)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

impl SessionRegistry {
    /// Creates an empty registry and the receiver all session events go to
    #[must_use]
    pub fn new(
        settings: &TailSettings,
        executor_factory: ExecutorFactory,
    ) -> (Self, mpsc::UnboundedReceiver<MonitorEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let registry = Self {
            sessions: RwLock::new(Vec::new()),
            max_targets: settings.max_targets,
            interval: settings.interval(),
            pipeline: Arc::new(LinePipeline::new(settings.ignore_patterns.iter().cloned())),
            executor_factory,
            events,
        };
        (registry, rx)
    }

    /// Overrides the polling interval for loops started afterwards
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Polling interval of new loops
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Arc<Session>>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Arc<Session>>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn executor_for(&self, session: &Session) -> Arc<dyn RemoteExecutor> {
        (self.executor_factory)(&session.target())
    }

    /// Registers a target and starts it when `auto_connect` is set.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Tail`] when the config does not validate
    /// - [`RegistryError::CapacityReached`] when the registry is full; the
    ///   registry is left unchanged
    pub fn add_target(&self, config: &TargetConfig) -> RegistryResult<Arc<Session>> {
        let target = config.to_target()?;
        let session = {
            let mut sessions = self.write();
            if sessions.len() >= self.max_targets {
                tracing::warn!(max = self.max_targets, "Target rejected, registry is full");
                return Err(RegistryError::CapacityReached {
                    max: self.max_targets,
                });
            }
            let session = Arc::new(Session::new(config.display_name(), target, config.display()));
            sessions.push(Arc::clone(&session));
            session
        };

        tracing::info!(session = %session.id(), name = session.name(), target = %session.target(), "Target added");
        if config.auto_connect {
            self.start(session.id())?;
        }
        Ok(session)
    }

    /// Stops and unregisters a session
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::SessionNotFound`] for an unknown id.
    pub fn remove_target(&self, id: Uuid) -> RegistryResult<Arc<Session>> {
        let session = {
            let mut sessions = self.write();
            let index = sessions
                .iter()
                .position(|s| s.id() == id)
                .ok_or(RegistryError::SessionNotFound(id))?;
            sessions.remove(index)
        };
        if let Some(handle) = session.detach_monitor() {
            handle.stop();
        }
        tracing::info!(session = %id, "Target removed");
        Ok(session)
    }

    /// Looks a session up by id
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::SessionNotFound`] for an unknown id.
    pub fn get(&self, id: Uuid) -> RegistryResult<Arc<Session>> {
        self.read()
            .iter()
            .find(|s| s.id() == id)
            .cloned()
            .ok_or(RegistryError::SessionNotFound(id))
    }

    /// First session with the given name
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<Arc<Session>> {
        self.read().iter().find(|s| s.name() == name).cloned()
    }

    /// All sessions in insertion order
    #[must_use]
    pub fn list(&self) -> Vec<Arc<Session>> {
        self.read().clone()
    }

    /// Number of registered sessions
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// True when no session is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Starts (or restarts) the monitor loop of a session.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::SessionNotFound`] for an unknown id.
    pub fn start(&self, id: Uuid) -> RegistryResult<()> {
        let session = self.get(id)?;
        if let Some(previous) = session.detach_monitor() {
            tracing::debug!(session = %id, "Restarting monitor");
            previous.stop();
        }
        let handle = start_monitor(
            Arc::clone(&session),
            self.executor_for(&session),
            Arc::clone(&self.pipeline),
            self.interval,
            self.events.clone(),
        );
        session.attach_monitor(handle);
        Ok(())
    }

    /// Stops the monitor loop of a session, if any
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::SessionNotFound`] for an unknown id.
    pub fn stop(&self, id: Uuid) -> RegistryResult<()> {
        let session = self.get(id)?;
        if let Some(handle) = session.detach_monitor() {
            handle.stop();
        }
        Ok(())
    }

    /// Polls a session once, outside its regular schedule
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::SessionNotFound`] for an unknown id and
    /// [`RegistryError::Tail`] when the poll fails.
    pub async fn manual_refresh(&self, id: Uuid) -> RegistryResult<FetchStatus> {
        let session = self.get(id)?;
        let executor = self.executor_for(&session);
        Ok(session
            .poll(executor.as_ref(), &self.pipeline, &self.events)
            .await?)
    }

    /// Drops local content and rewinds the offset
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::SessionNotFound`] for an unknown id.
    pub fn clear(&self, id: Uuid) -> RegistryResult<()> {
        self.get(id)?.clear(&self.events);
        Ok(())
    }

    /// Empties the remote file, then clears local content
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::SessionNotFound`] for an unknown id and
    /// [`RegistryError::Tail`] when the remote command fails.
    pub async fn truncate_remote(&self, id: Uuid) -> RegistryResult<()> {
        let session = self.get(id)?;
        let executor = self.executor_for(&session);
        Ok(session.truncate_remote(executor.as_ref(), &self.events).await?)
    }

    /// Toggles duplicate filtering and regenerates the view
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::SessionNotFound`] for an unknown id.
    pub fn set_filter_duplicates(&self, id: Uuid, enabled: bool) -> RegistryResult<()> {
        let session = self.get(id)?;
        let mut display = session.display();
        display.filter_duplicates = enabled;
        session.set_display(display, &self.pipeline, &self.events);
        Ok(())
    }

    /// Toggles timestamps and regenerates the view
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::SessionNotFound`] for an unknown id.
    pub fn set_show_timestamp(&self, id: Uuid, enabled: bool) -> RegistryResult<()> {
        let session = self.get(id)?;
        let mut display = session.display();
        display.show_timestamp = enabled;
        session.set_display(display, &self.pipeline, &self.events);
        Ok(())
    }

    /// Replaces the target and display flags of a session.
    ///
    /// A running loop is restarted so the next poll uses the new target.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::SessionNotFound`] for an unknown id and
    /// [`RegistryError::Tail`] when the config does not validate.
    pub fn update_target(&self, id: Uuid, config: &TargetConfig) -> RegistryResult<()> {
        let session = self.get(id)?;
        let target = config.to_target()?;
        let was_running = session.is_running();
        if let Some(handle) = session.detach_monitor() {
            handle.stop();
        }

        if session.set_target(target, &self.events) {
            tracing::info!(session = %id, target = %session.target(), "Target changed");
        }
        session.set_display(config.display(), &self.pipeline, &self.events);

        if was_running {
            self.start(id)?;
        }
        Ok(())
    }

    /// Copy of a session's raw buffer
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::SessionNotFound`] for an unknown id.
    pub fn raw_buffer(&self, id: Uuid) -> RegistryResult<String> {
        Ok(self.get(id)?.raw_buffer())
    }

    /// Copy of a session's rendered view
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::SessionNotFound`] for an unknown id.
    pub fn rendered_view(&self, id: Uuid) -> RegistryResult<String> {
        Ok(self.get(id)?.rendered_view())
    }

    /// Last status of a session
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::SessionNotFound`] for an unknown id.
    pub fn status(&self, id: Uuid) -> RegistryResult<SessionStatus> {
        Ok(self.get(id)?.status())
    }

    /// Stops every loop and waits for all of them to exit
    pub async fn shutdown(&self) {
        let handles: Vec<_> = self
            .read()
            .iter()
            .filter_map(|session| session.detach_monitor())
            .collect();
        let count = handles.len();
        join_all(handles.into_iter().map(MonitorHandle::shutdown)).await;
        tracing::debug!(stopped = count, "Registry shut down");
    }
}

impl Drop for SessionRegistry {
    fn drop(&mut self) {
        for session in self.read().iter() {
            if let Some(handle) = session.detach_monitor() {
                handle.stop();
            }
        }
    }
}
