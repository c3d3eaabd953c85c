//! Background polling loop
//!
//! One spawned task per monitored session. The task ticks at a fixed
//! interval, runs [`Session::poll`] and stops as soon as its handle signals,
//! including in the middle of a poll or while waiting for the next tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use crate::executor::RemoteExecutor;
use crate::pipeline::{LinePipeline, ViewChange};
use crate::session::{Session, SessionStatus};

/// Events emitted towards the render sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    /// Lines were appended to the rendered view
    Appended {
        /// Session id
        session: Uuid,
        /// Rendered lines without newlines
        lines: Vec<String>,
    },
    /// The rendered view was rewritten
    Replaced {
        /// Session id
        session: Uuid,
        /// Full new view
        view: String,
    },
    /// Status changed after a poll or user action
    Status {
        /// Session id
        session: Uuid,
        /// New status
        status: SessionStatus,
    },
    /// Monitor loop exited
    Stopped {
        /// Session id
        session: Uuid,
    },
}

impl MonitorEvent {
    /// Converts a pipeline result into an event, `None` when nothing changed
    #[must_use]
    pub fn from_change(session: Uuid, change: ViewChange) -> Option<Self> {
        match change {
            ViewChange::Unchanged => None,
            ViewChange::Appended(lines) => Some(Self::Appended { session, lines }),
            ViewChange::Replaced(view) => Some(Self::Replaced { session, view }),
        }
    }

    /// Id of the session the event belongs to
    #[must_use]
    pub const fn session(&self) -> Uuid {
        match self {
            Self::Appended { session, .. }
            | Self::Replaced { session, .. }
            | Self::Status { session, .. }
            | Self::Stopped { session } => *session,
        }
    }
}

/// Handle to a running monitor loop.
///
/// Dropping the handle also stops the loop.
#[derive(Debug)]
pub struct MonitorHandle {
    stop_tx: mpsc::Sender<()>,
    join: JoinHandle<()>,
}

impl MonitorHandle {
    /// Signals the loop to stop without waiting for it
    pub fn stop(&self) {
        // a full channel already carries a stop request
        let _ = self.stop_tx.try_send(());
    }

    /// Returns true once the loop task has exited
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Signals the loop to stop and waits for it to exit
    pub async fn shutdown(self) {
        self.stop();
        if let Err(err) = self.join.await
            && err.is_panic()
        {
            tracing::error!(error = %err, "Monitor task panicked");
        }
    }
}

/// Starts polling `session` every `interval`.
///
/// The first poll runs immediately. A poll that overruns the interval delays
/// the next tick rather than triggering a burst.
#[must_use]
pub fn start_monitor(
    session: Arc<Session>,
    executor: Arc<dyn RemoteExecutor>,
    pipeline: Arc<LinePipeline>,
    interval: Duration,
    events: mpsc::UnboundedSender<MonitorEvent>,
) -> MonitorHandle {
    let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);

    let join = tokio::spawn(async move {
        let id = session.id();
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::debug!(session = %id, ?interval, "Monitor started");

        loop {
            tokio::select! {
                biased;
                _ = stop_rx.recv() => break,
                _ = ticker.tick() => {
                    tokio::select! {
                        biased;
                        _ = stop_rx.recv() => {
                            tracing::debug!(session = %id, "Poll abandoned on stop");
                            break;
                        }
                        result = session.poll(executor.as_ref(), &pipeline, &events) => {
                            if let Err(err) = result {
                                tracing::trace!(session = %id, error = %err, "Poll error recorded in status");
                            }
                        }
                    }
                }
            }
            if events.is_closed() {
                break; // receiver dropped
            }
        }

        tracing::debug!(session = %id, "Monitor stopped");
        let _ = events.send(MonitorEvent::Stopped { session: id });
    });

    MonitorHandle { stop_tx, join }
}
