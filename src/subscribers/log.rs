//! Structured log subscriber.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Writes every scheduler event to the `tracing` log.
///
/// Routine lifecycle events log at `debug`, state transitions at `info`,
/// failures at `warn`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWriter;

impl LogWriter {
    /// Creates the log subscriber.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, event: &Event) {
        let task = event.task.as_deref().unwrap_or("-");
        match event.kind {
            EventKind::SchedulerStarted => info!(seq = event.seq, "scheduler started"),
            EventKind::SchedulerStopped => info!(seq = event.seq, "scheduler stopped"),
            EventKind::TaskArmed => debug!(
                seq = event.seq,
                task,
                fire_at_ms = event.fire_at_ms,
                "task armed"
            ),
            EventKind::SyncStarting => debug!(seq = event.seq, task, "sync starting"),
            EventKind::SyncSucceeded => info!(seq = event.seq, task, "sync succeeded"),
            EventKind::SyncFailed => warn!(
                seq = event.seq,
                task,
                reason = event.reason.as_deref().unwrap_or("-"),
                "sync failed"
            ),
            EventKind::RetryScheduled => info!(
                seq = event.seq,
                task,
                span_ms = event.span_ms,
                fire_at_ms = event.fire_at_ms,
                "retry scheduled"
            ),
            EventKind::SyncSkipped => debug!(
                seq = event.seq,
                task,
                reason = event.reason.as_deref().unwrap_or("-"),
                "sync skipped"
            ),
            EventKind::ConnectivityLost => warn!(seq = event.seq, "connectivity lost"),
            EventKind::ConnectivityRestored => info!(seq = event.seq, "connectivity restored"),
            EventKind::PowerChanged => info!(
                seq = event.seq,
                connected = event.connected,
                "power state changed"
            ),
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
