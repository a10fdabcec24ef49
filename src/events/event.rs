//! Scheduler lifecycle events.
//!
//! [`EventKind`] classifies what happened; [`Event`] carries the metadata
//! relevant to that kind. Each event gets a globally unique, monotonically
//! increasing sequence number, so consumers can restore exact order even when
//! delivery interleaves.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of scheduler events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// The scheduler transitioned to running and is arming tasks.
    SchedulerStarted,

    /// The scheduler transitioned to stopped; all timers were cancelled.
    SchedulerStopped,

    /// A task timer was armed.
    ///
    /// Sets: `task`, `fire_at_ms`.
    TaskArmed,

    /// A sync attempt is starting (connectivity was confirmed).
    ///
    /// Sets: `task`.
    SyncStarting,

    /// The sync callback reported success; retry state was cleared.
    ///
    /// Sets: `task`.
    SyncSucceeded,

    /// The sync callback reported failure.
    ///
    /// Sets: `task`, `reason`.
    SyncFailed,

    /// A retry was scheduled with a backoff span.
    ///
    /// Sets: `task`, `span_ms`, `fire_at_ms`.
    RetryScheduled,

    /// A fire or sync request was ignored.
    ///
    /// Sets: `task`, `reason` (`unknown-task`, `disabled`, `stopped`).
    SyncSkipped,

    /// Connectivity was lost; all pending timers were cancelled.
    ConnectivityLost,

    /// Connectivity came back; enabled tasks were re-armed at normal cadence.
    ConnectivityRestored,

    /// The power-connected flag changed.
    ///
    /// Sets: `connected`.
    PowerChanged,
}

/// A scheduler event with optional metadata.
///
/// `seq` is a monotonic global sequence for ordering; `at` is the wall-clock
/// timestamp for logs. The remaining fields are set depending on the kind.
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Task name, if the event concerns one task.
    pub task: Option<Arc<str>>,
    /// Human-readable reason (failures, skips).
    pub reason: Option<Arc<str>>,
    /// Absolute fire time in unix milliseconds.
    pub fire_at_ms: Option<i64>,
    /// Backoff span in milliseconds.
    pub span_ms: Option<i64>,
    /// Power-connected flag for [`EventKind::PowerChanged`].
    pub connected: Option<bool>,
}

impl Event {
    /// Creates a new event of the given kind with the next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            reason: None,
            fire_at_ms: None,
            span_ms: None,
            connected: None,
        }
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches an absolute fire time.
    #[inline]
    pub fn with_fire_at(mut self, at_ms: i64) -> Self {
        self.fire_at_ms = Some(at_ms);
        self
    }

    /// Attaches a backoff span.
    #[inline]
    pub fn with_span(mut self, span_ms: i64) -> Self {
        self.span_ms = Some(span_ms);
        self
    }

    /// Attaches the power-connected flag.
    #[inline]
    pub fn with_connected(mut self, connected: bool) -> Self {
        self.connected = Some(connected);
        self
    }
}
