//! External collaborator seams.
//!
//! The engine never talks to a real alarm clock, network stack, or battery;
//! it drives these traits and the embedding wires them to the host platform.
//! Notifications flow the other way through
//! [`SchedulerHandle`](crate::SchedulerHandle): the embedding calls
//! `fired(name)` when its timer goes off, `connectivity_restored()` when the
//! network returns, and `power_changed(connected)` on power transitions.
//!
//! All timestamps are unix epoch milliseconds, matching the scheduling
//! arithmetic in [`schedule`](crate::schedule).

use chrono::Utc;

/// How aggressively the host timer may wake the device for a fire.
///
/// Selected from the persisted power-connected flag; it never changes fire
/// *times*, only whether the host is allowed to wake from sleep for them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WakeMode {
    /// Wake the device if necessary (power connected).
    Wakeup,
    /// Deliver on the next natural wakeup (on battery).
    NoWakeup,
}

/// One-shot absolute-time timer.
///
/// At most one pending entry exists per key: [`Timer::arm`] replaces any
/// existing entry wholesale. Delivery is best-effort at-or-after the
/// requested time; the embedding forwards fires via
/// [`SchedulerHandle::fired`](crate::SchedulerHandle::fired).
pub trait Timer: Send + Sync {
    /// Schedules (or replaces) the pending fire for `key` at `at_ms`.
    fn arm(&self, key: &str, at_ms: i64, mode: WakeMode);

    /// Cancels the pending fire for `key`, if any.
    fn cancel(&self, key: &str);
}

/// Network availability collaborator.
///
/// Restoration is delivered at most once per `watch_restore` → restore
/// transition, after which the watch auto-disables until the next
/// `watch_restore` call.
pub trait Connectivity: Send + Sync {
    /// Whether the device currently has (or is acquiring) a connection.
    fn is_connected(&self) -> bool;

    /// Starts watching for the connection to come back.
    fn watch_restore(&self);

    /// Stops watching without waiting for a restore.
    fn unwatch_restore(&self);
}

/// Power-transition notification source.
///
/// While watched, the embedding forwards transitions via
/// [`SchedulerHandle::power_changed`](crate::SchedulerHandle::power_changed).
pub trait PowerMonitor: Send + Sync {
    /// Starts delivering power transitions.
    fn watch(&self);

    /// Stops delivering power transitions.
    fn unwatch(&self);
}

/// Host-restart notification source.
///
/// While watched, the embedding calls
/// [`SchedulerHandle::start`](crate::SchedulerHandle::start) after a host
/// reboot so schedules are re-armed.
pub trait BootMonitor: Send + Sync {
    /// Starts delivering restart notifications.
    fn watch(&self);

    /// Stops delivering restart notifications.
    fn unwatch(&self);
}

/// Wall-clock source, swappable for tests.
pub trait Clock: Send + Sync {
    /// Current unix time in milliseconds.
    fn now_ms(&self) -> i64;
}

/// System wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Monitor that ignores watch requests.
///
/// Default for embeddings whose platform has no power or boot notifications.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopMonitor;

impl PowerMonitor for NoopMonitor {
    fn watch(&self) {}
    fn unwatch(&self) {}
}

impl BootMonitor for NoopMonitor {
    fn watch(&self) {}
    fn unwatch(&self) {}
}
