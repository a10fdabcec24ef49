//! Capped exponential retry backoff.
//!
//! After a failed sync the task is rescheduled using a backoff *span* instead
//! of its configured interval. The span starts at [`RetryPolicy::base_ms`],
//! doubles on each consecutive failure, and is capped at
//! `max(interval, min_cap_ms)`. Any success resets the persisted span to zero,
//! returning the task to its normal cadence.
//!
//! The current span is persisted per task (`<task>.last_failed_span`), so a
//! device that restarts mid-outage resumes backing off where it left off.

/// Capped exponential backoff policy for failed syncs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Span for the first retry after a success.
    pub base_ms: i64,
    /// Lower bound of the cap; the effective cap is `max(interval, min_cap_ms)`.
    pub min_cap_ms: i64,
}

impl Default for RetryPolicy {
    /// Returns the stock policy: 500 ms base, 5 s minimum cap.
    fn default() -> Self {
        Self {
            base_ms: 500,
            min_cap_ms: 5000,
        }
    }
}

impl RetryPolicy {
    /// Computes the next backoff span.
    ///
    /// `last_ms == 0` means no retry is active and yields the base span;
    /// otherwise the previous span doubles. The result never exceeds
    /// `max(interval_ms, min_cap_ms)`, so tasks with long intervals back off
    /// further than the minimum cap but never beyond their own cadence.
    pub fn next_span(&self, last_ms: i64, interval_ms: i64) -> i64 {
        let raw = if last_ms == 0 {
            self.base_ms
        } else {
            last_ms.saturating_mul(2)
        };
        raw.min(self.cap(interval_ms))
    }

    /// The effective cap for a task with the given interval.
    pub fn cap(&self, interval_ms: i64) -> i64 {
        self.min_cap_ms.max(interval_ms)
    }
}
