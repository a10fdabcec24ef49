//! Calendar-aligned trigger-time calculation.
//!
//! [`next_event`] computes the next timestamp that is a whole multiple of an
//! interval counted from the most recent local midnight. All timestamps are
//! unix epoch milliseconds.

use chrono::{Local, NaiveTime, TimeZone};

use crate::error::MathError;
use crate::schedule::DAY_MS;

/// Integer division that rounds toward positive infinity.
///
/// Correct for negative operands; the single overflowing case
/// (`i64::MIN / -1`) returns `i64::MIN` instead of panicking.
///
/// # Errors
/// Returns [`MathError::DivideByZero`] when `b == 0`.
///
/// # Example
/// ```
/// use ticksync::schedule::ceil_div;
///
/// assert_eq!(ceil_div(7, 2).unwrap(), 4);
/// assert_eq!(ceil_div(-7, 2).unwrap(), -3);
/// assert_eq!(ceil_div(6, 2).unwrap(), 3);
/// assert!(ceil_div(1, 0).is_err());
/// ```
pub fn ceil_div(a: i64, b: i64) -> Result<i64, MathError> {
    if b == 0 {
        return Err(MathError::DivideByZero);
    }
    if a == i64::MIN && b == -1 {
        return Ok(i64::MIN);
    }
    let quotient = a / b;
    let divided_evenly = a % b == 0;
    if divided_evenly {
        Ok(quotient)
    } else {
        // Truncation rounded down exactly when the signs agree.
        let rounded_down = (a > 0) == (b > 0);
        Ok(if rounded_down { quotient + 1 } else { quotient })
    }
}

/// Returns the most recent local-midnight boundary at or before `now_ms`.
///
/// If local midnight does not exist for that day (a DST spring-forward gap),
/// the UTC day boundary is used instead.
pub fn previous_midnight(now_ms: i64) -> i64 {
    let Some(now) = Local.timestamp_millis_opt(now_ms).earliest() else {
        return utc_day_start(now_ms);
    };
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    match Local.from_local_datetime(&midnight).earliest() {
        Some(m) => m.timestamp_millis(),
        None => utc_day_start(now_ms),
    }
}

fn utc_day_start(now_ms: i64) -> i64 {
    now_ms - now_ms.rem_euclid(DAY_MS)
}

/// Computes the next trigger time for `interval_ms`, anchored to local
/// midnight.
///
/// - `interval_ms == 0` returns `now_ms` (one-shot semantics).
/// - `now_ms` exactly at midnight returns `midnight + interval`.
/// - Otherwise returns the smallest grid point at or after `now_ms`, where
///   the grid is every multiple of `interval_ms` from midnight. A `now_ms`
///   already on the grid stays put.
pub fn next_event(now_ms: i64, interval_ms: i64) -> i64 {
    if interval_ms == 0 {
        return now_ms;
    }
    next_event_from(previous_midnight(now_ms), now_ms, interval_ms)
}

/// [`next_event`] with an explicit day anchor.
///
/// Exposed for callers (and tests) that supply their own anchor instead of
/// the local-timezone midnight.
pub fn next_event_from(midnight_ms: i64, now_ms: i64, interval_ms: i64) -> i64 {
    if interval_ms == 0 {
        return now_ms;
    }
    let span = now_ms - midnight_ms;
    if span == 0 {
        return midnight_ms + interval_ms;
    }
    match ceil_div(span, interval_ms) {
        Ok(steps) => midnight_ms + steps.saturating_mul(interval_ms),
        // interval_ms != 0 was checked above.
        Err(_) => now_ms,
    }
}
