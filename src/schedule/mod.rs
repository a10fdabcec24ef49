//! Trigger-time arithmetic: calendar alignment and seeded jitter.
//!
//! ## Contents
//! - [`ceil_div`], [`previous_midnight`], [`next_event`] — the aligned
//!   trigger-time calculator
//! - [`random_in_range`], [`Jitter`] — deterministic per-device offsets
//!
//! Unjittered schedules for the same interval align across devices (every
//! 5 minutes fires at :00/:05/:10…), and the jitter offset spreads devices
//! inside the configured window so they do not all hit a server at once.

mod calc;
mod jitter;

pub use calc::{ceil_div, next_event, next_event_from, previous_midnight};
pub use jitter::{Jitter, random_in_range};

/// One second in milliseconds.
pub const SECOND_MS: i64 = 1000;
/// One minute in milliseconds.
pub const MINUTE_MS: i64 = 60 * SECOND_MS;
/// One hour in milliseconds.
pub const HOUR_MS: i64 = 60 * MINUTE_MS;
/// One day in milliseconds.
pub const DAY_MS: i64 = 24 * HOUR_MS;
/// One week in milliseconds.
pub const WEEK_MS: i64 = 7 * DAY_MS;
