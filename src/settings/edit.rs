//! Staged configuration transactions.
//!
//! An [`Edit`] accumulates changes to `{enabled, every, range}` without
//! applying anything. A commit validates the whole transaction first and then
//! applies it in full; a rejected commit applies no field at all. The same
//! type serves both layers: the registration-time default layer
//! ([`Edit::apply_to`]) and the persisted override layer
//! ([`TaskSettings::commit`](crate::settings::TaskSettings::commit)).

use crate::error::ConfigError;
use crate::schedule::SECOND_MS;
use crate::settings::TaskConfig;

/// Minimum allowed sync interval (5 seconds).
///
/// `0` is exempt: it means "no periodic schedule" rather than a cadence.
pub const MIN_INTERVAL_MS: i64 = 5 * SECOND_MS;

/// A staged set of configuration changes.
///
/// ```
/// use ticksync::{Edit, schedule::MINUTE_MS};
///
/// let edit = Edit::new().every(15 * MINUTE_MS).range(MINUTE_MS);
/// assert!(!edit.is_empty());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Edit {
    enabled: Option<bool>,
    every_ms: Option<i64>,
    range_ms: Option<i64>,
}

impl Edit {
    /// Creates an empty transaction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages the enabled flag.
    pub fn enabled(mut self, value: bool) -> Self {
        self.enabled = Some(value);
        self
    }

    /// Stages `enabled = true`.
    pub fn enable(self) -> Self {
        self.enabled(true)
    }

    /// Stages `enabled = false`.
    pub fn disable(self) -> Self {
        self.enabled(false)
    }

    /// Stages the sync interval in milliseconds.
    ///
    /// `0` disables periodic scheduling; any other value below
    /// [`MIN_INTERVAL_MS`] is rejected at commit.
    pub fn every(mut self, ms: i64) -> Self {
        self.every_ms = Some(ms);
        self
    }

    /// Stages the jitter range in milliseconds.
    pub fn range(mut self, ms: i64) -> Self {
        self.range_ms = Some(ms);
        self
    }

    /// True when nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.enabled.is_none() && self.every_ms.is_none() && self.range_ms.is_none()
    }

    /// Validates the transaction without applying it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(every) = self.every_ms {
            if every != 0 && every < MIN_INTERVAL_MS {
                return Err(ConfigError::IntervalTooShort { got_ms: every });
            }
        }
        if let Some(range) = self.range_ms {
            if range < 0 {
                return Err(ConfigError::NegativeRange { got_ms: range });
            }
        }
        Ok(())
    }

    /// Validates and applies the transaction to an in-memory layer.
    ///
    /// Used for the default layer at registration; the persisted layer goes
    /// through [`TaskSettings::commit`](crate::settings::TaskSettings::commit).
    pub fn apply_to(&self, base: TaskConfig) -> Result<TaskConfig, ConfigError> {
        self.validate()?;
        Ok(TaskConfig {
            enabled: self.enabled.unwrap_or(base.enabled),
            every_ms: self.every_ms.unwrap_or(base.every_ms),
            range_ms: self.range_ms.unwrap_or(base.range_ms),
        })
    }

    pub(crate) fn enabled_field(&self) -> Option<bool> {
        self.enabled
    }

    pub(crate) fn every_field(&self) -> Option<i64> {
        self.every_ms
    }

    pub(crate) fn range_field(&self) -> Option<i64> {
        self.range_ms
    }
}
