//! Layered task configuration.
//!
//! Each task has two configuration layers:
//!
//! - **defaults** — in-memory, fixed when the task is registered;
//! - **overrides** — persisted in the [`KvStore`](crate::store::KvStore),
//!   written through committed [`Edit`] transactions.
//!
//! Reads resolve the override when present, else the default. A store read
//! failure falls back to the default (and logs), so a corrupt store degrades
//! to registration-time behavior instead of taking the engine down.

mod edit;

use tracing::warn;

pub use edit::{Edit, MIN_INTERVAL_MS};

use crate::schedule::MINUTE_MS;
use crate::store::{KvStore, keys};

/// Resolved task configuration.
///
/// Also serves as the default layer: the registry stores one of these per
/// task, produced by applying the task's registration-time [`Edit`] to
/// [`TaskConfig::default`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaskConfig {
    /// Whether the task participates in scheduling.
    pub enabled: bool,
    /// Sync interval in milliseconds; `0` means no periodic schedule.
    pub every_ms: i64,
    /// Jitter window in milliseconds.
    pub range_ms: i64,
}

impl Default for TaskConfig {
    /// Enabled, no periodic interval, 5-minute jitter window.
    fn default() -> Self {
        Self {
            enabled: true,
            every_ms: 0,
            range_ms: 5 * MINUTE_MS,
        }
    }
}

/// Read/write access to one task's layered configuration.
///
/// Borrowed views are cheap to construct; the engine builds one per lookup.
pub struct TaskSettings<'a> {
    name: &'a str,
    defaults: TaskConfig,
    store: &'a dyn KvStore,
}

impl<'a> TaskSettings<'a> {
    /// Creates a view over `name` with the given default layer.
    pub fn new(name: &'a str, defaults: TaskConfig, store: &'a dyn KvStore) -> Self {
        Self {
            name,
            defaults,
            store,
        }
    }

    /// Whether the task is enabled (override else default).
    pub fn enabled(&self) -> bool {
        self.read_bool(&keys::enabled(self.name), self.defaults.enabled)
    }

    /// The sync interval in milliseconds (override else default).
    pub fn every(&self) -> i64 {
        self.read_i64(&keys::every(self.name), self.defaults.every_ms)
    }

    /// The jitter range in milliseconds (override else default).
    pub fn range(&self) -> i64 {
        self.read_i64(&keys::range(self.name), self.defaults.range_ms)
    }

    /// Resolved snapshot of all three fields.
    pub fn snapshot(&self) -> TaskConfig {
        TaskConfig {
            enabled: self.enabled(),
            every_ms: self.every(),
            range_ms: self.range(),
        }
    }

    /// Commits a staged edit to the persisted override layer.
    ///
    /// Validation runs before any write: a rejected commit leaves every
    /// override untouched. Unstaged fields are not written.
    pub fn commit(&self, edit: Edit) -> Result<(), crate::error::ConfigError> {
        edit.validate()?;
        if let Some(enabled) = edit.enabled_field() {
            self.store.put_bool(&keys::enabled(self.name), enabled)?;
        }
        if let Some(every) = edit.every_field() {
            self.store.put_i64(&keys::every(self.name), every)?;
        }
        if let Some(range) = edit.range_field() {
            self.store.put_i64(&keys::range(self.name), range)?;
        }
        Ok(())
    }

    fn read_bool(&self, key: &str, default: bool) -> bool {
        match self.store.get_bool(key) {
            Ok(Some(v)) => v,
            Ok(None) => default,
            Err(e) => {
                warn!(key, error = %e, "store read failed; using default");
                default
            }
        }
    }

    fn read_i64(&self, key: &str, default: i64) -> i64 {
        match self.store.get_i64(key) {
            Ok(Some(v)) => v,
            Ok(None) => default,
            Err(e) => {
                warn!(key, error = %e, "store read failed; using default");
                default
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::store::MemoryStore;

    fn settings<'a>(store: &'a MemoryStore) -> TaskSettings<'a> {
        TaskSettings::new("news", TaskConfig::default(), store)
    }

    #[test]
    fn reads_fall_back_to_defaults() {
        let store = MemoryStore::new();
        let s = settings(&store);
        assert!(s.enabled());
        assert_eq!(s.every(), 0);
        assert_eq!(s.range(), 5 * MINUTE_MS);
    }

    #[test]
    fn overrides_win_over_defaults() {
        let store = MemoryStore::new();
        let s = settings(&store);
        s.commit(Edit::new().disable().every(10_000).range(2_000))
            .unwrap();
        assert!(!s.enabled());
        assert_eq!(s.every(), 10_000);
        assert_eq!(s.range(), 2_000);
    }

    #[test]
    fn unstaged_fields_are_left_untouched() {
        let store = MemoryStore::new();
        let s = settings(&store);
        s.commit(Edit::new().every(30_000)).unwrap();
        s.commit(Edit::new().disable()).unwrap();
        assert_eq!(s.every(), 30_000);
        assert!(!s.enabled());
    }

    #[test]
    fn rejected_commit_changes_nothing() {
        let store = MemoryStore::new();
        let s = settings(&store);
        s.commit(Edit::new().every(5_000)).unwrap();

        // 4000 is below the minimum; enabled is staged in the same
        // transaction and must not land either.
        let err = s.commit(Edit::new().every(4_000).disable()).unwrap_err();
        assert!(matches!(err, ConfigError::IntervalTooShort { got_ms: 4_000 }));
        assert_eq!(s.every(), 5_000);
        assert!(s.enabled());
    }

    #[test]
    fn minimum_interval_commits_and_reads_back() {
        let store = MemoryStore::new();
        let s = settings(&store);
        s.commit(Edit::new().every(5_000)).unwrap();
        assert_eq!(s.every(), 5_000);
        assert_eq!(s.snapshot().every_ms, 5_000);
    }
}
