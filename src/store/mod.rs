//! Persistent key-value storage contract.
//!
//! The engine persists a handful of scalar values: the device seed, the
//! power-connected flag, the running flag, and per-task overrides and retry
//! spans. Only the read/write contract matters here; [`KvStore`] is the seam
//! and the crate ships two implementations:
//!
//! - [`MemoryStore`] — in-process map, for tests and throwaway embeddings
//! - [`JsonStore`] — a JSON file rewritten atomically on every commit
//!
//! Writes are atomic per key; there are no multi-key transactions. The
//! scheduler is the sole writer during normal operation.

mod json;
mod memory;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use json::JsonStore;
pub use memory::MemoryStore;

/// Logical key namespace used by the engine.
pub mod keys {
    /// Per-installation jitter seed (`i64`, nonzero once generated).
    pub const SEED: &str = "seed";
    /// Last known power-connected status (`bool`).
    pub const POWER_CONNECTED: &str = "power_connected";
    /// Whether the scheduler was running at last shutdown (`bool`).
    pub const RUNNING: &str = "running";

    /// Override: whether the task is enabled (`bool`).
    pub fn enabled(task: &str) -> String {
        format!("{task}.enabled")
    }

    /// Override: sync interval in milliseconds (`i64`).
    pub fn every(task: &str) -> String {
        format!("{task}.every")
    }

    /// Override: jitter range in milliseconds (`i64`).
    pub fn range(task: &str) -> String {
        format!("{task}.range")
    }

    /// Active retry span in milliseconds, `0` when none (`i64`).
    pub fn last_failed_span(task: &str) -> String {
        format!("{task}.last_failed_span")
    }
}

/// Errors raised by a store implementation.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing the backing medium failed.
    #[error("store i/o: {0}")]
    Io(#[from] std::io::Error),

    /// The backing medium held data that could not be decoded.
    #[error("store encoding: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The key exists but holds a value of a different type.
    #[error("key '{key}' holds a value of a different type")]
    TypeMismatch {
        /// The conflicting key.
        key: String,
    },
}

/// A persisted scalar value.
///
/// Serialized untagged, so a store file reads as plain JSON numbers and
/// booleans.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Slot {
    /// A boolean flag.
    Bool(bool),
    /// A signed 64-bit integer (durations and timestamps in milliseconds).
    I64(i64),
}

/// Contract for the persistent store.
///
/// Each `put_*` call is an atomic single-key commit: after it returns `Ok`,
/// a crashed-and-restarted process observes the new value.
pub trait KvStore: Send + Sync {
    /// Reads an integer value, `None` when the key is absent.
    fn get_i64(&self, key: &str) -> Result<Option<i64>, StoreError>;

    /// Writes an integer value.
    fn put_i64(&self, key: &str, value: i64) -> Result<(), StoreError>;

    /// Reads a boolean value, `None` when the key is absent.
    fn get_bool(&self, key: &str) -> Result<Option<bool>, StoreError>;

    /// Writes a boolean value.
    fn put_bool(&self, key: &str, value: bool) -> Result<(), StoreError>;

    /// Removes a key if present.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
