//! Error types used by the ticksync engine and task callbacks.
//!
//! Four enums cover the distinct failure domains:
//!
//! - [`SchedulerError`] — construction and runtime errors of the engine itself.
//! - [`ConfigError`] — rejected configuration edits (validation failures).
//! - [`SyncError`] — the failure signal returned by a task's sync callback.
//! - [`MathError`] — contract violations in the arithmetic primitives.
//!
//! The enums provide `as_label` helpers returning short stable snake_case
//! strings for logs and metrics.

use thiserror::Error;

use crate::store::StoreError;

/// Errors raised while constructing or driving the scheduler.
///
/// Construction errors (`DuplicateTask`, `InvalidDefaults`,
/// `MissingCollaborator`) are fatal: they mean the embedding wired the engine
/// incorrectly and are surfaced immediately from
/// [`SchedulerBuilder::build`](crate::SchedulerBuilder::build).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// Two tasks were registered under the same name.
    #[error("task '{name}' is already registered")]
    DuplicateTask {
        /// The conflicting task name.
        name: String,
    },

    /// A task's registration-time defaults failed validation.
    ///
    /// This is a lifecycle-contract violation: the task never becomes
    /// schedulable, so the error is fatal rather than retried.
    #[error("invalid defaults for task '{name}': {source}")]
    InvalidDefaults {
        /// The offending task name.
        name: String,
        /// The underlying validation failure.
        source: ConfigError,
    },

    /// A required external collaborator was not supplied to the builder.
    #[error("missing collaborator: {what}")]
    MissingCollaborator {
        /// Which collaborator is absent (e.g. "timer").
        what: &'static str,
    },

    /// The persistent store failed during engine setup.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SchedulerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SchedulerError::DuplicateTask { .. } => "duplicate_task",
            SchedulerError::InvalidDefaults { .. } => "invalid_defaults",
            SchedulerError::MissingCollaborator { .. } => "missing_collaborator",
            SchedulerError::Store(_) => "store_error",
        }
    }
}

/// Errors raised when a configuration edit is rejected.
///
/// A rejected commit applies none of its staged fields.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A staged interval was positive but below the 5-second minimum.
    #[error("interval of {got_ms}ms is below the 5s minimum")]
    IntervalTooShort {
        /// The rejected interval in milliseconds.
        got_ms: i64,
    },

    /// A staged jitter range was negative.
    #[error("negative jitter range of {got_ms}ms")]
    NegativeRange {
        /// The rejected range in milliseconds.
        got_ms: i64,
    },

    /// The referenced task name is not in the registry.
    #[error("unknown task '{name}'")]
    UnknownTask {
        /// The unresolved name.
        name: String,
    },

    /// The persistent store failed while committing the edit.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::IntervalTooShort { .. } => "interval_too_short",
            ConfigError::NegativeRange { .. } => "negative_range",
            ConfigError::UnknownTask { .. } => "unknown_task",
            ConfigError::Store(_) => "store_error",
        }
    }
}

/// Failure signal returned by a task's sync callback.
///
/// A callback reports its outcome as an explicit value: `Ok(())` for success,
/// `Err(SyncError)` for failure. Failures never escape the orchestrator; they
/// drive the retry-backoff policy for that task only.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SyncError {
    /// The sync attempt failed and should be retried with backoff.
    #[error("sync failed: {reason}")]
    Failed {
        /// Human-readable failure description.
        reason: String,
    },
}

impl SyncError {
    /// Shorthand constructor for a failure with a reason.
    pub fn failed(reason: impl Into<String>) -> Self {
        SyncError::Failed {
            reason: reason.into(),
        }
    }

    /// Returns the failure reason.
    pub fn reason(&self) -> &str {
        match self {
            SyncError::Failed { reason } => reason,
        }
    }
}

/// Contract violations in the arithmetic primitives.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MathError {
    /// `ceil_div` was called with a zero divisor.
    #[error("division by zero")]
    DivideByZero,

    /// `random_in_range` was called with `upper < lower`.
    #[error("upper bound {upper} is below lower bound {lower}")]
    InvertedRange {
        /// The lower bound that was passed.
        lower: i64,
        /// The upper bound that was passed.
        upper: i64,
    },
}
