//! The task contract.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SyncError;
use crate::settings::Edit;

/// Shared handle to a task.
pub type TaskRef = Arc<dyn SyncTask>;

/// A named, independently scheduled unit of periodic work.
///
/// The name must be globally unique and stable: it keys the timer entry, the
/// persisted overrides, and the retry span. The callback reports its outcome
/// as an explicit value, `Ok(())` on success or `Err` to trigger backoff, and
/// may block on I/O for as long as it needs; execution is serialized with all
/// other scheduler work.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use ticksync::{Edit, SyncError, SyncTask, schedule::MINUTE_MS};
///
/// struct NewsFeed;
///
/// #[async_trait]
/// impl SyncTask for NewsFeed {
///     fn name(&self) -> &str {
///         "news-feed"
///     }
///
///     fn defaults(&self) -> Edit {
///         Edit::new().every(30 * MINUTE_MS).range(5 * MINUTE_MS)
///     }
///
///     async fn sync(&self) -> Result<(), SyncError> {
///         // fetch and apply updates...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait SyncTask: Send + Sync + 'static {
    /// Returns the stable task name.
    fn name(&self) -> &str;

    /// Registration-time defaults, committed to the in-memory default layer
    /// exactly once when the task enters the registry.
    ///
    /// The stock defaults leave the task enabled with no periodic interval,
    /// so a task that never sets [`Edit::every`] only runs on explicit sync
    /// requests.
    fn defaults(&self) -> Edit {
        Edit::new()
    }

    /// Performs one sync attempt.
    async fn sync(&self) -> Result<(), SyncError>;
}
