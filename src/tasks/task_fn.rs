//! Closure-backed task implementation.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SyncError;
use crate::settings::Edit;
use crate::tasks::task::SyncTask;

/// Function-backed [`SyncTask`].
///
/// Wraps a closure that produces a fresh future per sync attempt, so no
/// state is shared between attempts unless the closure captures it
/// explicitly (via `Arc`).
///
/// # Example
/// ```
/// use ticksync::{Edit, SyncError, SyncFn, TaskRef, schedule::MINUTE_MS};
///
/// let task: TaskRef = SyncFn::new("heartbeat", || async {
///     Ok::<_, SyncError>(())
/// })
/// .with_defaults(Edit::new().every(15 * MINUTE_MS))
/// .arc();
///
/// assert_eq!(task.name(), "heartbeat");
/// ```
pub struct SyncFn<F> {
    name: Cow<'static, str>,
    defaults: Edit,
    f: F,
}

impl<F> SyncFn<F> {
    /// Creates a closure-backed task with stock defaults.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            defaults: Edit::new(),
            f,
        }
    }

    /// Sets the registration-time defaults.
    pub fn with_defaults(mut self, defaults: Edit) -> Self {
        self.defaults = defaults;
        self
    }

    /// Wraps the task in a shared handle.
    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl<F, Fut> SyncTask for SyncFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), SyncError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn defaults(&self) -> Edit {
        self.defaults
    }

    async fn sync(&self) -> Result<(), SyncError> {
        (self.f)().await
    }
}
