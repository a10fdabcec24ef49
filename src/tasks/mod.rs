//! Task abstractions and the registration table.
//!
//! - [`SyncTask`] — trait for a named unit of periodic work
//! - [`SyncFn`] — closure-backed task implementation
//! - [`TaskRef`] — shared handle (`Arc<dyn SyncTask>`)
//! - [`SyncRegistry`] — the explicit name → task table, built once at
//!   process startup and immutable afterwards

mod registry;
mod task;
mod task_fn;

pub use registry::SyncRegistry;
pub use task::{SyncTask, TaskRef};
pub use task_fn::SyncFn;
