//! Engine internals.
//!
//! - [`SchedulerBuilder`] — wires tasks, collaborators, and storage together
//! - [`Scheduler`] — the single-worker orchestrator loop
//! - [`SchedulerHandle`] — cloneable control surface for the embedding
//!
//! The builder returns a `(Scheduler, SchedulerHandle)` pair; the embedding
//! spawns [`Scheduler::run`] and keeps the handle.

mod builder;
mod handle;
mod scheduler;
mod seed;

pub use builder::SchedulerBuilder;
pub use handle::SchedulerHandle;
pub use scheduler::Scheduler;

pub(crate) use scheduler::Command;
pub(crate) use seed::find_or_create_seed;
