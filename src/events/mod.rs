//! Scheduler events: types and broadcast bus.
//!
//! Every externally observable decision of the orchestrator (arming a timer,
//! running a sync, scheduling a retry, suspending on connectivity loss) is
//! published as an [`Event`] on the [`Bus`]. Subscribers
//! ([`Subscribe`](crate::Subscribe)) receive them through the fan-out in
//! [`SubscriberSet`](crate::SubscriberSet).
//!
//! Events are observability only: the state machine never reads them back.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
