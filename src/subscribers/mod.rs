//! Event subscribers.
//!
//! Subscribers observe scheduler [`Event`](crate::events::Event)s for
//! logging, metrics, or test synchronization. Each subscriber is driven by
//! its own worker fed from a bounded queue owned by [`SubscriberSet`], so a
//! slow subscriber never blocks the scheduler or its peers. When a queue
//! fills up, events for that subscriber are dropped instead.

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
