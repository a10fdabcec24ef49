//! The subscriber contract.

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event subscribers.
///
/// `on_event` is called from a dedicated worker task; implementations may be
/// slow (I/O, batching) without affecting the scheduler. If a subscriber's
/// queue overflows, events for that subscriber are dropped with a warning.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles a single event.
    async fn on_event(&self, event: &Event);

    /// Human-readable name for logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
