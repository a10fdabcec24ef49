//! Broadcast bus for scheduler events.
//!
//! Thin wrapper around [`tokio::sync::broadcast`]. Publishing never blocks
//! and never fails: with no receivers the event is simply dropped, and slow
//! receivers observe `RecvError::Lagged` and skip the oldest items. Events
//! are fire-and-forget; nothing in the engine depends on their delivery.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for scheduler events.
///
/// Cheap to clone; all clones share one ring buffer whose size is fixed at
/// construction.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus with the given ring-buffer capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates an independent receiver observing events published after this
    /// call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
