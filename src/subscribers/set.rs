//! Non-blocking fan-out over multiple subscribers.
//!
//! [`SubscriberSet::emit`] returns immediately: each subscriber has a bounded
//! queue and a worker task draining it. Order is FIFO per subscriber; there
//! is no global ordering across subscribers, and an overflowing queue drops
//! events for that subscriber only. Panics inside a subscriber are caught so
//! one bad observer cannot take down the others.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::warn;

use crate::events::Event;

use super::Subscribe;

struct Channel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Fan-out set with per-subscriber bounded queues and workers.
pub struct SubscriberSet {
    channels: Vec<Channel>,
    workers: Vec<JoinHandle<()>>,
}

impl SubscriberSet {
    /// Creates the set and spawns one worker per subscriber.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        let mut channels = Vec::with_capacity(subscribers.len());
        let mut workers = Vec::with_capacity(subscribers.len());

        for sub in subscribers {
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));

            let worker = tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = sub.on_event(ev.as_ref());
                    if let Err(panic) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        let msg = panic
                            .downcast_ref::<&str>()
                            .copied()
                            .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
                            .unwrap_or("opaque payload");
                        warn!(subscriber = sub.name(), msg, "subscriber panicked");
                    }
                }
            });

            channels.push(Channel { name, sender: tx });
            workers.push(worker);
        }

        Self { channels, workers }
    }

    /// Delivers one event to every subscriber without awaiting them.
    pub fn emit(&self, event: &Event) {
        let ev = Arc::new(event.clone());
        for channel in &self.channels {
            match channel.sender.try_send(Arc::clone(&ev)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(subscriber = channel.name, "event dropped: queue full");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    warn!(subscriber = channel.name, "event dropped: worker closed");
                }
            }
        }
    }

    /// Closes all queues and awaits worker completion.
    pub async fn shutdown(self) {
        drop(self.channels);
        for worker in self.workers {
            let _ = worker.await;
        }
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::events::EventKind;

    struct Counter(AtomicUsize);

    #[async_trait]
    impl Subscribe for Counter {
        async fn on_event(&self, _event: &Event) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }

        fn name(&self) -> &'static str {
            "counter"
        }
    }

    struct Exploder;

    #[async_trait]
    impl Subscribe for Exploder {
        async fn on_event(&self, _event: &Event) {
            panic!("boom");
        }

        fn name(&self) -> &'static str {
            "exploder"
        }
    }

    #[tokio::test]
    async fn events_reach_every_subscriber() {
        let a = Arc::new(Counter(AtomicUsize::new(0)));
        let b = Arc::new(Counter(AtomicUsize::new(0)));
        let set = SubscriberSet::new(vec![a.clone() as Arc<dyn Subscribe>, b.clone()]);

        for _ in 0..5 {
            set.emit(&Event::new(EventKind::TaskArmed));
        }
        set.shutdown().await;

        assert_eq!(a.0.load(Ordering::SeqCst), 5);
        assert_eq!(b.0.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn a_panicking_subscriber_does_not_take_down_its_peers() {
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        let set =
            SubscriberSet::new(vec![Arc::new(Exploder) as Arc<dyn Subscribe>, counter.clone()]);

        for _ in 0..3 {
            set.emit(&Event::new(EventKind::SyncFailed));
        }
        set.shutdown().await;

        assert_eq!(counter.0.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn empty_set_accepts_events() {
        let set = SubscriberSet::new(Vec::new());
        assert!(set.is_empty());
        set.emit(&Event::new(EventKind::SchedulerStarted));
        set.shutdown().await;
    }
}
