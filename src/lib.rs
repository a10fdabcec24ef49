//! # ticksync
//!
//! Per-device periodic background-task scheduler with calendar-aligned
//! triggers, deterministic jitter, capped retry backoff, and
//! connectivity-gated execution.
//!
//! The engine computes *when* tasks should run; the embedding supplies the
//! platform pieces it cannot know: a one-shot timer, a connectivity source,
//! and optionally power and boot monitors. Fire times are whole multiples of
//! each task's interval counted from local midnight, shifted by a per-device
//! jitter offset so a fleet of devices spreads across the window instead of
//! stampeding a backend together.
//!
//! ## Architecture
//!
//! ```text
//!                           ┌────────────────┐
//!   SchedulerHandle ──cmd──▶│   Scheduler    │──────▶ Timer / Connectivity
//!   (start/stop/sync/      │ (single worker) │        PowerMonitor / Boot
//!    fired/edit/...)        └───────┬────────┘
//!                                   │ events
//!                        ┌──────────┴──────────┐
//!                        ▼                     ▼
//!                       Bus               SubscriberSet
//!                  (broadcast)          (bounded queues)
//! ```
//!
//! All mutable state lives in one worker task consuming a FIFO command
//! queue, so syncs never overlap and transitions are totally ordered. State
//! that must survive a process restart (jitter seed, per-task overrides,
//! retry spans, the running flag) goes through a [`KvStore`].
//!
//! ## Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use ticksync::{
//!     Connectivity, Edit, SchedulerBuilder, SchedulerConfig, SyncError, SyncFn,
//!     Timer, WakeMode, schedule::MINUTE_MS,
//! };
//!
//! struct HostTimer;
//! impl Timer for HostTimer {
//!     fn arm(&self, _key: &str, _at_ms: i64, _mode: WakeMode) {}
//!     fn cancel(&self, _key: &str) {}
//! }
//!
//! struct HostNet;
//! impl Connectivity for HostNet {
//!     fn is_connected(&self) -> bool { true }
//!     fn watch_restore(&self) {}
//!     fn unwatch_restore(&self) {}
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let news = SyncFn::new("news", || async { Ok::<_, SyncError>(()) })
//!         .with_defaults(Edit::new().every(15 * MINUTE_MS))
//!         .arc();
//!
//!     let (scheduler, handle) = SchedulerBuilder::new(SchedulerConfig::default())
//!         .with_timer(Arc::new(HostTimer))
//!         .with_connectivity(Arc::new(HostNet))
//!         .register(news)
//!         .build()?;
//!
//!     tokio::spawn(scheduler.run());
//!     handle.start();
//!
//!     // Later, forward host notifications as they arrive:
//!     handle.fired("news");
//!     handle.power_changed(true);
//!
//!     handle.shutdown();
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod events;
pub mod host;
pub mod policies;
pub mod schedule;
pub mod settings;
pub mod store;
pub mod subscribers;
pub mod tasks;

pub use config::SchedulerConfig;
pub use error::{ConfigError, MathError, SchedulerError, SyncError};
pub use events::{Bus, Event, EventKind};
pub use host::{
    BootMonitor, Clock, Connectivity, NoopMonitor, PowerMonitor, SystemClock, Timer, WakeMode,
};
pub use policies::RetryPolicy;
pub use self::core::{Scheduler, SchedulerBuilder, SchedulerHandle};
pub use settings::{Edit, MIN_INTERVAL_MS, TaskConfig, TaskSettings};
pub use store::{JsonStore, KvStore, MemoryStore, StoreError};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use tasks::{SyncFn, SyncRegistry, SyncTask, TaskRef};
