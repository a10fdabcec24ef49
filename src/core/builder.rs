//! Engine assembly.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::config::SchedulerConfig;
use crate::error::SchedulerError;
use crate::events::Bus;
use crate::host::{BootMonitor, Clock, Connectivity, NoopMonitor, PowerMonitor, SystemClock, Timer};
use crate::schedule::Jitter;
use crate::store::{KvStore, MemoryStore, keys};
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::tasks::{SyncRegistry, TaskRef};

use super::handle::Shared;
use super::{Scheduler, SchedulerHandle, find_or_create_seed};

/// Builder for a [`Scheduler`] / [`SchedulerHandle`] pair.
///
/// A timer and a connectivity source are mandatory; the store defaults to
/// [`MemoryStore`], the clock to [`SystemClock`], and the power and boot
/// monitors to [`NoopMonitor`]. Tasks are registered fail-fast: duplicate
/// names and invalid defaults abort the build.
///
/// Call [`build`](SchedulerBuilder::build) from within a tokio runtime when
/// subscribers are attached; their workers are spawned during the build.
pub struct SchedulerBuilder {
    cfg: SchedulerConfig,
    store: Option<Arc<dyn KvStore>>,
    clock: Option<Arc<dyn Clock>>,
    timer: Option<Arc<dyn Timer>>,
    connectivity: Option<Arc<dyn Connectivity>>,
    power: Option<Arc<dyn PowerMonitor>>,
    boot: Option<Arc<dyn BootMonitor>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    tasks: Vec<TaskRef>,
}

impl SchedulerBuilder {
    /// Starts a builder with the given engine configuration.
    pub fn new(cfg: SchedulerConfig) -> Self {
        Self {
            cfg,
            store: None,
            clock: None,
            timer: None,
            connectivity: None,
            power: None,
            boot: None,
            subscribers: Vec::new(),
            tasks: Vec::new(),
        }
    }

    /// Sets the persistent store. Defaults to an in-memory map.
    pub fn with_store(mut self, store: Arc<dyn KvStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the wall-clock source. Defaults to the system clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Sets the host timer. Mandatory.
    pub fn with_timer(mut self, timer: Arc<dyn Timer>) -> Self {
        self.timer = Some(timer);
        self
    }

    /// Sets the connectivity source. Mandatory.
    pub fn with_connectivity(mut self, connectivity: Arc<dyn Connectivity>) -> Self {
        self.connectivity = Some(connectivity);
        self
    }

    /// Sets the power monitor. Defaults to a no-op.
    pub fn with_power(mut self, power: Arc<dyn PowerMonitor>) -> Self {
        self.power = Some(power);
        self
    }

    /// Sets the boot monitor. Defaults to a no-op.
    pub fn with_boot(mut self, boot: Arc<dyn BootMonitor>) -> Self {
        self.boot = Some(boot);
        self
    }

    /// Attaches an event subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Queues a task for registration.
    pub fn register(mut self, task: TaskRef) -> Self {
        self.tasks.push(task);
        self
    }

    /// Assembles the engine.
    ///
    /// # Errors
    /// - [`SchedulerError::MissingCollaborator`] when no timer or
    ///   connectivity source was supplied;
    /// - [`SchedulerError::DuplicateTask`] / [`SchedulerError::InvalidDefaults`]
    ///   from task registration;
    /// - [`SchedulerError::Store`] when the seed cannot be persisted.
    pub fn build(self) -> Result<(Scheduler, SchedulerHandle), SchedulerError> {
        let timer = self
            .timer
            .ok_or(SchedulerError::MissingCollaborator { what: "timer" })?;
        let connectivity = self.connectivity.ok_or(SchedulerError::MissingCollaborator {
            what: "connectivity",
        })?;
        let store = self.store.unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let power = self
            .power
            .unwrap_or_else(|| Arc::new(NoopMonitor) as Arc<dyn PowerMonitor>);
        let boot = self
            .boot
            .unwrap_or_else(|| Arc::new(NoopMonitor) as Arc<dyn BootMonitor>);

        let mut registry = SyncRegistry::new();
        for task in self.tasks {
            registry.register(task)?;
        }
        let registry = Arc::new(registry);

        let seed = find_or_create_seed(store.as_ref(), &self.cfg.identity)?;
        let jitter = Jitter::new(seed);

        let power_connected = match store.get_bool(keys::POWER_CONNECTED) {
            Ok(Some(v)) => v,
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "power flag read failed; assuming on battery");
                false
            }
        };

        let bus = Bus::new(self.cfg.bus_capacity);
        let subs = SubscriberSet::new(self.subscribers);
        let token = CancellationToken::new();
        let (tx, rx) = mpsc::unbounded_channel();

        let scheduler = Scheduler::new(
            &self.cfg,
            bus.clone(),
            subs,
            Arc::clone(&store),
            clock,
            timer,
            connectivity,
            power,
            boot,
            Arc::clone(&registry),
            jitter,
            power_connected,
            rx,
            token.clone(),
        );
        let handle = SchedulerHandle::new(Shared {
            tx,
            token,
            bus,
            store,
            registry,
        });
        Ok((scheduler, handle))
    }
}
