//! Cloneable control surface.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use crate::error::ConfigError;
use crate::events::{Bus, Event};
use crate::settings::{Edit, TaskConfig, TaskSettings};
use crate::store::KvStore;
use crate::tasks::SyncRegistry;

use super::Command;

pub(crate) struct Shared {
    pub(crate) tx: mpsc::UnboundedSender<Command>,
    pub(crate) token: CancellationToken,
    pub(crate) bus: Bus,
    pub(crate) store: Arc<dyn KvStore>,
    pub(crate) registry: Arc<SyncRegistry>,
}

/// Handle for driving a running [`Scheduler`](crate::Scheduler).
///
/// Cheap to clone and safe to share; all commands funnel into the
/// orchestrator's FIFO queue, so effects land in call order. Commands sent
/// after shutdown are silently dropped.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Arc<Shared>,
}

impl std::fmt::Debug for SchedulerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerHandle").finish_non_exhaustive()
    }
}

impl SchedulerHandle {
    pub(crate) fn new(shared: Shared) -> Self {
        Self {
            inner: Arc::new(shared),
        }
    }

    /// Transitions to running and arms every enabled task. Idempotent.
    pub fn start(&self) {
        self.send(Command::Start);
    }

    /// Transitions to stopped and cancels all pending timer entries.
    pub fn stop(&self) {
        self.send(Command::Stop);
    }

    /// Requests one immediate sync attempt for `name`.
    pub fn sync(&self, name: &str) {
        self.send(Command::Sync {
            task: name.to_string(),
        });
    }

    /// Requests a one-shot sync somewhere inside the task's jitter window.
    pub fn sync_inexact(&self, name: &str) {
        self.send(Command::SyncInexact {
            task: name.to_string(),
        });
    }

    /// Recomputes the schedule for `name` from its current configuration.
    ///
    /// [`edit`](SchedulerHandle::edit) does this automatically; call this
    /// directly after changing the store out of band.
    pub fn update(&self, name: &str) {
        self.send(Command::Update {
            task: name.to_string(),
        });
    }

    /// Forwards a host timer fire for `name`.
    pub fn fired(&self, name: &str) {
        self.send(Command::TimerFired {
            task: name.to_string(),
        });
    }

    /// Forwards a connectivity-restored notification from the host.
    pub fn connectivity_restored(&self) {
        self.send(Command::ConnectivityRestored);
    }

    /// Forwards a power transition from the host.
    pub fn power_changed(&self, connected: bool) {
        self.send(Command::PowerChanged { connected });
    }

    /// Commits a configuration edit for `name` and recomputes its schedule.
    ///
    /// Validation is atomic: on error nothing is persisted and the schedule
    /// is left untouched.
    pub fn edit(&self, name: &str, edit: Edit) -> Result<(), ConfigError> {
        let Some(reg) = self.inner.registry.get(name) else {
            return Err(ConfigError::UnknownTask {
                name: name.to_string(),
            });
        };
        TaskSettings::new(name, reg.defaults, self.inner.store.as_ref()).commit(edit)?;
        self.send(Command::Update {
            task: name.to_string(),
        });
        Ok(())
    }

    /// Whether `name` is currently enabled (override else default).
    pub fn is_enabled(&self, name: &str) -> Result<bool, ConfigError> {
        Ok(self.settings(name)?.enabled)
    }

    /// Resolved configuration snapshot for `name`.
    pub fn config(&self, name: &str) -> Result<TaskConfig, ConfigError> {
        self.settings(name)
    }

    /// Sorted names of all registered tasks.
    pub fn task_names(&self) -> Vec<String> {
        self.inner.registry.names()
    }

    /// Subscribes to the event bus.
    ///
    /// The receiver observes events published after this call.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.inner.bus.subscribe()
    }

    /// Shuts the orchestrator down. The pending command queue is discarded.
    pub fn shutdown(&self) {
        self.inner.token.cancel();
    }

    fn settings(&self, name: &str) -> Result<TaskConfig, ConfigError> {
        let Some(reg) = self.inner.registry.get(name) else {
            return Err(ConfigError::UnknownTask {
                name: name.to_string(),
            });
        };
        Ok(TaskSettings::new(name, reg.defaults, self.inner.store.as_ref()).snapshot())
    }

    fn send(&self, cmd: Command) {
        // A closed queue means the worker is gone; commands become no-ops.
        let _ = self.inner.tx.send(cmd);
    }
}
