//! The orchestrator loop.
//!
//! A single worker owns all mutable state and consumes commands from an
//! unbounded FIFO queue. Timer fires, manual sync requests, connectivity and
//! power notifications all arrive as [`Command`]s, so no two syncs overlap
//! and every state transition happens in a well-defined order.
//!
//! Per task the worker tracks one of three states:
//!
//! - `Unscheduled` — no pending timer entry
//! - `Scheduled` — armed at the normal interval-aligned cadence
//! - `Retrying` — armed on the backoff grid after a failure
//!
//! Sync execution is gated on connectivity: a fire without a connection
//! cancels every pending entry and parks the engine until the host reports
//! the network back, at which point all enabled tasks re-arm at normal
//! cadence with their backoff state cleared.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::SchedulerConfig;
use crate::events::{Bus, Event, EventKind};
use crate::host::{BootMonitor, Clock, Connectivity, PowerMonitor, Timer, WakeMode};
use crate::policies::RetryPolicy;
use crate::schedule::{Jitter, next_event};
use crate::settings::TaskSettings;
use crate::store::{KvStore, keys};
use crate::subscribers::SubscriberSet;
use crate::tasks::SyncRegistry;

/// Commands consumed by the orchestrator worker, in FIFO order.
#[derive(Debug)]
pub(crate) enum Command {
    /// Transition to running and arm all enabled tasks.
    Start,
    /// Transition to stopped and cancel all pending entries.
    Stop,
    /// Run one sync attempt now (bypasses the timer).
    Sync { task: String },
    /// Arm a one-shot fire somewhere inside the task's jitter window.
    SyncInexact { task: String },
    /// Recompute a task's schedule after a configuration change.
    Update { task: String },
    /// The host timer fired for a task.
    TimerFired { task: String },
    /// The host reports the network is back.
    ConnectivityRestored,
    /// The host reports a power transition.
    PowerChanged { connected: bool },
}

/// Scheduling state of one task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TaskState {
    /// No pending timer entry.
    Unscheduled,
    /// Armed at normal cadence.
    Scheduled { at_ms: i64 },
    /// Armed on the backoff grid.
    Retrying { at_ms: i64, span_ms: i64 },
}

/// The orchestrator. Built by [`SchedulerBuilder`](crate::SchedulerBuilder);
/// the embedding spawns [`Scheduler::run`] on its runtime.
pub struct Scheduler {
    retry: RetryPolicy,
    bus: Bus,
    subs: SubscriberSet,
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    timer: Arc<dyn Timer>,
    connectivity: Arc<dyn Connectivity>,
    power: Arc<dyn PowerMonitor>,
    boot: Arc<dyn BootMonitor>,
    registry: Arc<SyncRegistry>,
    jitter: Jitter,

    running: bool,
    power_connected: bool,
    states: HashMap<String, TaskState>,

    rx: mpsc::UnboundedReceiver<Command>,
    token: CancellationToken,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("running", &self.running)
            .field("power_connected", &self.power_connected)
            .field("states", &self.states)
            .finish_non_exhaustive()
    }
}

#[allow(clippy::too_many_arguments)]
impl Scheduler {
    pub(crate) fn new(
        cfg: &SchedulerConfig,
        bus: Bus,
        subs: SubscriberSet,
        store: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
        timer: Arc<dyn Timer>,
        connectivity: Arc<dyn Connectivity>,
        power: Arc<dyn PowerMonitor>,
        boot: Arc<dyn BootMonitor>,
        registry: Arc<SyncRegistry>,
        jitter: Jitter,
        power_connected: bool,
        rx: mpsc::UnboundedReceiver<Command>,
        token: CancellationToken,
    ) -> Self {
        let states = registry
            .names()
            .into_iter()
            .map(|name| (name, TaskState::Unscheduled))
            .collect();
        Self {
            retry: cfg.retry,
            bus,
            subs,
            store,
            clock,
            timer,
            connectivity,
            power,
            boot,
            registry,
            jitter,
            running: false,
            power_connected,
            states,
            rx,
            token,
        }
    }

    /// Runs the worker until the handle is shut down.
    ///
    /// If the persisted running flag is set (the process died or rebooted
    /// while running), the engine starts itself and re-arms every enabled
    /// task before consuming commands.
    pub async fn run(mut self) {
        let resume = matches!(self.store.get_bool(keys::RUNNING), Ok(Some(true)));
        if resume {
            debug!("resuming from persisted running state");
            self.on_start();
        }

        loop {
            tokio::select! {
                _ = self.token.cancelled() => break,
                cmd = self.rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd).await,
                    None => break,
                },
            }
        }

        self.subs.shutdown().await;
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Start => self.on_start(),
            Command::Stop => self.on_stop(),
            Command::Sync { task } => self.run_sync(&task, false).await,
            Command::TimerFired { task } => self.run_sync(&task, true).await,
            Command::SyncInexact { task } => self.on_sync_inexact(&task),
            Command::Update { task } => self.on_update(&task),
            Command::ConnectivityRestored => self.on_restored(),
            Command::PowerChanged { connected } => self.on_power(connected),
        }
    }

    /// Transitions to running. Idempotent: arming replaces pending entries,
    /// so a second start converges on the same schedule.
    fn on_start(&mut self) {
        self.running = true;
        self.persist_bool(keys::RUNNING, true);
        self.power.watch();
        self.boot.watch();
        self.publish(Event::new(EventKind::SchedulerStarted));
        for name in self.registry.names() {
            self.rearm_normal(&name);
        }
    }

    fn on_stop(&mut self) {
        self.running = false;
        self.persist_bool(keys::RUNNING, false);
        self.cancel_all();
        self.power.unwatch();
        self.boot.unwatch();
        self.connectivity.unwatch_restore();
        self.publish(Event::new(EventKind::SchedulerStopped));
    }

    /// Executes one sync attempt and reschedules based on the outcome.
    ///
    /// `fired` distinguishes timer deliveries from manual requests: a stale
    /// fire arriving after a stop is skipped, while a manual sync runs even
    /// when stopped (it just does not re-arm afterwards).
    async fn run_sync(&mut self, name: &str, fired: bool) {
        if fired && !self.running {
            self.publish(skipped(name, "stopped"));
            return;
        }

        let registry = Arc::clone(&self.registry);
        let Some(reg) = registry.get(name) else {
            self.publish(skipped(name, "unknown-task"));
            return;
        };

        let cfg = TaskSettings::new(name, reg.defaults, self.store.as_ref()).snapshot();
        if !cfg.enabled {
            self.timer.cancel(name);
            self.set_state(name, TaskState::Unscheduled);
            self.publish(skipped(name, "disabled"));
            return;
        }

        if !self.connectivity.is_connected() {
            self.on_network_lost();
            return;
        }

        self.publish(Event::new(EventKind::SyncStarting).with_task(name));
        match reg.task.sync().await {
            Ok(()) => {
                self.persist_i64(&keys::last_failed_span(name), 0);
                self.publish(Event::new(EventKind::SyncSucceeded).with_task(name));
                if self.running {
                    self.rearm_normal(name);
                } else {
                    self.set_state(name, TaskState::Unscheduled);
                }
            }
            Err(err) => {
                self.publish(
                    Event::new(EventKind::SyncFailed)
                        .with_task(name)
                        .with_reason(err.reason().to_string()),
                );
                let last = self.read_span(name);
                let span = self.retry.next_span(last, cfg.every_ms);
                self.persist_i64(&keys::last_failed_span(name), span);
                if self.running {
                    self.rearm_backoff(name, span, cfg.range_ms);
                } else {
                    self.set_state(name, TaskState::Unscheduled);
                }
            }
        }
    }

    /// Arms a one-shot fire inside `[now, now + range)`.
    ///
    /// Gated on the running state like timer fires: arming while stopped
    /// would leave a host wakeup pending that Stop promised to cancel.
    fn on_sync_inexact(&mut self, name: &str) {
        if !self.running {
            self.publish(skipped(name, "stopped"));
            return;
        }
        let registry = Arc::clone(&self.registry);
        let Some(reg) = registry.get(name) else {
            self.publish(skipped(name, "unknown-task"));
            return;
        };
        let settings = TaskSettings::new(name, reg.defaults, self.store.as_ref());
        if !settings.enabled() {
            self.publish(skipped(name, "disabled"));
            return;
        }

        let now = self.clock.now_ms();
        let at = now + self.jitter.offset(now, settings.range());
        self.arm(name, at, TaskState::Scheduled { at_ms: at });
    }

    /// Recomputes one task's schedule from its current configuration.
    fn on_update(&mut self, name: &str) {
        if !self.registry.contains(name) {
            return;
        }
        if self.running {
            self.rearm_normal(name);
        } else {
            self.timer.cancel(name);
            self.set_state(name, TaskState::Unscheduled);
        }
    }

    /// Parks the engine: the network is gone, so pending fires would only
    /// burn battery. Backoff spans survive; the restore path clears them.
    fn on_network_lost(&mut self) {
        self.publish(Event::new(EventKind::ConnectivityLost));
        self.cancel_all();
        self.connectivity.watch_restore();
    }

    fn on_restored(&mut self) {
        self.publish(Event::new(EventKind::ConnectivityRestored));
        for name in self.registry.names() {
            self.persist_i64(&keys::last_failed_span(&name), 0);
        }
        if self.running {
            for name in self.registry.names() {
                self.rearm_normal(&name);
            }
        }
    }

    /// Re-arms every pending entry at its unchanged fire time with the wake
    /// mode matching the new power state.
    ///
    /// The flag is persisted on every report; an unchanged state only skips
    /// the event and the re-arm loop.
    fn on_power(&mut self, connected: bool) {
        self.persist_bool(keys::POWER_CONNECTED, connected);
        if connected == self.power_connected {
            return;
        }
        self.power_connected = connected;
        self.publish(Event::new(EventKind::PowerChanged).with_connected(connected));

        let mode = self.wake_mode();
        for (name, state) in &self.states {
            match state {
                TaskState::Scheduled { at_ms } | TaskState::Retrying { at_ms, .. } => {
                    self.timer.arm(name, *at_ms, mode);
                }
                TaskState::Unscheduled => {}
            }
        }
    }

    /// Arms `name` at its next interval-aligned, jittered fire time.
    ///
    /// Disabled tasks and tasks with no interval are cancelled instead.
    fn rearm_normal(&mut self, name: &str) {
        let registry = Arc::clone(&self.registry);
        let Some(reg) = registry.get(name) else {
            return;
        };
        let cfg = TaskSettings::new(name, reg.defaults, self.store.as_ref()).snapshot();
        if !cfg.enabled || cfg.every_ms == 0 {
            self.timer.cancel(name);
            self.set_state(name, TaskState::Unscheduled);
            return;
        }

        let now = self.clock.now_ms();
        let aligned = next_event(now, cfg.every_ms);
        let at = aligned + self.jitter.offset(aligned, cfg.range_ms);
        self.arm(name, at, TaskState::Scheduled { at_ms: at });
    }

    /// Arms `name` on the backoff grid for the given span.
    ///
    /// The jitter window shrinks to the span so a short retry is not pushed
    /// out by a wide configured range.
    fn rearm_backoff(&mut self, name: &str, span_ms: i64, range_ms: i64) {
        let now = self.clock.now_ms();
        let aligned = next_event(now, span_ms);
        let at = aligned + self.jitter.offset(aligned, range_ms.min(span_ms));
        self.arm(name, at, TaskState::Retrying { at_ms: at, span_ms });
        self.publish(
            Event::new(EventKind::RetryScheduled)
                .with_task(name)
                .with_span(span_ms)
                .with_fire_at(at),
        );
    }

    fn arm(&mut self, name: &str, at_ms: i64, state: TaskState) {
        self.timer.cancel(name);
        self.timer.arm(name, at_ms, self.wake_mode());
        self.set_state(name, state);
        self.publish(
            Event::new(EventKind::TaskArmed)
                .with_task(name)
                .with_fire_at(at_ms),
        );
    }

    fn cancel_all(&mut self) {
        for name in self.registry.names() {
            self.timer.cancel(&name);
            self.set_state(&name, TaskState::Unscheduled);
        }
    }

    fn wake_mode(&self) -> WakeMode {
        if self.power_connected {
            WakeMode::Wakeup
        } else {
            WakeMode::NoWakeup
        }
    }

    fn set_state(&mut self, name: &str, state: TaskState) {
        self.states.insert(name.to_string(), state);
    }

    fn read_span(&self, name: &str) -> i64 {
        match self.store.get_i64(&keys::last_failed_span(name)) {
            Ok(Some(v)) => v,
            Ok(None) => 0,
            Err(e) => {
                warn!(task = name, error = %e, "span read failed; assuming none");
                0
            }
        }
    }

    fn persist_bool(&self, key: &str, value: bool) {
        if let Err(e) = self.store.put_bool(key, value) {
            warn!(key, error = %e, "store write failed");
        }
    }

    fn persist_i64(&self, key: &str, value: i64) {
        if let Err(e) = self.store.put_i64(key, value) {
            warn!(key, error = %e, "store write failed");
        }
    }

    fn publish(&self, ev: Event) {
        self.subs.emit(&ev);
        self.bus.publish(ev);
    }
}

fn skipped(name: &str, reason: &'static str) -> Event {
    Event::new(EventKind::SyncSkipped)
        .with_task(name)
        .with_reason(reason)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

    use super::*;
    use crate::config::SchedulerConfig;
    use crate::core::SchedulerBuilder;
    use crate::error::SyncError;
    use crate::settings::Edit;
    use crate::store::MemoryStore;
    use crate::tasks::SyncFn;

    #[derive(Default)]
    struct FakeTimer {
        pending: Mutex<HashMap<String, (i64, WakeMode)>>,
        arm_count: AtomicI64,
    }

    impl FakeTimer {
        fn pending(&self, key: &str) -> Option<(i64, WakeMode)> {
            self.pending.lock().unwrap().get(key).copied()
        }

        fn arms(&self) -> i64 {
            self.arm_count.load(Ordering::SeqCst)
        }
    }

    impl Timer for FakeTimer {
        fn arm(&self, key: &str, at_ms: i64, mode: WakeMode) {
            self.arm_count.fetch_add(1, Ordering::SeqCst);
            self.pending
                .lock()
                .unwrap()
                .insert(key.to_string(), (at_ms, mode));
        }

        fn cancel(&self, key: &str) {
            self.pending.lock().unwrap().remove(key);
        }
    }

    #[derive(Default)]
    struct FakeConn {
        connected: AtomicBool,
        watching: AtomicBool,
    }

    impl Connectivity for FakeConn {
        fn is_connected(&self) -> bool {
            self.connected.load(Ordering::SeqCst)
        }

        fn watch_restore(&self) {
            self.watching.store(true, Ordering::SeqCst);
        }

        fn unwatch_restore(&self) {
            self.watching.store(false, Ordering::SeqCst);
        }
    }

    struct ManualClock(AtomicI64);

    impl Clock for ManualClock {
        fn now_ms(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    const NOW: i64 = 1_700_000_000_000;
    const EVERY: i64 = 60_000;
    const RANGE: i64 = 2_000;

    struct Rig {
        scheduler: Scheduler,
        timer: Arc<FakeTimer>,
        conn: Arc<FakeConn>,
        clock: Arc<ManualClock>,
        store: Arc<MemoryStore>,
        fail: Arc<AtomicBool>,
    }

    fn rig() -> Rig {
        let timer = Arc::new(FakeTimer::default());
        let conn = Arc::new(FakeConn::default());
        conn.connected.store(true, Ordering::SeqCst);
        let clock = Arc::new(ManualClock(AtomicI64::new(NOW)));
        let store = Arc::new(MemoryStore::new());
        let fail = Arc::new(AtomicBool::new(false));

        let flag = fail.clone();
        let task = SyncFn::new("news", move || {
            let flag = flag.clone();
            async move {
                if flag.load(Ordering::SeqCst) {
                    Err(SyncError::failed("fetch refused"))
                } else {
                    Ok(())
                }
            }
        })
        .with_defaults(Edit::new().every(EVERY).range(RANGE))
        .arc();

        let cfg = SchedulerConfig {
            identity: vec!["test-device".into()],
            ..SchedulerConfig::default()
        };
        let (scheduler, _handle) = SchedulerBuilder::new(cfg)
            .with_store(store.clone())
            .with_clock(clock.clone())
            .with_timer(timer.clone())
            .with_connectivity(conn.clone())
            .register(task)
            .build()
            .unwrap();

        Rig {
            scheduler,
            timer,
            conn,
            clock,
            store,
            fail,
        }
    }

    fn jitter(store: &MemoryStore) -> Jitter {
        let seed = store.get_i64(keys::SEED).unwrap().unwrap() as u64;
        Jitter::new(seed)
    }

    fn expected_normal(store: &MemoryStore, now: i64) -> i64 {
        let aligned = next_event(now, EVERY);
        aligned + jitter(store).offset(aligned, RANGE)
    }

    fn expected_backoff(store: &MemoryStore, now: i64, span: i64) -> i64 {
        let aligned = next_event(now, span);
        aligned + jitter(store).offset(aligned, RANGE.min(span))
    }

    #[tokio::test]
    async fn start_arms_enabled_tasks_inside_the_window() {
        let mut r = rig();
        r.scheduler.handle_command(Command::Start).await;

        let (at, mode) = r.timer.pending("news").unwrap();
        let aligned = next_event(NOW, EVERY);
        assert!(at >= aligned && at < aligned + RANGE, "fire at {at}");
        assert_eq!(at, expected_normal(&r.store, NOW));
        assert_eq!(mode, WakeMode::NoWakeup);
        assert_eq!(r.store.get_bool(keys::RUNNING).unwrap(), Some(true));
    }

    #[tokio::test]
    async fn start_is_idempotent() {
        let mut r = rig();
        r.scheduler.handle_command(Command::Start).await;
        let first = r.timer.pending("news").unwrap();
        r.scheduler.handle_command(Command::Start).await;
        assert_eq!(r.timer.pending("news").unwrap(), first);
    }

    #[tokio::test]
    async fn successful_sync_clears_backoff_and_rearms() {
        let mut r = rig();
        r.scheduler.handle_command(Command::Start).await;
        r.store
            .put_i64(&keys::last_failed_span("news"), 2_000)
            .unwrap();

        let later = NOW + 10_000;
        r.clock.0.store(later, Ordering::SeqCst);
        r.scheduler
            .handle_command(Command::TimerFired {
                task: "news".into(),
            })
            .await;

        assert_eq!(
            r.store.get_i64(&keys::last_failed_span("news")).unwrap(),
            Some(0)
        );
        let (at, _) = r.timer.pending("news").unwrap();
        assert_eq!(at, expected_normal(&r.store, later));
    }

    #[tokio::test]
    async fn failed_sync_schedules_a_short_first_retry() {
        let mut r = rig();
        r.scheduler.handle_command(Command::Start).await;
        r.fail.store(true, Ordering::SeqCst);

        r.scheduler
            .handle_command(Command::TimerFired {
                task: "news".into(),
            })
            .await;

        assert_eq!(
            r.store.get_i64(&keys::last_failed_span("news")).unwrap(),
            Some(500)
        );
        let (at, _) = r.timer.pending("news").unwrap();
        assert_eq!(at, expected_backoff(&r.store, NOW, 500));
        // The retry lands within one span plus its (span-capped) jitter.
        assert!(at >= NOW && at <= NOW + 2 * 500);
    }

    #[tokio::test]
    async fn retries_double_until_the_cap() {
        let mut r = rig();
        r.scheduler.handle_command(Command::Start).await;
        r.fail.store(true, Ordering::SeqCst);

        let mut spans = Vec::new();
        for _ in 0..6 {
            r.scheduler
                .handle_command(Command::TimerFired {
                    task: "news".into(),
                })
                .await;
            spans.push(
                r.store
                    .get_i64(&keys::last_failed_span("news"))
                    .unwrap()
                    .unwrap(),
            );
        }
        // cap = max(60_000 interval, 5_000 floor) = 60_000
        assert_eq!(spans, vec![500, 1_000, 2_000, 4_000, 8_000, 16_000]);
    }

    #[tokio::test]
    async fn fire_without_network_parks_the_engine() {
        let mut r = rig();
        r.scheduler.handle_command(Command::Start).await;
        r.conn.connected.store(false, Ordering::SeqCst);

        r.scheduler
            .handle_command(Command::TimerFired {
                task: "news".into(),
            })
            .await;

        assert!(r.timer.pending("news").is_none());
        assert!(r.conn.watching.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn restore_rearms_and_drops_backoff() {
        let mut r = rig();
        r.scheduler.handle_command(Command::Start).await;
        r.conn.connected.store(false, Ordering::SeqCst);
        r.scheduler
            .handle_command(Command::TimerFired {
                task: "news".into(),
            })
            .await;
        r.store
            .put_i64(&keys::last_failed_span("news"), 4_000)
            .unwrap();

        r.conn.connected.store(true, Ordering::SeqCst);
        r.scheduler
            .handle_command(Command::ConnectivityRestored)
            .await;

        assert_eq!(
            r.store.get_i64(&keys::last_failed_span("news")).unwrap(),
            Some(0)
        );
        let (at, _) = r.timer.pending("news").unwrap();
        assert_eq!(at, expected_normal(&r.store, NOW));
    }

    #[tokio::test]
    async fn disabled_task_fire_is_a_noop() {
        let mut r = rig();
        r.scheduler.handle_command(Command::Start).await;
        r.store.put_bool(&keys::enabled("news"), false).unwrap();

        r.scheduler
            .handle_command(Command::TimerFired {
                task: "news".into(),
            })
            .await;

        assert!(r.timer.pending("news").is_none());
    }

    #[tokio::test]
    async fn fire_while_stopped_is_skipped() {
        let mut r = rig();
        let before = r.timer.arms();
        r.scheduler
            .handle_command(Command::TimerFired {
                task: "news".into(),
            })
            .await;
        assert_eq!(r.timer.arms(), before);
        assert!(r.timer.pending("news").is_none());
    }

    #[tokio::test]
    async fn unknown_task_fire_is_skipped() {
        let mut r = rig();
        r.scheduler.handle_command(Command::Start).await;
        r.scheduler
            .handle_command(Command::TimerFired {
                task: "weather".into(),
            })
            .await;
        assert!(r.timer.pending("weather").is_none());
    }

    #[tokio::test]
    async fn update_recomputes_the_schedule() {
        let mut r = rig();
        r.scheduler.handle_command(Command::Start).await;
        r.store
            .put_i64(&keys::every("news"), 15 * 60_000)
            .unwrap();

        r.scheduler
            .handle_command(Command::Update {
                task: "news".into(),
            })
            .await;

        let (at, _) = r.timer.pending("news").unwrap();
        let aligned = next_event(NOW, 15 * 60_000);
        assert!(at >= aligned && at < aligned + RANGE, "fire at {at}");
    }

    #[tokio::test]
    async fn update_to_disabled_cancels_the_entry() {
        let mut r = rig();
        r.scheduler.handle_command(Command::Start).await;
        r.store.put_bool(&keys::enabled("news"), false).unwrap();
        r.scheduler
            .handle_command(Command::Update {
                task: "news".into(),
            })
            .await;
        assert!(r.timer.pending("news").is_none());
    }

    #[tokio::test]
    async fn power_change_keeps_fire_times_and_swaps_wake_mode() {
        let mut r = rig();
        r.scheduler.handle_command(Command::Start).await;
        let (at_before, mode_before) = r.timer.pending("news").unwrap();
        assert_eq!(mode_before, WakeMode::NoWakeup);

        r.scheduler
            .handle_command(Command::PowerChanged { connected: true })
            .await;

        let (at_after, mode_after) = r.timer.pending("news").unwrap();
        assert_eq!(at_after, at_before);
        assert_eq!(mode_after, WakeMode::Wakeup);
        assert_eq!(
            r.store.get_bool(keys::POWER_CONNECTED).unwrap(),
            Some(true)
        );
    }

    #[tokio::test]
    async fn power_arms_after_the_change_use_wakeup_mode() {
        let mut r = rig();
        r.scheduler
            .handle_command(Command::PowerChanged { connected: true })
            .await;
        r.scheduler.handle_command(Command::Start).await;
        let (_, mode) = r.timer.pending("news").unwrap();
        assert_eq!(mode, WakeMode::Wakeup);
    }

    #[tokio::test]
    async fn stop_cancels_everything_and_persists_the_flag() {
        let mut r = rig();
        r.scheduler.handle_command(Command::Start).await;
        r.scheduler.handle_command(Command::Stop).await;

        assert!(r.timer.pending("news").is_none());
        assert_eq!(r.store.get_bool(keys::RUNNING).unwrap(), Some(false));
    }

    #[tokio::test]
    async fn manual_sync_runs_while_stopped_without_rearming() {
        let mut r = rig();
        r.scheduler
            .handle_command(Command::Sync {
                task: "news".into(),
            })
            .await;
        // The attempt ran (span key written) but nothing was armed.
        assert_eq!(
            r.store.get_i64(&keys::last_failed_span("news")).unwrap(),
            Some(0)
        );
        assert!(r.timer.pending("news").is_none());
    }

    #[tokio::test]
    async fn sync_inexact_while_stopped_arms_nothing() {
        let mut r = rig();
        r.scheduler.handle_command(Command::Start).await;
        r.scheduler.handle_command(Command::Stop).await;
        let arms_after_stop = r.timer.arms();

        r.scheduler
            .handle_command(Command::SyncInexact {
                task: "news".into(),
            })
            .await;

        assert!(r.timer.pending("news").is_none());
        assert_eq!(r.timer.arms(), arms_after_stop);
    }

    #[tokio::test]
    async fn first_power_report_is_persisted_even_when_unchanged() {
        let mut r = rig();
        assert_eq!(r.store.get_bool(keys::POWER_CONNECTED).unwrap(), None);

        r.scheduler
            .handle_command(Command::PowerChanged { connected: false })
            .await;

        assert_eq!(
            r.store.get_bool(keys::POWER_CONNECTED).unwrap(),
            Some(false)
        );
        // Unchanged state never arms anything.
        assert!(r.timer.pending("news").is_none());
    }

    #[tokio::test]
    async fn sync_inexact_arms_inside_the_near_window() {
        let mut r = rig();
        r.scheduler.handle_command(Command::Start).await;
        r.scheduler
            .handle_command(Command::SyncInexact {
                task: "news".into(),
            })
            .await;

        let (at, _) = r.timer.pending("news").unwrap();
        assert!(at >= NOW && at < NOW + RANGE, "fire at {at}");
    }

    #[tokio::test]
    async fn rearming_the_same_slot_is_deterministic() {
        let mut r = rig();
        r.scheduler.handle_command(Command::Start).await;
        let first = r.timer.pending("news").unwrap();

        // Stop and start again with the clock unchanged: same slot, same
        // seed, same fire time.
        r.scheduler.handle_command(Command::Stop).await;
        r.scheduler.handle_command(Command::Start).await;
        assert_eq!(r.timer.pending("news").unwrap(), first);
    }
}
