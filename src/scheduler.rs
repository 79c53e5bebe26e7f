//! Click scheduling engine.
//!
//! A [`ClickScheduler`] is either idle or running exactly one cycle. Each
//! cycle takes a snapshot of the configured actions, gets its own
//! [`CancelSignal`] and its own workers:
//!
//! - parallel mode: one worker per action, each on its own interval
//! - sequential mode: one worker walking the snapshot in order, waiting each
//!   action's delay before clicking it
//!
//! A completion watcher joins the cycle's workers and only then invokes the
//! stop callback, outside the scheduler lock.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures_util::future::join_all;
use parking_lot::Mutex;
use serde::Deserialize;
use tokio::runtime::Handle;
use tokio::task::{self, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::action::{ClickAction, DEFAULT_MIN_DELAY_MS};
use crate::cancel::CancelSignal;
use crate::input::Hotkey;
use crate::multiplexer::InputMultiplexer;
use crate::pointer::Pointer;

/// Notification target for stop and visibility events.
pub type SchedulerCallback = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClickMode {
    /// Every action clicks on its own timer.
    #[default]
    Parallel,
    /// One action at a time, in order, wrapping around.
    Sequential,
}

/// Keys the scheduler binds on the multiplexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyBindings {
    pub stop: Hotkey,
    pub visibility: Option<Hotkey>,
}

impl Default for HotkeyBindings {
    fn default() -> Self {
        HotkeyBindings {
            stop: Hotkey::F10,
            visibility: Some(Hotkey::F9),
        }
    }
}

struct Cycle {
    id: u64,
    cancel: CancelSignal,
    snapshot: Arc<[ClickAction]>,
}

enum SchedulerState {
    Idle,
    Running(Cycle),
}

struct HotkeyLink {
    multiplexer: Arc<InputMultiplexer>,
    bindings: HotkeyBindings,
}

struct Inner {
    state: SchedulerState,
    /// Working set for the next cycle.
    actions: Vec<ClickAction>,
    mode: ClickMode,
    min_delay: Duration,
    /// Live worker count of the most recent cycle.
    workers: Arc<AtomicUsize>,
    on_stop: Option<SchedulerCallback>,
    on_visibility: Option<SchedulerCallback>,
    hotkeys: Option<Arc<HotkeyLink>>,
}

pub struct ClickScheduler {
    inner: Arc<Mutex<Inner>>,
    pointer: Arc<dyn Pointer>,
    runtime: Handle,
    next_cycle: AtomicU64,
}

impl ClickScheduler {
    /// Create an idle scheduler clicking through `pointer`. Workers are
    /// spawned on `runtime`.
    pub fn new(pointer: Arc<dyn Pointer>, runtime: Handle) -> Self {
        ClickScheduler {
            inner: Arc::new(Mutex::new(Inner {
                state: SchedulerState::Idle,
                actions: Vec::new(),
                mode: ClickMode::default(),
                min_delay: Duration::from_millis(DEFAULT_MIN_DELAY_MS as u64),
                workers: Arc::new(AtomicUsize::new(0)),
                on_stop: None,
                on_visibility: None,
                hotkeys: None,
            })),
            pointer,
            runtime,
            next_cycle: AtomicU64::new(1),
        }
    }

    /// Start a cycle over the current actions.
    ///
    /// Does nothing (and returns false) when already running or when there
    /// are no actions.
    pub fn start(&self) -> bool {
        let mut inner = self.inner.lock();
        if matches!(inner.state, SchedulerState::Running(_)) || inner.actions.is_empty() {
            return false;
        }

        let id = self.next_cycle.fetch_add(1, Ordering::SeqCst);
        let snapshot: Arc<[ClickAction]> = inner.actions.clone().into();
        let cancel = CancelSignal::new();
        let workers = Arc::new(AtomicUsize::new(0));
        let min_delay = inner.min_delay;

        let handles: Vec<JoinHandle<()>> = match inner.mode {
            ClickMode::Parallel => snapshot
                .iter()
                .map(|action| {
                    let period = action.effective_delay(min_delay);
                    self.spawn_worker(
                        &workers,
                        run_periodic(*action, period, self.pointer.clone(), cancel.clone()),
                    )
                })
                .collect(),
            ClickMode::Sequential => vec![self.spawn_worker(
                &workers,
                run_sequential(
                    snapshot.clone(),
                    min_delay,
                    self.pointer.clone(),
                    cancel.clone(),
                ),
            )],
        };

        log::info!(
            "Click cycle {} started: {} action(s), {:?} mode",
            id,
            snapshot.len(),
            inner.mode
        );
        inner.workers = workers;
        inner.state = SchedulerState::Running(Cycle {
            id,
            cancel,
            snapshot,
        });
        drop(inner);

        let inner = Arc::clone(&self.inner);
        self.runtime.spawn(async move {
            for result in join_all(handles).await {
                if let Err(e) = result {
                    log::error!("Click worker ended abnormally: {}", e);
                }
            }
            finish_cycle(&inner, id);
        });
        true
    }

    /// Signal the running cycle to stop. Returns false when already idle.
    ///
    /// Returns as soon as the cycle is cancelled; the stop callback fires
    /// later, once every worker has exited.
    pub fn stop(&self) -> bool {
        let previous = std::mem::replace(&mut self.inner.lock().state, SchedulerState::Idle);
        let SchedulerState::Running(cycle) = previous else {
            return false;
        };
        cycle.cancel.cancel();
        log::info!("Click cycle {} stopping", cycle.id);
        true
    }

    pub fn is_running(&self) -> bool {
        matches!(self.inner.lock().state, SchedulerState::Running(_))
    }

    /// Replace the actions used by the next [`start`](Self::start). A
    /// running cycle keeps its own snapshot.
    pub fn set_actions(&self, actions: Vec<ClickAction>) {
        self.inner.lock().actions = actions;
    }

    pub fn actions(&self) -> Vec<ClickAction> {
        self.inner.lock().actions.clone()
    }

    /// Snapshot of the running cycle, if any.
    pub fn running_actions(&self) -> Option<Arc<[ClickAction]>> {
        match &self.inner.lock().state {
            SchedulerState::Running(cycle) => Some(Arc::clone(&cycle.snapshot)),
            SchedulerState::Idle => None,
        }
    }

    /// Mode for the next cycle.
    pub fn set_mode(&self, mode: ClickMode) {
        self.inner.lock().mode = mode;
    }

    pub fn mode(&self) -> ClickMode {
        self.inner.lock().mode
    }

    /// Delay substituted for non-positive action delays in the next cycle.
    pub fn set_min_delay(&self, min_delay: Duration) {
        self.inner.lock().min_delay = min_delay;
    }

    /// Workers of the most recent cycle that have not exited yet.
    pub fn active_workers(&self) -> usize {
        self.inner.lock().workers.load(Ordering::SeqCst)
    }

    /// Replace the stop notification target.
    pub fn set_stop_callback(&self, callback: SchedulerCallback) {
        self.inner.lock().on_stop = Some(callback);
    }

    /// Replace the target of the visibility hotkey.
    pub fn set_visibility_callback(&self, callback: SchedulerCallback) {
        self.inner.lock().on_visibility = Some(callback);
    }

    /// Register the stop hotkey (and optionally the visibility hotkey) on
    /// `multiplexer`. Both start disabled.
    ///
    /// The callbacks hold only weak references, so the multiplexer does not
    /// keep the scheduler alive.
    pub fn attach_hotkeys(
        self: &Arc<Self>,
        multiplexer: Arc<InputMultiplexer>,
        bindings: HotkeyBindings,
    ) {
        let scheduler: Weak<ClickScheduler> = Arc::downgrade(self);
        multiplexer.register_hotkey(
            bindings.stop,
            Arc::new(move || {
                if let Some(scheduler) = scheduler.upgrade() {
                    if scheduler.is_running() {
                        scheduler.stop();
                    }
                }
            }),
        );

        if let Some(key) = bindings.visibility {
            let inner = Arc::downgrade(&self.inner);
            multiplexer.register_hotkey(
                key,
                Arc::new(move || {
                    let callback = inner
                        .upgrade()
                        .and_then(|inner| inner.lock().on_visibility.clone());
                    if let Some(callback) = callback {
                        callback();
                    }
                }),
            );
        }

        self.inner.lock().hotkeys = Some(Arc::new(HotkeyLink {
            multiplexer,
            bindings,
        }));
    }

    pub fn enable_stop_hotkey(&self) {
        if let Some(link) = self.hotkey_link() {
            link.multiplexer.enable_hotkey(link.bindings.stop);
        }
    }

    pub fn disable_stop_hotkey(&self) {
        if let Some(link) = self.hotkey_link() {
            link.multiplexer.disable_hotkey(link.bindings.stop);
        }
    }

    pub fn enable_visibility_hotkey(&self) {
        if let Some(link) = self.hotkey_link() {
            if let Some(key) = link.bindings.visibility {
                link.multiplexer.enable_hotkey(key);
            }
        }
    }

    // Cloned out so the multiplexer is never called under our lock.
    fn hotkey_link(&self) -> Option<Arc<HotkeyLink>> {
        self.inner.lock().hotkeys.clone()
    }

    fn spawn_worker<F>(&self, workers: &Arc<AtomicUsize>, work: F) -> JoinHandle<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let guard = WorkerGuard::enter(workers);
        self.runtime.spawn(async move {
            let _guard = guard;
            work.await;
        })
    }
}

impl Drop for ClickScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Runs after every worker of cycle `id` has exited.
fn finish_cycle(inner: &Mutex<Inner>, id: u64) {
    let callback = {
        let mut inner = inner.lock();
        // Still marked running means the workers died without a stop.
        let orphaned = matches!(&inner.state, SchedulerState::Running(cycle) if cycle.id == id);
        if orphaned {
            log::warn!("Click cycle {} ended without a stop request", id);
            inner.state = SchedulerState::Idle;
        }
        inner.on_stop.clone()
    };

    log::info!("Click cycle {} finished", id);
    if let Some(callback) = callback {
        callback();
    }
}

/// Counts a worker as live from spawn until its future is dropped.
struct WorkerGuard {
    workers: Arc<AtomicUsize>,
}

impl WorkerGuard {
    fn enter(workers: &Arc<AtomicUsize>) -> Self {
        workers.fetch_add(1, Ordering::SeqCst);
        WorkerGuard {
            workers: Arc::clone(workers),
        }
    }
}

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        self.workers.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn run_periodic(
    action: ClickAction,
    period: Duration,
    pointer: Arc<dyn Pointer>,
    cancel: CancelSignal,
) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }
        if cancel.is_cancelled() {
            break;
        }
        click(&pointer, &action).await;
    }
}

async fn run_sequential(
    actions: Arc<[ClickAction]>,
    min_delay: Duration,
    pointer: Arc<dyn Pointer>,
    cancel: CancelSignal,
) {
    let mut index = 0;
    loop {
        let action = actions[index];
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = time::sleep(action.effective_delay(min_delay)) => {}
        }
        if cancel.is_cancelled() {
            break;
        }
        click(&pointer, &action).await;
        index = (index + 1) % actions.len();
    }
}

/// Pointer backends block until the OS has performed the click, so the call
/// runs on the blocking pool.
async fn click(pointer: &Arc<dyn Pointer>, action: &ClickAction) {
    let pointer = Arc::clone(pointer);
    let at = action.coordinates();
    match task::spawn_blocking(move || pointer.click_at(at)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => log::warn!("Click for point {} failed: {}", action.id, e),
        Err(e) => log::error!("Click task for point {} ended abnormally: {}", action.id, e),
    }
}
