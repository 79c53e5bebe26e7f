//! Operations exposed to a presentation layer.
//!
//! [`ClickerApp`] wires the registry, scheduler, recorder and multiplexer
//! together and reports state changes as [`ClickerEvent`]s.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::broadcast;

use crate::action::{ClickAction, DEFAULT_DELAY_MS, DEFAULT_MIN_DELAY_MS};
use crate::input::InputError;
use crate::multiplexer::{InputMultiplexer, RecordError};
use crate::pointer::Pointer;
use crate::recorder::CoordinateRecorder;
use crate::registry::ActionRegistry;
use crate::scheduler::{ClickMode, ClickScheduler, HotkeyBindings};

const EVENT_CAPACITY: usize = 64;

/// Notifications for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickerEvent {
    /// The clicker went from running to idle, for whatever reason.
    Stopped,
    /// The visibility hotkey was pressed.
    ToggleVisibility,
    /// Waiting for a click to capture the coordinates of point `id`.
    RecordingArmed { id: u64 },
    /// Recording for point `id` ended; `recorded` tells whether the point
    /// was updated.
    RecordingFinished { id: u64, recorded: bool },
}

/// Tunables for a [`ClickerApp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppSettings {
    pub mode: ClickMode,
    pub default_delay_ms: i64,
    pub min_delay: Duration,
    pub hotkeys: HotkeyBindings,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            mode: ClickMode::default(),
            default_delay_ms: DEFAULT_DELAY_MS,
            min_delay: Duration::from_millis(DEFAULT_MIN_DELAY_MS as u64),
            hotkeys: HotkeyBindings::default(),
        }
    }
}

pub struct ClickerApp {
    registry: ActionRegistry,
    scheduler: Arc<ClickScheduler>,
    recorder: CoordinateRecorder,
    multiplexer: Arc<InputMultiplexer>,
    events: broadcast::Sender<ClickerEvent>,
}

impl ClickerApp {
    pub fn new(
        multiplexer: Arc<InputMultiplexer>,
        pointer: Arc<dyn Pointer>,
        settings: AppSettings,
        runtime: Handle,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let scheduler = Arc::new(ClickScheduler::new(pointer, runtime));
        scheduler.set_mode(settings.mode);
        scheduler.set_min_delay(settings.min_delay);
        scheduler.attach_hotkeys(Arc::clone(&multiplexer), settings.hotkeys);

        let stopped = events.clone();
        scheduler.set_stop_callback(Arc::new(move || {
            let _ = stopped.send(ClickerEvent::Stopped);
        }));
        let visibility = events.clone();
        scheduler.set_visibility_callback(Arc::new(move || {
            let _ = visibility.send(ClickerEvent::ToggleVisibility);
        }));
        scheduler.enable_visibility_hotkey();

        ClickerApp {
            registry: ActionRegistry::with_default_delay(settings.default_delay_ms),
            scheduler,
            recorder: CoordinateRecorder::new(Arc::clone(&multiplexer)),
            multiplexer,
            events,
        }
    }

    /// Begin listening to global input. Safe to call repeatedly.
    pub fn start_input(&self) -> Result<(), InputError> {
        self.multiplexer.start()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClickerEvent> {
        self.events.subscribe()
    }

    pub fn add_point(&self) -> ClickAction {
        self.registry.add()
    }

    pub fn add_point_at(&self, x: i32, y: i32, delay_ms: i64) -> ClickAction {
        self.registry.add_at(x, y, delay_ms)
    }

    pub fn points(&self) -> Vec<ClickAction> {
        self.registry.snapshot()
    }

    pub fn update_point_coordinates(&self, id: u64, x: i32, y: i32) -> bool {
        self.registry.update_coordinates(id, x, y)
    }

    pub fn update_point_delay(&self, id: u64, delay_ms: i64) -> bool {
        self.registry.update_delay(id, delay_ms)
    }

    pub fn remove_point(&self, id: u64) -> bool {
        self.registry.remove(id)
    }

    /// Wait for the next left click and store its position in point `id`.
    ///
    /// `Ok(false)` means the click was captured but the point no longer
    /// exists.
    pub async fn record_coordinates(&self, id: u64) -> Result<bool, RecordError> {
        let _ = self.events.send(ClickerEvent::RecordingArmed { id });
        let result = self.recorder.record().await;
        let recorded = match &result {
            Ok(at) => self.registry.update_coordinates(id, at.x, at.y),
            Err(e) => {
                log::warn!("Recording for point {} failed: {}", id, e);
                false
            }
        };
        let _ = self.events.send(ClickerEvent::RecordingFinished { id, recorded });
        result.map(|_| recorded)
    }

    /// Abort a pending [`record_coordinates`](Self::record_coordinates).
    pub fn cancel_recording(&self) -> bool {
        self.recorder.cancel()
    }

    /// Snapshot the current points into the scheduler, start it and arm the
    /// stop hotkey. Returns whether a new cycle started.
    pub fn start_clicker(&self) -> bool {
        self.scheduler.set_actions(self.registry.snapshot());
        let started = self.scheduler.start();
        self.scheduler.enable_stop_hotkey();
        started
    }

    /// Stop the scheduler and disarm the stop hotkey.
    pub fn stop_clicker(&self) -> bool {
        let stopped = self.scheduler.stop();
        self.scheduler.disable_stop_hotkey();
        stopped
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Mode used from the next [`start_clicker`](Self::start_clicker) on.
    pub fn set_mode(&self, mode: ClickMode) {
        self.scheduler.set_mode(mode);
    }

    pub fn mode(&self) -> ClickMode {
        self.scheduler.mode()
    }

    pub fn scheduler(&self) -> &Arc<ClickScheduler> {
        &self.scheduler
    }

    /// Stop clicking, drop every hotkey and mute the input listener.
    pub fn shutdown(&self) {
        self.stop_clicker();
        self.multiplexer.disable_hotkeys();
        self.multiplexer.stop();
    }
}
