//! Fan-out of the single global input subscription.
//!
//! The OS exposes one global event hook per process. [`InputMultiplexer`]
//! owns it and splits it into two consumers:
//!
//! - hotkey dispatch: registered keys with an enabled flag and a callback
//! - coordinate recording: a one-shot request fulfilled by the next left click
//!
//! Callbacks are never run on the listener thread or under the
//! multiplexer's locks. Each triggered callback is handed to the tokio
//! blocking pool, so a callback may freely call back into the multiplexer.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::oneshot;

use crate::input::{Coordinates, Hotkey, InputError, InputEvent, InputSource, MouseButton};

/// Zero-argument action bound to a hotkey.
pub type HotkeyCallback = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// Only one recording request may be pending at a time.
    #[error("A coordinate recording is already in progress")]
    AlreadyRecording,
    #[error("Coordinate recording was cancelled")]
    Cancelled,
    #[error(transparent)]
    Input(#[from] InputError),
}

struct HotkeyEntry {
    enabled: bool,
    callback: HotkeyCallback,
}

struct Shared {
    /// False while stopped; events are dropped.
    active: AtomicBool,
    hotkeys: Mutex<HashMap<Hotkey, HotkeyEntry>>,
    /// Keys currently held down, for auto-repeat suppression.
    held: Mutex<HashSet<Hotkey>>,
    recording: Mutex<Option<oneshot::Sender<Coordinates>>>,
    runtime: Handle,
}

/// Owner of the global input subscription.
pub struct InputMultiplexer {
    shared: Arc<Shared>,
    source: Mutex<Option<Box<dyn InputSource>>>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl InputMultiplexer {
    /// Create a multiplexer over `source`. Nothing is listened to until
    /// [`start`](Self::start). Hotkey callbacks are spawned on `runtime`.
    pub fn new(source: Box<dyn InputSource>, runtime: Handle) -> Self {
        InputMultiplexer {
            shared: Arc::new(Shared {
                active: AtomicBool::new(false),
                hotkeys: Mutex::new(HashMap::new()),
                held: Mutex::new(HashSet::new()),
                recording: Mutex::new(None),
                runtime,
            }),
            source: Mutex::new(Some(source)),
            listener: Mutex::new(None),
        }
    }

    /// Begin (or resume) dispatching events.
    ///
    /// The listener thread is spawned on the first call only; concurrent
    /// callers race for the source under a lock, so at most one thread is
    /// ever created.
    pub fn start(&self) -> Result<(), InputError> {
        self.shared.active.store(true, Ordering::SeqCst);

        let mut source_slot = self.source.lock();
        let Some(source) = source_slot.take() else {
            return Ok(());
        };

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("input-listener".to_string())
            .spawn(move || {
                let sink_shared = Arc::clone(&shared);
                let result = source.listen(Box::new(move |event| sink_shared.dispatch(event)));
                match result {
                    Ok(()) => log::info!("Input listener finished"),
                    Err(e) => log::error!("{}", e),
                }
            });

        match spawned {
            Ok(handle) => {
                log::info!("Input listener started");
                *self.listener.lock() = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.shared.active.store(false, Ordering::SeqCst);
                Err(InputError::Spawn(e))
            }
        }
    }

    /// Stop dispatching events and cancel any pending recording.
    ///
    /// The OS hook cannot be removed, so the listener thread keeps running
    /// and its events are discarded until [`start`](Self::start) is called
    /// again.
    pub fn stop(&self) {
        if self.shared.active.swap(false, Ordering::SeqCst) {
            log::info!("Input dispatch stopped");
        }
        self.shared.held.lock().clear();
        self.cancel_recording();
    }

    pub fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::SeqCst)
    }

    /// True while the listener thread is alive.
    pub fn is_listening(&self) -> bool {
        self.listener
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Register `key`, initially disabled. Registering a key again replaces
    /// its callback and keeps its enabled state.
    pub fn register_hotkey(&self, key: Hotkey, callback: HotkeyCallback) {
        let mut hotkeys = self.shared.hotkeys.lock();
        match hotkeys.get_mut(&key) {
            Some(entry) => entry.callback = callback,
            None => {
                hotkeys.insert(
                    key,
                    HotkeyEntry {
                        enabled: false,
                        callback,
                    },
                );
            }
        }
    }

    /// Enable a registered hotkey. Unknown keys are ignored.
    pub fn enable_hotkey(&self, key: Hotkey) {
        self.set_enabled(key, true);
    }

    /// Disable a registered hotkey. Unknown keys are ignored.
    pub fn disable_hotkey(&self, key: Hotkey) {
        self.set_enabled(key, false);
    }

    pub fn enable_hotkeys(&self) {
        self.set_all_enabled(true);
    }

    pub fn disable_hotkeys(&self) {
        self.set_all_enabled(false);
    }

    pub fn is_hotkey_enabled(&self, key: Hotkey) -> bool {
        self.shared
            .hotkeys
            .lock()
            .get(&key)
            .is_some_and(|entry| entry.enabled)
    }

    fn set_enabled(&self, key: Hotkey, enabled: bool) {
        if let Some(entry) = self.shared.hotkeys.lock().get_mut(&key) {
            entry.enabled = enabled;
            log::debug!(
                "Hotkey {} {}",
                key,
                if enabled { "enabled" } else { "disabled" }
            );
        }
    }

    fn set_all_enabled(&self, enabled: bool) {
        for entry in self.shared.hotkeys.lock().values_mut() {
            entry.enabled = enabled;
        }
    }

    /// Arm recording mode. The returned handle resolves with the position of
    /// the next left mouse-down seen by the listener.
    ///
    /// At most one request may be pending; a second call while one is armed
    /// fails with [`RecordError::AlreadyRecording`]. A request whose handle
    /// was dropped does not count as pending.
    pub fn start_recording(&self) -> Result<RecordingHandle, RecordError> {
        let mut slot = self.shared.recording.lock();
        if slot.as_ref().is_some_and(|tx| !tx.is_closed()) {
            return Err(RecordError::AlreadyRecording);
        }
        let (tx, rx) = oneshot::channel();
        *slot = Some(tx);
        log::info!("Recording armed, waiting for a left click");
        Ok(RecordingHandle { rx })
    }

    /// Disarm a pending recording. Its waiter resolves with
    /// [`RecordError::Cancelled`]. Returns whether a request was pending.
    pub fn cancel_recording(&self) -> bool {
        let cancelled = self.shared.recording.lock().take().is_some();
        if cancelled {
            log::info!("Recording cancelled");
        }
        cancelled
    }

    pub fn is_recording(&self) -> bool {
        self.shared
            .recording
            .lock()
            .as_ref()
            .is_some_and(|tx| !tx.is_closed())
    }
}

impl Shared {
    fn dispatch(&self, event: InputEvent) {
        if !self.active.load(Ordering::SeqCst) {
            return;
        }

        match event {
            InputEvent::KeyDown(key) => {
                if !self.held.lock().insert(key) {
                    return;
                }
                let callback = self
                    .hotkeys
                    .lock()
                    .get(&key)
                    .filter(|entry| entry.enabled)
                    .map(|entry| Arc::clone(&entry.callback));
                if let Some(callback) = callback {
                    log::debug!("Hotkey {} pressed", key);
                    self.runtime.spawn_blocking(move || callback());
                }
            }
            InputEvent::KeyUp(key) => {
                self.held.lock().remove(&key);
            }
            InputEvent::MouseDown {
                button: MouseButton::Left,
                at,
            } => {
                let pending = self.recording.lock().take();
                if let Some(tx) = pending {
                    if tx.send(at).is_ok() {
                        log::info!("Recorded coordinates {}", at);
                    } else {
                        log::debug!("Recording request was abandoned before delivery");
                    }
                }
            }
            InputEvent::MouseDown { .. } => {}
        }
    }
}

/// A pending recording request.
pub struct RecordingHandle {
    rx: oneshot::Receiver<Coordinates>,
}

impl RecordingHandle {
    pub async fn wait(self) -> Result<Coordinates, RecordError> {
        self.rx.await.map_err(|_| RecordError::Cancelled)
    }
}
