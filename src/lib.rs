//! clickloop library crate.
//!
//! Click scheduling engine and global input multiplexer behind the
//! `clickloop` binary, exposed for integration testing and embedding in
//! other front ends.

pub mod action;
pub mod app;
pub mod cancel;
pub mod config;
pub mod input;
pub mod logging;
pub mod multiplexer;
pub mod pointer;
pub mod recorder;
pub mod registry;
pub mod scheduler;

pub use action::ClickAction;
pub use app::{AppSettings, ClickerApp, ClickerEvent};
pub use cancel::CancelSignal;
pub use input::{Coordinates, Hotkey, InputEvent, InputSource};
pub use multiplexer::{HotkeyCallback, InputMultiplexer, RecordError, RecordingHandle};
pub use recorder::CoordinateRecorder;
pub use registry::ActionRegistry;
pub use scheduler::{ClickMode, ClickScheduler, HotkeyBindings, SchedulerCallback};
