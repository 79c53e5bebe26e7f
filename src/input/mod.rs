//! Raw global input events and the sources that produce them.
//!
//! An [`InputSource`] owns one OS-level event subscription and pushes
//! [`InputEvent`]s into a sink until the subscription ends. The real source
//! is backed by rdev; [`ChannelSource`] replays scripted events for tests.

mod channel;
mod key;
mod rdev_source;

pub use channel::{ChannelSource, InputInjector};
pub use key::{Hotkey, ParseHotkeyError};
pub use rdev_source::RdevSource;

use std::fmt;

/// A screen position in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Coordinates {
    pub x: i32,
    pub y: i32,
}

impl Coordinates {
    pub const fn new(x: i32, y: i32) -> Self {
        Coordinates { x, y }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other,
}

/// Events the multiplexer cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(Hotkey),
    KeyUp(Hotkey),
    /// A mouse button went down while the pointer was at `at`.
    MouseDown { button: MouseButton, at: Coordinates },
}

/// Receives every event a source produces, on the source's own thread.
pub type EventSink = Box<dyn FnMut(InputEvent) + Send + 'static>;

/// Errors raised while bringing up or running an input subscription.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Failed to spawn input listener thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("Global input listener failed: {0}")]
    Listen(String),
}

/// A single global event subscription.
///
/// `listen` blocks the calling thread for as long as the subscription is
/// alive. It is called at most once per source.
pub trait InputSource: Send + 'static {
    fn listen(self: Box<Self>, sink: EventSink) -> Result<(), InputError>;
}
