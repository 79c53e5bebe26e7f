//! In-process input source fed through a channel.

use std::sync::mpsc::{self, Receiver, Sender};

use super::{Coordinates, EventSink, Hotkey, InputError, InputEvent, InputSource, MouseButton};

/// An [`InputSource`] that replays events pushed through an [`InputInjector`].
///
/// `listen` returns once every injector has been dropped.
pub struct ChannelSource {
    events: Receiver<InputEvent>,
}

/// Sending half of a [`ChannelSource`].
#[derive(Clone)]
pub struct InputInjector {
    events: Sender<InputEvent>,
}

impl ChannelSource {
    pub fn new() -> (InputInjector, ChannelSource) {
        let (tx, rx) = mpsc::channel();
        (InputInjector { events: tx }, ChannelSource { events: rx })
    }
}

impl InputSource for ChannelSource {
    fn listen(self: Box<Self>, mut sink: EventSink) -> Result<(), InputError> {
        for event in self.events.iter() {
            sink(event);
        }
        Ok(())
    }
}

impl InputInjector {
    /// Push a raw event. Returns false once the source has gone away.
    pub fn send(&self, event: InputEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// A full key press: key-down followed by key-up.
    pub fn tap(&self, key: Hotkey) -> bool {
        self.send(InputEvent::KeyDown(key)) && self.send(InputEvent::KeyUp(key))
    }

    pub fn click(&self, button: MouseButton, x: i32, y: i32) -> bool {
        self.send(InputEvent::MouseDown {
            button,
            at: Coordinates::new(x, y),
        })
    }
}
