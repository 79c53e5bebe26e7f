//! Global keyboard/mouse subscription backed by rdev.

use enigo::{Enigo, Mouse, Settings};
use rdev::{listen, Button, Event, EventType};

use super::{Coordinates, EventSink, Hotkey, InputError, InputEvent, InputSource, MouseButton};

/// The process-wide OS input hook.
///
/// On macOS this requires Accessibility permission; on Linux it needs an X11
/// session. rdev offers no way to unhook, so the listening thread lives until
/// the process exits.
#[derive(Debug, Default)]
pub struct RdevSource;

impl RdevSource {
    pub fn new() -> Self {
        RdevSource
    }
}

impl InputSource for RdevSource {
    fn listen(self: Box<Self>, mut sink: EventSink) -> Result<(), InputError> {
        let mut tracker = PositionTracker::default();

        let callback = move |event: Event| match event.event_type {
            EventType::MouseMove { x, y } => tracker.moved(x, y),
            EventType::ButtonPress(button) => sink(InputEvent::MouseDown {
                button: map_button(button),
                at: tracker.current(cursor_location),
            }),
            EventType::KeyPress(key) => {
                if let Some(hotkey) = Hotkey::from_rdev(key) {
                    sink(InputEvent::KeyDown(hotkey));
                }
            }
            EventType::KeyRelease(key) => {
                if let Some(hotkey) = Hotkey::from_rdev(key) {
                    sink(InputEvent::KeyUp(hotkey));
                }
            }
            _ => {}
        };

        log::debug!("Installing global input hook");
        listen(callback).map_err(|e| InputError::Listen(format!("{:?}", e)))
    }
}

/// Pointer position as seen by the hook.
///
/// rdev button events carry no position, so the last move is used. Until a
/// move has been seen the OS cursor is queried instead.
#[derive(Debug, Default)]
struct PositionTracker {
    last: Option<Coordinates>,
}

impl PositionTracker {
    fn moved(&mut self, x: f64, y: f64) {
        self.last = Some(Coordinates::new(x.round() as i32, y.round() as i32));
    }

    fn current(&mut self, query: impl FnOnce() -> Option<Coordinates>) -> Coordinates {
        if let Some(at) = self.last {
            return at;
        }
        match query() {
            Some(at) => {
                self.last = Some(at);
                at
            }
            None => {
                log::warn!("Could not read the cursor position, using 0,0");
                Coordinates::default()
            }
        }
    }
}

fn cursor_location() -> Option<Coordinates> {
    let enigo = Enigo::new(&Settings::default()).ok()?;
    let (x, y) = enigo.location().ok()?;
    Some(Coordinates::new(x, y))
}

fn map_button(button: Button) -> MouseButton {
    match button {
        Button::Left => MouseButton::Left,
        Button::Right => MouseButton::Right,
        Button::Middle => MouseButton::Middle,
        Button::Unknown(_) => MouseButton::Other,
    }
}
