//! Symbolic names for keys that can be bound as global hotkeys.

use std::fmt;
use std::str::FromStr;

/// Keys usable as global hotkeys.
///
/// Limited to keys that rarely carry meaning inside other applications,
/// so binding them globally does not get in the user's way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hotkey {
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    Escape,
    Pause,
    ScrollLock,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
}

const NAMES: &[(Hotkey, &str)] = &[
    (Hotkey::F1, "f1"),
    (Hotkey::F2, "f2"),
    (Hotkey::F3, "f3"),
    (Hotkey::F4, "f4"),
    (Hotkey::F5, "f5"),
    (Hotkey::F6, "f6"),
    (Hotkey::F7, "f7"),
    (Hotkey::F8, "f8"),
    (Hotkey::F9, "f9"),
    (Hotkey::F10, "f10"),
    (Hotkey::F11, "f11"),
    (Hotkey::F12, "f12"),
    (Hotkey::Escape, "escape"),
    (Hotkey::Pause, "pause"),
    (Hotkey::ScrollLock, "scrolllock"),
    (Hotkey::Insert, "insert"),
    (Hotkey::Home, "home"),
    (Hotkey::End, "end"),
    (Hotkey::PageUp, "pageup"),
    (Hotkey::PageDown, "pagedown"),
];

impl Hotkey {
    pub fn name(self) -> &'static str {
        NAMES
            .iter()
            .find(|(key, _)| *key == self)
            .map(|(_, name)| *name)
            .unwrap_or("unknown")
    }

    /// Map an rdev key to a bindable hotkey. Keys outside the bindable set
    /// map to `None` and are never dispatched.
    pub fn from_rdev(key: rdev::Key) -> Option<Self> {
        use rdev::Key;

        let hotkey = match key {
            Key::F1 => Hotkey::F1,
            Key::F2 => Hotkey::F2,
            Key::F3 => Hotkey::F3,
            Key::F4 => Hotkey::F4,
            Key::F5 => Hotkey::F5,
            Key::F6 => Hotkey::F6,
            Key::F7 => Hotkey::F7,
            Key::F8 => Hotkey::F8,
            Key::F9 => Hotkey::F9,
            Key::F10 => Hotkey::F10,
            Key::F11 => Hotkey::F11,
            Key::F12 => Hotkey::F12,
            Key::Escape => Hotkey::Escape,
            Key::Pause => Hotkey::Pause,
            Key::ScrollLock => Hotkey::ScrollLock,
            Key::Insert => Hotkey::Insert,
            Key::Home => Hotkey::Home,
            Key::End => Hotkey::End,
            Key::PageUp => Hotkey::PageUp,
            Key::PageDown => Hotkey::PageDown,
            _ => return None,
        };
        Some(hotkey)
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown hotkey '{0}'. Use one of: f1-f12, escape, pause, scrolllock, insert, home, end, pageup, pagedown")]
pub struct ParseHotkeyError(pub String);

impl FromStr for Hotkey {
    type Err = ParseHotkeyError;

    /// Case-insensitive; `_`, `-` and spaces are ignored, and `esc` is
    /// accepted for `escape`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        let normalized = if normalized == "esc" {
            "escape".to_string()
        } else {
            normalized
        };

        NAMES
            .iter()
            .find(|(_, name)| *name == normalized)
            .map(|(key, _)| *key)
            .ok_or_else(|| ParseHotkeyError(s.to_string()))
    }
}
