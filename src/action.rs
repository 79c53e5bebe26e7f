//! Click actions and delay helpers.

use std::time::Duration;

use crate::input::Coordinates;

/// Replacement delay for actions whose delay is zero or negative.
pub const DEFAULT_MIN_DELAY_MS: i64 = 100;

/// Delay given to freshly added points.
pub const DEFAULT_DELAY_MS: i64 = 1000;

/// A screen point clicked on a fixed interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickAction {
    pub id: u64,
    pub x: i32,
    pub y: i32,
    /// Advisory interval in milliseconds. Non-positive values are replaced
    /// by the scheduler's minimum delay.
    pub delay_ms: i64,
}

impl ClickAction {
    pub fn new(id: u64, x: i32, y: i32, delay_ms: i64) -> Self {
        ClickAction { id, x, y, delay_ms }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.x, self.y)
    }

    /// The interval actually used for scheduling.
    ///
    /// Non-positive delays are clamped to `min_delay` instead of being
    /// rejected, so an action can never spin in a busy loop.
    pub fn effective_delay(&self, min_delay: Duration) -> Duration {
        if self.delay_ms <= 0 {
            min_delay
        } else {
            Duration::from_millis(self.delay_ms as u64)
        }
    }
}

/// Parse a delay given either as plain milliseconds (`"250"`) or as a
/// `1h2m3s` style duration (any subset of the units, in that order).
pub fn parse_delay(s: &str) -> Result<i64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Delay must not be empty".to_string());
    }
    if let Ok(ms) = s.parse::<i64>() {
        return Ok(ms);
    }
    let magnitude = s.strip_prefix('-').unwrap_or(s);
    if !magnitude.is_empty() && magnitude.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("Delay '{}' is too large", s));
    }

    let mut total: i64 = 0;
    let mut digits = String::new();
    let mut last_unit = 0u8;
    for c in s.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let (rank, factor) = match c {
            'h' | 'H' => (1, 3_600_000),
            'm' | 'M' => (2, 60_000),
            's' | 'S' => (3, 1_000),
            _ => return Err(format!("Invalid character '{}' in delay '{}'", c, s)),
        };
        if rank <= last_unit {
            return Err(format!("Units out of order in delay '{}'. Use e.g. 1h2m3s", s));
        }
        if digits.is_empty() {
            return Err(format!("Missing number before '{}' in delay '{}'", c, s));
        }
        let value: i64 = digits
            .parse()
            .map_err(|_| format!("Number '{}' is too large in delay '{}'", digits, s))?;
        total = total.saturating_add(value.saturating_mul(factor));
        digits.clear();
        last_unit = rank;
    }
    if !digits.is_empty() {
        return Err(format!("Trailing number without unit in delay '{}'", s));
    }
    Ok(total)
}

/// Render milliseconds as `1h2m3s`, dropping zero components.
/// Sub-second remainders are shown as `ms`.
pub fn format_delay(delay_ms: i64) -> String {
    if delay_ms <= 0 {
        return format!("{}ms", delay_ms);
    }
    let hours = delay_ms / 3_600_000;
    let minutes = (delay_ms / 60_000) % 60;
    let seconds = (delay_ms / 1_000) % 60;
    let millis = delay_ms % 1_000;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{}h", hours));
    }
    if minutes > 0 {
        out.push_str(&format!("{}m", minutes));
    }
    if seconds > 0 {
        out.push_str(&format!("{}s", seconds));
    }
    if millis > 0 {
        out.push_str(&format!("{}ms", millis));
    }
    out
}
