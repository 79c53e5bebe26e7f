//! The editable list of click points.

use parking_lot::Mutex;

use crate::action::{ClickAction, DEFAULT_DELAY_MS};

struct Points {
    points: Vec<ClickAction>,
    next_id: u64,
}

/// Ordered click points with monotonically assigned ids.
///
/// Ids start at 1 and are never reused, even after removal.
pub struct ActionRegistry {
    inner: Mutex<Points>,
    default_delay_ms: i64,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::with_default_delay(DEFAULT_DELAY_MS)
    }

    /// Registry whose new points start with `default_delay_ms`.
    pub fn with_default_delay(default_delay_ms: i64) -> Self {
        ActionRegistry {
            inner: Mutex::new(Points {
                points: Vec::new(),
                next_id: 1,
            }),
            default_delay_ms,
        }
    }

    /// Append a point at (0, 0) with the default delay.
    pub fn add(&self) -> ClickAction {
        self.add_at(0, 0, self.default_delay_ms)
    }

    /// Append a point with explicit coordinates and delay.
    pub fn add_at(&self, x: i32, y: i32, delay_ms: i64) -> ClickAction {
        let mut inner = self.inner.lock();
        let point = ClickAction::new(inner.next_id, x, y, delay_ms);
        inner.next_id += 1;
        inner.points.push(point);
        point
    }

    /// Copy of all points in insertion order.
    pub fn snapshot(&self) -> Vec<ClickAction> {
        self.inner.lock().points.clone()
    }

    pub fn get(&self, id: u64) -> Option<ClickAction> {
        self.inner.lock().points.iter().find(|p| p.id == id).copied()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn update_coordinates(&self, id: u64, x: i32, y: i32) -> bool {
        self.update(id, |point| {
            point.x = x;
            point.y = y;
        })
    }

    pub fn update_delay(&self, id: u64, delay_ms: i64) -> bool {
        self.update(id, |point| point.delay_ms = delay_ms)
    }

    pub fn remove(&self, id: u64) -> bool {
        let mut inner = self.inner.lock();
        match inner.points.iter().position(|p| p.id == id) {
            Some(index) => {
                inner.points.remove(index);
                true
            }
            None => false,
        }
    }

    fn update(&self, id: u64, apply: impl FnOnce(&mut ClickAction)) -> bool {
        let mut inner = self.inner.lock();
        match inner.points.iter_mut().find(|p| p.id == id) {
            Some(point) => {
                apply(point);
                true
            }
            None => false,
        }
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
