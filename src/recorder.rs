//! Capturing a screen point from the user's next click.

use std::sync::Arc;

use crate::input::Coordinates;
use crate::multiplexer::{InputMultiplexer, RecordError};

/// Records coordinates by waiting for the next left click anywhere on screen.
///
/// Only one recording may be pending at a time across the whole
/// multiplexer. There is no timeout: a pending recording resolves on the
/// next left click or when [`cancel`](Self::cancel) is called.
#[derive(Clone)]
pub struct CoordinateRecorder {
    multiplexer: Arc<InputMultiplexer>,
}

impl CoordinateRecorder {
    pub fn new(multiplexer: Arc<InputMultiplexer>) -> Self {
        CoordinateRecorder { multiplexer }
    }

    /// Wait for the next left mouse-down and return where it happened.
    pub async fn record(&self) -> Result<Coordinates, RecordError> {
        self.multiplexer.start()?;
        self.multiplexer.start_recording()?.wait().await
    }

    /// Abort the pending recording, if any.
    pub fn cancel(&self) -> bool {
        self.multiplexer.cancel_recording()
    }

    pub fn is_recording(&self) -> bool {
        self.multiplexer.is_recording()
    }
}
