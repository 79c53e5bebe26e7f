//! Pointer control: moving the cursor and clicking.

use std::sync::mpsc;
use std::thread;

use enigo::{Button, Coordinate, Direction, Enigo, Mouse, Settings};
use parking_lot::Mutex;

use crate::input::Coordinates;

#[derive(Debug, thiserror::Error)]
pub enum PointerError {
    #[error("Failed to connect to the input backend: {0}")]
    Init(String),
    #[error("Failed to move pointer to {at}: {message}")]
    Move { at: Coordinates, message: String },
    #[error("Failed to click at {at}: {message}")]
    Click { at: Coordinates, message: String },
}

/// Something that can put the cursor on a point and left-click it.
pub trait Pointer: Send + Sync {
    /// Move to `at` and left-click. Implementations must perform the move and
    /// the click as one step so concurrent callers cannot interleave them.
    fn click_at(&self, at: Coordinates) -> Result<(), PointerError>;
}

struct ClickRequest {
    at: Coordinates,
    reply: mpsc::SyncSender<Result<(), PointerError>>,
}

/// The real OS pointer, driven through enigo.
///
/// The enigo connection is not thread-safe on every platform, so it lives on
/// its own thread and clicks are sent to it one at a time.
pub struct EnigoPointer {
    requests: Mutex<mpsc::Sender<ClickRequest>>,
}

impl EnigoPointer {
    pub fn new() -> Result<Self, PointerError> {
        let (requests, incoming) = mpsc::channel::<ClickRequest>();
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);

        thread::Builder::new()
            .name("pointer".to_string())
            .spawn(move || {
                let mut enigo = match Enigo::new(&Settings::default()) {
                    Ok(enigo) => {
                        let _ = ready_tx.send(Ok(()));
                        enigo
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(PointerError::Init(e.to_string())));
                        return;
                    }
                };
                for request in incoming {
                    let _ = request.reply.send(move_and_click(&mut enigo, request.at));
                }
                log::debug!("Pointer thread finished");
            })
            .map_err(|e| PointerError::Init(e.to_string()))?;

        ready_rx
            .recv()
            .map_err(|_| PointerError::Init("pointer thread exited during setup".to_string()))??;
        Ok(EnigoPointer {
            requests: Mutex::new(requests),
        })
    }
}

impl Pointer for EnigoPointer {
    fn click_at(&self, at: Coordinates) -> Result<(), PointerError> {
        let gone = || PointerError::Click {
            at,
            message: "pointer thread is gone".to_string(),
        };
        let (reply, result) = mpsc::sync_channel(1);
        self.requests
            .lock()
            .send(ClickRequest { at, reply })
            .map_err(|_| gone())?;
        result.recv().map_err(|_| gone())?
    }
}

fn move_and_click(enigo: &mut Enigo, at: Coordinates) -> Result<(), PointerError> {
    enigo
        .move_mouse(at.x, at.y, Coordinate::Abs)
        .map_err(|e| PointerError::Move {
            at,
            message: e.to_string(),
        })?;
    enigo
        .button(Button::Left, Direction::Click)
        .map_err(|e| PointerError::Click {
            at,
            message: e.to_string(),
        })
}

/// Logs clicks instead of performing them.
#[derive(Debug, Default)]
pub struct DryRunPointer;

impl Pointer for DryRunPointer {
    fn click_at(&self, at: Coordinates) -> Result<(), PointerError> {
        log::info!("(dry run) click at {}", at);
        Ok(())
    }
}
