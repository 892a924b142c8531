//! # Cursor Mover Worker
//!
//! Nudges the host pointer by the current [`CursorDelta`] on every tick,
//! independently of packet arrival. A joystick held off-center keeps the
//! pointer moving until an update reports it back inside the deadzone.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::control::cursor::{CursorDelta, CursorReader};
use crate::error::Result;
use crate::hid::HidInjector;
use crate::supervisor::WorkerHandle;

/// Pointer target one tick after `(x, y)`.
///
/// The y axis is inverted (screen origin is top-left, joystick up is
/// positive). Both coordinates stay non-negative so the pointer does not wrap
/// to the opposite edge of a multi-monitor desktop.
///
/// # Examples
///
/// ```
/// use nunchuk_receiver::control::cursor::CursorDelta;
/// use nunchuk_receiver::workers::cursor_mover::next_position;
///
/// assert_eq!(next_position((100, 100), CursorDelta::new(72, 10)), (172, 90));
/// assert_eq!(next_position((5, 5), CursorDelta::new(-72, -10)), (0, 15));
/// ```
#[must_use]
pub fn next_position((x, y): (i32, i32), delta: CursorDelta) -> (i32, i32) {
    (
        x.saturating_add(delta.dx).max(0),
        y.saturating_sub(delta.dy).max(0),
    )
}

/// Fixed-rate pointer driver
pub struct CursorMover {
    tick: Duration,
    cursor: CursorReader,
    injector: Arc<dyn HidInjector>,
}

impl CursorMover {
    #[must_use]
    pub fn new(tick: Duration, cursor: CursorReader, injector: Arc<dyn HidInjector>) -> Self {
        Self {
            tick,
            cursor,
            injector,
        }
    }

    fn nudge(&self) -> Result<()> {
        let position = self.injector.pointer_position()?;
        let delta = self.cursor.current();
        let (x, y) = next_position(position, delta);

        if !delta.is_idle() {
            debug!("New position ({}, {}), delta ({}, {})", x, y, delta.dx, delta.dy);
        }

        self.injector.move_pointer_smoothly(x, y)
    }

    pub async fn run(self, handle: WorkerHandle) {
        info!("Starting cursor mover ({:?} tick)", self.tick);

        loop {
            if let Err(e) = self.nudge() {
                return handle.fail(e);
            }

            tokio::select! {
                _ = handle.cancelled() => break,
                _ = sleep(self.tick) => {}
            }
        }

        info!("Shutdown cursor mover");
        handle.complete();
    }
}
