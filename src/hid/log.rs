//! Dry-run injector that logs actions instead of performing them.

use std::sync::Mutex;
use tracing::debug;

use super::pointer::PointerTracker;
use super::{lock_poisoned, HidInjector};
use crate::control::mapper::MouseButton;
use crate::error::Result;

/// Logs every action at `debug` and tracks a virtual pointer.
#[derive(Debug)]
pub struct LogInjector {
    pointer: Mutex<PointerTracker>,
}

impl LogInjector {
    #[must_use]
    pub fn new(screen_width: i32, screen_height: i32) -> Self {
        Self {
            pointer: Mutex::new(PointerTracker::centered(screen_width, screen_height)),
        }
    }
}

impl HidInjector for LogInjector {
    fn press_button(&self, button: MouseButton) -> Result<()> {
        debug!(?button, "press");
        Ok(())
    }

    fn release_button(&self, button: MouseButton) -> Result<()> {
        debug!(?button, "release");
        Ok(())
    }

    fn pointer_position(&self) -> Result<(i32, i32)> {
        Ok(self.pointer.lock().map_err(lock_poisoned)?.position())
    }

    fn move_pointer_smoothly(&self, x: i32, y: i32) -> Result<()> {
        let mut pointer = self.pointer.lock().map_err(lock_poisoned)?;
        pointer.glide_to(x, y, 1);
        let (nx, ny) = pointer.position();
        debug!(x = nx, y = ny, "move");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracks_moves() {
        let injector = LogInjector::new(640, 480);
        assert_eq!(injector.pointer_position().unwrap(), (320, 240));

        injector.move_pointer_smoothly(10, 20).unwrap();
        assert_eq!(injector.pointer_position().unwrap(), (10, 20));

        injector.move_pointer_smoothly(5000, 5000).unwrap();
        assert_eq!(injector.pointer_position().unwrap(), (639, 479));
    }

    #[test]
    fn test_buttons_never_fail() {
        let injector = LogInjector::new(640, 480);
        assert!(injector.press_button(MouseButton::Primary).is_ok());
        assert!(injector.release_button(MouseButton::Secondary).is_ok());
    }
}
