//! # uinput Pointer Backend
//!
//! Creates a virtual relative pointer through `/dev/uinput` using evdev.
//!
//! uinput devices can emit events but cannot read the host cursor, so the
//! backend tracks the pointer it drives (starting at screen center) and turns
//! absolute targets into relative `REL_X`/`REL_Y` increments.
//!
//! The process needs write access to `/dev/uinput` (root, or the `input`
//! group with a matching udev rule).

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AttributeSet, EventType, InputEvent, Key, RelativeAxisType};
use std::sync::Mutex;
use tracing::{debug, info};

use super::pointer::PointerTracker;
use super::{lock_poisoned, HidInjector};
use crate::config::HidConfig;
use crate::control::mapper::MouseButton;
use crate::error::{ReceiverError, Result};

/// evdev key value for a pressed button
const KEY_PRESSED: i32 = 1;
/// evdev key value for a released button
const KEY_RELEASED: i32 = 0;

struct UinputState {
    device: VirtualDevice,
    pointer: PointerTracker,
}

/// Virtual pointer injecting through uinput
pub struct UinputInjector {
    state: Mutex<UinputState>,
    smooth_steps: u32,
}

impl std::fmt::Debug for UinputInjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UinputInjector")
            .field("smooth_steps", &self.smooth_steps)
            .finish_non_exhaustive()
    }
}

impl UinputInjector {
    /// Create the virtual pointer device, gliding in `smooth_steps`
    /// increments per move
    ///
    /// # Errors
    ///
    /// Returns `Hid` error if `/dev/uinput` cannot be opened or the device
    /// cannot be registered.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use nunchuk_receiver::config::HidConfig;
    /// use nunchuk_receiver::hid::uinput::UinputInjector;
    ///
    /// let injector = UinputInjector::create(&HidConfig::default(), 4)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn create(config: &HidConfig, smooth_steps: u32) -> Result<Self> {
        let mut keys = AttributeSet::<Key>::new();
        keys.insert(Key::BTN_LEFT);
        keys.insert(Key::BTN_RIGHT);

        let mut axes = AttributeSet::<RelativeAxisType>::new();
        axes.insert(RelativeAxisType::REL_X);
        axes.insert(RelativeAxisType::REL_Y);

        let device = VirtualDeviceBuilder::new()
            .and_then(|builder| builder.name(&config.device_name).with_keys(&keys))
            .and_then(|builder| builder.with_relative_axes(&axes))
            .and_then(|builder| builder.build())
            .map_err(|e| ReceiverError::Hid(format!("Failed to create uinput device: {}", e)))?;

        info!("Created uinput pointer '{}'", config.device_name);

        Ok(Self {
            state: Mutex::new(UinputState {
                device,
                pointer: PointerTracker::centered(config.screen_width, config.screen_height),
            }),
            smooth_steps: smooth_steps.max(1),
        })
    }

    fn emit_button(&self, button: MouseButton, value: i32) -> Result<()> {
        let key = button_key(button);
        let mut state = self.state.lock().map_err(lock_poisoned)?;
        state
            .device
            .emit(&[InputEvent::new(EventType::KEY, key.code(), value)])
            .map_err(|e| ReceiverError::Hid(format!("Failed to emit {:?}: {}", key, e)))
    }
}

fn button_key(button: MouseButton) -> Key {
    match button {
        MouseButton::Primary => Key::BTN_LEFT,
        MouseButton::Secondary => Key::BTN_RIGHT,
    }
}

impl HidInjector for UinputInjector {
    fn press_button(&self, button: MouseButton) -> Result<()> {
        self.emit_button(button, KEY_PRESSED)
    }

    fn release_button(&self, button: MouseButton) -> Result<()> {
        self.emit_button(button, KEY_RELEASED)
    }

    fn pointer_position(&self) -> Result<(i32, i32)> {
        Ok(self.state.lock().map_err(lock_poisoned)?.pointer.position())
    }

    fn move_pointer_smoothly(&self, x: i32, y: i32) -> Result<()> {
        let mut state = self.state.lock().map_err(lock_poisoned)?;
        let increments = state.pointer.glide_to(x, y, self.smooth_steps);

        for (dx, dy) in increments {
            // emit() appends the SYN_REPORT that groups each increment
            state
                .device
                .emit(&[
                    InputEvent::new(EventType::RELATIVE, RelativeAxisType::REL_X.0, dx),
                    InputEvent::new(EventType::RELATIVE, RelativeAxisType::REL_Y.0, dy),
                ])
                .map_err(|e| ReceiverError::Hid(format!("Failed to emit motion: {}", e)))?;
        }

        debug!(position = ?state.pointer.position(), "pointer moved");
        Ok(())
    }
}
