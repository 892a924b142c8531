//! # Control Mapper Module
//!
//! Pure transform from a decoded [`ControllerUpdate`] and the previous
//! [`CursorDelta`] to the next delta plus the button actions to inject.
//!
//! ## Button Mapping
//!
//! | Nunchuk | Report | Action |
//! |---------|--------|--------|
//! | Z | Down | Press primary (left) |
//! | Z | Up | Release primary (left) |
//! | C | Down | Press secondary (right) |
//! | C | Up | Release secondary (right) |
//!
//! Reports are edges. Two consecutive `Down` reports yield two presses.
//!
//! ## Axis Mapping
//!
//! - Raw axis range: 0-255, center 128
//! - `NoChange` keeps the previous delta for that axis
//! - `|raw - center| < deadzone` maps to 0, anything at or beyond the
//!   deadzone passes through unchanged
//!
//! ## Usage
//!
//! ```
//! use nunchuk_receiver::codec::update::{Axis, ButtonState, ControllerUpdate};
//! use nunchuk_receiver::control::cursor::CursorDelta;
//! use nunchuk_receiver::control::mapper::{ControlMapper, HidAction, MouseButton};
//!
//! let mapper = ControlMapper::new();
//! let update = ControllerUpdate {
//!     button_z: ButtonState::Down,
//!     joy_x: Axis::Value(200),
//!     joy_y: Axis::Value(128),
//!     ..ControllerUpdate::default()
//! };
//!
//! let (delta, actions) = mapper.map(&update, CursorDelta::default());
//! assert_eq!(delta, CursorDelta::new(72, 0));
//! assert_eq!(actions, vec![HidAction::Press(MouseButton::Primary)]);
//! ```

use crate::codec::update::{Axis, ButtonState, ControllerUpdate};
use crate::config::MapperConfig;
use super::cursor::CursorDelta;

/// Raw joystick center value.
pub const DEFAULT_AXIS_CENTER: i32 = 128;

/// Displacement below which the joystick is considered at rest.
pub const DEFAULT_DEADZONE: i32 = 8;

/// Host mouse button targeted by an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left button, driven by Z
    Primary,
    /// Right button, driven by C
    Secondary,
}

/// One button action for the HID injector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HidAction {
    Press(MouseButton),
    Release(MouseButton),
}

/// Maps controller updates to cursor deltas and button actions.
#[derive(Debug, Clone, Copy)]
pub struct ControlMapper {
    center: i32,
    deadzone: i32,
}

impl Default for ControlMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&MapperConfig> for ControlMapper {
    fn from(config: &MapperConfig) -> Self {
        Self::with_params(config.axis_center, config.deadzone)
    }
}

impl ControlMapper {
    /// Creates a mapper with the Nunchuk's native center and an 8-unit deadzone.
    #[must_use]
    pub fn new() -> Self {
        Self::with_params(DEFAULT_AXIS_CENTER, DEFAULT_DEADZONE)
    }

    /// Creates a mapper with a custom center and deadzone.
    ///
    /// Negative deadzones are treated as 0.
    #[must_use]
    pub fn with_params(center: i32, deadzone: i32) -> Self {
        Self {
            center,
            deadzone: deadzone.max(0),
        }
    }

    /// Maps one update.
    ///
    /// Returns the delta to store and the button actions in the order they
    /// must be injected (Z before C). Cursor motion is not an action; the
    /// cursor mover picks it up from the stored delta.
    #[must_use]
    pub fn map(
        &self,
        update: &ControllerUpdate,
        prev: CursorDelta,
    ) -> (CursorDelta, Vec<HidAction>) {
        let mut actions = Vec::with_capacity(2);
        push_edge(&mut actions, update.button_z, MouseButton::Primary);
        push_edge(&mut actions, update.button_c, MouseButton::Secondary);

        let delta = CursorDelta {
            dx: self.axis_delta(update.joy_x, prev.dx),
            dy: self.axis_delta(update.joy_y, prev.dy),
        };

        (delta, actions)
    }

    fn axis_delta(&self, axis: Axis, prev: i32) -> i32 {
        match axis {
            Axis::NoChange => prev,
            Axis::Value(raw) => self.filter(raw - self.center),
        }
    }

    fn filter(&self, delta: i32) -> i32 {
        if delta.abs() < self.deadzone {
            0
        } else {
            delta
        }
    }
}

fn push_edge(actions: &mut Vec<HidAction>, state: ButtonState, button: MouseButton) {
    match state {
        ButtonState::Down => actions.push(HidAction::Press(button)),
        ButtonState::Up => actions.push(HidAction::Release(button)),
        ButtonState::Unknown => {}
    }
}
