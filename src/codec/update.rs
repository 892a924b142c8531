//! # Controller Update Types
//!
//! The decoded form of one sender datagram: two buttons reporting edge
//! transitions and a two-axis joystick reporting raw positions.

/// Raw axis value range reported by the Nunchuk joystick.
pub const AXIS_MIN: i32 = 0;
/// Raw axis value range reported by the Nunchuk joystick.
pub const AXIS_MAX: i32 = 255;
/// Wire sentinel for "axis did not change since the last update".
pub const AXIS_NO_CHANGE: i32 = -1;

/// Button transition reported in an update.
///
/// `Down` and `Up` are edges, not levels: the sender emits each at most once
/// per physical transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ButtonState {
    /// No transition reported
    #[default]
    Unknown,
    /// Button went down
    Down,
    /// Button went up
    Up,
}

/// One joystick axis as reported by the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Axis {
    /// Axis did not change since the previous update
    #[default]
    NoChange,
    /// Raw position in `AXIS_MIN..=AXIS_MAX`
    Value(i32),
}

impl Axis {
    /// Build an axis from its wire integer.
    ///
    /// Returns `None` when the value is neither the no-change sentinel nor in
    /// the raw range.
    ///
    /// # Examples
    ///
    /// ```
    /// use nunchuk_receiver::codec::update::Axis;
    ///
    /// assert_eq!(Axis::from_raw(-1), Some(Axis::NoChange));
    /// assert_eq!(Axis::from_raw(200), Some(Axis::Value(200)));
    /// assert_eq!(Axis::from_raw(256), None);
    /// ```
    #[must_use]
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            AXIS_NO_CHANGE => Some(Axis::NoChange),
            AXIS_MIN..=AXIS_MAX => Some(Axis::Value(raw)),
            _ => None,
        }
    }

    /// Wire integer for this axis.
    #[must_use]
    pub fn to_raw(self) -> i32 {
        match self {
            Axis::NoChange => AXIS_NO_CHANGE,
            Axis::Value(v) => v,
        }
    }
}

/// A single decoded controller update.
///
/// # Examples
///
/// ```
/// use nunchuk_receiver::codec::update::{Axis, ButtonState, ControllerUpdate};
///
/// let update = ControllerUpdate::default();
/// assert_eq!(update.button_z, ButtonState::Unknown);
/// assert_eq!(update.joy_x, Axis::NoChange);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControllerUpdate {
    /// C button (small, upper)
    pub button_c: ButtonState,
    /// Z button (large, lower)
    pub button_z: ButtonState,
    /// Joystick X axis. 0 = full left, 255 = full right.
    pub joy_x: Axis,
    /// Joystick Y axis. 0 = full down, 255 = full up.
    pub joy_y: Axis,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_range_edges() {
        assert_eq!(Axis::from_raw(AXIS_MIN), Some(Axis::Value(0)));
        assert_eq!(Axis::from_raw(AXIS_MAX), Some(Axis::Value(255)));
        assert_eq!(Axis::from_raw(-2), None);
        assert_eq!(Axis::from_raw(i32::MAX), None);
    }

    #[test]
    fn test_axis_raw_round_trip() {
        for raw in [AXIS_NO_CHANGE, 0, 128, 255] {
            assert_eq!(Axis::from_raw(raw).unwrap().to_raw(), raw);
        }
    }

    #[test]
    fn test_default_update_reports_nothing() {
        let update = ControllerUpdate::default();
        assert_eq!(update.button_c, ButtonState::Unknown);
        assert_eq!(update.button_z, ButtonState::Unknown);
        assert_eq!(update.joy_x, Axis::NoChange);
        assert_eq!(update.joy_y, Axis::NoChange);
    }
}
