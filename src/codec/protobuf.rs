//! # Protobuf Update Codec
//!
//! The Nunchuk sender packs every update into a `NunchukUpdate` protobuf
//! message and ships it as a single UDP datagram:
//!
//! ```text
//! message NunchukUpdate {
//!   message ButInfo {
//!     enum ButState { UNKNOWN = 0; DOWN = 1; UP = 2; }
//!     ButState ButC = 1;
//!     ButState ButZ = 2;
//!   }
//!   message JoyInfo {
//!     float JoyX = 1;
//!     float JoyY = 2;
//!   }
//!   ButInfo Buttons = 1;
//!   JoyInfo Joystick = 2;
//! }
//! ```
//!
//! Joystick axes travel as floats, truncated toward zero on decode; `-1`
//! means "no change". An axis outside that range is read as no change.

use prost::Message as ProstMessage;

use tracing::warn;

use super::update::{Axis, ButtonState, ControllerUpdate, AXIS_MAX, AXIS_NO_CHANGE};
use super::UpdateCodec;
use crate::error::Result;

/// Wire messages, kept in their own module to mirror the `.proto` layout.
pub mod proto {
    /// Top-level datagram payload
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct NunchukUpdate {
        #[prost(message, optional, tag = "1")]
        pub buttons: Option<ButInfo>,
        #[prost(message, optional, tag = "2")]
        pub joystick: Option<JoyInfo>,
    }

    /// Button transitions
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ButInfo {
        #[prost(enumeration = "ButState", tag = "1")]
        pub but_c: i32,
        #[prost(enumeration = "ButState", tag = "2")]
        pub but_z: i32,
    }

    /// Joystick positions
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct JoyInfo {
        #[prost(float, tag = "1")]
        pub joy_x: f32,
        #[prost(float, tag = "2")]
        pub joy_y: f32,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum ButState {
        Unknown = 0,
        Down = 1,
        Up = 2,
    }
}

/// Protobuf implementation of [`UpdateCodec`].
///
/// # Examples
///
/// ```
/// use nunchuk_receiver::codec::UpdateCodec;
/// use nunchuk_receiver::codec::protobuf::ProtobufCodec;
/// use nunchuk_receiver::codec::update::{Axis, ButtonState, ControllerUpdate};
///
/// let update = ControllerUpdate {
///     button_z: ButtonState::Down,
///     joy_x: Axis::Value(200),
///     ..ControllerUpdate::default()
/// };
/// let bytes = ProtobufCodec::encode(&update);
/// assert_eq!(ProtobufCodec.decode(&bytes)?, update);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtobufCodec;

impl ProtobufCodec {
    /// Encode an update the way the sender does.
    #[must_use]
    pub fn encode(update: &ControllerUpdate) -> Vec<u8> {
        let msg = proto::NunchukUpdate {
            buttons: Some(proto::ButInfo {
                but_c: button_to_wire(update.button_c) as i32,
                but_z: button_to_wire(update.button_z) as i32,
            }),
            joystick: Some(proto::JoyInfo {
                joy_x: update.joy_x.to_raw() as f32,
                joy_y: update.joy_y.to_raw() as f32,
            }),
        };
        msg.encode_to_vec()
    }
}

impl UpdateCodec for ProtobufCodec {
    fn decode(&self, bytes: &[u8]) -> Result<ControllerUpdate> {
        let msg = proto::NunchukUpdate::decode(bytes)?;

        let (button_c, button_z) = match &msg.buttons {
            Some(buttons) => (button_from_wire(buttons.but_c), button_from_wire(buttons.but_z)),
            None => (ButtonState::Unknown, ButtonState::Unknown),
        };

        let (joy_x, joy_y) = match &msg.joystick {
            Some(joystick) => (
                axis_from_wire("JoyX", joystick.joy_x),
                axis_from_wire("JoyY", joystick.joy_y),
            ),
            None => (Axis::NoChange, Axis::NoChange),
        };

        Ok(ControllerUpdate {
            button_c,
            button_z,
            joy_x,
            joy_y,
        })
    }
}

fn button_from_wire(value: i32) -> ButtonState {
    // Unrecognised enum numbers from newer senders are treated as no transition
    match proto::ButState::try_from(value) {
        Ok(proto::ButState::Down) => ButtonState::Down,
        Ok(proto::ButState::Up) => ButtonState::Up,
        Ok(proto::ButState::Unknown) | Err(_) => ButtonState::Unknown,
    }
}

fn button_to_wire(state: ButtonState) -> proto::ButState {
    match state {
        ButtonState::Unknown => proto::ButState::Unknown,
        ButtonState::Down => proto::ButState::Down,
        ButtonState::Up => proto::ButState::Up,
    }
}

/// Invalid axis values only cost that axis; the button edges in the same
/// packet still apply.
fn axis_from_wire(name: &str, value: f32) -> Axis {
    // Fractions truncate toward zero, so -0.5 is 0, not the sentinel
    let raw = value.trunc();
    let axis = if raw.is_finite() && raw >= AXIS_NO_CHANGE as f32 && raw <= AXIS_MAX as f32 {
        Axis::from_raw(raw as i32)
    } else {
        None
    };

    axis.unwrap_or_else(|| {
        warn!("{} out of range: {}, treating as no change", name, value);
        Axis::NoChange
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_raw(buttons: Option<(i32, i32)>, joystick: Option<(f32, f32)>) -> Vec<u8> {
        proto::NunchukUpdate {
            buttons: buttons.map(|(but_c, but_z)| proto::ButInfo { but_c, but_z }),
            joystick: joystick.map(|(joy_x, joy_y)| proto::JoyInfo { joy_x, joy_y }),
        }
        .encode_to_vec()
    }

    #[test]
    fn test_decode_full_update() {
        let bytes = encode_raw(Some((2, 1)), Some((200.0, 128.0)));
        let update = ProtobufCodec.decode(&bytes).unwrap();

        assert_eq!(update.button_c, ButtonState::Up);
        assert_eq!(update.button_z, ButtonState::Down);
        assert_eq!(update.joy_x, Axis::Value(200));
        assert_eq!(update.joy_y, Axis::Value(128));
    }

    #[test]
    fn test_decode_no_change_axes() {
        let bytes = encode_raw(Some((0, 0)), Some((-1.0, -1.0)));
        let update = ProtobufCodec.decode(&bytes).unwrap();

        assert_eq!(update, ControllerUpdate::default());
    }

    #[test]
    fn test_missing_submessages() {
        let update = ProtobufCodec.decode(&encode_raw(None, None)).unwrap();
        assert_eq!(update, ControllerUpdate::default());

        // Empty payload is a valid, all-default protobuf message
        let update = ProtobufCodec.decode(&[]).unwrap();
        assert_eq!(update, ControllerUpdate::default());
    }

    #[test]
    fn test_unknown_button_number_is_unknown() {
        let update = ProtobufCodec.decode(&encode_raw(Some((7, -3)), None)).unwrap();
        assert_eq!(update.button_c, ButtonState::Unknown);
        assert_eq!(update.button_z, ButtonState::Unknown);
    }

    #[test]
    fn test_axis_is_truncated() {
        let update = ProtobufCodec
            .decode(&encode_raw(None, Some((127.6, 0.4))))
            .unwrap();
        assert_eq!(update.joy_x, Axis::Value(127));
        assert_eq!(update.joy_y, Axis::Value(0));
    }

    #[test]
    fn test_small_negative_axis_is_full_left() {
        let update = ProtobufCodec
            .decode(&encode_raw(None, Some((-0.5, -0.99))))
            .unwrap();
        assert_eq!(update.joy_x, Axis::Value(0));
        assert_eq!(update.joy_y, Axis::Value(0));
    }

    #[test]
    fn test_axis_just_past_max_truncates_in_range() {
        let update = ProtobufCodec
            .decode(&encode_raw(None, Some((255.6, -1.0))))
            .unwrap();
        assert_eq!(update.joy_x, Axis::Value(255));
        assert_eq!(update.joy_y, Axis::NoChange);
    }

    #[test]
    fn test_bad_axis_keeps_button_edges() {
        for bad in [256.0, -2.0, f32::NAN, f32::INFINITY, 1e20] {
            let bytes = encode_raw(Some((0, proto::ButState::Up as i32)), Some((bad, 10.0)));
            let update = ProtobufCodec.decode(&bytes).unwrap();

            assert_eq!(update.button_z, ButtonState::Up, "release lost for {}", bad);
            assert_eq!(update.joy_x, Axis::NoChange, "{} should be ignored", bad);
            assert_eq!(update.joy_y, Axis::Value(10));
        }
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let result = ProtobufCodec.decode(&[0xff, 0xff, 0xff, 0xff]);
        assert!(matches!(result, Err(crate::error::ReceiverError::Decode(_))));
    }

    #[test]
    fn test_truncated_payload_is_decode_error() {
        let bytes = encode_raw(Some((1, 2)), Some((10.0, 20.0)));
        let result = ProtobufCodec.decode(&bytes[..bytes.len() - 1]);
        assert!(result.is_err());
    }

    #[test]
    fn test_encoded_update_fits_datagram() {
        let update = ControllerUpdate {
            button_c: ButtonState::Down,
            button_z: ButtonState::Up,
            joy_x: Axis::Value(255),
            joy_y: Axis::NoChange,
        };
        let bytes = ProtobufCodec::encode(&update);
        assert!(bytes.len() <= 128);
        assert_eq!(ProtobufCodec.decode(&bytes).unwrap(), update);
    }
}
