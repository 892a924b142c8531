//! # Nunchuk Receiver Library
//!
//! Drive the host mouse pointer with a Wii Nunchuk over the network.
//!
//! A sender streams protobuf-encoded controller updates as UDP datagrams. This
//! library decodes them, maps joystick and button state onto pointer motion
//! and mouse buttons, and injects the result through a virtual HID device,
//! while advertising itself over mDNS so senders can find it.
//!
//! Everything runs as a fixed set of workers under one
//! [`Supervisor`](supervisor::Supervisor) that coordinates graceful and
//! failure-driven shutdown.

pub mod codec;
pub mod config;
pub mod control;
pub mod discovery;
pub mod error;
pub mod hid;
pub mod supervisor;
pub mod workers;
