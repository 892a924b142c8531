//! # Update Codec Module
//!
//! Decoding of controller update datagrams.
//!
//! This module handles:
//! - The logical [`ControllerUpdate`](update::ControllerUpdate) produced per datagram
//! - The protobuf wire encoding used by the Nunchuk sender
//! - The [`UpdateCodec`] seam the packet ingest worker decodes through

pub mod protobuf;
pub mod update;

use crate::error::Result;
use update::ControllerUpdate;

/// Turns one datagram payload into a controller update.
///
/// Implementations must be pure: a failed decode has no side effects and the
/// caller simply drops the packet.
#[cfg_attr(test, mockall::automock)]
pub trait UpdateCodec: Send + Sync {
    /// Decode a raw payload.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiverError::Decode`](crate::error::ReceiverError::Decode)
    /// if the payload is not a valid update.
    fn decode(&self, bytes: &[u8]) -> Result<ControllerUpdate>;
}
