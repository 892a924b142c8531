//! # Error Types
//!
//! Custom error types for the Nunchuk receiver using `thiserror`.

use thiserror::Error;

/// Main error type for the Nunchuk receiver
#[derive(Debug, Error)]
pub enum ReceiverError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed controller update payload
    #[error("Decode error: {0}")]
    Decode(String),

    /// The configured network interface does not exist on this host
    #[error("Network interface not found: {0}")]
    InterfaceNotFound(String),

    /// Service advertisement errors
    #[error("Discovery error: {0}")]
    Discovery(String),

    /// Pointer/button injection errors
    #[error("HID error: {0}")]
    Hid(String),

    /// A worker task unwound without reporting
    #[error("Worker panicked: {0}")]
    WorkerPanicked(String),
}

impl ReceiverError {
    /// Returns true for errors that are logged and skipped rather than
    /// escalated to a process-wide shutdown.
    ///
    /// # Examples
    ///
    /// ```
    /// use nunchuk_receiver::error::ReceiverError;
    ///
    /// assert!(ReceiverError::Decode("bad varint".into()).is_transient());
    /// assert!(!ReceiverError::InterfaceNotFound("eth9".into()).is_transient());
    /// ```
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Decode(_) => true,
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }
}

impl From<prost::DecodeError> for ReceiverError {
    fn from(e: prost::DecodeError) -> Self {
        ReceiverError::Decode(e.to_string())
    }
}

impl From<mdns_sd::Error> for ReceiverError {
    fn from(e: mdns_sd::Error) -> Self {
        ReceiverError::Discovery(e.to_string())
    }
}

/// Result type alias for the Nunchuk receiver
pub type Result<T> = std::result::Result<T, ReceiverError>;
