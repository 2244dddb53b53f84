//! Error types for the climate-sensors crate.

use thiserror::Error;

/// The main error type for this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to establish a connection to the brick daemon.
    #[error("Connection failed: {reason}")]
    ConnectionFailed {
        /// Description of why the connection failed.
        reason: String,
    },

    /// Operation requires a connection but the transport is not connected.
    #[error("Not connected")]
    NotConnected,

    /// A bricklet call failed or timed out.
    #[error("Device {uid} failed to {operation}: {message}")]
    Device {
        /// UID of the bricklet.
        uid: String,
        /// The operation that was attempted.
        operation: &'static str,
        /// Description of the failure from the transport.
        message: String,
    },

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {name} = {value}")]
    InvalidParameter {
        /// The name of the parameter.
        name: String,
        /// The invalid value that was provided.
        value: String,
    },

    /// I/O error, e.g. while waiting on the terminal.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Shorthand for building a [`Error::Device`].
    pub fn device(uid: impl Into<String>, operation: &'static str, message: impl Into<String>) -> Self {
        Self::Device {
            uid: uid.into(),
            operation,
            message: message.into(),
        }
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
