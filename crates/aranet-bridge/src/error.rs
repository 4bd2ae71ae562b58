//! Error types for aranet-bridge.
//!
//! Only structural failures are errors here. Field-level problems in the
//! tool's output (a non-numeric CO2 value, an unrecognized status label) are
//! absorbed by the parser and never reach this type.
//!
//! | Error Type | Meaning | Caller policy |
//! |------------|---------|---------------|
//! | [`Error::ExternalTool`] | The tool wrote to stderr or exited non-zero | Surface verbatim; retrying is up to the bridge |
//! | [`Error::DeviceNotFound`] | A targeted read returned no matching device | Check the address or rescan |
//! | [`Error::Timeout`] | The tool did not finish in time | The child process has been killed |
//! | [`Error::Io`] | The tool could not be spawned | Check `tool.program` |
//! | [`Error::MissingField`] | A record lacks a field the caller needs | Skip the record |
//! | [`Error::InvalidConfig`] | Configuration rejected | Fix configuration and restart |
//!
//! An empty scan is not an error: [`Reader::scan`](crate::Reader::scan)
//! returns an empty `Vec` and the caller decides what that means.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when reading devices through the external tool.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The external tool reported a failure.
    #[error("External tool failed: {message}")]
    ExternalTool {
        /// The tool's error output, or a description of its exit status.
        message: String,
    },

    /// A targeted read did not return the requested device.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// The external tool did not finish in time.
    #[error("Operation '{operation}' timed out after {duration:?}")]
    Timeout {
        /// The operation that timed out.
        operation: String,
        /// The timeout duration.
        duration: Duration,
    },

    /// I/O error while running the external tool.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A device record lacks a required field.
    #[error("Device record has no {0}")]
    MissingField(&'static str),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create an external tool error from its error output.
    pub fn external_tool(message: impl Into<String>) -> Self {
        Self::ExternalTool {
            message: message.into(),
        }
    }

    /// Create a device not found error for a specific address.
    pub fn device_not_found(address: impl Into<String>) -> Self {
        Self::DeviceNotFound(address.into())
    }

    /// Create a timeout error with operation context.
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

/// Result type alias using aranet-bridge's Error type.
pub type Result<T> = std::result::Result<T, Error>;
