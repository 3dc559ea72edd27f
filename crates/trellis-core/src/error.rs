//! Error types for the Trellis core.

use thiserror::Error;

/// Signal-specific errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    /// No signal with this name exists on the widget.
    #[error("unknown signal '{name}' on {type_name}")]
    UnknownSignal {
        /// The requested signal name.
        name: String,
        /// Type name of the widget that was asked.
        type_name: String,
    },

    /// The connection ID is invalid or has already been disconnected.
    #[error("connection {0} is not connected")]
    InvalidConnection(crate::ConnectionId),
}

/// A specialized Result type for signal lookups.
pub type SignalResult<T> = std::result::Result<T, SignalError>;
