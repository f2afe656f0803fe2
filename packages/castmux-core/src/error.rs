//! Centralized error types for the castmux core library.
//!
//! This module provides a unified error handling system that:
//! - Re-exports the per-module error types defined with `thiserror`
//! - Gives every error a machine-readable code via [`ErrorCode`]
//! - Wraps them in [`CastmuxError`] for embedders that want a single type

use thiserror::Error;

use crate::cast::TransportError;
use crate::protocol::ProtocolError;

/// Trait for error types that provide machine-readable error codes.
///
/// Codes are stable strings suitable for logs and structured output.
pub trait ErrorCode {
    /// Returns a machine-readable error code.
    fn code(&self) -> &'static str;
}

impl ErrorCode for ProtocolError {
    fn code(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "malformed_envelope",
            Self::MissingField(_) => "missing_field",
            Self::UnsupportedType(_) => "unsupported_message_type",
        }
    }
}

impl ErrorCode for TransportError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotConnected => "transport_not_connected",
            Self::Io(_) => "transport_io",
            Self::State(_) => "transport_state",
            Self::Rejected(_) => "transport_rejected",
        }
    }
}

/// Library-wide error type.
#[derive(Debug, Error)]
pub enum CastmuxError {
    /// An inbound envelope could not be handled.
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The transport failed an operation.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// A session description is incomplete or inconsistent.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ErrorCode for CastmuxError {
    fn code(&self) -> &'static str {
        match self {
            Self::Protocol(e) => e.code(),
            Self::Transport(e) => e.code(),
            Self::Configuration(_) => "configuration_error",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Result Type Aliases
// ─────────────────────────────────────────────────────────────────────────────

// Re-export Result type aliases from their defining modules
pub use crate::cast::TransportResult;
pub use crate::protocol::ProtocolResult;

/// Convenient Result alias for library-wide operations.
pub type CastmuxResult<T> = Result<T, CastmuxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_errors_keep_their_code() {
        let err: CastmuxError = ProtocolError::UnsupportedType("leave_session".into()).into();
        assert_eq!(err.code(), "unsupported_message_type");

        let err: CastmuxError = TransportError::NotConnected.into();
        assert_eq!(err.code(), "transport_not_connected");
        assert_eq!(err.to_string(), "Transport error: transport is not connected");
    }

    #[test]
    fn configuration_error_code() {
        let err = CastmuxError::Configuration("route id is empty".into());
        assert_eq!(err.code(), "configuration_error");
    }
}
