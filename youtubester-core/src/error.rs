//! Error types for write-consent handling

use thiserror::Error;

/// Message shown when a guarded call is refused before it is attempted.
pub const WRITE_ACCESS_REQUIRED_MESSAGE: &str =
    "YouTube write access is required to perform this action.";

/// Errors from the "who am I / what can I do" status query.
///
/// The consent store never surfaces these to callers. Any of them means
/// "no write access" for the purpose of the stored state.
#[derive(Debug, Clone, Error)]
pub enum StatusError {
    /// The request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-success status
    #[error("Status query failed with HTTP {status}")]
    Http {
        /// HTTP status code
        status: u16,
    },

    /// The response body could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Anything else
    #[error("{0}")]
    Other(String),
}

/// Failure of a call routed through the write guard.
///
/// `E` is the wrapped call's own error type, passed through unchanged.
#[derive(Debug, Error)]
pub enum GuardError<E> {
    /// The endpoint needs write access and consent could not be obtained,
    /// so the call was never attempted.
    #[error("{}", WRITE_ACCESS_REQUIRED_MESSAGE)]
    WriteAccessRequired,

    /// The wrapped call failed.
    #[error(transparent)]
    Call(E),
}

impl<E> GuardError<E> {
    /// Returns true if the call was refused before being attempted
    pub fn is_write_access_required(&self) -> bool {
        matches!(self, GuardError::WriteAccessRequired)
    }

    /// The wrapped call's error, if the call was attempted
    pub fn call_error(&self) -> Option<&E> {
        match self {
            GuardError::Call(err) => Some(err),
            GuardError::WriteAccessRequired => None,
        }
    }

    /// Consume and return the wrapped call's error, if any
    pub fn into_call_error(self) -> Option<E> {
        match self {
            GuardError::Call(err) => Some(err),
            GuardError::WriteAccessRequired => None,
        }
    }
}
