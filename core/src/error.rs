//! Error types for the Todoist API client.
//!
//! # Design
//! Two classes of failure are kept apart. `UsageError` means the call site is
//! wrong (no session token, a required field left empty) and is reported
//! before any request is built. Everything else is operational: the transport
//! failed, the server answered with a non-2xx status, or the body carried an
//! error marker. Operational errors are also copied into the client's
//! last-error slot as their `Display` text, which is the raw status line or
//! raw response body.

use thiserror::Error;

/// A call that can never succeed as written. Fix the call site.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    /// The operation needs a session token and the client has none.
    #[error("no session token; call login or register first")]
    MissingToken,

    /// A required parameter was absent or empty.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
}

/// The transport could not complete the round-trip at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors returned by `Client` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server returned a non-2xx status. Displays as the status line.
    #[error("{status} {reason}")]
    Status { status: u16, reason: String },

    /// The body carried an error marker or lacked the success marker.
    #[error("{0}")]
    Remote(String),

    /// The body was expected to be JSON and was not.
    #[error("invalid JSON response: {0}")]
    Decode(String),

    /// A single value was requested but the service returned none.
    #[error("empty response")]
    EmptyResponse,
}

impl ApiError {
    /// Usage errors are the caller's bug and do not touch session state.
    pub fn is_usage(&self) -> bool {
        matches!(self, ApiError::Usage(_))
    }
}
