//! Gateway error types.

use thiserror::Error;

/// Failure raised by a [`Transport`](crate::Transport) before any response was received.
#[derive(Error, Debug)]
pub enum TransportError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parse error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Timeout error
    #[error("Request timed out")]
    Timeout,

    /// Connection could not be established
    #[error("Connection error: {0}")]
    Connection(String),
}

impl TransportError {
    /// Classify a reqwest error into the most specific variant.
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connection(err.to_string())
        } else {
            TransportError::Http(err)
        }
    }
}

/// Why a renewal episode did not extend the session.
///
/// Cloned once per waiter when the queue is drained.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenewalError {
    /// Renewal endpoint answered with a non-2xx status
    #[error("Renewal rejected: HTTP {status}")]
    Rejected { status: u16 },

    /// Renewal request never got a response
    #[error("Renewal transport failure: {0}")]
    Transport(String),

    /// Renewal task ended without settling its waiters
    #[error("Renewal aborted")]
    Aborted,

    /// Invalid transition in the renewal FSM
    #[error("Invalid renewal state transition: {0}")]
    InvalidStateTransition(String),
}

/// Error surfaced to callers of [`Gateway::perform`](crate::Gateway::perform).
///
/// Session expiry is never surfaced directly: it is either recovered through a
/// renewal and replay, or turned into [`GatewayError::SessionLost`].
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Network or transport-level failure, passed through unchanged
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Session could not be renewed; the user must sign in again
    #[error("Session lost, re-authentication required")]
    SessionLost,

    /// Request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GatewayError {
    /// Returns true if this error is the terminal session-loss outcome.
    pub fn is_session_lost(&self) -> bool {
        matches!(self, GatewayError::SessionLost)
    }
}

/// Result type alias using GatewayError.
pub type GatewayResult<T> = Result<T, GatewayError>;
