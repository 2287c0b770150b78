//! Error types for authentication calls.

use session_gateway::GatewayError;
use thiserror::Error;

/// Authentication errors.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Invalid email or password, or account not activated")]
    InvalidCredentials,

    #[error("Session lost, sign in again")]
    SessionLost,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Gateway error: {0}")]
    Gateway(GatewayError),
}

impl From<GatewayError> for AuthError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::SessionLost => AuthError::SessionLost,
            other => AuthError::Gateway(other),
        }
    }
}

/// Result type for authentication calls.
pub type AuthResult<T> = Result<T, AuthError>;
