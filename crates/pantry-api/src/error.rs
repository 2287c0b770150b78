//! Error types for resource calls.

use session_gateway::GatewayError;
use thiserror::Error;

/// Resource call errors.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Session lost, sign in again")]
    SessionLost,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Gateway error: {0}")]
    Gateway(GatewayError),
}

impl ApiError {
    /// True for a 404 from the backend.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Api { status: 404, .. })
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::SessionLost => ApiError::SessionLost,
            other => ApiError::Gateway(other),
        }
    }
}

/// Result type for resource calls.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_lost_is_lifted() {
        let err: ApiError = GatewayError::SessionLost.into();
        assert!(matches!(err, ApiError::SessionLost));

        let err: ApiError = GatewayError::InvalidRequest("bad".into()).into();
        assert!(matches!(err, ApiError::Gateway(_)));
    }

    #[test]
    fn test_not_found() {
        let err = ApiError::Api {
            status: 404,
            body: String::new(),
        };
        assert!(err.is_not_found());
        assert!(!ApiError::SessionLost.is_not_found());
    }
}
