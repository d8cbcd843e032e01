//! Client error types.

use reqwest::StatusCode;
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("No authentication token available")]
    AuthenticationMissing,

    #[error("API returned {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    pub fn api(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn stream(msg: impl Into<String>) -> Self {
        Self::Stream(msg.into())
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Network(_) | ClientError::Stream(_) => true,
            ClientError::Api { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }

    /// Message the server attached to a failed request, if any.
    ///
    /// This is the text shown to the user verbatim; transport failures have no
    /// server message and callers fall back to a generic description.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Api { message, .. } if !message.trim().is_empty() => Some(message),
            ClientError::AuthenticationMissing => Some("No authentication token available"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ClientError::api(StatusCode::BAD_GATEWAY, "upstream").is_retryable());
        assert!(ClientError::api(StatusCode::TOO_MANY_REQUESTS, "slow down").is_retryable());
        assert!(!ClientError::api(StatusCode::NOT_FOUND, "missing").is_retryable());
        assert!(!ClientError::AuthenticationMissing.is_retryable());
    }

    #[test]
    fn test_server_message() {
        let err = ClientError::api(StatusCode::NOT_FOUND, "Clip not found");
        assert_eq!(err.server_message(), Some("Clip not found"));
        assert_eq!(ClientError::stream("reset").server_message(), None);
        assert_eq!(ClientError::api(StatusCode::BAD_REQUEST, " ").server_message(), None);
    }
}
