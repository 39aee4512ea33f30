//! # Client Error Types
//!
//! Errors raised by a remote processing round-trip. Every variant folds into
//! one [`ErrorCategory`] so the pipeline can record what kind of failure an
//! item hit without caring about the transport.

use photoflow_shared::models::ErrorCategory;
use thiserror::Error;

/// Client operation result type
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Timeout waiting for operation: {operation}")]
    Timeout { operation: String },

    #[error("Error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("JSON serialization/deserialization failed: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid response: {field} - {reason}")]
    InvalidResponse { field: String, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ClientError {
    /// Create an API error from a non-success HTTP response
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Create an invalid response error for payloads missing required structure
    pub fn invalid_response(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Failure taxonomy bucket for this error
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            ClientError::HttpError(e) if e.is_decode() => ErrorCategory::Protocol,
            ClientError::HttpError(_) | ClientError::Timeout { .. } => ErrorCategory::Transport,
            ClientError::ConfigError(_) => ErrorCategory::Transport,
            ClientError::ApiError { .. } | ClientError::SerializationError(_) => {
                ErrorCategory::Protocol
            }
            ClientError::InvalidResponse { .. } => ErrorCategory::Validation,
        }
    }

    /// Check if error is recoverable (worth retrying)
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            ClientError::HttpError(e) => e.is_timeout() || e.is_connect(),
            ClientError::Timeout { .. } => true,
            ClientError::ApiError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_constructor() {
        let err = ClientError::api_error(404, "not found");
        match err {
            ClientError::ApiError { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "not found");
            }
            _ => panic!("Expected ApiError variant"),
        }
    }

    #[test]
    fn test_invalid_response_constructor() {
        let err = ClientError::invalid_response("payload", "expected object");
        match err {
            ClientError::InvalidResponse { field, reason } => {
                assert_eq!(field, "payload");
                assert_eq!(reason, "expected object");
            }
            _ => panic!("Expected InvalidResponse variant"),
        }
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            ClientError::Timeout {
                operation: "process".to_string()
            }
            .category(),
            ErrorCategory::Transport
        );
        assert_eq!(
            ClientError::api_error(502, "bad gateway").category(),
            ErrorCategory::Protocol
        );
        let json_err = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        assert_eq!(
            ClientError::SerializationError(json_err).category(),
            ErrorCategory::Protocol
        );
        assert_eq!(
            ClientError::invalid_response("payload", "null").category(),
            ErrorCategory::Validation
        );
    }

    #[test]
    fn test_api_error_500_is_recoverable() {
        assert!(ClientError::api_error(500, "internal server error").is_recoverable());
    }

    #[test]
    fn test_timeout_is_recoverable() {
        let err = ClientError::Timeout {
            operation: "process lake.jpg".to_string(),
        };
        assert!(err.is_recoverable());
        assert_eq!(err.category(), ErrorCategory::Transport);
    }

    #[test]
    fn test_api_error_400_not_recoverable() {
        assert!(!ClientError::api_error(400, "bad request").is_recoverable());
    }

    #[test]
    fn test_invalid_response_not_recoverable() {
        assert!(!ClientError::invalid_response("field", "broken").is_recoverable());
    }

    #[test]
    fn test_display_api_error() {
        let err = ClientError::api_error(503, "service down");
        assert_eq!(format!("{err}"), "Error 503: service down");
    }

    #[test]
    fn test_display_invalid_response() {
        let err = ClientError::invalid_response("body", "not an object");
        assert_eq!(format!("{err}"), "Invalid response: body - not an object");
    }
}
