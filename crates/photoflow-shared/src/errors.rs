//! # Photoflow Error Types
//!
//! Unified error handling for the shared layer: configuration loading,
//! item intake, and outcome storage.

use thiserror::Error;

/// Shared operation result type
pub type PhotoflowResult<T> = Result<T, PhotoflowError>;

/// Errors raised by shared components
#[derive(Debug, Error)]
pub enum PhotoflowError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unsupported media type for {file_name}: {reason}")]
    UnsupportedMediaType { file_name: String, reason: String },

    #[error("Storage error: {operation} - {reason}")]
    StorageError { operation: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization/deserialization failed: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl PhotoflowError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError(message.into())
    }

    /// Create a storage error for a named operation
    pub fn storage(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StorageError {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Create an unsupported media type error
    pub fn unsupported_media_type(file_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedMediaType {
            file_name: file_name.into(),
            reason: reason.into(),
        }
    }
}

impl From<config::ConfigError> for PhotoflowError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigurationError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for PhotoflowError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ConfigurationError(format!("invalid configuration: {err}"))
    }
}
