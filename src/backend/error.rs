//! Error types for backend operations

use crate::error::AppError;

/// Result type for backend operations
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Errors that can occur while talking to the search backend
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Network failure or server-side error
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Request did not complete within the configured timeout
    #[error("Backend request timed out: {0}")]
    Timeout(String),

    /// Backend refused the request (4xx)
    #[error("Backend rejected request with status {status}: {reason}")]
    Rejected { status: u16, reason: String },

    /// Collection name is already taken
    #[error("Index {0} already exists")]
    AlreadyExists(String),

    /// Backend answered with a body that could not be understood
    #[error("Invalid backend response: {0}")]
    InvalidResponse(String),

    /// Client could not be constructed
    #[error("Invalid backend configuration: {0}")]
    Configuration(String),
}

impl BackendError {
    /// Whether the backend was never reached or failed on its side
    pub fn is_unavailable(&self) -> bool {
        matches!(self, BackendError::Unavailable(_) | BackendError::Timeout(_))
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::InvalidResponse(err.to_string())
    }
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Timeout(msg) => AppError::Timeout(msg),
            BackendError::Configuration(msg) => AppError::Configuration(msg),
            _ => AppError::BackendUnavailable(err.to_string()),
        }
    }
}
