//! Error types for search operations

use crate::backend::BackendError;
use crate::error::AppError;

/// Result type for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Errors that can occur during search operations
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Request failed validation before reaching the backend
    #[error("Invalid search request: {0}")]
    InvalidRequest(String),

    /// Analysis, execution or result mapping failed
    #[error("Search failed: {0}")]
    SearchFailed(String),
}

impl From<BackendError> for SearchError {
    fn from(err: BackendError) -> Self {
        SearchError::SearchFailed(err.to_string())
    }
}

impl From<validator::ValidationErrors> for SearchError {
    fn from(err: validator::ValidationErrors) -> Self {
        SearchError::InvalidRequest(err.to_string())
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidRequest(msg) => AppError::Validation(msg),
            SearchError::SearchFailed(msg) => AppError::SearchFailed(msg),
        }
    }
}
