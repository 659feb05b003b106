//! Error types for index lifecycle operations

use crate::error::AppError;
use crate::models::Product;
use std::fmt;

/// Result type for index lifecycle operations
pub type IndexerResult<T> = std::result::Result<T, IndexerError>;

/// A document the backend refused to index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedDocument {
    /// Position of the document in the product corpus
    pub position: usize,
    pub brand: String,
    pub name: String,
    pub reason: String,
}

impl FailedDocument {
    pub fn new(position: usize, product: &Product, reason: impl Into<String>) -> Self {
        Self {
            position,
            brand: product.brand.clone(),
            name: product.name.clone(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FailedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} ({} / {}): {}",
            self.position, self.brand, self.name, self.reason
        )
    }
}

/// Errors that abort a rebuild
#[derive(Debug, thiserror::Error)]
pub enum IndexerError {
    /// Schema documents or corpus missing, unreadable or invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Backend refused the settings or mappings
    #[error("Schema rejected for index {index}: {reason}")]
    SchemaRejected { index: String, reason: String },

    /// Network or backend failure
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Another rebuild stamped the same generation name
    #[error("Index generation {index} already exists; another rebuild started in the same millisecond")]
    GenerationExists { index: String },

    /// Some documents could not be indexed
    #[error(
        "Bulk write into {index} failed for {} of {total} documents: {}",
        .failed.len(),
        .failed.iter().map(|d| d.to_string()).collect::<Vec<_>>().join("; ")
    )]
    BulkWritePartialFailure {
        index: String,
        total: usize,
        failed: Vec<FailedDocument>,
    },

    /// Cutover was refused; the previous generation stays authoritative
    #[error("Alias swap of {alias} to {index} not acknowledged: {reason}")]
    AliasSwapNotAcknowledged {
        alias: String,
        index: String,
        reason: String,
    },
}

impl From<IndexerError> for AppError {
    fn from(err: IndexerError) -> Self {
        match err {
            IndexerError::Configuration(msg) => AppError::Configuration(msg),
            IndexerError::BackendUnavailable(msg) => AppError::BackendUnavailable(msg),
            _ => AppError::RebuildFailed(err.to_string()),
        }
    }
}
