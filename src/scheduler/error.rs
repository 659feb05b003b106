//! Error types for the scheduler module

use crate::error::AppError;

/// Result type for scheduler operations
pub type SchedulerResult<T> = std::result::Result<T, SchedulerError>;

/// Errors that can occur in scheduler operations
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// Scheduler failed to start
    #[error("Failed to start scheduler: {0}")]
    StartupFailed(String),

    /// Scheduler failed to shutdown
    #[error("Failed to shutdown scheduler: {0}")]
    ShutdownFailed(String),

    /// Invalid cron expression
    #[error("Invalid cron expression: {0}")]
    InvalidCronExpression(String),

    /// Job could not be registered
    #[error("Failed to create job: {0}")]
    JobCreationFailed(String),
}

impl From<SchedulerError> for AppError {
    fn from(err: SchedulerError) -> Self {
        match err {
            SchedulerError::InvalidCronExpression(msg) => AppError::Configuration(msg),
            _ => AppError::Internal(err.to_string()),
        }
    }
}
