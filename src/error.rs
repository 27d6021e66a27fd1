//! Error types for the text-tasker system.
//!
//! Submission-time errors are returned to the caller. Worker-time faults are
//! recorded as `FAILURE` task state and query-time faults are converted into
//! payloads, so only [`TaskerError::ValidationError`] is expected to reach a
//! client directly.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskerError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Messaging error: {0}")]
    MessagingError(String),
    #[error("Worker error: {0}")]
    WorkerError(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TaskerError {
    /// Message without the category prefix, suitable for task `FAILURE` reasons
    pub fn reason(&self) -> &str {
        match self {
            TaskerError::ValidationError(msg)
            | TaskerError::MessagingError(msg)
            | TaskerError::WorkerError(msg)
            | TaskerError::ConfigurationError(msg)
            | TaskerError::Internal(msg) => msg,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, TaskerError::ValidationError(_))
    }
}

impl From<serde_json::Error> for TaskerError {
    fn from(error: serde_json::Error) -> Self {
        TaskerError::Internal(format!("JSON serialization error: {error}"))
    }
}

impl From<crate::messaging::MessagingError> for TaskerError {
    fn from(error: crate::messaging::MessagingError) -> Self {
        TaskerError::MessagingError(error.to_string())
    }
}

impl From<crate::config::ConfigurationError> for TaskerError {
    fn from(error: crate::config::ConfigurationError) -> Self {
        TaskerError::ConfigurationError(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TaskerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_category() {
        let err = TaskerError::ValidationError("Text cannot be empty".to_string());
        assert_eq!(err.to_string(), "Validation error: Text cannot be empty");
        assert_eq!(err.reason(), "Text cannot be empty");
        assert!(err.is_validation());
    }

    #[test]
    fn test_messaging_error_conversion() {
        let err: TaskerError = crate::messaging::MessagingError::queue_not_found("q").into();
        assert!(matches!(err, TaskerError::MessagingError(_)));
        assert!(err.to_string().contains("Queue not found: q"));
        assert!(!err.is_validation());
    }
}
