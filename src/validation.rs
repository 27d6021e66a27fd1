//! Input validation for task submission
//!
//! Text is validated before anything is enqueued, so a rejected submission
//! never creates a task.

use crate::error::{Result, TaskerError};

/// Ensure text input is non-empty and not only whitespace
///
/// Returns the input unchanged on success; the text is never trimmed or
/// otherwise normalized before it reaches the worker.
pub fn validate_text_input(text: &str) -> Result<&str> {
    if text.trim().is_empty() {
        return Err(TaskerError::ValidationError(
            "Text cannot be empty".to_string(),
        ));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_text() {
        let err = validate_text_input("").unwrap_err();
        assert_eq!(
            err,
            TaskerError::ValidationError("Text cannot be empty".to_string())
        );
    }

    #[test]
    fn test_rejects_whitespace_only_text() {
        for input in [" ", "\n", "\t \r\n", "\u{2003}"] {
            assert!(
                validate_text_input(input).is_err(),
                "expected {input:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_accepts_text_unchanged() {
        assert_eq!(validate_text_input("  hello  ").unwrap(), "  hello  ");
    }
}
