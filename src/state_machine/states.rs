use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::states;

/// Task lifecycle states as reported by the task state store
///
/// `PENDING → PROGRESS* → (SUCCESS | FAILURE)`. [`TaskState::NotFound`] and
/// [`TaskState::Error`] are synthetic and only ever produced on the query
/// side. Any other state name the store reports (e.g. `RETRY`) is carried
/// verbatim in [`TaskState::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskState {
    /// Enqueued, not yet reporting progress
    #[default]
    Pending,
    /// Worker is executing steps
    Progress,
    /// Completed; the final value is stored
    Success,
    /// Worker fault recorded with a reason
    Failure,
    /// Unknown task identifier
    NotFound,
    /// Result could not be loaded during a read
    Error,
    /// Store-native state with no dedicated handling
    Other(String),
}

impl TaskState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => states::PENDING,
            Self::Progress => states::PROGRESS,
            Self::Success => states::SUCCESS,
            Self::Failure => states::FAILURE,
            Self::NotFound => states::NOT_FOUND,
            Self::Error => states::ERROR,
            Self::Other(name) => name,
        }
    }

    /// Check if this is a terminal state written by a worker
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }

    /// Check if this state is produced by the query side only
    pub fn is_synthetic(&self) -> bool {
        matches!(self, Self::NotFound | Self::Error)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Empty or unset state names map to `PENDING`
impl From<&str> for TaskState {
    fn from(s: &str) -> Self {
        match s {
            "" | states::PENDING => Self::Pending,
            states::PROGRESS => Self::Progress,
            states::SUCCESS => Self::Success,
            states::FAILURE => Self::Failure,
            states::NOT_FOUND => Self::NotFound,
            states::ERROR => Self::Error,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for TaskState {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<TaskState> for String {
    fn from(state: TaskState) -> Self {
        state.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_string_conversion() {
        assert_eq!(TaskState::from("PROGRESS"), TaskState::Progress);
        assert_eq!(TaskState::from(""), TaskState::Pending);
        assert_eq!(TaskState::from("RETRY"), TaskState::Other("RETRY".to_string()));
        assert_eq!(TaskState::Other("RETRY".to_string()).to_string(), "RETRY");
        assert_eq!(TaskState::NotFound.to_string(), "NOT_FOUND");
    }

    #[test]
    fn test_terminal_and_synthetic() {
        assert!(TaskState::Success.is_terminal());
        assert!(TaskState::Failure.is_terminal());
        assert!(!TaskState::Progress.is_terminal());
        assert!(!TaskState::Other("RETRY".into()).is_terminal());
        assert!(TaskState::Error.is_synthetic());
        assert!(!TaskState::Pending.is_synthetic());
    }

    #[test]
    fn test_state_serde() {
        let json = serde_json::to_string(&TaskState::Success).unwrap();
        assert_eq!(json, "\"SUCCESS\"");
        let state: TaskState = serde_json::from_str("\"STARTED\"").unwrap();
        assert_eq!(state, TaskState::Other("STARTED".to_string()));
    }
}
