//! # Job Messages
//!
//! The payload enqueued for a worker. Jobs cross the store as JSON bytes so
//! the producer and the worker share nothing but this format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::messaging::errors::{MessagingError, MessagingResult};
use crate::messaging::types::{JobKind, TaskId};

/// Message for one job execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMessage {
    pub task_id: TaskId,
    pub kind: JobKind,
    /// Validated input text
    pub text: String,
    pub metadata: JobMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMetadata {
    pub enqueued_at: DateTime<Utc>,
    /// Correlation id carried into worker logs
    pub correlation_id: Uuid,
}

impl Default for JobMetadata {
    fn default() -> Self {
        Self {
            enqueued_at: Utc::now(),
            correlation_id: Uuid::new_v4(),
        }
    }
}

impl JobMessage {
    pub fn new(task_id: TaskId, kind: JobKind, text: impl Into<String>) -> Self {
        Self {
            task_id,
            kind,
            text: text.into(),
            metadata: JobMetadata::default(),
        }
    }

    pub fn queue_name(&self) -> &'static str {
        self.kind.queue_name()
    }

    pub fn to_bytes(&self) -> MessagingResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| MessagingError::message_serialization(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> MessagingResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| MessagingError::message_deserialization(e.to_string()))
    }

    /// Milliseconds since the job was enqueued
    pub fn age_ms(&self) -> i64 {
        Utc::now()
            .signed_duration_since(self.metadata.enqueued_at)
            .num_milliseconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_message_bytes() {
        let message = JobMessage::new(TaskId::from("t-1"), JobKind::ProcessText, "hello world");
        let bytes = message.to_bytes().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["task_id"], "t-1");
        assert_eq!(json["kind"], "process_text");
        assert_eq!(json["text"], "hello world");
        assert_eq!(JobMessage::from_bytes(&bytes).unwrap(), message);
        assert_eq!(message.queue_name(), "process_text_task");
    }

    #[test]
    fn test_job_message_rejects_garbage() {
        let err = JobMessage::from_bytes(b"not json").unwrap_err();
        assert!(matches!(err, MessagingError::MessageDeserialization { .. }));
    }
}
