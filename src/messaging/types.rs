//! # Messaging Types
//!
//! Identifiers and records exchanged with the task state store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::constants::jobs;
use crate::messaging::message::JobMessage;
use crate::state_machine::TaskState;

/// Opaque task identifier assigned by the store at enqueue time
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Handle for acknowledging a claimed job
///
/// Provider-specific; the in-memory store uses its internal message id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReceiptHandle(pub String);

impl ReceiptHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReceiptHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kinds of job a worker knows how to execute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Multi-step pipeline reporting PROGRESS after every step
    ProcessText,
    /// Single synchronous analysis, no intermediate progress
    QuickAnalysis,
}

impl JobKind {
    pub const ALL: [JobKind; 2] = [JobKind::ProcessText, JobKind::QuickAnalysis];

    /// Registered job name, also used as the queue name
    pub fn job_name(&self) -> &'static str {
        match self {
            JobKind::ProcessText => jobs::PROCESS_TEXT,
            JobKind::QuickAnalysis => jobs::QUICK_ANALYSIS,
        }
    }

    pub fn queue_name(&self) -> &'static str {
        self.job_name()
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.job_name())
    }
}

/// Raw lifecycle state and metadata of one task, as held by the store
///
/// Metadata shape depends on the state: absent for PENDING, a
/// [`ProgressUpdate`](crate::models::ProgressUpdate) object for PROGRESS, the
/// final result for SUCCESS and a reason string for FAILURE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub task_id: TaskId,
    pub kind: JobKind,
    pub state: TaskState,
    pub meta: Option<Value>,
    pub updated_at: DateTime<Utc>,
}

/// A job handed to a worker by `claim_next`
#[derive(Debug, Clone)]
pub struct ClaimedJob {
    pub message: JobMessage,
    pub receipt: ReceiptHandle,
    /// Number of times this job has been handed out, starting at 1
    pub receive_count: u32,
}

/// Per-queue counters for monitoring
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub queue_name: String,
    /// Jobs currently held by the queue, visible or in flight
    pub message_count: u64,
    pub in_flight_count: u64,
    pub total_sent: u64,
    pub total_received: u64,
    pub total_acked: u64,
}
