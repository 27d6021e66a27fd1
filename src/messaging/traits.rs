//! # Task State Store Trait
//!
//! The broker + result backend contract shared by the producer, the worker
//! and the poller. Components coordinate only through this trait; none of
//! them hold a task beyond a single call.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::messaging::errors::MessagingResult;
use crate::messaging::types::{
    ClaimedJob, JobKind, QueueStats, ReceiptHandle, TaskId, TaskRecord,
};
use crate::state_machine::TaskState;

/// Provider-agnostic task state store
///
/// Implementations own task identity and lifecycle consistency. Callers do
/// no locking of their own; a task's state is written by exactly one worker.
#[async_trait]
pub trait TaskStateStore: Send + Sync + 'static {
    /// Create a task in `PENDING` and enqueue its job
    ///
    /// Returns the store-assigned identifier without waiting for a worker.
    async fn enqueue(&self, kind: JobKind, text: &str) -> MessagingResult<TaskId>;

    /// Claim the oldest visible job among `kinds`
    ///
    /// The job stays invisible to other consumers for `visibility_timeout`;
    /// if it is not acknowledged by then it is handed out again.
    async fn claim_next(
        &self,
        kinds: &[JobKind],
        visibility_timeout: Duration,
    ) -> MessagingResult<Option<ClaimedJob>>;

    /// Wait until new jobs may be available, or `timeout` elapses
    ///
    /// Default implementation just sleeps; providers with a wake-up signal
    /// may return early.
    async fn wait_for_jobs(&self, timeout: Duration) {
        tokio::time::sleep(timeout).await;
    }

    /// Acknowledge a claimed job, removing it from its queue
    async fn ack(&self, queue_name: &str, receipt: &ReceiptHandle) -> MessagingResult<()>;

    /// Keep a claimed job invisible for `extension` from now (heartbeat
    /// during long processing)
    async fn extend_visibility(
        &self,
        queue_name: &str,
        receipt: &ReceiptHandle,
        extension: Duration,
    ) -> MessagingResult<()>;

    /// Overwrite a task's state and metadata (used for `PROGRESS` updates)
    async fn update_state(
        &self,
        task_id: &TaskId,
        state: TaskState,
        meta: Option<Value>,
    ) -> MessagingResult<()>;

    /// Record the terminal `SUCCESS` state with its final value
    async fn store_success(&self, task_id: &TaskId, result: &Value) -> MessagingResult<()>;

    /// Record the terminal `FAILURE` state with a human-readable reason
    async fn store_failure(&self, task_id: &TaskId, reason: &str) -> MessagingResult<()>;

    /// Current raw state and metadata, `None` for an unknown identifier
    async fn get_state(&self, task_id: &TaskId) -> MessagingResult<Option<TaskRecord>>;

    /// Decode the final value of a `SUCCESS` task
    ///
    /// Faults when the stored value cannot be decoded; the stored state is
    /// left untouched.
    async fn get_final_value(&self, task_id: &TaskId) -> MessagingResult<Value>;

    /// Queue counters for monitoring
    async fn queue_stats(&self, kind: JobKind) -> MessagingResult<QueueStats>;

    /// Verify the backend is reachable
    async fn health_check(&self) -> MessagingResult<bool>;

    /// Provider name for logging
    fn provider_name(&self) -> &'static str;
}
