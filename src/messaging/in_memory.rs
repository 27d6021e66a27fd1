//! # In-Memory Task State Store
//!
//! Thread-safe broker + result backend for local runs and tests.
//!
//! ## Features
//!
//! - **FIFO queues per job kind** with visibility timeout: a claimed job is
//!   invisible until acknowledged or until the timeout lapses
//! - **Task table** holding each task's lifecycle state, metadata and the
//!   JSON-encoded final value
//! - **Wake-up signal** so idle workers do not spin between polls

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::Notify;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::messaging::errors::{MessagingError, MessagingResult};
use crate::messaging::message::JobMessage;
use crate::messaging::traits::TaskStateStore;
use crate::messaging::types::{
    ClaimedJob, JobKind, QueueStats, ReceiptHandle, TaskId, TaskRecord,
};
use crate::state_machine::TaskState;

/// In-memory job with visibility tracking
#[derive(Debug, Clone)]
struct InMemoryQueuedJob {
    id: u64,
    /// Serialized [`JobMessage`]
    payload: Vec<u8>,
    enqueued_at: DateTime<Utc>,
    /// When the job becomes visible again (None = visible now)
    visible_at: Option<DateTime<Utc>>,
    receive_count: u32,
}

impl InMemoryQueuedJob {
    fn is_visible(&self, now: DateTime<Utc>) -> bool {
        self.visible_at.map(|vt| vt <= now).unwrap_or(true)
    }
}

#[derive(Debug, Default)]
struct InMemoryQueue {
    jobs: VecDeque<InMemoryQueuedJob>,
    total_sent: u64,
    total_received: u64,
    total_acked: u64,
}

/// Task entry in the result backend
#[derive(Debug, Clone)]
struct StoredTask {
    kind: JobKind,
    state: TaskState,
    meta: Option<Value>,
    /// JSON bytes of the final value, present once `SUCCESS`
    final_value: Option<Vec<u8>>,
    updated_at: DateTime<Utc>,
}

/// In-memory task state store
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use text_tasker::messaging::{InMemoryTaskStateStore, JobKind, TaskStateStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryTaskStateStore::new();
/// let task_id = store.enqueue(JobKind::QuickAnalysis, "abc").await?;
///
/// let claimed = store
///     .claim_next(&[JobKind::QuickAnalysis], Duration::from_secs(30))
///     .await?
///     .expect("job was just enqueued");
/// assert_eq!(claimed.message.task_id, task_id);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct InMemoryTaskStateStore {
    queues: Mutex<HashMap<JobKind, InMemoryQueue>>,
    tasks: DashMap<TaskId, StoredTask>,
    next_message_id: AtomicU64,
    job_available: Notify,
}

impl Default for InMemoryTaskStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTaskStateStore {
    pub fn new() -> Self {
        let queues = JobKind::ALL
            .iter()
            .map(|kind| (*kind, InMemoryQueue::default()))
            .collect();
        Self {
            queues: Mutex::new(queues),
            tasks: DashMap::new(),
            next_message_id: AtomicU64::new(1),
            job_available: Notify::new(),
        }
    }

    /// Number of jobs held by a queue, visible or in flight (for testing)
    pub fn queue_length(&self, kind: JobKind) -> usize {
        self.queues
            .lock()
            .get(&kind)
            .map(|q| q.jobs.len())
            .unwrap_or(0)
    }

    /// Number of tasks ever created (for testing)
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Replace a task's stored final value with raw bytes (for testing)
    ///
    /// Lets tests simulate a corrupted result while the task stays `SUCCESS`.
    pub fn corrupt_final_value(&self, task_id: &TaskId, raw: Vec<u8>) -> MessagingResult<()> {
        let mut task = self
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| MessagingError::task_not_found(task_id.as_str()))?;
        task.final_value = Some(raw);
        Ok(())
    }

    fn record_for(task_id: &TaskId, task: &StoredTask) -> TaskRecord {
        TaskRecord {
            task_id: task_id.clone(),
            kind: task.kind,
            state: task.state.clone(),
            meta: task.meta.clone(),
            updated_at: task.updated_at,
        }
    }

    fn set_state(
        &self,
        task_id: &TaskId,
        state: TaskState,
        meta: Option<Value>,
        final_value: Option<Vec<u8>>,
    ) -> MessagingResult<()> {
        let mut task = self
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| MessagingError::task_not_found(task_id.as_str()))?;

        if task.state.is_terminal() {
            warn!(
                task_id = %task_id,
                current_state = %task.state,
                new_state = %state,
                "Overwriting terminal task state"
            );
        }

        task.state = state;
        task.meta = meta;
        if final_value.is_some() {
            task.final_value = final_value;
        }
        task.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl TaskStateStore for InMemoryTaskStateStore {
    async fn enqueue(&self, kind: JobKind, text: &str) -> MessagingResult<TaskId> {
        let task_id = TaskId::new(Uuid::new_v4().to_string());
        let message = JobMessage::new(task_id.clone(), kind, text);
        let payload = message.to_bytes()?;
        let now = Utc::now();

        // Record first so a fast worker never updates an unknown task
        self.tasks.insert(
            task_id.clone(),
            StoredTask {
                kind,
                state: TaskState::Pending,
                meta: None,
                final_value: None,
                updated_at: now,
            },
        );

        {
            let mut queues = self.queues.lock();
            let queue = queues
                .get_mut(&kind)
                .ok_or_else(|| MessagingError::queue_not_found(kind.queue_name()))?;
            let id = self.next_message_id.fetch_add(1, Ordering::Relaxed);
            queue.jobs.push_back(InMemoryQueuedJob {
                id,
                payload,
                enqueued_at: now,
                visible_at: None,
                receive_count: 0,
            });
            queue.total_sent += 1;
        }

        self.job_available.notify_one();
        debug!(task_id = %task_id, kind = %kind, "Job enqueued");
        Ok(task_id)
    }

    async fn claim_next(
        &self,
        kinds: &[JobKind],
        visibility_timeout: Duration,
    ) -> MessagingResult<Option<ClaimedJob>> {
        let timeout = chrono::Duration::from_std(visibility_timeout)
            .map_err(|e| MessagingError::internal(format!("Invalid visibility timeout: {e}")))?;
        let now = Utc::now();

        let mut queues = self.queues.lock();

        // Oldest visible job across the requested queues
        let mut candidate: Option<(JobKind, usize, DateTime<Utc>)> = None;
        for kind in kinds {
            let queue = queues
                .get(kind)
                .ok_or_else(|| MessagingError::queue_not_found(kind.queue_name()))?;
            if let Some((pos, job)) = queue
                .jobs
                .iter()
                .enumerate()
                .find(|(_, job)| job.is_visible(now))
            {
                if candidate.map_or(true, |(_, _, at)| job.enqueued_at < at) {
                    candidate = Some((*kind, pos, job.enqueued_at));
                }
            }
        }

        let Some((kind, pos, _)) = candidate else {
            return Ok(None);
        };

        let queue = queues
            .get_mut(&kind)
            .ok_or_else(|| MessagingError::queue_not_found(kind.queue_name()))?;
        let job = &mut queue.jobs[pos];
        let message = JobMessage::from_bytes(&job.payload)?;
        job.visible_at = Some(now + timeout);
        job.receive_count += 1;
        let claimed = ClaimedJob {
            message,
            receipt: ReceiptHandle::new(job.id.to_string()),
            receive_count: job.receive_count,
        };
        queue.total_received += 1;

        Ok(Some(claimed))
    }

    async fn wait_for_jobs(&self, timeout: Duration) {
        let _ = tokio::time::timeout(timeout, self.job_available.notified()).await;
    }

    async fn ack(&self, queue_name: &str, receipt: &ReceiptHandle) -> MessagingResult<()> {
        let message_id: u64 = receipt
            .as_str()
            .parse()
            .map_err(|_| MessagingError::invalid_receipt_handle(receipt.as_str()))?;

        let mut queues = self.queues.lock();
        let queue = queues
            .iter_mut()
            .find(|(kind, _)| kind.queue_name() == queue_name)
            .map(|(_, queue)| queue)
            .ok_or_else(|| MessagingError::queue_not_found(queue_name))?;

        let pos = queue
            .jobs
            .iter()
            .position(|job| job.id == message_id)
            .ok_or_else(|| MessagingError::message_not_found(message_id.to_string()))?;
        queue.jobs.remove(pos);
        queue.total_acked += 1;
        Ok(())
    }

    async fn extend_visibility(
        &self,
        queue_name: &str,
        receipt: &ReceiptHandle,
        extension: Duration,
    ) -> MessagingResult<()> {
        let message_id: u64 = receipt
            .as_str()
            .parse()
            .map_err(|_| MessagingError::invalid_receipt_handle(receipt.as_str()))?;
        let extension = chrono::Duration::from_std(extension)
            .map_err(|e| MessagingError::internal(format!("Invalid visibility extension: {e}")))?;

        let mut queues = self.queues.lock();
        let queue = queues
            .iter_mut()
            .find(|(kind, _)| kind.queue_name() == queue_name)
            .map(|(_, queue)| queue)
            .ok_or_else(|| MessagingError::queue_not_found(queue_name))?;

        let job = queue
            .jobs
            .iter_mut()
            .find(|job| job.id == message_id)
            .ok_or_else(|| MessagingError::message_not_found(message_id.to_string()))?;
        job.visible_at = Some(Utc::now() + extension);
        Ok(())
    }

    async fn update_state(
        &self,
        task_id: &TaskId,
        state: TaskState,
        meta: Option<Value>,
    ) -> MessagingResult<()> {
        self.set_state(task_id, state, meta, None)
    }

    async fn store_success(&self, task_id: &TaskId, result: &Value) -> MessagingResult<()> {
        let bytes = serde_json::to_vec(result)
            .map_err(|e| MessagingError::message_serialization(e.to_string()))?;
        self.set_state(task_id, TaskState::Success, Some(result.clone()), Some(bytes))
    }

    async fn store_failure(&self, task_id: &TaskId, reason: &str) -> MessagingResult<()> {
        self.set_state(
            task_id,
            TaskState::Failure,
            Some(Value::String(reason.to_string())),
            None,
        )
    }

    async fn get_state(&self, task_id: &TaskId) -> MessagingResult<Option<TaskRecord>> {
        Ok(self
            .tasks
            .get(task_id)
            .map(|task| Self::record_for(task_id, &task)))
    }

    async fn get_final_value(&self, task_id: &TaskId) -> MessagingResult<Value> {
        let task = self
            .tasks
            .get(task_id)
            .ok_or_else(|| MessagingError::task_not_found(task_id.as_str()))?;

        let bytes = match (&task.state, &task.final_value) {
            (TaskState::Success, Some(bytes)) => bytes,
            (state, _) => {
                return Err(MessagingError::result_not_ready(
                    task_id.as_str(),
                    state.to_string(),
                ))
            }
        };

        serde_json::from_slice(bytes)
            .map_err(|e| MessagingError::result_deserialization(task_id.as_str(), e.to_string()))
    }

    async fn queue_stats(&self, kind: JobKind) -> MessagingResult<QueueStats> {
        let queues = self.queues.lock();
        let queue = queues
            .get(&kind)
            .ok_or_else(|| MessagingError::queue_not_found(kind.queue_name()))?;

        let now = Utc::now();
        let in_flight_count = queue.jobs.iter().filter(|job| !job.is_visible(now)).count() as u64;

        Ok(QueueStats {
            queue_name: kind.queue_name().to_string(),
            message_count: queue.jobs.len() as u64,
            in_flight_count,
            total_sent: queue.total_sent,
            total_received: queue.total_received,
            total_acked: queue.total_acked,
        })
    }

    async fn health_check(&self) -> MessagingResult<bool> {
        Ok(true)
    }

    fn provider_name(&self) -> &'static str {
        "in_memory"
    }
}
