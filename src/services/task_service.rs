//! # Task Submission Service
//!
//! Validates input and enqueues jobs, returning the store-assigned task
//! identifier without waiting for a worker. Also exposes the raw store reads
//! the query side builds on.

use std::sync::Arc;

use serde_json::Value;
use tracing::{instrument, warn};

use crate::error::Result;
use crate::logging::log_task_operation;
use crate::messaging::{JobKind, MessagingResult, TaskId, TaskRecord, TaskStateStore};
use crate::validation::validate_text_input;

#[derive(Clone)]
pub struct TaskCommandService {
    store: Arc<dyn TaskStateStore>,
}

impl std::fmt::Debug for TaskCommandService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskCommandService")
            .field("store", &self.store.provider_name())
            .finish()
    }
}

impl TaskCommandService {
    pub fn new(store: Arc<dyn TaskStateStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn TaskStateStore> {
        &self.store
    }

    /// Enqueue the multi-step processing job
    ///
    /// Fails with `ValidationError` for empty or whitespace-only text, in
    /// which case no task is created.
    #[instrument(skip(self, text), fields(text_length = text.len()))]
    pub async fn submit_full_processing(&self, text: &str) -> Result<TaskId> {
        self.submit(JobKind::ProcessText, text).await
    }

    /// Enqueue the quick-analysis job, with the same validation
    #[instrument(skip(self, text), fields(text_length = text.len()))]
    pub async fn submit_quick_analysis(&self, text: &str) -> Result<TaskId> {
        self.submit(JobKind::QuickAnalysis, text).await
    }

    async fn submit(&self, kind: JobKind, text: &str) -> Result<TaskId> {
        let text = validate_text_input(text)?;
        let task_id = self.store.enqueue(kind, text).await?;
        log_task_operation("submit", task_id.as_str(), Some(kind.job_name()), "queued", None);
        Ok(task_id)
    }

    /// Raw state of a task, `None` when unknown
    ///
    /// Store faults are logged and reported as an unknown task, so callers
    /// never see an error from a lookup.
    pub async fn get_task_record(&self, task_id: &TaskId) -> Option<TaskRecord> {
        match self.store.get_state(task_id).await {
            Ok(record) => record,
            Err(e) => {
                warn!(task_id = %task_id, error = %e, "Failed to read task state");
                None
            }
        }
    }

    /// Final value of a `SUCCESS` task
    pub async fn fetch_final_value(&self, task_id: &TaskId) -> MessagingResult<Value> {
        self.store.get_final_value(task_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskerError;
    use crate::messaging::InMemoryTaskStateStore;
    use crate::state_machine::TaskState;

    fn service() -> (Arc<InMemoryTaskStateStore>, TaskCommandService) {
        let store = Arc::new(InMemoryTaskStateStore::new());
        (store.clone(), TaskCommandService::new(store))
    }

    #[tokio::test]
    async fn test_submit_creates_pending_task() {
        let (store, service) = service();
        let task_id = service.submit_full_processing("hello world").await.unwrap();

        let record = service.get_task_record(&task_id).await.unwrap();
        assert_eq!(record.state, TaskState::Pending);
        assert_eq!(record.kind, JobKind::ProcessText);
        assert_eq!(store.queue_length(JobKind::ProcessText), 1);
    }

    #[tokio::test]
    async fn test_quick_analysis_uses_its_own_queue() {
        let (store, service) = service();
        service.submit_quick_analysis("abc").await.unwrap();
        assert_eq!(store.queue_length(JobKind::QuickAnalysis), 1);
        assert_eq!(store.queue_length(JobKind::ProcessText), 0);
    }

    #[tokio::test]
    async fn test_blank_text_creates_no_task() {
        let (store, service) = service();
        for text in ["", "   ", "\n\t "] {
            let err = service.submit_full_processing(text).await.unwrap_err();
            assert_eq!(err, TaskerError::ValidationError("Text cannot be empty".to_string()));
            assert!(service.submit_quick_analysis(text).await.unwrap_err().is_validation());
        }
        assert_eq!(store.task_count(), 0);
    }

    #[tokio::test]
    async fn test_text_is_not_trimmed() {
        let (store, service) = service();
        service.submit_full_processing("  padded  ").await.unwrap();
        let claimed = store
            .claim_next(&[JobKind::ProcessText], std::time::Duration::from_secs(30))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(claimed.message.text, "  padded  ");
    }

    #[tokio::test]
    async fn test_unknown_task_record() {
        let (_, service) = service();
        assert!(service.get_task_record(&TaskId::from("missing")).await.is_none());
    }
}
