//! # Progress Query Service
//!
//! Read side of the task lifecycle. Every query returns a well-formed
//! [`ProgressPayload`]; unknown identifiers and result retrieval faults are
//! reported as payloads, never as errors.

use tracing::{debug, warn};

use crate::messaging::TaskId;
use crate::services::task_service::TaskCommandService;
use crate::state_machine::{normalize, ProgressPayload};

#[derive(Debug, Clone)]
pub struct ProgressQueryService {
    tasks: TaskCommandService,
}

impl ProgressQueryService {
    pub fn new(tasks: TaskCommandService) -> Self {
        Self { tasks }
    }

    /// Current normalized progress of a task
    pub async fn get_progress(&self, task_id: &TaskId) -> ProgressPayload {
        match self.tasks.get_task_record(task_id).await {
            Some(record) => normalize(&record.state, record.meta.as_ref()),
            None => {
                debug!(task_id = %task_id, "Progress requested for unknown task");
                ProgressPayload::not_found()
            }
        }
    }

    /// Normalized progress, with the final value attached once `SUCCESS`
    ///
    /// If the final value cannot be loaded the payload is downgraded to
    /// `ERROR`; the stored `SUCCESS` record is left as is.
    pub async fn get_result(&self, task_id: &TaskId) -> ProgressPayload {
        let mut payload = self.get_progress(task_id).await;
        if !payload.is_success() {
            return payload;
        }

        match self.tasks.fetch_final_value(task_id).await {
            Ok(value) => payload.result = Some(value),
            Err(e) => {
                warn!(task_id = %task_id, error = %e, "Failed to load task result");
                payload.mark_result_error(e);
            }
        }
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::{InMemoryTaskStateStore, TaskStateStore};
    use crate::state_machine::TaskState;
    use serde_json::json;
    use std::sync::Arc;

    fn setup() -> (Arc<InMemoryTaskStateStore>, TaskCommandService, ProgressQueryService) {
        let store = Arc::new(InMemoryTaskStateStore::new());
        let tasks = TaskCommandService::new(store.clone());
        let queries = ProgressQueryService::new(tasks.clone());
        (store, tasks, queries)
    }

    #[tokio::test]
    async fn test_unknown_task_is_not_found() {
        let (_, _, queries) = setup();
        let id = TaskId::from("never-submitted");
        let expected = json!({"state": "NOT_FOUND", "progress": 0, "status": "Task not found"});
        assert_eq!(queries.get_progress(&id).await.to_json(), expected);
        assert_eq!(queries.get_result(&id).await.to_json(), expected);
    }

    #[tokio::test]
    async fn test_progress_payload_from_store() {
        let (store, tasks, queries) = setup();
        let id = tasks.submit_full_processing("hello").await.unwrap();
        assert_eq!(queries.get_progress(&id).await.state, TaskState::Pending);

        store
            .update_state(
                &id,
                TaskState::Progress,
                Some(json!({"current": 2, "total": 5, "progress": 40, "status": "Analyzing semantics: 40%"})),
            )
            .await
            .unwrap();

        let payload = queries.get_result(&id).await;
        assert_eq!(payload.current, Some(2));
        assert_eq!(payload.progress, 40);
        assert!(payload.result.is_none());
    }

    #[tokio::test]
    async fn test_result_attached_on_success() {
        let (store, tasks, queries) = setup();
        let id = tasks.submit_quick_analysis("abc").await.unwrap();
        store.store_success(&id, &json!({"word_count": 1})).await.unwrap();

        assert_eq!(
            queries.get_progress(&id).await.to_json(),
            json!({"state": "SUCCESS", "progress": 100, "status": "Task completed!"})
        );
        assert_eq!(
            queries.get_result(&id).await.to_json(),
            json!({
                "state": "SUCCESS",
                "progress": 100,
                "status": "Task completed!",
                "result": {"word_count": 1}
            })
        );
    }

    #[tokio::test]
    async fn test_failure_reason_surfaces() {
        let (store, tasks, queries) = setup();
        let id = tasks.submit_full_processing("hello").await.unwrap();
        store.store_failure(&id, "disk full").await.unwrap();

        let payload = queries.get_result(&id).await;
        assert_eq!(payload.state, TaskState::Failure);
        assert_eq!(payload.status, "Task failed: disk full");
    }

    #[tokio::test]
    async fn test_corrupt_result_downgrades_to_error() {
        let (store, tasks, queries) = setup();
        let id = tasks.submit_full_processing("hello").await.unwrap();
        store.store_success(&id, &json!({"word_count": 1})).await.unwrap();
        store.corrupt_final_value(&id, b"{not json".to_vec()).unwrap();

        let payload = queries.get_result(&id).await;
        assert_eq!(payload.state, TaskState::Error);
        assert_eq!(payload.progress, 0);
        assert!(payload.status.starts_with("Failed to load result: "));
        assert!(payload.result.is_none());

        // The stored record is untouched
        assert!(queries.get_progress(&id).await.is_success());
    }
}
