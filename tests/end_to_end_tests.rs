//! End-to-end lifecycle tests: submission, worker execution and polling
//! running together in one process, coordinated only through the store.

mod common;

use std::sync::Arc;

use common::*;
use serde_json::json;
use text_tasker::messaging::{JobKind, TaskId, TaskStateStore};
use text_tasker::orchestration::ImmediateStepExecutor;
use text_tasker::state_machine::TaskState;
use text_tasker::TaskerError;
use tokio_test::assert_err;

#[tokio::test]
async fn test_full_processing_lifecycle() {
    let gate = GatedStepExecutor::new();
    let harness = TestSystem::start(gate.clone()).await;
    let queries = harness.queries();

    let task_id = harness
        .system
        .tasks()
        .submit_full_processing("hello world")
        .await
        .unwrap();

    // No step may run yet
    assert_eq!(
        queries.get_progress(&task_id).await.to_json(),
        json!({"state": "PENDING", "progress": 0, "status": "Task is pending..."})
    );

    gate.release(3);
    let seen = poll_until(queries, &task_id, |p| p.current == Some(3)).await;
    assert_eq!(
        seen.last().unwrap().to_json(),
        json!({
            "state": "PROGRESS",
            "current": 3,
            "total": 5,
            "progress": 60,
            "status": "Running classification: 60%"
        })
    );

    // Progress never moves backwards
    let currents: Vec<i64> = seen.iter().filter_map(|p| p.current).collect();
    assert!(currents.windows(2).all(|w| w[0] <= w[1]));

    gate.release(2);
    wait_for_terminal(queries, &task_id).await;

    let payload = queries.get_result(&task_id).await;
    assert_eq!(payload.state, TaskState::Success);
    assert_eq!(payload.progress, 100);
    assert_eq!(payload.status, "Task completed!");

    let result = payload.result.expect("result attached");
    assert_eq!(result["task_id"], task_id.as_str());
    assert_eq!(result["word_count"], 2);
    assert_eq!(result["char_count"], 11);
    assert_eq!(result["steps_completed"], 5);
    assert_eq!(result["progress"], 100);
    assert_eq!(result["original_text"], "hello world");
    assert_eq!(result["processed_text"].as_str().unwrap().lines().count(), 5);

    harness.shutdown().await;
}

#[tokio::test]
async fn test_quick_analysis_lifecycle() {
    let harness = TestSystem::start(Arc::new(ImmediateStepExecutor)).await;
    let queries = harness.queries();

    let task_id = harness
        .system
        .tasks()
        .submit_quick_analysis("abc")
        .await
        .unwrap();

    let seen = wait_for_terminal(queries, &task_id).await;
    assert!(seen.iter().all(|p| p.state != TaskState::Progress));

    assert_eq!(
        queries.get_result(&task_id).await.to_json(),
        json!({
            "state": "SUCCESS",
            "progress": 100,
            "status": "Task completed!",
            "result": {
                "word_count": 1,
                "char_count": 3,
                "contains_letters": true,
                "analysis_type": "quick"
            }
        })
    );

    harness.shutdown().await;
}

#[tokio::test]
async fn test_unknown_task_is_not_found() {
    let harness = TestSystem::start(Arc::new(ImmediateStepExecutor)).await;
    let task_id = TaskId::from("never-submitted");

    let expected = json!({"state": "NOT_FOUND", "progress": 0, "status": "Task not found"});
    assert_eq!(harness.queries().get_progress(&task_id).await.to_json(), expected);
    assert_eq!(harness.queries().get_result(&task_id).await.to_json(), expected);

    harness.shutdown().await;
}

#[tokio::test]
async fn test_corrupt_result_reported_as_error() {
    let harness = TestSystem::start(Arc::new(ImmediateStepExecutor)).await;
    let queries = harness.queries();

    let task_id = harness
        .system
        .tasks()
        .submit_full_processing("hello world")
        .await
        .unwrap();
    wait_for_terminal(queries, &task_id).await;

    harness
        .store
        .corrupt_final_value(&task_id, vec![0xff, 0xfe, b'{'])
        .unwrap();

    let result = queries.get_result(&task_id).await;
    assert_eq!(result.state, TaskState::Error);
    assert_eq!(result.progress, 0);
    assert!(result.status.starts_with("Failed to load result: "));
    assert!(result.result.is_none());

    assert_eq!(
        queries.get_progress(&task_id).await.to_json(),
        json!({"state": "SUCCESS", "progress": 100, "status": "Task completed!"})
    );

    harness.shutdown().await;
}

#[tokio::test]
async fn test_blank_submissions_are_rejected() {
    let harness = TestSystem::start(Arc::new(ImmediateStepExecutor)).await;
    let tasks = harness.system.tasks();

    for text in ["", " ", "\t\n  "] {
        let err = assert_err!(tasks.submit_full_processing(text).await);
        assert_eq!(err, TaskerError::ValidationError("Text cannot be empty".to_string()));
        assert_err!(tasks.submit_quick_analysis(text).await);
    }

    assert_eq!(harness.store.task_count(), 0);
    assert_eq!(harness.store.queue_length(JobKind::ProcessText), 0);
    assert_eq!(harness.store.queue_length(JobKind::QuickAnalysis), 0);

    harness.shutdown().await;
}

#[tokio::test]
async fn test_many_tasks_complete_independently() {
    let harness = TestSystem::start(Arc::new(ImmediateStepExecutor)).await;
    let tasks = harness.system.tasks();

    let mut ids = Vec::new();
    for i in 0..12 {
        let text = format!("document number {i}");
        let id = if i % 3 == 0 {
            tasks.submit_quick_analysis(&text).await.unwrap()
        } else {
            tasks.submit_full_processing(&text).await.unwrap()
        };
        ids.push(id);
    }

    for id in &ids {
        wait_for_terminal(harness.queries(), id).await;
        let payload = harness.queries().get_result(id).await;
        assert!(payload.is_success());
        assert_eq!(payload.result.unwrap()["word_count"], 3);
    }

    let stats = harness.store.queue_stats(JobKind::ProcessText).await.unwrap();
    assert_eq!(stats.total_sent, 8);
    assert_eq!(stats.total_acked, 8);

    harness.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_interrupts_running_pipeline() {
    let gate = GatedStepExecutor::new();
    let harness = TestSystem::start(gate.clone()).await;
    let queries = harness.queries();

    let task_id = harness
        .system
        .tasks()
        .submit_full_processing("long running")
        .await
        .unwrap();

    gate.release(1);
    poll_until(queries, &task_id, |p| p.current == Some(1)).await;

    let store = harness.store.clone();
    let shutdown = tokio::spawn(harness.shutdown());

    // Let the blocked step finish so the pipeline reaches its next check
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    gate.release(1);
    tokio::time::timeout(TEST_TIMEOUT, shutdown)
        .await
        .expect("shutdown completes")
        .unwrap();

    let record = store.get_state(&task_id).await.unwrap().unwrap();
    assert_eq!(record.state, TaskState::Failure);
    assert_eq!(record.meta, Some(json!("Worker shutdown before completion")));
}
