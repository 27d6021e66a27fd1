//! Shared helpers for integration tests: a step executor the test controls
//! step by step, and a booted system backed by an inspectable store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use text_tasker::config::{ConfigManager, TaskerConfig};
use text_tasker::messaging::{InMemoryTaskStateStore, TaskId};
use text_tasker::models::ProcessingStep;
use text_tasker::orchestration::{StepExecutor, TextProcessor, TextTaskerSystem};
use text_tasker::state_machine::ProgressPayload;
use text_tasker::ProgressQueryService;
use tokio::sync::Semaphore;

/// Upper bound for any single wait in integration tests
pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Step executor that runs one step per released permit
#[derive(Debug)]
pub struct GatedStepExecutor {
    gate: Semaphore,
}

impl GatedStepExecutor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            gate: Semaphore::new(0),
        })
    }

    /// Allow `steps` more steps to run
    pub fn release(&self, steps: usize) {
        self.gate.add_permits(steps);
    }
}

#[async_trait]
impl StepExecutor for GatedStepExecutor {
    async fn execute(&self, text: &str, step: &ProcessingStep) -> text_tasker::Result<String> {
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| text_tasker::TaskerError::Internal(e.to_string()))?;
        permit.forget();
        Ok(TextProcessor::process_text_chunk(text, step))
    }

    fn name(&self) -> &'static str {
        "gated"
    }
}

/// A booted system plus a concrete handle on its store
pub struct TestSystem {
    pub system: TextTaskerSystem,
    pub store: Arc<InMemoryTaskStateStore>,
}

impl TestSystem {
    pub async fn start(step_executor: Arc<dyn StepExecutor>) -> Self {
        let mut config = TaskerConfig::default();
        config.environment = "test".to_string();
        config.worker.step_delay_ms = 0;
        config.worker.poll_interval_ms = 10;
        let manager = ConfigManager::from_config(config).expect("test config is valid");

        let store = Arc::new(InMemoryTaskStateStore::new());
        let system = TextTaskerSystem::bootstrap_with(manager, store.clone(), step_executor)
            .await
            .expect("system boots");

        Self { system, store }
    }

    pub fn queries(&self) -> &ProgressQueryService {
        self.system.progress()
    }

    pub async fn shutdown(self) {
        self.system.shutdown().await.expect("clean shutdown");
    }
}

/// Poll `get_progress` until `predicate` holds, returning every payload seen
pub async fn poll_until<F>(
    queries: &ProgressQueryService,
    task_id: &TaskId,
    predicate: F,
) -> Vec<ProgressPayload>
where
    F: Fn(&ProgressPayload) -> bool,
{
    let mut seen = Vec::new();
    tokio::time::timeout(TEST_TIMEOUT, async {
        loop {
            let payload = queries.get_progress(task_id).await;
            let done = predicate(&payload);
            seen.push(payload);
            if done {
                break;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("condition reached before timeout");
    seen
}

/// Poll until the task reaches `SUCCESS` or `FAILURE`
pub async fn wait_for_terminal(queries: &ProgressQueryService, task_id: &TaskId) -> Vec<ProgressPayload> {
    poll_until(queries, task_id, |p| p.state.is_terminal()).await
}
