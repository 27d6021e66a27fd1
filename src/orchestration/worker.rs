//! # Text Task Worker
//!
//! Executes one claimed job to completion and records every lifecycle
//! transition in the task state store.
//!
//! ## Flow (full processing)
//!
//! 1. Walk the processing plan in order
//! 2. Per step: run the [`StepExecutor`], write `PROGRESS` with the step's
//!    [`ProgressUpdate`], keep the step output
//! 3. Write `SUCCESS` with the [`TextProcessingResult`]
//!
//! Any fault along the way is recorded as `FAILURE` with a readable reason
//! and never propagated to the submitter. Quick analysis writes `SUCCESS`
//! directly with no intermediate `PROGRESS`.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument};

use crate::constants::status;
use crate::error::{Result, TaskerError};
use crate::logging::{log_step_operation, log_task_operation};
use crate::messaging::{JobKind, JobMessage, TaskId, TaskStateStore};
use crate::models::{ProgressUpdate, QuickAnalysisResult, TextProcessingResult};
use crate::orchestration::step_executor::StepExecutor;
use crate::orchestration::text_processor::TextProcessor;
use crate::state_machine::TaskState;

/// Task handle bound to the task state store
///
/// The only way a worker touches task state; every write goes to the store.
#[derive(Clone)]
pub struct TaskContext {
    task_id: TaskId,
    store: Arc<dyn TaskStateStore>,
}

impl std::fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskContext")
            .field("task_id", &self.task_id)
            .field("store", &self.store.provider_name())
            .finish()
    }
}

impl TaskContext {
    pub fn new(task_id: TaskId, store: Arc<dyn TaskStateStore>) -> Self {
        Self { task_id, store }
    }

    pub fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    pub async fn update_progress(&self, update: &ProgressUpdate) -> Result<()> {
        let meta = serde_json::to_value(update)?;
        self.store
            .update_state(&self.task_id, TaskState::Progress, Some(meta))
            .await?;
        Ok(())
    }

    pub async fn succeed(&self, result: &Value) -> Result<()> {
        self.store.store_success(&self.task_id, result).await?;
        Ok(())
    }

    pub async fn fail(&self, reason: &str) -> Result<()> {
        self.store.store_failure(&self.task_id, reason).await?;
        Ok(())
    }
}

/// Worker executor for both job kinds
pub struct TextTaskWorker {
    worker_id: String,
    processor: TextProcessor,
    step_executor: Arc<dyn StepExecutor>,
    /// Set to `true` when the owning pool is shutting down
    shutdown: Option<watch::Receiver<bool>>,
}

impl std::fmt::Debug for TextTaskWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextTaskWorker")
            .field("worker_id", &self.worker_id)
            .field("processor", &self.processor)
            .field("step_executor", &self.step_executor.name())
            .finish()
    }
}

impl TextTaskWorker {
    pub fn new(
        worker_id: impl Into<String>,
        processor: TextProcessor,
        step_executor: Arc<dyn StepExecutor>,
    ) -> Self {
        Self {
            worker_id: worker_id.into(),
            processor,
            step_executor,
            shutdown: None,
        }
    }

    /// Stop full pipelines between steps once `shutdown` turns `true`
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Execute one job and record its terminal state
    ///
    /// Job faults become `FAILURE`; only a failure to write to the store is
    /// returned as `Err`.
    #[instrument(skip(self, ctx, message), fields(worker_id = %self.worker_id, task_id = %message.task_id, kind = %message.kind))]
    pub async fn execute(&self, ctx: &TaskContext, message: &JobMessage) -> Result<()> {
        log_task_operation(
            "execute",
            ctx.task_id().as_str(),
            Some(message.kind.job_name()),
            "started",
            None,
        );

        let outcome = match message.kind {
            JobKind::ProcessText => self
                .process_text(ctx, &message.text)
                .await
                .and_then(|result| serde_json::to_value(result).map_err(TaskerError::from)),
            JobKind::QuickAnalysis => {
                serde_json::to_value(Self::quick_analysis(&message.text)).map_err(TaskerError::from)
            }
        };

        match outcome {
            Ok(value) => {
                ctx.succeed(&value).await?;
                log_task_operation(
                    "execute",
                    ctx.task_id().as_str(),
                    Some(message.kind.job_name()),
                    "success",
                    None,
                );
                Ok(())
            }
            Err(fault) => {
                error!(
                    task_id = %ctx.task_id(),
                    error = %fault,
                    "Task execution failed, recording FAILURE"
                );
                ctx.fail(fault.reason()).await?;
                log_task_operation(
                    "execute",
                    ctx.task_id().as_str(),
                    Some(message.kind.job_name()),
                    "failure",
                    Some(fault.reason()),
                );
                Ok(())
            }
        }
    }

    /// Run the full step pipeline, writing `PROGRESS` after every step
    pub async fn process_text(&self, ctx: &TaskContext, text: &str) -> Result<TextProcessingResult> {
        debug!(
            task_id = %ctx.task_id(),
            text_length = text.len(),
            total_steps = self.processor.total_steps(),
            "Starting text processing"
        );

        let mut outputs = Vec::with_capacity(self.processor.total_steps() as usize);

        for step in self.processor.processing_plan() {
            if self.shutdown_requested() {
                info!(task_id = %ctx.task_id(), step = step.index, "Shutdown requested, abandoning pipeline");
                return Err(TaskerError::WorkerError(status::WORKER_SHUTDOWN.to_string()));
            }

            let output = self.step_executor.execute(text, &step).await?;

            let update = ProgressUpdate::from(&step);
            ctx.update_progress(&update).await?;
            log_step_operation(ctx.task_id().as_str(), &step, &update.status);

            outputs.push(output);
        }

        debug!(task_id = %ctx.task_id(), steps = outputs.len(), "Text processing completed");
        Ok(TextProcessingResult::from_outputs(
            ctx.task_id().as_str(),
            text,
            &outputs,
        ))
    }

    pub fn quick_analysis(text: &str) -> QuickAnalysisResult {
        QuickAnalysisResult::analyze(text)
    }
}
