//! # Step Executor
//!
//! The per-step unit of work, injected into the worker. Production uses
//! [`DelayStepExecutor`], which waits a fixed delay before producing the
//! step's output; tests substitute [`ImmediateStepExecutor`] or their own
//! implementation.

use std::time::Duration;

use async_trait::async_trait;
use tracing::trace;

use crate::error::Result;
use crate::models::ProcessingStep;
use crate::orchestration::text_processor::TextProcessor;

/// Performs the work for one pipeline step and returns its textual output
///
/// An `Err` is an unrecoverable worker fault: the pipeline stops and the
/// task is recorded as `FAILURE` with the error's reason.
#[async_trait]
pub trait StepExecutor: Send + Sync + 'static {
    async fn execute(&self, text: &str, step: &ProcessingStep) -> Result<String>;

    /// Executor name for logging
    fn name(&self) -> &'static str;
}

/// Waits `delay` per step, then emits the step marker
#[derive(Debug, Clone)]
pub struct DelayStepExecutor {
    delay: Duration,
}

impl DelayStepExecutor {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl StepExecutor for DelayStepExecutor {
    async fn execute(&self, text: &str, step: &ProcessingStep) -> Result<String> {
        trace!(step = step.index, delay_ms = self.delay.as_millis() as u64, "Simulating step work");
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(TextProcessor::process_text_chunk(text, step))
    }

    fn name(&self) -> &'static str {
        "delay"
    }
}

/// Emits the step marker without waiting
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateStepExecutor;

#[async_trait]
impl StepExecutor for ImmediateStepExecutor {
    async fn execute(&self, text: &str, step: &ProcessingStep) -> Result<String> {
        Ok(TextProcessor::process_text_chunk(text, step))
    }

    fn name(&self) -> &'static str {
        "immediate"
    }
}
