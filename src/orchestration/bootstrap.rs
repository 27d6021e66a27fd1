//! # System Bootstrap
//!
//! Wires the task state store, the client-facing services and a running
//! worker pool from one validated configuration.
//!
//! ## Key Features
//!
//! - **Configuration-driven**: step plan, step delay, concurrency and store
//!   timeouts all come from [`ConfigManager`]
//! - **Injectable seams**: tests swap in their own store or step executor
//!   through [`TextTaskerSystem::bootstrap_with`]
//! - **Graceful shutdown**: stops the pool and drains in-flight jobs

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::config::{ConfigManager, StoreBackend};
use crate::error::Result;
use crate::messaging::{InMemoryTaskStateStore, TaskStateStore};
use crate::orchestration::step_executor::{DelayStepExecutor, StepExecutor};
use crate::orchestration::text_processor::TextProcessor;
use crate::orchestration::worker::TextTaskWorker;
use crate::orchestration::worker_pool::{WorkerPool, WorkerPoolConfig};
use crate::services::{ProgressQueryService, TaskCommandService};

/// System status information
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemStatus {
    pub running: bool,
    pub environment: String,
    pub store_provider: String,
    pub concurrency: usize,
    pub in_flight_jobs: usize,
    pub total_steps: u32,
}

/// Handle to a running text-tasker system
pub struct TextTaskerSystem {
    config_manager: Arc<ConfigManager>,
    store: Arc<dyn TaskStateStore>,
    tasks: TaskCommandService,
    progress: ProgressQueryService,
    pool: WorkerPool,
    total_steps: u32,
}

impl std::fmt::Debug for TextTaskerSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextTaskerSystem")
            .field("environment", &self.config_manager.environment())
            .field("store", &self.store.provider_name())
            .field("pool", &self.pool)
            .finish()
    }
}

impl TextTaskerSystem {
    /// Bootstrap with the configured store and a delaying step executor
    pub async fn bootstrap(config_manager: Arc<ConfigManager>) -> Result<Self> {
        let config = config_manager.config();

        let store: Arc<dyn TaskStateStore> = match config.store.backend {
            StoreBackend::InMemory => Arc::new(InMemoryTaskStateStore::new()),
        };
        let step_executor = Arc::new(DelayStepExecutor::new(config.worker.step_delay()));

        Self::bootstrap_with(config_manager, store, step_executor).await
    }

    /// Bootstrap with an explicit store and step executor
    pub async fn bootstrap_with(
        config_manager: Arc<ConfigManager>,
        store: Arc<dyn TaskStateStore>,
        step_executor: Arc<dyn StepExecutor>,
    ) -> Result<Self> {
        info!(
            environment = config_manager.environment(),
            store = store.provider_name(),
            step_executor = step_executor.name(),
            "🚀 BOOTSTRAP: Starting text-tasker system"
        );

        let config = config_manager.config();
        let processor = TextProcessor::new(config.worker.steps.iter().cloned())?;
        let total_steps = processor.total_steps();

        let worker = TextTaskWorker::new(
            format!("{}-worker", config_manager.environment()),
            processor,
            step_executor,
        );
        let pool = WorkerPool::start(store.clone(), worker, WorkerPoolConfig::from_config(config))?;

        let tasks = TaskCommandService::new(store.clone());
        let progress = ProgressQueryService::new(tasks.clone());

        info!("✅ BOOTSTRAP: text-tasker system ready");

        Ok(Self {
            config_manager,
            store,
            tasks,
            progress,
            pool,
            total_steps,
        })
    }

    pub fn tasks(&self) -> &TaskCommandService {
        &self.tasks
    }

    pub fn progress(&self) -> &ProgressQueryService {
        &self.progress
    }

    pub fn store(&self) -> &Arc<dyn TaskStateStore> {
        &self.store
    }

    pub fn config_manager(&self) -> &Arc<ConfigManager> {
        &self.config_manager
    }

    /// Get system status information
    pub fn status(&self) -> SystemStatus {
        SystemStatus {
            running: self.pool.is_running(),
            environment: self.config_manager.environment().to_string(),
            store_provider: self.store.provider_name().to_string(),
            concurrency: self.pool.config().concurrency,
            in_flight_jobs: self.pool.in_flight(),
            total_steps: self.total_steps,
        }
    }

    /// Stop the worker pool and wait for in-flight jobs
    pub async fn shutdown(self) -> Result<()> {
        info!("🛑 BOOTSTRAP: Shutting down text-tasker system");
        self.pool.shutdown().await
    }
}
