//! # Text Tasker Configuration
//!
//! Layered configuration loaded by [`ConfigManager`]: built-in defaults, then
//! `config/text-tasker.toml`, then `config/text-tasker.<environment>.toml`,
//! then `TEXT_TASKER__*` environment variables (`__` separates sections).
//!
//! ## Usage
//!
//! ```rust,no_run
//! use text_tasker::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//!
//! let concurrency = manager.config().worker.concurrency;
//! let step_delay = manager.config().worker.step_delay();
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::DEFAULT_PROCESSING_STEPS;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskerConfig {
    pub environment: String,
    pub store: StoreConfig,
    pub worker: WorkerConfig,
    pub client: ClientConfig,
    pub logging: LoggingConfig,
}

impl Default for TaskerConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            store: StoreConfig::default(),
            worker: WorkerConfig::default(),
            client: ClientConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Task state store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    InMemory,
}

/// Broker and result backend settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Broker address for external backends
    pub broker_url: String,
    /// Result backend address for external backends
    pub result_backend_url: String,
    /// Wire format for jobs and results; only `json` is supported
    pub serializer: String,
    /// Seconds a claimed job stays invisible before redelivery
    pub visibility_timeout_seconds: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::InMemory,
            broker_url: "redis://localhost:6379/0".to_string(),
            result_backend_url: "redis://localhost:6379/0".to_string(),
            serializer: "json".to_string(),
            visibility_timeout_seconds: 3600,
        }
    }
}

impl StoreConfig {
    pub fn visibility_timeout(&self) -> Duration {
        Duration::from_secs(self.visibility_timeout_seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub concurrency: usize,
    /// Simulated work per pipeline step
    pub step_delay_ms: u64,
    /// Idle wait between empty claims
    pub poll_interval_ms: u64,
    /// Ordered step descriptions for the full pipeline
    pub steps: Vec<String>,
    /// How long shutdown waits for in-flight jobs before abandoning them
    pub shutdown_timeout_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            step_delay_ms: 2000,
            poll_interval_ms: 100,
            steps: DEFAULT_PROCESSING_STEPS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            shutdown_timeout_ms: 30_000,
        }
    }
}

impl WorkerConfig {
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Cadence at which clients re-issue progress queries
    pub poll_interval_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
        }
    }
}

impl ClientConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Filter directive overriding the environment default, e.g. `info`
    pub level: Option<String>,
}

impl TaskerConfig {
    /// Validate configuration values that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.environment.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "environment",
                "root configuration",
            ));
        }

        if self.store.broker_url.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "store.broker_url",
                "store configuration",
            ));
        }

        if self.store.result_backend_url.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "store.result_backend_url",
                "store configuration",
            ));
        }

        if self.store.serializer != "json" {
            return Err(ConfigurationError::invalid_value(
                "store.serializer",
                &self.store.serializer,
                "only json serialization is supported",
            ));
        }

        if self.store.visibility_timeout_seconds == 0 {
            return Err(ConfigurationError::invalid_value(
                "store.visibility_timeout_seconds",
                "0",
                "visibility timeout must be at least 1 second",
            ));
        }

        if self.worker.concurrency == 0 {
            return Err(ConfigurationError::invalid_value(
                "worker.concurrency",
                "0",
                "concurrency must be at least 1",
            ));
        }

        if self.worker.shutdown_timeout_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "worker.shutdown_timeout_ms",
                "0",
                "shutdown timeout must be at least 1 millisecond",
            ));
        }

        if self.worker.steps.is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "worker.steps",
                "worker configuration",
            ));
        }

        if let Some(pos) = self.worker.steps.iter().position(|s| s.trim().is_empty()) {
            return Err(ConfigurationError::invalid_value(
                format!("worker.steps[{pos}]"),
                "",
                "step description cannot be blank",
            ));
        }

        Ok(())
    }
}
