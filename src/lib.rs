#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Text Tasker
//!
//! Asynchronous text-processing task orchestration: submit long-running jobs,
//! run them on a background worker pool, and poll for progress and results.
//!
//! ## Architecture
//!
//! Producers, workers and pollers never share in-memory objects. They
//! coordinate only through a [`TaskStateStore`](messaging::TaskStateStore),
//! a broker plus result backend keyed by task identifier:
//!
//! ```text
//! client ──submit──▶ TaskCommandService ──enqueue──▶ store ◀──claim/update── WorkerPool
//! client ──poll────▶ ProgressQueryService ──get_state──▶ store ──normalize──▶ payload
//! ```
//!
//! ## Module Organization
//!
//! - [`models`] - Processing steps, progress updates and result records
//! - [`messaging`] - Task state store contract and in-memory implementation
//! - [`state_machine`] - Lifecycle states and progress normalization
//! - [`orchestration`] - Step pipeline, worker, worker pool and bootstrap
//! - [`services`] - Task submission and progress queries
//! - [`config`] - Layered configuration
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use text_tasker::config::ConfigManager;
//! use text_tasker::orchestration::TextTaskerSystem;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let system = TextTaskerSystem::bootstrap(ConfigManager::load()?).await?;
//!
//! let task_id = system.tasks().submit_full_processing("hello world").await?;
//! let payload = system.progress().get_progress(&task_id).await;
//! println!("{}", payload.to_json());
//!
//! system.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod messaging;
pub mod models;
pub mod orchestration;
pub mod services;
pub mod state_machine;
pub mod validation;

pub use config::{ConfigManager, TaskerConfig};
pub use error::{Result, TaskerError};
pub use messaging::{InMemoryTaskStateStore, JobKind, TaskId, TaskStateStore};
pub use models::{ProcessingStep, ProgressUpdate, QuickAnalysisResult, TextProcessingResult};
pub use orchestration::{TextProcessor, TextTaskerSystem};
pub use services::{ProgressQueryService, TaskCommandService};
pub use state_machine::{normalize, ProgressPayload, TaskState};
pub use validation::validate_text_input;
