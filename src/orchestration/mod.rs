//! # Orchestration
//!
//! The worker side of the system: the step pipeline, the per-step executor,
//! the worker that runs one job and records its lifecycle, and the pool that
//! claims jobs from the task state store.
//!
//! ## Core Components
//!
//! - **TextProcessor**: ordered, restartable plan of processing steps
//! - **StepExecutor**: injectable per-step work (delay in production)
//! - **TextTaskWorker**: runs one job, writing `PROGRESS` then `SUCCESS` or `FAILURE`
//! - **WorkerPool**: bounded-concurrency claim loop with graceful shutdown
//! - **TextTaskerSystem**: wires everything from configuration

pub mod bootstrap;
pub mod step_executor;
pub mod text_processor;
pub mod worker;
pub mod worker_pool;

pub use bootstrap::{SystemStatus, TextTaskerSystem};
pub use step_executor::{DelayStepExecutor, ImmediateStepExecutor, StepExecutor};
pub use text_processor::{iterate_processing_chunks, TextProcessor};
pub use worker::{TaskContext, TextTaskWorker};
pub use worker_pool::{WorkerPool, WorkerPoolConfig};
