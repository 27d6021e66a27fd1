//! # Services
//!
//! Client-facing entry points: submitting work and polling for its progress.
//! Both talk to workers only through the task state store.

pub mod progress_service;
pub mod task_service;

pub use progress_service::ProgressQueryService;
pub use task_service::TaskCommandService;
