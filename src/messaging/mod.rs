//! # Messaging Module
//!
//! The task state store: a broker that hands jobs to workers plus a result
//! backend that holds each task's lifecycle state. Producers, workers and
//! pollers communicate only through the [`TaskStateStore`] trait.

pub mod errors;
pub mod in_memory;
pub mod message;
pub mod traits;
pub mod types;

pub use errors::{MessagingError, MessagingResult};
pub use in_memory::InMemoryTaskStateStore;
pub use message::{JobMessage, JobMetadata};
pub use traits::TaskStateStore;
pub use types::{ClaimedJob, JobKind, QueueStats, ReceiptHandle, TaskId, TaskRecord};
