// Task lifecycle states and the read-side normalization of raw store state
//
// Workers write lifecycle state into the task state store; pollers read it back
// through `normalize`, which never fails and always yields a well-formed payload.

pub mod progress;
pub mod states;

// Re-export main types for convenient access
pub use progress::{normalize, ProgressPayload};
pub use states::TaskState;
