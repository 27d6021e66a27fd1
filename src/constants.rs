//! # System Constants
//!
//! Lifecycle state names, client-facing status messages and the default
//! processing plan. State names are the wire values reported by the task
//! state store and echoed to polling clients.

/// Lifecycle state names as stored and reported
pub mod states {
    pub const PENDING: &str = "PENDING";
    pub const PROGRESS: &str = "PROGRESS";
    pub const SUCCESS: &str = "SUCCESS";
    pub const FAILURE: &str = "FAILURE";

    /// Synthetic: unknown task identifier, produced by the query side only
    pub const NOT_FOUND: &str = "NOT_FOUND";
    /// Synthetic: result retrieval fault discovered during a read
    pub const ERROR: &str = "ERROR";
}

/// Status strings placed in normalized progress payloads
pub mod status {
    pub const PENDING: &str = "Task is pending...";
    pub const PROCESSING: &str = "Processing...";
    pub const COMPLETED: &str = "Task completed!";
    pub const NOT_FOUND: &str = "Task not found";
    pub const UNKNOWN_FAILURE_REASON: &str = "Unknown reason";
    pub const FAILED_PREFIX: &str = "Task failed: ";
    pub const RESULT_LOAD_FAILED_PREFIX: &str = "Failed to load result: ";
    pub const WORKER_SHUTDOWN: &str = "Worker shutdown before completion";
}

/// Registered job names, one per task kind
pub mod jobs {
    pub const PROCESS_TEXT: &str = "process_text_task";
    pub const QUICK_ANALYSIS: &str = "quick_analysis_task";
}

/// Default processing plan used by the full text-processing job
pub const DEFAULT_PROCESSING_STEPS: [&str; 5] = [
    "Tokenizing text",
    "Analyzing semantics",
    "Running classification",
    "Generating response",
    "Finalizing results",
];

/// Characters of input shown in each step's output marker
pub const CHUNK_PREVIEW_CHARS: usize = 20;

/// Progress reported once a task has completed
pub const COMPLETE_PROGRESS: u32 = 100;

/// Analysis type tag written by the quick-analysis job
pub const QUICK_ANALYSIS_TYPE: &str = "quick";
