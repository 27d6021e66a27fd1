pub mod processing_step;
pub mod task_models;

// Re-export models for easy access
pub use processing_step::{compute_progress, ProcessingStep};
pub use task_models::{
    char_count, word_count, ProgressUpdate, QuickAnalysisResult, TextProcessingResult,
};
