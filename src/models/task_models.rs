//! # Task Payload Models
//!
//! Data carried through the task state store: per-step progress metadata
//! and the final results written by each job kind.

use serde::{Deserialize, Serialize};

use crate::constants::{COMPLETE_PROGRESS, QUICK_ANALYSIS_TYPE};
use crate::models::ProcessingStep;

fn default_complete_progress() -> u32 {
    COMPLETE_PROGRESS
}

/// Final result of the full text-processing job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextProcessingResult {
    pub task_id: String,
    /// Per-step outputs joined with newlines
    pub processed_text: String,
    pub original_text: String,
    pub word_count: usize,
    pub char_count: usize,
    pub steps_completed: usize,
    #[serde(default = "default_complete_progress")]
    pub progress: u32,
    #[serde(default)]
    pub error: Option<String>,
}

impl TextProcessingResult {
    /// Build the result for `original_text` from the collected step outputs
    pub fn from_outputs(task_id: impl Into<String>, original_text: &str, outputs: &[String]) -> Self {
        Self {
            task_id: task_id.into(),
            processed_text: outputs.join("\n"),
            original_text: original_text.to_string(),
            word_count: word_count(original_text),
            char_count: char_count(original_text),
            steps_completed: outputs.len(),
            progress: COMPLETE_PROGRESS,
            error: None,
        }
    }
}

/// Progress metadata written once per completed step
///
/// Transient: each update replaces the previous one in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub current: u32,
    pub total: u32,
    /// Integer percentage, 0-100
    pub progress: u32,
    pub status: String,
}

impl From<&ProcessingStep> for ProgressUpdate {
    fn from(step: &ProcessingStep) -> Self {
        Self {
            current: step.index,
            total: step.total_steps,
            progress: step.progress(),
            status: step.status_line(),
        }
    }
}

/// Final result of the quick-analysis job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickAnalysisResult {
    pub word_count: usize,
    pub char_count: usize,
    pub contains_letters: bool,
    pub analysis_type: String,
}

impl QuickAnalysisResult {
    pub fn analyze(text: &str) -> Self {
        Self {
            word_count: word_count(text),
            char_count: char_count(text),
            contains_letters: text.chars().any(char::is_alphabetic),
            analysis_type: QUICK_ANALYSIS_TYPE.to_string(),
        }
    }
}

/// Number of whitespace-delimited tokens
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Length in characters (not bytes)
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}
