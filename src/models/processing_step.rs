//! # Processing Step
//!
//! A single, immutable unit of the text-processing plan. Steps are generated
//! on demand by [`TextProcessor`](crate::orchestration::TextProcessor) and are
//! never persisted; only the progress they produce is written to the store.

use serde::{Deserialize, Serialize};

/// Compute the integer percentage for a given step
///
/// Uses truncating division (`floor(100 * step / total)`), so step 1 of 3
/// reports 33 and step 2 of 3 reports 66. A zero `total` reports 0, and a
/// `step` past `total` is capped at 100.
pub fn compute_progress(step: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let step = step.min(total);
    // u64 keeps 100 * step from overflowing for large step counts
    u32::try_from(100 * u64::from(step) / u64::from(total)).unwrap_or(100)
}

/// One step of the processing plan, 1-indexed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessingStep {
    /// Position in the plan, `1..=total_steps`
    pub index: u32,
    /// Human-readable label, e.g. "Tokenizing text"
    pub description: String,
    /// Number of steps in the plan this step belongs to
    pub total_steps: u32,
}

impl ProcessingStep {
    pub fn new(index: u32, description: impl Into<String>, total_steps: u32) -> Self {
        debug_assert!(total_steps >= 1 && (1..=total_steps).contains(&index));
        Self {
            index,
            description: description.into(),
            total_steps,
        }
    }

    /// Percentage complete once this step has finished
    pub fn progress(&self) -> u32 {
        compute_progress(self.index, self.total_steps)
    }

    pub fn is_last(&self) -> bool {
        self.index == self.total_steps
    }

    /// Status line reported to pollers, e.g. "Running classification: 60%"
    pub fn status_line(&self) -> String {
        format!("{}: {}%", self.description, self.progress())
    }
}
