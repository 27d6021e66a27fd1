//! # Text Processor
//!
//! The step pipeline: an ordered, non-empty list of step descriptions that
//! yields [`ProcessingStep`]s on demand. Generating the plan has no side
//! effects and can be restarted any number of times.

use crate::constants::{CHUNK_PREVIEW_CHARS, DEFAULT_PROCESSING_STEPS};
use crate::error::{Result, TaskerError};
use crate::models::ProcessingStep;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextProcessor {
    steps: Vec<String>,
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self {
            steps: DEFAULT_PROCESSING_STEPS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl TextProcessor {
    /// Build a processor over custom step descriptions
    ///
    /// Fails when `steps` is empty or holds a blank description.
    pub fn new<I, S>(steps: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let steps: Vec<String> = steps.into_iter().map(Into::into).collect();

        if steps.is_empty() {
            return Err(TaskerError::ConfigurationError(
                "Processing plan requires at least one step".to_string(),
            ));
        }
        if let Some(pos) = steps.iter().position(|s| s.trim().is_empty()) {
            return Err(TaskerError::ConfigurationError(format!(
                "Processing step {} has an empty description",
                pos + 1
            )));
        }
        if u32::try_from(steps.len()).is_err() {
            return Err(TaskerError::ConfigurationError(format!(
                "Processing plan has too many steps: {}",
                steps.len()
            )));
        }

        Ok(Self { steps })
    }

    pub fn total_steps(&self) -> u32 {
        // Bounded by the check in `new`
        self.steps.len() as u32
    }

    /// Iterate over the configured steps, 1-indexed, in order
    pub fn processing_plan(&self) -> impl ExactSizeIterator<Item = ProcessingStep> + '_ {
        let total_steps = self.total_steps();
        self.steps
            .iter()
            .enumerate()
            .map(move |(pos, description)| {
                ProcessingStep::new(pos as u32 + 1, description.clone(), total_steps)
            })
    }

    /// Produce the textual marker for one processed step
    ///
    /// `Step <index>: <description> - '<first 20 chars>...'` with newlines in
    /// the preview collapsed to spaces.
    pub fn process_text_chunk(text: &str, step: &ProcessingStep) -> String {
        let preview: String = text
            .chars()
            .take(CHUNK_PREVIEW_CHARS)
            .map(|c| if c == '\n' { ' ' } else { c })
            .collect();
        format!("Step {}: {} - '{}...'", step.index, step.description, preview)
    }
}

/// Yield each step of `processor`'s plan together with its output for `text`
pub fn iterate_processing_chunks<'a>(
    text: &'a str,
    processor: &'a TextProcessor,
) -> impl Iterator<Item = (ProcessingStep, String)> + 'a {
    processor.processing_plan().map(move |step| {
        let chunk = TextProcessor::process_text_chunk(text, &step);
        (step, chunk)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plan() {
        let processor = TextProcessor::default();
        let steps: Vec<ProcessingStep> = processor.processing_plan().collect();

        assert_eq!(steps.len(), 5);
        for (pos, step) in steps.iter().enumerate() {
            assert_eq!(step.index, pos as u32 + 1);
            assert_eq!(step.total_steps, 5);
        }
        assert_eq!(steps[0].description, "Tokenizing text");
        assert_eq!(steps[4].description, "Finalizing results");
        assert_eq!(
            steps.iter().map(ProcessingStep::progress).collect::<Vec<_>>(),
            vec![20, 40, 60, 80, 100]
        );
    }

    #[test]
    fn test_plan_is_restartable() {
        let processor = TextProcessor::default();
        let first: Vec<_> = processor.processing_plan().collect();
        let second: Vec<_> = processor.processing_plan().collect();
        assert_eq!(first, second);
        assert_eq!(processor.processing_plan().len(), 5);
    }

    #[test]
    fn test_custom_plan_truncates_progress() {
        let processor = TextProcessor::new(["one", "two", "three"]).unwrap();
        let progress: Vec<u32> = processor.processing_plan().map(|s| s.progress()).collect();
        assert_eq!(progress, vec![33, 66, 100]);
    }

    #[test]
    fn test_rejects_invalid_plans() {
        assert!(TextProcessor::new(Vec::<String>::new()).is_err());
        assert!(TextProcessor::new(["ok", "  "]).is_err());
    }

    #[test]
    fn test_process_text_chunk_format() {
        let step = ProcessingStep::new(1, "Tokenizing text", 5);
        assert_eq!(
            TextProcessor::process_text_chunk("hello world", &step),
            "Step 1: Tokenizing text - 'hello world...'"
        );
    }

    #[test]
    fn test_process_text_chunk_preview_is_twenty_chars_without_newlines() {
        let step = ProcessingStep::new(2, "Analyzing semantics", 5);
        let text = "line one\nline two\nline three";
        assert_eq!(
            TextProcessor::process_text_chunk(text, &step),
            "Step 2: Analyzing semantics - 'line one line two li...'"
        );

        let unicode = "ééééééééééééééééééééééé";
        let chunk = TextProcessor::process_text_chunk(unicode, &step);
        assert!(chunk.contains(&"é".repeat(20)));
        assert!(!chunk.contains(&"é".repeat(21)));
    }

    #[test]
    fn test_iterate_processing_chunks() {
        let processor = TextProcessor::default();
        let chunks: Vec<_> = iterate_processing_chunks("abc", &processor).collect();
        assert_eq!(chunks.len(), 5);
        assert_eq!(chunks[2].0.index, 3);
        assert_eq!(chunks[2].1, "Step 3: Running classification - 'abc...'");
    }
}
