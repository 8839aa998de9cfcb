//! Structured generation logging.
//!
//! Every line for one generation carries the same `generation_id` and
//! `branch` fields so a run can be followed across retries.

use reelgen_models::{GenerationId, JobHandle};
use tracing::{error, info, warn, Span};

/// Logger bound to one generation.
#[derive(Debug, Clone)]
pub struct GenerationLogger {
    generation_id: String,
    branch: String,
}

impl GenerationLogger {
    /// Create a logger for a generation and request branch
    /// (`single_image` or `multi_reference`).
    pub fn new(generation_id: &GenerationId, branch: &str) -> Self {
        Self {
            generation_id: generation_id.to_string(),
            branch: branch.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            generation_id = %self.generation_id,
            branch = %self.branch,
            "Generation started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            generation_id = %self.generation_id,
            branch = %self.branch,
            "Generation progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            generation_id = %self.generation_id,
            branch = %self.branch,
            "Generation warning: {}", message
        );
    }

    /// Log a raw failure together with the last observed job document.
    pub fn log_failure(&self, raw: &str, handle: Option<&JobHandle>) {
        let operation = handle
            .map(|h| h.as_value().to_string())
            .unwrap_or_else(|| "null".to_string());
        error!(
            generation_id = %self.generation_id,
            branch = %self.branch,
            operation = %operation,
            "Generation failed: {}", raw
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            generation_id = %self.generation_id,
            branch = %self.branch,
            "Generation completed: {}", message
        );
    }

    pub fn generation_id(&self) -> &str {
        &self.generation_id
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Span covering the whole generation, retries included.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "generation",
            generation_id = %self.generation_id,
            branch = %self.branch
        )
    }
}
