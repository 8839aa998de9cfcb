//! Progress events emitted while a generation runs.

use serde::{Deserialize, Serialize};

/// Rotating stage labels, advanced one entry per poll cycle.
pub const STAGE_MESSAGES: [&str; 9] = [
    "Sending to generation queue...",
    "Warming up AI models...",
    "AI is processing your request...",
    "Generating initial video frames...",
    "Applying character identity lock...",
    "Rendering high-quality frames...",
    "Stitching video and adding effects...",
    "Applying final touches...",
    "Almost there, finalizing your video...",
];

/// A (percentage, stage label) observation for UI feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Progress percentage (0-100)
    pub percent: u8,
    /// Human-readable stage label
    pub stage: String,
}

impl ProgressEvent {
    pub fn new(percent: u8, stage: impl Into<String>) -> Self {
        Self {
            percent: percent.min(100),
            stage: stage.into(),
        }
    }

    /// Stage label for the given poll cycle, wrapping around.
    pub fn stage_for_cycle(cycle: usize) -> &'static str {
        STAGE_MESSAGES[cycle % STAGE_MESSAGES.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_is_clamped() {
        assert_eq!(ProgressEvent::new(250, "x").percent, 100);
        assert_eq!(ProgressEvent::new(42, "x").percent, 42);
    }

    #[test]
    fn test_stage_rotation_wraps() {
        assert_eq!(ProgressEvent::stage_for_cycle(1), STAGE_MESSAGES[1]);
        assert_eq!(
            ProgressEvent::stage_for_cycle(STAGE_MESSAGES.len() + 2),
            STAGE_MESSAGES[2]
        );
    }
}
