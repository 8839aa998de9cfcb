//! Pipeline configuration.

use std::time::Duration;

/// Default Generative Language API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Provider model identifiers per request branch.
///
/// Which tier serves which branch is a deployment/cost decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    /// Model for single-reference (image-to-video) requests
    pub single_image: String,
    /// Model for multi-reference (asset-referenced) requests
    pub multi_reference: String,
}

impl Default for ModelSelection {
    fn default() -> Self {
        Self {
            single_image: "veo-3.1-fast-generate-preview".to_string(),
            multi_reference: "veo-3.1-generate-preview".to_string(),
        }
    }
}

/// Limits enforced by the validation gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationLimits {
    /// Maximum prompt length in characters
    pub max_prompt_length: usize,
    /// Maximum size of a single reference image in bytes
    pub max_image_bytes: usize,
    /// Maximum number of reference images
    pub max_images: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_prompt_length: 1500,
            max_image_bytes: 5 * 1024 * 1024, // 5MB
            max_images: 3,
        }
    }
}

/// Video pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Provider API base URL
    pub api_base_url: String,
    /// Model per request branch
    pub models: ModelSelection,
    /// Resolution hint for multi-reference requests
    pub resolution: String,
    /// Interval between job status polls
    pub poll_interval: Duration,
    /// Hard deadline for one submission, measured from submit
    pub poll_timeout: Duration,
    /// Re-invocations allowed after a timeout
    pub max_retries: u32,
    /// Timeout for each individual provider HTTP call
    pub http_timeout: Duration,
    /// Validation gate limits
    pub limits: ValidationLimits,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            models: ModelSelection::default(),
            resolution: "1080p".to_string(),
            poll_interval: Duration::from_secs(5),
            poll_timeout: Duration::from_secs(300), // 5 minutes
            max_retries: 1,
            http_timeout: Duration::from_secs(120),
            limits: ValidationLimits::default(),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base_url: std::env::var("VEO_API_BASE_URL").unwrap_or(defaults.api_base_url),
            models: ModelSelection {
                single_image: std::env::var("VEO_MODEL_SINGLE")
                    .unwrap_or(defaults.models.single_image),
                multi_reference: std::env::var("VEO_MODEL_MULTI")
                    .unwrap_or(defaults.models.multi_reference),
            },
            resolution: std::env::var("VEO_RESOLUTION").unwrap_or(defaults.resolution),
            poll_interval: Duration::from_secs(
                std::env::var("VEO_POLL_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            poll_timeout: Duration::from_secs(
                std::env::var("VEO_POLL_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(300),
            ),
            max_retries: std::env::var("VEO_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1),
            http_timeout: Duration::from_secs(
                std::env::var("VEO_HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
            limits: ValidationLimits {
                max_prompt_length: std::env::var("MAX_PROMPT_LENGTH")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.limits.max_prompt_length),
                max_image_bytes: std::env::var("MAX_IMAGE_BYTES")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.limits.max_image_bytes),
                max_images: defaults.limits.max_images,
            },
        }
    }

    /// Worst-case wall clock for one attempt: the submit call, polling up
    /// to the deadline plus the last sleep, and the video download.
    pub fn max_attempt_duration(&self) -> Duration {
        self.http_timeout
            .saturating_add(self.poll_timeout)
            .saturating_add(self.poll_interval)
            .saturating_add(self.http_timeout)
    }

    /// Worst-case wall clock for one invocation including retries.
    pub fn max_total_duration(&self) -> Duration {
        self.max_attempt_duration()
            .saturating_mul(self.max_retries.saturating_add(1))
    }
}
