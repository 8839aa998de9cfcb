//! Pipeline error types.
//!
//! Raw provider, network and job failures are narrowed into
//! [`PipelineError`] at the provider boundary. Nothing past the error
//! translator sees these; users only ever get a `TranslatedError`.

use std::time::Duration;

use reelgen_models::GenerationJob;
use thiserror::Error;

use crate::validation::ValidationError;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Provider request failed: {message}")]
    Provider { status: Option<u16>, message: String },

    #[error("Operation failed: {}", .0.error_message().unwrap_or("unknown error"))]
    JobFailed(Box<GenerationJob>),

    #[error("Video generation timed out after {}s", .0.as_secs())]
    TimedOut(Duration),

    #[error("Video generation failed: the model did not return a video link")]
    NoArtifact(Box<GenerationJob>),

    #[error("Failed to download video: {0}")]
    DownloadFailed(String),

    #[error("API key is missing")]
    MissingCredential,

    #[error("Video generation cancelled")]
    Cancelled,

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl PipelineError {
    pub fn provider(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Provider {
            status,
            message: message.into(),
        }
    }

    pub fn download_failed(msg: impl Into<String>) -> Self {
        Self::DownloadFailed(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// The last job observed when this error was raised, if any.
    pub fn job(&self) -> Option<&GenerationJob> {
        match self {
            PipelineError::JobFailed(job) | PipelineError::NoArtifact(job) => Some(job),
            _ => None,
        }
    }

    /// HTTP status reported by the provider, if the failure came from one.
    pub fn provider_status(&self) -> Option<u16> {
        match self {
            PipelineError::Provider { status, .. } => *status,
            PipelineError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelgen_models::JobHandle;
    use serde_json::json;

    #[test]
    fn test_timeout_message_mentions_timed_out() {
        let err = PipelineError::TimedOut(Duration::from_secs(300));
        assert_eq!(err.to_string(), "Video generation timed out after 300s");
    }

    #[test]
    fn test_job_failed_exposes_job() {
        let job = GenerationJob::from_handle(JobHandle::new(json!({
            "done": true,
            "error": {"message": "Invalid argument: aspect_ratio"}
        })));
        let err = PipelineError::JobFailed(Box::new(job));

        assert_eq!(err.to_string(), "Operation failed: Invalid argument: aspect_ratio");
        assert!(err.job().is_some());
        assert!(PipelineError::Cancelled.job().is_none());
    }

    #[test]
    fn test_provider_status() {
        let err = PipelineError::provider(Some(429), "RESOURCE_EXHAUSTED");
        assert_eq!(err.provider_status(), Some(429));
        assert_eq!(PipelineError::MissingCredential.provider_status(), None);
    }
}
