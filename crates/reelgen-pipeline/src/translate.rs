//! Maps raw pipeline failures onto the closed [`ErrorKind`] taxonomy.
//!
//! This is the only place raw provider, network and job errors are
//! interpreted. Matching is substring based against the provider's
//! message text; the patterns below are a best-effort contract with the
//! provider, not a documented one.

use reelgen_models::{ErrorKind, GenerationJob, TranslatedError};
use tracing::error;

use crate::error::PipelineError;

pub const SAFETY_MESSAGE: &str =
    "Video generation failed: The prompt or image violates safety policies. Please revise and try again.";
pub const UNSUPPORTED_CONFIGURATION_MESSAGE: &str = "Video generation failed: The selected settings (e.g., aspect ratio for multi-character) are unsupported by the model.";
pub const RATE_LIMITED_MESSAGE: &str = "Server is busy: You've exceeded your request limit. Please wait a moment or check your Google AI plan details.";
pub const CREDENTIAL_MESSAGE: &str = "Permission Denied. Please ensure your API key is from a Google Cloud project with Billing enabled and the 'Vertex AI API' activated, then select your key again.";
pub const TIMED_OUT_MESSAGE: &str =
    "Server busy: The video generation request timed out. Please try again in a few moments.";
pub const NO_ARTIFACT_MESSAGE: &str = "Video generation failed: The AI model did not return a video link. This can happen with prompts that violate safety policies or use unsupported configurations. Please try a different prompt.";
pub const DOWNLOAD_FAILED_MESSAGE: &str =
    "The video was generated but could not be downloaded. Please try again.";
pub const CANCELLED_MESSAGE: &str = "Video generation was cancelled.";
pub const UNEXPECTED_MESSAGE: &str =
    "An unexpected error occurred. Please check the console for details and try again.";

/// Classify a raw failure without side effects.
pub fn classify(raw: &PipelineError, job: Option<&GenerationJob>) -> ErrorKind {
    interpret(raw, job).kind
}

/// Translate a raw failure into its user-facing form.
///
/// The raw error and the last job document are logged before anything
/// is discarded.
pub fn translate(raw: &PipelineError, job: Option<&GenerationJob>) -> TranslatedError {
    let job = job.or_else(|| raw.job());
    let operation = job
        .map(|j| j.handle().as_value().to_string())
        .unwrap_or_else(|| "null".to_string());
    error!(
        error = %raw,
        error_debug = ?raw,
        operation = %operation,
        "Video pipeline raw error"
    );
    interpret(raw, job)
}

fn interpret(raw: &PipelineError, job: Option<&GenerationJob>) -> TranslatedError {
    let job = job.or_else(|| raw.job());

    if let Some(message) = job.and_then(GenerationJob::error_message) {
        let lowered = message.to_lowercase();
        if lowered.contains("moderation") {
            return TranslatedError::new(ErrorKind::SafetyPolicyRejected, SAFETY_MESSAGE);
        }
        if lowered.contains("aspect_ratio") || lowered.contains("invalid argument") {
            return TranslatedError::new(
                ErrorKind::UnsupportedConfiguration,
                UNSUPPORTED_CONFIGURATION_MESSAGE,
            );
        }
        return TranslatedError::new(
            ErrorKind::Unexpected,
            format!("Video generation failed: {}", message),
        );
    }

    match raw {
        PipelineError::Validation(e) => return TranslatedError::invalid_input(e.to_string()),
        PipelineError::TimedOut(_) => {
            return TranslatedError::new(ErrorKind::TimedOut, TIMED_OUT_MESSAGE)
        }
        PipelineError::NoArtifact(_) => {
            return TranslatedError::new(ErrorKind::NoArtifactReturned, NO_ARTIFACT_MESSAGE)
        }
        PipelineError::DownloadFailed(_) => {
            return TranslatedError::new(ErrorKind::DownloadFailed, DOWNLOAD_FAILED_MESSAGE)
        }
        PipelineError::MissingCredential => {
            return TranslatedError::new(ErrorKind::CredentialInvalid, CREDENTIAL_MESSAGE)
        }
        PipelineError::Cancelled => {
            return TranslatedError::new(ErrorKind::Unexpected, CANCELLED_MESSAGE)
        }
        _ => {}
    }

    let lowered = raw.to_string().to_lowercase();
    if lowered.contains("429") || lowered.contains("quota") || lowered.contains("resource_exhausted")
    {
        return TranslatedError::new(ErrorKind::RateLimited, RATE_LIMITED_MESSAGE);
    }
    if lowered.contains("api key not valid") || lowered.contains("permission denied") {
        return TranslatedError::new(ErrorKind::CredentialInvalid, CREDENTIAL_MESSAGE);
    }
    if lowered.contains("timed out") {
        return TranslatedError::new(ErrorKind::TimedOut, TIMED_OUT_MESSAGE);
    }

    match raw.provider_status() {
        Some(429) => TranslatedError::new(ErrorKind::RateLimited, RATE_LIMITED_MESSAGE),
        Some(401) | Some(403) => TranslatedError::new(ErrorKind::CredentialInvalid, CREDENTIAL_MESSAGE),
        _ => TranslatedError::new(ErrorKind::Unexpected, UNEXPECTED_MESSAGE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;
    use reelgen_models::JobHandle;
    use serde_json::json;
    use std::time::Duration;

    fn failed_job(message: &str) -> GenerationJob {
        GenerationJob::from_handle(JobHandle::new(json!({
            "name": "op",
            "done": true,
            "error": {"code": 3, "message": message}
        })))
    }

    fn job_failure(message: &str) -> PipelineError {
        PipelineError::JobFailed(Box::new(failed_job(message)))
    }

    #[test]
    fn test_moderation_is_safety_rejection() {
        let err = translate(&job_failure("Rejected by Moderation filter"), None);
        assert_eq!(err.kind, ErrorKind::SafetyPolicyRejected);
        assert_eq!(err.message, SAFETY_MESSAGE);
    }

    #[test]
    fn test_aspect_ratio_is_unsupported_configuration() {
        assert_eq!(
            classify(&job_failure("bad aspect_ratio for references"), None),
            ErrorKind::UnsupportedConfiguration
        );
        assert_eq!(
            classify(&job_failure("Invalid argument provided"), None),
            ErrorKind::UnsupportedConfiguration
        );
    }

    #[test]
    fn test_other_job_errors_keep_provider_message() {
        let err = translate(&job_failure("Internal backend hiccup"), None);
        assert_eq!(err.kind, ErrorKind::Unexpected);
        assert_eq!(err.message, "Video generation failed: Internal backend hiccup");
    }

    #[test]
    fn test_job_error_takes_precedence_over_raw_error() {
        let job = failed_job("moderation");
        let raw = PipelineError::provider(Some(429), "quota exceeded");
        assert_eq!(classify(&raw, Some(&job)), ErrorKind::SafetyPolicyRejected);
    }

    #[test]
    fn test_rate_limit_patterns() {
        for message in ["HTTP 429", "Quota exceeded for project", "RESOURCE_EXHAUSTED"] {
            let raw = PipelineError::provider(None, message);
            assert_eq!(classify(&raw, None), ErrorKind::RateLimited, "{}", message);
        }
        let err = translate(&PipelineError::provider(Some(429), "slow down"), None);
        assert_eq!(err.message, RATE_LIMITED_MESSAGE);
    }

    #[test]
    fn test_credential_patterns() {
        let raw = PipelineError::provider(Some(400), "API key not valid. Please pass a valid API key.");
        assert_eq!(classify(&raw, None), ErrorKind::CredentialInvalid);

        let raw = PipelineError::provider(None, "PERMISSION DENIED on resource");
        assert_eq!(classify(&raw, None), ErrorKind::CredentialInvalid);

        let raw = PipelineError::provider(Some(403), "forbidden");
        assert_eq!(classify(&raw, None), ErrorKind::CredentialInvalid);

        assert_eq!(
            classify(&PipelineError::MissingCredential, None),
            ErrorKind::CredentialInvalid
        );
    }

    #[test]
    fn test_timeouts() {
        let err = translate(&PipelineError::TimedOut(Duration::from_secs(300)), None);
        assert_eq!(err.kind, ErrorKind::TimedOut);
        assert_eq!(err.message, TIMED_OUT_MESSAGE);

        let raw = PipelineError::provider(Some(504), "upstream request timed out");
        assert_eq!(classify(&raw, None), ErrorKind::TimedOut);
    }

    #[test]
    fn test_structural_variants() {
        let empty = GenerationJob::from_handle(JobHandle::new(json!({"done": true})));
        assert_eq!(
            classify(&PipelineError::NoArtifact(Box::new(empty)), None),
            ErrorKind::NoArtifactReturned
        );
        assert_eq!(
            classify(&PipelineError::download_failed("404 Not Found"), None),
            ErrorKind::DownloadFailed
        );

        let cancelled = translate(&PipelineError::Cancelled, None);
        assert_eq!(cancelled.kind, ErrorKind::Unexpected);
        assert_eq!(cancelled.message, CANCELLED_MESSAGE);
    }

    #[test]
    fn test_validation_is_invalid_input() {
        let err = translate(&PipelineError::Validation(ValidationError::NoImages), None);
        assert_eq!(err.kind, ErrorKind::InvalidInput);
        assert_eq!(err.message, "No character image uploaded");
    }

    #[test]
    fn test_fallback_is_unexpected() {
        let err = translate(&PipelineError::malformed("not json"), None);
        assert_eq!(err.kind, ErrorKind::Unexpected);
        assert_eq!(err.message, UNEXPECTED_MESSAGE);
    }
}
