//! End-to-end video generation.
//!
//! Validation, then prompt composition, then request building, polling
//! and resolution under the retry budget. Failures are translated once,
//! after retries are exhausted.

use std::sync::Arc;
use std::time::Instant;

use reelgen_models::{ErrorKind, GenerationId, GenerationRequest, ProgressEvent, TranslatedError};
use tracing::Instrument;

use crate::config::PipelineConfig;
use crate::credentials::{CredentialProvider, EnvCredentials};
use crate::error::{PipelineError, PipelineResult};
use crate::logging::GenerationLogger;
use crate::metrics;
use crate::poller::{Cancellation, JobPoller};
use crate::progress::ProgressSink;
use crate::prompt;
use crate::provider::{VeoClient, VideoProvider};
use crate::resolver::{self, VideoArtifact};
use crate::retry::{retry_on_timeout, RetryConfig, RetryResult};
use crate::translate::translate;
use crate::validation::{self, GenerationSubmission, ValidationError};

const READY_PERCENT: u8 = 100;
const READY_STAGE: &str = "Video ready!";

/// Shared, stateless video generation pipeline.
#[derive(Clone)]
pub struct VideoPipeline {
    config: PipelineConfig,
    provider: Arc<dyn VideoProvider>,
    credentials: Arc<dyn CredentialProvider>,
}

impl VideoPipeline {
    pub fn new(
        config: PipelineConfig,
        provider: Arc<dyn VideoProvider>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            config,
            provider,
            credentials,
        }
    }

    /// Pipeline against the live provider, configured from the environment.
    pub fn from_env() -> PipelineResult<Self> {
        let config = PipelineConfig::from_env();
        let credentials: Arc<dyn CredentialProvider> = Arc::new(EnvCredentials::new());
        let provider = Arc::new(VeoClient::new(&config, Arc::clone(&credentials))?);
        Ok(Self::new(config, provider, credentials))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialProvider> {
        &self.credentials
    }

    /// Run the validation gate. No network call is made.
    pub fn validate(
        &self,
        submission: GenerationSubmission,
    ) -> Result<GenerationRequest, ValidationError> {
        validation::validate(submission, &self.config.limits).inspect_err(|_| {
            metrics::record_validation_rejection();
        })
    }

    /// Validate and run in one step.
    pub async fn generate(
        &self,
        submission: GenerationSubmission,
        progress: &dyn ProgressSink,
        cancel: Cancellation,
    ) -> Result<VideoArtifact, TranslatedError> {
        let request = self.validate(submission).map_err(TranslatedError::from)?;
        self.run(&request, progress, cancel).await
    }

    /// Generate a video for an already validated request.
    pub async fn run(
        &self,
        request: &GenerationRequest,
        progress: &dyn ProgressSink,
        cancel: Cancellation,
    ) -> Result<VideoArtifact, TranslatedError> {
        let id = GenerationId::new();
        let branch = if request.image_count() > 1 {
            "multi_reference"
        } else {
            "single_image"
        };
        let logger = GenerationLogger::new(&id, branch);
        let span = logger.create_span();

        async {
            logger.log_start(&format!(
                "{} image(s), aspect ratio {}",
                request.image_count(),
                request.aspect_ratio()
            ));
            metrics::record_generation_started(branch);
            let started = Instant::now();

            let composed = prompt::compose(
                request.prompt(),
                request.image_count(),
                request.aspect_ratio(),
                request.identity_strict(),
            );

            let retry = RetryConfig::from(&self.config);
            let result = retry_on_timeout(&retry, progress, |attempt| {
                let mut cancel = cancel.clone();
                let composed = composed.as_str();
                let id = &id;
                let logger = &logger;
                async move {
                    if attempt > 0 {
                        logger.log_progress(&format!("retry attempt {}", attempt));
                    }
                    self.attempt(request, composed, id, progress, &mut cancel).await
                }
            })
            .await;

            match result {
                RetryResult::Success(artifact) => {
                    progress.emit(ProgressEvent::new(READY_PERCENT, READY_STAGE));
                    metrics::record_generation_succeeded(branch, started.elapsed().as_secs_f64());
                    logger.log_completion(&format!("{} bytes", artifact.bytes.len()));
                    Ok(artifact)
                }
                RetryResult::Failed { error, attempts } => {
                    logger.log_failure(
                        &format!("{} (after {} attempt(s))", error, attempts),
                        error.job().map(|job| job.handle()),
                    );
                    let translated = translate(&error, None);
                    if translated.kind == ErrorKind::CredentialInvalid {
                        logger.log_warning("provider rejected the API key, deselecting it");
                        self.credentials.invalidate();
                    }
                    metrics::record_generation_failed(translated.kind);
                    Err(translated)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// One pass from request building through resolution.
    async fn attempt(
        &self,
        request: &GenerationRequest,
        composed_prompt: &str,
        id: &GenerationId,
        progress: &dyn ProgressSink,
        cancel: &mut Cancellation,
    ) -> PipelineResult<VideoArtifact> {
        let provider_request = crate::request::build(
            request.images(),
            composed_prompt,
            request.aspect_ratio(),
            &self.config,
        );

        let job = JobPoller::new(self.provider.as_ref(), &self.config)
            .run(&provider_request, progress, cancel)
            .await?;

        resolver::resolve(self.provider.as_ref(), id, job, progress).await
    }
}

impl From<ValidationError> for TranslatedError {
    fn from(e: ValidationError) -> Self {
        translate(&PipelineError::Validation(e), None)
    }
}
