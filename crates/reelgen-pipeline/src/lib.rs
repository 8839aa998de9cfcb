//! Reference-image video generation pipeline.
//!
//! This crate provides:
//! - Pre-flight validation of uploads and prompts
//! - Structured prompt composition
//! - Provider request building, job submission and polling
//! - Artifact resolution and download
//! - Error translation into a closed taxonomy, with a bounded retry on timeouts

pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod poller;
pub mod progress;
pub mod prompt;
pub mod provider;
pub mod request;
pub mod resolver;
pub mod retry;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod translate;
pub mod validation;

pub use config::{ModelSelection, PipelineConfig, ValidationLimits};
pub use credentials::{CredentialProvider, EnvCredentials, StaticCredentials};
pub use error::{PipelineError, PipelineResult};
pub use logging::GenerationLogger;
pub use pipeline::VideoPipeline;
pub use poller::{Cancellation, JobPoller};
pub use progress::{NoopProgress, ProgressSink, TracingProgress};
pub use provider::{FetchedArtifact, VeoClient, VideoProvider};
pub use request::ProviderRequest;
pub use resolver::VideoArtifact;
pub use retry::{retry_on_timeout, RetryConfig, RetryResult};
pub use translate::{classify, translate};
pub use validation::{validate, GenerationSubmission, ValidationError};
