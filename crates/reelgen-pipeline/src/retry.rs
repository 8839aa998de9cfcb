//! Bounded re-invocation on timeouts.
//!
//! Only failures that classify as [`ErrorKind::TimedOut`] are retried.
//! Every other failure is terminal on first occurrence.
//!
//! [`ErrorKind::TimedOut`]: reelgen_models::ErrorKind::TimedOut

use std::future::Future;

use reelgen_models::ProgressEvent;
use tracing::warn;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::metrics;
use crate::progress::ProgressSink;
use crate::translate::classify;

const RETRY_PERCENT: u8 = 10;
pub const RETRY_STAGE: &str = "Server was busy. Retrying your request...";

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not including the initial attempt).
    pub max_retries: u32,
    /// Operation name for logging.
    pub operation_name: String,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 1,
            operation_name: "video_generation".to_string(),
        }
    }
}

impl RetryConfig {
    pub fn new(operation_name: impl Into<String>) -> Self {
        Self {
            operation_name: operation_name.into(),
            ..Default::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Whether a failure on `attempt` (0-based) earns another attempt.
    pub fn should_retry(&self, error: &PipelineError, attempt: u32) -> bool {
        attempt < self.max_retries && classify(error, None).is_retryable()
    }
}

impl From<&PipelineConfig> for RetryConfig {
    fn from(config: &PipelineConfig) -> Self {
        Self::default().with_max_retries(config.max_retries)
    }
}

/// Result of a retried operation.
#[derive(Debug)]
pub enum RetryResult<T, E> {
    Success(T),
    Failed { error: E, attempts: u32 },
}

impl<T, E> RetryResult<T, E> {
    pub fn is_success(&self) -> bool {
        matches!(self, RetryResult::Success(_))
    }

    pub fn into_result(self) -> Result<T, E> {
        match self {
            RetryResult::Success(v) => Ok(v),
            RetryResult::Failed { error, .. } => Err(error),
        }
    }
}

/// Run `operation` and re-run it while it times out, up to the budget.
///
/// `operation` receives the 0-based attempt number.
pub async fn retry_on_timeout<F, Fut, T>(
    config: &RetryConfig,
    progress: &dyn ProgressSink,
    mut operation: F,
) -> RetryResult<T, PipelineError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = PipelineResult<T>>,
{
    let mut attempt = 0u32;

    loop {
        match operation(attempt).await {
            Ok(value) => return RetryResult::Success(value),
            Err(e) if config.should_retry(&e, attempt) => {
                attempt += 1;
                warn!(
                    "{} attempt {} timed out, retrying: {}",
                    config.operation_name, attempt, e
                );
                metrics::record_retry();
                progress.emit(ProgressEvent::new(RETRY_PERCENT, RETRY_STAGE));
            }
            Err(e) => {
                return RetryResult::Failed {
                    error: e,
                    attempts: attempt + 1,
                }
            }
        }
    }
}
