//! Application state.

use std::sync::Arc;

use reelgen_pipeline::{PipelineResult, VideoPipeline};
use tokio::sync::watch;

use crate::config::ApiConfig;
use crate::middleware::RateLimiterCache;
use crate::services::ArtifactStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pipeline: Arc<VideoPipeline>,
    pub artifacts: ArtifactStore,
    pub rate_limiter: Arc<RateLimiterCache>,
    /// Flips to `true` when the server is shutting down.
    pub shutdown: watch::Receiver<bool>,
}

impl AppState {
    /// Create state backed by the live provider.
    pub fn new(config: ApiConfig, shutdown: watch::Receiver<bool>) -> PipelineResult<Self> {
        let pipeline = VideoPipeline::from_env()?;
        Ok(Self::with_pipeline(config, pipeline, shutdown))
    }

    /// Create state around an existing pipeline.
    pub fn with_pipeline(
        config: ApiConfig,
        pipeline: VideoPipeline,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let artifacts = ArtifactStore::new(config.artifact_ttl, config.artifact_max_bytes);
        let rate_limiter = Arc::new(RateLimiterCache::new(
            config.rate_limit_requests,
            config.rate_limit_window,
        ));

        Self {
            config,
            pipeline: Arc::new(pipeline),
            artifacts,
            rate_limiter,
            shutdown,
        }
    }
}
