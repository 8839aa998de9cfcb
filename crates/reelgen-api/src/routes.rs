//! API routes.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use reelgen_pipeline::PipelineConfig;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

use crate::config::ApiConfig;
use crate::handlers::{get_artifact, get_credentials, generate_video, health, ready, select_credentials};
use crate::metrics::metrics_middleware;
use crate::middleware::{cors_layer, rate_limit_middleware, request_id, request_logging, security_headers};
use crate::state::AppState;

/// Headroom on top of the pipeline's worst case before the HTTP layer gives up.
const TIMEOUT_HEADROOM: Duration = Duration::from_secs(30);

/// Whole-request timeout: the configured value, raised to cover the
/// pipeline's worst case so a generation is never cut off mid-flight.
pub fn effective_request_timeout(config: &ApiConfig, pipeline: &PipelineConfig) -> Duration {
    config
        .request_timeout
        .max(pipeline.max_total_duration().saturating_add(TIMEOUT_HEADROOM))
}

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    // Generation is the only billed route, so it alone is rate limited
    let generation_routes = Router::new()
        .route("/generate-video", post(generate_video))
        .layer(DefaultBodyLimit::max(state.config.max_body_size))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state.rate_limiter),
            rate_limit_middleware,
        ));

    let api_routes = Router::new()
        .merge(generation_routes)
        .route("/artifacts/:id", get(get_artifact))
        .route("/credentials", get(get_credentials))
        .route("/credentials/select", post(select_credentials));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    let request_timeout = effective_request_timeout(&state.config, state.pipeline.config());

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
