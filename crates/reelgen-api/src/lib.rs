//! Axum HTTP API server.
//!
//! This crate provides:
//! - Multipart video generation endpoint backed by the reelgen pipeline
//! - Short-lived server-side storage for finished videos
//! - Per-client rate limiting and security headers
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{ArtifactStore, StoredArtifact};
pub use state::AppState;
