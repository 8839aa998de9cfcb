//! Pipeline metrics.
//!
//! Recorded through the `metrics` facade; the API server installs the
//! Prometheus recorder. Without a recorder these calls are no-ops.

use metrics::{counter, histogram};
use reelgen_models::{ErrorKind, JobState};

/// Metric names.
pub mod names {
    pub const GENERATIONS_STARTED_TOTAL: &str = "reelgen_generations_started_total";
    pub const GENERATIONS_SUCCEEDED_TOTAL: &str = "reelgen_generations_succeeded_total";
    pub const GENERATIONS_FAILED_TOTAL: &str = "reelgen_generations_failed_total";
    pub const GENERATION_DURATION_SECONDS: &str = "reelgen_generation_duration_seconds";
    pub const GENERATION_RETRIES_TOTAL: &str = "reelgen_generation_retries_total";
    pub const PROVIDER_POLLS_TOTAL: &str = "reelgen_provider_polls_total";
    pub const PROVIDER_JOBS_FINISHED_TOTAL: &str = "reelgen_provider_jobs_finished_total";
    pub const VALIDATION_REJECTIONS_TOTAL: &str = "reelgen_validation_rejections_total";
}

pub fn record_generation_started(branch: &str) {
    let labels = [("branch", branch.to_string())];
    counter!(names::GENERATIONS_STARTED_TOTAL, &labels).increment(1);
}

pub fn record_generation_succeeded(branch: &str, duration_secs: f64) {
    let labels = [("branch", branch.to_string())];
    counter!(names::GENERATIONS_SUCCEEDED_TOTAL, &labels).increment(1);
    histogram!(names::GENERATION_DURATION_SECONDS, &labels).record(duration_secs);
}

pub fn record_generation_failed(kind: ErrorKind) {
    let labels = [("kind", kind.as_str().to_string())];
    counter!(names::GENERATIONS_FAILED_TOTAL, &labels).increment(1);
}

pub fn record_retry() {
    counter!(names::GENERATION_RETRIES_TOTAL).increment(1);
}

/// Record one poll, labelled with the job state it returned.
pub fn record_poll(state: JobState) {
    let labels = [("state", state.as_str().to_string())];
    counter!(names::PROVIDER_POLLS_TOTAL, &labels).increment(1);
}

/// Record the terminal state a provider job ended in.
pub fn record_job_finished(state: JobState) {
    let labels = [("state", state.as_str().to_string())];
    counter!(names::PROVIDER_JOBS_FINISHED_TOTAL, &labels).increment(1);
}

pub fn record_validation_rejection() {
    counter!(names::VALIDATION_REJECTIONS_TOTAL).increment(1);
}
