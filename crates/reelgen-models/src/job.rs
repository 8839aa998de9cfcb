//! Provider generation jobs.
//!
//! A [`GenerationJob`] wraps the provider's long-running operation
//! document. The document itself is carried as an opaque [`JobHandle`]
//! and handed back to the provider unmodified on every poll; the typed
//! fields are read-only views parsed out of it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationId(pub String);

impl GenerationId {
    /// Generate a new random generation ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for GenerationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GenerationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque serialized job descriptor returned by the provider.
///
/// The provider encodes continuation state inside it, so it must never be
/// rebuilt from partial fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobHandle(Value);

impl JobHandle {
    pub fn new(document: Value) -> Self {
        Self(document)
    }

    /// Provider-side operation name (`models/.../operations/...`).
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

/// Structured error reported by a finished job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// One in-flight or completed provider operation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationJob {
    handle: JobHandle,
    done: bool,
    error: Option<JobError>,
}

/// JSON pointers where providers place the first generated artifact URI.
const ARTIFACT_URI_POINTERS: [&str; 2] = [
    "/response/generateVideoResponse/generatedSamples/0/video/uri",
    "/response/generatedVideos/0/video/uri",
];

impl GenerationJob {
    /// Build a job view from a raw provider operation document.
    pub fn from_handle(handle: JobHandle) -> Self {
        let document = handle.as_value();
        let done = document.get("done").and_then(Value::as_bool).unwrap_or(false);
        let error = document
            .get("error")
            .filter(|e| !e.is_null())
            .map(|e| serde_json::from_value::<JobError>(e.clone()).unwrap_or_default());

        Self { handle, done, error }
    }

    pub fn handle(&self) -> &JobHandle {
        &self.handle
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn error(&self) -> Option<&JobError> {
        self.error.as_ref()
    }

    /// Provider message of the structured job error, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().and_then(|e| e.message.as_deref())
    }

    /// URI of the first generated artifact, if the response carries one.
    pub fn artifact_uri(&self) -> Option<&str> {
        ARTIFACT_URI_POINTERS
            .iter()
            .find_map(|pointer| self.handle.as_value().pointer(pointer))
            .and_then(Value::as_str)
            .filter(|uri| !uri.is_empty())
    }

    /// Poller state implied by the job alone (deadline handling is the caller's).
    pub fn state(&self) -> JobState {
        match (self.done, self.error.is_some()) {
            (false, _) => JobState::Polling,
            (true, false) => JobState::Succeeded,
            (true, true) => JobState::Failed,
        }
    }
}

/// Poller state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Submission returned a handle, no poll issued yet
    #[default]
    Submitted,
    /// Waiting for the provider to finish
    Polling,
    /// Provider finished without an error
    Succeeded,
    /// Provider finished with a structured error
    Failed,
    /// Deadline elapsed before the provider finished
    TimedOut,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Submitted => "submitted",
            JobState::Polling => "polling",
            JobState::Succeeded => "succeeded",
            JobState::Failed => "failed",
            JobState::TimedOut => "timed_out",
        }
    }

    /// Check if this is a terminal state (no more polls expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed | JobState::TimedOut)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pending_job() {
        let job = GenerationJob::from_handle(JobHandle::new(json!({
            "name": "models/veo/operations/abc123"
        })));

        assert!(!job.is_done());
        assert_eq!(job.state(), JobState::Polling);
        assert_eq!(job.handle().name(), Some("models/veo/operations/abc123"));
        assert!(job.artifact_uri().is_none());
    }

    #[test]
    fn test_finished_job_with_samples() {
        let job = GenerationJob::from_handle(JobHandle::new(json!({
            "name": "operations/1",
            "done": true,
            "response": {
                "generateVideoResponse": {
                    "generatedSamples": [
                        {"video": {"uri": "https://example.com/v1/files/a:download?alt=media"}},
                        {"video": {"uri": "https://example.com/second"}}
                    ]
                }
            }
        })));

        assert_eq!(job.state(), JobState::Succeeded);
        assert_eq!(
            job.artifact_uri(),
            Some("https://example.com/v1/files/a:download?alt=media")
        );
    }

    #[test]
    fn test_sdk_shaped_response() {
        let job = GenerationJob::from_handle(JobHandle::new(json!({
            "done": true,
            "response": {"generatedVideos": [{"video": {"uri": "https://example.com/v"}}]}
        })));

        assert_eq!(job.artifact_uri(), Some("https://example.com/v"));
    }

    #[test]
    fn test_finished_job_with_error() {
        let job = GenerationJob::from_handle(JobHandle::new(json!({
            "done": true,
            "error": {"code": 3, "message": "Blocked by moderation"}
        })));

        assert_eq!(job.state(), JobState::Failed);
        assert_eq!(job.error_message(), Some("Blocked by moderation"));
        assert_eq!(job.error().and_then(|e| e.code), Some(3));
    }

    #[test]
    fn test_empty_success_has_no_artifact() {
        let job = GenerationJob::from_handle(JobHandle::new(json!({
            "done": true,
            "response": {"generateVideoResponse": {"generatedSamples": []}}
        })));

        assert_eq!(job.state(), JobState::Succeeded);
        assert!(job.artifact_uri().is_none());
    }

    #[test]
    fn test_handle_round_trips_unmodified() {
        let document = json!({"name": "op", "metadata": {"opaque": [1, 2, 3]}});
        let job = GenerationJob::from_handle(JobHandle::new(document.clone()));
        assert_eq!(job.handle().as_value(), &document);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!JobState::Submitted.is_terminal());
        assert!(!JobState::Polling.is_terminal());
        assert!(JobState::Succeeded.is_terminal());
        assert!(JobState::Failed.is_terminal());
        assert!(JobState::TimedOut.is_terminal());
    }
}
