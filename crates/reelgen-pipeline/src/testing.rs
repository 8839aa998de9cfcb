//! Scripted [`VideoProvider`] for tests.
//!
//! Each `submit` consumes the next [`Attempt`] (the last one repeats) and
//! the resulting operation completes after the scripted number of polls.
//! Every call is recorded so tests can assert on counts, ordering and
//! timing.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use reelgen_models::{GenerationJob, JobHandle};
use serde_json::{json, Value};
use tokio::time::Instant;

use crate::error::{PipelineError, PipelineResult};
use crate::provider::{FetchedArtifact, VideoProvider};
use crate::request::ProviderRequest;

pub const SCRIPTED_VIDEO_BYTES: &[u8] = b"scripted-video-bytes";

#[derive(Debug, Clone)]
enum Outcome {
    Video(String),
    JobError(String),
    Empty,
}

/// Scripted behaviour of one submitted job.
#[derive(Debug, Clone)]
pub struct Attempt {
    polls: Option<usize>,
    outcome: Outcome,
    rejection: Option<(u16, String)>,
}

impl Attempt {
    /// Completes with a video URI after `polls` polls.
    pub fn video_after(polls: usize, uri: impl Into<String>) -> Self {
        Self {
            polls: Some(polls),
            outcome: Outcome::Video(uri.into()),
            rejection: None,
        }
    }

    /// Completes with a structured job error after `polls` polls.
    pub fn job_error_after(polls: usize, message: impl Into<String>) -> Self {
        Self {
            polls: Some(polls),
            outcome: Outcome::JobError(message.into()),
            rejection: None,
        }
    }

    /// Completes successfully but without any artifact.
    pub fn empty_after(polls: usize) -> Self {
        Self {
            polls: Some(polls),
            outcome: Outcome::Empty,
            rejection: None,
        }
    }

    /// Never reports done.
    pub fn never_completes() -> Self {
        Self {
            polls: None,
            outcome: Outcome::Empty,
            rejection: None,
        }
    }

    /// Submission itself is rejected with an HTTP status.
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self {
            polls: None,
            outcome: Outcome::Empty,
            rejection: Some((status, message.into())),
        }
    }
}

#[derive(Debug)]
struct Operation {
    attempt: Attempt,
    polls: usize,
    last_document: Value,
}

#[derive(Debug, Default)]
struct Recorded {
    submissions: Vec<ProviderRequest>,
    poll_times: Vec<Instant>,
    fetched: Vec<String>,
    operations: HashMap<String, Operation>,
}

/// In-memory provider driven by a list of attempts.
#[derive(Debug)]
pub struct ScriptedProvider {
    attempts: Vec<Attempt>,
    fail_downloads: bool,
    poll_delay: Option<Duration>,
    recorded: Mutex<Recorded>,
}

impl ScriptedProvider {
    pub fn new(attempts: Vec<Attempt>) -> Self {
        Self {
            attempts,
            fail_downloads: false,
            poll_delay: None,
            recorded: Mutex::new(Recorded::default()),
        }
    }

    /// A provider whose every job yields a video after two polls.
    pub fn succeeding() -> Self {
        Self::new(vec![Attempt::video_after(
            2,
            "https://files.example.com/v1beta/files/scripted:download?alt=media",
        )])
    }

    /// Make every artifact download fail.
    pub fn failing_downloads(mut self) -> Self {
        self.fail_downloads = true;
        self
    }

    /// Make every poll take `delay` before answering.
    pub fn with_poll_delay(mut self, delay: Duration) -> Self {
        self.poll_delay = Some(delay);
        self
    }

    fn recorded(&self) -> MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn submit_count(&self) -> usize {
        self.recorded().submissions.len()
    }

    pub fn submitted(&self) -> Vec<ProviderRequest> {
        self.recorded().submissions.clone()
    }

    pub fn poll_count(&self) -> usize {
        self.recorded().poll_times.len()
    }

    pub fn poll_times(&self) -> Vec<Instant> {
        self.recorded().poll_times.clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.recorded().fetched.len()
    }

    /// Total calls of any kind.
    pub fn call_count(&self) -> usize {
        self.submit_count() + self.poll_count() + self.fetch_count()
    }

    fn document(name: &str, op: &Operation) -> Value {
        let finished = op.attempt.polls.is_some_and(|needed| op.polls >= needed);
        if !finished {
            return json!({
                "name": name,
                "metadata": {"polls": op.polls},
            });
        }
        match &op.attempt.outcome {
            Outcome::Video(uri) => json!({
                "name": name,
                "done": true,
                "response": {"generateVideoResponse": {"generatedSamples": [
                    {"video": {"uri": uri}}
                ]}},
            }),
            Outcome::JobError(message) => json!({
                "name": name,
                "done": true,
                "error": {"code": 3, "message": message},
            }),
            Outcome::Empty => json!({
                "name": name,
                "done": true,
                "response": {"generateVideoResponse": {}},
            }),
        }
    }
}

#[async_trait]
impl VideoProvider for ScriptedProvider {
    async fn submit(&self, request: &ProviderRequest) -> PipelineResult<GenerationJob> {
        let mut recorded = self.recorded();
        let index = recorded.submissions.len();
        recorded.submissions.push(request.clone());

        let attempt = self
            .attempts
            .get(index)
            .or_else(|| self.attempts.last())
            .cloned()
            .unwrap_or_else(Attempt::never_completes);

        if let Some((status, message)) = &attempt.rejection {
            return Err(PipelineError::provider(Some(*status), message.clone()));
        }

        let name = format!("models/scripted/operations/op-{}", index + 1);
        let mut op = Operation {
            attempt,
            polls: 0,
            last_document: Value::Null,
        };
        let document = Self::document(&name, &op);
        op.last_document = document.clone();
        recorded.operations.insert(name, op);

        Ok(GenerationJob::from_handle(JobHandle::new(document)))
    }

    async fn poll(&self, job: &GenerationJob) -> PipelineResult<GenerationJob> {
        self.recorded().poll_times.push(Instant::now());
        if let Some(delay) = self.poll_delay {
            tokio::time::sleep(delay).await;
        }
        let mut recorded = self.recorded();

        let name = job
            .handle()
            .name()
            .ok_or_else(|| PipelineError::malformed("Operation has no name to poll"))?
            .to_string();
        let op = recorded
            .operations
            .get_mut(&name)
            .ok_or_else(|| PipelineError::provider(Some(404), format!("Unknown operation {}", name)))?;

        if job.handle().as_value() != &op.last_document {
            return Err(PipelineError::malformed("Poll did not use the latest handle"));
        }

        op.polls += 1;
        let document = Self::document(&name, op);
        op.last_document = document.clone();

        Ok(GenerationJob::from_handle(JobHandle::new(document)))
    }

    async fn fetch_artifact(&self, uri: &str) -> PipelineResult<FetchedArtifact> {
        self.recorded().fetched.push(uri.to_string());
        if self.fail_downloads {
            return Err(PipelineError::download_failed("403 Forbidden"));
        }
        Ok(FetchedArtifact {
            bytes: SCRIPTED_VIDEO_BYTES.to_vec(),
            content_type: "video/mp4".to_string(),
        })
    }
}
