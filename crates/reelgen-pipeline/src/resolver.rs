//! Turns a finished job into a downloaded video.

use std::fmt;

use reelgen_models::{GenerationId, GenerationJob, ProgressEvent};

use crate::error::{PipelineError, PipelineResult};
use crate::progress::ProgressSink;
use crate::provider::VideoProvider;

const FINALIZING_PERCENT: u8 = 95;
const FINALIZING_STAGE: &str = "Finalizing video...";

/// A generated video owned by the caller.
#[derive(Clone, PartialEq, Eq)]
pub struct VideoArtifact {
    pub id: GenerationId,
    pub bytes: Vec<u8>,
    pub content_type: String,
    /// Provider URI the bytes were fetched from, without credentials
    pub source_uri: String,
}

impl fmt::Debug for VideoArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoArtifact")
            .field("id", &self.id)
            .field("len", &self.bytes.len())
            .field("content_type", &self.content_type)
            .field("source_uri", &self.source_uri)
            .finish()
    }
}

/// Fetch the first artifact of a successful job.
pub async fn resolve(
    provider: &dyn VideoProvider,
    id: &GenerationId,
    job: GenerationJob,
    progress: &dyn ProgressSink,
) -> PipelineResult<VideoArtifact> {
    let uri = match job.artifact_uri() {
        Some(uri) => uri.to_string(),
        None => return Err(PipelineError::NoArtifact(Box::new(job))),
    };

    progress.emit(ProgressEvent::new(FINALIZING_PERCENT, FINALIZING_STAGE));
    let fetched = provider.fetch_artifact(&uri).await?;

    Ok(VideoArtifact {
        id: id.clone(),
        bytes: fetched.bytes,
        content_type: fetched.content_type,
        source_uri: uri,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoopProgress;
    use crate::testing::{ScriptedProvider, SCRIPTED_VIDEO_BYTES};
    use reelgen_models::JobHandle;
    use serde_json::json;

    fn finished(response: serde_json::Value) -> GenerationJob {
        GenerationJob::from_handle(JobHandle::new(json!({
            "name": "op",
            "done": true,
            "response": response,
        })))
    }

    #[tokio::test]
    async fn test_resolves_first_sample() {
        let provider = ScriptedProvider::succeeding();
        let id = GenerationId::new();
        let job = finished(json!({"generateVideoResponse": {"generatedSamples": [
            {"video": {"uri": "https://v/first"}},
            {"video": {"uri": "https://v/second"}}
        ]}}));

        let artifact = resolve(&provider, &id, job, &NoopProgress).await.unwrap();
        assert_eq!(artifact.id, id);
        assert_eq!(artifact.bytes, SCRIPTED_VIDEO_BYTES);
        assert_eq!(artifact.source_uri, "https://v/first");
        assert_eq!(provider.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_uri_is_no_artifact() {
        let provider = ScriptedProvider::succeeding();
        let job = finished(json!({"generateVideoResponse": {"generatedSamples": []}}));

        let err = resolve(&provider, &GenerationId::new(), job, &NoopProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::NoArtifact(_)));
        assert_eq!(provider.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_download_failure_propagates() {
        let provider = ScriptedProvider::succeeding().failing_downloads();
        let job = finished(json!({"generatedVideos": [{"video": {"uri": "https://v/x"}}]}));

        let err = resolve(&provider, &GenerationId::new(), job, &NoopProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::DownloadFailed(_)));
    }
}
