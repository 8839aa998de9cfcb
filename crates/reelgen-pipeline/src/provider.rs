//! Video generation provider client.
//!
//! [`VideoProvider`] is the seam between the pipeline and the remote
//! long-running-operation API. [`VeoClient`] talks to the Generative
//! Language REST API; tests substitute a scripted implementation.

use std::sync::Arc;

use async_trait::async_trait;
use reelgen_models::{GenerationJob, JobHandle};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::PipelineConfig;
use crate::credentials::CredentialProvider;
use crate::error::{PipelineError, PipelineResult};
use crate::request::ProviderRequest;

const API_KEY_HEADER: &str = "x-goog-api-key";
const DEFAULT_VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// Binary artifact downloaded from the provider.
#[derive(Clone, PartialEq, Eq)]
pub struct FetchedArtifact {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl std::fmt::Debug for FetchedArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchedArtifact")
            .field("len", &self.bytes.len())
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// Narrow a transport failure. Per-call timeouts become timed-out provider
/// errors so they are retried like a poll deadline.
fn request_error(e: reqwest::Error) -> PipelineError {
    if e.is_timeout() {
        PipelineError::provider(None, format!("Provider request timed out: {}", e.without_url()))
    } else {
        e.into()
    }
}

/// Remote job API: submit, poll, download.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Start a generation job and return its first status document.
    async fn submit(&self, request: &ProviderRequest) -> PipelineResult<GenerationJob>;

    /// Refresh a job. `job` must be the value returned by the previous call.
    async fn poll(&self, job: &GenerationJob) -> PipelineResult<GenerationJob>;

    /// Download a finished artifact.
    async fn fetch_artifact(&self, uri: &str) -> PipelineResult<FetchedArtifact>;
}

/// Generative Language API client for Veo models.
pub struct VeoClient {
    client: Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl VeoClient {
    pub fn new(
        config: &PipelineConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> PipelineResult<Self> {
        let client = Client::builder().timeout(config.http_timeout).build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn submit_url(&self, model: &str) -> String {
        format!("{}/models/{}:predictLongRunning", self.base_url, model)
    }

    fn operation_url(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name.trim_start_matches('/'))
    }

    async fn read_job(response: reqwest::Response) -> PipelineResult<GenerationJob> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PipelineError::provider(
                Some(status.as_u16()),
                format!("Provider returned {}: {}", status, error_text),
            ));
        }

        let document: Value = response
            .json()
            .await
            .map_err(|e| PipelineError::malformed(format!("Invalid operation JSON: {}", e)))?;
        if !document.is_object() {
            return Err(PipelineError::malformed("Operation is not a JSON object"));
        }
        Ok(GenerationJob::from_handle(JobHandle::new(document)))
    }
}

#[async_trait]
impl VideoProvider for VeoClient {
    async fn submit(&self, request: &ProviderRequest) -> PipelineResult<GenerationJob> {
        let key = self.credentials.api_key()?;
        let url = self.submit_url(request.model());
        debug!(model = request.model(), branch = request.branch(), "Submitting generation job");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, key)
            .json(&request.body())
            .send()
            .await
            .map_err(request_error)?;

        let job = Self::read_job(response).await?;
        debug!(operation = ?job.handle().name(), "Generation job accepted");
        Ok(job)
    }

    async fn poll(&self, job: &GenerationJob) -> PipelineResult<GenerationJob> {
        let key = self.credentials.api_key()?;
        let name = job
            .handle()
            .name()
            .ok_or_else(|| PipelineError::malformed("Operation has no name to poll"))?;

        let response = self
            .client
            .get(self.operation_url(name))
            .header(API_KEY_HEADER, key)
            .send()
            .await
            .map_err(request_error)?;

        Self::read_job(response).await
    }

    async fn fetch_artifact(&self, uri: &str) -> PipelineResult<FetchedArtifact> {
        let key = self.credentials.api_key()?;
        let mut url = Url::parse(uri)
            .map_err(|e| PipelineError::download_failed(format!("Invalid video URI: {}", e)))?;
        url.query_pairs_mut().append_pair("key", &key);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PipelineError::download_failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Video download rejected");
            return Err(PipelineError::download_failed(status.to_string()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_VIDEO_CONTENT_TYPE)
            .to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| PipelineError::download_failed(e.to_string()))?;

        Ok(FetchedArtifact {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::StaticCredentials;
    use crate::request;
    use reelgen_models::{AspectRatio, ReferenceImage};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> VeoClient {
        let config = PipelineConfig {
            api_base_url: server.uri(),
            ..Default::default()
        };
        VeoClient::new(&config, Arc::new(StaticCredentials::new("test-key"))).unwrap()
    }

    fn single_request() -> ProviderRequest {
        request::build(
            &[ReferenceImage::new(vec![1, 2, 3], "image/png")],
            "a prompt",
            AspectRatio::Portrait,
            &PipelineConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_submit_posts_to_model_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/veo-3.1-fast-generate-preview:predictLongRunning"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({"parameters": {"aspectRatio": "9:16"}})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"name": "models/veo/operations/op1"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let job = client_for(&server).submit(&single_request()).await.unwrap();
        assert_eq!(job.handle().name(), Some("models/veo/operations/op1"));
        assert!(!job.is_done());
    }

    #[tokio::test]
    async fn test_poll_uses_operation_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models/veo/operations/op1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "models/veo/operations/op1",
                "done": true,
                "response": {"generateVideoResponse": {"generatedSamples": [
                    {"video": {"uri": "https://files.example.com/v.mp4"}}
                ]}}
            })))
            .mount(&server)
            .await;

        let pending = GenerationJob::from_handle(JobHandle::new(json!({
            "name": "models/veo/operations/op1"
        })));
        let job = client_for(&server).poll(&pending).await.unwrap();
        assert!(job.is_done());
        assert_eq!(job.artifact_uri(), Some("https://files.example.com/v.mp4"));
    }

    #[tokio::test]
    async fn test_poll_without_name_is_malformed() {
        let server = MockServer::start().await;
        let nameless = GenerationJob::from_handle(JobHandle::new(json!({})));
        let err = client_for(&server).poll(&nameless).await.unwrap_err();
        assert!(matches!(err, PipelineError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_rate_limit_status_is_preserved() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"code": 429, "status": "RESOURCE_EXHAUSTED"}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).submit(&single_request()).await.unwrap_err();
        assert_eq!(err.provider_status(), Some(429));
        assert!(err.to_string().contains("RESOURCE_EXHAUSTED"));
    }

    #[tokio::test]
    async fn test_fetch_artifact_appends_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/files/abc:download"))
            .and(query_param("alt", "media"))
            .and(query_param("key", "test-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"mp4-bytes".to_vec())
                    .insert_header("content-type", "video/mp4"),
            )
            .mount(&server)
            .await;

        let uri = format!("{}/files/abc:download?alt=media", server.uri());
        let artifact = client_for(&server).fetch_artifact(&uri).await.unwrap();
        assert_eq!(artifact.bytes, b"mp4-bytes");
        assert_eq!(artifact.content_type, "video/mp4");
    }

    #[tokio::test]
    async fn test_fetch_artifact_failure_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let uri = format!("{}/files/gone", server.uri());
        let err = client_for(&server).fetch_artifact(&uri).await.unwrap_err();
        assert!(matches!(err, PipelineError::DownloadFailed(_)));
    }

    #[tokio::test]
    async fn test_slow_provider_call_classifies_as_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/operations/op"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"name": "operations/op"}))
                    .set_delay(std::time::Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let config = PipelineConfig {
            api_base_url: server.uri(),
            http_timeout: std::time::Duration::from_secs(1),
            ..Default::default()
        };
        let client = VeoClient::new(&config, Arc::new(StaticCredentials::new("test-key"))).unwrap();
        let pending = GenerationJob::from_handle(JobHandle::new(json!({"name": "operations/op"})));

        let err = client.poll(&pending).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
        let kind = crate::translate::classify(&err, None);
        assert_eq!(kind, reelgen_models::ErrorKind::TimedOut);
        assert!(kind.is_retryable());
    }

    #[tokio::test]
    async fn test_missing_key_short_circuits() {
        let server = MockServer::start().await;
        let client = VeoClient::new(
            &PipelineConfig {
                api_base_url: server.uri(),
                ..Default::default()
            },
            Arc::new(StaticCredentials::missing()),
        )
        .unwrap();

        let err = client.submit(&single_request()).await.unwrap_err();
        assert!(matches!(err, PipelineError::MissingCredential));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
