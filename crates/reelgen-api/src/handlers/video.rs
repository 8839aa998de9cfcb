//! Video generation handlers.

use std::collections::BTreeMap;

use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use reelgen_models::{AspectRatio, GenerationId, ReferenceImage};
use reelgen_pipeline::{Cancellation, GenerationSubmission, TracingProgress};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Successful generation response.
#[derive(Serialize)]
pub struct GenerateVideoResponse {
    pub success: bool,
    pub generation_id: String,
    /// Where the finished video can be downloaded from this server
    pub video_url: String,
}

/// Generate a video from a multipart upload.
///
/// Fields: `prompt`, `ratio`, `imageCount`, `identityStrict`, and image
/// files `image0` (or `image`) as the primary reference followed by
/// `image1`, `image2`, ... in order.
pub async fn generate_video(
    State(state): State<AppState>,
    request_id: Option<Extension<String>>,
    multipart: Multipart,
) -> ApiResult<Json<GenerateVideoResponse>> {
    let submission = read_submission(multipart).await?;
    let request = state.pipeline.validate(submission)?;

    let trace_id = request_id
        .map(|Extension(id)| id)
        .unwrap_or_else(|| GenerationId::new().to_string());
    info!(
        request_id = %trace_id,
        images = request.image_count(),
        aspect_ratio = %request.aspect_ratio(),
        "Accepted video generation request"
    );

    let progress = TracingProgress::new(trace_id);
    let cancel = Cancellation::new(state.shutdown.clone());
    let artifact = state.pipeline.run(&request, &progress, cancel).await?;

    let id = state.artifacts.insert(artifact).await;

    Ok(Json(GenerateVideoResponse {
        success: true,
        video_url: format!("/api/artifacts/{}", id),
        generation_id: id.to_string(),
    }))
}

/// Serve a finished video.
pub async fn get_artifact(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let stored = state
        .artifacts
        .get(&GenerationId(id))
        .await
        .ok_or_else(|| ApiError::not_found("Video not found or expired"))?;

    Ok((
        [
            (header::CONTENT_TYPE, stored.content_type),
            (header::CACHE_CONTROL, "private, max-age=3600".to_string()),
        ],
        stored.bytes,
    )
        .into_response())
}

/// Collect the multipart form into an untrusted submission.
async fn read_submission(mut multipart: Multipart) -> ApiResult<GenerationSubmission> {
    let mut submission = GenerationSubmission {
        aspect_ratio: AspectRatio::Portrait,
        ..Default::default()
    };
    let mut fallback_primary = None;
    let mut additional = BTreeMap::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "prompt" => submission.prompt = field.text().await?,
            "ratio" => {
                let ratio = field.text().await?;
                if !ratio.trim().is_empty() {
                    submission.aspect_ratio = ratio
                        .parse()
                        .map_err(|e: reelgen_models::AspectRatioParseError| {
                            ApiError::bad_request(e.to_string())
                        })?;
                }
            }
            "imageCount" => submission.image_count = field.text().await?.trim().parse().ok(),
            "identityStrict" => {
                let value = field.text().await?;
                submission.identity_strict = matches!(value.trim(), "true" | "1");
            }
            _ => {
                let Some(index) = image_index(&name) else {
                    debug!(field = %name, "Ignoring unknown form field");
                    continue;
                };
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await?;
                if data.is_empty() {
                    continue;
                }
                let image = ReferenceImage::new(data.to_vec(), mime_type);
                match index {
                    ImageSlot::Primary => submission.primary = Some(image),
                    ImageSlot::LegacyPrimary => fallback_primary = Some(image),
                    ImageSlot::Additional(n) => {
                        additional.insert(n, image);
                    }
                }
            }
        }
    }

    if submission.primary.is_none() {
        submission.primary = fallback_primary;
    }
    submission.additional = additional.into_values().collect();
    Ok(submission)
}

#[derive(Debug, PartialEq, Eq)]
enum ImageSlot {
    Primary,
    LegacyPrimary,
    Additional(usize),
}

fn image_index(name: &str) -> Option<ImageSlot> {
    if name == "image" {
        return Some(ImageSlot::LegacyPrimary);
    }
    match name.strip_prefix("image")?.parse::<usize>().ok()? {
        0 => Some(ImageSlot::Primary),
        n => Some(ImageSlot::Additional(n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_field_names() {
        assert_eq!(image_index("image0"), Some(ImageSlot::Primary));
        assert_eq!(image_index("image"), Some(ImageSlot::LegacyPrimary));
        assert_eq!(image_index("image2"), Some(ImageSlot::Additional(2)));
        assert_eq!(image_index("imageCount"), None);
        assert_eq!(image_index("avatar"), None);
    }
}
