//! Provider request construction.
//!
//! One reference image becomes an image-to-video request with the image
//! as the primary visual anchor. Several become an asset-referenced
//! request carrying every image, in order, as a reference asset.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reelgen_models::{AspectRatio, ReferenceImage};
use serde::Serialize;
use serde_json::{json, Value};

use crate::config::PipelineConfig;

/// Number of videos requested per job.
const SAMPLE_COUNT: u32 = 1;

/// Base64-encoded image payload in the provider's wire shape.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineImage {
    pub bytes_base64_encoded: String,
    pub mime_type: String,
}

impl InlineImage {
    pub fn from_reference(image: &ReferenceImage) -> Self {
        let mime_type = image
            .mime()
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| image.mime_type.clone());
        Self {
            bytes_base64_encoded: STANDARD.encode(&image.data),
            mime_type,
        }
    }
}

impl fmt::Debug for InlineImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InlineImage")
            .field("encoded_len", &self.bytes_base64_encoded.len())
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

/// One entry of the multi-reference asset list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceAsset {
    pub image: InlineImage,
    pub reference_type: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageToVideoRequest {
    pub model: String,
    pub prompt: String,
    pub image: InlineImage,
    pub aspect_ratio: AspectRatio,
    pub sample_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReferencedRequest {
    pub model: String,
    pub prompt: String,
    pub reference_images: Vec<ReferenceAsset>,
    pub aspect_ratio: AspectRatio,
    pub resolution: String,
    pub sample_count: u32,
}

/// A job submission in one of the provider's two request shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderRequest {
    ImageToVideo(ImageToVideoRequest),
    AssetReferenced(AssetReferencedRequest),
}

impl ProviderRequest {
    pub fn model(&self) -> &str {
        match self {
            ProviderRequest::ImageToVideo(r) => &r.model,
            ProviderRequest::AssetReferenced(r) => &r.model,
        }
    }

    pub fn prompt(&self) -> &str {
        match self {
            ProviderRequest::ImageToVideo(r) => &r.prompt,
            ProviderRequest::AssetReferenced(r) => &r.prompt,
        }
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        match self {
            ProviderRequest::ImageToVideo(r) => r.aspect_ratio,
            ProviderRequest::AssetReferenced(r) => r.aspect_ratio,
        }
    }

    /// Branch label for logs and metrics.
    pub fn branch(&self) -> &'static str {
        match self {
            ProviderRequest::ImageToVideo(_) => "single_image",
            ProviderRequest::AssetReferenced(_) => "multi_reference",
        }
    }

    /// JSON body for the `predictLongRunning` call.
    pub fn body(&self) -> Value {
        match self {
            ProviderRequest::ImageToVideo(r) => json!({
                "instances": [{
                    "prompt": r.prompt,
                    "image": r.image,
                }],
                "parameters": {
                    "aspectRatio": r.aspect_ratio.as_str(),
                    "sampleCount": r.sample_count,
                },
            }),
            ProviderRequest::AssetReferenced(r) => json!({
                "instances": [{
                    "prompt": r.prompt,
                    "referenceImages": r.reference_images,
                }],
                "parameters": {
                    "aspectRatio": r.aspect_ratio.as_str(),
                    "resolution": r.resolution,
                    "sampleCount": r.sample_count,
                },
            }),
        }
    }
}

/// Map validated images and a composed prompt to a provider request.
///
/// `images` must be non-empty; the validation gate guarantees it.
pub fn build(
    images: &[ReferenceImage],
    composed_prompt: &str,
    aspect_ratio: AspectRatio,
    config: &PipelineConfig,
) -> ProviderRequest {
    match images {
        [single] => ProviderRequest::ImageToVideo(ImageToVideoRequest {
            model: config.models.single_image.clone(),
            prompt: composed_prompt.to_string(),
            image: InlineImage::from_reference(single),
            aspect_ratio,
            sample_count: SAMPLE_COUNT,
        }),
        many => ProviderRequest::AssetReferenced(AssetReferencedRequest {
            model: config.models.multi_reference.clone(),
            prompt: composed_prompt.to_string(),
            reference_images: many
                .iter()
                .map(|image| ReferenceAsset {
                    image: InlineImage::from_reference(image),
                    reference_type: "asset",
                })
                .collect(),
            aspect_ratio,
            resolution: config.resolution.clone(),
            sample_count: SAMPLE_COUNT,
        }),
    }
}
