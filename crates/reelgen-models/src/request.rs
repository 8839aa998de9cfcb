//! Validated generation requests.

use crate::{AspectRatio, ReferenceImage};

/// A request that has passed the validation gate.
///
/// Holds 1-3 reference images (primary first), a bounded scene prompt,
/// the target aspect ratio and the identity-preservation flag. Fields are
/// private so the invariants established by validation cannot be broken
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    images: Vec<ReferenceImage>,
    prompt: String,
    aspect_ratio: AspectRatio,
    identity_strict: bool,
}

impl GenerationRequest {
    /// Assemble a request from already-checked parts.
    ///
    /// Callers outside the validation gate should not use this directly.
    #[doc(hidden)]
    pub fn from_validated(
        images: Vec<ReferenceImage>,
        prompt: String,
        aspect_ratio: AspectRatio,
        identity_strict: bool,
    ) -> Self {
        Self {
            images,
            prompt,
            aspect_ratio,
            identity_strict,
        }
    }

    pub fn images(&self) -> &[ReferenceImage] {
        &self.images
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    pub fn identity_strict(&self) -> bool {
        self.identity_strict
    }
}
