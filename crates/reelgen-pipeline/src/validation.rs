//! Pre-flight validation gate.
//!
//! Runs before any network call and is the only thing standing between
//! a malformed or abusive submission and a billed provider request.

use reelgen_models::{AspectRatio, GenerationRequest, ReferenceImage};
use thiserror::Error;

use crate::config::ValidationLimits;

/// Keywords rejected outright. This is a UX pre-check only; the
/// provider's own moderation is authoritative.
pub const BLOCKED_KEYWORDS: [&str; 10] = [
    "celebrity",
    "political",
    "violent",
    "explicit",
    "blood",
    "fight",
    "gun",
    "nsfw",
    "hate speech",
    "unsafe",
];

/// Untrusted submission as received from a caller.
#[derive(Debug, Clone, Default)]
pub struct GenerationSubmission {
    pub prompt: String,
    /// Image count claimed by the caller; falls back to the attached count
    pub image_count: Option<usize>,
    /// The designated primary reference image
    pub primary: Option<ReferenceImage>,
    /// Further reference images, in order
    pub additional: Vec<ReferenceImage>,
    pub aspect_ratio: AspectRatio,
    pub identity_strict: bool,
}

impl GenerationSubmission {
    /// Build a submission whose first image is the primary one.
    pub fn with_images(prompt: impl Into<String>, images: Vec<ReferenceImage>, aspect_ratio: AspectRatio) -> Self {
        let mut images = images.into_iter();
        Self {
            prompt: prompt.into(),
            image_count: None,
            primary: images.next(),
            additional: images.collect(),
            aspect_ratio,
            identity_strict: false,
        }
    }

    pub fn identity_strict(mut self, enabled: bool) -> Self {
        self.identity_strict = enabled;
        self
    }

    fn attached_count(&self) -> usize {
        usize::from(self.primary.is_some()) + self.additional.len()
    }

    fn claimed_count(&self) -> usize {
        self.image_count.unwrap_or_else(|| self.attached_count())
    }
}

/// Reasons a submission is rejected before reaching the provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid prompt. Must be between 1 and {max} characters.")]
    InvalidPrompt { max: usize },

    #[error("Prompt may violate safety guidelines due to the word '{0}'. Please revise.")]
    BlockedKeyword(String),

    #[error("No character image uploaded")]
    NoImages,

    #[error("Primary character image missing")]
    PrimaryMissing,

    #[error("Image size exceeds {} limit", format_limit(.limit_bytes))]
    ImageTooLarge { limit_bytes: usize },

    #[error("Invalid file type. Only JPG, PNG, and WebP are allowed.")]
    UnsupportedMimeType,

    #[error("Too many reference images. At most {max} are allowed.")]
    TooManyImages { max: usize },
}

/// Render a byte ceiling the way users expect to read it.
fn format_limit(bytes: &usize) -> String {
    let bytes = *bytes;
    const MB: usize = 1024 * 1024;
    if bytes >= MB && bytes % MB == 0 {
        format!("{}MB", bytes / MB)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Check a submission and turn it into a [`GenerationRequest`].
pub fn validate(
    submission: GenerationSubmission,
    limits: &ValidationLimits,
) -> Result<GenerationRequest, ValidationError> {
    let prompt = submission.prompt.trim();
    if prompt.is_empty() || prompt.chars().count() > limits.max_prompt_length {
        return Err(ValidationError::InvalidPrompt {
            max: limits.max_prompt_length,
        });
    }

    let lowered = prompt.to_lowercase();
    if let Some(keyword) = BLOCKED_KEYWORDS.iter().find(|k| lowered.contains(*k)) {
        return Err(ValidationError::BlockedKeyword(keyword.to_string()));
    }

    if submission.claimed_count() == 0 {
        return Err(ValidationError::NoImages);
    }

    let primary = submission
        .primary
        .as_ref()
        .ok_or(ValidationError::PrimaryMissing)?;
    check_image(primary, limits)?;

    if submission.attached_count() > limits.max_images {
        return Err(ValidationError::TooManyImages {
            max: limits.max_images,
        });
    }
    for image in &submission.additional {
        check_image(image, limits)?;
    }

    let prompt = prompt.to_string();
    let mut images = Vec::with_capacity(submission.attached_count());
    images.extend(submission.primary);
    images.extend(submission.additional);

    Ok(GenerationRequest::from_validated(
        images,
        prompt,
        submission.aspect_ratio,
        submission.identity_strict,
    ))
}

fn check_image(image: &ReferenceImage, limits: &ValidationLimits) -> Result<(), ValidationError> {
    if image.size() > limits.max_image_bytes {
        return Err(ValidationError::ImageTooLarge {
            limit_bytes: limits.max_image_bytes,
        });
    }
    if image.mime().is_none() {
        return Err(ValidationError::UnsupportedMimeType);
    }
    Ok(())
}
