//! Shared data models for the reelgen video pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Aspect ratios and reference image mime types
//! - Validated generation requests
//! - Provider jobs and their poll state
//! - Progress events
//! - The closed user-facing error taxonomy

pub mod aspect;
pub mod error_kind;
pub mod image;
pub mod job;
pub mod progress;
pub mod request;

// Re-export common types
pub use aspect::{AspectRatio, AspectRatioParseError};
pub use error_kind::{ErrorKind, TranslatedError};
pub use image::{ImageMimeType, ReferenceImage};
pub use job::{GenerationId, GenerationJob, JobError, JobHandle, JobState};
pub use progress::{ProgressEvent, STAGE_MESSAGES};
pub use request::GenerationRequest;
