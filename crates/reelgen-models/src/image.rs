//! Reference images supplied by the user.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Mime types accepted for reference images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageMimeType {
    Jpeg,
    Png,
    Webp,
}

impl ImageMimeType {
    pub const ALL: [ImageMimeType; 3] = [ImageMimeType::Jpeg, ImageMimeType::Png, ImageMimeType::Webp];

    /// Parse a declared content type. Parameters (`; charset=...`) are ignored.
    pub fn parse(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim().to_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" => Some(ImageMimeType::Jpeg),
            "image/png" => Some(ImageMimeType::Png),
            "image/webp" => Some(ImageMimeType::Webp),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMimeType::Jpeg => "image/jpeg",
            ImageMimeType::Png => "image/png",
            ImageMimeType::Webp => "image/webp",
        }
    }
}

impl fmt::Display for ImageMimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user-supplied photograph used as an identity/style anchor.
///
/// The mime type is kept exactly as declared by the uploader; it is only
/// trusted after the validation gate has accepted it.
#[derive(Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl ReferenceImage {
    pub fn new(data: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Payload size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn mime(&self) -> Option<ImageMimeType> {
        ImageMimeType::parse(&self.mime_type)
    }
}

// Payloads are megabytes of binary; keep them out of logs.
impl fmt::Debug for ReferenceImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceImage")
            .field("size", &self.data.len())
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_parse() {
        assert_eq!(ImageMimeType::parse("image/jpeg"), Some(ImageMimeType::Jpeg));
        assert_eq!(ImageMimeType::parse("IMAGE/JPG"), Some(ImageMimeType::Jpeg));
        assert_eq!(ImageMimeType::parse("image/png; q=1"), Some(ImageMimeType::Png));
        assert_eq!(ImageMimeType::parse("image/webp"), Some(ImageMimeType::Webp));
        assert_eq!(ImageMimeType::parse("image/gif"), None);
        assert_eq!(ImageMimeType::parse(""), None);
    }

    #[test]
    fn test_reference_image_debug_hides_payload() {
        let image = ReferenceImage::new(vec![0u8; 1024], "image/png");
        let debug = format!("{:?}", image);
        assert!(debug.contains("size: 1024"));
        assert!(!debug.contains("[0, 0"));
    }
}
