//! Target aspect ratios for generated videos.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Aspect ratio of the generated video.
///
/// Only the three ratios the video model accepts are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AspectRatio {
    /// Vertical 9:16 for TikTok/Reels/Shorts
    #[default]
    Portrait,
    /// Square 1:1
    Square,
    /// Horizontal 16:9
    Landscape,
}

impl AspectRatio {
    /// All supported ratios.
    pub const ALL: [AspectRatio; 3] = [
        AspectRatio::Portrait,
        AspectRatio::Square,
        AspectRatio::Landscape,
    ];

    /// Wire tag sent to the provider ("9:16", "1:1", "16:9").
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Portrait => "9:16",
            AspectRatio::Square => "1:1",
            AspectRatio::Landscape => "16:9",
        }
    }

    pub fn is_portrait(&self) -> bool {
        matches!(self, AspectRatio::Portrait)
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = AspectRatioParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "9:16" | "portrait" => Ok(AspectRatio::Portrait),
            "1:1" | "square" => Ok(AspectRatio::Square),
            "16:9" | "landscape" => Ok(AspectRatio::Landscape),
            other => Err(AspectRatioParseError::Unsupported(other.to_string())),
        }
    }
}

impl Serialize for AspectRatio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AspectRatio {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AspectRatioParseError {
    #[error("Unsupported aspect ratio: {0}, expected one of 9:16, 1:1, 16:9")]
    Unsupported(String),
}
