//! User-facing error taxonomy.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Closed set of failure categories a generation can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Rejected by the validation gate; never reached the network
    InvalidInput,
    /// Provider moderation rejected the prompt or images
    SafetyPolicyRejected,
    /// Provider rejected the requested settings
    UnsupportedConfiguration,
    /// Provider quota or request limit hit
    RateLimited,
    /// API key missing, invalid, or without billing
    CredentialInvalid,
    /// The job did not finish before the poll deadline
    TimedOut,
    /// The job finished without producing a video
    NoArtifactReturned,
    /// The finished video could not be downloaded
    DownloadFailed,
    Unexpected,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::SafetyPolicyRejected => "safety_policy_rejected",
            ErrorKind::UnsupportedConfiguration => "unsupported_configuration",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::CredentialInvalid => "credential_invalid",
            ErrorKind::TimedOut => "timed_out",
            ErrorKind::NoArtifactReturned => "no_artifact_returned",
            ErrorKind::DownloadFailed => "download_failed",
            ErrorKind::Unexpected => "unexpected",
        }
    }

    /// Only timeouts are transient; everything else is deterministic and
    /// retrying it burns quota.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::TimedOut)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A classified failure with a message safe to show to the end user.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct TranslatedError {
    pub kind: ErrorKind,
    pub message: String,
}

impl TranslatedError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }
}
