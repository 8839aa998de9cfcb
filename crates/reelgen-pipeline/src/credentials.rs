//! API credential supply.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{PipelineError, PipelineResult};

/// Source of the provider API key.
///
/// The "selected" flag tracks whether the user still has a usable key
/// chosen. It is cleared when the provider rejects the key so the UI can
/// prompt for a new one.
pub trait CredentialProvider: Send + Sync {
    /// Current API key, or `MissingCredential` when none is configured.
    fn api_key(&self) -> PipelineResult<String>;

    fn is_selected(&self) -> bool;

    fn invalidate(&self);

    fn select(&self);

    /// Whether a key is configured at all, regardless of selection.
    fn is_configured(&self) -> bool {
        self.api_key().is_ok()
    }
}

/// Credentials read from `GEMINI_API_KEY`, falling back to `API_KEY`.
#[derive(Debug)]
pub struct EnvCredentials {
    selected: AtomicBool,
}

impl EnvCredentials {
    pub fn new() -> Self {
        Self {
            selected: AtomicBool::new(true),
        }
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialProvider for EnvCredentials {
    fn api_key(&self) -> PipelineResult<String> {
        std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(PipelineError::MissingCredential)
    }

    fn is_selected(&self) -> bool {
        self.selected.load(Ordering::SeqCst)
    }

    fn invalidate(&self) {
        self.selected.store(false, Ordering::SeqCst);
    }

    fn select(&self) {
        self.selected.store(true, Ordering::SeqCst);
    }
}

/// Fixed key, for tests and embedding.
#[derive(Debug)]
pub struct StaticCredentials {
    key: Option<String>,
    selected: AtomicBool,
}

impl StaticCredentials {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            selected: AtomicBool::new(true),
        }
    }

    /// Credentials with no key configured.
    pub fn missing() -> Self {
        Self {
            key: None,
            selected: AtomicBool::new(false),
        }
    }
}

impl CredentialProvider for StaticCredentials {
    fn api_key(&self) -> PipelineResult<String> {
        self.key.clone().ok_or(PipelineError::MissingCredential)
    }

    fn is_selected(&self) -> bool {
        self.selected.load(Ordering::SeqCst)
    }

    fn invalidate(&self) {
        self.selected.store(false, Ordering::SeqCst);
    }

    fn select(&self) {
        self.selected.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_credentials_flag() {
        let creds = StaticCredentials::new("k");
        assert_eq!(creds.api_key().unwrap(), "k");
        assert!(creds.is_selected());

        creds.invalidate();
        assert!(!creds.is_selected());
        assert!(creds.is_configured());

        creds.select();
        assert!(creds.is_selected());
    }

    #[test]
    fn test_missing_credentials() {
        let creds = StaticCredentials::missing();
        assert!(matches!(creds.api_key(), Err(PipelineError::MissingCredential)));
        assert!(!creds.is_configured());
    }
}
