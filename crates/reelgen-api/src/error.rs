//! API error types.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reelgen_models::{ErrorKind, TranslatedError};
use reelgen_pipeline::ValidationError;
use serde::Serialize;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Generation(#[from] TranslatedError),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Too many requests. Rate limit exceeded.")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(ValidationError::ImageTooLarge { .. }) => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            ApiError::Validation(ValidationError::UnsupportedMimeType) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Generation(e) => match e.kind {
                ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
                ErrorKind::CredentialInvalid => StatusCode::FORBIDDEN,
                ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                ErrorKind::TimedOut => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) | ApiError::PayloadTooLarge(_) => {
                ErrorKind::InvalidInput.as_str()
            }
            ApiError::Generation(e) => e.kind.as_str(),
            ApiError::NotFound(_) => "not_found",
            ApiError::RateLimited => ErrorKind::RateLimited.as_str(),
            ApiError::Internal(_) => ErrorKind::Unexpected.as_str(),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::PayloadTooLarge("Request body is too large".to_string());
        }
        ApiError::bad_request(format!("Invalid form data: {}", e.body_text()))
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Don't expose internal error details in production
        let error = match &self {
            ApiError::Internal(_) => {
                if std::env::var("ENVIRONMENT").unwrap_or_default() == "production" {
                    "An internal error occurred".to_string()
                } else {
                    self.to_string()
                }
            }
            _ => self.to_string(),
        };

        let body = ErrorResponse {
            success: false,
            error,
            code: self.code(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_statuses() {
        let too_large = ApiError::from(ValidationError::ImageTooLarge {
            limit_bytes: 5 * 1024 * 1024,
        });
        assert_eq!(too_large.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(too_large.to_string(), "Image size exceeds 5MB limit");

        let mime = ApiError::from(ValidationError::UnsupportedMimeType);
        assert_eq!(mime.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let empty = ApiError::from(ValidationError::NoImages);
        assert_eq!(empty.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(empty.code(), "invalid_input");
    }

    #[test]
    fn test_generation_statuses() {
        let cases = [
            (ErrorKind::CredentialInvalid, StatusCode::FORBIDDEN),
            (ErrorKind::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (ErrorKind::TimedOut, StatusCode::GATEWAY_TIMEOUT),
            (ErrorKind::SafetyPolicyRejected, StatusCode::INTERNAL_SERVER_ERROR),
            (ErrorKind::NoArtifactReturned, StatusCode::INTERNAL_SERVER_ERROR),
            (ErrorKind::Unexpected, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (kind, status) in cases {
            let err = ApiError::from(TranslatedError::new(kind, "x"));
            assert_eq!(err.status_code(), status, "{}", kind);
            assert_eq!(err.code(), kind.as_str());
        }
    }
}
