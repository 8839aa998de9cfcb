//! Credential selection handlers.
//!
//! After the provider rejects the configured key the pipeline marks the
//! credential as unselected. Clients check this before submitting and
//! re-select once the key has been fixed.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Credential status response.
#[derive(Serialize)]
pub struct CredentialStatus {
    /// A key is present in the environment
    pub configured: bool,
    /// The key is selected for use
    pub selected: bool,
}

fn status(state: &AppState) -> CredentialStatus {
    let credentials = state.pipeline.credentials();
    CredentialStatus {
        configured: credentials.is_configured(),
        selected: credentials.is_selected(),
    }
}

/// Report whether a usable credential is available.
pub async fn get_credentials(State(state): State<AppState>) -> Json<CredentialStatus> {
    Json(status(&state))
}

/// Mark the configured credential as selected again.
pub async fn select_credentials(State(state): State<AppState>) -> ApiResult<Json<CredentialStatus>> {
    let credentials = state.pipeline.credentials();
    if !credentials.is_configured() {
        return Err(ApiError::bad_request(
            "No API key is configured. Set GEMINI_API_KEY and restart the server.",
        ));
    }

    credentials.select();
    info!("Provider credential re-selected");
    Ok(Json(status(&state)))
}
