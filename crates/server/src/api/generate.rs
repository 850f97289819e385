//! Synchronous generation endpoint.

use axum::{extract::State, http::StatusCode, Json};
use contentforge_core::{GenerationError, GenerationRequest, GenerationResult};
use std::sync::Arc;
use tracing::warn;

use super::ErrorResponse;
use crate::state::AppState;

/// HTTP status for a generation failure.
pub fn error_status(error: &GenerationError) -> StatusCode {
    match error {
        GenerationError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        GenerationError::QuantityContractViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        GenerationError::ModelInvocation { .. } => StatusCode::BAD_GATEWAY,
    }
}

impl From<&GenerationError> for ErrorResponse {
    fn from(error: &GenerationError) -> Self {
        ErrorResponse::new(error.to_string()).with_kind(error.kind())
    }
}

/// Generate a content package and return it in the response.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerationRequest>,
) -> Result<Json<GenerationResult>, (StatusCode, Json<ErrorResponse>)> {
    match state.generator().generate(&request).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            warn!(subject = %request.subject_text, error = %e, "Generation request failed");
            Err((error_status(&e), Json(ErrorResponse::from(&e))))
        }
    }
}
