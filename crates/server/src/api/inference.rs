use axum::{extract::State, Json};
use std::sync::Arc;
use valet_core::InferenceOutcome;

use super::{ApiError, IdPath};
use crate::state::AppState;

/// Score every gate for a ticket and commit a dispatch when confident.
///
/// Runs on the blocking pool since the engine holds the database lock
/// for the whole commit.
pub async fn run_inference(
    State(state): State<Arc<AppState>>,
    IdPath(ticket_id): IdPath,
) -> Result<Json<InferenceOutcome>, ApiError> {
    let outcome = tokio::task::spawn_blocking(move || state.engine().run_inference(ticket_id))
        .await
        .map_err(|e| ApiError::internal(format!("Inference task failed: {}", e)))??;

    Ok(Json(outcome))
}
