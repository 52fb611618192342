use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use valet_core::Gate;

use super::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ListGatesResponse {
    pub gates: Vec<Gate>,
}

/// Registered exit gates in registry order
pub async fn list_gates(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListGatesResponse>, ApiError> {
    let gates = state.gates().list()?;
    Ok(Json(ListGatesResponse { gates }))
}
