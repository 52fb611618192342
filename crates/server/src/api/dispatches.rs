use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use valet_core::Dispatch;

use super::{ApiError, IdPath, OptionalJson};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ListDispatchesResponse {
    pub dispatches: Vec<Dispatch>,
}

/// Operator status change; any non-blank string is accepted.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateStatusBody {
    pub status: Option<String>,
}

pub async fn list_dispatches(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListDispatchesResponse>, ApiError> {
    let dispatches = state.dispatches().list()?;
    Ok(Json(ListDispatchesResponse { dispatches }))
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    IdPath(dispatch_id): IdPath,
    OptionalJson(body): OptionalJson<UpdateStatusBody>,
) -> Result<Json<Dispatch>, ApiError> {
    let status = body.status.unwrap_or_default();
    let update = state.engine().update_status(dispatch_id, &status)?;
    Ok(Json(update.dispatch))
}
