//! Ticket API handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use valet_core::{AuditEvent, CreateTicketRequest, Ticket, TicketFilter, TicketStatus};

use super::{ApiError, ApiJson, IdPath};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a ticket
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketBody {
    /// Owner of the car
    pub user_id: Option<String>,
    /// Vehicle description
    pub car_info: Option<String>,
}

/// Query parameters for listing tickets
#[derive(Debug, Deserialize)]
pub struct ListTicketsParams {
    /// Filter by status
    pub status: Option<String>,
    /// Filter by owner
    pub user_id: Option<String>,
}

/// Response for listing tickets
#[derive(Debug, Serialize)]
pub struct ListTicketsResponse {
    pub tickets: Vec<Ticket>,
    pub total: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a new ticket (car drop-off)
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<CreateTicketBody>,
) -> Result<(StatusCode, Json<Ticket>), ApiError> {
    let request = CreateTicketRequest::new(
        body.user_id.unwrap_or_default(),
        body.car_info.unwrap_or_default(),
    );

    let ticket = state.tickets().create(request)?;

    state.audit().try_emit(AuditEvent::TicketCreated {
        ticket_id: ticket.id,
        user_id: ticket.user_id.clone(),
        car_info: ticket.car_info.clone(),
    });

    Ok((StatusCode::CREATED, Json(ticket)))
}

/// Get a ticket by ID
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    IdPath(id): IdPath,
) -> Result<Json<Ticket>, ApiError> {
    state
        .tickets()
        .get(id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Ticket not found: {}", id)))
}

/// List tickets with optional filters
pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListTicketsParams>,
) -> Result<Json<ListTicketsResponse>, ApiError> {
    let mut filter = TicketFilter::new();

    if let Some(ref status) = params.status {
        let status: TicketStatus = status.parse().map_err(ApiError::bad_request)?;
        filter = filter.with_status(status);
    }

    if let Some(user_id) = params.user_id {
        filter = filter.with_user_id(user_id);
    }

    let tickets = state.tickets().list(&filter)?;

    Ok(Json(ListTicketsResponse {
        total: tickets.len(),
        tickets,
    }))
}

/// Owner asks for the car back
pub async fn request_retrieval(
    State(state): State<Arc<AppState>>,
    IdPath(id): IdPath,
) -> Result<Json<Ticket>, ApiError> {
    let transition = state.tickets().request_retrieval(id)?;

    if transition.changed() {
        state.audit().try_emit(AuditEvent::TicketStatusChanged {
            ticket_id: transition.ticket.id,
            from_status: transition.previous.to_string(),
            to_status: transition.ticket.status.to_string(),
        });
    }

    Ok(Json(transition.ticket))
}
