//! Sensor ingest handlers.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use valet_core::{AuditEvent, NewObservation, SensorObservation, SensorSignals};

use super::{ApiError, IdPath, OptionalJson};
use crate::state::AppState;

/// One reading as posted by the phone.
///
/// Every payload is optional; an empty body is a valid observation.
#[derive(Debug, Default, Deserialize)]
pub struct RecordObservationBody {
    pub ble: Option<Value>,
    pub wifi: Option<Value>,
    pub imu: Option<Value>,
    pub gps: Option<Value>,
    /// RFC 3339 reading time; defaults to now.
    pub timestamp: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecordObservationResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct ListObservationsResponse {
    pub observations: Vec<SensorObservation>,
}

fn parse_timestamp(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, ApiError> {
    raw.map(|ts| {
        DateTime::parse_from_rfc3339(ts)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| ApiError::bad_request(format!("Invalid timestamp {:?}: {}", ts, e)))
    })
    .transpose()
}

/// Append one observation to a ticket's history
pub async fn record_observation(
    State(state): State<Arc<AppState>>,
    IdPath(ticket_id): IdPath,
    OptionalJson(body): OptionalJson<RecordObservationBody>,
) -> Result<Json<RecordObservationResponse>, ApiError> {
    let observation = NewObservation {
        timestamp: parse_timestamp(body.timestamp.as_deref())?,
        signals: SensorSignals {
            ble: body.ble,
            wifi: body.wifi,
            imu: body.imu,
            gps: body.gps,
        },
    };

    let stored = state.sensors().record(ticket_id, observation)?;

    state.audit().try_emit(AuditEvent::ObservationRecorded {
        ticket_id,
        observation_id: stored.id,
        signals: stored
            .signals
            .present()
            .into_iter()
            .map(String::from)
            .collect(),
    });

    Ok(Json(RecordObservationResponse { success: true }))
}

/// Observation history, oldest first
pub async fn list_observations(
    State(state): State<Arc<AppState>>,
    IdPath(ticket_id): IdPath,
) -> Result<Json<ListObservationsResponse>, ApiError> {
    let observations = state.sensors().list(ticket_id)?;
    Ok(Json(ListObservationsResponse { observations }))
}
