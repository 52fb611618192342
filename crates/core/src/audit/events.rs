use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audit event types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    // System events
    ServiceStarted {
        version: String,
        config_hash: String,
    },
    ServiceStopped {
        reason: String,
    },

    // Ticket lifecycle
    TicketCreated {
        ticket_id: i64,
        user_id: String,
        car_info: String,
    },
    TicketStatusChanged {
        ticket_id: i64,
        from_status: String,
        to_status: String,
    },

    // Sensor ingest
    ObservationRecorded {
        ticket_id: i64,
        observation_id: i64,
        /// Names of the payloads present in the reading.
        signals: Vec<String>,
    },

    // Dispatch
    InferenceCompleted {
        ticket_id: i64,
        scorer: String,
        best_gate: String,
        best_score: u8,
        dispatched: bool,
    },
    DispatchCreated {
        dispatch_id: i64,
        ticket_id: i64,
        gate: String,
        score: u8,
    },
    DispatchStatusChanged {
        dispatch_id: i64,
        ticket_id: i64,
        from_status: String,
        to_status: String,
    },
}

impl AuditEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ServiceStarted { .. } => "service_started",
            Self::ServiceStopped { .. } => "service_stopped",
            Self::TicketCreated { .. } => "ticket_created",
            Self::TicketStatusChanged { .. } => "ticket_status_changed",
            Self::ObservationRecorded { .. } => "observation_recorded",
            Self::InferenceCompleted { .. } => "inference_completed",
            Self::DispatchCreated { .. } => "dispatch_created",
            Self::DispatchStatusChanged { .. } => "dispatch_status_changed",
        }
    }

    pub fn ticket_id(&self) -> Option<i64> {
        match self {
            Self::TicketCreated { ticket_id, .. }
            | Self::TicketStatusChanged { ticket_id, .. }
            | Self::ObservationRecorded { ticket_id, .. }
            | Self::InferenceCompleted { ticket_id, .. }
            | Self::DispatchCreated { ticket_id, .. }
            | Self::DispatchStatusChanged { ticket_id, .. } => Some(*ticket_id),
            Self::ServiceStarted { .. } | Self::ServiceStopped { .. } => None,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::TicketCreated { user_id, .. } => Some(user_id),
            _ => None,
        }
    }
}

/// A stored audit record with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub ticket_id: Option<i64>,
    pub user_id: Option<String>,
    pub data: AuditEvent,
}
