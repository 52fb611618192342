use thiserror::Error;

use super::{NewObservation, SensorObservation};
use crate::db::DatabaseError;

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("Ticket not found: {0}")]
    TicketNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<DatabaseError> for SensorError {
    fn from(e: DatabaseError) -> Self {
        SensorError::Database(e.to_string())
    }
}

impl From<rusqlite::Error> for SensorError {
    fn from(e: rusqlite::Error) -> Self {
        SensorError::Database(e.to_string())
    }
}

/// Append-only observation history per ticket.
pub trait SensorStore: Send + Sync {
    /// Append an observation and refresh the ticket's `updated_at`.
    ///
    /// Fails with [`SensorError::TicketNotFound`] and writes nothing if the
    /// ticket does not exist. Never changes ticket status.
    fn record(&self, ticket_id: i64, observation: NewObservation)
        -> Result<SensorObservation, SensorError>;

    /// Observations for a ticket, oldest first. Unknown tickets yield an empty list.
    fn list(&self, ticket_id: i64) -> Result<Vec<SensorObservation>, SensorError>;
}
