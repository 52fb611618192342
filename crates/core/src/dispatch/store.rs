use thiserror::Error;

use super::{CommitOutcome, Dispatch, StatusUpdate};
use crate::db::DatabaseError;
use crate::gate::GateError;
use crate::sensor::SensorError;
use crate::ticket::TicketError;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Ticket not found: {0}")]
    TicketNotFound(i64),

    #[error("Dispatch not found: {0}")]
    NotFound(i64),

    #[error("No gates registered")]
    NoGatesConfigured,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<DatabaseError> for DispatchError {
    fn from(e: DatabaseError) -> Self {
        DispatchError::Database(e.to_string())
    }
}

impl From<rusqlite::Error> for DispatchError {
    fn from(e: rusqlite::Error) -> Self {
        DispatchError::Database(e.to_string())
    }
}

impl From<TicketError> for DispatchError {
    fn from(e: TicketError) -> Self {
        match e {
            TicketError::NotFound(id) => DispatchError::TicketNotFound(id),
            TicketError::Validation(msg) => DispatchError::Validation(msg),
            e @ TicketError::InvalidState { .. } => DispatchError::InvalidState(e.to_string()),
            TicketError::Database(msg) => DispatchError::Database(msg),
        }
    }
}

impl From<SensorError> for DispatchError {
    fn from(e: SensorError) -> Self {
        match e {
            SensorError::TicketNotFound(id) => DispatchError::TicketNotFound(id),
            other => DispatchError::Database(other.to_string()),
        }
    }
}

impl From<GateError> for DispatchError {
    fn from(e: GateError) -> Self {
        match e {
            GateError::Database(msg) => DispatchError::Database(msg),
        }
    }
}

/// Storage for dispatch records.
pub trait DispatchStore: Send + Sync {
    fn get(&self, id: i64) -> Result<Option<Dispatch>, DispatchError>;

    fn get_for_ticket(&self, ticket_id: i64) -> Result<Option<Dispatch>, DispatchError>;

    /// All dispatches in id order.
    fn list(&self) -> Result<Vec<Dispatch>, DispatchError>;

    /// Atomically create the ticket's dispatch and move the ticket to `dispatched`.
    ///
    /// The existence check, the insert and the ticket transition happen as one
    /// unit, so concurrent callers for the same ticket get at most one
    /// [`CommitOutcome::Created`].
    fn commit(&self, ticket_id: i64, gate: &str, score: u8)
        -> Result<CommitOutcome, DispatchError>;

    /// Operator status change. Any non-blank status is stored verbatim.
    fn set_status(&self, id: i64, status: &str) -> Result<StatusUpdate, DispatchError>;
}
