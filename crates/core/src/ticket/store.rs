//! Ticket storage trait and types.

use thiserror::Error;

use crate::db::DatabaseError;
use crate::ticket::{Ticket, TicketStatus, Transition};

/// Error type for ticket operations.
#[derive(Debug, Error)]
pub enum TicketError {
    /// Required input missing or malformed.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Ticket not found.
    #[error("Ticket not found: {0}")]
    NotFound(i64),

    /// Cannot perform operation due to current status.
    #[error("Cannot {operation} ticket {ticket_id}: current status is {current_status}")]
    InvalidState {
        ticket_id: i64,
        current_status: TicketStatus,
        operation: String,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl From<DatabaseError> for TicketError {
    fn from(e: DatabaseError) -> Self {
        TicketError::Database(e.to_string())
    }
}

impl From<rusqlite::Error> for TicketError {
    fn from(e: rusqlite::Error) -> Self {
        TicketError::Database(e.to_string())
    }
}

/// Request to create a new ticket (car drop-off).
#[derive(Debug, Clone)]
pub struct CreateTicketRequest {
    /// Owner of the car.
    pub user_id: String,
    /// Vehicle description.
    pub car_info: String,
}

impl CreateTicketRequest {
    pub fn new(user_id: impl Into<String>, car_info: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            car_info: car_info.into(),
        }
    }

    /// Both fields are required and must not be blank.
    pub fn validate(&self) -> Result<(), TicketError> {
        if self.user_id.trim().is_empty() || self.car_info.trim().is_empty() {
            return Err(TicketError::Validation(
                "userId and carInfo required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Filter for querying tickets.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    /// Filter by status.
    pub status: Option<TicketStatus>,
    /// Filter by owner.
    pub user_id: Option<String>,
}

impl TicketFilter {
    /// Create a filter that matches every ticket.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by status.
    pub fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Filter by owner.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// Trait for ticket storage backends.
pub trait TicketStore: Send + Sync {
    /// Create a new ticket in `parked` status.
    fn create(&self, request: CreateTicketRequest) -> Result<Ticket, TicketError>;

    /// Get a ticket by ID.
    fn get(&self, id: i64) -> Result<Option<Ticket>, TicketError>;

    /// List tickets matching the filter, oldest first.
    fn list(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, TicketError>;

    /// Count tickets matching the filter.
    fn count(&self, filter: &TicketFilter) -> Result<i64, TicketError>;

    /// Owner asks for the car: `parked -> requested`.
    ///
    /// Already `requested` is a no-op; `dispatched` is rejected with
    /// [`TicketError::InvalidState`].
    fn request_retrieval(&self, id: i64) -> Result<Transition, TicketError>;
}
