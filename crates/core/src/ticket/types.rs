//! Core ticket data types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a valet ticket.
///
/// The lifecycle is linear: `Parked -> Requested -> Dispatched`.
/// There are no backward edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Car dropped off.
    Parked,
    /// Owner asked for the car; sensor data is streaming.
    Requested,
    /// A gate has been committed for this ticket.
    Dispatched,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 3] = [
        TicketStatus::Parked,
        TicketStatus::Requested,
        TicketStatus::Dispatched,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Parked => "parked",
            TicketStatus::Requested => "requested",
            TicketStatus::Dispatched => "dispatched",
        }
    }

    /// Returns true if `next` is a valid forward edge from this status.
    pub fn can_transition_to(&self, next: TicketStatus) -> bool {
        matches!(
            (self, next),
            (TicketStatus::Parked, TicketStatus::Requested)
                | (TicketStatus::Requested, TicketStatus::Dispatched)
        )
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parked" => Ok(TicketStatus::Parked),
            "requested" => Ok(TicketStatus::Requested),
            "dispatched" => Ok(TicketStatus::Dispatched),
            other => Err(format!("unknown ticket status: {}", other)),
        }
    }
}

/// One vehicle's valet session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    /// Owner of the car.
    pub user_id: String,
    /// Free-form vehicle description (e.g. "Red Civic").
    pub car_info: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of a status change request.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Ticket after the operation.
    pub ticket: Ticket,
    /// Status before the operation.
    pub previous: TicketStatus,
}

impl Transition {
    /// False when the request was an idempotent no-op.
    pub fn changed(&self) -> bool {
        self.previous != self.ticket.status
    }
}
