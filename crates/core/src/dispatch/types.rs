use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ticket::TicketStatus;

/// Status given to a freshly committed dispatch.
pub const PENDING_STATUS: &str = "pending";

/// The committed decision routing one ticket to one gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispatch {
    pub id: i64,
    pub ticket_id: i64,
    /// Name of the chosen gate.
    pub gate: String,
    /// Winning score at commit time.
    pub score: u8,
    /// Operator-managed status, stored verbatim.
    pub status: String,
    pub dispatched_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fitness of one gate for a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateScore {
    pub gate: String,
    pub score: u8,
}

/// What the atomic commit step decided.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    /// A new dispatch was inserted and the ticket moved to `dispatched`.
    Created(Dispatch),
    /// Another dispatch already owns this ticket; nothing was written.
    AlreadyDispatched(Dispatch),
    /// The ticket is not in `requested`; nothing was written.
    TicketNotReady(TicketStatus),
}

/// Result of an inference run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferenceOutcome {
    /// Per-gate scores in registry order.
    pub scores: Vec<GateScore>,
    /// Winning gate (first maximum in registry order).
    pub best: GateScore,
    /// Whether a dispatch is now associated with the ticket.
    pub dispatched: bool,
    /// Whether this run created that dispatch.
    pub created: bool,
    pub dispatch: Option<Dispatch>,
}

/// Result of an operator status update.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    pub dispatch: Dispatch,
    pub previous_status: String,
}
