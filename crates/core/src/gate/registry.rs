use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::DatabaseError;

/// Gates seeded into an empty registry when none are configured.
pub const DEFAULT_GATES: [&str; 4] = ["A", "B", "C", "D"];

#[derive(Debug, Error)]
pub enum GateError {
    #[error("Database error: {0}")]
    Database(String),
}

impl From<DatabaseError> for GateError {
    fn from(e: DatabaseError) -> Self {
        GateError::Database(e.to_string())
    }
}

impl From<rusqlite::Error> for GateError {
    fn from(e: rusqlite::Error) -> Self {
        GateError::Database(e.to_string())
    }
}

/// A named exit gate. Immutable once seeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gate {
    pub id: i64,
    pub name: String,
}

/// Read-mostly gate storage.
pub trait GateRegistry: Send + Sync {
    /// All gates in registry order.
    fn list(&self) -> Result<Vec<Gate>, GateError>;

    /// Insert `names` in order if the registry is empty.
    /// Returns how many gates were inserted (0 when already seeded).
    fn seed_defaults(&self, names: &[String]) -> Result<usize, GateError>;
}
