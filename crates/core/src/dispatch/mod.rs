//! Gate dispatch: scoring, the commit-once decision, and operator status updates.

mod engine;
mod scoring;
mod sqlite;
mod store;
mod types;

pub use engine::DispatchEngine;
pub use scoring::{
    create_scorer, score_gates, select_best, GateScorer, RandomScorer, SignalScorer, MAX_SCORE,
};
pub use sqlite::SqliteDispatchStore;
pub use store::{DispatchError, DispatchStore};
pub use types::{
    CommitOutcome, Dispatch, GateScore, InferenceOutcome, StatusUpdate, PENDING_STATUS,
};
