//! Time-stamped positioning observations streamed in for a ticket.

mod sqlite;
mod store;
mod types;

pub use sqlite::SqliteSensorStore;
pub use store::{SensorError, SensorStore};
pub use types::{NewObservation, SensorObservation, SensorSignals, SensorState};
