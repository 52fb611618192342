//! Registry of physical exit gates a car can be routed to.

mod registry;
mod sqlite;

pub use registry::{Gate, GateError, GateRegistry, DEFAULT_GATES};
pub use sqlite::SqliteGateRegistry;
