//! Valet tickets and their status lifecycle.

mod sqlite_store;
mod store;
mod types;

pub(crate) use sqlite_store::{apply_transition, fetch_ticket, record_transition};
pub use sqlite_store::SqliteTicketStore;
pub use store::{CreateTicketRequest, TicketError, TicketFilter, TicketStore};
pub use types::{Ticket, TicketStatus, Transition};
