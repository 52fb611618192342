pub mod audit;
pub mod dispatches;
pub mod error;
pub mod gates;
pub mod handlers;
pub mod inference;
pub mod middleware;
pub mod routes;
pub mod sensors;
pub mod tickets;

pub use error::{ApiError, ApiJson, IdPath, OptionalJson};
pub use routes::create_router;
