//! HTTP shell for the valet dispatch service.

pub mod api;
pub mod metrics;
pub mod state;
