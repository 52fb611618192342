use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{audit, dispatches, gates, handlers, inference, sensors, tickets};
use super::middleware::metrics_middleware;
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/config", get(handlers::get_config))
        // Audit
        .route("/audit", get(audit::query_audit))
        // Gates
        .route("/gates", get(gates::list_gates))
        // Tickets
        .route(
            "/tickets",
            post(tickets::create_ticket).get(tickets::list_tickets),
        )
        .route("/tickets/{id}", get(tickets::get_ticket))
        .route("/tickets/{id}/request", post(tickets::request_retrieval))
        // Sensor ingest
        .route(
            "/tickets/{id}/sensor",
            post(sensors::record_observation).get(sensors::list_observations),
        )
        // Dispatch
        .route("/tickets/{id}/infer", post(inference::run_inference))
        .route("/dispatches", get(dispatches::list_dispatches))
        .route("/dispatches/{id}/status", post(dispatches::update_status));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::get_metrics))
        .nest("/api", api_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
