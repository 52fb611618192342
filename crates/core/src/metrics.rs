//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Ticket lifecycle (creations, status transitions)
//! - Sensor ingest
//! - Dispatch engine (inference runs, winning scores, dispatches)

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Tickets
// =============================================================================

/// Tickets created total.
pub static TICKETS_CREATED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("valet_tickets_created_total", "Total valet tickets created").unwrap()
});

/// Ticket status transitions by edge.
pub static TICKET_STATUS_TRANSITIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "valet_ticket_status_transitions_total",
            "Total ticket status transitions",
        ),
        &["from_status", "to_status"],
    )
    .unwrap()
});

// =============================================================================
// Sensor ingest
// =============================================================================

/// Observations recorded total.
pub static OBSERVATIONS_RECORDED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "valet_observations_recorded_total",
        "Total sensor observations recorded",
    )
    .unwrap()
});

// =============================================================================
// Dispatch
// =============================================================================

/// Inference runs by outcome.
pub static INFERENCE_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("valet_inference_runs_total", "Total inference runs"),
        &["outcome"], // "dispatched", "already_dispatched", "below_threshold", "not_requested"
    )
    .unwrap()
});

/// Winning gate score per inference run.
pub static WINNING_SCORE: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "valet_winning_score",
            "Distribution of the best gate score per inference",
        )
        .buckets(vec![10.0, 25.0, 50.0, 75.0, 85.0, 90.0, 95.0, 99.0]),
    )
    .unwrap()
});

/// Dispatches created by gate.
pub static DISPATCHES_CREATED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("valet_dispatches_created_total", "Total dispatches created"),
        &["gate"],
    )
    .unwrap()
});

/// Operator status updates on dispatches.
pub static DISPATCH_STATUS_UPDATES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "valet_dispatch_status_updates_total",
        "Total dispatch status updates",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(TICKETS_CREATED.clone()),
        Box::new(TICKET_STATUS_TRANSITIONS.clone()),
        Box::new(OBSERVATIONS_RECORDED.clone()),
        Box::new(INFERENCE_RUNS.clone()),
        Box::new(WINNING_SCORE.clone()),
        Box::new(DISPATCHES_CREATED.clone()),
        Box::new(DISPATCH_STATUS_UPDATES.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_metrics_register() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }

        INFERENCE_RUNS.with_label_values(&["below_threshold"]).inc();
        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.contains(&"valet_inference_runs_total".to_string()));
    }
}
