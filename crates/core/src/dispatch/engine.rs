//! Inference: score every gate for a ticket and commit a dispatch at most once.

use std::sync::Arc;

use tracing::{debug, info};

use super::{
    score_gates, select_best, CommitOutcome, Dispatch, DispatchError, DispatchStore, GateScorer,
    InferenceOutcome, StatusUpdate,
};
use crate::audit::{AuditEvent, AuditHandle};
use crate::config::DispatchConfig;
use crate::gate::GateRegistry;
use crate::metrics;
use crate::sensor::{SensorState, SensorStore};
use crate::ticket::{TicketStatus, TicketStore};

/// Runs inference and operator status updates over the shared stores.
pub struct DispatchEngine {
    tickets: Arc<dyn TicketStore>,
    sensors: Arc<dyn SensorStore>,
    gates: Arc<dyn GateRegistry>,
    dispatches: Arc<dyn DispatchStore>,
    scorer: Arc<dyn GateScorer>,
    threshold: u8,
    audit: Option<AuditHandle>,
}

impl DispatchEngine {
    pub fn new(
        tickets: Arc<dyn TicketStore>,
        sensors: Arc<dyn SensorStore>,
        gates: Arc<dyn GateRegistry>,
        dispatches: Arc<dyn DispatchStore>,
        scorer: Arc<dyn GateScorer>,
        config: &DispatchConfig,
    ) -> Self {
        Self {
            tickets,
            sensors,
            gates,
            dispatches,
            scorer,
            threshold: config.confidence_threshold,
            audit: None,
        }
    }

    pub fn with_audit(mut self, audit: AuditHandle) -> Self {
        self.audit = Some(audit);
        self
    }

    fn emit(&self, event: AuditEvent) {
        if let Some(ref audit) = self.audit {
            audit.try_emit(event);
        }
    }

    /// Score all gates for `ticket_id` and dispatch the winner if it clears the threshold.
    ///
    /// Once a ticket has a dispatch, further runs only rescore: the existing
    /// dispatch is returned and nothing is written.
    pub fn run_inference(&self, ticket_id: i64) -> Result<InferenceOutcome, DispatchError> {
        if self.tickets.get(ticket_id)?.is_none() {
            return Err(DispatchError::TicketNotFound(ticket_id));
        }

        let gates = self.gates.list()?;
        if gates.is_empty() {
            return Err(DispatchError::NoGatesConfigured);
        }

        let observations = self.sensors.list(ticket_id)?;
        let state = SensorState::from_observations(&observations);
        let scores = score_gates(self.scorer.as_ref(), &gates, &state);
        let best = select_best(&scores)
            .cloned()
            .ok_or(DispatchError::NoGatesConfigured)?;

        debug!(
            ticket_id,
            scorer = self.scorer.name(),
            observations = state.observation_count,
            best_gate = %best.gate,
            best_score = best.score,
            "Scored gates: {:?}",
            scores
        );
        metrics::WINNING_SCORE.observe(f64::from(best.score));

        let (outcome, dispatch, created) = match self.dispatches.get_for_ticket(ticket_id)? {
            Some(existing) => ("already_dispatched", Some(existing), false),
            None if best.score <= self.threshold => ("below_threshold", None, false),
            None => match self.dispatches.commit(ticket_id, &best.gate, best.score)? {
                CommitOutcome::Created(dispatch) => {
                    self.on_dispatch_created(&dispatch);
                    ("dispatched", Some(dispatch), true)
                }
                CommitOutcome::AlreadyDispatched(existing) => {
                    ("already_dispatched", Some(existing), false)
                }
                CommitOutcome::TicketNotReady(status) => {
                    debug!(ticket_id, %status, "Ticket not awaiting retrieval, skipping dispatch");
                    ("not_requested", None, false)
                }
            },
        };

        metrics::INFERENCE_RUNS.with_label_values(&[outcome]).inc();
        self.emit(AuditEvent::InferenceCompleted {
            ticket_id,
            scorer: self.scorer.name().to_string(),
            best_gate: best.gate.clone(),
            best_score: best.score,
            dispatched: dispatch.is_some(),
        });

        Ok(InferenceOutcome {
            scores,
            best,
            dispatched: dispatch.is_some(),
            created,
            dispatch,
        })
    }

    fn on_dispatch_created(&self, dispatch: &Dispatch) {
        info!(
            dispatch_id = dispatch.id,
            ticket_id = dispatch.ticket_id,
            gate = %dispatch.gate,
            score = dispatch.score,
            "Dispatched ticket"
        );
        self.emit(AuditEvent::DispatchCreated {
            dispatch_id: dispatch.id,
            ticket_id: dispatch.ticket_id,
            gate: dispatch.gate.clone(),
            score: dispatch.score,
        });
        self.emit(AuditEvent::TicketStatusChanged {
            ticket_id: dispatch.ticket_id,
            from_status: TicketStatus::Requested.to_string(),
            to_status: TicketStatus::Dispatched.to_string(),
        });
    }

    /// Operator status change on an existing dispatch.
    pub fn update_status(&self, dispatch_id: i64, status: &str) -> Result<StatusUpdate, DispatchError> {
        let update = self.dispatches.set_status(dispatch_id, status)?;

        info!(
            dispatch_id,
            from = %update.previous_status,
            to = %update.dispatch.status,
            "Dispatch status updated"
        );
        self.emit(AuditEvent::DispatchStatusChanged {
            dispatch_id,
            ticket_id: update.dispatch.ticket_id,
            from_status: update.previous_status.clone(),
            to_status: update.dispatch.status.clone(),
        });

        Ok(update)
    }
}
