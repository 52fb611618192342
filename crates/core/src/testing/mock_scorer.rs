//! Mock gate scorer for testing.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::dispatch::GateScorer;
use crate::gate::Gate;
use crate::sensor::SensorState;

/// A recorded `score` call for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedScore {
    pub gate: String,
    /// Observations folded into the state the scorer saw.
    pub observation_count: usize,
}

/// Scorer returning fixed per-gate scores.
///
/// Scores are not clamped here; values above the maximum exercise the
/// engine's clamping.
pub struct MockScorer {
    scores: Mutex<HashMap<String, u8>>,
    default_score: u8,
    calls: Mutex<Vec<RecordedScore>>,
}

impl std::fmt::Debug for MockScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockScorer")
            .field("default_score", &self.default_score)
            .field("calls", &self.call_count())
            .finish()
    }
}

impl Default for MockScorer {
    fn default() -> Self {
        Self::new(0)
    }
}

impl MockScorer {
    /// Every gate scores `default_score` unless overridden.
    pub fn new(default_score: u8) -> Self {
        Self {
            scores: Mutex::new(HashMap::new()),
            default_score,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_score(self, gate: impl Into<String>, score: u8) -> Self {
        self.set_score(gate, score);
        self
    }

    /// Override one gate's score for subsequent calls.
    pub fn set_score(&self, gate: impl Into<String>, score: u8) {
        self.scores.lock().unwrap().insert(gate.into(), score);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn recorded_calls(&self) -> Vec<RecordedScore> {
        self.calls.lock().unwrap().clone()
    }
}

impl GateScorer for MockScorer {
    fn name(&self) -> &str {
        "mock"
    }

    fn score(&self, gate: &Gate, state: &SensorState) -> u8 {
        self.calls.lock().unwrap().push(RecordedScore {
            gate: gate.name.clone(),
            observation_count: state.observation_count,
        });
        self.scores
            .lock()
            .unwrap()
            .get(&gate.name)
            .copied()
            .unwrap_or(self.default_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(name: &str) -> Gate {
        Gate {
            id: 1,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_fixed_scores_and_default() {
        let scorer = MockScorer::new(10).with_score("B", 95);
        let state = SensorState::default();

        assert_eq!(scorer.score(&gate("A"), &state), 10);
        assert_eq!(scorer.score(&gate("B"), &state), 95);

        scorer.set_score("A", 50);
        assert_eq!(scorer.score(&gate("A"), &state), 50);
    }

    #[test]
    fn test_records_calls() {
        let scorer = MockScorer::default();
        scorer.score(&gate("C"), &SensorState::default());

        assert_eq!(scorer.call_count(), 1);
        assert_eq!(
            scorer.recorded_calls(),
            vec![RecordedScore {
                gate: "C".to_string(),
                observation_count: 0
            }]
        );
    }
}
