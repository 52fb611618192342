//! Gate scoring.
//!
//! A scorer rates how well a gate fits a ticket's current sensor state.
//! The formula is replaceable; callers rely only on the `0..=MAX_SCORE`
//! range and the first-maximum tie-break in [`select_best`].

use std::sync::Arc;

use rand::Rng;
use serde_json::Value;

use super::GateScore;
use crate::config::ScorerKind;
use crate::gate::Gate;
use crate::sensor::SensorState;

/// Highest score a gate can get.
pub const MAX_SCORE: u8 = 99;

const RSSI_FLOOR: f64 = -100.0;
const RSSI_CEILING: f64 = -30.0;
const BLE_WEIGHT: f64 = 0.7;
const WIFI_WEIGHT: f64 = 0.3;

/// Rates a single gate against a ticket's sensor state.
pub trait GateScorer: Send + Sync {
    /// Name of this scorer for logging/audit.
    fn name(&self) -> &str;

    /// Score in `0..=MAX_SCORE`. Larger values are clamped by [`score_gates`].
    fn score(&self, gate: &Gate, state: &SensorState) -> u8;
}

/// Create the scorer selected by configuration.
pub fn create_scorer(kind: ScorerKind) -> Arc<dyn GateScorer> {
    match kind {
        ScorerKind::Signal => Arc::new(SignalScorer::new()),
        ScorerKind::Random => Arc::new(RandomScorer::new()),
    }
}

/// Score every gate, keeping registry order.
pub fn score_gates(scorer: &dyn GateScorer, gates: &[Gate], state: &SensorState) -> Vec<GateScore> {
    gates
        .iter()
        .map(|gate| GateScore {
            gate: gate.name.clone(),
            score: scorer.score(gate, state).min(MAX_SCORE),
        })
        .collect()
}

/// Highest score; on ties the earliest entry wins.
pub fn select_best(scores: &[GateScore]) -> Option<&GateScore> {
    let mut best: Option<&GateScore> = None;
    for candidate in scores {
        match best {
            Some(current) if candidate.score <= current.score => {}
            _ => best = Some(candidate),
        }
    }
    best
}

/// Deterministic scorer based on received signal strength.
///
/// Reads per-gate RSSI (dBm) from the `ble` and `wifi` payloads. Accepted shapes:
///
/// - `{"A": -52, "B": -80}`
/// - `{"A": {"rssi": -52}}`
/// - `[{"gate": "A", "rssi": -52}]`
/// - `{"beacons": [...]}` or `{"access_points": [...]}` wrapping the list form
///
/// RSSI maps linearly from [-100, -30] onto `0..=99`. BLE and Wi-Fi are
/// blended 70/30 when both are present. No signal for a gate scores 0.
#[derive(Debug, Default, Clone)]
pub struct SignalScorer;

impl SignalScorer {
    pub fn new() -> Self {
        Self
    }

    fn rssi_to_score(rssi: f64) -> f64 {
        let clamped = rssi.clamp(RSSI_FLOOR, RSSI_CEILING);
        (clamped - RSSI_FLOOR) / (RSSI_CEILING - RSSI_FLOOR) * f64::from(MAX_SCORE)
    }
}

fn rssi_from_list(entries: &[Value], gate: &str) -> Option<f64> {
    entries
        .iter()
        .filter(|entry| entry.get("gate").and_then(Value::as_str) == Some(gate))
        .filter_map(|entry| entry.get("rssi").and_then(Value::as_f64))
        .reduce(f64::max)
}

/// Strongest RSSI reported for `gate` in one payload.
fn rssi_for_gate(payload: &Value, gate: &str) -> Option<f64> {
    match payload {
        Value::Array(entries) => rssi_from_list(entries, gate),
        Value::Object(map) => {
            if let Some(value) = map.get(gate) {
                return value
                    .as_f64()
                    .or_else(|| value.get("rssi").and_then(Value::as_f64));
            }
            ["beacons", "access_points"]
                .iter()
                .filter_map(|key| map.get(*key).and_then(Value::as_array))
                .filter_map(|entries| rssi_from_list(entries, gate))
                .reduce(f64::max)
        }
        _ => None,
    }
}

impl GateScorer for SignalScorer {
    fn name(&self) -> &str {
        "signal"
    }

    fn score(&self, gate: &Gate, state: &SensorState) -> u8 {
        let ble = state
            .signals
            .ble
            .as_ref()
            .and_then(|p| rssi_for_gate(p, &gate.name))
            .map(Self::rssi_to_score);
        let wifi = state
            .signals
            .wifi
            .as_ref()
            .and_then(|p| rssi_for_gate(p, &gate.name))
            .map(Self::rssi_to_score);

        let blended = match (ble, wifi) {
            (Some(b), Some(w)) => b * BLE_WEIGHT + w * WIFI_WEIGHT,
            (Some(b), None) => b,
            (None, Some(w)) => w,
            (None, None) => 0.0,
        };

        blended.round().clamp(0.0, f64::from(MAX_SCORE)) as u8
    }
}

/// Uniform random score per call. Useful only for demos.
#[derive(Debug, Default, Clone)]
pub struct RandomScorer;

impl RandomScorer {
    pub fn new() -> Self {
        Self
    }
}

impl GateScorer for RandomScorer {
    fn name(&self) -> &str {
        "random"
    }

    fn score(&self, _gate: &Gate, _state: &SensorState) -> u8 {
        rand::thread_rng().gen_range(0..=MAX_SCORE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::SensorSignals;
    use serde_json::json;

    fn gate(id: i64, name: &str) -> Gate {
        Gate {
            id,
            name: name.to_string(),
        }
    }

    fn gates() -> Vec<Gate> {
        vec![gate(1, "A"), gate(2, "B"), gate(3, "C"), gate(4, "D")]
    }

    fn state(ble: Option<Value>, wifi: Option<Value>) -> SensorState {
        SensorState {
            signals: SensorSignals {
                ble,
                wifi,
                ..Default::default()
            },
            observation_count: 1,
            latest_timestamp: None,
        }
    }

    fn scores(values: &[(&str, u8)]) -> Vec<GateScore> {
        values
            .iter()
            .map(|(gate, score)| GateScore {
                gate: gate.to_string(),
                score: *score,
            })
            .collect()
    }

    struct Overshoot;

    impl GateScorer for Overshoot {
        fn name(&self) -> &str {
            "overshoot"
        }

        fn score(&self, _gate: &Gate, _state: &SensorState) -> u8 {
            250
        }
    }

    #[test]
    fn test_select_best_keeps_first_maximum() {
        let all = scores(&[("A", 40), ("B", 95), ("C", 95), ("D", 10)]);
        assert_eq!(select_best(&all).unwrap().gate, "B");
    }

    #[test]
    fn test_select_best_all_equal() {
        let all = scores(&[("A", 0), ("B", 0), ("C", 0)]);
        assert_eq!(select_best(&all).unwrap().gate, "A");
    }

    #[test]
    fn test_select_best_empty() {
        assert!(select_best(&[]).is_none());
    }

    #[test]
    fn test_score_gates_clamps_and_keeps_order() {
        let result = score_gates(&Overshoot, &gates(), &SensorState::default());
        let names: Vec<_> = result.iter().map(|s| s.gate.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "D"]);
        assert!(result.iter().all(|s| s.score == MAX_SCORE));
    }

    #[test]
    fn test_signal_scorer_map_payload() {
        let scorer = SignalScorer::new();
        let state = state(Some(json!({"A": -30, "B": -100, "C": -120})), None);

        assert_eq!(scorer.score(&gate(1, "A"), &state), 99);
        assert_eq!(scorer.score(&gate(2, "B"), &state), 0);
        assert_eq!(scorer.score(&gate(3, "C"), &state), 0);
        assert_eq!(scorer.score(&gate(4, "D"), &state), 0);
    }

    #[test]
    fn test_signal_scorer_nested_rssi() {
        let scorer = SignalScorer::new();
        let state = state(Some(json!({"A": {"rssi": -51}})), None);
        // 49 / 70 * 99 = 69.3
        assert_eq!(scorer.score(&gate(1, "A"), &state), 69);
    }

    #[test]
    fn test_signal_scorer_list_payload_uses_strongest() {
        let scorer = SignalScorer::new();
        let list = json!([
            {"gate": "B", "rssi": -90},
            {"gate": "B", "rssi": -30},
            {"gate": "C", "rssi": -60}
        ]);
        let state = state(None, Some(json!({"access_points": list})));

        assert_eq!(scorer.score(&gate(2, "B"), &state), 99);
        assert_eq!(scorer.score(&gate(1, "A"), &state), 0);
    }

    #[test]
    fn test_signal_scorer_blends_sources() {
        let scorer = SignalScorer::new();
        let state = state(Some(json!({"A": -30})), Some(json!({"A": -100})));
        // 99 * 0.7 + 0 * 0.3
        assert_eq!(scorer.score(&gate(1, "A"), &state), 69);
    }

    #[test]
    fn test_signal_scorer_ignores_unrelated_payloads() {
        let scorer = SignalScorer::new();
        let state = state(Some(json!("not a map")), Some(json!(42)));
        assert_eq!(scorer.score(&gate(1, "A"), &state), 0);
        assert_eq!(scorer.score(&gate(1, "A"), &SensorState::default()), 0);
    }

    #[test]
    fn test_random_scorer_in_range() {
        let scorer = RandomScorer::new();
        for _ in 0..200 {
            assert!(scorer.score(&gate(1, "A"), &SensorState::default()) <= MAX_SCORE);
        }
    }

    #[test]
    fn test_create_scorer() {
        assert_eq!(create_scorer(ScorerKind::Signal).name(), "signal");
        assert_eq!(create_scorer(ScorerKind::Random).name(), "random");
    }
}
