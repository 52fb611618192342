//! Testing utilities and mock implementations.
//!
//! # Example
//!
//! ```rust,ignore
//! use valet_core::testing::MockScorer;
//!
//! // Gate "B" wins with 95, everything else scores 10
//! let scorer = MockScorer::new(10).with_score("B", 95);
//!
//! // Use in DispatchEngine / AppState...
//! assert_eq!(scorer.call_count(), 0);
//! ```

mod mock_scorer;

pub use mock_scorer::{MockScorer, RecordedScore};

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::{json, Value};

    use crate::sensor::{NewObservation, SensorSignals};

    /// RSSI map payload, e.g. `{"A": -40, "B": -75}`.
    pub fn rssi_map(readings: &[(&str, i64)]) -> Value {
        let map: serde_json::Map<String, Value> = readings
            .iter()
            .map(|(gate, rssi)| (gate.to_string(), json!(rssi)))
            .collect();
        Value::Object(map)
    }

    /// A location-only reading taken now.
    pub fn gps_observation() -> NewObservation {
        NewObservation {
            signals: SensorSignals {
                gps: Some(json!({"lat": 1, "lon": 2})),
                ..Default::default()
            },
            timestamp: None,
        }
    }

    /// A beacon reading taken now.
    pub fn ble_observation(readings: &[(&str, i64)]) -> NewObservation {
        NewObservation {
            signals: SensorSignals {
                ble: Some(rssi_map(readings)),
                ..Default::default()
            },
            timestamp: None,
        }
    }
}
