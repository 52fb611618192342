use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The four optional signal payloads of one reading.
///
/// Payloads are opaque JSON; only the scorer interprets them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorSignals {
    /// Proximity beacon data.
    #[serde(default)]
    pub ble: Option<Value>,
    /// Wireless network data.
    #[serde(default)]
    pub wifi: Option<Value>,
    /// Motion (inertial) data.
    #[serde(default)]
    pub imu: Option<Value>,
    /// Satellite location data.
    #[serde(default)]
    pub gps: Option<Value>,
}

impl SensorSignals {
    /// Names of the payloads that are present.
    pub fn present(&self) -> Vec<&'static str> {
        [
            ("ble", &self.ble),
            ("wifi", &self.wifi),
            ("imu", &self.imu),
            ("gps", &self.gps),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_some())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.present().is_empty()
    }
}

/// An observation about to be recorded.
#[derive(Debug, Clone, Default)]
pub struct NewObservation {
    pub signals: SensorSignals,
    /// Reading time; defaults to the time of recording.
    pub timestamp: Option<DateTime<Utc>>,
}

/// A stored observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorObservation {
    pub id: i64,
    pub ticket_id: i64,
    #[serde(flatten)]
    pub signals: SensorSignals,
    pub timestamp: DateTime<Utc>,
}

/// Latest known sensor state of a ticket, as fed to the gate scorer.
///
/// Each payload holds the most recent non-null value seen in timestamp
/// order, so a stream of partial readings still yields a full picture.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SensorState {
    pub signals: SensorSignals,
    pub observation_count: usize,
    pub latest_timestamp: Option<DateTime<Utc>>,
}

impl SensorState {
    pub fn from_observations(observations: &[SensorObservation]) -> Self {
        let mut ordered: Vec<&SensorObservation> = observations.iter().collect();
        ordered.sort_by_key(|o| (o.timestamp, o.id));

        let mut state = SensorState::default();
        for observation in ordered {
            let signals = &observation.signals;
            if signals.ble.is_some() {
                state.signals.ble = signals.ble.clone();
            }
            if signals.wifi.is_some() {
                state.signals.wifi = signals.wifi.clone();
            }
            if signals.imu.is_some() {
                state.signals.imu = signals.imu.clone();
            }
            if signals.gps.is_some() {
                state.signals.gps = signals.gps.clone();
            }
            state.observation_count += 1;
            state.latest_timestamp = Some(observation.timestamp);
        }
        state
    }
}
