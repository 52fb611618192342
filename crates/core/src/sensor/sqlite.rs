use chrono::SubsecRound;
use rusqlite::params;
use serde_json::Value;

use super::{NewObservation, SensorError, SensorObservation, SensorSignals, SensorStore};
use crate::db::{self, format_timestamp, parse_timestamp, Database};
use crate::metrics;
use crate::ticket::fetch_ticket;

/// SQLite-backed observation history.
pub struct SqliteSensorStore {
    db: Database,
}

impl SqliteSensorStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

fn encode(value: &Option<Value>) -> Result<Option<String>, SensorError> {
    value
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| SensorError::Serialization(e.to_string()))
}

fn decode(column: usize, raw: Option<String>) -> rusqlite::Result<Option<Value>> {
    raw.map(|json| {
        serde_json::from_str(&json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
        })
    })
    .transpose()
}

fn row_to_observation(row: &rusqlite::Row) -> rusqlite::Result<SensorObservation> {
    Ok(SensorObservation {
        id: row.get(0)?,
        ticket_id: row.get(1)?,
        signals: SensorSignals {
            ble: decode(2, row.get(2)?)?,
            wifi: decode(3, row.get(3)?)?,
            imu: decode(4, row.get(4)?)?,
            gps: decode(5, row.get(5)?)?,
        },
        timestamp: parse_timestamp(&row.get::<_, String>(6)?)?,
    })
}

impl SensorStore for SqliteSensorStore {
    fn record(
        &self,
        ticket_id: i64,
        observation: NewObservation,
    ) -> Result<SensorObservation, SensorError> {
        let signals = observation.signals;
        let ble = encode(&signals.ble)?;
        let wifi = encode(&signals.wifi)?;
        let imu = encode(&signals.imu)?;
        let gps = encode(&signals.gps)?;

        let now = db::now();
        let timestamp = observation
            .timestamp
            .map(|ts| ts.trunc_subsecs(6))
            .unwrap_or(now);

        let mut conn = self.db.lock()?;
        let tx = conn.transaction()?;

        if fetch_ticket(&tx, ticket_id)?.is_none() {
            return Err(SensorError::TicketNotFound(ticket_id));
        }

        tx.execute(
            "INSERT INTO sensor_data (ticket_id, ble, wifi, imu, gps, timestamp) VALUES (?, ?, ?, ?, ?, ?)",
            params![ticket_id, ble, wifi, imu, gps, format_timestamp(&timestamp)],
        )?;
        let id = tx.last_insert_rowid();

        tx.execute(
            "UPDATE valet_tickets SET updated_at = ? WHERE id = ?",
            params![format_timestamp(&now), ticket_id],
        )?;
        tx.commit()?;

        metrics::OBSERVATIONS_RECORDED.inc();

        Ok(SensorObservation {
            id,
            ticket_id,
            signals,
            timestamp,
        })
    }

    fn list(&self, ticket_id: i64) -> Result<Vec<SensorObservation>, SensorError> {
        let conn = self.db.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, ticket_id, ble, wifi, imu, gps, timestamp FROM sensor_data WHERE ticket_id = ? ORDER BY timestamp ASC, id ASC",
        )?;
        let rows = stmt.query_map(params![ticket_id], row_to_observation)?;

        let mut observations = Vec::new();
        for row in rows {
            observations.push(row?);
        }
        Ok(observations)
    }
}
