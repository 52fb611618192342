use rusqlite::params;

use super::{Gate, GateError, GateRegistry};
use crate::db::Database;

/// SQLite-backed gate registry.
pub struct SqliteGateRegistry {
    db: Database,
}

impl SqliteGateRegistry {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl GateRegistry for SqliteGateRegistry {
    fn list(&self) -> Result<Vec<Gate>, GateError> {
        let conn = self.db.lock()?;
        let mut stmt = conn.prepare("SELECT id, name FROM gates ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok(Gate {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;

        let mut gates = Vec::new();
        for row in rows {
            gates.push(row?);
        }
        Ok(gates)
    }

    fn seed_defaults(&self, names: &[String]) -> Result<usize, GateError> {
        let mut conn = self.db.lock()?;
        let tx = conn.transaction()?;

        let count: i64 = tx.query_row("SELECT COUNT(*) FROM gates", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(0);
        }

        for name in names {
            tx.execute("INSERT INTO gates (name) VALUES (?)", params![name])?;
        }
        tx.commit()?;

        tracing::info!(gates = ?names, "Seeded gate registry");
        Ok(names.len())
    }
}
