use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

use super::{CommitOutcome, Dispatch, DispatchError, DispatchStore, StatusUpdate, PENDING_STATUS};
use crate::db::{self, format_timestamp, parse_timestamp, Database};
use crate::metrics;
use crate::ticket::{apply_transition, fetch_ticket, record_transition, TicketStatus};

const DISPATCH_COLUMNS: &str = "id, ticket_id, gate, score, status, dispatched_at, updated_at";

/// SQLite-backed dispatch store.
pub struct SqliteDispatchStore {
    db: Database,
}

impl SqliteDispatchStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

fn row_to_dispatch(row: &rusqlite::Row) -> rusqlite::Result<Dispatch> {
    Ok(Dispatch {
        id: row.get(0)?,
        ticket_id: row.get(1)?,
        gate: row.get(2)?,
        score: row.get(3)?,
        status: row.get(4)?,
        dispatched_at: parse_timestamp(&row.get::<_, String>(5)?)?,
        updated_at: parse_timestamp(&row.get::<_, String>(6)?)?,
    })
}

fn fetch_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Dispatch>> {
    conn.query_row(
        &format!("SELECT {} FROM dispatches WHERE id = ?", DISPATCH_COLUMNS),
        params![id],
        row_to_dispatch,
    )
    .optional()
}

fn fetch_by_ticket(conn: &Connection, ticket_id: i64) -> rusqlite::Result<Option<Dispatch>> {
    conn.query_row(
        &format!("SELECT {} FROM dispatches WHERE ticket_id = ?", DISPATCH_COLUMNS),
        params![ticket_id],
        row_to_dispatch,
    )
    .optional()
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

impl DispatchStore for SqliteDispatchStore {
    fn get(&self, id: i64) -> Result<Option<Dispatch>, DispatchError> {
        let conn = self.db.lock()?;
        Ok(fetch_by_id(&conn, id)?)
    }

    fn get_for_ticket(&self, ticket_id: i64) -> Result<Option<Dispatch>, DispatchError> {
        let conn = self.db.lock()?;
        Ok(fetch_by_ticket(&conn, ticket_id)?)
    }

    fn list(&self) -> Result<Vec<Dispatch>, DispatchError> {
        let conn = self.db.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM dispatches ORDER BY id ASC",
            DISPATCH_COLUMNS
        ))?;
        let rows = stmt.query_map([], row_to_dispatch)?;

        let mut dispatches = Vec::new();
        for row in rows {
            dispatches.push(row?);
        }
        Ok(dispatches)
    }

    fn commit(
        &self,
        ticket_id: i64,
        gate: &str,
        score: u8,
    ) -> Result<CommitOutcome, DispatchError> {
        let mut conn = self.db.lock()?;
        let tx = conn.transaction()?;

        let ticket = fetch_ticket(&tx, ticket_id)?.ok_or(DispatchError::TicketNotFound(ticket_id))?;

        if let Some(existing) = fetch_by_ticket(&tx, ticket_id)? {
            return Ok(CommitOutcome::AlreadyDispatched(existing));
        }

        if ticket.status != TicketStatus::Requested {
            return Ok(CommitOutcome::TicketNotReady(ticket.status));
        }

        let now = db::now();
        let inserted = tx.execute(
            "INSERT INTO dispatches (ticket_id, gate, score, status, dispatched_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
            params![
                ticket_id,
                gate,
                score,
                PENDING_STATUS,
                format_timestamp(&now),
                format_timestamp(&now),
            ],
        );

        // Another writer on the same file got there first.
        if let Err(ref e) = inserted {
            if is_unique_violation(e) {
                drop(tx);
                let existing = fetch_by_ticket(&conn, ticket_id)?
                    .ok_or_else(|| DispatchError::Database(e.to_string()))?;
                return Ok(CommitOutcome::AlreadyDispatched(existing));
            }
        }
        inserted?;

        let dispatch = Dispatch {
            id: tx.last_insert_rowid(),
            ticket_id,
            gate: gate.to_string(),
            score,
            status: PENDING_STATUS.to_string(),
            dispatched_at: now,
            updated_at: now,
        };

        let transition = apply_transition(&tx, ticket, TicketStatus::Dispatched, now)?;
        tx.commit()?;

        record_transition(&transition);
        metrics::DISPATCHES_CREATED
            .with_label_values(&[dispatch.gate.as_str()])
            .inc();

        Ok(CommitOutcome::Created(dispatch))
    }

    fn set_status(&self, id: i64, status: &str) -> Result<StatusUpdate, DispatchError> {
        let status = status.trim();
        if status.is_empty() {
            return Err(DispatchError::Validation("status required".to_string()));
        }

        let conn = self.db.lock()?;
        let current = fetch_by_id(&conn, id)?.ok_or(DispatchError::NotFound(id))?;

        let now = db::now();
        conn.execute(
            "UPDATE dispatches SET status = ?, updated_at = ? WHERE id = ?",
            params![status, format_timestamp(&now), id],
        )?;

        metrics::DISPATCH_STATUS_UPDATES.inc();

        let previous_status = current.status.clone();
        Ok(StatusUpdate {
            dispatch: Dispatch {
                status: status.to_string(),
                updated_at: now,
                ..current
            },
            previous_status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticket::{CreateTicketRequest, SqliteTicketStore, TicketStore};

    struct Fixture {
        tickets: SqliteTicketStore,
        dispatches: SqliteDispatchStore,
    }

    fn setup() -> Fixture {
        let db = Database::in_memory().unwrap();
        Fixture {
            tickets: SqliteTicketStore::new(db.clone()),
            dispatches: SqliteDispatchStore::new(db),
        }
    }

    fn requested_ticket(fixture: &Fixture) -> i64 {
        let ticket = fixture
            .tickets
            .create(CreateTicketRequest::new("u1", "Red Civic"))
            .unwrap();
        fixture.tickets.request_retrieval(ticket.id).unwrap();
        ticket.id
    }

    #[test]
    fn test_unique_violation_ignores_other_constraints() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             CREATE TABLE parent (id INTEGER PRIMARY KEY);
             CREATE TABLE child (
                 key INTEGER NOT NULL UNIQUE,
                 parent_id INTEGER REFERENCES parent(id)
             );
             INSERT INTO child (key) VALUES (1);",
        )
        .unwrap();

        let duplicate = conn
            .execute("INSERT INTO child (key) VALUES (1)", [])
            .unwrap_err();
        assert!(is_unique_violation(&duplicate));

        let not_null = conn
            .execute("INSERT INTO child (key) VALUES (NULL)", [])
            .unwrap_err();
        assert!(!is_unique_violation(&not_null));

        let foreign_key = conn
            .execute("INSERT INTO child (key, parent_id) VALUES (2, 42)", [])
            .unwrap_err();
        assert!(!is_unique_violation(&foreign_key));
    }

    #[test]
    fn test_commit_creates_dispatch_and_advances_ticket() {
        let fixture = setup();
        let ticket_id = requested_ticket(&fixture);

        let outcome = fixture.dispatches.commit(ticket_id, "B", 95).unwrap();
        let dispatch = match outcome {
            CommitOutcome::Created(d) => d,
            other => panic!("expected Created, got {:?}", other),
        };

        assert_eq!(dispatch.ticket_id, ticket_id);
        assert_eq!(dispatch.gate, "B");
        assert_eq!(dispatch.score, 95);
        assert_eq!(dispatch.status, PENDING_STATUS);
        assert_eq!(dispatch.dispatched_at, dispatch.updated_at);

        let ticket = fixture.tickets.get(ticket_id).unwrap().unwrap();
        assert_eq!(ticket.status, TicketStatus::Dispatched);
        assert_eq!(ticket.updated_at, dispatch.dispatched_at);

        assert_eq!(fixture.dispatches.get_for_ticket(ticket_id).unwrap(), Some(dispatch));
    }

    #[test]
    fn test_second_commit_returns_existing() {
        let fixture = setup();
        let ticket_id = requested_ticket(&fixture);

        let first = fixture.dispatches.commit(ticket_id, "B", 95).unwrap();
        let second = fixture.dispatches.commit(ticket_id, "C", 98).unwrap();

        match (first, second) {
            (CommitOutcome::Created(a), CommitOutcome::AlreadyDispatched(b)) => assert_eq!(a, b),
            other => panic!("unexpected outcomes: {:?}", other),
        }
        assert_eq!(fixture.dispatches.list().unwrap().len(), 1);
    }

    #[test]
    fn test_commit_requires_requested_ticket() {
        let fixture = setup();
        let ticket = fixture
            .tickets
            .create(CreateTicketRequest::new("u1", "Red Civic"))
            .unwrap();

        let outcome = fixture.dispatches.commit(ticket.id, "A", 97).unwrap();
        assert_eq!(outcome, CommitOutcome::TicketNotReady(TicketStatus::Parked));
        assert!(fixture.dispatches.list().unwrap().is_empty());
        assert_eq!(
            fixture.tickets.get(ticket.id).unwrap().unwrap().status,
            TicketStatus::Parked
        );
    }

    #[test]
    fn test_commit_unknown_ticket() {
        let fixture = setup();
        let result = fixture.dispatches.commit(404, "A", 97);
        assert!(matches!(result, Err(DispatchError::TicketNotFound(404))));
    }

    #[test]
    fn test_unique_index_rejects_second_row() {
        let db = Database::in_memory().unwrap();
        let tickets = SqliteTicketStore::new(db.clone());
        let dispatches = SqliteDispatchStore::new(db.clone());
        let ticket = tickets.create(CreateTicketRequest::new("u1", "Red Civic")).unwrap();
        tickets.request_retrieval(ticket.id).unwrap();
        dispatches.commit(ticket.id, "A", 95).unwrap();

        let conn = db.lock().unwrap();
        let result = conn.execute(
            "INSERT INTO dispatches (ticket_id, gate, score, status, dispatched_at, updated_at) VALUES (?, 'B', 96, 'pending', 'x', 'x')",
            params![ticket.id],
        );
        assert!(is_unique_violation(&result.unwrap_err()));
    }

    #[test]
    fn test_set_status_stores_verbatim() {
        let fixture = setup();
        let ticket_id = requested_ticket(&fixture);
        let dispatch = match fixture.dispatches.commit(ticket_id, "D", 93).unwrap() {
            CommitOutcome::Created(d) => d,
            other => panic!("expected Created, got {:?}", other),
        };

        let update = fixture
            .dispatches
            .set_status(dispatch.id, "acknowledged")
            .unwrap();
        assert_eq!(update.previous_status, PENDING_STATUS);
        assert_eq!(update.dispatch.status, "acknowledged");
        assert!(update.dispatch.updated_at >= dispatch.updated_at);
        assert_eq!(update.dispatch.dispatched_at, dispatch.dispatched_at);

        let update = fixture
            .dispatches
            .set_status(dispatch.id, "Car at gate D, keys with Sam")
            .unwrap();
        assert_eq!(update.dispatch.status, "Car at gate D, keys with Sam");

        let stored = fixture.dispatches.get(dispatch.id).unwrap().unwrap();
        assert_eq!(stored.status, "Car at gate D, keys with Sam");
    }

    #[test]
    fn test_set_status_unknown_dispatch() {
        let fixture = setup();
        let result = fixture.dispatches.set_status(12, "completed");
        assert!(matches!(result, Err(DispatchError::NotFound(12))));
    }

    #[test]
    fn test_set_status_rejects_blank() {
        let fixture = setup();
        let ticket_id = requested_ticket(&fixture);
        let dispatch = match fixture.dispatches.commit(ticket_id, "A", 91).unwrap() {
            CommitOutcome::Created(d) => d,
            other => panic!("expected Created, got {:?}", other),
        };

        let result = fixture.dispatches.set_status(dispatch.id, "  ");
        assert!(matches!(result, Err(DispatchError::Validation(_))));
        assert_eq!(
            fixture.dispatches.get(dispatch.id).unwrap().unwrap().status,
            PENDING_STATUS
        );
    }
}
