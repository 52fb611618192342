//! SQLite-backed ticket store implementation.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{CreateTicketRequest, Ticket, TicketError, TicketFilter, TicketStatus, TicketStore, Transition};
use crate::db::{self, format_timestamp, parse_timestamp, Database};
use crate::metrics;

const TICKET_COLUMNS: &str = "id, user_id, car_info, status, created_at, updated_at";

/// SQLite-backed ticket store.
pub struct SqliteTicketStore {
    db: Database,
}

impl SqliteTicketStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn build_where_clause(filter: &TicketFilter) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(status) = filter.status {
            conditions.push("status = ?");
            params.push(Box::new(status.as_str()));
        }

        if let Some(ref user_id) = filter.user_id {
            conditions.push("user_id = ?");
            params.push(Box::new(user_id.clone()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (where_clause, params)
    }
}

fn row_to_ticket(row: &rusqlite::Row) -> rusqlite::Result<Ticket> {
    let status_str: String = row.get(3)?;
    let status = status_str.parse::<TicketStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, e.into())
    })?;

    Ok(Ticket {
        id: row.get(0)?,
        user_id: row.get(1)?,
        car_info: row.get(2)?,
        status,
        created_at: parse_timestamp(&row.get::<_, String>(4)?)?,
        updated_at: parse_timestamp(&row.get::<_, String>(5)?)?,
    })
}

/// Load a ticket using an already-locked connection.
pub(crate) fn fetch_ticket(conn: &Connection, id: i64) -> rusqlite::Result<Option<Ticket>> {
    conn.query_row(
        &format!("SELECT {} FROM valet_tickets WHERE id = ?", TICKET_COLUMNS),
        params![id],
        row_to_ticket,
    )
    .optional()
}

/// Move `ticket` to `next`, rejecting anything but a forward edge.
///
/// Runs on the caller's connection so it can join a wider transaction. The
/// caller reports the change through [`record_transition`] once it is durable.
pub(crate) fn apply_transition(
    conn: &Connection,
    ticket: Ticket,
    next: TicketStatus,
    now: DateTime<Utc>,
) -> Result<Transition, TicketError> {
    let previous = ticket.status;
    if !previous.can_transition_to(next) {
        return Err(TicketError::InvalidState {
            ticket_id: ticket.id,
            current_status: previous,
            operation: format!("move to {}", next),
        });
    }

    conn.execute(
        "UPDATE valet_tickets SET status = ?, updated_at = ? WHERE id = ?",
        params![next.as_str(), format_timestamp(&now), ticket.id],
    )?;

    Ok(Transition {
        ticket: Ticket {
            status: next,
            updated_at: now,
            ..ticket
        },
        previous,
    })
}

/// Count a committed status change.
pub(crate) fn record_transition(transition: &Transition) {
    if transition.changed() {
        metrics::TICKET_STATUS_TRANSITIONS
            .with_label_values(&[
                transition.previous.as_str(),
                transition.ticket.status.as_str(),
            ])
            .inc();
    }
}

impl TicketStore for SqliteTicketStore {
    fn create(&self, request: CreateTicketRequest) -> Result<Ticket, TicketError> {
        request.validate()?;

        let conn = self.db.lock()?;
        let now = db::now();
        let status = TicketStatus::Parked;

        conn.execute(
            "INSERT INTO valet_tickets (user_id, car_info, status, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
            params![
                request.user_id,
                request.car_info,
                status.as_str(),
                format_timestamp(&now),
                format_timestamp(&now),
            ],
        )?;

        metrics::TICKETS_CREATED.inc();

        Ok(Ticket {
            id: conn.last_insert_rowid(),
            user_id: request.user_id,
            car_info: request.car_info,
            status,
            created_at: now,
            updated_at: now,
        })
    }

    fn get(&self, id: i64) -> Result<Option<Ticket>, TicketError> {
        let conn = self.db.lock()?;
        Ok(fetch_ticket(&conn, id)?)
    }

    fn list(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, TicketError> {
        let conn = self.db.lock()?;

        let (where_clause, params) = Self::build_where_clause(filter);
        let sql = format!(
            "SELECT {} FROM valet_tickets {} ORDER BY id ASC",
            TICKET_COLUMNS, where_clause
        );

        let mut stmt = conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let rows = stmt.query_map(param_refs.as_slice(), row_to_ticket)?;

        let mut tickets = Vec::new();
        for row_result in rows {
            tickets.push(row_result?);
        }

        Ok(tickets)
    }

    fn count(&self, filter: &TicketFilter) -> Result<i64, TicketError> {
        let conn = self.db.lock()?;

        let (where_clause, params) = Self::build_where_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM valet_tickets {}", where_clause);
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        Ok(conn.query_row(&sql, param_refs.as_slice(), |row| row.get(0))?)
    }

    fn request_retrieval(&self, id: i64) -> Result<Transition, TicketError> {
        let conn = self.db.lock()?;

        let ticket = fetch_ticket(&conn, id)?.ok_or(TicketError::NotFound(id))?;

        match ticket.status {
            TicketStatus::Parked => {
                let transition =
                    apply_transition(&conn, ticket, TicketStatus::Requested, db::now())?;
                record_transition(&transition);
                Ok(transition)
            }
            TicketStatus::Requested => Ok(Transition {
                previous: ticket.status,
                ticket,
            }),
            TicketStatus::Dispatched => Err(TicketError::InvalidState {
                ticket_id: id,
                current_status: ticket.status,
                operation: "request retrieval for".to_string(),
            }),
        }
    }
}
