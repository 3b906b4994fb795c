use crate::errors::{AppError, AppResult};
use crate::models::{NewTimeEntry, Ticket, TicketTimerFlag, TimeEntry};
use crate::utils::time::parse_timestamp;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};
use uuid::Uuid;

fn conversion_error(col: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(col, rusqlite::types::Type::Text, Box::new(err))
}

fn timestamp_col(row: &Row, name: &str, idx: usize) -> Result<DateTime<Utc>> {
    let raw: String = row.get(name)?;
    parse_timestamp(&raw)
        .ok_or_else(|| conversion_error(idx, AppError::Persistence(format!("bad timestamp '{}'", raw))))
}

pub fn map_flag(row: &Row) -> Result<TicketTimerFlag> {
    let started: Option<String> = row.get("timer_started_at")?;
    let timer_started_at = match started {
        Some(s) => Some(parse_timestamp(&s).ok_or_else(|| {
            conversion_error(4, AppError::Persistence(format!("bad timestamp '{}'", s)))
        })?),
        None => None,
    };

    Ok(TicketTimerFlag {
        ticket_id: row.get("id")?,
        timer_is_running: row.get::<_, i32>("timer_is_running")? == 1,
        timer_started_at,
        total_minutes_accumulated: row.get("total_minutes")?,
    })
}

pub fn map_entry(row: &Row) -> Result<TimeEntry> {
    let sid: String = row.get("session_id")?;
    let session_id = Uuid::parse_str(&sid).map_err(|_| {
        conversion_error(6, AppError::Persistence(format!("bad session id '{}'", sid)))
    })?;

    Ok(TimeEntry {
        id: row.get("id")?,
        ticket_id: row.get("ticket_id")?,
        duration_minutes: row.get("duration_minutes")?,
        description: row.get("description")?,
        created_by: row.get("created_by")?,
        created_at: timestamp_col(row, "created_at", 5)?,
        session_id,
    })
}

// ---------------------------
// Tickets
// ---------------------------

/// Insert a ticket, or refresh its display data when it already exists.
/// Timer columns are never touched here.
pub fn upsert_ticket(conn: &Connection, ticket: &Ticket) -> AppResult<()> {
    conn.execute(
        "INSERT INTO tickets (id, ticket_number, customer_name)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET
            ticket_number = COALESCE(excluded.ticket_number, tickets.ticket_number),
            customer_name = COALESCE(excluded.customer_name, tickets.customer_name)",
        params![ticket.id, ticket.ticket_number, ticket.customer_name],
    )?;
    Ok(())
}

pub fn load_ticket(conn: &Connection, id: &str) -> AppResult<Option<Ticket>> {
    let ticket = conn
        .query_row(
            "SELECT id, ticket_number, customer_name FROM tickets WHERE id = ?1",
            [id],
            |row| {
                Ok(Ticket {
                    id: row.get(0)?,
                    ticket_number: row.get(1)?,
                    customer_name: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(ticket)
}

pub fn load_flag(conn: &Connection, id: &str) -> AppResult<TicketTimerFlag> {
    conn.query_row(
        "SELECT id, timer_is_running, timer_started_at, total_minutes FROM tickets WHERE id = ?1",
        [id],
        map_flag,
    )
    .optional()?
    .ok_or_else(|| AppError::TicketNotFound(id.to_string()))
}

pub fn update_flag(
    conn: &Connection,
    id: &str,
    running: bool,
    started_at: Option<DateTime<Utc>>,
) -> AppResult<()> {
    let changed = conn.execute(
        "UPDATE tickets SET timer_is_running = ?1, timer_started_at = ?2 WHERE id = ?3",
        params![
            if running { 1 } else { 0 },
            started_at.map(|t| t.to_rfc3339()),
            id
        ],
    )?;
    if changed == 0 {
        return Err(AppError::TicketNotFound(id.to_string()));
    }
    Ok(())
}

/// Clear the flag only while it still carries `flagged_at` (any running
/// flag when `None`). Returns whether the flag was cleared.
pub fn release_flag(
    conn: &Connection,
    id: &str,
    flagged_at: Option<DateTime<Utc>>,
) -> AppResult<bool> {
    let changed = conn.execute(
        "UPDATE tickets SET timer_is_running = 0, timer_started_at = NULL
         WHERE id = ?1
           AND timer_is_running = 1
           AND (?2 IS NULL OR timer_started_at = ?2)",
        params![id, flagged_at.map(|t| t.to_rfc3339())],
    )?;
    Ok(changed > 0)
}

/// Tickets whose server flag is set.
pub fn load_running_flags(conn: &Connection) -> AppResult<Vec<TicketTimerFlag>> {
    let mut stmt = conn.prepare(
        "SELECT id, timer_is_running, timer_started_at, total_minutes
         FROM tickets WHERE timer_is_running = 1 ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([], map_flag)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

// ---------------------------
// Time entries
// ---------------------------

pub fn find_entry_by_session(conn: &Connection, session_id: &Uuid) -> AppResult<Option<TimeEntry>> {
    let entry = conn
        .query_row(
            "SELECT * FROM time_entries WHERE session_id = ?1",
            [session_id.to_string()],
            map_entry,
        )
        .optional()?;
    Ok(entry)
}

/// Insert the entry and add its minutes to the ticket total.
/// A session already committed returns the stored entry unchanged.
pub fn insert_entry(conn: &Connection, e: &NewTimeEntry) -> AppResult<TimeEntry> {
    if let Some(existing) = find_entry_by_session(conn, &e.session_id)? {
        return Ok(existing);
    }

    load_flag(conn, &e.ticket_id)?;

    conn.execute(
        "INSERT INTO time_entries (ticket_id, duration_minutes, description, created_by, created_at, session_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            e.ticket_id,
            e.duration_minutes,
            e.description,
            e.created_by,
            e.created_at.to_rfc3339(),
            e.session_id.to_string(),
        ],
    )?;
    let id = conn.last_insert_rowid();

    conn.execute(
        "UPDATE tickets SET total_minutes = total_minutes + ?1 WHERE id = ?2",
        params![e.duration_minutes, e.ticket_id],
    )?;

    Ok(TimeEntry {
        id,
        ticket_id: e.ticket_id.clone(),
        duration_minutes: e.duration_minutes,
        description: e.description.clone(),
        created_by: e.created_by.clone(),
        created_at: e.created_at,
        session_id: e.session_id,
    })
}

pub fn load_entries_by_ticket(conn: &Connection, ticket_id: &str) -> AppResult<Vec<TimeEntry>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM time_entries
         WHERE ticket_id = ?1
         ORDER BY created_at ASC, id ASC",
    )?;
    let rows = stmt.query_map([ticket_id], map_entry)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

// ---------------------------
// Users
// ---------------------------

pub fn upsert_user(conn: &Connection, name: &str, privileged: bool) -> AppResult<()> {
    conn.execute(
        "INSERT INTO users (name, privileged) VALUES (?1, ?2)
         ON CONFLICT(name) DO UPDATE SET privileged = excluded.privileged",
        params![name, if privileged { 1 } else { 0 }],
    )?;
    Ok(())
}

pub fn user_is_privileged(conn: &Connection, name: &str) -> AppResult<bool> {
    let flag: Option<i32> = conn
        .query_row("SELECT privileged FROM users WHERE name = ?1", [name], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(flag == Some(1))
}
