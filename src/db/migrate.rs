use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension, Result};

/// Ensure that the `log` table exists. Migrations are tracked in it.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

/// Run `sql` once, then mark `version` as applied. Both happen in one
/// transaction.
fn apply(conn: &Connection, version: &str, description: &str, sql: &str) -> Result<bool> {
    if is_applied(conn, version)? {
        return Ok(false);
    }

    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(sql)?;
    tx.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [version, description],
    )?;
    tx.commit()?;

    Ok(true)
}

const MIGRATIONS: &[(&str, &str, &str)] = &[
    (
        "20250301_0001_create_tickets",
        "Created tickets table with timer flag",
        r#"
        CREATE TABLE IF NOT EXISTS tickets (
            id                TEXT PRIMARY KEY,
            ticket_number     TEXT,
            customer_name     TEXT,
            timer_is_running  INTEGER NOT NULL DEFAULT 0,
            timer_started_at  TEXT,
            total_minutes     INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "20250301_0002_create_time_entries",
        "Created time_entries table",
        r#"
        CREATE TABLE IF NOT EXISTS time_entries (
            id                INTEGER PRIMARY KEY AUTOINCREMENT,
            ticket_id         TEXT NOT NULL REFERENCES tickets(id),
            duration_minutes  INTEGER NOT NULL CHECK(duration_minutes >= 0),
            description       TEXT NOT NULL CHECK(length(trim(description)) > 0),
            created_by        TEXT NOT NULL,
            created_at        TEXT NOT NULL,
            session_id        TEXT NOT NULL UNIQUE
        );

        CREATE INDEX IF NOT EXISTS idx_time_entries_ticket ON time_entries(ticket_id, created_at);
        "#,
    ),
    (
        "20250301_0003_create_users",
        "Created users table",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            name        TEXT PRIMARY KEY,
            privileged  INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
];

/// Public entry point: run all pending migrations.
///
/// Invoked by db::initialize::init_db().
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    ensure_log_table(conn)?;

    for (version, description, sql) in MIGRATIONS {
        if apply(conn, version, description, sql)? {
            success(format!("Migration applied: {} → {}", version, description));
        }
    }

    Ok(())
}
