use super::TicketTimeStore;
use crate::db::initialize::init_db;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::{NewTimeEntry, Ticket, TicketTimerFlag, TimeEntry};
use crate::ui::messages::warning;
use chrono::{DateTime, Utc};
use rusqlite::Connection;

/// `TicketTimeStore` on a local SQLite database.
pub struct SqliteTicketStore {
    pool: DbPool,
}

impl SqliteTicketStore {
    /// Open the database at `path` and bring its schema up to date.
    pub fn open(path: &str) -> AppResult<Self> {
        let pool = DbPool::new(path)?;
        init_db(&pool.conn)?;
        Ok(Self { pool })
    }

    pub fn in_memory() -> AppResult<Self> {
        let pool = DbPool::in_memory()?;
        init_db(&pool.conn)?;
        Ok(Self { pool })
    }

    pub fn conn(&self) -> &Connection {
        &self.pool.conn
    }

    pub fn add_ticket(&self, ticket: &Ticket) -> AppResult<()> {
        queries::upsert_ticket(self.conn(), ticket)
    }

    pub fn add_user(&self, name: &str, privileged: bool) -> AppResult<()> {
        queries::upsert_user(self.conn(), name, privileged)
    }

    pub fn running_flags(&self) -> AppResult<Vec<TicketTimerFlag>> {
        queries::load_running_flags(self.conn())
    }
}

impl TicketTimeStore for SqliteTicketStore {
    fn get_timer_flag(&self, ticket_id: &str) -> AppResult<TicketTimerFlag> {
        queries::load_flag(self.conn(), ticket_id).map_err(AppError::into_persistence)
    }

    fn set_timer_flag(
        &self,
        ticket_id: &str,
        running: bool,
        started_at: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        queries::update_flag(self.conn(), ticket_id, running, started_at)
            .map_err(AppError::into_persistence)
    }

    fn create_time_entry(&self, entry: &NewTimeEntry) -> AppResult<TimeEntry> {
        let tx = self.conn().unchecked_transaction()?;
        let committed = queries::insert_entry(&tx, entry).map_err(AppError::into_persistence)?;
        tx.commit()?;
        Ok(committed)
    }

    fn is_privileged(&self, user_id: &str) -> AppResult<bool> {
        queries::user_is_privileged(self.conn(), user_id).map_err(AppError::into_persistence)
    }

    fn get_ticket(&self, ticket_id: &str) -> AppResult<Option<Ticket>> {
        queries::load_ticket(self.conn(), ticket_id).map_err(AppError::into_persistence)
    }

    fn time_entries(&self, ticket_id: &str) -> AppResult<Vec<TimeEntry>> {
        queries::load_entries_by_ticket(self.conn(), ticket_id)
            .map_err(AppError::into_persistence)
    }

    /// Audit failures are reported, never propagated.
    fn audit(&self, operation: &str, target: &str, message: &str) {
        if let Err(e) = ttlog(self.conn(), operation, target, message) {
            warning(format!("Failed to write internal log: {}", e));
        }
    }

    /// Entry insert and flag release in one transaction.
    fn complete_timer(&self, entry: &NewTimeEntry) -> AppResult<TimeEntry> {
        let tx = self.conn().unchecked_transaction()?;
        let committed = queries::insert_entry(&tx, entry).map_err(AppError::into_persistence)?;
        queries::release_flag(&tx, &entry.ticket_id, entry.flagged_at)
            .map_err(AppError::into_persistence)?;
        tx.commit().map_err(|e| AppError::Persistence(e.to_string()))?;
        Ok(committed)
    }
}
