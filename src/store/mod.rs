//! Persistence seam between the timer core and the CRM backend.

pub mod sqlite;

pub use sqlite::SqliteTicketStore;

use crate::errors::AppResult;
use crate::models::{NewTimeEntry, Ticket, TicketTimerFlag, TimeEntry};
use chrono::{DateTime, Utc};

pub trait TicketTimeStore {
    /// Fails with `TicketNotFound` for unknown tickets.
    fn get_timer_flag(&self, ticket_id: &str) -> AppResult<TicketTimerFlag>;

    fn set_timer_flag(
        &self,
        ticket_id: &str,
        running: bool,
        started_at: Option<DateTime<Utc>>,
    ) -> AppResult<()>;

    /// Idempotent on `entry.session_id`.
    fn create_time_entry(&self, entry: &NewTimeEntry) -> AppResult<TimeEntry>;

    fn is_privileged(&self, user_id: &str) -> AppResult<bool>;

    fn get_ticket(&self, ticket_id: &str) -> AppResult<Option<Ticket>>;

    fn time_entries(&self, ticket_id: &str) -> AppResult<Vec<TimeEntry>>;

    /// Record an audit line for a timer operation. No-op by default.
    fn audit(&self, _operation: &str, _target: &str, _message: &str) {}

    /// Commit a stopped session: the entry first, then the flag cleared
    /// when it still belongs to the session (see [`NewTimeEntry::owns_flag`]).
    ///
    /// Backends with transactions should override this to do both at once.
    /// The default clears the flag only once the entry is written; a retry
    /// after a failed flag write finds the existing entry.
    fn complete_timer(&self, entry: &NewTimeEntry) -> AppResult<TimeEntry> {
        let committed = self.create_time_entry(entry)?;
        let flag = self.get_timer_flag(&entry.ticket_id)?;
        if entry.owns_flag(&flag) {
            self.set_timer_flag(&entry.ticket_id, false, None)?;
        }
        Ok(committed)
    }
}
