use super::ticket::TicketTimerFlag;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Committed, immutable record of time worked on a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeEntry {
    pub id: i64,
    pub ticket_id: String,
    pub duration_minutes: i64,
    pub description: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub session_id: Uuid,
}

/// Entry about to be committed by a `stop`.
///
/// `session_id` identifies the timer session; committing the same session
/// twice returns the entry created the first time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTimeEntry {
    pub ticket_id: String,
    pub duration_minutes: i64,
    pub description: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub session_id: Uuid,
    /// Flag start time owned by the stopped session, if known.
    pub flagged_at: Option<DateTime<Utc>>,
}

impl NewTimeEntry {
    /// Whether committing this entry should clear `flag`. A flag raised
    /// since by someone else (different start time) is left running.
    pub fn owns_flag(&self, flag: &TicketTimerFlag) -> bool {
        flag.timer_is_running
            && (self.flagged_at.is_none() || flag.timer_started_at == self.flagged_at)
    }
}
