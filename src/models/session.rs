use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Operator-side record of an in-progress or paused work interval.
/// Serialized as-is under the `active_timer` key of the local state file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSession {
    pub session_id: Uuid,
    pub ticket_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    /// Start of the current run segment (moved forward on resume).
    pub started_at_wall_clock: DateTime<Utc>,
    /// Seconds counted before the current run segment.
    pub accumulated_seconds: u64,
    pub is_running: bool,
    /// `timer_started_at` this session wrote to (or recovered from) the
    /// server flag. A stop only clears a flag that still carries it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flagged_at: Option<DateTime<Utc>>,
}

impl TimerSession {
    /// Fresh running session for a timer started at `now`.
    pub fn start(
        ticket_id: &str,
        ticket_number: Option<String>,
        customer_name: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            ticket_id: ticket_id.to_string(),
            ticket_number,
            customer_name,
            started_at_wall_clock: now,
            accumulated_seconds: 0,
            is_running: true,
            flagged_at: Some(now),
        }
    }

    /// Session rebuilt from the server flag of a ticket.
    ///
    /// The id is derived from the ticket and the server start time, so
    /// rebuilding twice from the same flag yields the same session.
    pub fn recovered(
        ticket_id: &str,
        ticket_number: Option<String>,
        customer_name: Option<String>,
        started_at: DateTime<Utc>,
    ) -> Self {
        let key = format!("{}@{}", ticket_id, started_at.to_rfc3339());
        Self {
            session_id: Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes()),
            ticket_id: ticket_id.to_string(),
            ticket_number,
            customer_name,
            started_at_wall_clock: started_at,
            accumulated_seconds: 0,
            is_running: true,
            flagged_at: Some(started_at),
        }
    }

    /// Seconds in the current run segment. A wall clock that stepped
    /// backwards counts as zero.
    pub fn segment_seconds(&self, now: DateTime<Utc>) -> u64 {
        if !self.is_running {
            return 0;
        }
        (now - self.started_at_wall_clock).num_seconds().max(0) as u64
    }

    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> u64 {
        self.accumulated_seconds + self.segment_seconds(now)
    }

    pub fn pause(&mut self, now: DateTime<Utc>) {
        if self.is_running {
            self.accumulated_seconds = self.elapsed_seconds(now);
            self.is_running = false;
        }
    }

    pub fn resume(&mut self, now: DateTime<Utc>) {
        if !self.is_running {
            self.started_at_wall_clock = now;
            self.is_running = true;
        }
    }

    /// Human label: ticket number when known, otherwise the raw id.
    pub fn label(&self) -> String {
        match (&self.ticket_number, &self.customer_name) {
            (Some(n), Some(c)) => format!("#{} ({})", n, c),
            (Some(n), None) => format!("#{}", n),
            (None, Some(c)) => format!("{} ({})", self.ticket_id, c),
            (None, None) => self.ticket_id.clone(),
        }
    }
}
