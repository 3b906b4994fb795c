use super::session::TimerSession;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Session plus the elapsed time computed at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerSnapshot {
    pub session: TimerSession,
    pub elapsed_seconds: u64,
}

/// Which side disagrees, and what it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConflictKind {
    /// Server flag set, no local session for the ticket
    /// (another device, or local storage was wiped). `local_ticket` is the
    /// ticket of a local session held elsewhere, if any.
    ServerOnly {
        started_at: Option<DateTime<Utc>>,
        local_ticket: Option<String>,
    },
    /// Local session exists but the server flag is clear
    /// (flag force-cleared, or a stop committed elsewhere).
    LocalOnly { session: TimerSession },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub ticket_id: String,
    pub kind: ConflictKind,
}

impl Conflict {
    /// Name of the side that looks authoritative.
    pub fn authoritative_side(&self) -> &'static str {
        match self.kind {
            ConflictKind::ServerOnly { .. } => "server",
            ConflictKind::LocalOnly { .. } => "local",
        }
    }

    /// Commands that resolve this conflict, in the order to run them.
    pub fn remediation(&self) -> Vec<String> {
        match &self.kind {
            // Recovery needs the local slot free first.
            ConflictKind::ServerOnly {
                local_ticket: Some(_),
                ..
            } => vec![
                "stop".to_string(),
                "clear-local".to_string(),
                format!("recover {}", self.ticket_id),
            ],
            ConflictKind::ServerOnly { .. } => vec![
                format!("recover {}", self.ticket_id),
                format!("clear-server {}", self.ticket_id),
            ],
            ConflictKind::LocalOnly { .. } => vec!["clear-local".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TimerStatus {
    Idle,
    Running(TimerSnapshot),
    Paused(TimerSnapshot),
    Conflicted(Conflict),
}

impl TimerStatus {
    pub fn is_conflicted(&self) -> bool {
        matches!(self, TimerStatus::Conflicted(_))
    }
}
