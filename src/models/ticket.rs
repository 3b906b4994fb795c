use chrono::{DateTime, Utc};
use serde::Serialize;

/// Server-side view of whether a timer runs on a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketTimerFlag {
    pub ticket_id: String,
    pub timer_is_running: bool,
    pub timer_started_at: Option<DateTime<Utc>>,
    pub total_minutes_accumulated: i64,
}

/// Display data of a ticket (owned by the surrounding CRM).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ticket {
    pub id: String,
    pub ticket_number: Option<String>,
    pub customer_name: Option<String>,
}
