pub mod session;
pub mod status;
pub mod ticket;
pub mod time_entry;

pub use session::TimerSession;
pub use status::{Conflict, ConflictKind, TimerSnapshot, TimerStatus};
pub use ticket::{Ticket, TicketTimerFlag};
pub use time_entry::{NewTimeEntry, TimeEntry};
