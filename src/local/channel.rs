//! Broadcast channel carrying local timer changes to every subscriber
//! (other tabs, a status bar, a tray icon...).

use crate::models::TimerSession;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    Started(TimerSession),
    Paused(TimerSession),
    Resumed(TimerSession),
    Recovered(TimerSession),
    /// Session committed as a time entry.
    Stopped { ticket_id: String, entry_id: i64 },
    /// Session discarded without a time entry.
    Cleared { ticket_id: String },
    /// Server flag force-cleared by a privileged operator.
    ServerFlagCleared { ticket_id: String },
}

impl TimerEvent {
    pub fn ticket_id(&self) -> &str {
        match self {
            TimerEvent::Started(s)
            | TimerEvent::Paused(s)
            | TimerEvent::Resumed(s)
            | TimerEvent::Recovered(s) => &s.ticket_id,
            TimerEvent::Stopped { ticket_id, .. }
            | TimerEvent::Cleared { ticket_id }
            | TimerEvent::ServerFlagCleared { ticket_id } => ticket_id,
        }
    }
}

/// Clones publish to the same subscriber set.
#[derive(Debug, Clone, Default)]
pub struct TimerChannel {
    subscribers: Rc<RefCell<Vec<Sender<TimerEvent>>>>,
}

impl TimerChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Receiver<TimerEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.borrow_mut().push(tx);
        rx
    }

    /// Deliver to every live subscriber; dropped receivers are pruned.
    pub fn publish(&self, event: TimerEvent) {
        self.subscribers
            .borrow_mut()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}
