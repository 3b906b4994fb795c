//! Work-timer lifecycle for one operator.
//!
//! The manager holds no session in memory: every call re-reads the local
//! slot, so changes made by another tab sharing the same storage are picked
//! up on the next operation. The server flag decides whether a ticket is
//! being timed; local state is reconciled against it and never trusted
//! blindly. Disagreements are reported by [`TimerLifecycleManager::status`]
//! and resolved only by an explicit operation.

use crate::errors::{AppError, AppResult};
use crate::local::{TimerChannel, TimerEvent, TimerStorage};
use crate::models::{
    Conflict, ConflictKind, NewTimeEntry, TimeEntry, TimerSession, TimerSnapshot, TimerStatus,
};
use crate::store::TicketTimeStore;
use crate::ui::messages::warning;
use crate::utils::time::{Clock, format_elapsed, seconds_to_minutes};
use std::sync::mpsc::Receiver;

pub struct TimerLifecycleManager<S, L, C> {
    store: S,
    local: L,
    clock: C,
    channel: TimerChannel,
    operator: String,
}

impl<S, L, C> TimerLifecycleManager<S, L, C>
where
    S: TicketTimeStore,
    L: TimerStorage,
    C: Clock,
{
    pub fn new(store: S, local: L, clock: C, operator: impl Into<String>) -> Self {
        Self {
            store,
            local,
            clock,
            channel: TimerChannel::new(),
            operator: operator.into(),
        }
    }

    /// Publish on an existing channel (shared with other tabs).
    pub fn with_channel(mut self, channel: TimerChannel) -> Self {
        self.channel = channel;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn subscribe(&self) -> Receiver<TimerEvent> {
        self.channel.subscribe()
    }

    /// Current local session, freshly read from storage.
    pub fn refresh(&self) -> AppResult<Option<TimerSession>> {
        self.local.load()
    }

    pub fn elapsed_seconds(&self) -> AppResult<u64> {
        let session = self.local.load()?.ok_or(AppError::NoActiveTimer)?;
        Ok(session.elapsed_seconds(self.clock.now()))
    }

    // ------------------------------------------------
    // start / resume
    // ------------------------------------------------

    /// Start timing `ticket_id`, or resume it when the local session is a
    /// paused timer on the same ticket.
    pub fn start(
        &self,
        ticket_id: &str,
        ticket_number: Option<String>,
        customer_name: Option<String>,
    ) -> AppResult<TimerSession> {
        self.start_inner(ticket_id, ticket_number, customer_name, false)
    }

    /// Privileged start that ignores a server flag already set on the ticket.
    pub fn start_override(
        &self,
        ticket_id: &str,
        ticket_number: Option<String>,
        customer_name: Option<String>,
    ) -> AppResult<TimerSession> {
        if !self.store.is_privileged(&self.operator)? {
            return Err(AppError::Unauthorized(self.operator.clone()));
        }
        self.start_inner(ticket_id, ticket_number, customer_name, true)
    }

    fn start_inner(
        &self,
        ticket_id: &str,
        ticket_number: Option<String>,
        customer_name: Option<String>,
        override_server: bool,
    ) -> AppResult<TimerSession> {
        if let Some(session) = self.local.load()? {
            if session.ticket_id != ticket_id {
                return Err(AppError::AlreadyRunningElsewhere {
                    active: session.ticket_id,
                    requested: ticket_id.to_string(),
                });
            }
            if session.is_running {
                return Ok(session);
            }
            return self.resume_session(session);
        }

        let previous = self.store.get_timer_flag(ticket_id)?;
        if previous.timer_is_running && !override_server {
            return Err(AppError::ServerTimerActive(ticket_id.to_string()));
        }

        let (ticket_number, customer_name) = match (ticket_number, customer_name) {
            (Some(n), Some(c)) => (Some(n), Some(c)),
            (n, c) => {
                let ticket = self.store.get_ticket(ticket_id)?;
                (
                    n.or_else(|| ticket.as_ref().and_then(|t| t.ticket_number.clone())),
                    c.or_else(|| ticket.as_ref().and_then(|t| t.customer_name.clone())),
                )
            }
        };

        let now = self.clock.now();
        let session = TimerSession::start(ticket_id, ticket_number, customer_name, now);

        self.store
            .set_timer_flag(ticket_id, true, Some(now))
            .map_err(AppError::into_persistence)?;

        if let Err(e) = self.local.save(&session) {
            if let Err(rollback) = self.store.set_timer_flag(
                ticket_id,
                previous.timer_is_running,
                previous.timer_started_at,
            ) {
                warning(format!(
                    "Could not roll back timer flag on {}: {}",
                    ticket_id, rollback
                ));
            }
            return Err(e);
        }

        let how = if override_server { "override" } else { "start" };
        self.store.audit(
            "start",
            ticket_id,
            &format!("{} started timer ({})", self.operator, how),
        );
        self.channel.publish(TimerEvent::Started(session.clone()));

        Ok(session)
    }

    /// Paused → Running. Local only, like `pause`.
    pub fn resume(&self) -> AppResult<TimerSession> {
        let session = self.local.load()?.ok_or(AppError::NoActiveTimer)?;
        if session.is_running {
            return Ok(session);
        }
        self.resume_session(session)
    }

    fn resume_session(&self, mut session: TimerSession) -> AppResult<TimerSession> {
        session.resume(self.clock.now());
        self.local.save(&session)?;
        self.store.audit(
            "resume",
            &session.ticket_id,
            &format!(
                "{} resumed timer at {}",
                self.operator,
                format_elapsed(session.accumulated_seconds)
            ),
        );
        self.channel.publish(TimerEvent::Resumed(session.clone()));
        Ok(session)
    }

    // ------------------------------------------------
    // pause
    // ------------------------------------------------

    /// Freeze the elapsed time. Never touches the server flag.
    pub fn pause(&self) -> AppResult<TimerSession> {
        let mut session = self.local.load()?.ok_or(AppError::NoActiveTimer)?;
        if !session.is_running {
            return Ok(session);
        }
        session.pause(self.clock.now());
        self.local.save(&session)?;
        self.channel.publish(TimerEvent::Paused(session.clone()));
        Ok(session)
    }

    // ------------------------------------------------
    // stop
    // ------------------------------------------------

    /// Commit the session as a time entry and clear the server flag.
    ///
    /// On failure the local session is left exactly as it was, so the
    /// operator can retry without losing time. Retrying a stop whose
    /// entry already landed returns that entry.
    pub fn stop(&self, work_notes: &str) -> AppResult<TimeEntry> {
        let session = self.local.load()?.ok_or(AppError::NoActiveTimer)?;

        let notes = work_notes.trim();
        if notes.is_empty() {
            return Err(AppError::MissingWorkNotes);
        }

        let now = self.clock.now();
        let elapsed = session.elapsed_seconds(now);
        let entry = NewTimeEntry {
            ticket_id: session.ticket_id.clone(),
            duration_minutes: seconds_to_minutes(elapsed),
            description: notes.to_string(),
            created_by: self.operator.clone(),
            created_at: now,
            session_id: session.session_id,
            flagged_at: session.flagged_at,
        };

        let committed = self
            .store
            .complete_timer(&entry)
            .map_err(AppError::into_persistence)?;

        if let Err(e) = self.local.clear() {
            warning(format!(
                "Time entry saved, but the local timer could not be cleared: {}",
                e
            ));
        }

        self.store.audit(
            "stop",
            &session.ticket_id,
            &format!(
                "{} logged {} min ({})",
                self.operator,
                committed.duration_minutes,
                format_elapsed(elapsed)
            ),
        );
        self.channel.publish(TimerEvent::Stopped {
            ticket_id: session.ticket_id,
            entry_id: committed.id,
        });

        Ok(committed)
    }

    // ------------------------------------------------
    // recovery and forced clears
    // ------------------------------------------------

    /// Rebuild a running local session from the server flag of `ticket_id`.
    /// A local session already on that ticket is kept as it is: its paused
    /// or accumulated time is authoritative over the flag's start time.
    pub fn recover_timer(&self, ticket_id: &str) -> AppResult<TimerSession> {
        let flag = self.store.get_timer_flag(ticket_id)?;
        if !flag.timer_is_running {
            return Err(AppError::NothingToRecover(ticket_id.to_string()));
        }

        if let Some(local) = self.local.load()? {
            if local.ticket_id != ticket_id {
                return Err(AppError::AlreadyRunningElsewhere {
                    active: local.ticket_id,
                    requested: ticket_id.to_string(),
                });
            }
            return Ok(local);
        }

        // A flag without a start time gets one now, so later recoveries agree.
        let started_at = match flag.timer_started_at {
            Some(t) => t,
            None => {
                let now = self.clock.now();
                self.store
                    .set_timer_flag(ticket_id, true, Some(now))
                    .map_err(AppError::into_persistence)?;
                now
            }
        };

        let ticket = self.store.get_ticket(ticket_id)?;
        let session = TimerSession::recovered(
            ticket_id,
            ticket.as_ref().and_then(|t| t.ticket_number.clone()),
            ticket.and_then(|t| t.customer_name),
            started_at,
        );

        self.local.save(&session)?;
        self.store.audit(
            "recover",
            ticket_id,
            &format!("{} recovered timer started at {}", self.operator, started_at),
        );
        self.channel.publish(TimerEvent::Recovered(session.clone()));

        Ok(session)
    }

    /// Drop the local session; the server flag is left alone.
    /// An unreadable slot is discarded as well.
    pub fn clear_local(&self) -> AppResult<()> {
        let current = self.local.load().ok().flatten();
        if self.local.clear()?
            && let Some(session) = current
        {
            self.channel.publish(TimerEvent::Cleared {
                ticket_id: session.ticket_id,
            });
        }
        Ok(())
    }

    /// Privileged: clear a stuck server flag without billing any time.
    pub fn clear_server_flag(&self, ticket_id: &str) -> AppResult<()> {
        if !self.store.is_privileged(&self.operator)? {
            return Err(AppError::Unauthorized(self.operator.clone()));
        }

        self.store.get_timer_flag(ticket_id)?;
        self.store
            .set_timer_flag(ticket_id, false, None)
            .map_err(AppError::into_persistence)?;

        self.store.audit(
            "clear_server",
            ticket_id,
            &format!("{} force-cleared timer flag", self.operator),
        );
        self.channel.publish(TimerEvent::ServerFlagCleared {
            ticket_id: ticket_id.to_string(),
        });

        Ok(())
    }

    // ------------------------------------------------
    // status
    // ------------------------------------------------

    /// Reconcile the local session with the server flag.
    ///
    /// With `ticket_id` the server flag of that ticket is checked as well;
    /// without it only the local session's own ticket is.
    pub fn status(&self, ticket_id: Option<&str>) -> AppResult<TimerStatus> {
        let local = self.local.load()?;

        let target = match (ticket_id, &local) {
            (Some(t), _) => t.to_string(),
            (None, Some(s)) => s.ticket_id.clone(),
            (None, None) => return Ok(TimerStatus::Idle),
        };

        let flag = self.store.get_timer_flag(&target)?;

        match local {
            Some(session) if session.ticket_id == target => {
                if !flag.timer_is_running {
                    return Ok(TimerStatus::Conflicted(Conflict {
                        ticket_id: target,
                        kind: ConflictKind::LocalOnly { session },
                    }));
                }
                Ok(self.snapshot(session))
            }
            Some(session) if flag.timer_is_running => Ok(TimerStatus::Conflicted(Conflict {
                ticket_id: target,
                kind: ConflictKind::ServerOnly {
                    started_at: flag.timer_started_at,
                    local_ticket: Some(session.ticket_id),
                },
            })),
            // Another ticket, not flagged: report the local session itself.
            Some(_) => self.status(None),
            None if flag.timer_is_running => Ok(TimerStatus::Conflicted(Conflict {
                ticket_id: target,
                kind: ConflictKind::ServerOnly {
                    started_at: flag.timer_started_at,
                    local_ticket: None,
                },
            })),
            None => Ok(TimerStatus::Idle),
        }
    }

    fn snapshot(&self, session: TimerSession) -> TimerStatus {
        let elapsed_seconds = session.elapsed_seconds(self.clock.now());
        let running = session.is_running;
        let snap = TimerSnapshot {
            session,
            elapsed_seconds,
        };
        if running {
            TimerStatus::Running(snap)
        } else {
            TimerStatus::Paused(snap)
        }
    }
}
