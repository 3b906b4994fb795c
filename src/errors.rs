//! Unified application error type.
//! Every layer (store, local, core, cli) returns AppError so the timer
//! operations surface failures as values and the CLI decides presentation.

use std::io;
use thiserror::Error;

/// Coarse classification used by callers to decide whether to offer a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Business rule violation: never retried, shown to the operator as-is.
    Business,
    /// Persistence or I/O failure: local state is preserved, safe to retry.
    Transient,
    /// Broken or unreadable configuration.
    Config,
}

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // Timer business rules
    // ---------------------------
    #[error(
        "A timer is already active on ticket {active}; stop it before starting one on {requested}"
    )]
    AlreadyRunningElsewhere { active: String, requested: String },

    #[error("A timer is already running on ticket {0} (started from another session)")]
    ServerTimerActive(String),

    #[error("Work notes are required to stop a timer")]
    MissingWorkNotes,

    #[error("No active timer")]
    NoActiveTimer,

    #[error("No server-side timer to recover on ticket {0}")]
    NothingToRecover(String),

    #[error("User '{0}' is not allowed to perform this operation")]
    Unauthorized(String),

    #[error("Ticket not found: {0}")]
    TicketNotFound(String),

    // ---------------------------
    // Persistence
    // ---------------------------
    #[error("Persistence failure: {0}")]
    Persistence(String),

    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Local timer state is unreadable: {0}")]
    Serde(#[from] serde_json::Error),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    #[error("Failed to save configuration")]
    ConfigSave,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::AlreadyRunningElsewhere { .. }
            | AppError::ServerTimerActive(_)
            | AppError::MissingWorkNotes
            | AppError::NoActiveTimer
            | AppError::NothingToRecover(_)
            | AppError::Unauthorized(_)
            | AppError::TicketNotFound(_) => ErrorKind::Business,

            AppError::Persistence(_)
            | AppError::Db(_)
            | AppError::Io(_)
            | AppError::Serde(_) => ErrorKind::Transient,

            AppError::Config(_) | AppError::ConfigLoad | AppError::ConfigSave => ErrorKind::Config,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }

    /// Fold any transient failure into `Persistence`; business errors pass through.
    pub fn into_persistence(self) -> AppError {
        match self {
            AppError::Persistence(_) => self,
            e if e.is_retryable() => AppError::Persistence(e.to_string()),
            e => e,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
