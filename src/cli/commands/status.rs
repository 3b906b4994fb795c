use crate::cli::commands::open_timer;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::models::{ConflictKind, TimerStatus};
use crate::ui::messages::{hint, info, warning};
use crate::utils::time::format_elapsed;
use chrono::Local;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Status { ticket } = cmd {
        let timer = open_timer(cfg)?;

        match timer.status(ticket.as_deref())? {
            TimerStatus::Idle => {
                info("No active timer.");
                for flag in timer.store().running_flags()? {
                    warning(format!(
                        "Ticket {} has a timer running on the server.",
                        flag.ticket_id
                    ));
                    hint(format!("repairtimer recover {}", flag.ticket_id));
                }
            }
            TimerStatus::Running(snap) => info(format!(
                "⏱️  Running on {}: {}",
                snap.session.label(),
                format_elapsed(snap.elapsed_seconds)
            )),
            TimerStatus::Paused(snap) => info(format!(
                "⏸️  Paused on {}: {}",
                snap.session.label(),
                format_elapsed(snap.elapsed_seconds)
            )),
            TimerStatus::Conflicted(conflict) => {
                match &conflict.kind {
                    ConflictKind::ServerOnly {
                        started_at,
                        local_ticket,
                    } => {
                        let since = started_at
                            .map(|t| {
                                t.with_timezone(&Local)
                                    .format("%Y-%m-%d %H:%M")
                                    .to_string()
                            })
                            .unwrap_or_else(|| "an unknown time".to_string());
                        warning(format!(
                            "Conflicted: ticket {} runs on the server since {}, but not here.",
                            conflict.ticket_id, since
                        ));
                        if let Some(other) = local_ticket {
                            warning(format!(
                                "The local timer runs on ticket {}; stop or clear it before recovering {}.",
                                other, conflict.ticket_id
                            ));
                        }
                    }
                    ConflictKind::LocalOnly { session } => {
                        warning(format!(
                            "Conflicted: local timer on {} is not running on the server.",
                            session.label()
                        ));
                    }
                }
                info(format!(
                    "The {} side looks authoritative.",
                    conflict.authoritative_side()
                ));
                for op in conflict.remediation() {
                    hint(format!("repairtimer {}", op));
                }
            }
        }
    }

    Ok(())
}
