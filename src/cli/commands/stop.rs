use crate::cli::commands::open_timer;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success, warning};
use crate::utils::time::{format_elapsed, format_minutes};
use std::io::{self, BufRead, Write};

/// Ask for work notes on stdin. `None` means the operator cancelled (EOF).
fn prompt_notes() -> Option<String> {
    print!("Work performed: ");
    io::stdout().flush().ok();

    let mut s = String::new();
    match io::stdin().lock().read_line(&mut s) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(s.trim().to_string()),
    }
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Stop { notes } = cmd {
        let timer = open_timer(cfg)?;
        let elapsed = timer.elapsed_seconds()?;

        let notes = match notes {
            Some(n) => n.clone(),
            None => {
                info(format!("Stopping timer at {}.", format_elapsed(elapsed)));
                match prompt_notes() {
                    Some(n) => n,
                    None => {
                        info("Stop cancelled, timer left unchanged.");
                        return Ok(());
                    }
                }
            }
        };

        match timer.stop(&notes) {
            Ok(entry) => {
                success(format!(
                    "⏹️  Logged {} on ticket {} (entry #{}).",
                    format_minutes(entry.duration_minutes),
                    entry.ticket_id,
                    entry.id
                ));
            }
            Err(e) if e.is_retryable() => {
                warning("The timer is still active and no time was lost; retry the stop.");
                return Err(e);
            }
            Err(AppError::MissingWorkNotes) => {
                warning("Describe the work performed with --notes.");
                return Err(AppError::MissingWorkNotes);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(())
}
