use crate::cli::commands::open_timer;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::success;
use crate::utils::time::format_elapsed;

/// `pause` and `resume`: local-only transitions.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let timer = open_timer(cfg)?;

    match cmd {
        Commands::Pause => {
            let session = timer.pause()?;
            success(format!(
                "⏸️  Timer paused on {} at {}.",
                session.label(),
                format_elapsed(session.accumulated_seconds)
            ));
        }
        Commands::Resume => {
            let session = timer.resume()?;
            success(format!(
                "▶️  Timer resumed on {} from {}.",
                session.label(),
                format_elapsed(session.accumulated_seconds)
            ));
        }
        _ => {}
    }

    Ok(())
}
