use crate::cli::commands::open_timer;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::{info, success, warning};

/// `clear-local` and `clear-server`.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let timer = open_timer(cfg)?;

    match cmd {
        Commands::ClearLocal => match timer.refresh() {
            Ok(Some(session)) => {
                timer.clear_local()?;
                success(format!("Local timer on {} discarded.", session.label()));
            }
            Ok(None) => info("No local timer to clear."),
            Err(e) => {
                timer.clear_local()?;
                warning(format!("Unreadable local timer state discarded ({}).", e));
            }
        },
        Commands::ClearServer { ticket } => {
            timer.clear_server_flag(ticket)?;
            success(format!("Server timer flag cleared on ticket {}.", ticket));
        }
        _ => {}
    }

    Ok(())
}
