use crate::cli::commands::open_timer;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::success;
use crate::utils::time::format_elapsed;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Recover { ticket } = cmd {
        let timer = open_timer(cfg)?;
        let session = timer.recover_timer(ticket)?;
        let elapsed = timer.elapsed_seconds()?;

        success(format!(
            "🔄 Timer recovered on {} (running for {}).",
            session.label(),
            format_elapsed(elapsed)
        ));
    }

    Ok(())
}
