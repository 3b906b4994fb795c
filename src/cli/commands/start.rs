use crate::cli::commands::open_timer;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::success;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Start {
        ticket,
        number,
        customer,
        force,
    } = cmd
    {
        let timer = open_timer(cfg)?;

        let session = if *force {
            timer.start_override(ticket, number.clone(), customer.clone())?
        } else {
            timer.start(ticket, number.clone(), customer.clone())?
        };

        if session.accumulated_seconds > 0 {
            success(format!("⏯️  Timer resumed on {}.", session.label()));
        } else {
            success(format!("⏱️  Timer started on {}.", session.label()));
        }
    }

    Ok(())
}
