use crate::cli::parser::{Commands, UserAction};
use crate::config::Config;
use crate::errors::AppResult;
use crate::store::{SqliteTicketStore, TicketTimeStore};
use crate::ui::messages::success;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::User {
        action: UserAction::Add { name, privileged },
    } = cmd
    {
        let store = SqliteTicketStore::open(&cfg.database)?;
        store.add_user(name, *privileged)?;
        store.audit(
            "user_add",
            name,
            &format!("privileged={} (by {})", privileged, cfg.operator),
        );

        let role = if *privileged { "privileged" } else { "standard" };
        success(format!("User {} saved ({}).", name, role));
    }

    Ok(())
}
