use crate::cli::parser::{Commands, TicketAction};
use crate::config::Config;
use crate::errors::AppResult;
use crate::models::Ticket;
use crate::store::{SqliteTicketStore, TicketTimeStore};
use crate::ui::messages::success;

/// Register a ticket so it can be timed. Tickets normally come from the CRM;
/// this keeps the CLI usable on its own.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Ticket {
        action: TicketAction::Add {
            id,
            number,
            customer,
        },
    } = cmd
    {
        let store = SqliteTicketStore::open(&cfg.database)?;
        store.add_ticket(&Ticket {
            id: id.clone(),
            ticket_number: number.clone(),
            customer_name: customer.clone(),
        })?;
        store.audit("ticket_add", id, &format!("{} registered ticket", cfg.operator));

        success(format!("Ticket {} saved.", id));
    }

    Ok(())
}
