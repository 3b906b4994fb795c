use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::store::{SqliteTicketStore, TicketTimeStore};
use crate::ui::messages::header;
use crate::utils::formatting::truncate;
use crate::utils::table::{Column, Table};
use crate::utils::time::format_minutes;
use chrono::Local;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Entries { ticket } = cmd {
        let store = SqliteTicketStore::open(&cfg.database)?;
        let flag = store.get_timer_flag(ticket)?;
        let entries = store.time_entries(ticket)?;

        if entries.is_empty() {
            println!("No time entries for ticket {}.", ticket);
            return Ok(());
        }

        header(format!("Time entries for ticket {}", ticket));

        let mut table = Table::new(vec![
            Column::new("ID", 5),
            Column::new("DATE", 16),
            Column::new("TIME", 6),
            Column::new("BY", 12),
            Column::new("NOTES", 40),
        ]);

        for e in &entries {
            table.add_row(vec![
                e.id.to_string(),
                e.created_at
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string(),
                format_minutes(e.duration_minutes),
                truncate(&e.created_by, 12),
                truncate(&e.description, 40),
            ]);
        }

        print!("{}", table.render());
        println!("{}", cfg.separator_char.repeat(table.width()));
        println!(
            "Total: {}",
            format_minutes(flag.total_minutes_accumulated)
        );
    }

    Ok(())
}
