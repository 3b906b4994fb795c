use crate::db::log::load_log;
use crate::errors::AppResult;
use ansi_term::Colour;
use regex::Regex;
use rusqlite::Connection;

const OP_TARGET_MAX: usize = 48;

fn strip_ansi(s: &str) -> String {
    match Regex::new(r"\x1B\[[0-9;]*[mK]") {
        Ok(re) => re.replace_all(s, "").into_owned(),
        Err(_) => s.to_string(),
    }
}

/// ANSI color for each audited operation
fn color_for_operation(op: &str) -> Colour {
    match op {
        "start" | "recover" => Colour::Green,
        "stop" => Colour::Blue,
        "clear_server" => Colour::Red,
        "ticket_add" | "user_add" => Colour::Yellow,
        "migration_applied" => Colour::Purple,
        "init" => Colour::RGB(255, 153, 51),
        _ => Colour::White,
    }
}

pub struct LogLogic;

impl LogLogic {
    pub fn print_log(conn: &Connection) -> AppResult<()> {
        let entries = load_log(conn)?;

        if entries.is_empty() {
            println!("📜 Internal log is empty.");
            return Ok(());
        }

        let date_w = entries.iter().map(|(d, ..)| d.len()).max().unwrap_or(25);

        println!("📜 Internal log:\n");

        for (raw_date, operation, target, message) in entries {
            let date = chrono::DateTime::parse_from_rfc3339(&raw_date)
                .map(|dt| dt.format("%FT%T%:z").to_string())
                .unwrap_or(raw_date);

            let color = color_for_operation(&operation);
            let mut colored = color.paint(operation.as_str()).to_string();
            if !target.is_empty() {
                colored.push_str(&format!(" ({})", target));
            }

            // padding measured on the visible text
            let visible = strip_ansi(&colored).chars().count();
            let padding = " ".repeat(OP_TARGET_MAX.saturating_sub(visible));

            println!(
                "{:<date_w$} | {}{} => {}",
                date,
                colored,
                padding,
                message,
                date_w = date_w
            );
        }

        Ok(())
    }
}
