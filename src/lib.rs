//! repairtimer library root.
//! Exposes the timer core, its persistence seams, the CLI parser and the
//! high-level run() used by main.rs.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod local;
pub mod models;
pub mod store;
pub mod ui;
pub mod utils;

pub use crate::core::TimerLifecycleManager;
pub use errors::{AppError, AppResult, ErrorKind};
pub use local::{FileTimerStorage, MemoryTimerStorage, TimerChannel, TimerEvent, TimerStorage};
pub use store::{SqliteTicketStore, TicketTimeStore};

use clap::Parser;
use cli::commands;
use cli::parser::{Cli, Commands};
use config::Config;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Init => commands::init::handle(cli, cfg),
        Commands::Config { .. } => commands::config::handle(&cli.command, cfg),
        Commands::Ticket { .. } => commands::ticket::handle(&cli.command, cfg),
        Commands::User { .. } => commands::user::handle(&cli.command, cfg),
        Commands::Start { .. } => commands::start::handle(&cli.command, cfg),
        Commands::Pause | Commands::Resume => commands::pause::handle(&cli.command, cfg),
        Commands::Stop { .. } => commands::stop::handle(&cli.command, cfg),
        Commands::Status { .. } => commands::status::handle(&cli.command, cfg),
        Commands::Recover { .. } => commands::recover::handle(&cli.command, cfg),
        Commands::ClearLocal | Commands::ClearServer { .. } => {
            commands::clear::handle(&cli.command, cfg)
        }
        Commands::Entries { .. } => commands::entries::handle(&cli.command, cfg),
        Commands::Log { .. } => commands::log::handle(&cli.command, cfg),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    let mut cfg = Config::load()?;

    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }
    if let Some(state) = &cli.state {
        cfg.state_file = state.clone();
    }
    if let Some(operator) = &cli.operator {
        cfg.operator = operator.clone();
    }

    dispatch(&cli, &cfg)
}
