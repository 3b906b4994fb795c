pub mod clear;
pub mod config;
pub mod entries;
pub mod init;
pub mod log;
pub mod pause;
pub mod recover;
pub mod start;
pub mod status;
pub mod stop;
pub mod ticket;
pub mod user;

use crate::config::Config;
use crate::core::timer::TimerLifecycleManager;
use crate::errors::AppResult;
use crate::local::FileTimerStorage;
use crate::store::SqliteTicketStore;
use crate::utils::time::SystemClock;

pub type CliTimer = TimerLifecycleManager<SqliteTicketStore, FileTimerStorage, SystemClock>;

/// Timer manager wired to the configured database and state file.
pub fn open_timer(cfg: &Config) -> AppResult<CliTimer> {
    let store = SqliteTicketStore::open(&cfg.database)?;
    let local = FileTimerStorage::new(&cfg.state_file);
    Ok(TimerLifecycleManager::new(
        store,
        local,
        SystemClock,
        cfg.operator.clone(),
    ))
}
