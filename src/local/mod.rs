pub mod channel;
pub mod storage;

pub use channel::{TimerChannel, TimerEvent};
pub use storage::{ACTIVE_TIMER_KEY, FileTimerStorage, MemoryTimerStorage, TimerStorage};
