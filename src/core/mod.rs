pub mod log;
pub mod timer;

pub use timer::TimerLifecycleManager;
