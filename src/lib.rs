pub mod clock;
pub mod configuration;
pub mod error;
pub mod executor;
pub mod logger;
pub mod manual_timer;
pub mod scheduler;
pub mod stopwatch;
pub mod time_string;
pub mod timer;
pub mod tokio_timer;

pub use self::{
    clock::Clock,
    configuration::Configuration,
    error::Error,
    executor::Executor,
    logger::{Logger, PartialLogger},
    manual_timer::{ManualHandle, ManualTimer},
    scheduler::{aligned_delay, catch_up, first_boundary_after, Callback, Scheduler},
    stopwatch::{Snapshot, Stopwatch, WeakStopwatch, DEFAULT_RESOLUTION},
    time_string::{format_duration, parse_start_time},
    timer::Timer,
    tokio_timer::TokioTimer,
};
