//! focusplan-core: the auto-scheduling engine.
//!
//! Takes pending tasks, fixed events and a working-hours policy and returns
//! the placements to persist. No I/O happens here.

pub mod availability;
pub mod behavior;
pub mod dependency;
pub mod engine;
pub mod policy;
pub mod prioritizer;
pub mod session_queue;
pub mod task;
pub mod time;

pub use availability::{BusyCalendar, Interval, WorkWindow, free_intervals};
pub use behavior::{OverrunSample, average_overrun_minutes, inflate_estimates};
pub use dependency::{Resolution, ResolveOutcome, resolve};
pub use engine::{Scheduler, auto_schedule, busy_time, is_schedulable};
pub use policy::SchedulePolicy;
pub use prioritizer::{compare_tasks, deadline_score, prioritize};
pub use session_queue::{Lane, QueueEntry, SessionQueues};
pub use task::{
    Event, Insert, ScheduleResult, ScheduleSummary, Settings, SettingsRow, Task, Update,
};
pub use time::{add_days, next_weekday, to_minutes, to_time_string};
