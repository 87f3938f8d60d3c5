//! Day-by-day capacity scheduler.
//!
//! Tasks are filtered for actionability, scored, and placed greedily into
//! consecutive days of limited capacity. Large tasks carry their remainder into
//! later days; anything that does not fully fit the horizon is reported as
//! unscheduled rather than partially planned.

mod core;
mod day_ledger;
mod state;
mod views;

pub use core::{blocking_reason, build_schedule, Assignments, DayScheduler};
pub use day_ledger::{DayLedger, DaySlot};
pub use state::SchedulerState;
pub use views::{check_schedule_feasibility, get_today_tasks, FeasibilityReport, TodayItem, TodayView};
