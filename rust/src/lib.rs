//! Personal planning engine: dependency validation, critical chains and buffers,
//! recurring task materialization, capacity scheduling and baseline drift.
//!
//! Everything here is a pure computation over values the caller loads and
//! persists. The optional `python` feature exposes the entry points to Python.

// Allow clippy warning triggered by PyO3 macro expansion
#![cfg_attr(feature = "python", allow(clippy::useless_conversion))]

pub mod logging;

pub mod config;
pub mod critical_chain;
pub mod diff;
pub mod error;
pub mod interner;
pub mod models;
pub mod recurrence;
pub mod scheduler;
pub mod scoring;
pub mod snapshot;
pub mod validation;

#[cfg(feature = "python")]
mod python;

pub use config::{BufferConfig, DailyCapacity, DiffConfig, RecurrenceConfig, SchedulingConfig};
pub use critical_chain::{
    calculate_phase_buffer, calculate_phase_buffers, calculate_project_buffer,
    find_critical_chain, get_buffer_status, update_buffer_consumption, CriticalChain,
    ProjectBufferInfo,
};
pub use diff::calculate_diff;
pub use error::{EntityKind, PlanningError, ValidationError};
pub use models::{
    BufferStatus, DiffStatus, DiffSummary, Level, Phase, PhaseBufferInfo, PhaseDiff,
    ScheduleAllocation, ScheduleDay, ScheduleDiff, ScheduleResponse, ScheduleSnapshot, Task,
    TaskDiff, TaskScheduleInfo, TaskStatus, UnscheduledReason, UnscheduledTask,
};
pub use recurrence::{
    build_agenda, ensure_upcoming_meetings, ensure_upcoming_tasks, CheckIn, Frequency,
    MeetingDefinition, RecurrenceRule, RecurringTaskDefinition,
};
pub use scheduler::{
    build_schedule, check_schedule_feasibility, get_today_tasks, Assignments, FeasibilityReport,
    TodayView,
};
pub use scoring::{priority_score, remaining_minutes, GroupPriorities};
pub use snapshot::SnapshotRegistry;
pub use validation::{validate_dependencies, validate_parent_assignment, TaskLookup};
