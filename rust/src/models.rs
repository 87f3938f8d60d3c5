//! Core data types for the planning engine.
//!
//! These are plain values: the engine consumes them and returns them, it never
//! holds storage handles.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Workflow status of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Waiting,
    Done,
}

/// Three-step scale shared by importance, urgency and energy level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Level {
    High,
    #[default]
    Medium,
    Low,
}

/// A task as consumed by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    /// Effort estimate in minutes.
    #[serde(default)]
    pub estimated_minutes: Option<u32>,
    /// 0-100.
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub importance: Level,
    #[serde(default)]
    pub urgency: Level,
    #[serde(default)]
    pub energy_level: Level,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Not actionable before this day.
    #[serde(default)]
    pub start_not_before: Option<NaiveDate>,
    /// Forces placement on this day regardless of capacity.
    #[serde(default)]
    pub pinned_date: Option<NaiveDate>,
    #[serde(default)]
    pub dependency_ids: Vec<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default = "same_day_allowed_default")]
    pub same_day_allowed: bool,
    #[serde(default)]
    pub min_gap_days: u32,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub phase_id: Option<String>,
    /// Recurring definition this task was materialized from.
    #[serde(default)]
    pub recurrence_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn same_day_allowed_default() -> bool {
    true
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            estimated_minutes: None,
            progress: 0,
            status: TaskStatus::Todo,
            importance: Level::Medium,
            urgency: Level::Medium,
            energy_level: Level::Medium,
            due_date: None,
            start_not_before: None,
            pinned_date: None,
            dependency_ids: Vec::new(),
            parent_id: None,
            same_day_allowed: true,
            min_gap_days: 0,
            project_id: None,
            phase_id: None,
            recurrence_id: None,
            notes: None,
        }
    }

    pub fn with_minutes(mut self, minutes: u32) -> Self {
        self.estimated_minutes = Some(minutes);
        self
    }

    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = progress.min(100);
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_importance(mut self, importance: Level) -> Self {
        self.importance = importance;
        self
    }

    pub fn with_urgency(mut self, urgency: Level) -> Self {
        self.urgency = urgency;
        self
    }

    pub fn with_energy(mut self, energy_level: Level) -> Self {
        self.energy_level = energy_level;
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_start_not_before(mut self, date: NaiveDate) -> Self {
        self.start_not_before = Some(date);
        self
    }

    pub fn with_pinned_date(mut self, date: NaiveDate) -> Self {
        self.pinned_date = Some(date);
        self
    }

    pub fn with_dependencies<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependency_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_spacing(mut self, same_day_allowed: bool, min_gap_days: u32) -> Self {
        self.same_day_allowed = same_day_allowed;
        self.min_gap_days = min_gap_days;
        self
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_phase(mut self, phase_id: impl Into<String>) -> Self {
        self.phase_id = Some(phase_id.into());
        self
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    /// Estimate if it is strictly positive.
    pub fn positive_estimate(&self) -> Option<u32> {
        self.estimated_minutes.filter(|m| *m > 0)
    }
}

/// A grouping of tasks inside a project (e.g. a project phase).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub id: String,
    pub name: String,
    pub project_id: Option<String>,
}

impl Phase {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            project_id: None,
        }
    }
}

/// Minutes of one task placed on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleAllocation {
    pub task_id: String,
    pub day: NaiveDate,
    pub minutes_allocated: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDay {
    pub date: NaiveDate,
    pub capacity_minutes: u32,
    pub allocations: Vec<ScheduleAllocation>,
}

impl ScheduleDay {
    pub fn allocated_minutes(&self) -> u32 {
        self.allocations.iter().map(|a| a.minutes_allocated).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskScheduleInfo {
    pub task_id: String,
    pub title: String,
    pub planned_start: NaiveDate,
    pub planned_end: NaiveDate,
    pub total_minutes: u32,
    pub priority_score: f64,
    pub phase_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnscheduledReason {
    /// A referenced dependency id is not in the working set.
    DependencyMissing,
    /// A dependency exists but is not DONE (WAITING included).
    DependencyUnresolved,
    /// Ran out of days within the horizon.
    CapacityExhausted,
}

impl UnscheduledReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnscheduledReason::DependencyMissing => "dependency_missing",
            UnscheduledReason::DependencyUnresolved => "dependency_unresolved",
            UnscheduledReason::CapacityExhausted => "capacity_exhausted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnscheduledTask {
    pub task_id: String,
    pub reason: UnscheduledReason,
}

/// Result of a scheduling pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub start_date: NaiveDate,
    pub days: Vec<ScheduleDay>,
    pub scheduled: Vec<TaskScheduleInfo>,
    pub unscheduled: Vec<UnscheduledTask>,
}

impl ScheduleResponse {
    pub fn day(&self, date: NaiveDate) -> Option<&ScheduleDay> {
        self.days.iter().find(|d| d.date == date)
    }

    pub fn info(&self, task_id: &str) -> Option<&TaskScheduleInfo> {
        self.scheduled.iter().find(|i| i.task_id == task_id)
    }

    /// All allocations of one task, in day order.
    pub fn allocations_for<'a>(
        &'a self,
        task_id: &'a str,
    ) -> impl Iterator<Item = &'a ScheduleAllocation> + 'a {
        self.days
            .iter()
            .flat_map(|d| d.allocations.iter())
            .filter(move |a| a.task_id == task_id)
    }

    pub fn unscheduled_reason(&self, task_id: &str) -> Option<UnscheduledReason> {
        self.unscheduled
            .iter()
            .find(|u| u.task_id == task_id)
            .map(|u| u.reason)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferStatus {
    Healthy,
    Warning,
    Critical,
}

/// Buffer state of one phase.
///
/// `critical_chain_length_minutes` and `total_buffer_minutes` are fixed once the
/// buffer is computed; only consumption updates change the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseBufferInfo {
    pub phase_id: String,
    pub phase_name: String,
    pub critical_chain_length_minutes: u32,
    pub total_buffer_minutes: u32,
    pub consumed_buffer_minutes: u32,
    /// Remaining share of the buffer, 0-100.
    pub buffer_percentage: f64,
    pub status: BufferStatus,
}

/// Frozen copy of a schedule used as a drift baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSnapshot {
    pub id: String,
    pub project_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub schedule: ScheduleResponse,
    pub phase_buffers: Vec<PhaseBufferInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStatus {
    OnTrack,
    Delayed,
    Ahead,
    New,
    Removed,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDiff {
    pub task_id: String,
    pub title: String,
    pub status: DiffStatus,
    pub delay_days: i64,
    pub baseline_end: Option<NaiveDate>,
    pub current_end: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseDiff {
    pub phase_id: String,
    pub phase_name: String,
    pub baseline_end: Option<NaiveDate>,
    pub current_end: Option<NaiveDate>,
    pub delay_days: i64,
    pub total_buffer_minutes: u32,
    pub estimated_consumed_minutes: u32,
    pub buffer_percentage: f64,
    pub status: BufferStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub on_track: usize,
    pub delayed: usize,
    pub ahead: usize,
    pub new: usize,
    pub removed: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDiff {
    pub snapshot_id: String,
    pub tasks: Vec<TaskDiff>,
    pub phases: Vec<PhaseDiff>,
    pub summary: DiffSummary,
}

impl ScheduleDiff {
    pub fn task(&self, task_id: &str) -> Option<&TaskDiff> {
        self.tasks.iter().find(|t| t.task_id == task_id)
    }
}
