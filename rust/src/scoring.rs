//! Task scoring for the scheduler.
//!
//! A task's priority score combines:
//! - importance weight
//! - urgency weight
//! - due-date proximity bonus (non-decreasing towards the due date, saturating on it)
//! - grouping priority (phase priority if known, else project priority)

use chrono::NaiveDate;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;

use crate::config::SchedulingConfig;
use crate::models::Task;

/// Priority per grouping id (project or phase), typically 0-100.
pub type GroupPriorities = FxHashMap<String, i32>;

/// Minutes still to be worked on a task.
///
/// `round(E × (100 − P) / 100)`, never below `min(min_allocation_minutes, E)` so a
/// task that is not DONE never vanishes from the plan. Tasks without a positive
/// estimate use `default_estimated_minutes` as `E`.
pub fn remaining_minutes(task: &Task, config: &SchedulingConfig) -> u32 {
    let estimate = task
        .positive_estimate()
        .unwrap_or(config.default_estimated_minutes) as u64;
    let left = 100 - task.progress.min(100) as u64;
    // Integer round-half-up of estimate * left / 100
    let remaining = (estimate * left + 50) / 100;
    let floor = (config.min_allocation_minutes as u64).min(estimate).max(1);
    remaining.max(floor) as u32
}

/// Bonus for due-date proximity as seen from `reference`.
///
/// Zero while the due date is `due_bonus_window_days` or more away, then a
/// linear ramp up to `due_bonus_max`, which holds on and after the due date.
pub fn due_date_bonus(
    due_date: Option<NaiveDate>,
    reference: NaiveDate,
    config: &SchedulingConfig,
) -> f64 {
    let Some(due) = due_date else {
        return 0.0;
    };
    let days_left = (due - reference).num_days();
    if days_left <= 0 {
        return config.due_bonus_max;
    }
    let window = config.due_bonus_window_days as i64;
    if days_left >= window {
        return 0.0;
    }
    config.due_bonus_max * (window - days_left) as f64 / window as f64
}

/// Grouping priority for a task: phase first, then project.
pub fn group_priority(task: &Task, priorities: &GroupPriorities) -> Option<i32> {
    task.phase_id
        .as_ref()
        .and_then(|id| priorities.get(id))
        .or_else(|| task.project_id.as_ref().and_then(|id| priorities.get(id)))
        .copied()
}

/// Compute the priority score of a task. Higher = schedule earlier.
pub fn priority_score(
    task: &Task,
    reference: NaiveDate,
    priorities: &GroupPriorities,
    config: &SchedulingConfig,
) -> f64 {
    let group = group_priority(task, priorities).unwrap_or(0) as f64;
    config.importance_weight(task.importance)
        + config.urgency_weight(task.urgency)
        + due_date_bonus(task.due_date, reference, config)
        + config.group_priority_weight * group
}

/// Sort key for candidate ordering.
///
/// Implements `Ord` so that lower = place first: score descending, then due date
/// ascending with undated tasks last, then task id.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreKey {
    pub score: f64,
    pub due_date: Option<NaiveDate>,
    pub task_id: String,
}

impl ScoreKey {
    pub fn new(task: &Task, score: f64) -> Self {
        Self {
            score,
            due_date: task.due_date,
            task_id: task.id.clone(),
        }
    }
}

/// Compare f64 values for sorting, treating NaN as equal.
fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

fn cmp_due(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl Eq for ScoreKey {}

impl Ord for ScoreKey {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_f64(other.score, self.score)
            .then(cmp_due(self.due_date, other.due_date))
            .then(self.task_id.cmp(&other.task_id))
    }
}

impl PartialOrd for ScoreKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Score and order tasks, most urgent first.
pub fn rank_tasks<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    reference: NaiveDate,
    priorities: &GroupPriorities,
    config: &SchedulingConfig,
) -> Vec<ScoreKey> {
    let mut keys: Vec<ScoreKey> = tasks
        .into_iter()
        .map(|t| ScoreKey::new(t, priority_score(t, reference, priorities, config)))
        .collect();
    keys.sort();
    keys
}
