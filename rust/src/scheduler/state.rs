//! Mutable bookkeeping for one scheduling pass.

use chrono::NaiveDate;
use rustc_hash::FxHashMap;

use crate::models::Task;

/// Remaining effort and placed days per candidate.
#[derive(Clone, Debug, Default)]
pub struct SchedulerState {
    /// Minutes still to place: task_id -> minutes
    pub remaining: FxHashMap<String, u32>,
    /// Days a task has allocations on, in placement order
    pub placed_days: FxHashMap<String, Vec<NaiveDate>>,
    /// Subtasks per parent: parent_id -> [task_id]
    siblings: FxHashMap<String, Vec<String>>,
}

impl SchedulerState {
    pub fn new<'a>(candidates: impl IntoIterator<Item = (&'a Task, u32)>) -> Self {
        let mut state = SchedulerState::default();
        for (task, minutes) in candidates {
            state.remaining.insert(task.id.clone(), minutes);
            if let Some(parent) = &task.parent_id {
                state
                    .siblings
                    .entry(parent.clone())
                    .or_default()
                    .push(task.id.clone());
            }
        }
        state
    }

    pub fn remaining(&self, task_id: &str) -> u32 {
        self.remaining.get(task_id).copied().unwrap_or(0)
    }

    pub fn record(&mut self, task_id: &str, day: NaiveDate, minutes: u32) {
        if let Some(left) = self.remaining.get_mut(task_id) {
            *left = left.saturating_sub(minutes);
        }
        self.placed_days
            .entry(task_id.to_string())
            .or_default()
            .push(day);
    }

    /// Whether `task` may take `day` given where its siblings already sit.
    ///
    /// The stricter of the two tasks' rules applies: the same day is blocked if
    /// either disallows it, other days must be at least the larger
    /// `min_gap_days` apart.
    pub fn spacing_allows(&self, task: &Task, day: NaiveDate, by_id: &FxHashMap<&str, &Task>) -> bool {
        let Some(parent) = &task.parent_id else {
            return true;
        };
        let Some(siblings) = self.siblings.get(parent) else {
            return true;
        };
        for sibling_id in siblings {
            if *sibling_id == task.id {
                continue;
            }
            let (Some(sibling), Some(days)) =
                (by_id.get(sibling_id.as_str()), self.placed_days.get(sibling_id))
            else {
                continue;
            };
            let same_day_allowed = task.same_day_allowed && sibling.same_day_allowed;
            let min_gap = task.min_gap_days.max(sibling.min_gap_days) as i64;
            for &other in days {
                let gap = (day - other).num_days().abs();
                if gap == 0 {
                    if !same_day_allowed {
                        return false;
                    }
                } else if gap < min_gap {
                    return false;
                }
            }
        }
        true
    }
}
