//! Views derived from a schedule: today's work and single-day feasibility.

use chrono::NaiveDate;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::config::{DailyCapacity, SchedulingConfig};
use crate::models::{ScheduleResponse, Task, UnscheduledReason};
use crate::scoring::{priority_score, remaining_minutes, GroupPriorities};

use super::core::{blocking_reason, build_schedule};

/// One allocation of today, joined with its task.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TodayItem {
    pub task_id: String,
    pub title: String,
    pub minutes: u32,
    pub priority_score: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TodayView {
    pub date: NaiveDate,
    /// Allocations in schedule order
    pub items: Vec<TodayItem>,
    pub total_minutes: u32,
    pub capacity_minutes: u32,
    pub overflow: bool,
    pub overflow_minutes: u32,
    /// Best-scored items that are not blocked, at most `top_n`
    pub top: Vec<TodayItem>,
}

/// Today's slice of a schedule.
///
/// `tasks` is the current task set: an allocation whose task now waits on an
/// unresolved or missing dependency stays in `items` but is kept out of `top`.
pub fn get_today_tasks(
    schedule: &ScheduleResponse,
    tasks: &[Task],
    today: NaiveDate,
    config: &SchedulingConfig,
) -> TodayView {
    let by_id: FxHashMap<&str, &Task> = tasks.iter().map(|t| (t.id.as_str(), t)).collect();
    let day = schedule.day(today);

    let items: Vec<TodayItem> = day
        .map(|d| d.allocations.as_slice())
        .unwrap_or_default()
        .iter()
        .map(|allocation| {
            let info = schedule.info(&allocation.task_id);
            TodayItem {
                task_id: allocation.task_id.clone(),
                title: info
                    .map(|i| i.title.clone())
                    .or_else(|| by_id.get(allocation.task_id.as_str()).map(|t| t.title.clone()))
                    .unwrap_or_default(),
                minutes: allocation.minutes_allocated,
                priority_score: info.map_or(0.0, |i| i.priority_score),
            }
        })
        .collect();

    let total_minutes: u32 = items.iter().map(|i| i.minutes).sum();
    let capacity_minutes = day.map_or(0, |d| d.capacity_minutes);

    let mut top: Vec<TodayItem> = items
        .iter()
        .filter(|item| {
            by_id
                .get(item.task_id.as_str())
                .is_some_and(|t| !t.is_done() && blocking_reason(t, &by_id).is_none())
        })
        .cloned()
        .collect();
    top.sort_by(|a, b| {
        b.priority_score
            .partial_cmp(&a.priority_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.task_id.cmp(&b.task_id))
    });
    top.truncate(config.top_n);

    TodayView {
        date: today,
        items,
        total_minutes,
        capacity_minutes,
        overflow: total_minutes > capacity_minutes,
        overflow_minutes: total_minutes.saturating_sub(capacity_minutes),
        top,
    }
}

/// Whether a set of candidate tasks fits into one day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeasibilityReport {
    pub date: NaiveDate,
    pub capacity_minutes: u32,
    /// Remaining effort of every actionable candidate
    pub total_minutes: u32,
    pub overflow_minutes: u32,
    pub fits: Vec<String>,
    pub overflow: Vec<String>,
    /// Candidates held back by their dependencies
    pub blocked: Vec<String>,
    pub suggestion: Option<String>,
}

impl FeasibilityReport {
    pub fn is_feasible(&self) -> bool {
        self.overflow.is_empty()
    }
}

/// Run one day of placement over `tasks` and report what fits.
pub fn check_schedule_feasibility(
    tasks: &[Task],
    capacity: &DailyCapacity,
    date: NaiveDate,
    priorities: &GroupPriorities,
    config: &SchedulingConfig,
) -> FeasibilityReport {
    let schedule = build_schedule(tasks, capacity, date, 1, priorities, None, config);
    let by_id: FxHashMap<&str, &Task> = tasks.iter().map(|t| (t.id.as_str(), t)).collect();
    let minutes_of = |id: &str| {
        by_id
            .get(id)
            .map_or(0, |t| remaining_minutes(t, config))
    };

    let mut fits: Vec<String> = Vec::new();
    if let Some(day) = schedule.days.first() {
        for allocation in &day.allocations {
            if !fits.contains(&allocation.task_id) {
                fits.push(allocation.task_id.clone());
            }
        }
    }

    let mut overflow: Vec<String> = Vec::new();
    let mut blocked: Vec<String> = Vec::new();
    for entry in &schedule.unscheduled {
        match entry.reason {
            UnscheduledReason::CapacityExhausted => overflow.push(entry.task_id.clone()),
            UnscheduledReason::DependencyMissing | UnscheduledReason::DependencyUnresolved => {
                blocked.push(entry.task_id.clone())
            }
        }
    }
    // Least important overflow first in the suggestion
    overflow.sort_by(|a, b| {
        let score = |id: &str| {
            by_id
                .get(id)
                .map_or(0.0, |t| priority_score(t, date, priorities, config))
        };
        score(a.as_str())
            .partial_cmp(&score(b.as_str()))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.cmp(b))
    });

    let fit_minutes: u32 = fits.iter().map(|id| minutes_of(id.as_str())).sum();
    let overflow_minutes: u32 = overflow.iter().map(|id| minutes_of(id.as_str())).sum();
    let capacity_minutes = capacity.minutes_for(date);

    let suggestion = if overflow.is_empty() {
        None
    } else {
        Some(format!(
            "{} task(s) totalling {} min do not fit the {} min available on {}. \
             Consider moving to a later day: {}",
            overflow.len(),
            overflow_minutes,
            capacity_minutes,
            date,
            overflow.join(", ")
        ))
    };

    FeasibilityReport {
        date,
        capacity_minutes,
        total_minutes: fit_minutes + overflow_minutes,
        overflow_minutes,
        fits,
        overflow,
        blocked,
        suggestion,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Level, TaskStatus};

    fn d(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn plan(tasks: &[Task], minutes: u32) -> ScheduleResponse {
        build_schedule(
            tasks,
            &DailyCapacity::Flat(minutes),
            d(2025, 1, 6),
            3,
            &GroupPriorities::default(),
            None,
            &SchedulingConfig::default(),
        )
    }

    #[test]
    fn test_today_view_top_excludes_blocked() {
        let mut tasks = vec![
            Task::new("a", "Alpha").with_minutes(30).with_importance(Level::High),
            Task::new("b", "Beta").with_minutes(30),
            Task::new("c", "Gamma").with_minutes(30).with_importance(Level::Low),
            Task::new("d", "Delta").with_minutes(30).with_importance(Level::Low),
            Task::new("e", "Epsilon").with_minutes(30).with_importance(Level::Low),
        ];
        let schedule = plan(&tasks, 480);

        // Since planning, b picked up a dependency on an open task
        tasks[1].dependency_ids = vec!["c".to_string()];
        let view = get_today_tasks(&schedule, &tasks, d(2025, 1, 6), &SchedulingConfig::default());

        assert_eq!(view.items.len(), 5);
        assert_eq!(view.total_minutes, 150);
        assert_eq!(view.capacity_minutes, 480);
        assert!(!view.overflow);
        let top: Vec<&str> = view.top.iter().map(|i| i.task_id.as_str()).collect();
        assert_eq!(top, vec!["a", "c", "d"]);
        assert_eq!(view.items[0].title, "Alpha");
    }

    #[test]
    fn test_today_view_overflow_from_pins() {
        let tasks = vec![
            Task::new("pinned", "Pinned").with_minutes(90).with_pinned_date(d(2025, 1, 6)),
            Task::new("done", "Done").with_status(TaskStatus::Done),
        ];
        let schedule = plan(&tasks, 60);
        let view = get_today_tasks(&schedule, &tasks, d(2025, 1, 6), &SchedulingConfig::default());
        assert!(view.overflow);
        assert_eq!(view.overflow_minutes, 30);

        let empty = get_today_tasks(&schedule, &tasks, d(2025, 2, 1), &SchedulingConfig::default());
        assert!(empty.items.is_empty());
        assert_eq!(empty.capacity_minutes, 0);
        assert!(!empty.overflow);
    }

    #[test]
    fn test_feasibility_split() {
        let tasks = vec![
            Task::new("must", "Must").with_minutes(60).with_importance(Level::High),
            Task::new("should", "Should").with_minutes(45),
            Task::new("could", "Could").with_minutes(30).with_importance(Level::Low),
            Task::new("later", "Later").with_minutes(10).with_dependencies(["could"]),
        ];
        let report = check_schedule_feasibility(
            &tasks,
            &DailyCapacity::Flat(90),
            d(2025, 1, 6),
            &GroupPriorities::default(),
            &SchedulingConfig::default(),
        );

        // should cannot finish today; could takes the 30 minutes left behind must
        assert_eq!(report.fits, vec!["must", "could"]);
        assert_eq!(report.overflow, vec!["should"]);
        assert_eq!(report.blocked, vec!["later"]);
        assert_eq!(report.total_minutes, 135);
        assert_eq!(report.overflow_minutes, 45);
        assert!(!report.is_feasible());
        let suggestion = report.suggestion.unwrap();
        assert!(suggestion.starts_with("1 task(s) totalling 45 min"));
        assert!(suggestion.ends_with("later day: should"));
    }

    #[test]
    fn test_feasibility_all_fit() {
        let tasks = vec![Task::new("a", "A").with_minutes(20)];
        let report = check_schedule_feasibility(
            &tasks,
            &DailyCapacity::Flat(60),
            d(2025, 1, 6),
            &GroupPriorities::default(),
            &SchedulingConfig::default(),
        );
        assert!(report.is_feasible());
        assert_eq!(report.suggestion, None);
        assert_eq!(report.total_minutes, 20);
    }
}
