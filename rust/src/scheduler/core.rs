//! Greedy day-by-day scheduler.

use chrono::NaiveDate;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::{DailyCapacity, SchedulingConfig};
use crate::models::{
    Level, ScheduleResponse, Task, TaskScheduleInfo, TaskStatus, UnscheduledReason,
    UnscheduledTask,
};
use crate::scoring::{priority_score, rank_tasks, remaining_minutes, GroupPriorities};
use crate::{log_changes, log_checks, log_debug};

use super::day_ledger::DayLedger;
use super::state::SchedulerState;

/// Manual day assignments for one run: task_id -> day.
pub type Assignments = FxHashMap<String, NaiveDate>;

/// Why a task cannot be worked on right now, if anything.
///
/// Missing dependencies win over unresolved ones. A WAITING task is unresolved
/// even when all its dependencies are DONE.
pub fn blocking_reason(task: &Task, by_id: &FxHashMap<&str, &Task>) -> Option<UnscheduledReason> {
    if task
        .dependency_ids
        .iter()
        .any(|dep| !by_id.contains_key(dep.as_str()))
    {
        return Some(UnscheduledReason::DependencyMissing);
    }
    let unresolved = task
        .dependency_ids
        .iter()
        .filter_map(|dep| by_id.get(dep.as_str()))
        .any(|dep| !dep.is_done());
    if unresolved || task.status == TaskStatus::Waiting {
        return Some(UnscheduledReason::DependencyUnresolved);
    }
    None
}

fn is_high_energy(task: &Task) -> bool {
    task.energy_level == Level::High
}

/// Places tasks into consecutive days of limited capacity.
pub struct DayScheduler<'a> {
    tasks: &'a [Task],
    by_id: FxHashMap<&'a str, &'a Task>,
    capacity: &'a DailyCapacity,
    start_date: NaiveDate,
    max_days: u32,
    priorities: &'a GroupPriorities,
    assignments: Option<&'a Assignments>,
    config: &'a SchedulingConfig,
}

impl<'a> DayScheduler<'a> {
    pub fn new(
        tasks: &'a [Task],
        capacity: &'a DailyCapacity,
        start_date: NaiveDate,
        max_days: u32,
        priorities: &'a GroupPriorities,
        config: &'a SchedulingConfig,
    ) -> Self {
        let by_id = tasks.iter().map(|t| (t.id.as_str(), t)).collect();
        Self {
            tasks,
            by_id,
            capacity,
            start_date,
            max_days,
            priorities,
            assignments: None,
            config,
        }
    }

    pub fn with_assignments(mut self, assignments: &'a Assignments) -> Self {
        self.assignments = Some(assignments);
        self
    }

    /// Forced day for a task; a manual assignment beats the stored pin.
    fn pin_for(&self, task: &Task) -> Option<NaiveDate> {
        self.assignments
            .and_then(|a| a.get(&task.id).copied())
            .or(task.pinned_date)
    }

    /// Whether `task` can receive minutes on slot `idx`.
    fn can_take(&self, task: &Task, idx: usize, ledger: &DayLedger, state: &SchedulerState) -> bool {
        let slot = ledger.slot(idx);
        if state.remaining(&task.id) == 0 || slot.has_task(&task.id) {
            return false;
        }
        if task.start_not_before.is_some_and(|d| d > slot.date) {
            return false;
        }
        if !state.spacing_allows(task, slot.date, &self.by_id) {
            log_debug!(
                self.config.verbosity,
                "    {} blocked on {} by sibling spacing",
                task.id,
                slot.date
            );
            return false;
        }
        true
    }

    /// `queue` minus the dropped ids, order kept.
    fn without(queue: &[&'a Task], dropped: &[&str]) -> Vec<&'a Task> {
        queue
            .iter()
            .copied()
            .filter(|t| !dropped.contains(&t.id.as_str()))
            .collect()
    }

    /// Greedy day-by-day placement of `tasks` on top of the pinned bookings.
    ///
    /// Each day takes the best eligible task, one allocation per task per day,
    /// until the day is full or nothing eligible is left.
    fn place(
        &self,
        tasks: &[&'a Task],
        pinned_ledger: &DayLedger,
        pinned_state: &SchedulerState,
    ) -> (DayLedger, SchedulerState) {
        let config = self.config;
        let verbosity = config.verbosity;
        let mut ledger = pinned_ledger.clone();
        let mut state = pinned_state.clone();
        let mut queue: Vec<&Task> = tasks.to_vec();

        for idx in 0..ledger.len() {
            if queue.is_empty() {
                break;
            }
            log_changes!(
                verbosity,
                "Day: {} ({} of {} min free)",
                ledger.slot(idx).date,
                ledger.slot(idx).free_minutes(),
                ledger.slot(idx).capacity_minutes
            );

            loop {
                let slot = ledger.slot(idx);
                let date = slot.date;
                let free = slot.free_minutes();
                if free == 0 {
                    break;
                }
                let guard = slot.high_energy_minutes as f64
                    > config.high_energy_share * slot.capacity_minutes as f64;

                let eligible: Vec<&Task> = queue
                    .iter()
                    .copied()
                    .filter(|t| self.can_take(t, idx, &ledger, &state))
                    .collect();
                let pick = if guard {
                    let calmer = eligible.iter().copied().find(|t| !is_high_energy(t));
                    if calmer.is_some() {
                        log_checks!(verbosity, "  Energy guard active on {}", date);
                    }
                    calmer.or_else(|| eligible.first().copied())
                } else {
                    eligible.first().copied()
                };
                let Some(task) = pick else {
                    break;
                };

                let minutes = state.remaining(&task.id).min(free);
                ledger.book(idx, &task.id, minutes, is_high_energy(task));
                state.record(&task.id, date, minutes);
                log_debug!(
                    verbosity,
                    "  Placed {} on {}: {} min ({} left)",
                    task.id,
                    date,
                    minutes,
                    state.remaining(&task.id)
                );
            }

            queue.retain(|t| state.remaining(&t.id) > 0);
        }

        (ledger, state)
    }

    /// Run the scheduling pass.
    pub fn schedule(&self) -> ScheduleResponse {
        let config = self.config;
        let verbosity = config.verbosity;

        // Parents whose subtasks are present only summarize them
        let containers: FxHashSet<&str> = self
            .tasks
            .iter()
            .filter_map(|t| t.parent_id.as_deref())
            .filter(|parent| self.by_id.contains_key(parent))
            .collect();

        let mut unscheduled: Vec<UnscheduledTask> = Vec::new();
        let mut candidates: Vec<&Task> = Vec::new();
        for task in self.tasks {
            if task.is_done() || containers.contains(task.id.as_str()) {
                continue;
            }
            if let Some(reason) = blocking_reason(task, &self.by_id) {
                log_checks!(verbosity, "  Skipping {}: {}", task.id, reason.as_str());
                unscheduled.push(UnscheduledTask {
                    task_id: task.id.clone(),
                    reason,
                });
                continue;
            }
            candidates.push(task);
        }

        let ranked = rank_tasks(
            candidates.iter().copied(),
            self.start_date,
            self.priorities,
            config,
        );
        log_debug!(
            verbosity,
            "Candidate order: {:?}",
            ranked.iter().map(|k| k.task_id.as_str()).collect::<Vec<_>>()
        );
        log_changes!(
            verbosity,
            "Scheduling {} tasks over {} days from {}",
            ranked.len(),
            self.max_days,
            self.start_date
        );

        let mut pinned_state = SchedulerState::new(
            candidates
                .iter()
                .map(|t| (*t, remaining_minutes(t, config))),
        );
        let mut pinned_ledger = DayLedger::new(self.start_date, self.max_days, self.capacity);

        // Pinned work goes in first, whole, regardless of capacity
        let mut queue: Vec<&Task> = Vec::with_capacity(ranked.len());
        for key in &ranked {
            let Some(task) = self.by_id.get(key.task_id.as_str()).copied() else {
                continue;
            };
            let Some(pin) = self.pin_for(task) else {
                queue.push(task);
                continue;
            };
            let day = pin.max(self.start_date);
            match pinned_ledger.index_of(day) {
                Some(idx) => {
                    let minutes = pinned_state.remaining(&task.id);
                    pinned_ledger.book(idx, &task.id, minutes, is_high_energy(task));
                    pinned_state.record(&task.id, day, minutes);
                    log_changes!(verbosity, "  Pinned {} on {} ({} min)", task.id, day, minutes);
                }
                None => {
                    log_checks!(verbosity, "  Pin {} for {} is outside the horizon", day, task.id);
                }
            }
        }

        // A task that cannot be finished inside the horizon gets no minutes.
        // Replan without the best-ranked unfinished task until every placed
        // task is complete.
        let mut dropped: Vec<&str> = Vec::new();
        let (mut ledger, mut state) = loop {
            let round = Self::without(&queue, &dropped);
            let (ledger, state) = self.place(&round, &pinned_ledger, &pinned_state);
            match round.iter().copied().find(|t| state.remaining(&t.id) > 0) {
                None => break (ledger, state),
                Some(task) => {
                    log_changes!(
                        verbosity,
                        "  {} does not fit the horizon, replanning without it",
                        task.id
                    );
                    dropped.push(task.id.as_str());
                }
            }
        };

        // Minutes freed by later drops may hold an earlier one
        let mut next = 0;
        while next < dropped.len() {
            let mut retry = dropped.clone();
            let task_id = retry.remove(next);
            let round = Self::without(&queue, &retry);
            let (trial_ledger, trial_state) = self.place(&round, &pinned_ledger, &pinned_state);
            if round.iter().all(|t| trial_state.remaining(&t.id) == 0) {
                log_changes!(verbosity, "  {} fits after all", task_id);
                ledger = trial_ledger;
                state = trial_state;
                dropped = retry;
            } else {
                next += 1;
            }
        }

        for key in &ranked {
            if state.remaining(&key.task_id) == 0 {
                continue;
            }
            log_checks!(verbosity, "  {} is out of capacity", key.task_id);
            unscheduled.push(UnscheduledTask {
                task_id: key.task_id.clone(),
                reason: UnscheduledReason::CapacityExhausted,
            });
        }

        let days = ledger.into_days();

        // task_id -> (first day, last day, minutes)
        let mut spans: FxHashMap<&str, (NaiveDate, NaiveDate, u32)> = FxHashMap::default();
        for allocation in days.iter().flat_map(|d| d.allocations.iter()) {
            let span = spans
                .entry(allocation.task_id.as_str())
                .or_insert((allocation.day, allocation.day, 0));
            span.0 = span.0.min(allocation.day);
            span.1 = span.1.max(allocation.day);
            span.2 += allocation.minutes_allocated;
        }

        let mut scheduled: Vec<TaskScheduleInfo> = Vec::new();
        for key in &ranked {
            let (Some(task), Some(&(start, end, total))) = (
                self.by_id.get(key.task_id.as_str()),
                spans.get(key.task_id.as_str()),
            ) else {
                continue;
            };
            scheduled.push(TaskScheduleInfo {
                task_id: task.id.clone(),
                title: task.title.clone(),
                planned_start: start,
                planned_end: end,
                total_minutes: total,
                priority_score: key.score,
                phase_id: task.phase_id.clone(),
            });
        }

        for parent in self.tasks {
            if parent.is_done() || !containers.contains(parent.id.as_str()) {
                continue;
            }
            let children = scheduled
                .iter()
                .filter(|info| {
                    self.by_id
                        .get(info.task_id.as_str())
                        .is_some_and(|t| t.parent_id.as_deref() == Some(parent.id.as_str()))
                })
                .fold(None, |acc: Option<(NaiveDate, NaiveDate, u32)>, info| {
                    Some(match acc {
                        None => (info.planned_start, info.planned_end, info.total_minutes),
                        Some((s, e, m)) => (
                            s.min(info.planned_start),
                            e.max(info.planned_end),
                            m + info.total_minutes,
                        ),
                    })
                });
            if let Some((start, end, total)) = children {
                scheduled.push(TaskScheduleInfo {
                    task_id: parent.id.clone(),
                    title: parent.title.clone(),
                    planned_start: start,
                    planned_end: end,
                    total_minutes: total,
                    priority_score: priority_score(parent, self.start_date, self.priorities, config),
                    phase_id: parent.phase_id.clone(),
                });
            }
        }

        ScheduleResponse {
            start_date: self.start_date,
            days,
            scheduled,
            unscheduled,
        }
    }
}

/// Build a schedule over `max_days` days starting at `start_date`.
pub fn build_schedule(
    tasks: &[Task],
    capacity: &DailyCapacity,
    start_date: NaiveDate,
    max_days: u32,
    priorities: &GroupPriorities,
    assignments: Option<&Assignments>,
    config: &SchedulingConfig,
) -> ScheduleResponse {
    let scheduler = DayScheduler::new(tasks, capacity, start_date, max_days, priorities, config);
    match assignments {
        Some(assignments) => scheduler.with_assignments(assignments).schedule(),
        None => scheduler.schedule(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn d(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn run(tasks: &[Task], minutes_per_day: u32, days: u32) -> ScheduleResponse {
        build_schedule(
            tasks,
            &DailyCapacity::Flat(minutes_per_day),
            d(2025, 1, 6),
            days,
            &GroupPriorities::default(),
            None,
            &SchedulingConfig::default(),
        )
    }

    fn day_ids(schedule: &ScheduleResponse, date: NaiveDate) -> Vec<&str> {
        schedule
            .day(date)
            .map(|day| day.allocations.iter().map(|a| a.task_id.as_str()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_task_split_across_days() {
        let tasks = vec![Task::new("big", "Big").with_minutes(120)];
        let schedule = run(&tasks, 60, 3);

        let allocations: Vec<_> = schedule.allocations_for("big").collect();
        assert_eq!(allocations.len(), 2);
        assert_eq!(allocations[0].day, d(2025, 1, 6));
        assert_eq!(allocations[1].day, d(2025, 1, 7));
        assert_eq!(allocations.iter().map(|a| a.minutes_allocated).sum::<u32>(), 120);
        assert_eq!(schedule.days.len(), 3);

        let info = schedule.info("big").unwrap();
        assert_eq!(info.planned_start, d(2025, 1, 6));
        assert_eq!(info.planned_end, d(2025, 1, 7));
        assert_eq!(info.total_minutes, 120);
        assert!(schedule.unscheduled.is_empty());
    }

    #[test]
    fn test_dependency_resolution() {
        let a = Task::new("a", "A").with_minutes(30);
        let b = Task::new("b", "B").with_minutes(30).with_dependencies(["a"]);

        let schedule = run(&[a.clone(), b.clone()], 480, 1);
        assert_eq!(
            schedule.unscheduled_reason("b"),
            Some(UnscheduledReason::DependencyUnresolved)
        );
        assert!(schedule.info("a").is_some());

        let done = a.with_status(TaskStatus::Done);
        let schedule = run(&[done, b], 480, 1);
        assert!(schedule.info("b").is_some());
        assert!(schedule.info("a").is_none());
        assert_eq!(schedule.unscheduled_reason("a"), None);
    }

    #[test]
    fn test_missing_dependency_and_waiting() {
        let tasks = vec![
            Task::new("orphan", "Orphan").with_dependencies(["ghost"]),
            Task::new("waiting", "Waiting").with_status(TaskStatus::Waiting),
            Task::new("blocked", "Blocked").with_dependencies(["waiting"]),
        ];
        let schedule = run(&tasks, 480, 1);
        assert_eq!(
            schedule.unscheduled_reason("orphan"),
            Some(UnscheduledReason::DependencyMissing)
        );
        assert_eq!(
            schedule.unscheduled_reason("waiting"),
            Some(UnscheduledReason::DependencyUnresolved)
        );
        assert_eq!(
            schedule.unscheduled_reason("blocked"),
            Some(UnscheduledReason::DependencyUnresolved)
        );
        assert!(schedule.scheduled.is_empty());
    }

    #[test]
    fn test_priority_order_within_day() {
        let tasks = vec![
            Task::new("low", "Low").with_minutes(30).with_importance(Level::Low),
            Task::new("high", "High").with_minutes(30).with_importance(Level::High),
            Task::new("due", "Due")
                .with_minutes(30)
                .with_importance(Level::Low)
                .with_due_date(d(2025, 1, 6)),
        ];
        let schedule = run(&tasks, 480, 1);
        assert_eq!(day_ids(&schedule, d(2025, 1, 6)), vec!["due", "high", "low"]);
    }

    #[test]
    fn test_group_priority_breaks_even_scores() {
        let tasks = vec![
            Task::new("a", "A").with_minutes(60).with_project("side"),
            Task::new("b", "B").with_minutes(60).with_project("main"),
        ];
        let mut priorities = GroupPriorities::default();
        priorities.insert("main".to_string(), 80);
        let schedule = build_schedule(
            &tasks,
            &DailyCapacity::Flat(60),
            d(2025, 1, 6),
            2,
            &priorities,
            None,
            &SchedulingConfig::default(),
        );
        assert_eq!(day_ids(&schedule, d(2025, 1, 6)), vec!["b"]);
        assert_eq!(day_ids(&schedule, d(2025, 1, 7)), vec!["a"]);
    }

    #[test]
    fn test_energy_guard_prefers_lighter_work() {
        let tasks = vec![
            Task::new("h1", "Deep work")
                .with_minutes(70)
                .with_importance(Level::High)
                .with_urgency(Level::High)
                .with_energy(Level::High),
            Task::new("h2", "More deep work")
                .with_minutes(20)
                .with_importance(Level::High)
                .with_energy(Level::High),
            Task::new("light", "Email")
                .with_minutes(20)
                .with_importance(Level::Low)
                .with_urgency(Level::Low)
                .with_energy(Level::Low),
        ];
        let schedule = run(&tasks, 100, 2);
        assert_eq!(day_ids(&schedule, d(2025, 1, 6)), vec!["h1", "light", "h2"]);
        assert_eq!(day_ids(&schedule, d(2025, 1, 7)), vec!["h2"]);
        assert_eq!(schedule.info("h2").unwrap().total_minutes, 20);

        let relaxed = SchedulingConfig {
            high_energy_share: 1.0,
            ..SchedulingConfig::default()
        };
        let schedule = build_schedule(
            &tasks,
            &DailyCapacity::Flat(100),
            d(2025, 1, 6),
            2,
            &GroupPriorities::default(),
            None,
            &relaxed,
        );
        assert_eq!(day_ids(&schedule, d(2025, 1, 6)), vec!["h1", "h2", "light"]);
    }

    #[test]
    fn test_pinned_and_assigned() {
        let tasks = vec![
            Task::new("pinned", "Pinned")
                .with_minutes(90)
                .with_importance(Level::Low)
                .with_pinned_date(d(2025, 1, 7)),
            Task::new("early", "Early pin").with_minutes(10).with_pinned_date(d(2024, 12, 1)),
            Task::new("far", "Far pin").with_minutes(10).with_pinned_date(d(2025, 3, 1)),
            Task::new("moved", "Moved").with_minutes(10).with_pinned_date(d(2025, 3, 1)),
            Task::new("free", "Free").with_minutes(60).with_importance(Level::High),
        ];
        let mut assignments = Assignments::default();
        assignments.insert("moved".to_string(), d(2025, 1, 7));

        let schedule = build_schedule(
            &tasks,
            &DailyCapacity::Flat(60),
            d(2025, 1, 6),
            2,
            &GroupPriorities::default(),
            Some(&assignments),
            &SchedulingConfig::default(),
        );

        let day2 = schedule.day(d(2025, 1, 7)).unwrap();
        assert_eq!(day2.allocated_minutes(), 100);
        assert!(day_ids(&schedule, d(2025, 1, 7)).contains(&"pinned"));
        assert!(day_ids(&schedule, d(2025, 1, 7)).contains(&"moved"));
        // Pins in the past land on the first day
        assert!(day_ids(&schedule, d(2025, 1, 6)).contains(&"early"));
        assert_eq!(
            schedule.unscheduled_reason("far"),
            Some(UnscheduledReason::CapacityExhausted)
        );
        // 50 free minutes on day 1, the rest does not fit anywhere
        assert_eq!(
            schedule.unscheduled_reason("free"),
            Some(UnscheduledReason::CapacityExhausted)
        );
    }

    #[test]
    fn test_start_not_before() {
        let tasks = vec![Task::new("later", "Later")
            .with_minutes(30)
            .with_start_not_before(d(2025, 1, 8))];
        let schedule = run(&tasks, 480, 5);
        let info = schedule.info("later").unwrap();
        assert_eq!(info.planned_start, d(2025, 1, 8));
    }

    #[test]
    fn test_sibling_spacing_and_parent_summary() {
        let tasks = vec![
            Task::new("parent", "Parent").with_minutes(999),
            Task::new("s1", "Step 1")
                .with_minutes(30)
                .with_parent("parent")
                .with_importance(Level::High)
                .with_spacing(false, 0),
            Task::new("s2", "Step 2")
                .with_minutes(45)
                .with_parent("parent")
                .with_spacing(false, 2),
            Task::new("other", "Other").with_minutes(30),
        ];
        let schedule = run(&tasks, 480, 5);

        assert_eq!(schedule.info("s1").unwrap().planned_start, d(2025, 1, 6));
        assert_eq!(schedule.info("s2").unwrap().planned_start, d(2025, 1, 8));
        assert_eq!(schedule.info("other").unwrap().planned_start, d(2025, 1, 6));

        let parent = schedule.info("parent").unwrap();
        assert_eq!(parent.planned_start, d(2025, 1, 6));
        assert_eq!(parent.planned_end, d(2025, 1, 8));
        assert_eq!(parent.total_minutes, 75);
        assert_eq!(schedule.allocations_for("parent").count(), 0);
    }

    fn assert_exhausted_tasks_do_not_fit(tasks: &[Task], schedule: &ScheduleResponse) {
        let config = SchedulingConfig::default();
        let most_free = schedule
            .days
            .iter()
            .map(|d| d.capacity_minutes.saturating_sub(d.allocated_minutes()))
            .max()
            .unwrap_or(0);
        for entry in &schedule.unscheduled {
            if entry.reason != UnscheduledReason::CapacityExhausted {
                continue;
            }
            let task = tasks.iter().find(|t| t.id == entry.task_id).unwrap();
            assert!(
                remaining_minutes(task, &config) > most_free,
                "{} would fit in {} free minutes",
                task.id,
                most_free
            );
        }
    }

    #[test]
    fn test_unfinishable_task_frees_its_day() {
        let tasks = vec![
            Task::new("big", "Big").with_minutes(90).with_importance(Level::High),
            Task::new("small", "Small").with_minutes(30),
            Task::new("tiny", "Tiny").with_minutes(20).with_importance(Level::Low),
        ];
        let schedule = run(&tasks, 60, 1);
        assert_eq!(
            schedule.unscheduled_reason("big"),
            Some(UnscheduledReason::CapacityExhausted)
        );
        assert_eq!(schedule.allocations_for("big").count(), 0);
        assert_eq!(day_ids(&schedule, d(2025, 1, 6)), vec!["small", "tiny"]);
        assert_eq!(schedule.days[0].allocated_minutes(), 50);
        assert_eq!(schedule.unscheduled_reason("small"), None);
        assert_exhausted_tasks_do_not_fit(&tasks, &schedule);
    }

    #[test]
    fn test_dropped_task_gets_second_chance() {
        // h2 loses the day to light's partial allocation under the energy guard;
        // once light is out, h2 fits behind h1
        let tasks = vec![
            Task::new("h1", "Deep work")
                .with_minutes(70)
                .with_importance(Level::High)
                .with_urgency(Level::High)
                .with_energy(Level::High),
            Task::new("h2", "More deep work")
                .with_minutes(30)
                .with_importance(Level::High)
                .with_energy(Level::High),
            Task::new("light", "Email")
                .with_minutes(50)
                .with_importance(Level::Low)
                .with_urgency(Level::Low)
                .with_energy(Level::Low),
        ];
        let schedule = run(&tasks, 100, 1);
        assert_eq!(day_ids(&schedule, d(2025, 1, 6)), vec!["h1", "h2"]);
        assert_eq!(schedule.info("h2").unwrap().total_minutes, 30);
        assert_eq!(
            schedule.unscheduled_reason("light"),
            Some(UnscheduledReason::CapacityExhausted)
        );
        assert_exhausted_tasks_do_not_fit(&tasks, &schedule);
    }

    #[test]
    fn test_progress_reduces_effort() {
        let tasks = vec![
            Task::new("half", "Half").with_minutes(120).with_progress(25),
            Task::new("finished", "Finished").with_minutes(120).with_progress(100),
            Task::new("vague", "Vague"),
        ];
        let schedule = run(&tasks, 480, 1);
        assert_eq!(schedule.info("half").unwrap().total_minutes, 90);
        assert_eq!(schedule.info("finished").unwrap().total_minutes, 5);
        assert_eq!(schedule.info("vague").unwrap().total_minutes, 30);
    }

    #[test]
    fn test_zero_horizon() {
        let tasks = vec![Task::new("a", "A").with_minutes(10)];
        let schedule = run(&tasks, 480, 0);
        assert!(schedule.days.is_empty());
        assert_eq!(
            schedule.unscheduled_reason("a"),
            Some(UnscheduledReason::CapacityExhausted)
        );
    }

    fn task_strategy() -> impl Strategy<Value = Vec<Task>> {
        proptest::collection::vec(
            (
                proptest::option::of(0u32..300),
                0u8..=100,
                0usize..3,
                0usize..3,
            ),
            1..15,
        )
        .prop_map(|raw| {
            let levels = [Level::High, Level::Medium, Level::Low];
            raw.into_iter()
                .enumerate()
                .map(|(i, (estimate, progress, importance, energy))| {
                    let mut task = Task::new(format!("t{}", i), format!("Task {}", i))
                        .with_progress(progress)
                        .with_importance(levels[importance])
                        .with_energy(levels[energy]);
                    task.estimated_minutes = estimate;
                    task
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_allocations_sum_to_remaining_effort(
            tasks in task_strategy(),
            capacity in 30u32..240,
            max_days in 1u32..10,
        ) {
            let config = SchedulingConfig::default();
            let schedule = run(&tasks, capacity, max_days);

            for day in &schedule.days {
                prop_assert!(day.allocated_minutes() <= day.capacity_minutes);
                let mut seen = FxHashSet::default();
                for allocation in &day.allocations {
                    prop_assert!(allocation.minutes_allocated > 0);
                    prop_assert!(seen.insert(allocation.task_id.clone()));
                }
            }

            for task in &tasks {
                let placed: u32 = schedule
                    .allocations_for(&task.id)
                    .map(|a| a.minutes_allocated)
                    .sum();
                match schedule.info(&task.id) {
                    Some(info) => {
                        prop_assert_eq!(placed, remaining_minutes(task, &config));
                        prop_assert_eq!(info.total_minutes, placed);
                        prop_assert!(schedule.unscheduled_reason(&task.id).is_none());
                    }
                    None => {
                        prop_assert_eq!(placed, 0);
                        prop_assert_eq!(
                            schedule.unscheduled_reason(&task.id),
                            Some(UnscheduledReason::CapacityExhausted)
                        );
                    }
                }
            }
        }
    }
}
