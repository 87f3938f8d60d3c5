//! Drift of a current schedule against a frozen baseline.

use chrono::NaiveDate;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::DiffConfig;
use crate::critical_chain::{buffer_percentage, get_buffer_status};
use crate::models::{
    DiffStatus, DiffSummary, Phase, PhaseDiff, ScheduleDiff, ScheduleResponse, ScheduleSnapshot,
    TaskDiff, TaskScheduleInfo,
};

/// Status of a task present in both schedules, from its end-date delay.
pub fn classify_delay(delay_days: i64, threshold_days: i64) -> DiffStatus {
    if delay_days.abs() <= threshold_days {
        DiffStatus::OnTrack
    } else if delay_days > 0 {
        DiffStatus::Delayed
    } else {
        DiffStatus::Ahead
    }
}

fn latest_end<'a>(
    infos: impl IntoIterator<Item = &'a TaskScheduleInfo>,
    phase_id: &str,
) -> Option<NaiveDate> {
    infos
        .into_iter()
        .filter(|info| info.phase_id.as_deref() == Some(phase_id))
        .map(|info| info.planned_end)
        .max()
}

/// Compare `current` against the baseline snapshot.
///
/// Every task planned in either schedule gets one entry, baseline order first.
/// Completion is checked before removal, removal before novelty.
pub fn calculate_diff(
    baseline: &ScheduleSnapshot,
    current: &ScheduleResponse,
    completed_ids: &FxHashSet<String>,
    phases: &[Phase],
    config: &DiffConfig,
) -> ScheduleDiff {
    let before: FxHashMap<&str, &TaskScheduleInfo> = baseline
        .schedule
        .scheduled
        .iter()
        .map(|info| (info.task_id.as_str(), info))
        .collect();
    let after: FxHashMap<&str, &TaskScheduleInfo> = current
        .scheduled
        .iter()
        .map(|info| (info.task_id.as_str(), info))
        .collect();

    let mut order: Vec<&str> = Vec::with_capacity(before.len() + after.len());
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    for info in baseline.schedule.scheduled.iter().chain(current.scheduled.iter()) {
        if seen.insert(info.task_id.as_str()) {
            order.push(info.task_id.as_str());
        }
    }

    let mut summary = DiffSummary::default();
    let mut tasks = Vec::with_capacity(order.len());
    for task_id in order {
        let old = before.get(task_id).copied();
        let new = after.get(task_id).copied();
        let baseline_end = old.map(|i| i.planned_end);
        let current_end = new.map(|i| i.planned_end);

        let (status, delay_days) = match (old, new) {
            _ if completed_ids.contains(task_id) => (DiffStatus::Completed, 0),
            (_, None) => (DiffStatus::Removed, 0),
            (None, Some(_)) => (DiffStatus::New, 0),
            (Some(old), Some(new)) => {
                let delay = (new.planned_end - old.planned_end).num_days();
                (classify_delay(delay, config.on_track_threshold_days), delay)
            }
        };

        match status {
            DiffStatus::OnTrack => summary.on_track += 1,
            DiffStatus::Delayed => summary.delayed += 1,
            DiffStatus::Ahead => summary.ahead += 1,
            DiffStatus::New => summary.new += 1,
            DiffStatus::Removed => summary.removed += 1,
            DiffStatus::Completed => summary.completed += 1,
        }

        let title = new.or(old).map(|i| i.title.clone()).unwrap_or_default();
        tasks.push(TaskDiff {
            task_id: task_id.to_string(),
            title,
            status,
            delay_days,
            baseline_end,
            current_end,
        });
    }

    let phases = phases
        .iter()
        .map(|phase| {
            let baseline_end = latest_end(&baseline.schedule.scheduled, &phase.id);
            let current_end = latest_end(&current.scheduled, &phase.id);
            let delay_days = match (baseline_end, current_end) {
                (Some(b), Some(c)) => (c - b).num_days(),
                _ => 0,
            };
            let total = baseline
                .phase_buffers
                .iter()
                .find(|b| b.phase_id == phase.id)
                .map_or(0, |b| b.total_buffer_minutes);
            let consumed = (delay_days.max(0) as u64 * config.daily_capacity_minutes as u64)
                .min(u32::MAX as u64) as u32;
            PhaseDiff {
                phase_id: phase.id.clone(),
                phase_name: phase.name.clone(),
                baseline_end,
                current_end,
                delay_days,
                total_buffer_minutes: total,
                estimated_consumed_minutes: consumed,
                buffer_percentage: buffer_percentage(total, consumed),
                status: get_buffer_status(total, consumed),
            }
        })
        .collect();

    ScheduleDiff {
        snapshot_id: baseline.id.clone(),
        tasks,
        phases,
        summary,
    }
}
