//! Python bindings.
//!
//! Every entry point takes and returns JSON text so the Python side can keep
//! its own models; validation and lookup failures surface as `ValueError`.

use chrono::NaiveDate;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use rustc_hash::FxHashSet;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::{BufferConfig, DailyCapacity, DiffConfig, RecurrenceConfig, SchedulingConfig};
use crate::error::{PlanningError, ValidationError};
use crate::models::{Phase, ScheduleResponse, ScheduleSnapshot, Task};
use crate::recurrence::{CheckIn, MeetingDefinition, RecurringTaskDefinition};
use crate::scheduler::Assignments;
use crate::scoring::GroupPriorities;

impl From<ValidationError> for PyErr {
    fn from(err: ValidationError) -> Self {
        PyValueError::new_err(err.to_string())
    }
}

impl From<PlanningError> for PyErr {
    fn from(err: PlanningError) -> Self {
        PyValueError::new_err(err.to_string())
    }
}

fn from_json<T: DeserializeOwned>(what: &str, text: &str) -> PyResult<T> {
    serde_json::from_str(text)
        .map_err(|e| PyValueError::new_err(format!("invalid {} JSON: {}", what, e)))
}

fn to_json<T: Serialize>(value: &T) -> PyResult<String> {
    serde_json::to_string(value).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Input of `build_schedule`.
#[derive(Deserialize)]
struct ScheduleRequest {
    tasks: Vec<Task>,
    #[serde(default)]
    capacity: DailyCapacity,
    start_date: NaiveDate,
    max_days: u32,
    #[serde(default)]
    priorities: GroupPriorities,
    #[serde(default)]
    assignments: Option<Assignments>,
    #[serde(default)]
    config: SchedulingConfig,
}

/// Build a schedule from a JSON request; returns the schedule as JSON.
#[pyfunction]
fn build_schedule(request_json: &str) -> PyResult<String> {
    let request: ScheduleRequest = from_json("schedule request", request_json)?;
    let schedule = crate::scheduler::build_schedule(
        &request.tasks,
        &request.capacity,
        request.start_date,
        request.max_days,
        &request.priorities,
        request.assignments.as_ref(),
        &request.config,
    );
    to_json(&schedule)
}

/// Today's allocations of a schedule.
#[pyfunction]
#[pyo3(signature = (schedule_json, tasks_json, today, config_json=None))]
fn get_today_tasks(
    schedule_json: &str,
    tasks_json: &str,
    today: NaiveDate,
    config_json: Option<&str>,
) -> PyResult<String> {
    let schedule: ScheduleResponse = from_json("schedule", schedule_json)?;
    let tasks: Vec<Task> = from_json("tasks", tasks_json)?;
    let config: SchedulingConfig = match config_json {
        Some(text) => from_json("config", text)?,
        None => SchedulingConfig::default(),
    };
    to_json(&crate::scheduler::get_today_tasks(&schedule, &tasks, today, &config))
}

/// Critical chain of a task list as `{total_minutes, task_ids, unestimated}`.
#[pyfunction]
fn find_critical_chain(tasks_json: &str) -> PyResult<String> {
    let tasks: Vec<Task> = from_json("tasks", tasks_json)?;
    to_json(&crate::critical_chain::find_critical_chain(&tasks)?)
}

#[pyfunction]
#[pyo3(signature = (tasks_json, phases_json, ratio=0.5))]
fn calculate_phase_buffers(tasks_json: &str, phases_json: &str, ratio: f64) -> PyResult<String> {
    let tasks: Vec<Task> = from_json("tasks", tasks_json)?;
    let phases: Vec<Phase> = from_json("phases", phases_json)?;
    let buffers =
        crate::critical_chain::calculate_phase_buffers(&tasks, &phases, &BufferConfig { ratio })?;
    to_json(&buffers)
}

/// Raise `ValueError` if the proposed dependencies are invalid.
#[pyfunction]
#[pyo3(signature = (task_id, dependency_ids, tasks_json, parent_id=None))]
fn validate_dependencies(
    task_id: &str,
    dependency_ids: Vec<String>,
    tasks_json: &str,
    parent_id: Option<&str>,
) -> PyResult<()> {
    let tasks: Vec<Task> = from_json("tasks", tasks_json)?;
    crate::validation::validate_dependencies(task_id, &dependency_ids, parent_id, &tasks)?;
    Ok(())
}

#[pyfunction]
fn validate_parent_assignment(task_id: &str, new_parent_id: &str, tasks_json: &str) -> PyResult<()> {
    let tasks: Vec<Task> = from_json("tasks", tasks_json)?;
    crate::validation::validate_parent_assignment(task_id, new_parent_id, &tasks)?;
    Ok(())
}

#[pyfunction]
#[pyo3(signature = (baseline_json, current_json, completed_ids, phases_json, config_json=None))]
fn calculate_diff(
    baseline_json: &str,
    current_json: &str,
    completed_ids: Vec<String>,
    phases_json: &str,
    config_json: Option<&str>,
) -> PyResult<String> {
    let baseline: ScheduleSnapshot = from_json("baseline", baseline_json)?;
    let current: ScheduleResponse = from_json("schedule", current_json)?;
    let phases: Vec<Phase> = from_json("phases", phases_json)?;
    let config: DiffConfig = match config_json {
        Some(text) => from_json("config", text)?,
        None => DiffConfig::default(),
    };
    let completed: FxHashSet<String> = completed_ids.into_iter().collect();
    to_json(&crate::diff::calculate_diff(
        &baseline, &current, &completed, &phases, &config,
    ))
}

#[pyfunction]
#[pyo3(signature = (definitions_json, existing_json, today, lookahead_days=14))]
fn ensure_upcoming_tasks(
    definitions_json: &str,
    existing_json: &str,
    today: NaiveDate,
    lookahead_days: u32,
) -> PyResult<String> {
    let definitions: Vec<RecurringTaskDefinition> = from_json("definitions", definitions_json)?;
    let existing: Vec<Task> = from_json("tasks", existing_json)?;
    let config = RecurrenceConfig {
        lookahead_days,
        ..RecurrenceConfig::default()
    };
    to_json(&crate::recurrence::ensure_upcoming_tasks(
        &definitions,
        &existing,
        today,
        &config,
    ))
}

#[pyfunction]
#[pyo3(signature = (definitions_json, existing_json, check_ins_json, today, lookahead_days=14, agenda_lookback_days=14))]
fn ensure_upcoming_meetings(
    definitions_json: &str,
    existing_json: &str,
    check_ins_json: &str,
    today: NaiveDate,
    lookahead_days: u32,
    agenda_lookback_days: u32,
) -> PyResult<String> {
    let definitions: Vec<MeetingDefinition> = from_json("definitions", definitions_json)?;
    let existing: Vec<Task> = from_json("tasks", existing_json)?;
    let check_ins: Vec<CheckIn> = from_json("check-ins", check_ins_json)?;
    let config = RecurrenceConfig {
        lookahead_days,
        agenda_lookback_days,
        ..RecurrenceConfig::default()
    };
    to_json(&crate::recurrence::ensure_upcoming_meetings(
        &definitions,
        &existing,
        &check_ins,
        today,
        &config,
    ))
}

/// The planning_engine Python module.
#[pymodule]
fn planning_engine(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(build_schedule, m)?)?;
    m.add_function(wrap_pyfunction!(get_today_tasks, m)?)?;
    m.add_function(wrap_pyfunction!(find_critical_chain, m)?)?;
    m.add_function(wrap_pyfunction!(calculate_phase_buffers, m)?)?;
    m.add_function(wrap_pyfunction!(validate_dependencies, m)?)?;
    m.add_function(wrap_pyfunction!(validate_parent_assignment, m)?)?;
    m.add_function(wrap_pyfunction!(calculate_diff, m)?)?;
    m.add_function(wrap_pyfunction!(ensure_upcoming_tasks, m)?)?;
    m.add_function(wrap_pyfunction!(ensure_upcoming_meetings, m)?)?;
    Ok(())
}
