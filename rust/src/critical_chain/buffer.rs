//! Phase and project buffers.

use serde::{Deserialize, Serialize};

use crate::config::BufferConfig;
use crate::error::{EntityKind, PlanningError, ValidationError};
use crate::models::{BufferStatus, Phase, PhaseBufferInfo, Task};

use super::graph::find_critical_chain;

/// Status of a buffer from its consumption.
///
/// Under a third consumed is healthy, under two thirds is a warning, anything
/// else is critical. An empty buffer is always healthy.
pub fn get_buffer_status(total_minutes: u32, consumed_minutes: u32) -> BufferStatus {
    if total_minutes == 0 {
        return BufferStatus::Healthy;
    }
    let total = total_minutes as u64;
    let consumed = consumed_minutes as u64;
    if consumed * 3 < total {
        BufferStatus::Healthy
    } else if consumed * 3 < total * 2 {
        BufferStatus::Warning
    } else {
        BufferStatus::Critical
    }
}

/// Remaining share of a buffer in percent, clamped to 0-100.
pub fn buffer_percentage(total_minutes: u32, consumed_minutes: u32) -> f64 {
    if total_minutes == 0 {
        return 100.0;
    }
    let remaining = total_minutes.saturating_sub(consumed_minutes) as f64;
    remaining / total_minutes as f64 * 100.0
}

fn buffer_size(chain_minutes: u32, ratio: f64) -> u32 {
    (chain_minutes as f64 * ratio.max(0.0)).floor() as u32
}

fn phase_buffer(
    tasks: &[Task],
    phase: &Phase,
    config: &BufferConfig,
) -> Result<PhaseBufferInfo, ValidationError> {
    let in_phase = tasks
        .iter()
        .filter(|t| t.phase_id.as_deref() == Some(phase.id.as_str()));
    let chain = find_critical_chain(in_phase)?;
    let total = buffer_size(chain.total_minutes, config.ratio);
    Ok(PhaseBufferInfo {
        phase_id: phase.id.clone(),
        phase_name: phase.name.clone(),
        critical_chain_length_minutes: chain.total_minutes,
        total_buffer_minutes: total,
        consumed_buffer_minutes: 0,
        buffer_percentage: buffer_percentage(total, 0),
        status: get_buffer_status(total, 0),
    })
}

/// Compute a fresh buffer for every phase from the critical chain of its tasks.
///
/// A phase without qualifying tasks gets a zero buffer and is healthy.
pub fn calculate_phase_buffers(
    tasks: &[Task],
    phases: &[Phase],
    config: &BufferConfig,
) -> Result<Vec<PhaseBufferInfo>, ValidationError> {
    phases
        .iter()
        .map(|phase| phase_buffer(tasks, phase, config))
        .collect()
}

/// Buffer of a single phase looked up by id.
pub fn calculate_phase_buffer(
    tasks: &[Task],
    phases: &[Phase],
    phase_id: &str,
    config: &BufferConfig,
) -> Result<PhaseBufferInfo, PlanningError> {
    let phase = phases
        .iter()
        .find(|p| p.id == phase_id)
        .ok_or_else(|| PlanningError::not_found(EntityKind::Phase, phase_id))?;
    Ok(phase_buffer(tasks, phase, config)?)
}

/// Apply a new consumption figure to a buffer.
///
/// Chain length and total stay as computed; only consumption, percentage and
/// status move.
pub fn update_buffer_consumption(info: &PhaseBufferInfo, consumed_minutes: u32) -> PhaseBufferInfo {
    PhaseBufferInfo {
        consumed_buffer_minutes: consumed_minutes,
        buffer_percentage: buffer_percentage(info.total_buffer_minutes, consumed_minutes),
        status: get_buffer_status(info.total_buffer_minutes, consumed_minutes),
        ..info.clone()
    }
}

/// Buffer over a whole project rather than one phase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectBufferInfo {
    pub project_id: String,
    pub critical_chain_length_minutes: u32,
    pub total_buffer_minutes: u32,
    pub chain: Vec<String>,
    pub unestimated: Vec<String>,
}

/// Project buffer: same rule as the phase buffers, over all tasks of the project.
pub fn calculate_project_buffer(
    tasks: &[Task],
    project_id: &str,
    config: &BufferConfig,
) -> Result<ProjectBufferInfo, ValidationError> {
    let chain = find_critical_chain(
        tasks
            .iter()
            .filter(|t| t.project_id.as_deref() == Some(project_id)),
    )?;
    Ok(ProjectBufferInfo {
        project_id: project_id.to_string(),
        critical_chain_length_minutes: chain.total_minutes,
        total_buffer_minutes: buffer_size(chain.total_minutes, config.ratio),
        chain: chain.task_ids,
        unestimated: chain.unestimated,
    })
}
