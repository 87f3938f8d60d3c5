//! Frozen baselines and the active-baseline registry.

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;

use crate::error::{EntityKind, PlanningError};
use crate::models::{PhaseBufferInfo, ScheduleResponse, ScheduleSnapshot};

impl ScheduleSnapshot {
    /// Freeze a schedule and its buffers as of now.
    pub fn freeze(
        id: impl Into<String>,
        project_id: Option<String>,
        schedule: ScheduleResponse,
        phase_buffers: Vec<PhaseBufferInfo>,
    ) -> Self {
        Self::freeze_at(id, project_id, schedule, phase_buffers, Utc::now())
    }

    pub fn freeze_at(
        id: impl Into<String>,
        project_id: Option<String>,
        schedule: ScheduleResponse,
        phase_buffers: Vec<PhaseBufferInfo>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            project_id,
            created_at,
            schedule,
            phase_buffers,
        }
    }
}

/// Stored snapshots with at most one active baseline per project.
///
/// Snapshots without a project share one global slot.
#[derive(Clone, Debug, Default)]
pub struct SnapshotRegistry {
    snapshots: FxHashMap<String, ScheduleSnapshot>,
    /// project_id -> active snapshot id
    active: FxHashMap<Option<String>, String>,
}

impl SnapshotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Store a snapshot, replacing any previous one with the same id.
    pub fn insert(&mut self, snapshot: ScheduleSnapshot) -> Option<ScheduleSnapshot> {
        self.snapshots.insert(snapshot.id.clone(), snapshot)
    }

    pub fn get(&self, id: &str) -> Result<&ScheduleSnapshot, PlanningError> {
        self.snapshots
            .get(id)
            .ok_or_else(|| PlanningError::not_found(EntityKind::Snapshot, id))
    }

    /// Make `id` the active baseline of its project.
    ///
    /// Returns the id it replaced. The switch happens in one step: there is no
    /// moment with two active baselines for a project.
    pub fn activate(&mut self, id: &str) -> Result<Option<String>, PlanningError> {
        let project = self.get(id)?.project_id.clone();
        let previous = self.active.insert(project, id.to_string());
        Ok(previous.filter(|prev| prev != id))
    }

    pub fn active(&self, project_id: Option<&str>) -> Option<&ScheduleSnapshot> {
        let key = project_id.map(str::to_string);
        self.active
            .get(&key)
            .and_then(|id| self.snapshots.get(id))
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active.values().any(|active| active == id)
    }

    /// Delete a snapshot; if it was active its project has no baseline afterwards.
    pub fn remove(&mut self, id: &str) -> Result<ScheduleSnapshot, PlanningError> {
        let snapshot = self
            .snapshots
            .remove(id)
            .ok_or_else(|| PlanningError::not_found(EntityKind::Snapshot, id))?;
        self.active.retain(|_, active| active != id);
        Ok(snapshot)
    }

    /// Snapshots of a project, oldest first.
    pub fn list(&self, project_id: Option<&str>) -> Vec<&ScheduleSnapshot> {
        let mut snapshots: Vec<&ScheduleSnapshot> = self
            .snapshots
            .values()
            .filter(|s| s.project_id.as_deref() == project_id)
            .collect();
        snapshots.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        snapshots
    }
}
