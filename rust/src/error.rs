//! Error taxonomy for the planning engine.
//!
//! Only graph validation and id lookups fail. Everything else (unschedulable
//! tasks, exhausted horizons, missing estimates) is reported as a result entry.

use thiserror::Error;

/// Rejection of a proposed dependency or parent edge.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Task {0} cannot depend on itself")]
    SelfDependency(String),
    #[error("Duplicate dependency {dependency_id} on task {task_id}")]
    DuplicateDependency {
        task_id: String,
        dependency_id: String,
    },
    #[error("Dependency not found: {0}")]
    DependencyNotFound(String),
    #[error("Subtask {task_id} cannot depend on its own parent {parent_id}")]
    DependsOnParent { task_id: String, parent_id: String },
    #[error("Subtask {task_id} cannot depend on {dependency_id}, a subtask of another parent")]
    CrossParentDependency {
        task_id: String,
        dependency_id: String,
    },
    #[error("Circular dependency: {}", .0.join(" -> "))]
    CircularDependency(Vec<String>),
    #[error("Parent task not found: {0}")]
    ParentNotFound(String),
    #[error("Task {0} cannot be its own parent")]
    SelfParent(String),
    #[error("Task {parent_id} is itself a subtask and cannot take subtasks")]
    NestedParent { parent_id: String },
    #[error("Task {0} has subtasks and cannot become a subtask")]
    HasSubtasks(String),
    #[error("Task {task_id} already depends on {parent_id}")]
    TaskDependsOnParent { task_id: String, parent_id: String },
    #[error("Task {parent_id} already depends on {task_id}")]
    ParentDependsOnTask { task_id: String, parent_id: String },
}

/// Kind of entity a lookup failed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Task,
    Phase,
    Snapshot,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Task => write!(f, "Task"),
            EntityKind::Phase => write!(f, "Phase"),
            EntityKind::Snapshot => write!(f, "Snapshot"),
        }
    }
}

/// Top-level engine error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanningError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },
}

impl PlanningError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        PlanningError::NotFound {
            kind,
            id: id.into(),
        }
    }
}
