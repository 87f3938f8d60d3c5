//! Dependency graph validation.
//!
//! Runs before a proposed dependency list or parent assignment is stored, so
//! the scheduler and the critical-chain pass only ever see well-formed,
//! acyclic graphs. Every rejection is a [`ValidationError`]; edges are never
//! silently dropped.

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::HashMap;

use crate::error::{EntityKind, PlanningError, ValidationError};
use crate::models::Task;

/// Read access to already stored tasks.
pub trait TaskLookup {
    /// Fetch a stored task by id.
    fn fetch(&self, id: &str) -> Option<&Task>;

    /// Whether any stored task names `id` as its parent.
    fn has_subtasks(&self, id: &str) -> bool;
}

impl TaskLookup for FxHashMap<String, Task> {
    fn fetch(&self, id: &str) -> Option<&Task> {
        self.get(id)
    }

    fn has_subtasks(&self, id: &str) -> bool {
        self.values().any(|t| t.parent_id.as_deref() == Some(id))
    }
}

impl TaskLookup for HashMap<String, Task> {
    fn fetch(&self, id: &str) -> Option<&Task> {
        self.get(id)
    }

    fn has_subtasks(&self, id: &str) -> bool {
        self.values().any(|t| t.parent_id.as_deref() == Some(id))
    }
}

impl TaskLookup for [Task] {
    fn fetch(&self, id: &str) -> Option<&Task> {
        self.iter().find(|t| t.id == id)
    }

    fn has_subtasks(&self, id: &str) -> bool {
        self.iter().any(|t| t.parent_id.as_deref() == Some(id))
    }
}

impl TaskLookup for Vec<Task> {
    fn fetch(&self, id: &str) -> Option<&Task> {
        self.as_slice().fetch(id)
    }

    fn has_subtasks(&self, id: &str) -> bool {
        self.as_slice().has_subtasks(id)
    }
}

/// Validate a proposed dependency list for `task_id`.
///
/// Checks, in order:
/// 1. self dependency
/// 2. duplicate ids
/// 3. every dependency resolves through `lookup`
/// 4. subtask rules (only siblings or top-level tasks; never the own parent)
/// 5. no cycle through the proposed edges and the stored ones
pub fn validate_dependencies<L: TaskLookup + ?Sized>(
    task_id: &str,
    dependency_ids: &[String],
    parent_id: Option<&str>,
    lookup: &L,
) -> Result<(), ValidationError> {
    if dependency_ids.iter().any(|d| d == task_id) {
        return Err(ValidationError::SelfDependency(task_id.to_string()));
    }

    let mut seen: FxHashSet<&str> = FxHashSet::default();
    for dep_id in dependency_ids {
        if !seen.insert(dep_id.as_str()) {
            return Err(ValidationError::DuplicateDependency {
                task_id: task_id.to_string(),
                dependency_id: dep_id.clone(),
            });
        }
    }

    let mut dependencies: Vec<&Task> = Vec::with_capacity(dependency_ids.len());
    for dep_id in dependency_ids {
        let dep = lookup
            .fetch(dep_id)
            .ok_or_else(|| ValidationError::DependencyNotFound(dep_id.clone()))?;
        dependencies.push(dep);
    }

    if let Some(parent_id) = parent_id {
        for dep in &dependencies {
            if dep.id == parent_id {
                return Err(ValidationError::DependsOnParent {
                    task_id: task_id.to_string(),
                    parent_id: parent_id.to_string(),
                });
            }
            if let Some(dep_parent) = dep.parent_id.as_deref() {
                if dep_parent != parent_id {
                    return Err(ValidationError::CrossParentDependency {
                        task_id: task_id.to_string(),
                        dependency_id: dep.id.clone(),
                    });
                }
            }
        }
    }

    detect_cycle(task_id, dependency_ids, lookup)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    /// On the current DFS stack.
    Active,
    /// Fully explored, no cycle below.
    Done,
}

/// Depth-first walk from `task_id` through its proposed edges and the stored
/// edges of everything reachable. Reaching a node that is still on the walk
/// stack is a cycle; reaching a finished node again is just a shared ancestor.
fn detect_cycle<L: TaskLookup + ?Sized>(
    task_id: &str,
    proposed: &[String],
    lookup: &L,
) -> Result<(), ValidationError> {
    let edges_of = |id: &str| -> Vec<String> {
        if id == task_id {
            proposed.to_vec()
        } else {
            lookup
                .fetch(id)
                .map(|t| t.dependency_ids.clone())
                .unwrap_or_default()
        }
    };

    let mut marks: FxHashMap<String, Mark> = FxHashMap::default();
    // Stack frames: (node id, its edges, next edge to visit)
    let mut stack: Vec<(String, Vec<String>, usize)> = Vec::new();
    marks.insert(task_id.to_string(), Mark::Active);
    stack.push((task_id.to_string(), edges_of(task_id), 0));

    while let Some(frame) = stack.last_mut() {
        if frame.2 >= frame.1.len() {
            marks.insert(frame.0.clone(), Mark::Done);
            stack.pop();
            continue;
        }
        let next = frame.1[frame.2].clone();
        frame.2 += 1;

        match marks.get(next.as_str()).copied() {
            Some(Mark::Active) => {
                let start = stack.iter().position(|f| f.0 == next).unwrap_or(0);
                let mut path: Vec<String> = stack[start..].iter().map(|f| f.0.clone()).collect();
                path.push(next);
                return Err(ValidationError::CircularDependency(path));
            }
            Some(Mark::Done) => {}
            None => {
                if next != task_id && lookup.fetch(&next).is_none() {
                    // Dangling stored edge; existence is checked elsewhere
                    marks.insert(next, Mark::Done);
                    continue;
                }
                marks.insert(next.clone(), Mark::Active);
                let edges = edges_of(&next);
                stack.push((next, edges, 0));
            }
        }
    }

    Ok(())
}

/// Validate making `task_id` a subtask of `new_parent_id`.
///
/// Rejects self-parenting, parents that are subtasks themselves, tasks that
/// already have subtasks, and any dependency between the two tasks in either
/// direction.
pub fn validate_parent_assignment<L: TaskLookup + ?Sized>(
    task_id: &str,
    new_parent_id: &str,
    lookup: &L,
) -> Result<(), ValidationError> {
    if task_id == new_parent_id {
        return Err(ValidationError::SelfParent(task_id.to_string()));
    }

    let parent = lookup
        .fetch(new_parent_id)
        .ok_or_else(|| ValidationError::ParentNotFound(new_parent_id.to_string()))?;

    if parent.parent_id.is_some() {
        return Err(ValidationError::NestedParent {
            parent_id: new_parent_id.to_string(),
        });
    }

    if lookup.has_subtasks(task_id) {
        return Err(ValidationError::HasSubtasks(task_id.to_string()));
    }

    if let Some(task) = lookup.fetch(task_id) {
        if task.dependency_ids.iter().any(|d| d == new_parent_id) {
            return Err(ValidationError::TaskDependsOnParent {
                task_id: task_id.to_string(),
                parent_id: new_parent_id.to_string(),
            });
        }
    }

    if parent.dependency_ids.iter().any(|d| d == task_id) {
        return Err(ValidationError::ParentDependsOnTask {
            task_id: task_id.to_string(),
            parent_id: new_parent_id.to_string(),
        });
    }

    Ok(())
}

/// Re-check a task already in storage against its current edges.
pub fn validate_stored_task<L: TaskLookup + ?Sized>(
    task_id: &str,
    lookup: &L,
) -> Result<(), PlanningError> {
    let task = lookup
        .fetch(task_id)
        .ok_or_else(|| PlanningError::not_found(EntityKind::Task, task_id))?;
    validate_dependencies(
        task_id,
        &task.dependency_ids,
        task.parent_id.as_deref(),
        lookup,
    )?;
    Ok(())
}
