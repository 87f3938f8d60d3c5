//! Arena dependency graph and longest-path calculation.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::error::ValidationError;
use crate::interner::{NodeIds, TaskIdx};
use crate::models::Task;

/// Result of a critical chain calculation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalChain {
    /// Summed effort of the chain in minutes.
    pub total_minutes: u32,
    /// Chain task ids, dependencies first.
    pub task_ids: Vec<String>,
    /// Open top-level tasks left out because they carry no positive estimate.
    pub unestimated: Vec<String>,
}

/// Dependency graph over the tasks that count towards a critical chain.
///
/// Nodes are open, top-level tasks with a positive estimate. Subtasks are left
/// out because their effort rolls up into the parent. Edges run from a
/// dependency to its dependent; edges to tasks outside the node set are dropped.
#[derive(Debug, Clone, Default)]
pub struct ChainGraph {
    nodes: NodeIds,
    /// Durations in minutes, indexed by node.
    durations: Vec<u32>,
    /// Dependencies of each node.
    deps: Vec<Vec<TaskIdx>>,
    /// Dependents of each node.
    dependents: Vec<Vec<TaskIdx>>,
    unestimated: Vec<String>,
}

impl ChainGraph {
    /// Build the graph from a task set, keeping the input order for node indices.
    pub fn build<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut graph = ChainGraph::default();
        let mut members: Vec<&Task> = Vec::new();

        for task in tasks {
            if task.parent_id.is_some() || task.is_done() {
                continue;
            }
            match task.positive_estimate() {
                Some(minutes) => {
                    if graph.nodes.insert(&task.id).is_some() {
                        graph.durations.push(minutes);
                        graph.deps.push(Vec::new());
                        graph.dependents.push(Vec::new());
                        members.push(task);
                    }
                }
                None => graph.unestimated.push(task.id.clone()),
            }
        }

        for task in members {
            let Some(idx) = graph.nodes.get(&task.id) else {
                continue;
            };
            for dep_id in &task.dependency_ids {
                if let Some(dep_idx) = graph.nodes.get(dep_id) {
                    if !graph.deps[idx as usize].contains(&dep_idx) {
                        graph.deps[idx as usize].push(dep_idx);
                        graph.dependents[dep_idx as usize].push(idx);
                    }
                }
            }
        }

        graph
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    /// Topological order using Kahn's algorithm.
    ///
    /// Ready nodes are taken in index order, so the result is deterministic for a
    /// given input order.
    pub fn topological_order(&self) -> Result<Vec<TaskIdx>, ValidationError> {
        let n = self.len();
        let mut in_degree: Vec<usize> = self.deps.iter().map(|d| d.len()).collect();
        let mut queue: VecDeque<TaskIdx> = (0..n as TaskIdx)
            .filter(|&i| in_degree[i as usize] == 0)
            .collect();
        let mut order: Vec<TaskIdx> = Vec::with_capacity(n);

        while let Some(idx) = queue.pop_front() {
            order.push(idx);
            for &dependent in &self.dependents[idx as usize] {
                let degree = &mut in_degree[dependent as usize];
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(dependent);
                }
            }
        }

        if order.len() != n {
            let stuck = self
                .nodes
                .to_ids((0..n as TaskIdx).filter(|&i| in_degree[i as usize] > 0));
            return Err(ValidationError::CircularDependency(stuck));
        }

        Ok(order)
    }

    /// Longest duration-weighted path.
    ///
    /// One forward pass in topological order: each node's value is the best
    /// incoming value plus its own duration. Ties, both between predecessors and
    /// between chain ends, go to the earliest topological position.
    pub fn longest_path(&self) -> Result<CriticalChain, ValidationError> {
        let order = self.topological_order()?;
        let n = self.len();

        let mut position = vec![0usize; n];
        for (pos, &idx) in order.iter().enumerate() {
            position[idx as usize] = pos;
        }

        let mut best: Vec<u64> = vec![0; n];
        let mut predecessor: Vec<Option<TaskIdx>> = vec![None; n];

        for &idx in &order {
            let i = idx as usize;
            let mut incoming = 0u64;
            let mut chosen: Option<TaskIdx> = None;
            for &dep in &self.deps[i] {
                let value = best[dep as usize];
                let better = match chosen {
                    None => true,
                    Some(current) => {
                        value > incoming
                            || (value == incoming
                                && position[dep as usize] < position[current as usize])
                    }
                };
                if better {
                    incoming = value;
                    chosen = Some(dep);
                }
            }
            best[i] = incoming + self.durations[i] as u64;
            predecessor[i] = chosen;
        }

        let mut end: Option<TaskIdx> = None;
        for &idx in &order {
            match end {
                Some(current) if best[idx as usize] <= best[current as usize] => {}
                _ => end = Some(idx),
            }
        }

        let mut chain = Vec::new();
        let mut cursor = end;
        while let Some(idx) = cursor {
            chain.push(idx);
            cursor = predecessor[idx as usize];
        }
        chain.reverse();
        let task_ids = self.nodes.to_ids(chain);

        let total = end.map(|e| best[e as usize]).unwrap_or(0);
        Ok(CriticalChain {
            total_minutes: total.min(u32::MAX as u64) as u32,
            task_ids,
            unestimated: self.unestimated.clone(),
        })
    }
}

/// Find the critical chain of a task set.
///
/// Returns the chain length in minutes and its task ids; open top-level tasks
/// without an estimate are listed in `unestimated` instead of failing.
pub fn find_critical_chain<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
) -> Result<CriticalChain, ValidationError> {
    ChainGraph::build(tasks).longest_path()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskStatus;

    fn task(id: &str, minutes: u32, deps: &[&str]) -> Task {
        Task::new(id, id.to_uppercase())
            .with_minutes(minutes)
            .with_dependencies(deps.iter().copied())
    }

    #[test]
    fn test_two_task_chain() {
        let tasks = vec![task("a", 120, &[]), task("b", 60, &["a"])];
        let chain = find_critical_chain(&tasks).unwrap();
        assert_eq!(chain.total_minutes, 180);
        assert_eq!(chain.task_ids, vec!["a", "b"]);
        assert!(chain.unestimated.is_empty());
    }

    #[test]
    fn test_picks_longest_branch() {
        // a -> b -> d and a -> c -> d, c is heavier
        let tasks = vec![
            task("a", 30, &[]),
            task("b", 10, &["a"]),
            task("c", 90, &["a"]),
            task("d", 20, &["b", "c"]),
            task("lonely", 100, &[]),
        ];
        let chain = find_critical_chain(&tasks).unwrap();
        assert_eq!(chain.total_minutes, 140);
        assert_eq!(chain.task_ids, vec!["a", "c", "d"]);
    }

    #[test]
    fn test_tie_goes_to_earliest_topological_position() {
        let tasks = vec![task("x", 60, &[]), task("y", 60, &[])];
        let chain = find_critical_chain(&tasks).unwrap();
        assert_eq!(chain.total_minutes, 60);
        assert_eq!(chain.task_ids, vec!["x"]);
    }

    #[test]
    fn test_filters_subtasks_done_and_unestimated() {
        let tasks = vec![
            task("parent", 100, &[]),
            task("sub", 500, &[]).with_parent("parent"),
            task("done", 900, &[]).with_status(TaskStatus::Done),
            Task::new("vague", "Vague").with_dependencies(["parent"]),
            task("zero", 0, &[]),
            task("next", 50, &["parent", "done"]),
        ];
        let chain = find_critical_chain(&tasks).unwrap();
        assert_eq!(chain.total_minutes, 150);
        assert_eq!(chain.task_ids, vec!["parent", "next"]);
        assert_eq!(chain.unestimated, vec!["vague", "zero"]);
    }

    #[test]
    fn test_empty_input() {
        let chain = find_critical_chain(&Vec::<Task>::new()).unwrap();
        assert_eq!(chain, CriticalChain::default());
    }

    #[test]
    fn test_cycle_is_rejected() {
        let tasks = vec![task("a", 10, &["b"]), task("b", 10, &["a"]), task("c", 5, &[])];
        let err = find_critical_chain(&tasks).unwrap_err();
        assert_eq!(
            err,
            ValidationError::CircularDependency(vec!["a".to_string(), "b".to_string()])
        );
    }
}
