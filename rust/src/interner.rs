//! Task id <-> arena node mapping for the chain graph.
//!
//! Graph passes index plain `Vec`s by node; ids only come back out when a
//! result or an error has to name tasks.

use rustc_hash::FxHashMap;

/// Arena index of a task node.
pub type TaskIdx = u32;

/// Node ids of one graph, numbered in the order they were first registered.
#[derive(Debug, Clone, Default)]
pub struct NodeIds {
    by_id: FxHashMap<String, TaskIdx>,
    ids: Vec<String>,
}

impl NodeIds {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            by_id: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            ids: Vec::with_capacity(capacity),
        }
    }

    /// Register a task as the next node.
    ///
    /// Returns `None` if the id already has a node, so duplicate task records
    /// never grow the arena.
    pub fn insert(&mut self, id: &str) -> Option<TaskIdx> {
        if self.by_id.contains_key(id) {
            return None;
        }
        let idx = self.ids.len() as TaskIdx;
        self.ids.push(id.to_string());
        self.by_id.insert(id.to_string(), idx);
        Some(idx)
    }

    #[inline]
    pub fn get(&self, id: &str) -> Option<TaskIdx> {
        self.by_id.get(id).copied()
    }

    #[inline]
    pub fn id(&self, idx: TaskIdx) -> Option<&str> {
        self.ids.get(idx as usize).map(String::as_str)
    }

    /// Task ids of a node sequence, in the same order.
    pub fn to_ids(&self, nodes: impl IntoIterator<Item = TaskIdx>) -> Vec<String> {
        nodes
            .into_iter()
            .filter_map(|idx| self.id(idx))
            .map(str::to_string)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
