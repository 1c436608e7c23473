//! Expansion-Path Tracker
//!
//! Records which nodes are expanded and at which level. A node's level is
//! `1 + max(level of its expanded parents)`, or 0 when no parent is expanded,
//! so the visible window restarts wherever the user expands a fresh region.
//!
//! The tracker is the only writer of `Node::expanded`: a node is expanded
//! exactly when it has an entry in the level index.

use crate::domain::error::GraphError;
use crate::domain::node::{NodeGraph, NodeId};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct ExpansionPath {
    nodes_per_level: Vec<Vec<NodeId>>,
    level_per_node: HashMap<NodeId, usize>,
    root_nodes: Vec<NodeId>,
    visible_parents: usize,
}

impl ExpansionPath {
    /// Create a tracker over `root_nodes` that keeps the `visible_parents`
    /// most recent levels on screen. A window of 0 is treated as 1.
    pub fn new(root_nodes: Vec<NodeId>, visible_parents: usize) -> Self {
        Self {
            nodes_per_level: Vec::new(),
            level_per_node: HashMap::new(),
            root_nodes,
            visible_parents: visible_parents.max(1),
        }
    }

    /// Number of populated levels.
    pub fn num_levels(&self) -> usize {
        self.nodes_per_level.len()
    }

    pub fn level_of(&self, id: NodeId) -> Option<usize> {
        self.level_per_node.get(&id).copied()
    }

    pub fn nodes_at_level(&self, level: usize) -> &[NodeId] {
        self.nodes_per_level
            .get(level)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_tracked(&self, id: NodeId) -> bool {
        self.level_per_node.contains_key(&id)
    }

    /// Expand `id`. Returns `Ok(false)` when it was already tracked.
    pub fn add_node(&mut self, graph: &mut NodeGraph, id: NodeId) -> Result<bool, GraphError> {
        if self.is_tracked(id) {
            return Ok(false);
        }
        let node = graph.node(id)?;
        let level = node
            .parents
            .iter()
            .filter_map(|parent| self.level_per_node.get(parent))
            .max()
            .map_or(0, |parent_level| parent_level + 1);

        if self.nodes_per_level.len() <= level {
            self.nodes_per_level.resize_with(level + 1, Vec::new);
        }
        self.nodes_per_level[level].push(id);
        self.level_per_node.insert(id, level);
        graph.set_expanded(id, true);
        Ok(true)
    }

    /// Collapse `id`. Untracked nodes are ignored.
    ///
    /// When the node's level bucket runs empty, that level and every deeper
    /// one are dropped and their nodes collapsed, since deeper levels were
    /// numbered relative to the now-collapsed ones.
    pub fn remove_node(&mut self, graph: &mut NodeGraph, id: NodeId) -> bool {
        let Some(level) = self.level_per_node.remove(&id) else {
            return false;
        };
        if let Some(bucket) = self.nodes_per_level.get_mut(level) {
            bucket.retain(|n| *n != id);
        }
        graph.set_expanded(id, false);

        if self.nodes_at_level(level).is_empty() {
            for dropped in self.nodes_per_level.drain(level..).flatten() {
                self.level_per_node.remove(&dropped);
                graph.set_expanded(dropped, false);
            }
        }
        true
    }

    /// Clear the index and collapse every node of the graph.
    pub fn reset(&mut self, graph: &mut NodeGraph) {
        self.nodes_per_level.clear();
        self.level_per_node.clear();
        let ids = graph.ids().to_vec();
        for id in ids {
            graph.set_expanded(id, false);
        }
    }

    /// Start nodes for the next render.
    ///
    /// The configured roots while at most `visible_parents` levels exist,
    /// otherwise the bucket at `num_levels - visible_parents`.
    pub fn visible_root_nodes(&self) -> &[NodeId] {
        let levels = self.nodes_per_level.len();
        if levels <= self.visible_parents {
            return &self.root_nodes;
        }
        self.nodes_at_level(levels - self.visible_parents)
    }
}
