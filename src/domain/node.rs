//! Node Graph
//!
//! Arena of program elements (units, functions, loops, call sites).
//! Every relation is an id resolved through the arena, so call cycles and
//! multi-parent nodes need no shared ownership.

use crate::domain::error::GraphError;
use std::collections::HashMap;
use std::fmt;

/// Stable identifier of a node for the lifetime of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A data dependency from one unit to another.
#[derive(Debug, Clone, PartialEq)]
pub struct Dependency {
    pub target: NodeId,
    pub variable_name: String,
    pub read_after_write: bool,
    pub write_after_read: bool,
}

/// Per-kind payload. Only the fields a kind actually uses live on it.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Leaf element (basic block) with pre-computed data metrics.
    Unit {
        read_data_size: u64,
        write_data_size: u64,
        dependencies: Vec<Dependency>,
    },
    /// Container; `entry` is the unit where control enters its body.
    Function {
        name: String,
        entry: NodeId,
        start_line: u32,
        end_line: u32,
    },
    Loop {
        start_line: u32,
        end_line: u32,
    },
    /// One invocation of `callee`.
    CallSite { name: String, callee: NodeId },
}

impl NodeKind {
    /// Semantic class attached to rendered markup.
    pub fn css_class(&self) -> &'static str {
        match self {
            NodeKind::Unit { .. } => "unit",
            NodeKind::Function { .. } => "function",
            NodeKind::Loop { .. } => "loop",
            NodeKind::CallSite { .. } => "call-site",
        }
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, NodeKind::Unit { .. })
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    /// 0.0 (cold) ..= 1.0 (hot)
    pub heat_factor: f64,
    pub parents: Vec<NodeId>,
    pub children: Vec<NodeId>,
    pub successors: Vec<NodeId>,
    pub predecessors: Vec<NodeId>,
    pub expanded: bool,
    pub dependencies_visible: bool,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            heat_factor: 0.0,
            parents: Vec::new(),
            children: Vec::new(),
            successors: Vec::new(),
            predecessors: Vec::new(),
            expanded: false,
            dependencies_visible: false,
        }
    }

    pub fn with_heat(mut self, heat_factor: f64) -> Self {
        self.heat_factor = heat_factor;
        self
    }

    pub fn dependencies(&self) -> &[Dependency] {
        match &self.kind {
            NodeKind::Unit { dependencies, .. } => dependencies,
            _ => &[],
        }
    }
}

/// The in-memory program graph plus its fixed root set.
#[derive(Debug, Default, Clone)]
pub struct NodeGraph {
    nodes: HashMap<NodeId, Node>,
    order: Vec<NodeId>,
    roots: Vec<NodeId>,
}

impl NodeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node. Re-inserting an id replaces the payload but keeps its position.
    pub fn insert(&mut self, node: Node) {
        if !self.nodes.contains_key(&node.id) {
            self.order.push(node.id);
        }
        self.nodes.insert(node.id, node);
    }

    pub fn set_roots(&mut self, roots: Vec<NodeId>) {
        self.roots = roots;
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Lookup that fails with a typed error instead of `None`.
    pub fn node(&self, id: NodeId) -> Result<&Node, GraphError> {
        self.nodes.get(&id).ok_or(GraphError::UnknownNode(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node ids in insertion order.
    pub fn ids(&self) -> &[NodeId] {
        &self.order
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.nodes.get(&id).map(|n| n.expanded).unwrap_or(false)
    }

    pub(crate) fn set_expanded(&mut self, id: NodeId, expanded: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.expanded = expanded;
        }
    }

    /// Nest `child` inside `parent`, recording both directions.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), GraphError> {
        self.ensure(parent)?;
        self.ensure(child)?;
        if let Some(node) = self.nodes.get_mut(&parent) {
            push_unique(&mut node.children, child);
        }
        if let Some(node) = self.nodes.get_mut(&child) {
            push_unique(&mut node.parents, parent);
        }
        Ok(())
    }

    /// Record control flow `from -> to`, recording both directions.
    pub fn add_flow(&mut self, from: NodeId, to: NodeId) -> Result<(), GraphError> {
        self.ensure(from)?;
        self.ensure(to)?;
        if let Some(node) = self.nodes.get_mut(&from) {
            push_unique(&mut node.successors, to);
        }
        if let Some(node) = self.nodes.get_mut(&to) {
            push_unique(&mut node.predecessors, from);
        }
        Ok(())
    }

    /// Check that every id referenced from any node resolves in the arena.
    pub fn validate(&self) -> Result<(), GraphError> {
        for id in &self.roots {
            self.ensure(*id)?;
        }
        for node in self.nodes.values() {
            let referenced = node
                .parents
                .iter()
                .chain(&node.children)
                .chain(&node.successors)
                .chain(&node.predecessors)
                .copied()
                .chain(node.dependencies().iter().map(|d| d.target));
            for target in referenced {
                if !self.contains(target) {
                    return Err(GraphError::DanglingReference { from: node.id, to: target });
                }
            }
            match &node.kind {
                NodeKind::Function { entry, .. } if !self.contains(*entry) => {
                    return Err(GraphError::DanglingReference { from: node.id, to: *entry });
                }
                NodeKind::CallSite { callee, .. } if !self.contains(*callee) => {
                    return Err(GraphError::DanglingReference { from: node.id, to: *callee });
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn ensure(&self, id: NodeId) -> Result<(), GraphError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(GraphError::UnknownNode(id))
        }
    }
}

fn push_unique(list: &mut Vec<NodeId>, id: NodeId) {
    if !list.contains(&id) {
        list.push(id);
    }
}
