//! Graph-Description Builder
//!
//! Walks the visible part of the node graph and emits a Graphviz DOT
//! description: expanded containers become `subgraph cluster<id>` blocks,
//! collapsed ones a single shaped node. Alongside the text it returns the
//! bookkeeping the markup post-processor needs (rendered nodes and the edges
//! of each category).

use crate::domain::ancestor::find_first_visible_ancestor;
use crate::domain::error::GraphError;
use crate::domain::node::{Node, NodeGraph, NodeId, NodeKind};
use crate::ports::label::create_label;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Edge categories, each styled and classed differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeCategory {
    Flow,
    Call,
    Dependency,
}

impl EdgeCategory {
    /// Separator used in the edge's DOT `id`, so that the same endpoint pair
    /// gets a distinct id per category.
    fn separator(self) -> char {
        match self {
            EdgeCategory::Flow => 't',
            EdgeCategory::Call => 'c',
            EdgeCategory::Dependency => 'd',
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            EdgeCategory::Flow => "flow-edge",
            EdgeCategory::Call => "call-edge",
            EdgeCategory::Dependency => "dependency-edge",
        }
    }
}

/// A rendered `from -> to` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    pub from: NodeId,
    pub to: NodeId,
}

impl EdgeKey {
    pub fn new(from: NodeId, to: NodeId) -> Self {
        Self { from, to }
    }

    /// The `id` attribute written into the description for this edge.
    pub fn dom_id(&self, category: EdgeCategory) -> String {
        format!("{}{}{}", self.from, category.separator(), self.to)
    }
}

/// A dependency edge with its variable and direction labels.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyEdge {
    pub key: EdgeKey,
    pub variable_name: String,
    /// `R` when read-after-write, else `W`.
    pub tail_label: char,
    /// `R` when write-after-read, else `W`.
    pub head_label: char,
    /// Position among the dependency edges sharing `key`.
    pub ordinal: usize,
}

impl DependencyEdge {
    /// `<from>d<to>_<ordinal>`, unique even when several dependencies
    /// resolve to the same visible pair.
    pub fn dom_id(&self) -> String {
        format!("{}_{}", self.key.dom_id(EdgeCategory::Dependency), self.ordinal)
    }
}

/// Output of one render pass.
#[derive(Debug, Clone, Default)]
pub struct GraphDescription {
    pub dot: String,
    /// Every node emitted, in emission order.
    pub rendered_nodes: Vec<NodeId>,
    pub flow_edges: Vec<EdgeKey>,
    pub call_edges: Vec<EdgeKey>,
    pub dependency_edges: Vec<DependencyEdge>,
    /// Start nodes that were replaced by their children.
    pub hidden_roots: Vec<NodeId>,
}

impl GraphDescription {
    pub fn has_flow_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.flow_edges.contains(&EdgeKey::new(from, to))
    }

    pub fn has_call_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.call_edges.contains(&EdgeKey::new(from, to))
    }
}

/// DOT id of the synthetic marker pointing into a top-level function.
pub fn entry_marker_id(function: NodeId) -> String {
    format!("entry{function}")
}

/// Build the description starting from `start_nodes`.
///
/// A start node that is a unit (the file-level container) is not drawn; its
/// children are queued instead and an entry marker is synthesized for each.
pub fn build_description(
    graph: &NodeGraph,
    start_nodes: &[NodeId],
) -> Result<GraphDescription, GraphError> {
    let mut builder = DescriptionBuilder::new(graph);
    for id in start_nodes {
        let node = graph.node(*id)?;
        if node.kind.is_unit() {
            builder.hidden_roots.push(*id);
            builder.queue.extend(node.children.iter().copied());
        } else {
            builder.queue.push(*id);
        }
    }
    debug!(start = ?start_nodes, "building graph description");
    Ok(builder.run())
}

struct DescriptionBuilder<'g> {
    graph: &'g NodeGraph,
    lines: Vec<String>,
    visited: HashSet<NodeId>,
    rendered_nodes: Vec<NodeId>,
    queue: Vec<NodeId>,
    hidden_roots: Vec<NodeId>,
    flow_edges: Vec<EdgeKey>,
    call_edges: Vec<EdgeKey>,
    dependency_edges: Vec<DependencyEdge>,
}

impl<'g> DescriptionBuilder<'g> {
    fn new(graph: &'g NodeGraph) -> Self {
        Self {
            graph,
            lines: Vec::new(),
            visited: HashSet::new(),
            rendered_nodes: Vec::new(),
            queue: Vec::new(),
            hidden_roots: Vec::new(),
            flow_edges: Vec::new(),
            call_edges: Vec::new(),
            dependency_edges: Vec::new(),
        }
    }

    fn run(mut self) -> GraphDescription {
        self.lines.push("digraph G {".to_string());
        self.lines.push("node [fontname = \"font-awesome\"];".to_string());

        while let Some(id) = self.queue.pop() {
            self.add_subgraph(id);
        }

        // Everything below lives outside the clusters; edges declared inside
        // a cluster drag their endpoints into it.
        for edge in &self.flow_edges {
            self.lines.push(format!(
                "{} -> {} [id=\"{}\"];",
                edge.from,
                edge.to,
                edge.dom_id(EdgeCategory::Flow)
            ));
        }

        for hidden in self.hidden_roots.clone() {
            self.add_entry_markers(hidden);
        }

        for edge in &self.call_edges {
            self.lines.push(format!(
                "{} -> {} [style=dotted, id=\"{}\"];",
                edge.from,
                edge.to,
                edge.dom_id(EdgeCategory::Call)
            ));
        }

        for dep in &self.dependency_edges {
            self.lines.push(format!(
                "{} -> {} [id=\"{}\", label=\"{}\", taillabel=\"{}\", headlabel=\"{}\", constraint=false];",
                dep.key.from,
                dep.key.to,
                dep.dom_id(),
                escape_attr(&dep.variable_name),
                dep.tail_label,
                dep.head_label
            ));
        }

        self.lines.push("}".to_string());

        GraphDescription {
            dot: self.lines.join("\n"),
            rendered_nodes: self.rendered_nodes,
            flow_edges: self.flow_edges,
            call_edges: self.call_edges,
            dependency_edges: self.dependency_edges,
            hidden_roots: self.hidden_roots,
        }
    }

    /// Mark `id` visited. Returns false when it was already rendered.
    fn visit(&mut self, id: NodeId) -> bool {
        if !self.visited.insert(id) {
            return false;
        }
        self.rendered_nodes.push(id);
        true
    }

    fn add_subgraph(&mut self, id: NodeId) {
        // Recursive functions reach themselves again through call sites.
        if !self.visit(id) {
            return;
        }
        let graph = self.graph;
        let Some(node) = graph.get(id) else {
            warn!(node = %id, "queued node missing from graph");
            return;
        };

        if !node.expanded {
            let shape = match node.kind {
                NodeKind::Function { .. } => "hexagon",
                NodeKind::Loop { .. } => "ellipse",
                NodeKind::CallSite { .. } => "diamond",
                NodeKind::Unit { .. } => "rect",
            };
            self.lines.push(format!(
                "{id} [id={id}, shape=\"{shape}\", label={}, style=\"filled\"];",
                create_label(node)
            ));
            return;
        }

        self.lines.push(format!("subgraph cluster{id} {{"));
        for child_id in &node.children {
            let Some(child) = graph.get(*child_id) else {
                continue;
            };
            match child.kind {
                NodeKind::Loop { .. } => self.add_subgraph(*child_id),
                NodeKind::Unit { .. } => self.add_unit(child),
                NodeKind::Function { .. } | NodeKind::CallSite { .. } => {}
            }
        }
        self.lines.push(format!("label={};", create_label(node)));
        self.lines.push("style=\"filled\"".to_string());
        self.lines.push(format!("id={id}"));
        self.lines.push("}".to_string());
    }

    fn add_unit(&mut self, unit: &Node) {
        if !self.visit(unit.id) {
            return;
        }
        let id = unit.id;
        self.lines.push(format!(
            "{id} [id={id}, shape=rect, label={}, style=\"filled\"];",
            create_label(unit)
        ));

        for successor in &unit.successors {
            if let Some(anchor) = self.anchor(*successor) {
                self.add_flow_edge(EdgeKey::new(id, anchor));
            }
        }
        for predecessor in &unit.predecessors {
            if let Some(anchor) = self.anchor(*predecessor) {
                self.add_flow_edge(EdgeKey::new(anchor, id));
            }
        }

        if unit.expanded {
            for call in &unit.children {
                self.add_call(id, *call);
            }
        }

        if unit.dependencies_visible {
            for dep in unit.dependencies() {
                let Some(anchor) = self.anchor(dep.target) else {
                    continue;
                };
                let key = EdgeKey::new(id, anchor);
                let ordinal = self
                    .dependency_edges
                    .iter()
                    .filter(|edge| edge.key == key)
                    .count();
                self.dependency_edges.push(DependencyEdge {
                    key,
                    variable_name: dep.variable_name.clone(),
                    tail_label: if dep.read_after_write { 'R' } else { 'W' },
                    head_label: if dep.write_after_read { 'R' } else { 'W' },
                    ordinal,
                });
            }
        }
    }

    /// Record the call edge from `caller` towards `call` and queue the callee
    /// so it renders as its own top-level block instead of inside the caller.
    fn add_call(&mut self, caller: NodeId, call: NodeId) {
        let graph = self.graph;
        let Some(node) = graph.get(call) else {
            return;
        };
        let (target, queued) = match &node.kind {
            NodeKind::Function { entry, .. } if node.expanded => (*entry, call),
            NodeKind::CallSite { callee, .. } if graph.is_expanded(*callee) => {
                let target = match graph.get(*callee).map(|n| &n.kind) {
                    Some(NodeKind::Function { entry, .. }) => *entry,
                    _ => *callee,
                };
                (target, *callee)
            }
            _ => (call, call),
        };
        let edge = EdgeKey::new(caller, target);
        if !self.call_edges.contains(&edge) {
            self.call_edges.push(edge);
        }
        self.queue.push(queued);
    }

    fn add_flow_edge(&mut self, edge: EdgeKey) {
        if !self.flow_edges.contains(&edge) {
            self.flow_edges.push(edge);
        }
    }

    fn anchor(&self, id: NodeId) -> Option<NodeId> {
        let anchor = find_first_visible_ancestor(self.graph, id);
        if anchor.is_none() {
            warn!(node = %id, "no visible ancestor, edge dropped");
        }
        anchor
    }

    fn add_entry_markers(&mut self, hidden: NodeId) {
        let graph = self.graph;
        let Some(node) = graph.get(hidden) else {
            return;
        };
        for child_id in &node.children {
            let Some(child) = graph.get(*child_id) else {
                continue;
            };
            let target = match &child.kind {
                NodeKind::Function { entry, .. } if child.expanded => *entry,
                _ => *child_id,
            };
            let marker = entry_marker_id(*child_id);
            self.lines.push(format!(
                "{marker} [id={marker}, shape=\"point\", label=\"entry\", style=\"filled\"];"
            ));
            self.lines.push(format!("{marker} -> {target};"));
        }
    }
}

fn escape_attr(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
