//! Graph controller: applies one request at a time to the expansion state and
//! re-renders the visible graph.
//!
//! State mutation and rendering are separate failure domains. A request that
//! names an unknown node is rejected before anything changes; a layout failure
//! after a successful mutation leaves the mutation in place.

use crate::domain::error::GraphError;
use crate::domain::expansion::ExpansionPath;
use crate::domain::node::{NodeGraph, NodeId, NodeKind};
use crate::ports::graph_description::{build_description, GraphDescription};
use crate::ports::markup::annotate_markup;
use crate::ports::{ArtifactSink, LayoutEngine};
use std::collections::HashSet;
use tracing::{error, info};

/// Inbound verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Expand if collapsed, otherwise collapse.
    ToggleFunctionCalls(NodeId),
    /// Flip dependency edges on a unit, or on every unit reachable through
    /// expanded containers below a non-unit node.
    ToggleDependencyEdges(NodeId),
    ExpandNode(NodeId),
    CollapseNode(NodeId),
    /// Expand a node and every descendant that has children.
    ExpandAll(NodeId),
    ExpandFullGraph,
    /// Expand the collapsed ancestors of a node, top-down.
    ExpandTo(NodeId),
    ResetGraph,
    /// Re-render the current view without changing anything.
    Render,
}

/// Outbound events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    UpdateGraph(String),
    Alert(String),
}

pub const LAYOUT_FAILED: &str =
    "The graph layout could not be calculated. The description was saved for inspection.";

pub struct GraphController {
    graph: NodeGraph,
    expansion: ExpansionPath,
    engine: Box<dyn LayoutEngine>,
    artifacts: Box<dyn ArtifactSink>,
}

impl GraphController {
    pub fn new(
        graph: NodeGraph,
        visible_parents: usize,
        engine: Box<dyn LayoutEngine>,
        artifacts: Box<dyn ArtifactSink>,
    ) -> Self {
        let expansion = ExpansionPath::new(graph.roots().to_vec(), visible_parents);
        Self {
            graph,
            expansion,
            engine,
            artifacts,
        }
    }

    pub fn graph(&self) -> &NodeGraph {
        &self.graph
    }

    pub fn expansion(&self) -> &ExpansionPath {
        &self.expansion
    }

    /// Collapse everything and hand the graph back.
    pub fn dispose(mut self) -> NodeGraph {
        self.expansion.reset(&mut self.graph);
        self.graph
    }

    /// Handle one request to completion: mutate, render, post-process.
    pub fn handle(&mut self, request: Request) -> Response {
        info!(?request, "handling request");
        match self.apply(request) {
            Ok(start) => match self.render(&start) {
                Some(markup) => Response::UpdateGraph(markup),
                None => Response::Alert(LAYOUT_FAILED.to_string()),
            },
            Err(e) => {
                error!(error = %e, "request rejected");
                Response::Alert(e.to_string())
            }
        }
    }

    /// Apply the state change of `request` and return the start nodes to render from.
    pub fn apply(&mut self, request: Request) -> Result<Vec<NodeId>, GraphError> {
        match request {
            Request::ToggleFunctionCalls(id) => {
                let node = self.graph.node(id)?;
                if node.expanded {
                    // Call sites opened by expand-all may still be closed here.
                    self.expansion.remove_node(&mut self.graph, id);
                } else {
                    ensure_expandable(id, &node.kind)?;
                    self.expansion.add_node(&mut self.graph, id)?;
                }
            }
            Request::ToggleDependencyEdges(id) => self.toggle_dependency_edges(id)?,
            Request::ExpandNode(id) => {
                ensure_expandable(id, &self.graph.node(id)?.kind)?;
                self.expansion.add_node(&mut self.graph, id)?;
            }
            Request::CollapseNode(id) => {
                self.graph.node(id)?;
                self.expansion.remove_node(&mut self.graph, id);
            }
            Request::ExpandAll(id) => {
                self.expand_subtree(&[id])?;
                return Ok(vec![id]);
            }
            Request::ExpandFullGraph => {
                let roots = self.graph.roots().to_vec();
                self.expand_subtree(&roots)?;
                return Ok(roots);
            }
            Request::ExpandTo(id) => self.expand_to(id)?,
            Request::ResetGraph => {
                self.expansion.reset(&mut self.graph);
                return Ok(self.graph.roots().to_vec());
            }
            Request::Render => {}
        }
        Ok(self.expansion.visible_root_nodes().to_vec())
    }

    /// Build the description for `start` without laying it out.
    pub fn describe(&self, start: &[NodeId]) -> Result<GraphDescription, GraphError> {
        build_description(&self.graph, start)
    }

    /// Describe, lay out and annotate. `None` when any step fails; the
    /// failing description is kept as an error artifact.
    pub fn render(&self, start: &[NodeId]) -> Option<String> {
        let description = match self.describe(start) {
            Ok(description) => description,
            Err(e) => {
                error!(error = %e, "failed to build graph description");
                return None;
            }
        };
        info!(
            start = ?start,
            nodes = description.rendered_nodes.len(),
            bytes = description.dot.len(),
            "graph description built"
        );
        self.artifacts.write_debug(&description.dot);

        match self.engine.layout(&description.dot) {
            Ok(markup) => Some(annotate_markup(&markup, &self.graph, &description)),
            Err(e) => {
                let cause = format!("{:#}", e);
                error!(error = %cause, "layout engine failed");
                self.artifacts.write_error(&description.dot);
                None
            }
        }
    }

    fn toggle_dependency_edges(&mut self, id: NodeId) -> Result<(), GraphError> {
        let node = self.graph.node(id)?;
        if node.kind.is_unit() {
            self.flip_dependencies(id);
            return Ok(());
        }

        let mut stack = vec![id];
        let mut seen = HashSet::from([id]);
        let mut units = Vec::new();
        while let Some(current) = stack.pop() {
            let Some(node) = self.graph.get(current) else {
                continue;
            };
            for child_id in &node.children {
                let Some(child) = self.graph.get(*child_id) else {
                    continue;
                };
                if child.kind.is_unit() {
                    if seen.insert(*child_id) {
                        units.push(*child_id);
                    }
                } else if child.expanded && seen.insert(*child_id) {
                    stack.push(*child_id);
                }
            }
        }
        for unit in units {
            self.flip_dependencies(unit);
        }
        Ok(())
    }

    fn flip_dependencies(&mut self, id: NodeId) {
        if let Some(node) = self.graph.get_mut(id) {
            node.dependencies_visible = !node.dependencies_visible;
        }
    }

    /// Depth-first expansion of `start` and every descendant that has
    /// children of its own. Unknown ids fail before anything is expanded.
    fn expand_subtree(&mut self, start: &[NodeId]) -> Result<(), GraphError> {
        for id in start {
            self.graph.node(*id)?;
        }
        let mut stack: Vec<NodeId> = start.to_vec();
        let mut seen = HashSet::new();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            self.expansion.add_node(&mut self.graph, id)?;
            let Some(node) = self.graph.get(id) else {
                continue;
            };
            for child_id in &node.children {
                let has_children = self
                    .graph
                    .get(*child_id)
                    .is_some_and(|child| !child.children.is_empty());
                if has_children {
                    stack.push(*child_id);
                }
            }
        }
        Ok(())
    }

    /// Follow first parents upward while they are collapsed, then expand
    /// that chain from the top down. The walk stops below a call site.
    fn expand_to(&mut self, id: NodeId) -> Result<(), GraphError> {
        let mut current = self.graph.node(id)?;
        let mut chain = Vec::new();
        let mut seen = HashSet::from([id]);
        while let Some(parent) = current.parents.first().copied() {
            if self.graph.is_expanded(parent) || !seen.insert(parent) {
                break;
            }
            let parent_node = self.graph.node(parent)?;
            if ensure_expandable(parent, &parent_node.kind).is_err() {
                break;
            }
            chain.push(parent);
            current = parent_node;
        }
        while let Some(ancestor) = chain.pop() {
            self.expansion.add_node(&mut self.graph, ancestor)?;
        }
        Ok(())
    }
}

/// Call sites only open through expand-all.
fn ensure_expandable(id: NodeId, kind: &NodeKind) -> Result<(), GraphError> {
    match kind {
        NodeKind::CallSite { .. } => Err(GraphError::NotExpandable(id)),
        _ => Ok(()),
    }
}
