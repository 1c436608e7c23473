use std::fs;
use std::path::Path;
use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;
use crate::domain::node::{Dependency, Node, NodeGraph, NodeId, NodeKind};

/// On-disk node data: the root set plus every node with its relations.
#[derive(Debug, Deserialize)]
pub struct NodeDataFile {
    pub roots: Vec<u64>,
    pub nodes: Vec<NodeRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: u64,
    #[serde(default)]
    pub heat_factor: f64,
    #[serde(default)]
    pub children: Vec<u64>,
    #[serde(flatten)]
    pub kind: KindRecord,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum KindRecord {
    Unit {
        #[serde(default)]
        read_data_size: u64,
        #[serde(default)]
        write_data_size: u64,
        #[serde(default)]
        successors: Vec<u64>,
        #[serde(default)]
        dependencies: Vec<DependencyRecord>,
    },
    Function {
        name: String,
        entry: u64,
        #[serde(default)]
        start_line: u32,
        #[serde(default)]
        end_line: u32,
    },
    Loop {
        #[serde(default)]
        start_line: u32,
        #[serde(default)]
        end_line: u32,
    },
    CallSite {
        name: String,
        callee: u64,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyRecord {
    pub target: u64,
    pub variable_name: String,
    #[serde(default)]
    pub read_after_write: bool,
    #[serde(default)]
    pub write_after_read: bool,
}

pub struct NodeLoader;

impl NodeLoader {
    /// Load and link a node graph from a JSON file.
    pub fn load_file(path: &Path) -> Result<NodeGraph> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read node data {}", path.display()))?;
        let graph = Self::parse(&text)
            .with_context(|| format!("Invalid node data {}", path.display()))?;
        info!(nodes = graph.len(), roots = graph.roots().len(), "node data loaded");
        Ok(graph)
    }

    pub fn parse(text: &str) -> Result<NodeGraph> {
        let data: NodeDataFile = serde_json::from_str(text).context("Malformed node data JSON")?;
        Self::build(data)
    }

    /// Insert all nodes first, then link, so forward references resolve.
    /// Parents and predecessors are derived from children and successors.
    pub fn build(data: NodeDataFile) -> Result<NodeGraph> {
        let mut graph = NodeGraph::new();
        for record in &data.nodes {
            let kind = match &record.kind {
                KindRecord::Unit {
                    read_data_size,
                    write_data_size,
                    dependencies,
                    ..
                } => NodeKind::Unit {
                    read_data_size: *read_data_size,
                    write_data_size: *write_data_size,
                    dependencies: dependencies
                        .iter()
                        .map(|d| Dependency {
                            target: NodeId(d.target),
                            variable_name: d.variable_name.clone(),
                            read_after_write: d.read_after_write,
                            write_after_read: d.write_after_read,
                        })
                        .collect(),
                },
                KindRecord::Function {
                    name,
                    entry,
                    start_line,
                    end_line,
                } => NodeKind::Function {
                    name: name.clone(),
                    entry: NodeId(*entry),
                    start_line: *start_line,
                    end_line: *end_line,
                },
                KindRecord::Loop {
                    start_line,
                    end_line,
                } => NodeKind::Loop {
                    start_line: *start_line,
                    end_line: *end_line,
                },
                KindRecord::CallSite { name, callee } => NodeKind::CallSite {
                    name: name.clone(),
                    callee: NodeId(*callee),
                },
            };
            graph.insert(Node::new(NodeId(record.id), kind).with_heat(record.heat_factor));
        }

        for record in &data.nodes {
            let id = NodeId(record.id);
            for child in &record.children {
                graph
                    .add_child(id, NodeId(*child))
                    .with_context(|| format!("Node {} lists an unknown child", id))?;
            }
            if let KindRecord::Unit { successors, .. } = &record.kind {
                for successor in successors {
                    graph
                        .add_flow(id, NodeId(*successor))
                        .with_context(|| format!("Node {} lists an unknown successor", id))?;
                }
            }
        }

        graph.set_roots(data.roots.into_iter().map(NodeId).collect());
        graph.validate()?;
        Ok(graph)
    }
}
