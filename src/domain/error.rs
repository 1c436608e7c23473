//! Typed errors raised by the graph and the expansion tracker.

use crate::domain::node::NodeId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("node {0} cannot be expanded directly (call sites expand through expand-all only)")]
    NotExpandable(NodeId),

    #[error("node {from} references missing node {to}")]
    DanglingReference { from: NodeId, to: NodeId },
}
