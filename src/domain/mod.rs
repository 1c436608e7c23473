// Domain model for CallScope: the node arena and the expansion state kept on top of it.

pub mod ancestor;
pub mod error;
pub mod expansion;
pub mod node;

pub use ancestor::find_first_visible_ancestor;
pub use error::GraphError;
pub use expansion::ExpansionPath;
pub use node::{Dependency, Node, NodeGraph, NodeId, NodeKind};
