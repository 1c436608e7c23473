//! Visible-Ancestor Resolver
//!
//! Re-targets edges whose endpoint sits inside a collapsed container to the
//! boundary of the nearest container that is actually drawn.

use crate::domain::node::{NodeGraph, NodeId};
use std::collections::HashSet;

/// Find the node an edge towards `id` should attach to.
///
/// Returns `id` itself when one of its direct parents is expanded (the node is
/// drawn inside that parent). Otherwise searches the parents depth-first and
/// returns the first hit. `None` means no ancestor is expanded at all; callers
/// are expected to only ask for nodes below an expanded container.
pub fn find_first_visible_ancestor(graph: &NodeGraph, id: NodeId) -> Option<NodeId> {
    let mut visited = HashSet::new();
    resolve(graph, id, &mut visited)
}

fn resolve(graph: &NodeGraph, id: NodeId, visited: &mut HashSet<NodeId>) -> Option<NodeId> {
    // Malformed (cyclic) parent chains terminate here.
    if !visited.insert(id) {
        return None;
    }
    let node = graph.get(id)?;
    if node.parents.is_empty() {
        return None;
    }
    if node.parents.iter().any(|p| graph.is_expanded(*p)) {
        return Some(id);
    }
    node.parents
        .iter()
        .find_map(|parent| resolve(graph, *parent, visited))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::{Node, NodeKind};

    fn loop_node(id: u64) -> Node {
        Node::new(
            NodeId(id),
            NodeKind::Loop {
                start_line: 1,
                end_line: 2,
            },
        )
    }

    /// root(1) > loop(2) > loop(3) > loop(4)
    fn chain() -> NodeGraph {
        let mut graph = NodeGraph::new();
        for id in 1..=4 {
            graph.insert(loop_node(id));
        }
        graph.add_child(NodeId(1), NodeId(2)).unwrap();
        graph.add_child(NodeId(2), NodeId(3)).unwrap();
        graph.add_child(NodeId(3), NodeId(4)).unwrap();
        graph
    }

    #[test]
    fn test_node_with_expanded_parent_is_its_own_anchor() {
        let mut graph = chain();
        graph.set_expanded(NodeId(3), true);
        assert_eq!(find_first_visible_ancestor(&graph, NodeId(4)), Some(NodeId(4)));
    }

    #[test]
    fn test_collapsed_region_resolves_to_boundary() {
        let mut graph = chain();
        graph.set_expanded(NodeId(1), true);
        assert_eq!(find_first_visible_ancestor(&graph, NodeId(4)), Some(NodeId(2)));
    }

    #[test]
    fn test_root_has_no_anchor() {
        let graph = chain();
        assert_eq!(find_first_visible_ancestor(&graph, NodeId(1)), None);
        assert_eq!(find_first_visible_ancestor(&graph, NodeId(4)), None);
    }

    #[test]
    fn test_cyclic_parent_chain_terminates() {
        let mut graph = chain();
        // 2 <-> 3 become each other's parents; nothing expanded.
        graph.add_child(NodeId(3), NodeId(2)).unwrap();
        assert_eq!(find_first_visible_ancestor(&graph, NodeId(4)), None);
    }
}
