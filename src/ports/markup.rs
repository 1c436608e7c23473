//! Markup Post-Processor
//!
//! Graphviz has no notion of node or edge categories, so the classes are
//! patched into the SVG afterwards, matched by the `id` attributes the
//! description builder assigned. Native `<title>` tooltips are stripped.

use crate::domain::node::NodeGraph;
use crate::ports::graph_description::{EdgeCategory, GraphDescription};
use regex::Regex;
use std::sync::LazyLock;

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<title>.*?</title>").expect("static regex"));

pub fn annotate_markup(svg: &str, graph: &NodeGraph, description: &GraphDescription) -> String {
    let mut svg = svg.to_string();

    for id in &description.rendered_nodes {
        let Some(node) = graph.get(*id) else {
            continue;
        };
        let class = node.kind.css_class();
        for group in ["node", "cluster"] {
            svg = add_class(&svg, &id.to_string(), group, class);
        }
    }

    for edge in &description.flow_edges {
        svg = add_class(&svg, &edge.dom_id(EdgeCategory::Flow), "edge", EdgeCategory::Flow.css_class());
    }
    for edge in &description.call_edges {
        svg = add_class(&svg, &edge.dom_id(EdgeCategory::Call), "edge", EdgeCategory::Call.css_class());
    }
    for dep in &description.dependency_edges {
        svg = add_class(&svg, &dep.dom_id(), "edge", EdgeCategory::Dependency.css_class());
    }

    strip_titles(&svg)
}

/// Remove every `<title>...</title>` element.
pub fn strip_titles(svg: &str) -> String {
    TITLE_RE.replace_all(svg, "").into_owned()
}

fn add_class(svg: &str, dom_id: &str, group: &str, class: &str) -> String {
    let needle = format!("<g id=\"{dom_id}\" class=\"{group}\"");
    if !svg.contains(&needle) {
        return svg.to_string();
    }
    svg.replace(&needle, &format!("<g id=\"{dom_id}\" class=\"{group} {class}\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::{Dependency, Node, NodeId, NodeKind};
    use crate::ports::graph_description::{DependencyEdge, EdgeKey};

    fn graph() -> NodeGraph {
        let mut graph = NodeGraph::new();
        graph.insert(Node::new(
            NodeId(1),
            NodeKind::Function {
                name: "main".to_string(),
                entry: NodeId(2),
                start_line: 1,
                end_line: 5,
            },
        ));
        for id in [2, 3] {
            graph.insert(Node::new(
                NodeId(id),
                NodeKind::Unit {
                    read_data_size: 0,
                    write_data_size: 0,
                    dependencies: Vec::<Dependency>::new(),
                },
            ));
        }
        graph
    }

    #[test]
    fn test_classes_injected_and_titles_stripped() {
        let svg = concat!(
            "<svg>\n",
            "<g id=\"1\" class=\"cluster\">\n<title>cluster1</title>\n</g>\n",
            "<g id=\"2\" class=\"node\">\n<title>2</title>\n</g>\n",
            "<g id=\"3\" class=\"node\">\n<title>3</title>\n</g>\n",
            "<g id=\"2t3\" class=\"edge\">\n<title>2&#45;&gt;3</title>\n</g>\n",
            "<g id=\"2c3\" class=\"edge\">\n</g>\n",
            "<g id=\"3d2_0\" class=\"edge\">\n</g>\n",
            "<g id=\"3d2_1\" class=\"edge\">\n</g>\n",
            "</svg>"
        );
        let description = GraphDescription {
            rendered_nodes: vec![NodeId(1), NodeId(2), NodeId(3)],
            flow_edges: vec![EdgeKey::new(NodeId(2), NodeId(3))],
            call_edges: vec![EdgeKey::new(NodeId(2), NodeId(3))],
            dependency_edges: vec![
                DependencyEdge {
                    key: EdgeKey::new(NodeId(3), NodeId(2)),
                    variable_name: "x".to_string(),
                    tail_label: 'R',
                    head_label: 'W',
                    ordinal: 0,
                },
                DependencyEdge {
                    key: EdgeKey::new(NodeId(3), NodeId(2)),
                    variable_name: "y".to_string(),
                    tail_label: 'W',
                    head_label: 'R',
                    ordinal: 1,
                },
            ],
            ..GraphDescription::default()
        };

        let out = annotate_markup(svg, &graph(), &description);
        assert!(out.contains("<g id=\"1\" class=\"cluster function\""));
        assert!(out.contains("<g id=\"2\" class=\"node unit\""));
        assert!(out.contains("<g id=\"2t3\" class=\"edge flow-edge\""));
        assert!(out.contains("<g id=\"2c3\" class=\"edge call-edge\""));
        assert!(out.contains("<g id=\"3d2_0\" class=\"edge dependency-edge\""));
        assert!(out.contains("<g id=\"3d2_1\" class=\"edge dependency-edge\""));
        assert!(!out.contains("<title>"));
    }

    #[test]
    fn test_ids_match_exactly() {
        let svg = "<g id=\"12\" class=\"node\"></g><g id=\"2\" class=\"node\"></g>";
        let description = GraphDescription {
            rendered_nodes: vec![NodeId(2)],
            ..GraphDescription::default()
        };
        let out = annotate_markup(svg, &graph(), &description);
        assert!(out.contains("<g id=\"12\" class=\"node\">"));
        assert!(out.contains("<g id=\"2\" class=\"node unit\">"));
    }
}
