//! Label Formatter
//!
//! Builds the Graphviz label for a node: an HTML-like table for units,
//! functions and loops, a plain quoted string for call sites.

use crate::domain::node::{Node, NodeKind};

/// Font Awesome "fire" glyph, coloured by heat.
const HEAT_GLYPH: &str = "&#xf06d;";
/// Hooked right arrow, prefixed to a unit's call count.
const CALLS_GLYPH: &str = "&#8618;";

pub fn create_label(node: &Node) -> String {
    match &node.kind {
        NodeKind::Unit {
            read_data_size,
            write_data_size,
            dependencies,
        } => unit_label(
            *read_data_size,
            *write_data_size,
            node.children.len(),
            dependencies.len(),
            node.heat_factor,
        ),
        NodeKind::Function {
            name,
            start_line,
            end_line,
            ..
        } => container_label(&escape_html(name), *start_line, *end_line, node.heat_factor),
        NodeKind::Loop {
            start_line,
            end_line,
        } => container_label("Loop", *start_line, *end_line, node.heat_factor),
        NodeKind::CallSite { name, .. } => format!("\"{}\"", escape_quoted(name)),
    }
}

fn unit_label(read: u64, written: u64, calls: usize, dependencies: usize, heat: f64) -> String {
    let mut colspan = 1;
    if calls > 0 {
        colspan += 1;
    }
    if dependencies > 0 {
        colspan += 1;
    }

    let mut label = String::from("<<TABLE BORDER=\"0\">");
    label.push_str(&format!(
        "\n<TR><TD COLSPAN=\"{colspan}\">Data-Read: {}</TD></TR>",
        human_size(read)
    ));
    label.push_str(&format!(
        "\n<TR><TD COLSPAN=\"{colspan}\">Data-Written: {}</TD></TR><TR>",
        human_size(written)
    ));
    if calls > 0 {
        label.push_str(&format!("\n<TD>{CALLS_GLYPH}: {calls}</TD>"));
    }
    label.push_str(&heat_cell(heat));
    if dependencies > 0 {
        label.push_str(&format!("<TD>D: {dependencies}</TD>"));
    }
    label.push_str("\n</TR></TABLE>>");
    label
}

fn container_label(title: &str, start_line: u32, end_line: u32, heat: f64) -> String {
    let mut label = String::from("<<TABLE BORDER=\"0\">");
    label.push_str(&format!("\n<TR><TD>{title}</TD></TR>"));
    label.push_str(&format!("\n<TR><TD>[{start_line}-{end_line}]</TD></TR>"));
    label.push_str(&format!("\n<TR>{}</TR>", heat_cell(heat)));
    label.push_str("\n</TABLE>>");
    label
}

fn heat_cell(heat: f64) -> String {
    format!("<TD><FONT COLOR=\"{}\">{HEAT_GLYPH}</FONT></TD>", heat_color(heat))
}

/// Linear blue (0.0) to red (1.0) interpolation as `#rrggbb`.
pub fn heat_color(heat: f64) -> String {
    let heat = if heat.is_nan() { 0.0 } else { heat.clamp(0.0, 1.0) };
    let red = (255.0 * heat).floor() as u8;
    let blue = (255.0 * (1.0 - heat)).floor() as u8;
    format!("#{red:02x}00{blue:02x}")
}

/// SI byte count, e.g. `999 B`, `1.5 kB`, `2.0 MB`.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 8] = ["kB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];
    const THRESHOLD: f64 = 1000.0;

    if bytes < 1000 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    value /= THRESHOLD;
    while value >= THRESHOLD && unit < UNITS.len() - 1 {
        value /= THRESHOLD;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn escape_quoted(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::{Dependency, NodeId};

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(0), "0 B");
        assert_eq!(human_size(999), "999 B");
        assert_eq!(human_size(1000), "1.0 kB");
        assert_eq!(human_size(1500), "1.5 kB");
        assert_eq!(human_size(2_000_000), "2.0 MB");
    }

    #[test]
    fn test_heat_color_endpoints() {
        assert_eq!(heat_color(0.0), "#0000ff");
        assert_eq!(heat_color(1.0), "#ff0000");
        assert_eq!(heat_color(0.5), "#7f007f");
        assert_eq!(heat_color(7.0), "#ff0000");
    }

    #[test]
    fn test_unit_label_columns() {
        let mut node = Node::new(
            NodeId(1),
            NodeKind::Unit {
                read_data_size: 2048,
                write_data_size: 10,
                dependencies: vec![Dependency {
                    target: NodeId(2),
                    variable_name: "x".to_string(),
                    read_after_write: true,
                    write_after_read: false,
                }],
            },
        );
        node.children.push(NodeId(5));

        let label = create_label(&node);
        assert!(label.starts_with("<<TABLE"));
        assert!(label.ends_with("</TABLE>>"));
        assert!(label.contains("COLSPAN=\"3\""));
        assert!(label.contains("Data-Read: 2.0 kB"));
        assert!(label.contains("Data-Written: 10 B"));
        assert!(label.contains("&#8618;: 1"));
        assert!(label.contains("D: 1"));
    }

    #[test]
    fn test_plain_unit_has_single_column() {
        let node = Node::new(
            NodeId(1),
            NodeKind::Unit {
                read_data_size: 0,
                write_data_size: 0,
                dependencies: vec![],
            },
        );
        let label = create_label(&node);
        assert!(label.contains("COLSPAN=\"1\""));
        assert!(!label.contains("D: "));
    }

    #[test]
    fn test_function_and_loop_labels() {
        let function = Node::new(
            NodeId(1),
            NodeKind::Function {
                name: "compute<T>".to_string(),
                entry: NodeId(2),
                start_line: 10,
                end_line: 42,
            },
        )
        .with_heat(1.0);
        let label = create_label(&function);
        assert!(label.contains("<TD>compute&lt;T&gt;</TD>"));
        assert!(label.contains("[10-42]"));
        assert!(label.contains("#ff0000"));

        let looped = Node::new(
            NodeId(3),
            NodeKind::Loop {
                start_line: 1,
                end_line: 2,
            },
        );
        assert!(create_label(&looped).contains("<TD>Loop</TD>"));
    }

    #[test]
    fn test_call_site_label_is_quoted() {
        let node = Node::new(
            NodeId(1),
            NodeKind::CallSite {
                name: "say \"hi\"".to_string(),
                callee: NodeId(2),
            },
        );
        assert_eq!(create_label(&node), "\"say \\\"hi\\\"\"");
    }
}
