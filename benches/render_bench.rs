//! Benchmarks for CallScope description building.
//!
//! Run with: `cargo bench`

use callscope::domain::expansion::ExpansionPath;
use callscope::domain::node::{Dependency, Node, NodeGraph, NodeId, NodeKind};
use callscope::ports::graph_description::build_description;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

// ═══════════════════════════════════════════════════════════════════════════
// Synthetic Data Generators
// ═══════════════════════════════════════════════════════════════════════════

/// A program unit holding `num_functions` functions of `units_per_fn` units
/// each. Every unit calls the next function, so the call graph is one cycle.
fn create_synthetic_graph(num_functions: u64, units_per_fn: u64) -> NodeGraph {
    let mut graph = NodeGraph::new();
    let program = NodeId(0);
    graph.insert(Node::new(program, unit_kind(Vec::new())));
    graph.set_roots(vec![program]);

    let function_id = |f: u64| NodeId(1 + f * (2 * units_per_fn + 1));
    let unit_id = |f: u64, u: u64| NodeId(function_id(f).0 + 1 + 2 * u);
    let call_id = |f: u64, u: u64| NodeId(unit_id(f, u).0 + 1);

    for f in 0..num_functions {
        graph.insert(
            Node::new(
                function_id(f),
                NodeKind::Function {
                    name: format!("func_{}", f),
                    entry: unit_id(f, 0),
                    start_line: (f * 20) as u32,
                    end_line: (f * 20 + 15) as u32,
                },
            )
            .with_heat((f % 10) as f64 / 10.0),
        );
        for u in 0..units_per_fn {
            let dependencies = if u > 0 {
                vec![Dependency {
                    target: unit_id(f, u - 1),
                    variable_name: format!("v{}", u),
                    read_after_write: true,
                    write_after_read: false,
                }]
            } else {
                Vec::new()
            };
            graph.insert(Node::new(unit_id(f, u), unit_kind(dependencies)));
            graph.insert(Node::new(
                call_id(f, u),
                NodeKind::CallSite {
                    name: format!("func_{}", (f + 1) % num_functions),
                    callee: function_id((f + 1) % num_functions),
                },
            ));
        }
    }

    for f in 0..num_functions {
        graph.add_child(program, function_id(f)).unwrap();
        for u in 0..units_per_fn {
            graph.add_child(function_id(f), unit_id(f, u)).unwrap();
            graph.add_child(unit_id(f, u), call_id(f, u)).unwrap();
            if u + 1 < units_per_fn {
                graph.add_flow(unit_id(f, u), unit_id(f, u + 1)).unwrap();
            }
            if let Some(unit) = graph.get_mut(unit_id(f, u)) {
                unit.dependencies_visible = true;
            }
        }
    }
    graph
}

fn unit_kind(dependencies: Vec<Dependency>) -> NodeKind {
    NodeKind::Unit {
        read_data_size: 4096,
        write_data_size: 512,
        dependencies,
    }
}

/// Expand every node that has children.
fn expand_everything(graph: &mut NodeGraph) {
    let mut path = ExpansionPath::new(graph.roots().to_vec(), usize::MAX);
    let ids = graph.ids().to_vec();
    for id in ids {
        let has_children = graph.get(id).is_some_and(|n| !n.children.is_empty());
        if has_children {
            path.add_node(graph, id).unwrap();
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Description Benchmarks
// ═══════════════════════════════════════════════════════════════════════════

fn bench_collapsed_overview(c: &mut Criterion) {
    let mut group = c.benchmark_group("describe/collapsed");

    for num_functions in [10u64, 100, 500].iter() {
        let graph = create_synthetic_graph(*num_functions, 8);
        group.throughput(Throughput::Elements(*num_functions));
        group.bench_with_input(
            BenchmarkId::new("functions", num_functions),
            &graph,
            |b, graph| b.iter(|| build_description(black_box(graph), graph.roots()).unwrap()),
        );
    }

    group.finish();
}

fn bench_fully_expanded(c: &mut Criterion) {
    let mut group = c.benchmark_group("describe/expanded");

    for num_functions in [10u64, 100, 500].iter() {
        let mut graph = create_synthetic_graph(*num_functions, 8);
        expand_everything(&mut graph);
        group.throughput(Throughput::Elements(graph.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("functions", num_functions),
            &graph,
            |b, graph| b.iter(|| build_description(black_box(graph), graph.roots()).unwrap()),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_collapsed_overview, bench_fully_expanded);
criterion_main!(benches);
