use criterion::{black_box, criterion_group, criterion_main, Criterion};

use callscape::domain::callgraph::{CallGraph, CallGraphNode};
use callscape::domain::tree::Presenter;

/// Synthetic graph: layered calls with cross links, a few external callees,
/// and a recursion cluster at the tail.
fn synthetic_graph(functions: usize) -> CallGraph {
    let mut nodes = Vec::with_capacity(functions);
    for i in 0..functions {
        let mut callees = Vec::new();
        for step in 1..=3 {
            let target = i + step;
            if target < functions {
                callees.push(format!("func_{}", target));
            }
        }
        if i % 7 == 0 {
            callees.push(format!("external_{}", i));
        }
        if i % 11 == 0 && i > 0 {
            // back-edge, forms a cycle
            callees.push(format!("func_{}", i / 2));
        }
        nodes.push(CallGraphNode {
            id: format!("func_{}", i),
            callees,
        });
    }
    CallGraph::new(nodes)
}

fn bench_reduce(c: &mut Criterion) {
    let graph = synthetic_graph(500);
    c.bench_function("reduce_500_functions", |b| {
        b.iter(|| Presenter::new(black_box(graph.clone())).unwrap())
    });
}

fn bench_filter(c: &mut Criterion) {
    let tree = Presenter::new(synthetic_graph(500)).unwrap();
    c.bench_function("filter_500_functions", |b| {
        b.iter(|| black_box(&tree).default_filter())
    });
}

fn bench_edges(c: &mut Criterion) {
    let tree = Presenter::new(synthetic_graph(500)).unwrap();
    c.bench_function("edge_list_500_functions", |b| {
        b.iter(|| black_box(&tree).edges().len())
    });
}

criterion_group!(benches, bench_reduce, bench_filter, bench_edges);
criterion_main!(benches);
