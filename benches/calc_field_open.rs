//! Measure solving a field over an open grid with diagonals from its centre
//!
//! Grid is 300 nodes by 300 nodes
//!

use bevy_dijkstra_map_plugin::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Solve from the centre of the grid
fn calc(graph: &NavGraph, source: NodeId) {
	black_box(graph.recalculate(&[source], &SolveOptions::default()).unwrap());
}

pub fn criterion_benchmark(c: &mut Criterion) {
	let mut group = c.benchmark_group("algorithm_use");
	group.significance_level(0.05).sample_size(20);
	let graph = grid_graph(300, 300, Connectivity::All, 1.0).unwrap();
	let source = grid_node_id(150, 150, 300);
	group.bench_function("calc_field_open", |b| {
		b.iter(|| calc(black_box(&graph), black_box(source)))
	});
	group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
