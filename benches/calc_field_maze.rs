//! Measure solving a field through a serpentine maze in reverse mode
//!
//! Every other column is a wall with a single gap alternating between the top
//! and bottom rows
//!
//! ```text
//!  _______________
//! |   | x |   |   |
//! |___|___|___|___|
//! |   | x |   | x |
//! |___|___|___|___|
//! |   |   |   | x |
//! |___|___|___|___|
//! ```
//!

use bevy_dijkstra_map_plugin::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Build a grid and disable the wall nodes
fn prepare_maze(columns: u32, rows: u32) -> NavGraph {
	let mut graph = grid_graph(columns, rows, Connectivity::Orthogonal, 1.0).unwrap();
	for column in (1..columns).step_by(2) {
		let gap = if (column / 2) % 2 == 0 { rows - 1 } else { 0 };
		for row in (0..rows).filter(|r| *r != gap) {
			graph.disable_node(grid_node_id(column, row, columns)).unwrap();
		}
	}
	graph
}

/// Solve towards the top left corner
fn calc(graph: &NavGraph, options: &SolveOptions) {
	black_box(graph.recalculate(&[NodeId::new(1)], options).unwrap());
}

pub fn criterion_benchmark(c: &mut Criterion) {
	let mut group = c.benchmark_group("algorithm_use");
	group.significance_level(0.05).sample_size(20);
	let graph = prepare_maze(301, 301);
	let options = SolveOptions::new().with_reverse(true);
	group.bench_function("calc_field_maze", |b| {
		b.iter(|| calc(black_box(&graph), black_box(&options)))
	});
	group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
