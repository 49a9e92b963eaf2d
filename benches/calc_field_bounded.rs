//! Measure solving a field whose exploration is bounded by a cost cutoff and
//! a settled node cap on a large weighted grid
//!

use bevy_dijkstra_map_plugin::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Grid with every node tagged with one of four terrain classes
fn prepare_graph(columns: u32, rows: u32) -> NavGraph {
	let mut rng = StdRng::seed_from_u64(42);
	let mut graph = grid_graph(columns, rows, Connectivity::All, 1.0).unwrap();
	let ids: Vec<NodeId> = graph.node_ids().collect();
	for id in ids {
		let class = TerrainClass::new(rng.random_range(0..4));
		graph.set_terrain(id, class).unwrap();
	}
	graph
}

pub fn criterion_benchmark(c: &mut Criterion) {
	let mut group = c.benchmark_group("algorithm_use");
	group.significance_level(0.05).sample_size(50);
	let graph = prepare_graph(1000, 1000);
	let source = grid_node_id(500, 500, 1000);
	let weights = TerrainWeights::new()
		.with(TerrainClass::new(1), 1.5)
		.with(TerrainClass::new(2), 3.0)
		.with(TerrainClass::new(3), 0.5);
	let by_cost = SolveOptions::new()
		.with_terrain_weights(weights.clone())
		.with_max_cost(40.0);
	group.bench_function("calc_field_max_cost", |b| {
		b.iter(|| graph.recalculate(black_box(&[source]), black_box(&by_cost)).unwrap())
	});
	let by_count = SolveOptions::new()
		.with_terrain_weights(weights)
		.with_max_settled(5000);
	group.bench_function("calc_field_max_settled", |b| {
		b.iter(|| graph.recalculate(black_box(&[source]), black_box(&by_count)).unwrap())
	});
	group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
