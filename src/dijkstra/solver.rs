//! Label-setting (Dijkstra) relaxation over a [NavGraph] producing a
//! [DijkstraMap].
//!
//! When a field needs to be (re)calculated all node costs start at infinity
//! and every source is seeded at `0`. The cheapest unsettled node is popped
//! from a min-priority frontier and settled, then each of its enabled edges to
//! an enabled neighbour is relaxed:
//!
//! 1. Forward solves walk outgoing edges, reverse solves walk incoming edges
//! 2. The step cost is the edge base cost multiplied by the terrain weight of
//!    the neighbour being labelled (the edge target going forward, the edge
//!    origin in reverse)
//! 3. If the candidate cost beats the neighbour's tentative cost it is
//!    recorded along with the settled node as the neighbour's next hop
//!
//! The wave expands until the frontier is empty, a branch exceeds `max_cost`
//! or `max_settled` nodes have been finalised.
//!
//! Ties are broken by insertion order: frontier entries of equal cost are
//! popped in the order they were pushed and a neighbour's next hop only
//! changes on a strictly cheaper candidate, so for identical inputs the first
//! discovered route wins every time.
//!

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::prelude::*;
use bevy::prelude::*;

/// An entry in the frontier, ordered so that [BinaryHeap] (a max-heap) pops
/// the smallest cost first and the earliest pushed among equals
#[derive(Clone, Copy, Debug)]
struct FrontierEntry {
	/// Tentative cost when pushed
	cost: f32,
	/// Push order used to break ties
	sequence: u64,
	/// Node slot
	slot: usize,
}

impl Ord for FrontierEntry {
	fn cmp(&self, other: &Self) -> Ordering {
		other
			.cost
			.total_cmp(&self.cost)
			.then_with(|| other.sequence.cmp(&self.sequence))
	}
}

impl PartialOrd for FrontierEntry {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl PartialEq for FrontierEntry {
	fn eq(&self, other: &Self) -> bool {
		self.cmp(other) == Ordering::Equal
	}
}
impl Eq for FrontierEntry {}

/// Per-solve scratch state indexed by node slot
struct Labels {
	/// Best known cost
	tentative: Vec<f32>,
	/// Slot of the settled node the best cost was reached through
	next_hop: Vec<Option<usize>>,
	/// Finalised
	settled: Vec<bool>,
	/// Min-priority frontier
	frontier: BinaryHeap<FrontierEntry>,
	/// Next push sequence number
	sequence: u64,
}

impl Labels {
	/// Create labels for a graph with `slots` node slots
	fn new(slots: usize) -> Self {
		Labels {
			tentative: vec![f32::INFINITY; slots],
			next_hop: vec![None; slots],
			settled: vec![false; slots],
			frontier: BinaryHeap::new(),
			sequence: 0,
		}
	}
	/// Record a cost for a slot and queue it for settling
	fn push(&mut self, slot: usize, cost: f32, next_hop: Option<usize>) {
		self.tentative[slot] = cost;
		self.next_hop[slot] = next_hop;
		self.frontier.push(FrontierEntry {
			cost,
			sequence: self.sequence,
			slot,
		});
		self.sequence += 1;
	}
}

impl NavGraph {
	/// Calculate the cost and direction fields of every node reachable from
	/// (or, with [SolveOptions::with_reverse], able to reach) the nearest of
	/// the `sources`.
	///
	/// Fails with [NavError::EmptySourceSet] for an empty `sources`,
	/// [NavError::UnknownId] if a source is not in the graph and
	/// [NavError::NegativeEffectiveCost] if a step cost is negative or NaN,
	/// which with a [TerrainWeights] table can only come from an infinite
	/// multiplier over a zero cost edge. Disabled sources are skipped.
	pub fn recalculate(
		&self,
		sources: &[NodeId],
		options: &SolveOptions,
	) -> Result<DijkstraMap, NavError> {
		if sources.is_empty() {
			return Err(NavError::EmptySourceSet);
		}
		let reverse = options.is_reverse();
		let max_cost = options.get_max_cost();
		let weights = options.get_terrain_weights();
		debug!(
			"Recalculating field from {} sources over {} nodes, reverse: {}",
			sources.len(),
			self.node_count(),
			reverse
		);
		let mut labels = Labels::new(self.slot_count());
		let mut seeded = Vec::new();
		let mut is_seeded = vec![false; self.slot_count()];
		for id in sources.iter() {
			let slot = self.get_slot(*id).ok_or(NavError::UnknownId(*id))?;
			let Some(node) = self.get_node(slot) else {
				return Err(NavError::UnknownId(*id));
			};
			if !node.is_enabled() {
				debug!("Skipping disabled source {:?}", id);
				continue;
			}
			if max_cost.is_some_and(|max| max < 0.0) {
				continue;
			}
			// duplicates are seeded once
			if is_seeded[slot] {
				continue;
			}
			is_seeded[slot] = true;
			labels.push(slot, 0.0, None);
			seeded.push(*id);
		}

		let mut settled_order: Vec<usize> = Vec::new();
		let mut truncated = false;
		while let Some(current) = labels.frontier.pop() {
			// stale entry superseded by a cheaper push
			if labels.settled[current.slot] || current.cost > labels.tentative[current.slot] {
				continue;
			}
			if options
				.get_max_settled()
				.is_some_and(|limit| settled_order.len() >= limit)
			{
				truncated = true;
				break;
			}
			labels.settled[current.slot] = true;
			settled_order.push(current.slot);

			let Some(node) = self.get_node(current.slot) else {
				continue;
			};
			let edges = if reverse {
				node.get_incoming()
			} else {
				node.get_outgoing()
			};
			for edge_slot in edges.iter() {
				let Some(edge) = self.get_edge(*edge_slot) else {
					continue;
				};
				if !edge.is_enabled() {
					continue;
				}
				let neighbour_slot = if reverse {
					edge.get_from()
				} else {
					edge.get_to()
				};
				let Some(neighbour) = self.get_node(neighbour_slot) else {
					continue;
				};
				if !neighbour.is_enabled() {
					continue;
				}
				let multiplier = weights.multiplier(neighbour.get_terrain());
				let step = edge.get_cost() * multiplier;
				if step.is_nan() || step < 0.0 {
					let (from, to) = self.edge_endpoint_ids(edge.get_from(), edge.get_to());
					error!(
						"Aborting solve, edge {:?} -> {:?} costs {} with multiplier {}",
						from, to, step, multiplier
					);
					return Err(NavError::NegativeEffectiveCost {
						from,
						to,
						terrain: neighbour.get_terrain(),
						multiplier,
						base_cost: edge.get_cost(),
					});
				}
				if labels.settled[neighbour_slot] {
					continue;
				}
				let candidate = current.cost + step;
				if max_cost.is_some_and(|max| candidate > max) {
					continue;
				}
				if candidate < labels.tentative[neighbour_slot] {
					labels.push(neighbour_slot, candidate, Some(current.slot));
				}
			}
		}

		let mut costs = HashMap::with_capacity(settled_order.len());
		let mut directions = HashMap::with_capacity(settled_order.len());
		let mut order = Vec::with_capacity(settled_order.len());
		for slot in settled_order.iter() {
			let Some(node) = self.get_node(*slot) else {
				continue;
			};
			costs.insert(node.get_id(), labels.tentative[*slot]);
			order.push(node.get_id());
			if let Some(hop) = labels.next_hop[*slot].and_then(|s| self.get_node(s)) {
				directions.insert(node.get_id(), hop.get_id());
			}
		}
		debug!(
			"Field reached {} nodes, stopped early: {}",
			order.len(),
			truncated
		);
		Ok(DijkstraMap::new(
			costs,
			directions,
			seeded,
			order,
			reverse,
			truncated,
			self.revision(),
		))
	}
	/// Look up the ids of an edge's endpoint slots for error reporting
	fn edge_endpoint_ids(&self, from: usize, to: usize) -> (NodeId, NodeId) {
		let id = |slot: usize| self.get_node(slot).map(|n| n.get_id()).unwrap_or_default();
		(id(from), id(to))
	}
}

#[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;

	/// Build a graph from `(id, terrain)` nodes and `(from, to, cost)` one-way edges
	fn build(nodes: &[(u32, u16)], edges: &[(u32, u32, f32)]) -> NavGraph {
		let mut graph = NavGraph::new();
		for (id, terrain) in nodes {
			graph.add_node(NodeId::new(*id), TerrainClass::new(*terrain)).unwrap();
		}
		for (from, to, cost) in edges {
			graph.connect(NodeId::new(*from), NodeId::new(*to), *cost, false).unwrap();
		}
		graph
	}
	#[test]
	fn empty_sources_rejected() {
		let graph = build(&[(1, 0)], &[]);
		let result = graph.recalculate(&[], &SolveOptions::default());
		assert!(matches!(result, Err(NavError::EmptySourceSet)));
	}
	#[test]
	fn unknown_source_rejected() {
		let graph = build(&[(1, 0)], &[]);
		let result = graph.recalculate(&[NodeId::new(3)], &SolveOptions::default());
		assert!(matches!(result, Err(NavError::UnknownId(id)) if id == NodeId::new(3)));
	}
	#[test]
	fn forward_follows_edge_direction() {
		// 1 -> 2 -> 3, 3 has no way back
		let graph = build(&[(1, 0), (2, 0), (3, 0)], &[(1, 2, 1.0), (2, 3, 2.0)]);
		let map = graph.recalculate(&[NodeId::new(1)], &SolveOptions::default()).unwrap();
		assert_eq!(Some(3.0), map.cost_at(NodeId::new(3)));
		assert_eq!(Heading::Move(NodeId::new(2)), map.direction_at(NodeId::new(3)));
		let map = graph.recalculate(&[NodeId::new(3)], &SolveOptions::default()).unwrap();
		assert_eq!(1, map.reached_count());
	}
	#[test]
	fn reverse_walks_edges_backwards() {
		let graph = build(&[(1, 0), (2, 0), (3, 0)], &[(1, 2, 1.0), (2, 3, 2.0)]);
		let options = SolveOptions::new().with_reverse(true);
		let map = graph.recalculate(&[NodeId::new(3)], &options).unwrap();
		assert_eq!(Some(3.0), map.cost_at(NodeId::new(1)));
		// next physical hop along the real edge 1 -> 2
		assert_eq!(Heading::Move(NodeId::new(2)), map.direction_at(NodeId::new(1)));
		assert_eq!(Heading::Arrived, map.direction_at(NodeId::new(3)));
		assert!(map.is_reverse());
	}
	#[test]
	fn terrain_charged_on_labelled_endpoint() {
		// terrain 1 on node 2 doubles edges labelling node 2
		let graph = build(&[(1, 0), (2, 1), (3, 0)], &[(1, 2, 1.0), (2, 3, 1.0)]);
		let weights = TerrainWeights::new().with(TerrainClass::new(1), 2.0);
		let forward = SolveOptions::new().with_terrain_weights(weights.clone());
		let map = graph.recalculate(&[NodeId::new(1)], &forward).unwrap();
		assert_eq!(Some(2.0), map.cost_at(NodeId::new(2)));
		assert_eq!(Some(3.0), map.cost_at(NodeId::new(3)));
		let reverse = SolveOptions::new().with_terrain_weights(weights).with_reverse(true);
		let map = graph.recalculate(&[NodeId::new(3)], &reverse).unwrap();
		assert_eq!(Some(2.0), map.cost_at(NodeId::new(2)));
		assert_eq!(Some(3.0), map.cost_at(NodeId::new(1)));
	}
	#[test]
	fn zero_multiplier_is_free() {
		let graph = build(&[(1, 0), (2, 4)], &[(1, 2, 6.0)]);
		let weights = TerrainWeights::new().with(TerrainClass::new(4), -1.0);
		let options = SolveOptions::new().with_terrain_weights(weights);
		let map = graph.recalculate(&[NodeId::new(1)], &options).unwrap();
		assert_eq!(Some(0.0), map.cost_at(NodeId::new(2)));
		assert_eq!(Heading::Move(NodeId::new(1)), map.direction_at(NodeId::new(2)));
	}
	#[test]
	fn undefined_step_aborts_solve() {
		// an infinite multiplier over a free edge has no meaningful cost
		let weights = TerrainWeights::new().with(TerrainClass::new(4), f32::INFINITY);
		let graph = build(&[(1, 0), (2, 4)], &[(1, 2, 0.0)]);
		let options = SolveOptions::new().with_terrain_weights(weights);
		let result = graph.recalculate(&[NodeId::new(1)], &options);
		match result {
			Err(NavError::NegativeEffectiveCost { from, to, terrain, .. }) => {
				assert_eq!(NodeId::new(1), from);
				assert_eq!(NodeId::new(2), to);
				assert_eq!(TerrainClass::new(4), terrain);
			}
			_ => panic!("expected NegativeEffectiveCost"),
		}
	}
	#[test]
	fn multi_source_nearest_wins() {
		// 1 - 2 - 3 - 4 - 5, sources at both ends
		let graph = build(
			&[(1, 0), (2, 0), (3, 0), (4, 0), (5, 0)],
			&[(1, 2, 1.0), (2, 3, 1.0), (3, 4, 1.0), (4, 5, 1.0), (5, 4, 1.0), (4, 3, 1.0), (3, 2, 1.0), (2, 1, 1.0)],
		);
		let map = graph.recalculate(&[NodeId::new(1), NodeId::new(5)], &SolveOptions::default()).unwrap();
		assert_eq!(Some(1.0), map.cost_at(NodeId::new(4)));
		assert_eq!(Heading::Move(NodeId::new(5)), map.direction_at(NodeId::new(4)));
		assert_eq!(Some(2.0), map.cost_at(NodeId::new(3)));
		// both ends are equally close, source 1 was seeded first so it wins
		assert_eq!(Heading::Move(NodeId::new(2)), map.direction_at(NodeId::new(3)));
	}
	#[test]
	fn duplicate_and_disabled_sources() {
		let mut graph = build(&[(1, 0), (2, 0)], &[(1, 2, 1.0)]);
		let map = graph.recalculate(&[NodeId::new(1), NodeId::new(1)], &SolveOptions::default()).unwrap();
		assert_eq!(&[NodeId::new(1)], map.sources());
		graph.disable_node(NodeId::new(1)).unwrap();
		let map = graph.recalculate(&[NodeId::new(1)], &SolveOptions::default()).unwrap();
		assert_eq!(0, map.reached_count());
	}
	#[test]
	fn every_node_as_a_source() {
		let graph = grid_graph(200, 200, Connectivity::Orthogonal, 1.0).unwrap();
		let mut sources: Vec<NodeId> = graph.node_ids().collect();
		// the whole set again in reverse, each id is still seeded once
		sources.extend(graph.node_ids().collect::<Vec<NodeId>>().into_iter().rev());
		let map = graph.recalculate(&sources, &SolveOptions::default()).unwrap();
		assert_eq!(40_000, map.sources().len());
		assert_eq!(40_000, map.reached_count());
		assert_eq!(40_000, map.nodes_with_cost_in(0.0, 0.0).len());
		assert!(map.export_direction_map().is_empty());
		assert_eq!(NodeId::new(1), map.sources()[0]);
	}
	#[test]
	fn disabled_node_and_edge_block_traversal() {
		let mut graph = build(&[(1, 0), (2, 0), (3, 0)], &[(1, 2, 1.0), (2, 3, 1.0), (1, 3, 5.0)]);
		graph.disable_node(NodeId::new(2)).unwrap();
		let map = graph.recalculate(&[NodeId::new(1)], &SolveOptions::default()).unwrap();
		assert_eq!(None, map.cost_at(NodeId::new(2)));
		assert_eq!(Some(5.0), map.cost_at(NodeId::new(3)));
		graph.disable_edge(NodeId::new(1), NodeId::new(3)).unwrap();
		let map = graph.recalculate(&[NodeId::new(1)], &SolveOptions::default()).unwrap();
		assert_eq!(None, map.cost_at(NodeId::new(3)));
		assert_eq!(Heading::Unreached, map.direction_at(NodeId::new(3)));
	}
	#[test]
	fn max_cost_cutoff() {
		let graph = build(&[(1, 0), (2, 0), (3, 0)], &[(1, 2, 1.0), (2, 3, 1.0)]);
		let options = SolveOptions::new().with_max_cost(1.0);
		let map = graph.recalculate(&[NodeId::new(1)], &options).unwrap();
		assert_eq!(Some(1.0), map.cost_at(NodeId::new(2)));
		assert_eq!(None, map.cost_at(NodeId::new(3)));
		assert!(!map.truncated());
	}
	#[test]
	fn max_settled_cutoff() {
		let graph = build(&[(1, 0), (2, 0), (3, 0)], &[(1, 2, 1.0), (2, 3, 1.0)]);
		let options = SolveOptions::new().with_max_settled(2);
		let map = graph.recalculate(&[NodeId::new(1)], &options).unwrap();
		assert_eq!(vec![NodeId::new(1), NodeId::new(2)], map.settled_order().to_vec());
		// 3 was only tentatively labelled so it is discarded
		assert_eq!(None, map.cost_at(NodeId::new(3)));
		assert!(map.truncated());
	}
	#[test]
	fn frontier_pops_cheapest_then_earliest() {
		let mut heap = BinaryHeap::new();
		heap.push(FrontierEntry { cost: 2.0, sequence: 0, slot: 0 });
		heap.push(FrontierEntry { cost: 1.0, sequence: 2, slot: 1 });
		heap.push(FrontierEntry { cost: 1.0, sequence: 1, slot: 2 });
		let order: Vec<usize> = std::iter::from_fn(|| heap.pop().map(|e| e.slot)).collect();
		assert_eq!(vec![2, 1, 0], order);
	}
}
