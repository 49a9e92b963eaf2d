//! A [DijkstraMap] is the immutable result of one recalculation: a cost
//! field and a direction field over every reached node.
//!
//! It is replaced wholesale by the next recalculation, there is no merging
//! between solves. Readers holding a map (for instance behind an `Arc`) keep a
//! stable snapshot while a new one is built.
//!
//! A map stays meaningful until the [NavGraph] it was built from is mutated,
//! [DijkstraMap::is_stale] reports when that has happened.
//!

use std::collections::{BTreeSet, HashMap};

use crate::prelude::*;
use bevy::prelude::*;

/// What an actor standing on a node should do according to a [DijkstraMap]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Reflect)]
pub enum Heading {
	/// Step to this neighbour to make progress towards the nearest source
	Move(NodeId),
	/// The node is a source, no movement needed
	Arrived,
	/// The node was not reached by the solve, no movement possible
	Unreached,
}

/// Cost and direction fields produced by [NavGraph::recalculate]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug, Default)]
pub struct DijkstraMap {
	/// Minimal cumulative cost of every reached node
	costs: HashMap<NodeId, f32>,
	/// Next physical hop of every reached node that is not a source
	directions: HashMap<NodeId, NodeId>,
	/// Sources that were seeded, in the order given
	sources: Vec<NodeId>,
	/// Reached nodes in the order they were finalised
	settled_order: Vec<NodeId>,
	/// Whether the sources were treated as destinations
	reverse: bool,
	/// Whether `max_settled` stopped the solve early
	truncated: bool,
	/// [NavGraph::revision] the map was built against
	revision: u64,
}

impl DijkstraMap {
	/// Assemble a [DijkstraMap] from the output of a solve
	pub(crate) fn new(
		costs: HashMap<NodeId, f32>,
		directions: HashMap<NodeId, NodeId>,
		sources: Vec<NodeId>,
		settled_order: Vec<NodeId>,
		reverse: bool,
		truncated: bool,
		revision: u64,
	) -> Self {
		DijkstraMap {
			costs,
			directions,
			sources,
			settled_order,
			reverse,
			truncated,
			revision,
		}
	}
	/// Cost of a node to/from the nearest source, `None` if unreached
	pub fn cost_at(&self, id: NodeId) -> Option<f32> {
		self.costs.get(&id).copied()
	}
	/// The neighbour an actor standing on `id` should step to
	pub fn direction_at(&self, id: NodeId) -> Heading {
		match self.directions.get(&id) {
			Some(next) => Heading::Move(*next),
			None if self.costs.contains_key(&id) => Heading::Arrived,
			None => Heading::Unreached,
		}
	}
	/// Every node whose cost `c` satisfies `min <= c <= max`. Empty when
	/// `min > max` or nothing falls inside the band
	pub fn nodes_with_cost_in(&self, min: f32, max: f32) -> BTreeSet<NodeId> {
		if min.is_nan() || max.is_nan() || min > max {
			return BTreeSet::new();
		}
		self.costs
			.iter()
			.filter(|(_, cost)| min <= **cost && **cost <= max)
			.map(|(id, _)| *id)
			.collect()
	}
	/// Independent copy of the cost field
	pub fn export_cost_map(&self) -> HashMap<NodeId, f32> {
		self.costs.clone()
	}
	/// Independent copy of the direction field, sources and unreached nodes
	/// have no entry
	pub fn export_direction_map(&self) -> HashMap<NodeId, NodeId> {
		self.directions.clone()
	}
	/// Follow the direction field from `id` to the source it leads to. The
	/// path includes both ends, `None` if `id` was not reached
	pub fn path_from(&self, id: NodeId) -> Option<Vec<NodeId>> {
		if !self.costs.contains_key(&id) {
			return None;
		}
		let mut path = vec![id];
		let mut current = id;
		// every hop points at a node settled earlier so this terminates
		while let Some(next) = self.directions.get(&current) {
			path.push(*next);
			current = *next;
		}
		Some(path)
	}
	/// Whether `id` was seeded as a source
	pub fn is_source(&self, id: NodeId) -> bool {
		self.costs.contains_key(&id) && !self.directions.contains_key(&id)
	}
	/// Whether `id` has a cost
	pub fn is_reached(&self, id: NodeId) -> bool {
		self.costs.contains_key(&id)
	}
	/// Number of nodes with a cost
	pub fn reached_count(&self) -> usize {
		self.costs.len()
	}
	/// Sources that were seeded (disabled and duplicate ones are absent)
	pub fn sources(&self) -> &[NodeId] {
		&self.sources
	}
	/// Reached nodes in the order they were finalised, costs never decrease
	/// along it
	pub fn settled_order(&self) -> &[NodeId] {
		&self.settled_order
	}
	/// Whether the sources were treated as destinations
	pub fn is_reverse(&self) -> bool {
		self.reverse
	}
	/// Whether the settled node cap stopped the solve before the frontier
	/// emptied
	pub fn truncated(&self) -> bool {
		self.truncated
	}
	/// Revision of the [NavGraph] the map was built against
	pub fn revision(&self) -> u64 {
		self.revision
	}
	/// Whether `graph` has been mutated since this map was built from it.
	///
	/// Only revision counters are compared, so the answer is only meaningful
	/// for the graph the map was built from. A copy made with
	/// [NavGraph::clone_topology_into] always reports stale, while an
	/// unrelated graph (or a `clone()` of the source) that happens to sit at
	/// the same revision reports current even though its nodes may differ
	pub fn is_stale(&self, graph: &NavGraph) -> bool {
		graph.revision() != self.revision
	}
}
