//! Dijkstra maps are a means of handling pathfinding for a crowd of actors
//! over an arbitrary weighted graph.
//!
//! [The Incredible Power of Dijkstra Maps](http://www.roguebasin.com/index.php/The_Incredible_Power_of_Dijkstra_Maps)
//!
//! [Dijkstra Maps Visualized](http://www.roguebasin.com/index.php/Dijkstra_Maps_Visualized)
//!
//! Rather than answering "what is the path from A to B" for every actor, a
//! single solve answers "from every reachable node, what is the cost to (or
//! from) a chosen set of nodes and which neighbour should I step to next".
//! Any number of actors then read the result without searching.
//!
//! Definitions:
//!
//! * Node - an opaque location identified by a caller assigned [NodeId] and
//!   tagged with a [TerrainClass]. A node can be disabled to exclude it from
//!   solves without forgetting it
//! * Edge - a directed, weighted link between two nodes. A two-way link is
//!   two edges
//! * Terrain weights - a table of multipliers looked up by [TerrainClass]
//!   when an edge is relaxed, absent classes use `1.0`
//! * Cost field - the minimal cumulative cost of every reached node to (or
//!   from) the nearest source
//! * Direction field - for every reached node the neighbour an actor standing
//!   there should step to in order to make progress towards the nearest
//!   source
//!
//! A 3x3 grid with the source in the centre produces this cost field:
//!
//! ```text
//!  _________________
//! |     |     |     |
//! |  2  |  1  |  2  |
//! |_____|_____|_____|
//! |     |     |     |
//! |  1  |  0  |  1  |
//! |_____|_____|_____|
//! |     |     |     |
//! |  2  |  1  |  2  |
//! |_____|_____|_____|
//! ```
//!
//! and the corner nodes point along an orthogonal neighbour towards the
//! centre.
//!
//! Solving in "reverse" treats the sources as destinations: the edges are
//! walked backwards so the cost field holds the cost of travelling *to* the
//! sources and the direction field still points along real edge direction.
//!

pub mod graph;
pub mod map;
pub mod options;
pub mod solver;
pub mod utilities;

use bevy::prelude::*;

/// Caller assigned identifier of a node. Ids carry no ordering meaning for
/// the solver, the `Ord` derive only keeps query output deterministic
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash, Reflect)]
pub struct NodeId(u32);

impl NodeId {
	/// Create a new instance of [NodeId]
	pub const fn new(id: u32) -> Self {
		NodeId(id)
	}
	/// Get the raw id
	pub fn get(&self) -> u32 {
		self.0
	}
}

impl From<u32> for NodeId {
	fn from(id: u32) -> Self {
		NodeId(id)
	}
}

/// Tag of a node used only to select a multiplier from
/// [crate::prelude::TerrainWeights]. The engine attaches no other meaning to it
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash, Reflect)]
pub struct TerrainClass(u16);

impl TerrainClass {
	/// Create a new instance of [TerrainClass]
	pub const fn new(class: u16) -> Self {
		TerrainClass(class)
	}
	/// Get the raw tag
	pub fn get(&self) -> u16 {
		self.0
	}
}

impl From<u16> for TerrainClass {
	fn from(class: u16) -> Self {
		TerrainClass(class)
	}
}
