//! Errors returned by graph mutation, recalculation and the optional file
//! loaders.
//!
//! Every variant is a local, recoverable condition. An unreached node is not
//! an error, queries against a [crate::prelude::DijkstraMap] simply find no
//! entry for it.
//!

use crate::prelude::*;

/// Failure of an operation on a [NavGraph] or of a single recalculation
#[derive(Debug, thiserror::Error)]
pub enum NavError {
	/// The operation referenced a node that is not in the graph
	#[error("unknown node id {0:?}")]
	UnknownId(NodeId),
	/// The operation referenced an edge that is not in the graph
	#[error("no edge from {from:?} to {to:?}")]
	UnknownEdge {
		/// Origin of the missing edge
		from: NodeId,
		/// Target of the missing edge
		to: NodeId,
	},
	/// A node with this id already exists
	#[error("node id {0:?} is already present")]
	DuplicateId(NodeId),
	/// A base edge cost was negative or not a number
	#[error("invalid cost {cost} for edge {from:?} -> {to:?}, costs must be finite and non-negative")]
	InvalidCost {
		/// Origin of the edge
		from: NodeId,
		/// Target of the edge
		to: NodeId,
		/// The rejected cost
		cost: f32,
	},
	/// A terrain multiplier combined with a base cost produced a negative (or
	/// NaN) traversal cost during a solve. Multipliers are never stored below
	/// `0.0` so in practice this is an infinite multiplier over a zero cost
	/// edge. Only that solve is aborted
	#[error("edge {from:?} -> {to:?} has negative effective cost: base {base_cost} x multiplier {multiplier} of terrain {terrain:?}")]
	NegativeEffectiveCost {
		/// Origin of the edge
		from: NodeId,
		/// Target of the edge
		to: NodeId,
		/// Terrain class the multiplier was resolved from
		terrain: TerrainClass,
		/// The offending multiplier
		multiplier: f32,
		/// The stored base cost of the edge
		base_cost: f32,
	},
	/// A recalculation was requested without any source nodes
	#[error("cannot recalculate a field from an empty source set")]
	EmptySourceSet,
	/// Reading a graph or options file failed
	#[cfg(any(feature = "ron", feature = "csv"))]
	#[error("failed reading file: {0}")]
	Io(#[from] std::io::Error),
	/// A `ron` document could not be deserialised
	#[cfg(feature = "ron")]
	#[error("failed deserializing ron: {0}")]
	Ron(#[from] ron::error::SpannedError),
	/// A csv document could not be parsed
	#[cfg(feature = "csv")]
	#[error("failed parsing csv: {0}")]
	Csv(#[from] csv::Error),
	/// A file was syntactically valid but a record made no sense
	#[cfg(feature = "csv")]
	#[error("malformed record: {0}")]
	Format(String),
}
