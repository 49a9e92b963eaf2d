//! Components needed by an entity to own a graph and its Dijkstra maps
//!

use crate::prelude::*;
use bevy::prelude::*;

/// A [NavGraph] plus the named fields calculated over it. Spawn one per
/// independent graph, a second faction can be given a cheap copy via
/// [NavGraph::clone_topology_into]
#[derive(Bundle, Default)]
pub struct DijkstraMapBundle {
	/// The nodes and edges
	graph: NavGraph,
	/// Named maps solved over `graph`
	fields: DijkstraFields,
}

impl DijkstraMapBundle {
	/// Create a new instance of [DijkstraMapBundle] around a graph with no
	/// fields registered
	pub fn new(graph: NavGraph) -> Self {
		DijkstraMapBundle {
			graph,
			fields: DijkstraFields::default(),
		}
	}
	/// Register a named field, it is calculated on the first
	/// [EventRecalculateField] naming it
	pub fn with_field(mut self, label: FieldLabel, options: SolveOptions) -> Self {
		self.fields.insert_field(label, options);
		self
	}
	/// Create a new instance of [DijkstraMapBundle] where the [NavGraph] is
	/// read from a csv file on disk
	#[cfg(feature = "csv")]
	pub fn from_csv(path: &str) -> Result<Self, NavError> {
		Ok(DijkstraMapBundle::new(NavGraph::from_csv(path)?))
	}
	/// Create a new instance of [DijkstraMapBundle] where the [NavGraph] is
	/// read from a `ron` file on disk
	#[cfg(feature = "ron")]
	pub fn from_ron(path: &str) -> Result<Self, NavError> {
		Ok(DijkstraMapBundle::new(NavGraph::from_ron(path)?))
	}
	/// Get the [NavGraph]
	pub fn get_graph(&self) -> &NavGraph {
		&self.graph
	}
	/// Get the [DijkstraFields]
	pub fn get_fields(&self) -> &DijkstraFields {
		&self.fields
	}
}
