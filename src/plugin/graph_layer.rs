//! Logic for handling changes to a [NavGraph] and flagging any field which
//! may have been made stale by the change
//!

use crate::prelude::*;
use bevy::prelude::*;

/// A change to apply to a single node
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NodeUpdate {
	/// Let the node take part in solves again
	Enable,
	/// Exclude the node from solves
	Disable,
	/// Retag the node
	SetTerrain(TerrainClass),
}

/// Used to update a node of every [NavGraph]
#[derive(Event, Debug, Clone)]
pub struct EventUpdateNode {
	/// Node to update
	node: NodeId,
	/// What to change
	update: NodeUpdate,
}

impl EventUpdateNode {
	/// Create a new instance of [EventUpdateNode]
	pub fn new(node: NodeId, update: NodeUpdate) -> Self {
		EventUpdateNode { node, update }
	}
	/// Get the node being updated
	pub fn get_node(&self) -> NodeId {
		self.node
	}
	/// Get the change
	pub fn get_update(&self) -> NodeUpdate {
		self.update
	}
}

/// A change to apply to an edge
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EdgeUpdate {
	/// Create the edge or replace its cost
	Connect {
		/// Base cost of traversal
		cost: f32,
		/// Also create or update the reverse edge
		bidirectional: bool,
	},
	/// Delete the edge
	Disconnect {
		/// Also delete the reverse edge
		bidirectional: bool,
	},
	/// Let the edge take part in solves again
	Enable,
	/// Exclude the edge from solves
	Disable,
}

/// Used to update an edge of every [NavGraph]
#[derive(Event, Debug, Clone)]
pub struct EventUpdateEdge {
	/// Origin of the edge
	from: NodeId,
	/// Target of the edge
	to: NodeId,
	/// What to change
	update: EdgeUpdate,
}

impl EventUpdateEdge {
	/// Create a new instance of [EventUpdateEdge]
	pub fn new(from: NodeId, to: NodeId, update: EdgeUpdate) -> Self {
		EventUpdateEdge { from, to, update }
	}
	/// Get the origin of the edge
	pub fn get_from(&self) -> NodeId {
		self.from
	}
	/// Get the target of the edge
	pub fn get_to(&self) -> NodeId {
		self.to
	}
	/// Get the change
	pub fn get_update(&self) -> EdgeUpdate {
		self.update
	}
}

/// Apply a [NodeUpdate] to a graph
pub fn apply_node_update(graph: &mut NavGraph, event: &EventUpdateNode) -> Result<(), NavError> {
	match event.get_update() {
		NodeUpdate::Enable => graph.enable_node(event.get_node()),
		NodeUpdate::Disable => graph.disable_node(event.get_node()),
		NodeUpdate::SetTerrain(terrain) => graph.set_terrain(event.get_node(), terrain),
	}
}

/// Apply an [EdgeUpdate] to a graph
pub fn apply_edge_update(graph: &mut NavGraph, event: &EventUpdateEdge) -> Result<(), NavError> {
	let (from, to) = (event.get_from(), event.get_to());
	match event.get_update() {
		EdgeUpdate::Connect {
			cost,
			bidirectional,
		} => graph.connect(from, to, cost, bidirectional),
		EdgeUpdate::Disconnect { bidirectional } => graph.disconnect(from, to, bidirectional),
		EdgeUpdate::Enable => graph.enable_edge(from, to),
		EdgeUpdate::Disable => graph.disable_edge(from, to),
	}
}

/// Read [EventUpdateNode] and apply them to every [NavGraph]
#[cfg(not(tarpaulin_include))]
pub fn process_node_updates(
	mut events: EventReader<EventUpdateNode>,
	mut query: Query<&mut NavGraph>,
) {
	for event in events.read() {
		for mut graph in query.iter_mut() {
			if let Err(e) = apply_node_update(&mut graph, event) {
				warn!("Ignoring {:?}: {}", event, e);
			}
		}
	}
}

/// Read [EventUpdateEdge] and apply them to every [NavGraph]
#[cfg(not(tarpaulin_include))]
pub fn process_edge_updates(
	mut events: EventReader<EventUpdateEdge>,
	mut query: Query<&mut NavGraph>,
) {
	for event in events.read() {
		for mut graph in query.iter_mut() {
			if let Err(e) = apply_edge_update(&mut graph, event) {
				warn!("Ignoring {:?}: {}", event, e);
			}
		}
	}
}

/// Any field built against an older revision of its [NavGraph] is flagged
/// stale. Nothing is recalculated, that is left to the caller
#[cfg(not(tarpaulin_include))]
pub fn flag_stale_fields(mut query: Query<(&NavGraph, &mut DijkstraFields), Changed<NavGraph>>) {
	for (graph, mut fields) in query.iter_mut() {
		for label in fields.mark_stale(graph) {
			debug!("Field {:?} is stale after a graph change", label);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn node_updates() {
		let mut graph = grid_graph(2, 2, Connectivity::Orthogonal, 1.0).unwrap();
		let event = EventUpdateNode::new(NodeId::new(4), NodeUpdate::Disable);
		apply_node_update(&mut graph, &event).unwrap();
		assert!(!graph.is_node_enabled(NodeId::new(4)).unwrap());
		let event = EventUpdateNode::new(NodeId::new(4), NodeUpdate::SetTerrain(TerrainClass::new(2)));
		apply_node_update(&mut graph, &event).unwrap();
		assert_eq!(TerrainClass::new(2), graph.terrain_of(NodeId::new(4)).unwrap());
		let event = EventUpdateNode::new(NodeId::new(40), NodeUpdate::Enable);
		assert!(apply_node_update(&mut graph, &event).is_err());
	}
	#[test]
	fn edge_updates() {
		let mut graph = grid_graph(2, 2, Connectivity::Orthogonal, 1.0).unwrap();
		let event = EventUpdateEdge::new(
			NodeId::new(1),
			NodeId::new(4),
			EdgeUpdate::Connect {
				cost: 1.5,
				bidirectional: true,
			},
		);
		apply_edge_update(&mut graph, &event).unwrap();
		assert_eq!(1.5, graph.edge_cost(NodeId::new(4), NodeId::new(1)).unwrap());
		let event = EventUpdateEdge::new(NodeId::new(1), NodeId::new(2), EdgeUpdate::Disable);
		apply_edge_update(&mut graph, &event).unwrap();
		assert!(!graph.is_edge_enabled(NodeId::new(1), NodeId::new(2)).unwrap());
		let event = EventUpdateEdge::new(
			NodeId::new(1),
			NodeId::new(4),
			EdgeUpdate::Disconnect { bidirectional: true },
		);
		apply_edge_update(&mut graph, &event).unwrap();
		assert_eq!(8, graph.edge_count());
	}
}
