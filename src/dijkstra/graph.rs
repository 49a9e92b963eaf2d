//! The [NavGraph] owns the nodes and directed weighted edges that a
//! Dijkstra map is solved over.
//!
//! Nodes and edges live in contiguous arenas addressed by slot index with a
//! lookup from [NodeId] to slot. Every node keeps a list of its outgoing and
//! incoming edge slots so that a solve can walk the graph forwards or
//! backwards in `O(degree)` per node without building a transpose.
//!
//! ```text
//!  index: NodeId -> node slot
//!  nodes: [ Some(n0) | Some(n1) | None | Some(n3) ]   (None = free slot)
//!  edges: [ Some(e0) | None | Some(e2) ]               (None = free slot)
//!  edge_index: (from slot, to slot) -> edge slot
//! ```
//!
//! Cloning a [NavGraph] is a bulk copy of these arrays which makes duplicating
//! a graph for a second faction cheap.
//!
//! # Mutations do not recalculate anything!
//!
//! Every mutating call bumps the graph [NavGraph::revision] but previously
//! produced [crate::prelude::DijkstraMap]s are left as they are. Use
//! [crate::prelude::DijkstraMap::is_stale] to detect a result that no longer
//! reflects the graph and recalculate when it suits you.
//!

use std::collections::HashMap;

use crate::prelude::*;
use bevy::prelude::*;

/// A node stored in the arena
#[derive(Clone, Debug)]
pub(crate) struct GraphNode {
	/// Caller facing id
	id: NodeId,
	/// Tag used to look up a terrain multiplier
	terrain: TerrainClass,
	/// Excluded from traversal when true
	disabled: bool,
	/// Slots of edges leaving this node, in insertion order
	outgoing: Vec<usize>,
	/// Slots of edges arriving at this node, in insertion order
	incoming: Vec<usize>,
}

impl GraphNode {
	/// Create a new enabled [GraphNode] without edges
	fn new(id: NodeId, terrain: TerrainClass) -> Self {
		GraphNode {
			id,
			terrain,
			disabled: false,
			outgoing: Vec::new(),
			incoming: Vec::new(),
		}
	}
	/// Get the [NodeId]
	pub(crate) fn get_id(&self) -> NodeId {
		self.id
	}
	/// Get the [TerrainClass]
	pub(crate) fn get_terrain(&self) -> TerrainClass {
		self.terrain
	}
	/// Whether the node takes part in solves
	pub(crate) fn is_enabled(&self) -> bool {
		!self.disabled
	}
	/// Edge slots leaving the node
	pub(crate) fn get_outgoing(&self) -> &[usize] {
		&self.outgoing
	}
	/// Edge slots arriving at the node
	pub(crate) fn get_incoming(&self) -> &[usize] {
		&self.incoming
	}
}

/// A directed edge stored in the arena, endpoints are node slots
#[derive(Clone, Debug)]
pub(crate) struct GraphEdge {
	/// Slot of the origin node
	from: usize,
	/// Slot of the target node
	to: usize,
	/// Non-negative base cost of traversal
	cost: f32,
	/// Excluded from traversal when true
	disabled: bool,
}

impl GraphEdge {
	/// Slot of the origin node
	pub(crate) fn get_from(&self) -> usize {
		self.from
	}
	/// Slot of the target node
	pub(crate) fn get_to(&self) -> usize {
		self.to
	}
	/// The base cost
	pub(crate) fn get_cost(&self) -> f32 {
		self.cost
	}
	/// Whether the edge takes part in solves
	pub(crate) fn is_enabled(&self) -> bool {
		!self.disabled
	}
}

/// Graph of nodes and directed weighted edges that Dijkstra maps are
/// calculated over.
///
/// With the `serde` feature a graph is written as plain node and edge records
/// rather than its arena, and reading one back replays those records through
/// [NavGraph::add_node] and [NavGraph::connect] so a malformed document is
/// rejected with the same [NavError] a caller would get:
///
/// ```text
/// (
/// 	nodes: [
/// 		(id: 1, terrain: 0),
/// 		(id: 2, terrain: 3, disabled: true),
/// 	],
/// 	edges: [
/// 		(from: 1, to: 2, cost: 1.5),
/// 		(from: 2, to: 1, cost: 1.5, disabled: true),
/// 	],
/// )
/// ```
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(
	feature = "serde",
	serde(try_from = "GraphRecord", into = "GraphRecord")
)]
#[derive(Component, Default, Clone, Debug)]
pub struct NavGraph {
	/// Lookup of a [NodeId] to its slot in `nodes`
	index: HashMap<NodeId, usize>,
	/// Node arena
	nodes: Vec<Option<GraphNode>>,
	/// Vacated node slots available for reuse
	free_nodes: Vec<usize>,
	/// Edge arena
	edges: Vec<Option<GraphEdge>>,
	/// Vacated edge slots available for reuse
	free_edges: Vec<usize>,
	/// Lookup of an ordered `(from, to)` node slot pair to its edge slot
	edge_index: HashMap<(usize, usize), usize>,
	/// Bumped by every mutation
	revision: u64,
}

impl NavGraph {
	/// Create an empty [NavGraph]
	pub fn new() -> Self {
		NavGraph::default()
	}
	/// Insert a node, fails if the id is already taken
	pub fn add_node(&mut self, id: NodeId, terrain: TerrainClass) -> Result<(), NavError> {
		if self.index.contains_key(&id) {
			return Err(NavError::DuplicateId(id));
		}
		let node = GraphNode::new(id, terrain);
		let slot = match self.free_nodes.pop() {
			Some(slot) => {
				self.nodes[slot] = Some(node);
				slot
			}
			None => {
				self.nodes.push(Some(node));
				self.nodes.len() - 1
			}
		};
		self.index.insert(id, slot);
		self.bump();
		Ok(())
	}
	/// Remove a node along with every edge leaving or arriving at it
	pub fn remove_node(&mut self, id: NodeId) -> Result<(), NavError> {
		let slot = self.slot_or_err(id)?;
		let incident: Vec<usize> = match &self.nodes[slot] {
			Some(node) => node.outgoing.iter().chain(node.incoming.iter()).copied().collect(),
			None => Vec::new(),
		};
		for edge in incident {
			self.remove_edge_slot(edge);
		}
		self.nodes[slot] = None;
		self.free_nodes.push(slot);
		self.index.remove(&id);
		self.bump();
		Ok(())
	}
	/// Create an edge from `from` to `to` with a base `cost`. If the edge
	/// already exists its cost is replaced (the enabled state is kept). When
	/// `bidirectional` the reverse edge is inserted or updated with the same
	/// cost
	pub fn connect(
		&mut self,
		from: NodeId,
		to: NodeId,
		cost: f32,
		bidirectional: bool,
	) -> Result<(), NavError> {
		let from_slot = self.slot_or_err(from)?;
		let to_slot = self.slot_or_err(to)?;
		if !cost.is_finite() || cost < 0.0 {
			return Err(NavError::InvalidCost { from, to, cost });
		}
		self.upsert_edge(from_slot, to_slot, cost);
		if bidirectional {
			self.upsert_edge(to_slot, from_slot, cost);
		}
		self.bump();
		Ok(())
	}
	/// Delete the edge from `from` to `to`, and the reverse edge too when
	/// `bidirectional`. Nothing is removed unless every requested edge exists
	pub fn disconnect(&mut self, from: NodeId, to: NodeId, bidirectional: bool) -> Result<(), NavError> {
		let forward = self.edge_slot_or_err(from, to)?;
		let reverse = if bidirectional {
			Some(self.edge_slot_or_err(to, from)?)
		} else {
			None
		};
		self.remove_edge_slot(forward);
		if let Some(reverse) = reverse {
			// a self loop is its own reverse
			if reverse != forward {
				self.remove_edge_slot(reverse);
			}
		}
		self.bump();
		Ok(())
	}
	/// Exclude a node from future solves, its edges are kept
	pub fn disable_node(&mut self, id: NodeId) -> Result<(), NavError> {
		self.set_node_disabled(id, true)
	}
	/// Allow a previously disabled node to take part in solves again
	pub fn enable_node(&mut self, id: NodeId) -> Result<(), NavError> {
		self.set_node_disabled(id, false)
	}
	/// Exclude the edge from `from` to `to` from future solves
	pub fn disable_edge(&mut self, from: NodeId, to: NodeId) -> Result<(), NavError> {
		self.set_edge_disabled(from, to, true)
	}
	/// Allow a previously disabled edge to take part in solves again
	pub fn enable_edge(&mut self, from: NodeId, to: NodeId) -> Result<(), NavError> {
		self.set_edge_disabled(from, to, false)
	}
	/// Change the [TerrainClass] of a node
	pub fn set_terrain(&mut self, id: NodeId, terrain: TerrainClass) -> Result<(), NavError> {
		let slot = self.slot_or_err(id)?;
		if let Some(node) = self.nodes[slot].as_mut() {
			node.terrain = terrain;
		}
		self.bump();
		Ok(())
	}
	/// Deep copy the nodes, terrain tags, edges and disabled flags of this
	/// graph into `target`, replacing whatever `target` held. The two graphs
	/// share nothing afterwards
	pub fn clone_topology_into(&self, target: &mut NavGraph) {
		let revision = target.revision.max(self.revision).wrapping_add(1);
		target.clone_from(self);
		target.revision = revision;
	}
}

impl NavGraph {
	/// Whether a node with this id exists
	pub fn contains(&self, id: NodeId) -> bool {
		self.index.contains_key(&id)
	}
	/// Number of nodes, disabled ones included
	pub fn node_count(&self) -> usize {
		self.index.len()
	}
	/// Number of directed edges, disabled ones included
	pub fn edge_count(&self) -> usize {
		self.edge_index.len()
	}
	/// Counter bumped by every mutation of the graph
	pub fn revision(&self) -> u64 {
		self.revision
	}
	/// Iterate over the ids of every node in arena order
	pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
		self.nodes.iter().flatten().map(|node| node.id)
	}
	/// Get the [TerrainClass] of a node
	pub fn terrain_of(&self, id: NodeId) -> Result<TerrainClass, NavError> {
		Ok(self.node_or_err(id)?.terrain)
	}
	/// Whether a node takes part in solves
	pub fn is_node_enabled(&self, id: NodeId) -> Result<bool, NavError> {
		Ok(self.node_or_err(id)?.is_enabled())
	}
	/// Base cost of the edge from `from` to `to`
	pub fn edge_cost(&self, from: NodeId, to: NodeId) -> Result<f32, NavError> {
		let slot = self.edge_slot_or_err(from, to)?;
		self.edges[slot]
			.as_ref()
			.map(|edge| edge.cost)
			.ok_or(NavError::UnknownEdge { from, to })
	}
	/// Whether the edge from `from` to `to` takes part in solves
	pub fn is_edge_enabled(&self, from: NodeId, to: NodeId) -> Result<bool, NavError> {
		let slot = self.edge_slot_or_err(from, to)?;
		self.edges[slot]
			.as_ref()
			.map(|edge| edge.is_enabled())
			.ok_or(NavError::UnknownEdge { from, to })
	}
	/// Targets and base costs of the edges leaving `id` in insertion order,
	/// disabled edges included
	pub fn successors(&self, id: NodeId) -> Result<Vec<(NodeId, f32)>, NavError> {
		let node = self.node_or_err(id)?;
		Ok(node
			.outgoing
			.iter()
			.filter_map(|slot| self.get_edge(*slot))
			.filter_map(|edge| self.get_node(edge.to).map(|n| (n.id, edge.cost)))
			.collect())
	}
	/// Origins and base costs of the edges arriving at `id` in insertion
	/// order, disabled edges included
	pub fn predecessors(&self, id: NodeId) -> Result<Vec<(NodeId, f32)>, NavError> {
		let node = self.node_or_err(id)?;
		Ok(node
			.incoming
			.iter()
			.filter_map(|slot| self.get_edge(*slot))
			.filter_map(|edge| self.get_node(edge.from).map(|n| (n.id, edge.cost)))
			.collect())
	}
}

impl NavGraph {
	/// Number of node slots, used to size per-solve scratch arrays
	pub(crate) fn slot_count(&self) -> usize {
		self.nodes.len()
	}
	/// Slot of a node
	pub(crate) fn get_slot(&self, id: NodeId) -> Option<usize> {
		self.index.get(&id).copied()
	}
	/// Node stored in a slot
	pub(crate) fn get_node(&self, slot: usize) -> Option<&GraphNode> {
		self.nodes.get(slot).and_then(|n| n.as_ref())
	}
	/// Edge stored in a slot
	pub(crate) fn get_edge(&self, slot: usize) -> Option<&GraphEdge> {
		self.edges.get(slot).and_then(|e| e.as_ref())
	}
	/// Record a mutation
	fn bump(&mut self) {
		self.revision = self.revision.wrapping_add(1);
	}
	/// Slot of a node or [NavError::UnknownId]
	fn slot_or_err(&self, id: NodeId) -> Result<usize, NavError> {
		self.get_slot(id).ok_or(NavError::UnknownId(id))
	}
	/// Node of an id or [NavError::UnknownId]
	fn node_or_err(&self, id: NodeId) -> Result<&GraphNode, NavError> {
		let slot = self.slot_or_err(id)?;
		self.get_node(slot).ok_or(NavError::UnknownId(id))
	}
	/// Slot of the edge between two nodes, an unknown node takes precedence
	/// over an unknown edge
	fn edge_slot_or_err(&self, from: NodeId, to: NodeId) -> Result<usize, NavError> {
		let from_slot = self.slot_or_err(from)?;
		let to_slot = self.slot_or_err(to)?;
		self.edge_index
			.get(&(from_slot, to_slot))
			.copied()
			.ok_or(NavError::UnknownEdge { from, to })
	}
	/// Insert a new edge between two node slots or overwrite the cost of the
	/// existing one
	fn upsert_edge(&mut self, from: usize, to: usize, cost: f32) {
		if let Some(slot) = self.edge_index.get(&(from, to)) {
			if let Some(edge) = self.edges[*slot].as_mut() {
				edge.cost = cost;
			}
			return;
		}
		let edge = GraphEdge {
			from,
			to,
			cost,
			disabled: false,
		};
		let slot = match self.free_edges.pop() {
			Some(slot) => {
				self.edges[slot] = Some(edge);
				slot
			}
			None => {
				self.edges.push(Some(edge));
				self.edges.len() - 1
			}
		};
		self.edge_index.insert((from, to), slot);
		if let Some(node) = self.nodes[from].as_mut() {
			node.outgoing.push(slot);
		}
		if let Some(node) = self.nodes[to].as_mut() {
			node.incoming.push(slot);
		}
	}
	/// Delete an edge and unhook it from both endpoints
	fn remove_edge_slot(&mut self, slot: usize) {
		if let Some(edge) = self.edges[slot].take() {
			self.edge_index.remove(&(edge.from, edge.to));
			if let Some(node) = self.nodes[edge.from].as_mut() {
				node.outgoing.retain(|e| *e != slot);
			}
			if let Some(node) = self.nodes[edge.to].as_mut() {
				node.incoming.retain(|e| *e != slot);
			}
			self.free_edges.push(slot);
		}
	}
	/// Toggle the disabled flag of a node
	fn set_node_disabled(&mut self, id: NodeId, disabled: bool) -> Result<(), NavError> {
		let slot = self.slot_or_err(id)?;
		if let Some(node) = self.nodes[slot].as_mut() {
			node.disabled = disabled;
		}
		self.bump();
		Ok(())
	}
	/// Toggle the disabled flag of an edge
	fn set_edge_disabled(&mut self, from: NodeId, to: NodeId, disabled: bool) -> Result<(), NavError> {
		let slot = self.edge_slot_or_err(from, to)?;
		if let Some(edge) = self.edges[slot].as_mut() {
			edge.disabled = disabled;
		}
		self.bump();
		Ok(())
	}
}

/// Serialised form of a node
#[cfg(feature = "serde")]
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(deny_unknown_fields)]
struct NodeRecord {
	/// Caller facing id
	id: NodeId,
	/// Terrain tag
	#[serde(default)]
	terrain: TerrainClass,
	/// Excluded from traversal when true
	#[serde(default)]
	disabled: bool,
}

/// Serialised form of an edge
#[cfg(feature = "serde")]
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(deny_unknown_fields)]
struct EdgeRecord {
	/// Origin node
	from: NodeId,
	/// Target node
	to: NodeId,
	/// Base cost of traversal
	cost: f32,
	/// Excluded from traversal when true
	#[serde(default)]
	disabled: bool,
}

/// Serialised form of a [NavGraph], nodes first so every edge can be checked
/// against them
#[cfg(feature = "serde")]
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(deny_unknown_fields)]
struct GraphRecord {
	/// Every node in arena order
	nodes: Vec<NodeRecord>,
	/// Every edge in arena order
	#[serde(default)]
	edges: Vec<EdgeRecord>,
}

#[cfg(feature = "serde")]
impl TryFrom<GraphRecord> for NavGraph {
	type Error = NavError;
	fn try_from(record: GraphRecord) -> Result<Self, Self::Error> {
		let mut graph = NavGraph::new();
		for node in record.nodes.iter() {
			graph.add_node(node.id, node.terrain)?;
			if node.disabled {
				graph.disable_node(node.id)?;
			}
		}
		for edge in record.edges.iter() {
			graph.connect(edge.from, edge.to, edge.cost, false)?;
			if edge.disabled {
				graph.disable_edge(edge.from, edge.to)?;
			}
		}
		Ok(graph)
	}
}

#[cfg(feature = "serde")]
impl From<NavGraph> for GraphRecord {
	fn from(graph: NavGraph) -> Self {
		let nodes = graph
			.nodes
			.iter()
			.flatten()
			.map(|node| NodeRecord {
				id: node.id,
				terrain: node.terrain,
				disabled: node.disabled,
			})
			.collect();
		let edges = graph
			.edges
			.iter()
			.flatten()
			.filter_map(|edge| {
				let (from, to) = (graph.get_node(edge.from)?, graph.get_node(edge.to)?);
				Some(EdgeRecord {
					from: from.id,
					to: to.id,
					cost: edge.cost,
					disabled: edge.disabled,
				})
			})
			.collect();
		GraphRecord { nodes, edges }
	}
}

impl NavGraph {
	/// From a `ron` file generate the [NavGraph], see [NavGraph] for the
	/// expected records
	#[cfg(feature = "ron")]
	pub fn from_ron(path: &str) -> Result<Self, NavError> {
		let file = std::fs::File::open(path)?;
		let graph: NavGraph = ron::de::from_reader(file)?;
		Ok(graph)
	}
	/// From a csv file generate the [NavGraph], see [NavGraph::from_csv_reader]
	/// for the expected records
	#[cfg(feature = "csv")]
	pub fn from_csv(path: &str) -> Result<Self, NavError> {
		let file = std::fs::File::open(path)?;
		NavGraph::from_csv_reader(file)
	}
	/// Build a [NavGraph] from csv records of the form
	///
	/// ```text
	/// node,<id>,<terrain>
	/// edge,<from>,<to>,<cost>[,<bidirectional>]
	/// ```
	///
	/// Records are applied in order so a node must appear before any edge
	/// using it. `terrain` defaults to `0` and `bidirectional` to `false`
	/// when omitted, lines starting with `#` are ignored
	#[cfg(feature = "csv")]
	pub fn from_csv_reader<R: std::io::Read>(reader: R) -> Result<Self, NavError> {
		let mut rdr = csv::ReaderBuilder::new()
			.has_headers(false)
			.flexible(true)
			.trim(csv::Trim::All)
			.comment(Some(b'#'))
			.from_reader(reader);
		let mut graph = NavGraph::default();
		for (line, record) in rdr.records().enumerate() {
			let record = record?;
			match record.get(0) {
				Some("node") => {
					let id: u32 = parse_csv_field(&record, 1, line)?;
					let terrain: u16 = match record.get(2) {
						Some(_) => parse_csv_field(&record, 2, line)?,
						None => 0,
					};
					graph.add_node(NodeId::new(id), TerrainClass::new(terrain))?;
				}
				Some("edge") => {
					let from: u32 = parse_csv_field(&record, 1, line)?;
					let to: u32 = parse_csv_field(&record, 2, line)?;
					let cost: f32 = parse_csv_field(&record, 3, line)?;
					let bidirectional: bool = match record.get(4) {
						Some(_) => parse_csv_field(&record, 4, line)?,
						None => false,
					};
					graph.connect(NodeId::new(from), NodeId::new(to), cost, bidirectional)?;
				}
				Some("") | None => continue,
				Some(other) => {
					return Err(NavError::Format(format!(
						"line {}: unknown record kind `{}`",
						line + 1,
						other
					)))
				}
			}
		}
		debug!(
			"Loaded NavGraph with {} nodes and {} edges from csv",
			graph.node_count(),
			graph.edge_count()
		);
		Ok(graph)
	}
}

/// Parse column `index` of a csv record
#[cfg(feature = "csv")]
fn parse_csv_field<T: std::str::FromStr>(
	record: &csv::StringRecord,
	index: usize,
	line: usize,
) -> Result<T, NavError> {
	let raw = record.get(index).ok_or_else(|| {
		NavError::Format(format!("line {}: missing column {}", line + 1, index + 1))
	})?;
	raw.parse::<T>().map_err(|_| {
		NavError::Format(format!(
			"line {}: cannot parse `{}` in column {}",
			line + 1,
			raw,
			index + 1
		))
	})
}
