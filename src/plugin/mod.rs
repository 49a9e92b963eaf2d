//! Defines the Bevy [Plugin] for Dijkstra maps
//!

use crate::prelude::*;
use bevy::prelude::*;

pub mod field_layer;
pub mod graph_layer;

/// Graph mutations run before any field is recalculated within a tick
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum OrderingSet {
	/// Apply node and edge updates
	Mutate,
	/// Rebuild requested fields
	Calculate,
}

/// Registers the events and systems that keep [DijkstraFields] in step with
/// their [NavGraph]
pub struct DijkstraMapPlugin;

impl Plugin for DijkstraMapPlugin {
	#[cfg(not(tarpaulin_include))]
	fn build(&self, app: &mut App) {
		app.register_type::<NodeId>()
			.register_type::<TerrainClass>()
			.register_type::<Heading>()
			.register_type::<Connectivity>()
			.register_type::<FieldLabel>()
			.add_event::<graph_layer::EventUpdateNode>()
			.add_event::<graph_layer::EventUpdateEdge>()
			.add_event::<field_layer::EventRecalculateField>()
			.add_event::<field_layer::EventFieldRecalculated>()
			.configure_sets(Update, (OrderingSet::Mutate, OrderingSet::Calculate).chain())
			.add_systems(
				Update,
				(
					(
						graph_layer::process_node_updates,
						graph_layer::process_edge_updates,
						graph_layer::flag_stale_fields,
					)
						.chain()
						.in_set(OrderingSet::Mutate),
					field_layer::process_recalculation_requests.in_set(OrderingSet::Calculate),
				),
			);
	}
}
