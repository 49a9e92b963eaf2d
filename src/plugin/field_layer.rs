//! Logic relating to [DijkstraMap] generation inside the ECS.
//!
//! An entity carries one [NavGraph] and any number of named fields in a
//! [DijkstraFields] component. Each field remembers the [SolveOptions] and
//! sources it was last built with so it can be recalculated on request.
//!

use std::{collections::BTreeMap, sync::Arc};

use crate::prelude::*;
use bevy::prelude::*;

/// Name of a field held by [DijkstraFields]
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Reflect)]
pub struct FieldLabel(String);

impl FieldLabel {
	/// Create a new instance of [FieldLabel]
	pub fn new(label: &str) -> Self {
		FieldLabel(label.to_string())
	}
	/// Get the name
	pub fn get(&self) -> &str {
		&self.0
	}
}

impl From<&str> for FieldLabel {
	fn from(label: &str) -> Self {
		FieldLabel::new(label)
	}
}

/// A single named field: how to build it and the last map built
#[derive(Clone, Debug, Default)]
pub struct DijkstraField {
	/// Options used by every recalculation of this field
	options: SolveOptions,
	/// Sources of the last recalculation
	sources: Vec<NodeId>,
	/// Latest result, shared so readers keep a stable snapshot
	map: Option<Arc<DijkstraMap>>,
	/// Set when the graph has changed since `map` was built
	stale: bool,
}

impl DijkstraField {
	/// Create a field that has not been calculated yet
	pub fn new(options: SolveOptions) -> Self {
		DijkstraField {
			options,
			..default()
		}
	}
	/// Get the [SolveOptions]
	pub fn get_options(&self) -> &SolveOptions {
		&self.options
	}
	/// Get the sources of the last recalculation
	pub fn get_sources(&self) -> &[NodeId] {
		&self.sources
	}
	/// Get the latest [DijkstraMap], `None` until first calculated
	pub fn get_map(&self) -> Option<&Arc<DijkstraMap>> {
		self.map.as_ref()
	}
	/// Whether the graph has been mutated since the map was built
	pub fn is_stale(&self) -> bool {
		self.stale
	}
}

/// Named [DijkstraField]s of an entity
#[derive(Component, Clone, Debug, Default)]
pub struct DijkstraFields(BTreeMap<FieldLabel, DijkstraField>);

impl DijkstraFields {
	/// Create an empty set of fields
	pub fn new() -> Self {
		DijkstraFields::default()
	}
	/// Register a field, replacing any field of the same name
	pub fn insert_field(&mut self, label: FieldLabel, options: SolveOptions) {
		self.0.insert(label, DijkstraField::new(options));
	}
	/// Drop a field
	pub fn remove_field(&mut self, label: &FieldLabel) -> Option<DijkstraField> {
		self.0.remove(label)
	}
	/// Get a field
	pub fn get(&self, label: &FieldLabel) -> Option<&DijkstraField> {
		self.0.get(label)
	}
	/// Get the latest map of a field
	pub fn get_map(&self, label: &FieldLabel) -> Option<Arc<DijkstraMap>> {
		self.0.get(label).and_then(|f| f.map.clone())
	}
	/// Iterate over every field
	pub fn iter(&self) -> impl Iterator<Item = (&FieldLabel, &DijkstraField)> {
		self.0.iter()
	}
	/// Recalculate a field against `graph`. When `options` is supplied it
	/// replaces the stored options of the field. On error the previous map is
	/// kept untouched
	pub fn recalculate(
		&mut self,
		label: &FieldLabel,
		graph: &NavGraph,
		sources: &[NodeId],
		options: Option<SolveOptions>,
	) -> Result<Arc<DijkstraMap>, NavError> {
		let field = self.0.entry(label.clone()).or_default();
		let options = options.unwrap_or_else(|| field.options.clone());
		let map = Arc::new(graph.recalculate(sources, &options)?);
		field.options = options;
		field.sources = sources.to_vec();
		field.map = Some(map.clone());
		field.stale = false;
		Ok(map)
	}
	/// Flag every field built against an older revision of `graph`, returning
	/// the labels newly flagged
	pub fn mark_stale(&mut self, graph: &NavGraph) -> Vec<FieldLabel> {
		let mut flagged = Vec::new();
		for (label, field) in self.0.iter_mut() {
			if field.stale {
				continue;
			}
			if let Some(map) = &field.map {
				if map.is_stale(graph) {
					field.stale = true;
					flagged.push(label.clone());
				}
			}
		}
		flagged
	}
}

/// Request that a field of every entity is rebuilt from the given sources
#[derive(Event, Debug, Clone)]
pub struct EventRecalculateField {
	/// Field to rebuild
	label: FieldLabel,
	/// Seeds of the solve
	sources: Vec<NodeId>,
	/// Replacement options, `None` keeps the stored ones
	options: Option<SolveOptions>,
}

impl EventRecalculateField {
	/// Create a new instance of [EventRecalculateField] keeping the stored
	/// options of the field
	pub fn new(label: FieldLabel, sources: Vec<NodeId>) -> Self {
		EventRecalculateField {
			label,
			sources,
			options: None,
		}
	}
	/// Replace the options of the field as part of the request
	pub fn with_options(mut self, options: SolveOptions) -> Self {
		self.options = Some(options);
		self
	}
	/// Get the field label
	pub fn get_label(&self) -> &FieldLabel {
		&self.label
	}
	/// Get the sources
	pub fn get_sources(&self) -> &[NodeId] {
		&self.sources
	}
	/// Get the replacement options
	pub fn get_options(&self) -> Option<&SolveOptions> {
		self.options.as_ref()
	}
}

/// Emitted after a field has been rebuilt
#[derive(Event, Debug, Clone)]
pub struct EventFieldRecalculated {
	/// Entity owning the field
	entity: Entity,
	/// Field that was rebuilt
	label: FieldLabel,
	/// Number of nodes reached
	reached: usize,
	/// Whether the settled node cap stopped the solve
	truncated: bool,
}

impl EventFieldRecalculated {
	/// Get the entity owning the field
	pub fn get_entity(&self) -> Entity {
		self.entity
	}
	/// Get the label of the rebuilt field
	pub fn get_label(&self) -> &FieldLabel {
		&self.label
	}
	/// Get the number of nodes reached
	pub fn get_reached(&self) -> usize {
		self.reached
	}
	/// Whether the solve was truncated
	pub fn is_truncated(&self) -> bool {
		self.truncated
	}
}

/// Only the latest request for each label is kept, several actors may ask for
/// the same field during one tick
pub fn coalesce_requests<'a>(
	requests: impl Iterator<Item = &'a EventRecalculateField>,
) -> BTreeMap<FieldLabel, &'a EventRecalculateField> {
	let mut latest = BTreeMap::new();
	for request in requests {
		latest.insert(request.label.clone(), request);
	}
	latest
}

/// Process [EventRecalculateField] and rebuild the requested fields
#[cfg(not(tarpaulin_include))]
pub fn process_recalculation_requests(
	mut events: EventReader<EventRecalculateField>,
	mut query: Query<(Entity, &NavGraph, &mut DijkstraFields)>,
	mut finished: EventWriter<EventFieldRecalculated>,
) {
	let latest = coalesce_requests(events.read());
	if latest.is_empty() {
		return;
	}
	for (entity, graph, mut fields) in query.iter_mut() {
		for (label, request) in latest.iter() {
			if fields.get(label).is_none() && request.get_options().is_none() {
				warn!("{:?} has no field {:?} and no options were given", entity, label);
				continue;
			}
			match fields.recalculate(
				label,
				graph,
				request.get_sources(),
				request.get_options().cloned(),
			) {
				Ok(map) => {
					finished.write(EventFieldRecalculated {
						entity,
						label: label.clone(),
						reached: map.reached_count(),
						truncated: map.truncated(),
					});
				}
				Err(e) => warn!("Field {:?} of {:?} not recalculated: {}", label, entity, e),
			}
		}
	}
}

#[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn recalculate_stores_map() {
		let graph = grid_graph(3, 3, Connectivity::Orthogonal, 1.0).unwrap();
		let mut fields = DijkstraFields::new();
		let label = FieldLabel::from("flee");
		fields.insert_field(label.clone(), SolveOptions::new().with_reverse(true));
		let map = fields.recalculate(&label, &graph, &[NodeId::new(5)], None).unwrap();
		assert!(map.is_reverse());
		assert_eq!(Some(2.0), fields.get_map(&label).unwrap().cost_at(NodeId::new(1)));
		assert_eq!(&[NodeId::new(5)], fields.get(&label).unwrap().get_sources());
	}
	#[test]
	fn failed_recalculation_keeps_previous_map() {
		let graph = grid_graph(3, 3, Connectivity::Orthogonal, 1.0).unwrap();
		let mut fields = DijkstraFields::new();
		let label = FieldLabel::from("seek");
		fields.recalculate(&label, &graph, &[NodeId::new(1)], None).unwrap();
		let result = fields.recalculate(&label, &graph, &[], None);
		assert!(matches!(result, Err(NavError::EmptySourceSet)));
		let map = fields.get_map(&label).unwrap();
		assert_eq!(Some(4.0), map.cost_at(NodeId::new(9)));
	}
	#[test]
	fn graph_change_marks_stale() {
		let mut graph = grid_graph(3, 3, Connectivity::Orthogonal, 1.0).unwrap();
		let mut fields = DijkstraFields::new();
		let label = FieldLabel::from("seek");
		fields.recalculate(&label, &graph, &[NodeId::new(1)], None).unwrap();
		assert!(fields.mark_stale(&graph).is_empty());
		graph.disable_node(NodeId::new(5)).unwrap();
		assert_eq!(vec![label.clone()], fields.mark_stale(&graph));
		assert!(fields.get(&label).unwrap().is_stale());
		// already flagged
		assert!(fields.mark_stale(&graph).is_empty());
		fields.recalculate(&label, &graph, &[NodeId::new(1)], None).unwrap();
		assert!(!fields.get(&label).unwrap().is_stale());
	}
	#[test]
	fn latest_request_wins() {
		let requests = [
			EventRecalculateField::new(FieldLabel::from("a"), vec![NodeId::new(1)]),
			EventRecalculateField::new(FieldLabel::from("b"), vec![NodeId::new(2)]),
			EventRecalculateField::new(FieldLabel::from("a"), vec![NodeId::new(3)]),
		];
		let latest = coalesce_requests(requests.iter());
		assert_eq!(2, latest.len());
		assert_eq!(&[NodeId::new(3)], latest[&FieldLabel::from("a")].get_sources());
	}
}
