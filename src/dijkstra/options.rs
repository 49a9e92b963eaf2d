//! Configuration of a single recalculation.
//!
//! [SolveOptions] bundles the [TerrainWeights] table with the solve direction
//! and the optional cutoffs. Both can be built in code or, with the `ron`
//! feature, loaded from disk:
//!
//! ```text
//! (
//! 	terrain_weights: { 1: 2.0, 4: 0.5 },
//! 	reverse: true,
//! 	max_cost: Some(12.0),
//! 	max_settled: None,
//! )
//! ```
//!

use std::collections::HashMap;

use crate::prelude::*;

/// Table of multipliers keyed by [TerrainClass]. A class without an entry
/// uses [DEFAULT_TERRAIN_MULTIPLIER]. Deserialised tables pass through
/// [TerrainWeights::insert] so a stored multiplier is never negative
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(
	feature = "serde",
	serde(
		from = "HashMap<TerrainClass, f32>",
		into = "HashMap<TerrainClass, f32>"
	)
)]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TerrainWeights(HashMap<TerrainClass, f32>);

impl TerrainWeights {
	/// Create an empty table, every class reads as `1.0`
	pub fn new() -> Self {
		TerrainWeights::default()
	}
	/// Builder style [TerrainWeights::insert]
	pub fn with(mut self, class: TerrainClass, multiplier: f32) -> Self {
		self.insert(class, multiplier);
		self
	}
	/// Set the multiplier of a class, returning the previous one. A multiplier
	/// `<= 0` (or NaN) collapses to `0.0` so the terrain costs nothing to enter
	pub fn insert(&mut self, class: TerrainClass, multiplier: f32) -> Option<f32> {
		let multiplier = if multiplier > 0.0 { multiplier } else { 0.0 };
		self.0.insert(class, multiplier)
	}
	/// Drop the entry of a class so it reverts to the default multiplier
	pub fn remove(&mut self, class: TerrainClass) -> Option<f32> {
		self.0.remove(&class)
	}
	/// Multiplier applied to an edge whose charged endpoint has this class
	pub fn multiplier(&self, class: TerrainClass) -> f32 {
		self.0
			.get(&class)
			.copied()
			.unwrap_or(DEFAULT_TERRAIN_MULTIPLIER)
	}
	/// Get a reference to the underlying table
	pub fn get(&self) -> &HashMap<TerrainClass, f32> {
		&self.0
	}
	/// From a `ron` file generate the [TerrainWeights], multipliers `<= 0`
	/// collapse to `0.0` as with [TerrainWeights::insert]
	#[cfg(feature = "ron")]
	pub fn from_ron(path: &str) -> Result<Self, NavError> {
		let file = std::fs::File::open(path)?;
		let weights: TerrainWeights = ron::de::from_reader(file)?;
		Ok(weights)
	}
}

impl From<HashMap<TerrainClass, f32>> for TerrainWeights {
	fn from(table: HashMap<TerrainClass, f32>) -> Self {
		table.into_iter().collect()
	}
}

impl From<TerrainWeights> for HashMap<TerrainClass, f32> {
	fn from(weights: TerrainWeights) -> Self {
		weights.0
	}
}

impl FromIterator<(TerrainClass, f32)> for TerrainWeights {
	fn from_iter<I: IntoIterator<Item = (TerrainClass, f32)>>(iter: I) -> Self {
		let mut weights = TerrainWeights::new();
		for (class, multiplier) in iter {
			weights.insert(class, multiplier);
		}
		weights
	}
}

/// Parameters of a recalculation
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SolveOptions {
	/// Multipliers looked up by the terrain of the endpoint being labelled
	terrain_weights: TerrainWeights,
	/// Treat the sources as destinations and walk edges backwards
	reverse: bool,
	/// Nodes whose cost would exceed this are left unreached
	max_cost: Option<f32>,
	/// Upper bound on the number of nodes finalised
	max_settled: Option<usize>,
}

impl SolveOptions {
	/// Forward solve, no terrain weights and no cutoffs
	pub fn new() -> Self {
		SolveOptions::default()
	}
	/// Replace the [TerrainWeights]
	pub fn with_terrain_weights(mut self, terrain_weights: TerrainWeights) -> Self {
		self.terrain_weights = terrain_weights;
		self
	}
	/// When `true` the sources are treated as destinations, costs are the cost
	/// of travelling *to* them
	pub fn with_reverse(mut self, reverse: bool) -> Self {
		self.reverse = reverse;
		self
	}
	/// Leave nodes whose cost would exceed `max_cost` unreached
	pub fn with_max_cost(mut self, max_cost: f32) -> Self {
		self.max_cost = Some(max_cost);
		self
	}
	/// Stop the solve once `max_settled` nodes have been finalised
	pub fn with_max_settled(mut self, max_settled: usize) -> Self {
		self.max_settled = Some(max_settled);
		self
	}
	/// Get the [TerrainWeights]
	pub fn get_terrain_weights(&self) -> &TerrainWeights {
		&self.terrain_weights
	}
	/// Get a mutable reference to the [TerrainWeights]
	pub fn get_terrain_weights_mut(&mut self) -> &mut TerrainWeights {
		&mut self.terrain_weights
	}
	/// Whether the sources are destinations
	pub fn is_reverse(&self) -> bool {
		self.reverse
	}
	/// Get the cost cutoff
	pub fn get_max_cost(&self) -> Option<f32> {
		self.max_cost
	}
	/// Get the settled node cutoff
	pub fn get_max_settled(&self) -> Option<usize> {
		self.max_settled
	}
	/// From a `ron` file generate the [SolveOptions], omitted fields take their
	/// default
	#[cfg(feature = "ron")]
	pub fn from_ron(path: &str) -> Result<Self, NavError> {
		let file = std::fs::File::open(path)?;
		let options: SolveOptions = ron::de::from_reader(file)?;
		Ok(options)
	}
}
