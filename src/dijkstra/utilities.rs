//! Useful constants and tools for building graphs
//!

use std::f32::consts::SQRT_2;

use crate::prelude::*;
use bevy::prelude::*;

/// Multiplier of a [TerrainClass] that has no entry in [TerrainWeights]
pub const DEFAULT_TERRAIN_MULTIPLIER: f32 = 1.0;

/// Which neighbours of a grid cell are linked when building a grid graph
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Reflect)]
pub enum Connectivity {
	/// North, East, South and West
	#[default]
	Orthogonal,
	/// Orthogonal plus the four diagonals, diagonal edges cost `SQRT_2` times
	/// the orthogonal cost
	All,
}

/// Id of the node at `(column, row)` in a grid `columns` wide, ids start
/// at `1` in the top-left corner and run row by row
pub fn grid_node_id(column: u32, row: u32, columns: u32) -> NodeId {
	NodeId::new(row * columns + column + 1)
}

/// Build a grid shaped [NavGraph] of `columns` x `rows` nodes using the
/// default [TerrainClass] with two-way edges between neighbours.
///
/// ```text
///  ___________
/// | 1 | 2 | 3 |
/// |___|___|___|
/// | 4 | 5 | 6 |
/// |___|___|___|
/// | 7 | 8 | 9 |
/// |___|___|___|
/// ```
pub fn grid_graph(
	columns: u32,
	rows: u32,
	connectivity: Connectivity,
	orthogonal_cost: f32,
) -> Result<NavGraph, NavError> {
	let mut graph = NavGraph::new();
	for row in 0..rows {
		for column in 0..columns {
			graph.add_node(grid_node_id(column, row, columns), TerrainClass::default())?;
		}
	}
	let diagonal_cost = orthogonal_cost * SQRT_2;
	for row in 0..rows {
		for column in 0..columns {
			let id = grid_node_id(column, row, columns);
			// each pair is linked once from its upper/left member
			if column + 1 < columns {
				graph.connect(id, grid_node_id(column + 1, row, columns), orthogonal_cost, true)?;
			}
			if row + 1 < rows {
				graph.connect(id, grid_node_id(column, row + 1, columns), orthogonal_cost, true)?;
			}
			if connectivity == Connectivity::All && row + 1 < rows {
				if column + 1 < columns {
					graph.connect(id, grid_node_id(column + 1, row + 1, columns), diagonal_cost, true)?;
				}
				if column > 0 {
					graph.connect(id, grid_node_id(column - 1, row + 1, columns), diagonal_cost, true)?;
				}
			}
		}
	}
	Ok(graph)
}
