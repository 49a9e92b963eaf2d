//! `use bevy_dijkstra_map_plugin::prelude::*;` to import common structures and methods
//!

#[doc(hidden)]
pub use crate::dijkstra::{graph::*, map::*, options::*, utilities::*, *};

#[doc(hidden)]
pub use crate::{
	bundle::*,
	error::*,
	plugin::{field_layer::*, graph_layer::*, *},
};
