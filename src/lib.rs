//! This is a plugin for Bevy game engine to build weighted graphs and
//! calculate Dijkstra maps over them: a cost field and a direction field
//! covering every reachable node, shared by any number of agents
//!

pub mod bundle;
pub mod dijkstra;
pub mod error;
pub mod plugin;

pub mod prelude;
