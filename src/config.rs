//! Configuration loader and schema types.
//!
//! Settings drive the watcher timings, playback defaults and directory
//! scanning; they come from an optional TOML file with environment
//! overrides on top.

mod load;
mod schema;

pub use schema::*;
