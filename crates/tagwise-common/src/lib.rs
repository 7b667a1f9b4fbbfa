//! Common utilities for the tagwise linter.
//!
//! This crate provides shared infrastructure used by all linter components:
//! - **Locations** - where in a source a token, node or diagnostic lives
//! - **Warning System** - deduplicated log output for non-fatal oddities

pub mod location;
pub mod warning;

pub use location::Location;
