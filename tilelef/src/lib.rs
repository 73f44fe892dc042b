//!
//! # tilelef
//!
//! LEF library export of tile-based integrated-circuit layout.
//!
//! Cells are stored as tiles (axis-aligned rectangles, optionally split along a diagonal),
//! pin labels, and instances of other cells, all keyed into a [Library].
//! Exporting a cell hierarchy writes:
//!
//! * The library header,
//! * One `LAYER` block per reportable layer of the [Technology],
//! * One `MACRO` block per cell, descendants before ancestors, each holding:
//!   * One `PIN` per label, with the geometry connected to it as its `PORT`,
//!   * Everything left over, on routing layers, as `OBS`tructions.
//!
//! Pin geometry is found by net selection through a [TileDatabase],
//! implemented in memory by [TilePlane].
//!

pub use tilelefutils as utils;

pub mod error;
pub use error::*;

pub mod geom;
pub use geom::*;

pub mod tech;
pub use tech::*;

pub mod plane;
pub use plane::*;

pub mod cell;
pub use cell::*;

pub mod sanitize;
pub use sanitize::*;

pub mod write;
pub use write::*;

pub mod header;

pub mod extract;
pub use extract::*;

pub mod macros;
pub use macros::*;

pub mod schedule;
pub use schedule::*;

// Unit tests
#[cfg(test)]
mod tests;
