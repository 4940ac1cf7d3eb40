//! **tilenav-core** — traversal grids for tile-based path planning (core types).
//!
//! This crate provides the foundational types used across the *tilenav*
//! workspace: geometry primitives, tile classification, the immutable
//! [`TraversalGrid`], and the layer compositing that derives a grid from an
//! ordered stack of tile layers.

pub mod geom;
pub mod grid;
pub mod layers;
pub mod tiles;

pub use geom::Point;
pub use grid::TraversalGrid;
pub use layers::{GridBuilder, GridError, MapLayer, TileLayer};
pub use tiles::{TileCell, TileClass};
