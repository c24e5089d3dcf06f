//! 2D geometry for the search region (vertex rings, not half-spaces).
//!
//! Purpose
//! - One shared implementation of points, lines and convex polygons used by
//!   every probing strategy.
//! - Keep numerics explicit: tolerances live in `GeomCfg` and are passed in.
//!
//! Contents
//! - `vector`: `Vec2Ext` planar helpers for `nalgebra::Vector2<f64>`.
//! - `line`: `Line2` (two-point line, cross-ratio intersection, segment test).
//! - `polygon`: `Polygon` (edge crossings, `slice`, average vertex, area).

pub mod line;
pub mod polygon;
mod types;
pub mod vector;

pub use line::Line2;
pub use polygon::{Crossing, Polygon, Slice};
pub use types::{GeomCfg, GeomError};
pub use vector::Vec2Ext;
