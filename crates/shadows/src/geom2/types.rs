//! Basic 2D types and tolerances shared by lines, polygons and the search.
//!
//! - `GeomCfg`: centralizes epsilons for parallel, coincidence and collinearity checks.
//! - `GeomError`: construction failures and the one fatal invariant violation.
//!
//! Code cross-refs: `line::Line2`, `polygon::Polygon`

use std::fmt;

use nalgebra::Vector2;

/// Geometry configuration (tolerances).
///
/// Coordinates live on a board of at most a few thousand cells per side, so
/// absolute tolerances are adequate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeomCfg {
    /// Cross products of direction vectors below this are treated as parallel.
    pub eps_parallel: f64,
    /// Two points closer than this coincide.
    pub eps_point: f64,
    /// Max perpendicular distance for a point to count as lying on a line.
    pub eps_collinear: f64,
}

impl Default for GeomCfg {
    fn default() -> Self {
        Self {
            eps_parallel: 1e-12,
            eps_point: 1e-7,
            eps_collinear: 1e-6,
        }
    }
}

impl GeomCfg {
    #[inline]
    pub fn coincide(&self, a: Vector2<f64>, b: Vector2<f64>) -> bool {
        (a - b).norm() <= self.eps_point
    }
}

/// Errors surfaced by the 2D primitives.
#[derive(Debug, Clone, PartialEq)]
pub enum GeomError {
    /// A line needs two distinct points.
    DegenerateLine { at: Vector2<f64> },
    /// A polygon needs at least three vertices.
    TooFewVertices { count: usize },
    /// A cast line crossed more than two edges; the polygon is not convex.
    TooManyCrossings { count: usize },
}

impl fmt::Display for GeomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeomError::DegenerateLine { at } => write!(
                f,
                "the points given do not describe a valid line: A == B == ({:.2}, {:.2})",
                at.x, at.y
            ),
            GeomError::TooFewVertices { count } => {
                write!(f, "polygon needs at least 3 vertices, got {count}")
            }
            GeomError::TooManyCrossings { count } => write!(
                f,
                "cast line crossed {count} edges; candidate region is not convex"
            ),
        }
    }
}

impl std::error::Error for GeomError {}
