//! Search for a hidden cell from WARMER / COLDER / SAME feedback.
//!
//! Layers
//! - `geom2`: points, lines and convex polygons with explicit tolerances.
//! - `search`: the candidate region and probe selection (`Strategy`).
//! - `sim`: a truthful local opponent for tests, benches and `shadows simulate`.
//!
//! API Policy
//! - The crate serves the `shadows` binary. There is no stable public API.

pub mod geom2;
pub mod search;
pub mod sim;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use geom2::GeomCfg;
pub use nalgebra::Vector2 as Vec2;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::geom2::{GeomCfg, GeomError, Line2, Polygon, Slice, Vec2Ext};
    pub use crate::search::{
        Board, Cell, Clue, MidpointRule, RoundOutcome, SearchCfg, SearchError, SkipReason,
        Strategy, StrategyKind, WarmRule,
    };
    pub use crate::sim::{Game, GameOutcome, GameReport, ReplayToken, RoundRecord};
    pub use nalgebra::Vector2 as Vec2;
}
