//! Probe selection from WARMER / COLDER / SAME feedback.
//!
//! Purpose
//! - Keep a candidate set for the hidden cell and shrink it with every clue.
//! - Choose the next probe so the following clue is as informative as possible.
//!
//! Strategies
//! - `bisect`: the candidate set is a convex polygon. Each probe is the previous
//!   one reflected through the polygon's average vertex; each clue keeps one side
//!   of the perpendicular bisector of the last two probes.
//! - `axis`: the candidate set is a cell rectangle. Probes move along x until
//!   the column is pinned, then along y.
//!
//! Both are driven through `Strategy`: `propose()` yields the next probe,
//! `observe(clue)` feeds back the answer for it. Callers must alternate them.

pub mod axis;
pub mod bisect;
pub mod strategy;
mod types;

pub use axis::AxisSearch;
pub use bisect::{
    bisector, BisectionSearch, Half, MidpointRule, Observation, SearchCfg, SearchState, WarmRule,
};
pub use strategy::{Strategy, StrategyKind};
pub use types::{Board, Cell, Clue, ParseClueError, RoundOutcome, SearchError, SkipReason};
