//! One handle over both search strategies, selected at runtime.

use super::axis::AxisSearch;
use super::bisect::{BisectionSearch, SearchCfg};
use super::types::{Board, Cell, Clue, RoundOutcome, SearchError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StrategyKind {
    /// Convex-region bisection with reflected probes.
    #[default]
    Bisection,
    /// Column-then-row interval search.
    AxisAligned,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Bisection => "bisection",
            StrategyKind::AxisAligned => "axis",
        }
    }
}

#[derive(Clone, Debug)]
pub enum Strategy {
    Bisection(BisectionSearch),
    AxisAligned(AxisSearch),
}

impl Strategy {
    /// `cfg` only affects `StrategyKind::Bisection`.
    pub fn new(
        kind: StrategyKind,
        board: Board,
        start: Cell,
        cfg: SearchCfg,
    ) -> Result<Self, SearchError> {
        Ok(match kind {
            StrategyKind::Bisection => Strategy::Bisection(BisectionSearch::new(board, start, cfg)?),
            StrategyKind::AxisAligned => Strategy::AxisAligned(AxisSearch::new(board, start)?),
        })
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Bisection(_) => StrategyKind::Bisection,
            Strategy::AxisAligned(_) => StrategyKind::AxisAligned,
        }
    }

    pub fn propose(&mut self) -> Result<Cell, SearchError> {
        match self {
            Strategy::Bisection(s) => s.propose(),
            Strategy::AxisAligned(s) => Ok(s.propose()),
        }
    }

    pub fn observe(&mut self, clue: Clue) -> Result<RoundOutcome, SearchError> {
        match self {
            Strategy::Bisection(s) => s.observe(clue),
            Strategy::AxisAligned(s) => s.observe(clue),
        }
    }

    pub fn admits(&self, c: Cell) -> bool {
        match self {
            Strategy::Bisection(s) => s.admits(c),
            Strategy::AxisAligned(s) => s.admits(c),
        }
    }

    /// Size of what is still possible: polygon area or remaining cell count.
    pub fn candidate_area(&self) -> f64 {
        match self {
            Strategy::Bisection(s) => s.region().area(),
            Strategy::AxisAligned(s) => s.candidates() as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_on_kind() {
        let board = Board::new(8, 8).unwrap();
        let start = Cell::new(0, 0);
        let mut b = Strategy::new(StrategyKind::Bisection, board, start, SearchCfg::default()).unwrap();
        let mut a = Strategy::new(StrategyKind::AxisAligned, board, start, SearchCfg::default()).unwrap();
        assert_eq!(b.kind(), StrategyKind::Bisection);
        assert_eq!(a.kind(), StrategyKind::AxisAligned);
        assert!((b.candidate_area() - 64.0).abs() < 1e-12);
        assert!((a.candidate_area() - 64.0).abs() < 1e-12);
        assert_eq!(b.propose().unwrap(), Cell::new(7, 7));
        assert_eq!(a.propose().unwrap(), Cell::new(4, 0));
        b.observe(Clue::Colder).unwrap();
        a.observe(Clue::Colder).unwrap();
        assert!((b.candidate_area() - 24.5).abs() < 1e-12);
        // x in [0, 2)
        assert!((a.candidate_area() - 16.0).abs() < 1e-12);
    }
}
