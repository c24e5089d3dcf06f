//! Axis-aligned search: pin the column first, then the row.
//!
//! The candidate set is a half-open cell rectangle `[lo.x, hi.x) × [lo.y, hi.y)`.
//! While one axis is active, probes move along that axis only, so the clue
//! depends on that coordinate alone and splits the interval at the midpoint of
//! the last two probes. All arithmetic is on integers.

use tracing::debug;

use super::types::{Board, Cell, Clue, RoundOutcome, SearchError, SkipReason};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    /// Solving x.
    Columns,
    /// Moving onto the solved column before solving y.
    Align,
    /// Solving y.
    Rows,
    Done,
}

#[derive(Clone, Debug)]
pub struct AxisSearch {
    lo: Cell,
    hi: Cell,
    phase: Phase,
    last: Cell,
    current: Cell,
}

impl AxisSearch {
    pub fn new(board: Board, start: Cell) -> Result<Self, SearchError> {
        let start = board.check_cell(start)?;
        let mut s = Self {
            lo: Cell::new(0, 0),
            hi: Cell::new(board.width(), board.height()),
            phase: Phase::Columns,
            last: start,
            current: start,
        };
        s.settle();
        Ok(s)
    }

    /// Remaining candidate cells.
    pub fn candidates(&self) -> i64 {
        (self.hi.x - self.lo.x) * (self.hi.y - self.lo.y)
    }

    /// Half-open bounds `(lo, hi)`.
    pub fn bounds(&self) -> (Cell, Cell) {
        (self.lo, self.hi)
    }

    pub fn admits(&self, c: Cell) -> bool {
        (self.lo.x..self.hi.x).contains(&c.x) && (self.lo.y..self.hi.y).contains(&c.y)
    }

    pub fn propose(&mut self) -> Cell {
        let here = self.current;
        let probe = match self.phase {
            Phase::Columns => Cell::new(pick(self.lo.x, self.hi.x, here.x), here.y),
            Phase::Align | Phase::Done => {
                let y = if self.phase == Phase::Done { self.lo.y } else { here.y };
                Cell::new(self.lo.x, y)
            }
            Phase::Rows => Cell::new(here.x, pick(self.lo.y, self.hi.y, here.y)),
        };
        debug!(phase = ?self.phase, from = %here, to = %probe, "axis probe");
        self.last = here;
        self.current = probe;
        probe
    }

    pub fn observe(&mut self, clue: Clue) -> Result<RoundOutcome, SearchError> {
        let outcome = match self.phase {
            Phase::Columns => {
                let (lo, hi) = narrow(self.lo.x, self.hi.x, self.last.x, self.current.x, clue);
                self.narrowed(Cell::new(lo, self.lo.y), Cell::new(hi, self.hi.y))
            }
            Phase::Rows => {
                let (lo, hi) = narrow(self.lo.y, self.hi.y, self.last.y, self.current.y, clue);
                self.narrowed(Cell::new(self.lo.x, lo), Cell::new(self.hi.x, hi))
            }
            Phase::Align => RoundOutcome::Skipped(SkipReason::Aligning),
            Phase::Done => RoundOutcome::Skipped(SkipReason::Resolved),
        };
        self.settle();
        Ok(outcome)
    }

    fn narrowed(&mut self, lo: Cell, hi: Cell) -> RoundOutcome {
        if (lo, hi) == (self.lo, self.hi) {
            return RoundOutcome::Skipped(SkipReason::NoSplit);
        }
        self.lo = lo;
        self.hi = hi;
        RoundOutcome::Narrowed {
            area: self.candidates() as f64,
        }
    }

    /// Advance the phase once an axis is pinned to a single value.
    fn settle(&mut self) {
        loop {
            let next = match self.phase {
                Phase::Columns if self.hi.x - self.lo.x <= 1 => {
                    debug!(x = self.lo.x, "column solved");
                    if self.current.x == self.lo.x {
                        Phase::Rows
                    } else {
                        Phase::Align
                    }
                }
                // the alignment probe has been answered
                Phase::Align if self.current.x == self.lo.x => Phase::Rows,
                Phase::Rows if self.hi.y - self.lo.y <= 1 => {
                    debug!(y = self.lo.y, "row solved");
                    Phase::Done
                }
                _ => return,
            };
            self.phase = next;
        }
    }
}

/// Probe the middle of `[lo, hi)`; if that is where we stand, jump to an end.
fn pick(lo: i64, hi: i64, here: i64) -> i64 {
    let mid = (lo + hi).div_euclid(2);
    if mid != here {
        mid
    } else if lo != here {
        lo
    } else {
        hi - 1
    }
}

/// Intersect `[lo, hi)` with the cells consistent with `clue` for a move
/// `last → next` along one axis.
fn narrow(lo: i64, hi: i64, last: i64, next: i64, clue: Clue) -> (i64, i64) {
    if last == next {
        return (lo, hi);
    }
    // the equidistant coordinate is sum / 2
    let sum = last + next;
    let toward_next = match clue {
        Clue::Same => {
            if sum.rem_euclid(2) == 0 {
                let m = sum / 2;
                return (lo.max(m), hi.min(m + 1));
            }
            return (lo, hi);
        }
        Clue::Unknown => return (lo, hi),
        Clue::Warmer => true,
        Clue::Colder => false,
    };
    let above = toward_next == (next > last);
    if above {
        (lo.max(sum.div_euclid(2) + 1), hi)
    } else {
        (lo, hi.min((sum + 1).div_euclid(2)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(board: Board, start: Cell, target: Cell, budget: usize) -> Option<usize> {
        let mut s = AxisSearch::new(board, start).unwrap();
        let mut here = start;
        for turn in 1..=budget {
            let probe = s.propose();
            if probe == target {
                return Some(turn);
            }
            let clue = match probe.dist2(target).cmp(&here.dist2(target)) {
                std::cmp::Ordering::Less => Clue::Warmer,
                std::cmp::Ordering::Greater => Clue::Colder,
                std::cmp::Ordering::Equal => Clue::Same,
            };
            here = probe;
            s.observe(clue).unwrap();
            let (lo, hi) = s.bounds();
            assert!(s.admits(target), "target {target} dropped: {lo} .. {hi}");
        }
        None
    }

    #[test]
    fn narrow_interval_rules() {
        // move 0 → 4: equidistant at 2
        assert_eq!(narrow(0, 8, 0, 4, Clue::Warmer), (3, 8));
        assert_eq!(narrow(0, 8, 0, 4, Clue::Colder), (0, 2));
        assert_eq!(narrow(0, 8, 0, 4, Clue::Same), (2, 3));
        // move 4 → 0 mirrors it
        assert_eq!(narrow(0, 8, 4, 0, Clue::Warmer), (0, 2));
        assert_eq!(narrow(0, 8, 4, 0, Clue::Colder), (3, 8));
        // odd sum: equidistant at 2.5, no cell can be SAME
        assert_eq!(narrow(0, 8, 0, 5, Clue::Warmer), (3, 8));
        assert_eq!(narrow(0, 8, 0, 5, Clue::Colder), (0, 3));
        assert_eq!(narrow(0, 8, 0, 5, Clue::Same), (0, 8));
        // no movement, no information
        assert_eq!(narrow(0, 8, 3, 3, Clue::Colder), (0, 8));
    }

    #[test]
    fn pick_avoids_standing_still() {
        assert_eq!(pick(0, 8, 0), 4);
        assert_eq!(pick(0, 8, 4), 0);
        assert_eq!(pick(4, 6, 5), 4);
        assert_eq!(pick(4, 6, 4), 5);
    }

    #[test]
    fn finds_every_target_on_a_small_board() {
        let board = Board::new(7, 5).unwrap();
        for tx in 0..7 {
            for ty in 0..5 {
                let target = Cell::new(tx, ty);
                let start = Cell::new(6 - tx, 4 - ty);
                if start == target {
                    continue;
                }
                let turns = play(board, start, target, 40);
                assert!(turns.is_some(), "target {target} not found from {start}");
            }
        }
    }

    #[test]
    fn single_column_board_starts_on_rows() {
        let board = Board::new(1, 9).unwrap();
        let mut s = AxisSearch::new(board, Cell::new(0, 0)).unwrap();
        assert_eq!(s.propose(), Cell::new(0, 4));
        assert_eq!(s.candidates(), 9);
        assert_eq!(
            s.observe(Clue::Colder).unwrap(),
            RoundOutcome::Narrowed { area: 2.0 }
        );
    }

    #[test]
    fn wide_board_within_log_budget() {
        let board = Board::new(1000, 1000).unwrap();
        let turns = play(board, Cell::new(17, 940), Cell::new(613, 2), 120);
        assert!(turns.is_some());
    }
}
