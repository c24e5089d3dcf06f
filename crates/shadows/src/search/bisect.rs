//! Polygon-bisection search.
//!
//! Round structure
//! 1. `pivot = region.average_vertex()`; the next probe is the previous probe
//!    reflected through the pivot, floored and clamped to the board.
//! 2. The probe is emitted and a clue comes back.
//! 3. The perpendicular bisector of the last two probes is the locus of cells
//!    equidistant from both; the region is sliced along it and the half on the
//!    clue's side is kept.
//!
//! Two refinements on top of the plain reflection:
//! - Stall: if the reflected probe would not cut the region (it clamps back onto
//!   the current probe, or repeats the previous move), the current probe is
//!   rotated about the pivot instead, keeping the cut through the pivot.
//!   When neither the rotations nor the 4-neighbours cut it, the search probes
//!   a candidate cell inside the region directly.
//! - Endgame: once the region is down to a few dozen cells, the remaining
//!   candidates are enumerated against the exact clue history (SAME included)
//!   and probed directly, picking the one with the smallest worst-case split.
//!
//! `SearchState` is a plain value and `SearchState::apply_clue` is the pure
//! step; `BisectionSearch` wraps it for callers that want a mutable handle.

use nalgebra::Vector2;
use tracing::debug;

use super::types::{Board, Cell, Clue, RoundOutcome, SearchError, SkipReason};
use crate::geom2::{GeomCfg, Polygon, Slice, Vec2Ext};

/// Where the bisector passes through the probe-to-probe segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MidpointRule {
    /// True midpoint: the cut is exactly the equidistant line.
    #[default]
    Exact,
    /// Midpoint floored onto the grid. Can shift the cut by up to one cell
    /// diagonal and so can discard the target.
    Floor,
}

/// How the two halves of a slice are told apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WarmRule {
    /// Warm half = the one whose average vertex lies on the new probe's side
    /// of the bisector.
    #[default]
    BisectorSide,
    /// Warm half = the one whose average vertex is nearer the new probe. Can
    /// pick the wrong half on elongated regions.
    NearestCentroid,
}

/// Which half of a slice was kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Half {
    Warm,
    Cold,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchCfg {
    pub geom: GeomCfg,
    pub midpoint: MidpointRule,
    pub warm_rule: WarmRule,
    /// When the reflected probe cannot cut the region, try the current probe
    /// rotated about the pivot (and its 4-neighbours) and take the most
    /// balanced cut.
    pub nudge_on_stall: bool,
    /// Rotation steps per full turn tried on a stall.
    pub stall_rotations: usize,
    /// Switch to probing candidate cells directly once the region can hold at
    /// most this many cells (estimated as `area + perimeter + 1`). 0 disables.
    pub endgame_cells: usize,
}

impl Default for SearchCfg {
    fn default() -> Self {
        Self {
            geom: GeomCfg::default(),
            midpoint: MidpointRule::default(),
            warm_rule: WarmRule::default(),
            nudge_on_stall: true,
            stall_rotations: 16,
            endgame_cells: 64,
        }
    }
}

/// 4-neighbourhood, in the order they are tried.
const NUDGES: [(i64, i64); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Above this estimated cell count a stalled search probes the pivot cell
/// instead of enumerating candidates.
const STALL_SCAN_CELLS: f64 = 1_048_576.0;
/// Candidate sets up to this size get the quadratic minimax pick.
const STALL_MINIMAX_CELLS: usize = 4096;

/// A clue together with the move it answers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Observation {
    pub from: Cell,
    pub to: Cell,
    pub clue: Clue,
}

impl Observation {
    /// Whether a target at `c` would have produced this clue.
    pub fn admits(&self, c: Cell) -> bool {
        let (d_to, d_from) = (self.to.dist2(c), self.from.dist2(c));
        match self.clue {
            Clue::Warmer => d_to < d_from,
            Clue::Colder => d_to > d_from,
            Clue::Same => d_to == d_from,
            Clue::Unknown => true,
        }
    }
}

/// Everything the bisection search carries from one round to the next.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchState {
    pub region: Polygon,
    /// The probe emitted before `current_probe`.
    pub last_probe: Cell,
    /// The most recently emitted probe (the one the next clue refers to).
    pub current_probe: Cell,
    /// Every informative clue so far. Cells named here are known misses.
    pub history: Vec<Observation>,
}

impl SearchState {
    /// Whole board as the region; `start` counts as already emitted.
    pub fn start(board: &Board, start: Cell) -> Result<Self, SearchError> {
        let start = board.check_cell(start)?;
        Ok(Self {
            region: Polygon::rect(board.width() as f64, board.height() as f64),
            last_probe: start,
            current_probe: start,
            history: Vec::new(),
        })
    }

    /// Next probe: a candidate cell in the endgame, otherwise the reflection
    /// of the current probe through the region's average vertex.
    pub fn next_probe(&self, board: &Board, cfg: &SearchCfg) -> Result<Cell, SearchError> {
        if self.in_endgame(cfg) {
            let cands = self.candidates(board, cfg);
            if let Some(pick) = self.minimax_pick(&cands) {
                debug!(candidates = cands.len(), %pick, "endgame");
                return Ok(pick);
            }
        }
        let pivot = self.region.average_vertex();
        let pos = self.current_probe.to_vec2();
        let next = board.snap(pivot - (pos - pivot));
        if cfg.nudge_on_stall && self.cut_balance(next, cfg)?.is_none() {
            if let Some(nudged) = self.best_nudge(board, cfg)? {
                debug!(%nudged, reflected = %next, "reflection stalled; nudging");
                return Ok(nudged);
            }
            if let Some(inside) = self.step_inside(board, cfg) {
                debug!(%inside, reflected = %next, "no move cuts the region; stepping inside");
                return Ok(inside);
            }
        }
        Ok(next)
    }

    /// Probe a candidate cell directly when no move from here can cut the
    /// region (typically a long sliver far from the current probe). Small
    /// candidate sets get the endgame pick; large ones the cell nearest the
    /// pivot.
    fn step_inside(&self, board: &Board, cfg: &SearchCfg) -> Option<Cell> {
        let pivot = board.snap(self.region.average_vertex());
        if self.region.area() + self.region.perimeter() + 1.0 > STALL_SCAN_CELLS {
            return (pivot != self.current_probe && pivot != self.last_probe).then_some(pivot);
        }
        let cands = self.candidates(board, cfg);
        if cands.len() <= STALL_MINIMAX_CELLS {
            return self.minimax_pick(&cands);
        }
        cands.into_iter().min_by_key(|&c| (c.dist2(pivot), c))
    }

    fn in_endgame(&self, cfg: &SearchCfg) -> bool {
        cfg.endgame_cells > 0
            && self.region.area() + self.region.perimeter() + 1.0 <= cfg.endgame_cells as f64
    }

    /// Cells inside the region that agree with every clue so far, excluding
    /// cells already probed. Scans the region row by row.
    pub fn candidates(&self, board: &Board, cfg: &SearchCfg) -> Vec<Cell> {
        let eps = cfg.geom.eps_point;
        let bb = self.region.bounding_rect();
        let (top, bottom) = (bb.vertices()[0].y, bb.vertices()[2].y);
        let y_lo = ((top - eps).ceil() as i64).max(0);
        let y_hi = ((bottom + eps).floor() as i64).min(board.height() - 1);
        let mut out = Vec::new();
        for y in y_lo..=y_hi {
            let Some((left, right)) = self.region.x_span_at(y as f64, eps) else {
                continue;
            };
            let x_lo = ((left - eps).ceil() as i64).max(0);
            let x_hi = ((right + eps).floor() as i64).min(board.width() - 1);
            for x in x_lo..=x_hi {
                let c = Cell::new(x, y);
                if self.is_known_miss(c) {
                    continue;
                }
                if self.history.iter().all(|o| o.admits(c)) {
                    out.push(c);
                }
            }
        }
        out
    }

    fn is_known_miss(&self, c: Cell) -> bool {
        c == self.current_probe
            || c == self.last_probe
            || self.history.iter().any(|o| o.from == c || o.to == c)
    }

    /// Candidate whose clue leaves the fewest cells in the worst case.
    fn minimax_pick(&self, cands: &[Cell]) -> Option<Cell> {
        let here = self.current_probe;
        cands
            .iter()
            .map(|&c| {
                let (mut warm, mut cold, mut same) = (0usize, 0usize, 0usize);
                for &o in cands {
                    if o == c {
                        continue;
                    }
                    match c.dist2(o).cmp(&here.dist2(o)) {
                        std::cmp::Ordering::Less => warm += 1,
                        std::cmp::Ordering::Greater => cold += 1,
                        std::cmp::Ordering::Equal => same += 1,
                    }
                }
                (warm.max(cold).max(same), c)
            })
            .min()
            .map(|(_, c)| c)
    }

    /// Smaller half's area if moving to `cand` would cut the region.
    fn cut_balance(&self, cand: Cell, cfg: &SearchCfg) -> Result<Option<f64>, SearchError> {
        let here = self.current_probe;
        if cand == here || cand == self.last_probe {
            return Ok(None);
        }
        let (m, mb) = bisector(here.to_vec2(), cand.to_vec2(), cfg.midpoint);
        Ok(match self.region.slice(m, mb, &cfg.geom)? {
            Slice::Split(a, b) => Some(a.area().min(b.area())),
            Slice::Whole(_) => None,
        })
    }

    /// Among the current probe rotated about the pivot and its 4-neighbours,
    /// the one whose cut leaves the larger smaller-half.
    fn best_nudge(&self, board: &Board, cfg: &SearchCfg) -> Result<Option<Cell>, SearchError> {
        let here = self.current_probe;
        let pivot = self.region.average_vertex();
        let rel = here.to_vec2() - pivot;
        let steps = cfg.stall_rotations.max(1);
        let rotated = (1..steps).filter_map(|k| {
            let th = std::f64::consts::TAU * k as f64 / steps as f64;
            rel.rotate_by_complex(&Vector2::new(th.cos(), th.sin()))
                .map(|r| board.snap(pivot + r))
        });
        let neighbours = NUDGES
            .iter()
            .map(|&(dx, dy)| Cell::new(here.x + dx, here.y + dy))
            .filter(|c| board.contains(*c));

        let mut best: Option<(Cell, f64)> = None;
        for cand in rotated.chain(neighbours) {
            if let Some(balance) = self.cut_balance(cand, cfg)? {
                if best.map_or(true, |(_, b)| balance > b) {
                    best = Some((cand, balance));
                }
            }
        }
        Ok(best.map(|(c, _)| c))
    }

    /// Record that `probe` was emitted.
    pub fn advance(self, probe: Cell) -> Self {
        Self {
            last_probe: self.current_probe,
            current_probe: probe,
            ..self
        }
    }

    /// Narrow the region with the clue for `current_probe` versus `last_probe`.
    ///
    /// Only a non-convex region (`GeomError::TooManyCrossings`) is an error;
    /// everything that prevents a cut is reported as `RoundOutcome::Skipped`.
    pub fn apply_clue(
        mut self,
        clue: Clue,
        cfg: &SearchCfg,
    ) -> Result<(Self, RoundOutcome), SearchError> {
        if clue == Clue::Unknown {
            return Ok((self, RoundOutcome::Skipped(SkipReason::UnknownClue)));
        }
        if self.current_probe == self.last_probe {
            return Ok((self, RoundOutcome::Skipped(SkipReason::NoMovement)));
        }
        self.history.push(Observation {
            from: self.last_probe,
            to: self.current_probe,
            clue,
        });
        if clue == Clue::Same {
            return Ok((self, RoundOutcome::Skipped(SkipReason::SameClue)));
        }

        let next = self.current_probe.to_vec2();
        let last = self.last_probe.to_vec2();
        let (mid, mid_b) = bisector(last, next, cfg.midpoint);

        let (first, second) = match self.region.slice(mid, mid_b, &cfg.geom)? {
            Slice::Whole(_) => {
                debug!(mid_x = mid.x, mid_y = mid.y, "bisector does not cut the region");
                return Ok((self, RoundOutcome::Skipped(SkipReason::NoSplit)));
            }
            Slice::Split(a, b) => (a, b),
        };

        let (warm, cold) = if first_is_warm(&first, &second, last, next, cfg.warm_rule) {
            (first, second)
        } else {
            (second, first)
        };
        let (kept, half) = match clue {
            Clue::Warmer => (warm, Half::Warm),
            _ => (cold, Half::Cold),
        };
        let area = kept.area();
        debug!(?half, area, region = %kept, "narrowed");
        self.region = kept;
        Ok((self, RoundOutcome::Narrowed { area }))
    }
}

/// Two points on the perpendicular bisector of `last → next`.
///
/// The second point is the midpoint offset by the probe direction turned a
/// quarter, so the line exists whenever `last != next`.
pub fn bisector(
    last: Vector2<f64>,
    next: Vector2<f64>,
    rule: MidpointRule,
) -> (Vector2<f64>, Vector2<f64>) {
    let mid = match rule {
        MidpointRule::Exact => (last + next) / 2.0,
        MidpointRule::Floor => ((next - last) / 2.0 + last).floor(),
    };
    let dir = next - last;
    let perp = dir
        .rotate_by_complex(&Vector2::new(0.0, 1.0))
        .unwrap_or_else(|| dir.rotate90());
    (mid, mid + perp)
}

fn first_is_warm(
    first: &Polygon,
    second: &Polygon,
    last: Vector2<f64>,
    next: Vector2<f64>,
    rule: WarmRule,
) -> bool {
    let c1 = first.average_vertex();
    let c2 = second.average_vertex();
    // larger score = warmer
    let score = |c: Vector2<f64>| match rule {
        WarmRule::BisectorSide => (c - last).norm_squared() - (c - next).norm_squared(),
        WarmRule::NearestCentroid => -(c - next).norm_squared(),
    };
    let (s1, s2) = (score(c1), score(c2));
    if s1 != s2 {
        return s1 > s2;
    }
    // tie: lexicographically smaller average vertex is warm
    (c1.x, c1.y) <= (c2.x, c2.y)
}

/// Mutable handle over `SearchState` for round-by-round drivers.
#[derive(Clone, Debug)]
pub struct BisectionSearch {
    board: Board,
    cfg: SearchCfg,
    state: SearchState,
}

impl BisectionSearch {
    pub fn new(board: Board, start: Cell, cfg: SearchCfg) -> Result<Self, SearchError> {
        Ok(Self {
            board,
            cfg,
            state: SearchState::start(&board, start)?,
        })
    }

    #[inline]
    pub fn state(&self) -> &SearchState {
        &self.state
    }

    #[inline]
    pub fn region(&self) -> &Polygon {
        &self.state.region
    }

    /// Whether `c` is still a candidate (inside or on the region).
    pub fn admits(&self, c: Cell) -> bool {
        self.state.region.contains(c.to_vec2(), self.cfg.geom.eps_point)
    }

    /// Compute, record and return the next probe.
    pub fn propose(&mut self) -> Result<Cell, SearchError> {
        let probe = self.state.next_probe(&self.board, &self.cfg)?;
        let pivot = self.state.region.average_vertex();
        debug!(
            pivot_x = pivot.x,
            pivot_y = pivot.y,
            from = %self.state.current_probe,
            to = %probe,
            "probe"
        );
        self.state = self.state.clone().advance(probe);
        Ok(probe)
    }

    /// Apply the clue for the last proposed probe. On error the state is kept
    /// as it was before the call.
    pub fn observe(&mut self, clue: Clue) -> Result<RoundOutcome, SearchError> {
        let (next, outcome) = self.state.clone().apply_clue(clue, &self.cfg)?;
        self.state = next;
        Ok(outcome)
    }
}
