//! Board, grid cells, clues and the round outcome shared by every strategy.

use std::fmt;
use std::str::FromStr;

use nalgebra::Vector2;

use crate::geom2::GeomError;

/// Rectangular board of `width × height` cells; origin top-left.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Board {
    width: i64,
    height: i64,
}

impl Board {
    /// Largest side accepted. Cell coordinates stay exact in `f64`, and
    /// `cells` and `Cell::dist2` between on-board cells fit in `i64`.
    pub const MAX_SIDE: i64 = 1 << 24;

    pub fn new(width: i64, height: i64) -> Result<Self, SearchError> {
        let side = 1..=Self::MAX_SIDE;
        if !side.contains(&width) || !side.contains(&height) {
            return Err(SearchError::InvalidBoard { width, height });
        }
        Ok(Self { width, height })
    }

    #[inline]
    pub fn width(&self) -> i64 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i64 {
        self.height
    }

    #[inline]
    pub fn cells(&self) -> i64 {
        self.width * self.height
    }

    #[inline]
    pub fn contains(&self, c: Cell) -> bool {
        (0..self.width).contains(&c.x) && (0..self.height).contains(&c.y)
    }

    /// Truncate to the grid (floor) and clamp into `[0, width) × [0, height)`.
    pub fn snap(&self, p: Vector2<f64>) -> Cell {
        let x = (p.x.floor() as i64).clamp(0, self.width - 1);
        let y = (p.y.floor() as i64).clamp(0, self.height - 1);
        Cell { x, y }
    }

    pub fn check_cell(&self, c: Cell) -> Result<Cell, SearchError> {
        if self.contains(c) {
            Ok(c)
        } else {
            Err(SearchError::OutsideBoard {
                cell: c,
                board: *self,
            })
        }
    }
}

/// Integer grid cell, the unit the protocol speaks in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub x: i64,
    pub y: i64,
}

impl Cell {
    #[inline]
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn to_vec2(self) -> Vector2<f64> {
        Vector2::new(self.x as f64, self.y as f64)
    }

    /// Squared distance; exact for any two cells of one board.
    #[inline]
    pub fn dist2(self, other: Cell) -> i64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.x, self.y)
    }
}

/// Relative-distance feedback for the latest probe versus the previous one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Clue {
    Warmer,
    Colder,
    Same,
    /// Sent once before the first probe.
    Unknown,
}

impl Clue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Clue::Warmer => "WARMER",
            Clue::Colder => "COLDER",
            Clue::Same => "SAME",
            Clue::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Clue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseClueError {
    pub token: String,
}

impl fmt::Display for ParseClueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unrecognized clue {:?} (expected WARMER, COLDER, SAME or UNKNOWN)",
            self.token
        )
    }
}

impl std::error::Error for ParseClueError {}

impl FromStr for Clue {
    type Err = ParseClueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "WARMER" => Ok(Clue::Warmer),
            "COLDER" => Ok(Clue::Colder),
            "SAME" => Ok(Clue::Same),
            "UNKNOWN" => Ok(Clue::Unknown),
            other => Err(ParseClueError {
                token: other.to_string(),
            }),
        }
    }
}

/// Why a round left the candidate region untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Equidistant probes: the target is on the bisector, which a region
    /// cannot represent. Known gap, see DESIGN.md.
    SameClue,
    /// No clue information this round (`UNKNOWN`).
    UnknownClue,
    /// The probe did not move, so there is no bisector.
    NoMovement,
    /// The bisector missed the region or only touched it.
    NoSplit,
    /// Axis search: a repositioning move whose clue carries no new information.
    Aligning,
    /// Axis search: both coordinates already pinned.
    Resolved,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::SameClue => "same_clue",
            SkipReason::UnknownClue => "unknown_clue",
            SkipReason::NoMovement => "no_movement",
            SkipReason::NoSplit => "no_split",
            SkipReason::Aligning => "aligning",
            SkipReason::Resolved => "resolved",
        }
    }
}

/// What a clue did to the candidate set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RoundOutcome {
    /// The candidate set shrank; `area` is what remains (polygon area for the
    /// bisection search, cell count for the axis search).
    Narrowed { area: f64 },
    Skipped(SkipReason),
}

/// Errors surfaced by the search strategies.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchError {
    InvalidBoard { width: i64, height: i64 },
    OutsideBoard { cell: Cell, board: Board },
    /// Internal consistency failure from the geometry layer (fatal).
    Geometry(GeomError),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::InvalidBoard { width, height } => {
                write!(
                    f,
                    "board sides must be between 1 and {}, got {width}x{height}",
                    Board::MAX_SIDE
                )
            }
            SearchError::OutsideBoard { cell, board } => write!(
                f,
                "cell ({cell}) lies outside the {}x{} board",
                board.width, board.height
            ),
            SearchError::Geometry(e) => write!(f, "geometry invariant violated: {e}"),
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SearchError::Geometry(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GeomError> for SearchError {
    fn from(e: GeomError) -> Self {
        SearchError::Geometry(e)
    }
}
