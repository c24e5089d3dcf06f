//! Line protocol spoken with the judge on stdin/stdout.
//!
//! Input: `width height`, the turn budget, `x y` of the start cell and one
//! clue line (`UNKNOWN`). Then, per turn, we write `x y` and read one clue.
//! End of input after the header ends the session cleanly.

use std::fmt;
use std::io::{self, BufRead, Write};

use shadows::search::{Board, Cell, Clue, ParseClueError, RoundOutcome, SearchError, Strategy};
use tracing::{debug, info};

#[derive(Debug)]
pub enum ProtocolError {
    Io(io::Error),
    /// Input ended inside the header.
    Truncated { expected: &'static str },
    Malformed {
        line: usize,
        expected: &'static str,
        got: String,
    },
    Clue { line: usize, source: ParseClueError },
    Search(SearchError),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Io(e) => write!(f, "i/o error: {e}"),
            ProtocolError::Truncated { expected } => {
                write!(f, "input ended while reading {expected}")
            }
            ProtocolError::Malformed {
                line,
                expected,
                got,
            } => write!(f, "line {line}: expected {expected}, got {got:?}"),
            ProtocolError::Clue { line, source } => write!(f, "line {line}: {source}"),
            ProtocolError::Search(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ProtocolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProtocolError::Io(e) => Some(e),
            ProtocolError::Clue { source, .. } => Some(source),
            ProtocolError::Search(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ProtocolError {
    fn from(e: io::Error) -> Self {
        ProtocolError::Io(e)
    }
}

impl From<SearchError> for ProtocolError {
    fn from(e: SearchError) -> Self {
        ProtocolError::Search(e)
    }
}

/// Board, budget and start position from the first three lines.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Header {
    pub board: Board,
    pub turns: u32,
    pub start: Cell,
}

/// How a session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionEnd {
    pub probes: u32,
    /// Input ran out before the budget did.
    pub eof: bool,
}

pub struct Session<R, W> {
    input: R,
    output: W,
    line: usize,
    buf: String,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            line: 0,
            buf: String::new(),
        }
    }

    /// Next line with the newline stripped; `None` at end of input.
    fn next_line(&mut self) -> Result<Option<String>, ProtocolError> {
        self.buf.clear();
        if self.input.read_line(&mut self.buf)? == 0 {
            return Ok(None);
        }
        self.line += 1;
        Ok(Some(
            self.buf.trim_end_matches(|c| c == '\n' || c == '\r').to_string(),
        ))
    }

    fn required_line(&mut self, expected: &'static str) -> Result<(usize, String), ProtocolError> {
        match self.next_line()? {
            Some(text) => Ok((self.line, text)),
            None => Err(ProtocolError::Truncated { expected }),
        }
    }

    fn ints<const N: usize>(&mut self, expected: &'static str) -> Result<[i64; N], ProtocolError> {
        let (line, text) = self.required_line(expected)?;
        let malformed = || ProtocolError::Malformed {
            line,
            expected,
            got: text.clone(),
        };
        let mut out = [0i64; N];
        let mut fields = text.split_whitespace();
        for slot in out.iter_mut() {
            *slot = fields
                .next()
                .and_then(|f| f.parse().ok())
                .ok_or_else(malformed)?;
        }
        if fields.next().is_some() {
            return Err(malformed());
        }
        Ok(out)
    }

    /// Read the three header lines and the sentinel clue.
    pub fn read_header(&mut self) -> Result<Header, ProtocolError> {
        let [width, height] = self.ints::<2>("`width height`")?;
        let board = Board::new(width, height)?;
        let [turns] = self.ints::<1>("turn budget")?;
        let turns = u32::try_from(turns).map_err(|_| ProtocolError::Malformed {
            line: self.line,
            expected: "non-negative turn budget",
            got: turns.to_string(),
        })?;
        let [x, y] = self.ints::<2>("`x y` start position")?;
        let start = board.check_cell(Cell::new(x, y))?;
        // sentinel clue before the first probe; any valid token is accepted
        let (line, text) = self.required_line("initial clue")?;
        text.parse::<Clue>()
            .map_err(|source| ProtocolError::Clue { line, source })?;
        info!(width, height, turns, %start, "header");
        Ok(Header {
            board,
            turns,
            start,
        })
    }

    /// Alternate probes and clues until the budget or the input runs out.
    pub fn run(&mut self, header: &Header, strategy: &mut Strategy) -> Result<SessionEnd, ProtocolError> {
        let mut probes = 0;
        while probes < header.turns {
            let probe = strategy.propose()?;
            writeln!(self.output, "{probe}")?;
            self.output.flush()?;
            probes += 1;

            let Some(text) = self.next_line()? else {
                debug!(probes, "input closed");
                return Ok(SessionEnd { probes, eof: true });
            };
            let clue = text
                .parse::<Clue>()
                .map_err(|source| ProtocolError::Clue {
                    line: self.line,
                    source,
                })?;
            let outcome = strategy.observe(clue)?;
            match outcome {
                RoundOutcome::Narrowed { area } => {
                    debug!(turn = probes, %probe, %clue, area, "narrowed")
                }
                RoundOutcome::Skipped(reason) => {
                    debug!(turn = probes, %probe, %clue, reason = reason.as_str(), "skipped")
                }
            }
        }
        info!(probes, "turn budget used up");
        Ok(SessionEnd { probes, eof: false })
    }
}
