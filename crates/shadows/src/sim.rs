//! Local harness: a hidden target that answers probes truthfully.
//!
//! Purpose
//! - Play whole games against a `Strategy` without the judge, for tests,
//!   benches and the `simulate` subcommand.
//!
//! Model
//! - The clue for a move `last → next` compares squared integer distances to the
//!   target: closer is WARMER, farther is COLDER, equal is SAME.
//! - A game ends when a probe lands on the target or the turn budget runs out.
//! - Random games are reproducible from a replay token `(seed, index)`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::search::{Board, Cell, Clue, RoundOutcome, SearchError, Strategy};

/// Replay token for random games; `index` picks the game within a seeded batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    #[inline]
    pub fn new(seed: u64, index: u64) -> Self {
        Self { seed, index }
    }

    fn to_std_rng(self) -> StdRng {
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        StdRng::seed_from_u64(mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15))))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Game {
    pub board: Board,
    pub target: Cell,
    pub start: Cell,
    /// Number of probes allowed.
    pub turns: u32,
}

/// One probe and what the strategy made of the answer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoundRecord {
    pub turn: u32,
    pub probe: Cell,
    pub clue: Clue,
    pub outcome: RoundOutcome,
    /// Candidate area after the clue was applied.
    pub region_area: f64,
    pub target_admitted: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameOutcome {
    /// The probe on turn `turns` hit the target (0 if the start was on it).
    Found { turns: u32 },
    Exhausted,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GameReport {
    pub outcome: GameOutcome,
    pub rounds: Vec<RoundRecord>,
}

impl GameReport {
    pub fn found(&self) -> bool {
        matches!(self.outcome, GameOutcome::Found { .. })
    }
}

impl Game {
    pub fn new(board: Board, target: Cell, start: Cell, turns: u32) -> Result<Self, SearchError> {
        Ok(Self {
            board,
            target: board.check_cell(target)?,
            start: board.check_cell(start)?,
            turns,
        })
    }

    /// Uniform target; uniform start distinct from the target when the board
    /// has room for it.
    pub fn random(board: Board, turns: u32, tok: ReplayToken) -> Self {
        let mut rng = tok.to_std_rng();
        let draw = |rng: &mut StdRng| {
            Cell::new(
                rng.gen_range(0..board.width()),
                rng.gen_range(0..board.height()),
            )
        };
        let target = draw(&mut rng);
        let mut start = draw(&mut rng);
        while board.cells() > 1 && start == target {
            start = draw(&mut rng);
        }
        Self {
            board,
            target,
            start,
            turns,
        }
    }

    /// Truthful answer for the move `last → next`.
    pub fn clue(&self, last: Cell, next: Cell) -> Clue {
        use std::cmp::Ordering;
        match next.dist2(self.target).cmp(&last.dist2(self.target)) {
            Ordering::Less => Clue::Warmer,
            Ordering::Greater => Clue::Colder,
            Ordering::Equal => Clue::Same,
        }
    }

    /// Run `strategy` (already positioned at `self.start`) to the end.
    pub fn play(&self, strategy: &mut Strategy) -> Result<GameReport, SearchError> {
        let mut rounds = Vec::new();
        if self.start == self.target {
            return Ok(GameReport {
                outcome: GameOutcome::Found { turns: 0 },
                rounds,
            });
        }
        let mut here = self.start;
        for turn in 1..=self.turns {
            let probe = self.board.check_cell(strategy.propose()?)?;
            if probe == self.target {
                info!(turn, "target found");
                return Ok(GameReport {
                    outcome: GameOutcome::Found { turns: turn },
                    rounds,
                });
            }
            let clue = self.clue(here, probe);
            let outcome = strategy.observe(clue)?;
            let record = RoundRecord {
                turn,
                probe,
                clue,
                outcome,
                region_area: strategy.candidate_area(),
                target_admitted: strategy.admits(self.target),
            };
            debug!(turn, %probe, %clue, area = record.region_area, "round");
            rounds.push(record);
            here = probe;
        }
        info!(turns = self.turns, "budget exhausted");
        Ok(GameReport {
            outcome: GameOutcome::Exhausted,
            rounds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{SearchCfg, SkipReason, Strategy, StrategyKind};
    use proptest::prelude::*;

    fn run(game: &Game, kind: StrategyKind) -> GameReport {
        let mut s = Strategy::new(kind, game.board, game.start, SearchCfg::default()).unwrap();
        game.play(&mut s).unwrap()
    }

    #[test]
    fn clue_compares_squared_distances() {
        let g = Game::new(Board::new(10, 10).unwrap(), Cell::new(5, 5), Cell::new(0, 0), 10).unwrap();
        assert_eq!(g.clue(Cell::new(0, 0), Cell::new(4, 4)), Clue::Warmer);
        assert_eq!(g.clue(Cell::new(4, 4), Cell::new(0, 9)), Clue::Colder);
        // (2,5) and (8,5) are both 3 away
        assert_eq!(g.clue(Cell::new(2, 5), Cell::new(8, 5)), Clue::Same);
    }

    #[test]
    fn start_on_target_is_found_immediately() {
        let board = Board::new(4, 4).unwrap();
        let g = Game::new(board, Cell::new(1, 2), Cell::new(1, 2), 5).unwrap();
        let r = run(&g, StrategyKind::Bisection);
        assert_eq!(r.outcome, GameOutcome::Found { turns: 0 });
        assert!(r.rounds.is_empty());
    }

    #[test]
    fn opposite_corner_is_found_on_first_probe() {
        let board = Board::new(8, 8).unwrap();
        let g = Game::new(board, Cell::new(7, 7), Cell::new(0, 0), 3).unwrap();
        assert_eq!(run(&g, StrategyKind::Bisection).outcome, GameOutcome::Found { turns: 1 });
    }

    #[test]
    fn zero_budget_is_exhausted() {
        let board = Board::new(8, 8).unwrap();
        let g = Game::new(board, Cell::new(3, 3), Cell::new(0, 0), 0).unwrap();
        let r = run(&g, StrategyKind::AxisAligned);
        assert_eq!(r.outcome, GameOutcome::Exhausted);
        assert!(!r.found());
    }

    #[test]
    fn target_outside_board_is_rejected() {
        let board = Board::new(8, 8).unwrap();
        assert!(Game::new(board, Cell::new(8, 3), Cell::new(0, 0), 5).is_err());
    }

    #[test]
    fn random_games_replay() {
        let board = Board::new(30, 20).unwrap();
        let a = Game::random(board, 15, ReplayToken::new(9, 3));
        let b = Game::random(board, 15, ReplayToken::new(9, 3));
        let c = Game::random(board, 15, ReplayToken::new(9, 4));
        assert_eq!(a, b);
        assert_ne!((a.target, a.start), (c.target, c.start));
        assert!(board.contains(a.target) && board.contains(a.start));
        assert_ne!(a.target, a.start);
    }

    #[test]
    fn axis_search_finds_random_targets() {
        let board = Board::new(40, 25).unwrap();
        for index in 0..25 {
            let g = Game::random(board, 60, ReplayToken::new(1, index));
            let r = run(&g, StrategyKind::AxisAligned);
            assert!(r.found(), "{g:?}: {:?}", r.rounds.last());
            assert!(r.rounds.iter().all(|rec| rec.target_admitted));
        }
    }

    #[test]
    fn bisection_finds_random_targets() {
        let board = Board::new(60, 45).unwrap();
        for index in 0..25 {
            let g = Game::random(board, 40, ReplayToken::new(2, index));
            let r = run(&g, StrategyKind::Bisection);
            assert!(r.found(), "{g:?}: {:?}", r.rounds.last());
        }
    }

    #[test]
    fn bisection_finds_targets_on_thin_boards() {
        for (w, h) in [(37, 9973), (9973, 37), (3, 5000)] {
            let board = Board::new(w, h).unwrap();
            for index in 0..20 {
                let g = Game::random(board, 200, ReplayToken::new(6, index));
                let r = run(&g, StrategyKind::Bisection);
                assert!(r.found(), "{g:?}: {:?}", r.rounds.last());
                assert!(r.rounds.iter().all(|rec| rec.target_admitted));
            }
        }
    }

    #[test]
    fn areas_never_grow() {
        let board = Board::new(50, 50).unwrap();
        for index in 0..10 {
            let g = Game::random(board, 30, ReplayToken::new(5, index));
            let r = run(&g, StrategyKind::Bisection);
            let mut prev = board.cells() as f64;
            for rec in &r.rounds {
                assert!(rec.region_area <= prev + 1e-9);
                if let RoundOutcome::Narrowed { area } = rec.outcome {
                    assert!(area < prev);
                }
                if rec.clue == Clue::Same {
                    assert_eq!(rec.outcome, RoundOutcome::Skipped(SkipReason::SameClue));
                }
                prev = rec.region_area;
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn bisection_region_keeps_the_target(
            w in 1i64..60,
            h in 1i64..60,
            seed in any::<u64>(),
        ) {
            let board = Board::new(w, h).unwrap();
            let g = Game::random(board, 40, ReplayToken::new(seed, 0));
            let r = run(&g, StrategyKind::Bisection);
            for rec in &r.rounds {
                prop_assert!(rec.target_admitted, "{:?} lost the target at {:?}", g, rec);
            }
        }
    }
}
