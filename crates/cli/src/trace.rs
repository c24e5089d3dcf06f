use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shadows::search::RoundOutcome;
use shadows::sim::{Game, GameOutcome, GameReport, RoundRecord};
use std::fs;
use std::path::Path;
use std::process::Command;

/// One probe of a simulated game, flattened for JSON.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RoundRow {
    pub turn: u32,
    pub probe: [i64; 2],
    pub clue: String,
    /// `narrowed` or the skip reason.
    pub outcome: String,
    pub region_area: f64,
    pub target_admitted: bool,
}

impl From<&RoundRecord> for RoundRow {
    fn from(r: &RoundRecord) -> Self {
        Self {
            turn: r.turn,
            probe: [r.probe.x, r.probe.y],
            clue: r.clue.as_str().to_string(),
            outcome: match r.outcome {
                RoundOutcome::Narrowed { .. } => "narrowed".to_string(),
                RoundOutcome::Skipped(reason) => reason.as_str().to_string(),
            },
            region_area: r.region_area,
            target_admitted: r.target_admitted,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GameTrace {
    pub index: u64,
    pub board: [i64; 2],
    pub target: [i64; 2],
    pub start: [i64; 2],
    /// Probes used when found, `null` when the budget ran out.
    pub found_in: Option<u32>,
    pub rounds: Vec<RoundRow>,
}

impl GameTrace {
    pub fn new(index: u64, game: &Game, report: &GameReport) -> Self {
        Self {
            index,
            board: [game.board.width(), game.board.height()],
            target: [game.target.x, game.target.y],
            start: [game.start.x, game.start.y],
            found_in: match report.outcome {
                GameOutcome::Found { turns } => Some(turns),
                GameOutcome::Exhausted => None,
            },
            rounds: report.rounds.iter().map(RoundRow::from).collect(),
        }
    }
}

/// Trace file: run parameters plus every game.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TraceDoc {
    pub code_rev: String,
    pub params: serde_json::Value,
    pub games: Vec<GameTrace>,
}

/// Write `doc` as pretty JSON, creating parent directories as needed.
pub fn write_trace<P: AsRef<Path>>(path: P, doc: &TraceDoc) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating trace dir {}", parent.display()))?;
        }
    }
    fs::write(path, serde_json::to_vec_pretty(doc)?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

pub fn current_git_rev() -> String {
    if let Some(from_env) = option_env!("GIT_COMMIT") {
        if !from_env.is_empty() {
            return from_env.to_string();
        }
    }
    if let Ok(env_override) = std::env::var("GIT_COMMIT") {
        if !env_override.is_empty() {
            return env_override;
        }
    }
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shadows::search::{Board, Cell, SearchCfg, Strategy, StrategyKind};
    use tempfile::tempdir;

    fn sample() -> TraceDoc {
        let board = Board::new(20, 10).unwrap();
        let game = Game::new(board, Cell::new(13, 2), Cell::new(0, 9), 30).unwrap();
        let mut s = Strategy::new(StrategyKind::AxisAligned, board, game.start, SearchCfg::default())
            .unwrap();
        let report = game.play(&mut s).unwrap();
        TraceDoc {
            code_rev: "test".to_string(),
            params: json!({"strategy": "axis"}),
            games: vec![GameTrace::new(0, &game, &report)],
        }
    }

    #[test]
    fn trace_round_trips_through_a_nested_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("trace.json");
        let doc = sample();
        write_trace(&path, &doc).unwrap();
        let parsed: TraceDoc = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn rows_flatten_records() {
        let doc = sample();
        let g = &doc.games[0];
        assert_eq!(g.target, [13, 2]);
        assert!(g.found_in.is_some());
        assert_eq!(g.rounds.len() as u32 + 1, g.found_in.unwrap());
        let first = &g.rounds[0];
        assert_eq!(first.turn, 1);
        assert!(["WARMER", "COLDER", "SAME"].contains(&first.clue.as_str()));
        assert!(g.rounds.iter().all(|r| r.target_admitted));
    }
}
