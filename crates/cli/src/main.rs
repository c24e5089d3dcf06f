use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;
use shadows::search::{Board, Cell, MidpointRule, SearchCfg, Strategy, StrategyKind, WarmRule};
use shadows::sim::{Game, GameOutcome, ReplayToken};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

mod protocol;
mod trace;

use protocol::Session;
use trace::{current_git_rev, write_trace, GameTrace, TraceDoc};

#[derive(Parser)]
#[command(name = "shadows")]
#[command(about = "Find the hidden cell from WARMER / COLDER / SAME clues")]
#[command(version)]
struct Cmd {
    /// More log output on stderr (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Speak the judge protocol on stdin/stdout
    Play {
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Play local games against a truthful hidden target and print a JSON summary
    Simulate {
        #[arg(long)]
        width: i64,
        #[arg(long)]
        height: i64,
        /// Hidden cell as `X,Y` (random if omitted)
        #[arg(long, value_parser = parse_cell)]
        target: Option<Cell>,
        /// Start cell as `X,Y` (random if omitted)
        #[arg(long, value_parser = parse_cell)]
        start: Option<Cell>,
        #[arg(long, default_value_t = 40)]
        turns: u32,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = 1)]
        games: u64,
        /// Write every round of every game as JSON
        #[arg(long)]
        trace: Option<PathBuf>,
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Print version and default configuration as JSON
    Report,
}

#[derive(clap::Args, Clone, Copy, Debug)]
struct SearchArgs {
    #[arg(long, value_enum, default_value_t = StrategyArg::Bisection)]
    strategy: StrategyArg,
    #[arg(long, value_enum, default_value_t = MidpointArg::Exact)]
    midpoint: MidpointArg,
    #[arg(long, value_enum, default_value_t = WarmRuleArg::Side)]
    warm_rule: WarmRuleArg,
    /// Region size (in cells) below which candidates are probed directly; 0 disables
    #[arg(long, default_value_t = SearchCfg::default().endgame_cells)]
    endgame_cells: usize,
    /// Keep the plain reflection even when it cannot cut the region
    #[arg(long)]
    no_nudge: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum StrategyArg {
    Bisection,
    Axis,
}

#[derive(ValueEnum, Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum MidpointArg {
    Exact,
    Floor,
}

#[derive(ValueEnum, Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum WarmRuleArg {
    Side,
    Nearest,
}

impl SearchArgs {
    fn kind(&self) -> StrategyKind {
        match self.strategy {
            StrategyArg::Bisection => StrategyKind::Bisection,
            StrategyArg::Axis => StrategyKind::AxisAligned,
        }
    }

    fn cfg(&self) -> SearchCfg {
        SearchCfg {
            midpoint: match self.midpoint {
                MidpointArg::Exact => MidpointRule::Exact,
                MidpointArg::Floor => MidpointRule::Floor,
            },
            warm_rule: match self.warm_rule {
                WarmRuleArg::Side => WarmRule::BisectorSide,
                WarmRuleArg::Nearest => WarmRule::NearestCentroid,
            },
            nudge_on_stall: !self.no_nudge,
            endgame_cells: self.endgame_cells,
            ..SearchCfg::default()
        }
    }

    fn to_json(self) -> serde_json::Value {
        json!({
            "strategy": self.strategy,
            "midpoint": self.midpoint,
            "warm_rule": self.warm_rule,
            "endgame_cells": self.endgame_cells,
            "nudge_on_stall": !self.no_nudge,
        })
    }
}

fn parse_cell(s: &str) -> Result<Cell, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got {s:?}"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<i64>()
            .map_err(|e| format!("bad coordinate {v:?}: {e}"))
    };
    Ok(Cell::new(parse(x)?, parse(y)?))
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // stdout carries the protocol
    SubscriberBuilder::default()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    init_tracing(cmd.verbose);
    match cmd.action {
        Action::Play { search } => play(search),
        Action::Simulate {
            width,
            height,
            target,
            start,
            turns,
            seed,
            games,
            trace,
            search,
        } => {
            let board = Board::new(width, height).context("invalid board")?;
            let opts = SimOpts {
                board,
                target,
                start,
                turns,
                seed,
                games,
                search,
            };
            let (summary, traces) = simulate(&opts)?;
            if let Some(path) = trace {
                let doc = TraceDoc {
                    code_rev: current_git_rev(),
                    params: opts.to_json(),
                    games: traces,
                };
                write_trace(&path, &doc)?;
                tracing::info!(path = %path.display(), "trace written");
            }
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Action::Report => report(),
    }
}

fn play(search: SearchArgs) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut session = Session::new(stdin.lock(), stdout.lock());
    let header = session.read_header().context("reading game header")?;
    let mut strategy = Strategy::new(search.kind(), header.board, header.start, search.cfg())?;
    let end = session
        .run(&header, &mut strategy)
        .context("protocol session")?;
    tracing::info!(probes = end.probes, eof = end.eof, "session over");
    Ok(())
}

struct SimOpts {
    board: Board,
    target: Option<Cell>,
    start: Option<Cell>,
    turns: u32,
    seed: u64,
    games: u64,
    search: SearchArgs,
}

impl SimOpts {
    fn to_json(&self) -> serde_json::Value {
        json!({
            "board": [self.board.width(), self.board.height()],
            "target": self.target.map(|c| [c.x, c.y]),
            "start": self.start.map(|c| [c.x, c.y]),
            "turns": self.turns,
            "seed": self.seed,
            "games": self.games,
            "search": self.search.to_json(),
        })
    }

    fn game(&self, index: u64) -> Result<Game> {
        let drawn = Game::random(self.board, self.turns, ReplayToken::new(self.seed, index));
        let game = Game::new(
            self.board,
            self.target.unwrap_or(drawn.target),
            self.start.unwrap_or(drawn.start),
            self.turns,
        )?;
        Ok(game)
    }
}

#[derive(Debug, Serialize, PartialEq)]
struct Summary {
    strategy: &'static str,
    games: u64,
    found: u64,
    exhausted: u64,
    /// Games where the candidate set lost the target at some point.
    lost_target: u64,
    mean_turns: Option<f64>,
    max_turns: Option<u32>,
}

fn simulate(opts: &SimOpts) -> Result<(Summary, Vec<GameTrace>)> {
    if opts.games == 0 {
        bail!("--games must be at least 1");
    }
    let kind = opts.search.kind();
    let cfg = opts.search.cfg();
    let mut traces = Vec::with_capacity(opts.games as usize);
    let (mut found, mut lost, mut total, mut max) = (0u64, 0u64, 0u64, None::<u32>);
    for index in 0..opts.games {
        let game = opts.game(index)?;
        let mut strategy = Strategy::new(kind, game.board, game.start, cfg)?;
        let report = game
            .play(&mut strategy)
            .with_context(|| format!("game {index} ({:?})", game))?;
        if let GameOutcome::Found { turns } = report.outcome {
            found += 1;
            total += u64::from(turns);
            max = Some(max.map_or(turns, |m| m.max(turns)));
        }
        if report.rounds.iter().any(|r| !r.target_admitted) {
            lost += 1;
            tracing::warn!(index, "candidate set lost the target");
        }
        traces.push(GameTrace::new(index, &game, &report));
    }
    let summary = Summary {
        strategy: kind.as_str(),
        games: opts.games,
        found,
        exhausted: opts.games - found,
        lost_target: lost,
        mean_turns: (found > 0).then(|| total as f64 / found as f64),
        max_turns: max,
    };
    Ok((summary, traces))
}

fn report() -> Result<()> {
    let cfg = SearchCfg::default();
    let obj = json!({
        "name": "shadows",
        "version": shadows::VERSION,
        "code_rev": current_git_rev(),
        "defaults": {
            "strategy": StrategyKind::default().as_str(),
            "midpoint": format!("{:?}", cfg.midpoint),
            "warm_rule": format!("{:?}", cfg.warm_rule),
            "nudge_on_stall": cfg.nudge_on_stall,
            "stall_rotations": cfg.stall_rotations,
            "endgame_cells": cfg.endgame_cells,
            "geom": {
                "eps_parallel": cfg.geom.eps_parallel,
                "eps_point": cfg.geom.eps_point,
                "eps_collinear": cfg.geom.eps_collinear,
            },
        },
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
