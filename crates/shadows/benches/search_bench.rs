//! Criterion benchmarks for polygon slicing and whole simulated games.
//! Focus sizes: vertex counts {4, 8, 16, 32}; boards {40, 1000, 8000} per side.
//! Results land under target/criterion.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use nalgebra::Vector2;
use rand::{rngs::StdRng, Rng, SeedableRng};
use shadows::geom2::{GeomCfg, Polygon};
use shadows::search::{Board, SearchCfg, Strategy, StrategyKind};
use shadows::sim::{Game, ReplayToken};

fn random_convex(n: usize, seed: u64) -> Polygon {
    let mut rng = StdRng::seed_from_u64(seed);
    let step = std::f64::consts::TAU / n as f64;
    let verts = (0..n)
        .map(|k| {
            let th = (k as f64 + rng.gen_range(0.0..0.4)) * step;
            Vector2::new(500.0 + 400.0 * th.cos(), 500.0 + 400.0 * th.sin())
        })
        .collect();
    Polygon::new(verts).expect("n >= 3")
}

fn bench_slice(c: &mut Criterion) {
    let cfg = GeomCfg::default();
    let mut group = c.benchmark_group("slice");
    for &n in &[4usize, 8, 16, 32] {
        group.bench_with_input(BenchmarkId::new("through_pivot", n), &n, |b, &n| {
            b.iter_batched(
                || random_convex(n, 41),
                |poly| {
                    let p = poly.average_vertex();
                    let _s = poly.slice(p, p + Vector2::new(0.3, 1.0), &cfg).unwrap();
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_game(c: &mut Criterion) {
    let mut group = c.benchmark_group("game");
    for &side in &[40i64, 1000, 8000] {
        let board = Board::new(side, side).unwrap();
        for kind in [StrategyKind::Bisection, StrategyKind::AxisAligned] {
            group.bench_with_input(BenchmarkId::new(kind.as_str(), side), &board, |b, &board| {
                let mut index = 0;
                b.iter_batched(
                    || {
                        index += 1;
                        Game::random(board, 60, ReplayToken::new(7, index))
                    },
                    |game| {
                        let mut s =
                            Strategy::new(kind, game.board, game.start, SearchCfg::default())
                                .unwrap();
                        let _r = game.play(&mut s).unwrap();
                    },
                    BatchSize::SmallInput,
                )
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_slice, bench_game);
criterion_main!(benches);
