//! Benchmarks for equilibrium computation.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nash_enum::games;
use nash_enum::nash::number::rational;
use nash_enum::nash::{eliminate_dominated, EnumMixedSolver, Game, IpaConfig, IpaSolver};
use num_rational::BigRational;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A bimatrix game with integer payoffs in [-10, 10].
fn random_game(rows: usize, cols: usize, seed: u64) -> Game {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut matrix = || -> Vec<Vec<BigRational>> {
        (0..rows)
            .map(|_| (0..cols).map(|_| rational(rng.gen_range(-10..=10))).collect())
            .collect()
    };
    let a = matrix();
    let b = matrix();
    Game::bimatrix(format!("random {}x{}", rows, cols), a, b).unwrap()
}

fn enumeration_benchmark(c: &mut Criterion) {
    let game = random_game(6, 6, 42);

    c.bench_function("enummixed_6x6_rational", |b| {
        let solver = EnumMixedSolver::<BigRational, _>::new();
        b.iter(|| solver.solve_detailed(black_box(&game)).unwrap().len())
    });

    c.bench_function("enummixed_6x6_float", |b| {
        let solver = EnumMixedSolver::<f64, _>::new();
        b.iter(|| solver.solve_detailed(black_box(&game)).unwrap().len())
    });
}

fn approximation_benchmark(c: &mut Criterion) {
    let game = games::three_player_matching();
    c.bench_function("ipa_three_player", |b| {
        let solver = IpaSolver::new(IpaConfig::default().with_seed(7));
        b.iter(|| solver.solve(black_box(&game)).unwrap().iterations)
    });
}

fn dominance_benchmark(c: &mut Criterion) {
    let game = random_game(12, 12, 7);
    c.bench_function("eliminate_dominated_12x12", |b| {
        b.iter(|| eliminate_dominated(black_box(&game)).unwrap().removed())
    });
}

criterion_group!(
    benches,
    enumeration_benchmark,
    approximation_benchmark,
    dominance_benchmark
);
criterion_main!(benches);
