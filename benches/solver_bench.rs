//! Benchmarks for matrix construction and solving.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use subgame_solver::game::StrategySpace;
use subgame_solver::{Analysis, Conditioning, Configuration, EquilibriumSolver, PayoffMatrix};

fn three_range_config() -> Configuration {
    Configuration::default().with_max_actions(3).with_ranges(
        vec![30.0, 40.0, 30.0],
        vec![25.0, 50.0, 25.0],
        vec![
            vec![0.5, 0.8, 0.95],
            vec![0.2, 0.5, 0.8],
            vec![0.05, 0.2, 0.5],
        ],
    )
}

fn matrix_build_benchmark(c: &mut Criterion) {
    let config = three_range_config();
    let space = StrategySpace::new(config.depth().unwrap(), 3, 3).unwrap();

    c.bench_function("matrix_build_depth3_3x3", |b| {
        b.iter(|| PayoffMatrix::build(black_box(&config), &space).unwrap())
    });
}

fn solve_benchmark(c: &mut Criterion) {
    let config = Configuration::default();
    let space = StrategySpace::new(config.depth().unwrap(), 2, 2).unwrap();
    let matrix = PayoffMatrix::build(&config, &space).unwrap();

    c.bench_function("solve_default_depth4", |b| {
        b.iter(|| {
            EquilibriumSolver::new(black_box(&matrix), config.solver.clone())
                .solve()
                .unwrap()
        })
    });
}

fn pipeline_benchmark(c: &mut Criterion) {
    let config = Configuration::default();

    c.bench_function("analysis_default_with_tree", |b| {
        b.iter(|| {
            let analysis = Analysis::run(black_box(&config)).unwrap();
            analysis.game_tree(Conditioning::none(), 0.001).unwrap()
        })
    });
}

criterion_group!(benches, matrix_build_benchmark, solve_benchmark, pipeline_benchmark);
criterion_main!(benches);
