use criterion::{criterion_group, criterion_main, Criterion};
use grid_puzzles::almost_magic::{self, AlmostMagic};
use grid_puzzles::block_party::{self, BlockParty};
use grid_puzzles::hooks::{self, Hooks};
use grid_puzzles::knights::{self, Knights};
use grid_puzzles::model::{Model, SearchLimit, Term};
use grid_puzzles::twenty_four_seven::{self, TwentyFourSeven};
use std::hint::black_box;
use std::time::Duration;

fn bench_examples(c: &mut Criterion) {
    let hooks = Hooks::example();
    c.bench_function("hooks - 5x5 example", |b| {
        b.iter(|| {
            let sol = hooks::find_solutions(&hooks, SearchLimit::First).unwrap();
            black_box(sol);
        })
    });

    let knights = Knights::example();
    c.bench_function("knights - 5x5 example", |b| {
        b.iter(|| {
            let sol = knights::find_solutions(&knights, SearchLimit::First).unwrap();
            black_box(sol);
        })
    });

    let block_party = BlockParty::example();
    c.bench_function("block party - 5x5 example", |b| {
        b.iter(|| {
            let sol = block_party::find_solutions(&block_party, SearchLimit::All).unwrap();
            black_box(sol);
        })
    });
}

fn bench_twenty_four_seven(c: &mut Criterion) {
    let mut group = c.benchmark_group("24/7");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(30));

    let puzzle = TwentyFourSeven::default();
    group.bench_function("unclued - first", |b| {
        b.iter(|| {
            let sol = twenty_four_seven::find_solutions(&puzzle, SearchLimit::First).unwrap();
            black_box(sol);
        })
    });
    group.finish();
}

/// The unconstrained optimum: two catalogue searches, the second proving 470.
fn bench_almost_magic(c: &mut Criterion) {
    let mut group = c.benchmark_group("almost magic");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(60));

    let puzzle = AlmostMagic::default();
    group.bench_function("unconstrained - optimum", |b| {
        b.iter(|| {
            let sol = almost_magic::find_optimum(&puzzle).unwrap();
            assert_eq!(almost_magic::total(sol.first().unwrap()).unwrap(), 470);
            black_box(sol);
        })
    });
    group.finish();
}

/// Building and solving a bare sum: 20 digits 0..=9 totalling exactly 90.
fn bench_sum_encoding(c: &mut Criterion) {
    c.bench_function("sum - 20 digits to 90", |b| {
        b.iter(|| {
            let mut model = Model::new();
            let terms: Vec<Term> = (0..20)
                .map(|_| {
                    let lits = model.new_bools(10);
                    model.exactly_one(&lits);
                    Term::one_hot(&lits, |i| i as u32)
                })
                .collect();
            model.sum(&terms, 90..=90);
            let sol = model.solve().unwrap();
            black_box(sol);
        })
    });
}

criterion_group!(
    benches,
    bench_examples,
    bench_twenty_four_seven,
    bench_almost_magic,
    bench_sum_encoding
);

criterion_main!(benches);
