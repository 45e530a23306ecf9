// ========================================================================================
//
//                   Post-Test Probability Sweep Benchmark
//
// ========================================================================================
//
// Measures the odds-form update across a grid of pre-test probabilities and likelihood
// ratios, and the cost of a full guided calculation through the workflow controller.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use cogni::bayes::{compute_both, post_test_probability};
use cogni::{LikelihoodRatios, LrKind, WorkflowController};

// --- Benchmark Tuning Parameters ---

/// Number of evenly spaced pre-test probabilities in the open interval (0, 1).
const PROBABILITY_STEPS: usize = 999;
/// Likelihood ratios spanning strongly negative to strongly positive evidence.
const LIKELIHOOD_RATIOS: [f64; 6] = [0.05, 0.1, 0.2, 4.2, 7.1, 20.0];

fn probability_grid() -> Vec<f64> {
    (1..=PROBABILITY_STEPS)
        .map(|i| i as f64 / (PROBABILITY_STEPS + 1) as f64)
        .collect()
}

fn bench_single_update(c: &mut Criterion) {
    let grid = probability_grid();
    let mut group = c.benchmark_group("post_test_probability");
    group.throughput(Throughput::Elements(grid.len() as u64));

    for lr in LIKELIHOOD_RATIOS {
        group.bench_with_input(BenchmarkId::from_parameter(lr), &lr, |b, &lr| {
            b.iter(|| {
                grid.iter()
                    .map(|&p| post_test_probability(black_box(p), black_box(lr)))
                    .sum::<f64>()
            })
        });
    }
    group.finish();
}

fn bench_both_branches(c: &mut Criterion) {
    let grid = probability_grid();
    let ratios = LikelihoodRatios {
        positive: 7.1,
        negative: 0.1,
    };
    c.bench_function("compute_both", |b| {
        b.iter(|| {
            grid.iter()
                .map(|&p| compute_both(black_box(p), black_box(ratios)).positive_change)
                .sum::<f64>()
        })
    });
}

fn bench_guided_session(c: &mut Criterion) {
    c.bench_function("guided_session_with_edit", |b| {
        b.iter(|| {
            let mut controller = WorkflowController::new();
            controller.submit_age(black_box(70)).ok();
            controller.adjust_probability(black_box(30.0)).ok();
            controller.advance().ok();
            controller.calculate(black_box("Plasma pTau217")).ok();
            controller
                .edit_likelihood_ratio(LrKind::Positive, black_box("10"))
                .map(|result| result.positive_probability())
                .ok()
        })
    });
}

criterion_group!(benches, bench_single_update, bench_both_branches, bench_guided_session);
criterion_main!(benches);
