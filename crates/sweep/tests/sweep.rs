use std::num::NonZeroUsize;
use std::time::Duration;

use approx::assert_abs_diff_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use lcsmooth_hmm::{Method, smooth};
use lcsmooth_markov::{EstimatorConfig, TransitionMatrix, estimate_transitions};
use lcsmooth_stack::{GridShape, PixelCoord, ProbabilityGrid, TemporalProbabilityStack};
use lcsmooth_sweep::{
    CancellationToken, Concurrency, PipelineError, SweepConfig, SweepError, run, smooth_stack,
};

/// Builds a random stack of normalised class-probability vectors.
fn random_stack(
    rows: usize,
    cols: usize,
    n_steps: usize,
    n_classes: usize,
    seed: u64,
) -> TemporalProbabilityStack {
    let mut rng = StdRng::seed_from_u64(seed);
    let shape = GridShape::new(rows, cols);
    let grids = (0..n_steps)
        .map(|_| {
            let mut values = Vec::with_capacity(shape.n_pixels() * n_classes);
            for _ in 0..shape.n_pixels() {
                let raw: Vec<f64> = (0..n_classes)
                    .map(|_| rng.random_range(0.01..1.0))
                    .collect();
                let s: f64 = raw.iter().sum();
                values.extend(raw.iter().map(|v| v / s));
            }
            ProbabilityGrid::from_values(shape, n_classes, values).unwrap()
        })
        .collect();
    TemporalProbabilityStack::from_grids(grids).unwrap()
}

/// Returns a copy of `stack` with one value of one pixel overwritten.
fn poisoned(
    stack: &TemporalProbabilityStack,
    step: usize,
    pixel: usize,
    value: f64,
) -> TemporalProbabilityStack {
    let mut grids = stack.grids().to_vec();
    grids[step].pixel_mut(pixel)[0] = value;
    TemporalProbabilityStack::from_grids(grids).unwrap()
}

fn matrix_for(stack: &TemporalProbabilityStack) -> TransitionMatrix {
    estimate_transitions(stack, &EstimatorConfig::new()).unwrap()
}

// ---------------------------------------------------------------------------
// 1. Determinism across concurrency settings
// ---------------------------------------------------------------------------
#[test]
fn output_identical_for_every_concurrency() {
    let stack = random_stack(37, 11, 6, 4, 3);
    let m = matrix_for(&stack);

    for method in Method::ALL {
        let sequential = SweepConfig::new()
            .with_concurrency(Concurrency::Sequential)
            .with_block_rows(5);
        let reference = run(&stack, &m, method, &sequential).unwrap();

        for concurrency in [
            Concurrency::All,
            Concurrency::Workers(NonZeroUsize::new(2).unwrap()),
            Concurrency::Workers(NonZeroUsize::new(7).unwrap()),
        ] {
            for block_rows in [1, 4, 64] {
                let cfg = SweepConfig::new()
                    .with_concurrency(concurrency)
                    .with_block_rows(block_rows);
                let out = run(&stack, &m, method, &cfg).unwrap();
                assert_eq!(
                    out.smoothed(),
                    reference.smoothed(),
                    "{method} with {concurrency:?}, {block_rows} rows per block"
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// 2. Output shape and per-pixel agreement with the engine
// ---------------------------------------------------------------------------
#[test]
fn output_matches_engine_per_pixel() {
    let stack = random_stack(6, 9, 5, 3, 9);
    let m = matrix_for(&stack);
    let out = run(&stack, &m, Method::ForwardBackward, &SweepConfig::new()).unwrap();
    let smoothed = out.smoothed();

    assert_eq!(smoothed.shape(), stack.shape());
    assert_eq!(smoothed.n_classes(), stack.n_classes());
    assert_eq!(smoothed.n_steps(), stack.n_steps());

    for coord in [
        PixelCoord::new(0, 0),
        PixelCoord::new(3, 4),
        PixelCoord::new(5, 8),
    ] {
        let series = stack.pixel_series(coord).unwrap();
        let expected = smooth(&series, &m, Method::ForwardBackward).unwrap();
        let got = smoothed.as_stack().pixel_series(coord).unwrap();
        for t in 0..stack.n_steps() {
            for (a, b) in got.step(t).iter().zip(expected.step(t)) {
                assert_abs_diff_eq!(*a, *b, epsilon = 1e-15);
            }
        }
    }
}

#[test]
fn every_output_vector_sums_to_one() {
    let stack = random_stack(10, 10, 8, 5, 21);
    let m = matrix_for(&stack);
    let out = run(&stack, &m, Method::Forward, &SweepConfig::new()).unwrap();
    for grid in out.smoothed().as_stack().grids() {
        for idx in 0..grid.shape().n_pixels() {
            let s: f64 = grid.pixel(idx).iter().sum();
            assert_abs_diff_eq!(s, 1.0, epsilon = 1e-9);
        }
    }
}

// ---------------------------------------------------------------------------
// 3. Failure policy
// ---------------------------------------------------------------------------
#[test]
fn fail_fast_reports_block_rows() {
    let stack = random_stack(12, 4, 4, 2, 5);
    let m = matrix_for(&stack);
    // Pixel 21 lives in row 5, i.e. the second 4-row block.
    let bad = poisoned(&stack, 2, 21, f64::NAN);
    let cfg = SweepConfig::new().with_block_rows(4);

    match run(&bad, &m, Method::ForwardBackward, &cfg) {
        Err(SweepError::WorkerFailure { rows, .. }) => assert_eq!(rows, 4..8),
        other => panic!("expected WorkerFailure, got {other:?}"),
    }
}

#[test]
fn lenient_keeps_input_for_failing_block() {
    let stack = random_stack(12, 4, 4, 2, 5);
    let m = matrix_for(&stack);
    let bad = poisoned(&stack, 2, 21, f64::NAN);
    let cfg = SweepConfig::new().with_block_rows(4).with_lenient(true);

    let out = run(&bad, &m, Method::ForwardBackward, &cfg).unwrap();
    let substituted = out.substituted_blocks();
    assert_eq!(substituted.len(), 1);
    assert_eq!(substituted[0], 4..8);

    let smoothed = out.smoothed().as_stack();
    // Unaffected pixel in the same block keeps its raw input.
    assert_eq!(
        smoothed.grid(0).unwrap().pixel(20),
        bad.grid(0).unwrap().pixel(20)
    );
    // Pixels of other blocks are smoothed normally.
    let clean = run(&stack, &m, Method::ForwardBackward, &cfg).unwrap();
    assert_eq!(
        smoothed.grid(1).unwrap().pixel(0),
        clean.smoothed().grid(1).unwrap().pixel(0)
    );
}

#[test]
fn zero_pixel_is_repaired_not_failed() {
    let stack = random_stack(4, 4, 3, 2, 8);
    let mut grids = stack.grids().to_vec();
    grids[1].pixel_mut(5).fill(0.0);
    let stack = TemporalProbabilityStack::from_grids(grids).unwrap();
    let m = matrix_for(&stack);

    let out = run(&stack, &m, Method::ForwardBackward, &SweepConfig::new()).unwrap();
    assert!(out.repaired_vectors() >= 1);
    assert!(out.substituted_blocks().is_empty());
}

// ---------------------------------------------------------------------------
// 4. Cancellation and timeout
// ---------------------------------------------------------------------------
#[test]
fn cancelled_sweep_produces_nothing() {
    let stack = random_stack(8, 8, 3, 3, 2);
    let m = matrix_for(&stack);
    let token = CancellationToken::new();
    token.cancel();
    let cfg = SweepConfig::new().with_cancellation(token);
    assert_eq!(
        run(&stack, &m, Method::ForwardBackward, &cfg),
        Err(SweepError::Cancelled)
    );
}

#[test]
fn expired_deadline_times_out() {
    let stack = random_stack(8, 8, 3, 3, 2);
    let m = matrix_for(&stack);
    let cfg = SweepConfig::new()
        .with_concurrency(Concurrency::Sequential)
        .with_timeout(Duration::ZERO);
    assert_eq!(
        run(&stack, &m, Method::ForwardBackward, &cfg),
        Err(SweepError::TimedOut {
            timeout: Duration::ZERO
        })
    );
}

#[test]
fn maximal_timeout_from_config_completes() {
    let stack = random_stack(6, 5, 3, 2, 12);
    let m = matrix_for(&stack);
    let timeout = Duration::from_secs(u64::MAX);
    let bounded = SweepConfig::new().with_timeout(timeout);
    let out = run(&stack, &m, Method::ForwardBackward, &bounded).unwrap();
    let free = run(&stack, &m, Method::ForwardBackward, &SweepConfig::new()).unwrap();
    assert_eq!(out.smoothed(), free.smoothed());
}

// ---------------------------------------------------------------------------
// 5. Pipeline stages
// ---------------------------------------------------------------------------
#[test]
fn pipeline_reports_estimation_stage() {
    let stack = random_stack(3, 3, 1, 2, 4);
    let err = smooth_stack(
        &stack,
        &EstimatorConfig::new(),
        Method::ForwardBackward,
        &SweepConfig::new(),
    )
    .unwrap_err();
    assert!(matches!(err, PipelineError::Estimation(_)));
    assert!(err.to_string().starts_with("estimation stage: "));
}

#[test]
fn pipeline_reports_sweep_stage() {
    let stack = random_stack(3, 3, 3, 2, 4);
    let bad = poisoned(&stack, 0, 0, f64::NAN);
    let err = smooth_stack(
        &bad,
        &EstimatorConfig::new(),
        Method::ForwardBackward,
        &SweepConfig::new(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Sweep(SweepError::WorkerFailure { .. })
    ));
}

#[test]
fn pipeline_returns_matrix_used() {
    let stack = random_stack(5, 5, 4, 3, 6);
    let out = smooth_stack(
        &stack,
        &EstimatorConfig::new(),
        Method::ForwardBackward,
        &SweepConfig::new(),
    )
    .unwrap();
    assert_eq!(out.matrix(), &matrix_for(&stack));
    assert!(out.matrix().validate().is_ok());
}
