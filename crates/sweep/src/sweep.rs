//! Parallel per-pixel smoothing over row blocks.
//!
//! Each row block is one unit of work. Units read the shared stack and
//! matrix, smooth every pixel in their rows into a private buffer and return
//! it. The buffers are collected in block order and copied into the output
//! grids by a single writer, so the result does not depend on scheduling.

use std::ops::Range;
use std::time::{Duration, Instant};

use lcsmooth_hmm::{ForwardBackward, Method};
use lcsmooth_markov::TransitionMatrix;
use lcsmooth_stack::{ProbabilityGrid, SmoothedStack, TemporalProbabilityStack};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::cancel::CancellationToken;
use crate::config::{Concurrency, SweepConfig};
use crate::error::SweepError;
use crate::partition::{pixel_range, row_blocks};

/// Output of [`run`].
#[derive(Debug, Clone, PartialEq)]
pub struct SweepResult {
    smoothed: SmoothedStack,
    repaired_vectors: usize,
    substituted_blocks: Vec<Range<usize>>,
}

impl SweepResult {
    /// The smoothed stack.
    pub fn smoothed(&self) -> &SmoothedStack {
        &self.smoothed
    }

    /// Consumes the result and returns the smoothed stack.
    pub fn into_smoothed(self) -> SmoothedStack {
        self.smoothed
    }

    /// Number of zero-mass vectors replaced by a uniform vector.
    pub fn repaired_vectors(&self) -> usize {
        self.repaired_vectors
    }

    /// Row ranges left unsmoothed in lenient mode, in ascending order.
    pub fn substituted_blocks(&self) -> &[Range<usize>] {
        &self.substituted_blocks
    }
}

/// Smoothed values of one row block, pixel-major then step-major.
struct BlockOutput {
    rows: Range<usize>,
    values: Vec<f64>,
    repairs: usize,
    substituted: bool,
}

struct Interrupt<'a> {
    cancel: Option<&'a CancellationToken>,
    deadline: Option<(Instant, Duration)>,
}

/// Deadline `timeout` from now, or `None` if it lies beyond what [`Instant`]
/// can represent.
fn deadline_after(timeout: Duration) -> Option<(Instant, Duration)> {
    Instant::now()
        .checked_add(timeout)
        .map(|deadline| (deadline, timeout))
}

impl Interrupt<'_> {
    fn check(&self) -> Result<(), SweepError> {
        if self.cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(SweepError::Cancelled);
        }
        if let Some((deadline, timeout)) = self.deadline
            && Instant::now() >= deadline
        {
            return Err(SweepError::TimedOut { timeout });
        }
        Ok(())
    }
}

/// Smooths every pixel of `stack` with `matrix`.
///
/// The grid is split into blocks of [`SweepConfig::block_rows`] rows which
/// are dispatched according to [`SweepConfig::concurrency`]. The output has
/// the extent, class count and step count of the input and is identical for
/// every concurrency setting.
///
/// In fail-fast mode (the default) the first failing block aborts the sweep
/// and its row range is reported. In lenient mode the failing block keeps
/// its unsmoothed input values and the sweep continues.
///
/// # Errors
///
/// - [`SweepError::InvalidBlockRows`] if the configuration is invalid.
/// - [`SweepError::ClassCountMismatch`] if the matrix does not fit the stack.
/// - [`SweepError::WorkerFailure`] if a block fails in fail-fast mode.
/// - [`SweepError::Cancelled`] / [`SweepError::TimedOut`] if interrupted;
///   all partial results are discarded.
/// - [`SweepError::ThreadPool`] if a bounded pool cannot be created.
#[tracing::instrument(skip_all, fields(
    rows = stack.shape().rows,
    cols = stack.shape().cols,
    n_steps = stack.n_steps(),
    method = %method,
))]
pub fn run(
    stack: &TemporalProbabilityStack,
    matrix: &TransitionMatrix,
    method: Method,
    config: &SweepConfig,
) -> Result<SweepResult, SweepError> {
    config.validate()?;
    if matrix.n_classes() != stack.n_classes() {
        return Err(SweepError::ClassCountMismatch {
            stack: stack.n_classes(),
            matrix: matrix.n_classes(),
        });
    }

    let interrupt = Interrupt {
        cancel: config.cancellation(),
        deadline: config.timeout().and_then(deadline_after),
    };
    let blocks = row_blocks(stack.shape(), config.block_rows());
    debug!(
        blocks = blocks.len(),
        block_rows = config.block_rows(),
        concurrency = ?config.concurrency(),
        "starting sweep"
    );

    let unit = |rows: &Range<usize>| {
        smooth_block(stack, matrix, method, rows, config.lenient(), &interrupt)
    };
    let outputs = dispatch(&blocks, config.concurrency(), unit)?;

    let result = assemble(stack, outputs)?;
    debug!(
        repaired = result.repaired_vectors,
        substituted = result.substituted_blocks.len(),
        "sweep finished"
    );
    Ok(result)
}

/// Runs `unit` over every block and returns the outputs in block order.
fn dispatch<F>(
    blocks: &[Range<usize>],
    concurrency: Concurrency,
    unit: F,
) -> Result<Vec<BlockOutput>, SweepError>
where
    F: Fn(&Range<usize>) -> Result<BlockOutput, SweepError> + Send + Sync,
{
    match concurrency {
        Concurrency::Sequential => blocks.iter().map(unit).collect(),
        Concurrency::All => blocks.par_iter().map(unit).collect(),
        Concurrency::Workers(n) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n.get())
                .build()
                .map_err(|e| SweepError::ThreadPool {
                    reason: e.to_string(),
                })?;
            pool.install(|| blocks.par_iter().map(unit).collect())
        }
    }
}

fn smooth_block(
    stack: &TemporalProbabilityStack,
    matrix: &TransitionMatrix,
    method: Method,
    rows: &Range<usize>,
    lenient: bool,
    interrupt: &Interrupt<'_>,
) -> Result<BlockOutput, SweepError> {
    let shape = stack.shape();
    let pixels = pixel_range(shape, rows);
    let series_len = stack.n_steps() * stack.n_classes();

    let mut values = vec![0.0; pixels.len() * series_len];
    let mut obs = vec![0.0; series_len];
    let mut fb = ForwardBackward::new(stack.n_steps(), stack.n_classes());
    let mut repairs = 0;

    for (k, idx) in pixels.clone().enumerate() {
        if k.is_multiple_of(shape.cols) {
            interrupt.check()?;
        }
        stack.pixel_series_into(idx, &mut obs)?;
        let out = &mut values[k * series_len..(k + 1) * series_len];
        match fb.smooth_into(&obs, matrix, method, out) {
            Ok(n) => repairs += n,
            Err(source) if lenient => {
                warn!(
                    rows = ?rows,
                    pixel = idx,
                    error = %source,
                    "unit failed, keeping unsmoothed values"
                );
                for (dst, idx) in values.chunks_exact_mut(series_len).zip(pixels) {
                    stack.pixel_series_into(idx, dst)?;
                }
                return Ok(BlockOutput {
                    rows: rows.clone(),
                    values,
                    repairs: 0,
                    substituted: true,
                });
            }
            Err(source) => {
                return Err(SweepError::WorkerFailure {
                    rows: rows.clone(),
                    source,
                });
            }
        }
    }

    if repairs > 0 {
        warn!(rows = ?rows, repairs, "zero-mass vectors replaced by uniform");
    }
    Ok(BlockOutput {
        rows: rows.clone(),
        values,
        repairs,
        substituted: false,
    })
}

/// Copies block outputs into fresh grids by pixel index.
fn assemble(
    stack: &TemporalProbabilityStack,
    outputs: Vec<BlockOutput>,
) -> Result<SweepResult, SweepError> {
    let shape = stack.shape();
    let n_classes = stack.n_classes();
    let series_len = stack.n_steps() * n_classes;

    let mut grids: Vec<ProbabilityGrid> = (0..stack.n_steps())
        .map(|_| ProbabilityGrid::zeros(shape, n_classes))
        .collect();
    let mut repaired_vectors = 0;
    let mut substituted_blocks = Vec::new();

    for block in outputs {
        let pixels = pixel_range(shape, &block.rows);
        for (series, idx) in block.values.chunks_exact(series_len).zip(pixels) {
            for (grid, v) in grids.iter_mut().zip(series.chunks_exact(n_classes)) {
                grid.pixel_mut(idx).copy_from_slice(v);
            }
        }
        repaired_vectors += block.repairs;
        if block.substituted {
            substituted_blocks.push(block.rows);
        }
    }

    Ok(SweepResult {
        smoothed: SmoothedStack::from_grids(grids)?,
        repaired_vectors,
        substituted_blocks,
    })
}
