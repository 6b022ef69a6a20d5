//! Transition matrix estimation from a class-probability stack.

use lcsmooth_stack::TemporalProbabilityStack;
use tracing::debug;

use crate::config::EstimatorConfig;
use crate::error::MarkovError;

/// Row-sum tolerance used by [`TransitionMatrix::validate`].
pub const STOCHASTIC_TOLERANCE: f64 = 1e-6;

/// A C×C row-stochastic transition matrix.
///
/// Entry `(i, j)` is the probability of class `j` at step `t + 1` given
/// class `i` at step `t`. Stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionMatrix {
    n_classes: usize,
    probs: Vec<f64>,
}

impl TransitionMatrix {
    /// Builds a matrix from explicit rows and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`MarkovError`] if the rows are not square, contain
    /// non-finite or negative entries, or do not each sum to one.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, MarkovError> {
        let n = rows.len();
        let mut probs = Vec::with_capacity(n * n);
        for row in rows {
            if row.len() != n {
                return Err(MarkovError::DimensionMismatch {
                    expected: n,
                    rows: n,
                    cols: row.len(),
                });
            }
            probs.extend_from_slice(row);
        }
        let tm = Self::from_probs(n, probs);
        tm.validate()?;
        Ok(tm)
    }

    /// Constructs a matrix directly from a row-major buffer of `n * n` values.
    pub(crate) fn from_probs(n_classes: usize, probs: Vec<f64>) -> Self {
        debug_assert_eq!(probs.len(), n_classes * n_classes);
        Self { n_classes, probs }
    }

    /// A matrix whose every row is uniform.
    pub fn uniform(n_classes: usize) -> Self {
        let p = 1.0 / n_classes.max(1) as f64;
        Self::from_probs(n_classes, vec![p; n_classes * n_classes])
    }

    /// Number of classes (rows and columns).
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Transition probabilities out of class `from`.
    ///
    /// # Panics
    ///
    /// Panics if `from >= n_classes()`.
    pub fn row(&self, from: usize) -> &[f64] {
        &self.probs[from * self.n_classes..(from + 1) * self.n_classes]
    }

    /// Probability of moving from class `from` to class `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn prob(&self, from: usize, to: usize) -> f64 {
        self.probs[from * self.n_classes + to]
    }

    /// Row-major buffer of all probabilities.
    pub fn probs(&self) -> &[f64] {
        &self.probs
    }

    /// Copies the matrix into a vector of rows.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.probs
            .chunks_exact(self.n_classes)
            .map(<[f64]>::to_vec)
            .collect()
    }

    /// Validates that the matrix is row-stochastic.
    ///
    /// Checks that all values are finite and non-negative and that each row
    /// sums to 1.0 within [`STOCHASTIC_TOLERANCE`].
    pub fn validate(&self) -> Result<(), MarkovError> {
        for i in 0..self.n_classes {
            let mut sum = 0.0;
            for (j, &p) in self.row(i).iter().enumerate() {
                if !p.is_finite() || p < 0.0 {
                    return Err(MarkovError::InvalidEntry {
                        row: i,
                        col: j,
                        value: p,
                    });
                }
                sum += p;
            }
            if (sum - 1.0).abs() > STOCHASTIC_TOLERANCE {
                return Err(MarkovError::NotStochastic { row: i, sum });
            }
        }
        Ok(())
    }

    /// Row vector times matrix: `out[j] = Σ_i v[i] * A[i][j]`.
    ///
    /// Propagates a belief one step forward in time.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `v` or `out` is not `n_classes` long.
    pub fn vec_mul(&self, v: &[f64], out: &mut [f64]) {
        debug_assert_eq!(v.len(), self.n_classes);
        debug_assert_eq!(out.len(), self.n_classes);
        out.fill(0.0);
        for (vi, row) in v.iter().zip(self.probs.chunks_exact(self.n_classes)) {
            for (o, &a) in out.iter_mut().zip(row) {
                *o += vi * a;
            }
        }
    }

    /// Matrix times column vector: `out[i] = Σ_j A[i][j] * v[j]`.
    ///
    /// Pulls a message one step backward in time.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `v` or `out` is not `n_classes` long.
    pub fn mul_vec(&self, v: &[f64], out: &mut [f64]) {
        debug_assert_eq!(v.len(), self.n_classes);
        debug_assert_eq!(out.len(), self.n_classes);
        for (o, row) in out.iter_mut().zip(self.probs.chunks_exact(self.n_classes)) {
            *o = row.iter().zip(v).map(|(a, b)| a * b).sum();
        }
    }
}

/// Normalises every row in-place. Rows with no mass become uniform.
///
/// Returns the number of rows that were replaced.
pub(crate) fn normalize_rows(n_classes: usize, probs: &mut [f64]) -> usize {
    let uniform = 1.0 / n_classes as f64;
    let mut n_zero = 0;
    for row in probs.chunks_exact_mut(n_classes) {
        let s: f64 = row.iter().sum();
        if s > 0.0 && s.is_finite() {
            for p in row.iter_mut() {
                *p /= s;
            }
        } else {
            row.fill(uniform);
            n_zero += 1;
        }
    }
    n_zero
}

/// Checks that the stack has at least one consecutive pair and two classes.
fn check_degenerate(stack: &TemporalProbabilityStack) -> Result<(), MarkovError> {
    if stack.n_steps() < 2 || stack.n_classes() < 2 {
        return Err(MarkovError::DegenerateStack {
            n_steps: stack.n_steps(),
            n_classes: stack.n_classes(),
        });
    }
    Ok(())
}

/// Estimates the purely empirical transition matrix of a stack.
///
/// For every sampled pixel and every consecutive pair of steps `(t, t+1)`,
/// the outer product of the two (normalised) probability vectors is added
/// to a C×C accumulator. Each pair therefore casts a fractional vote for
/// every `(i, j)` transition. Rows are then normalised; a row with no mass
/// becomes uniform. Vectors with zero mass are skipped.
///
/// `sample_stride` selects every k-th pixel in row-major order; 1 uses the
/// whole grid.
///
/// # Errors
///
/// - [`MarkovError::DegenerateStack`] if `T < 2` or `C < 2`.
/// - [`MarkovError::InvalidSampleStride`] if `sample_stride == 0`.
pub fn empirical_transitions(
    stack: &TemporalProbabilityStack,
    sample_stride: usize,
) -> Result<TransitionMatrix, MarkovError> {
    check_degenerate(stack)?;
    if sample_stride == 0 {
        return Err(MarkovError::InvalidSampleStride);
    }

    let n = stack.n_classes();
    let mut acc = vec![0.0_f64; n * n];
    let mut a = vec![0.0_f64; n];
    let mut b = vec![0.0_f64; n];

    for pair in stack.grids().windows(2) {
        let (from, to) = (&pair[0], &pair[1]);
        for idx in (0..stack.n_pixels()).step_by(sample_stride) {
            if !normalized_copy(from.pixel(idx), &mut a) || !normalized_copy(to.pixel(idx), &mut b)
            {
                continue;
            }
            for (ai, acc_row) in a.iter().zip(acc.chunks_exact_mut(n)) {
                if *ai == 0.0 {
                    continue;
                }
                for (cell, bj) in acc_row.iter_mut().zip(&b) {
                    *cell += ai * bj;
                }
            }
        }
    }

    let n_zero = normalize_rows(n, &mut acc);
    if n_zero > 0 {
        debug!(
            n_rows = n_zero,
            "empirical rows without observations replaced by uniform"
        );
    }
    Ok(TransitionMatrix::from_probs(n, acc))
}

/// Copies `src` into `dst` scaled to unit mass. Returns `false` if `src`
/// has no usable mass.
fn normalized_copy(src: &[f64], dst: &mut [f64]) -> bool {
    let s: f64 = src.iter().sum();
    if !(s > 0.0 && s.is_finite()) {
        return false;
    }
    for (d, &v) in dst.iter_mut().zip(src) {
        *d = v / s;
    }
    true
}

/// Estimates the transition matrix used for smoothing.
///
/// Computes the empirical matrix `M_emp` (see [`empirical_transitions`]),
/// asks the configured prior strategy for `M_prior`, and blends them:
///
/// ```text
/// M = (1 - w) * M_emp + w * M_prior
/// ```
///
/// The result is normalised row-wise once more so it stays stochastic in
/// spite of floating-point drift.
///
/// # Errors
///
/// - [`MarkovError::DegenerateStack`] if `T < 2` or `C < 2`.
/// - Any error from [`EstimatorConfig::validate`] or from the prior strategy.
#[tracing::instrument(skip_all, fields(
    n_steps = stack.n_steps(),
    n_classes = stack.n_classes(),
    prior_weight = config.prior_weight(),
))]
pub fn estimate_transitions(
    stack: &TemporalProbabilityStack,
    config: &EstimatorConfig,
) -> Result<TransitionMatrix, MarkovError> {
    config.validate()?;
    check_degenerate(stack)?;

    let n = stack.n_classes();
    let empirical = empirical_transitions(stack, config.sample_stride())?;
    let prior = config.prior().matrix(n)?;
    if prior.n_classes() != n {
        return Err(MarkovError::DimensionMismatch {
            expected: n,
            rows: prior.n_classes(),
            cols: prior.n_classes(),
        });
    }

    let w = config.prior_weight();
    let mut probs: Vec<f64> = empirical
        .probs()
        .iter()
        .zip(prior.probs())
        .map(|(e, p)| (1.0 - w) * e + w * p)
        .collect();
    normalize_rows(n, &mut probs);

    let matrix = TransitionMatrix::from_probs(n, probs);
    debug!(
        prior = config.prior().name(),
        diagonal = ?(0..n).map(|i| matrix.prob(i, i)).collect::<Vec<_>>(),
        "estimated transition matrix"
    );
    Ok(matrix)
}
