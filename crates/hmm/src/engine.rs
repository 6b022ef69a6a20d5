//! Forward and forward-backward recursions over one pixel's time series.
//!
//! The observed classifier vector at each step doubles as the initial
//! belief and as the emission likelihood; no separate emission model is
//! estimated. Every message is normalised at every step, which keeps the
//! recursion in linear space without underflow over long series.

use lcsmooth_markov::TransitionMatrix;
use lcsmooth_stack::PixelTimeSeries;
use tracing::trace;

use crate::error::HmmError;
use crate::method::Method;
use crate::normalize::normalize_or_uniform;

/// Output of [`smooth`]: the smoothed series plus the number of zero-mass
/// repairs made while computing it.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothedPixelTimeSeries {
    series: PixelTimeSeries,
    repairs: usize,
}

impl SmoothedPixelTimeSeries {
    /// Number of time steps.
    pub fn n_steps(&self) -> usize {
        self.series.n_steps()
    }

    /// Number of classes.
    pub fn n_classes(&self) -> usize {
        self.series.n_classes()
    }

    /// Smoothed probabilities at step `t`.
    ///
    /// # Panics
    ///
    /// Panics if `t >= n_steps()`.
    pub fn step(&self, t: usize) -> &[f64] {
        self.series.step(t)
    }

    /// Number of vectors replaced by a uniform vector because they had no mass.
    pub fn repairs(&self) -> usize {
        self.repairs
    }

    /// Consumes the result and returns the smoothed series.
    pub fn into_series(self) -> PixelTimeSeries {
        self.series
    }
}

/// Reusable buffers for the recursion over series of a fixed shape.
///
/// A sweep creates one workspace per unit of work and calls
/// [`smooth_into`](Self::smooth_into) for every pixel.
#[derive(Debug, Clone)]
pub struct ForwardBackward {
    n_steps: usize,
    n_classes: usize,
    forward: Vec<f64>,
    backward: Vec<f64>,
    scratch: Vec<f64>,
}

impl ForwardBackward {
    /// Allocates buffers for series of `n_steps` steps over `n_classes` classes.
    pub fn new(n_steps: usize, n_classes: usize) -> Self {
        Self {
            n_steps,
            n_classes,
            forward: vec![0.0; n_steps * n_classes],
            backward: vec![0.0; n_steps * n_classes],
            scratch: vec![0.0; n_classes],
        }
    }

    /// Number of steps the buffers are sized for.
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Number of classes the buffers are sized for.
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Smooths one step-major observation buffer into `out`.
    ///
    /// Returns the number of zero-mass repairs.
    ///
    /// # Errors
    ///
    /// - [`HmmError::EmptySeries`] if the workspace was sized for zero steps.
    /// - [`HmmError::ClassCountMismatch`] if the matrix size differs from the
    ///   workspace class count.
    /// - [`HmmError::BufferLengthMismatch`] if `obs` or `out` is not
    ///   `n_steps * n_classes` long.
    /// - [`HmmError::InvalidObservation`] on a non-finite or negative value.
    pub fn smooth_into(
        &mut self,
        obs: &[f64],
        matrix: &TransitionMatrix,
        method: Method,
        out: &mut [f64],
    ) -> Result<usize, HmmError> {
        let (n_steps, n) = (self.n_steps, self.n_classes);
        if n_steps == 0 || n == 0 {
            return Err(HmmError::EmptySeries);
        }
        if matrix.n_classes() != n {
            return Err(HmmError::ClassCountMismatch {
                series: n,
                matrix: matrix.n_classes(),
            });
        }
        let expected = n_steps * n;
        for got in [obs.len(), out.len()] {
            if got != expected {
                return Err(HmmError::BufferLengthMismatch { expected, got });
            }
        }
        if let Some(pos) = obs.iter().position(|v| !v.is_finite() || *v < 0.0) {
            return Err(HmmError::InvalidObservation {
                step: pos / n,
                class: pos % n,
                value: obs[pos],
            });
        }

        let mut repairs = self.forward_pass(obs, matrix);

        if method == Method::Forward {
            out.copy_from_slice(&self.forward);
            return Ok(repairs);
        }

        repairs += self.backward_pass(obs, matrix);

        for (t, ((g, a), b)) in out
            .chunks_exact_mut(n)
            .zip(self.forward.chunks_exact(n))
            .zip(self.backward.chunks_exact(n))
            .enumerate()
        {
            for ((gi, ai), bi) in g.iter_mut().zip(a).zip(b) {
                *gi = ai * bi;
            }
            if normalize_or_uniform(g) {
                trace!(
                    step = t,
                    pass = "posterior",
                    "zero-mass vector replaced by uniform"
                );
                repairs += 1;
            }
        }
        Ok(repairs)
    }

    /// `α_0 = normalize(obs_0)`, `α_t = normalize((α_{t-1} · A) ⊙ obs_t)`.
    fn forward_pass(&mut self, obs: &[f64], matrix: &TransitionMatrix) -> usize {
        let n = self.n_classes;
        let mut repairs = 0;

        self.forward[..n].copy_from_slice(&obs[..n]);
        if normalize_or_uniform(&mut self.forward[..n]) {
            trace!(
                step = 0,
                pass = "forward",
                "zero-mass vector replaced by uniform"
            );
            repairs += 1;
        }

        for t in 1..self.n_steps {
            let (done, rest) = self.forward.split_at_mut(t * n);
            let prev = &done[(t - 1) * n..];
            let cur = &mut rest[..n];
            matrix.vec_mul(prev, &mut self.scratch);
            for ((c, p), o) in cur
                .iter_mut()
                .zip(&self.scratch)
                .zip(&obs[t * n..(t + 1) * n])
            {
                *c = p * o;
            }
            if normalize_or_uniform(cur) {
                trace!(
                    step = t,
                    pass = "forward",
                    "zero-mass vector replaced by uniform"
                );
                repairs += 1;
            }
        }
        repairs
    }

    /// `β_{T-1} = 1`, `β_t = normalize(A · (β_{t+1} ⊙ obs_{t+1}))`.
    fn backward_pass(&mut self, obs: &[f64], matrix: &TransitionMatrix) -> usize {
        let n = self.n_classes;
        let last = self.n_steps - 1;
        let mut repairs = 0;

        self.backward[last * n..].fill(1.0);

        for t in (0..last).rev() {
            let (head, tail) = self.backward.split_at_mut((t + 1) * n);
            let next = &tail[..n];
            let cur = &mut head[t * n..];
            for ((s, b), o) in self
                .scratch
                .iter_mut()
                .zip(next)
                .zip(&obs[(t + 1) * n..(t + 2) * n])
            {
                *s = b * o;
            }
            matrix.mul_vec(&self.scratch, cur);
            if normalize_or_uniform(cur) {
                trace!(
                    step = t,
                    pass = "backward",
                    "zero-mass vector replaced by uniform"
                );
                repairs += 1;
            }
        }
        repairs
    }
}

/// Smooths one pixel's class-probability series.
///
/// With [`Method::Forward`] the result at step `t` only depends on
/// observations up to `t`. With [`Method::ForwardBackward`] every step sees
/// the whole series; the last step is identical for both methods.
///
/// A vector with zero mass at any stage is replaced by a uniform vector and
/// the recursion continues; the count is reported by
/// [`SmoothedPixelTimeSeries::repairs`].
///
/// # Errors
///
/// - [`HmmError::ClassCountMismatch`] if the series and the matrix differ in
///   class count.
/// - [`HmmError::InvalidObservation`] on a non-finite or negative value.
pub fn smooth(
    series: &PixelTimeSeries,
    matrix: &TransitionMatrix,
    method: Method,
) -> Result<SmoothedPixelTimeSeries, HmmError> {
    let mut fb = ForwardBackward::new(series.n_steps(), series.n_classes());
    let mut out = vec![0.0; series.values().len()];
    let repairs = fb.smooth_into(series.values(), matrix, method, &mut out)?;
    let series = PixelTimeSeries::new(series.n_classes(), out)
        .map_err(|_| HmmError::EmptySeries)?;
    Ok(SmoothedPixelTimeSeries { series, repairs })
}
