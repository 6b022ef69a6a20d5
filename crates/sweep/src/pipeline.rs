//! End-to-end smoothing: estimate once, then sweep.

use lcsmooth_hmm::Method;
use lcsmooth_markov::{EstimatorConfig, TransitionMatrix, estimate_transitions};
use lcsmooth_stack::{ProbabilitySource, TemporalProbabilityStack, load_stack};
use tracing::info;

use crate::config::SweepConfig;
use crate::error::PipelineError;
use crate::sweep::{SweepResult, run};

/// The estimated matrix and the sweep output of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    matrix: TransitionMatrix,
    sweep: SweepResult,
}

impl PipelineOutput {
    /// The transition matrix every pixel was smoothed with.
    pub fn matrix(&self) -> &TransitionMatrix {
        &self.matrix
    }

    /// The sweep output.
    pub fn sweep(&self) -> &SweepResult {
        &self.sweep
    }

    /// Splits the output into its parts.
    pub fn into_parts(self) -> (TransitionMatrix, SweepResult) {
        (self.matrix, self.sweep)
    }
}

/// Estimates a transition matrix from `stack` and smooths every pixel with it.
///
/// Estimation completes before any pixel is smoothed. Nothing is returned
/// unless both stages succeed.
///
/// # Errors
///
/// Returns [`PipelineError::Estimation`] or [`PipelineError::Sweep`] naming
/// the failing stage.
pub fn smooth_stack(
    stack: &TemporalProbabilityStack,
    estimator: &EstimatorConfig,
    method: Method,
    sweep: &SweepConfig,
) -> Result<PipelineOutput, PipelineError> {
    sweep.validate()?;
    let matrix = estimate_transitions(stack, estimator)?;
    let result = run(stack, &matrix, method, sweep)?;
    info!(
        rows = stack.shape().rows,
        cols = stack.shape().cols,
        n_steps = stack.n_steps(),
        repaired = result.repaired_vectors(),
        "stack smoothed"
    );
    Ok(PipelineOutput {
        matrix,
        sweep: result,
    })
}

/// Loads per-step sources and runs [`smooth_stack`] on them.
///
/// # Errors
///
/// Returns [`PipelineError::Shape`] if the sources disagree in extent or
/// class count, before anything is estimated.
pub fn smooth_sources<S: ProbabilitySource>(
    sources: &[S],
    estimator: &EstimatorConfig,
    method: Method,
    sweep: &SweepConfig,
) -> Result<PipelineOutput, PipelineError> {
    let stack = load_stack(sources)?;
    smooth_stack(&stack, estimator, method, sweep)
}
