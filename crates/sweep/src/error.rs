//! Error types for the lcsmooth-sweep crate.

use std::ops::Range;
use std::time::Duration;

use lcsmooth_hmm::HmmError;
use lcsmooth_markov::MarkovError;
use lcsmooth_stack::StackError;

/// Error type for the parallel pixel sweep.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SweepError {
    /// A unit of work failed and the sweep ran in fail-fast mode.
    #[error("worker failed on rows {}..{}: {source}", rows.start, rows.end)]
    WorkerFailure {
        /// Row range of the failing unit.
        rows: Range<usize>,
        /// Engine error raised inside the unit.
        source: HmmError,
    },

    /// The transition matrix does not match the stack's class count.
    #[error("transition matrix has {matrix} classes, stack has {stack}")]
    ClassCountMismatch {
        /// Classes in the stack.
        stack: usize,
        /// Classes in the matrix.
        matrix: usize,
    },

    /// Negative concurrency other than -1.
    #[error("invalid concurrency {jobs}: expected -1, 0 or a positive worker count")]
    InvalidConcurrency {
        /// Requested value.
        jobs: i64,
    },

    /// Row blocks must be at least one row high.
    #[error("block_rows must be positive")]
    InvalidBlockRows,

    /// The worker pool could not be created.
    #[error("failed to build worker pool: {reason}")]
    ThreadPool {
        /// Message from the pool builder.
        reason: String,
    },

    /// The sweep was cancelled; no output was produced.
    #[error("sweep cancelled")]
    Cancelled,

    /// The sweep exceeded its deadline; no output was produced.
    #[error("sweep timed out after {timeout:?}")]
    TimedOut {
        /// Configured timeout.
        timeout: Duration,
    },

    /// Stack access or assembly failed.
    #[error(transparent)]
    Stack(#[from] StackError),
}

/// Error type for [`smooth_stack`](crate::smooth_stack) and
/// [`smooth_sources`](crate::smooth_sources), naming the stage that failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    /// Input grids disagree in extent or class count.
    #[error("input stage: {0}")]
    Shape(#[source] StackError),

    /// Transition matrix estimation failed.
    #[error("estimation stage: {0}")]
    Estimation(#[source] MarkovError),

    /// The per-pixel sweep failed.
    #[error("sweep stage: {0}")]
    Sweep(#[source] SweepError),
}

impl From<StackError> for PipelineError {
    fn from(e: StackError) -> Self {
        Self::Shape(e)
    }
}

impl From<MarkovError> for PipelineError {
    fn from(e: MarkovError) -> Self {
        Self::Estimation(e)
    }
}

impl From<SweepError> for PipelineError {
    fn from(e: SweepError) -> Self {
        Self::Sweep(e)
    }
}
