//! Configuration for the pixel sweep.

use std::num::NonZeroUsize;
use std::time::Duration;

use crate::cancel::CancellationToken;
use crate::error::SweepError;

/// Default height of a row block.
pub const DEFAULT_BLOCK_ROWS: usize = 64;

/// How many units of work may run at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Concurrency {
    /// Use every available worker thread.
    #[default]
    All,
    /// Run units one after another on the calling thread.
    Sequential,
    /// Use at most this many worker threads.
    Workers(NonZeroUsize),
}

impl Concurrency {
    /// Maps the conventional job count: `-1` uses all workers, `0` and `1`
    /// run sequentially, `N > 1` bounds the pool at `N` threads.
    ///
    /// # Errors
    ///
    /// Returns [`SweepError::InvalidConcurrency`] for values below `-1`.
    pub fn from_jobs(jobs: i64) -> Result<Self, SweepError> {
        match jobs {
            -1 => Ok(Self::All),
            0 | 1 => Ok(Self::Sequential),
            n if n > 1 => usize::try_from(n)
                .ok()
                .and_then(NonZeroUsize::new)
                .map(Self::Workers)
                .ok_or(SweepError::InvalidConcurrency { jobs }),
            _ => Err(SweepError::InvalidConcurrency { jobs }),
        }
    }
}

/// Configuration for [`run`](crate::run).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use lcsmooth_sweep::{Concurrency, SweepConfig};
///
/// let config = SweepConfig::new()
///     .with_concurrency(Concurrency::from_jobs(4).unwrap())
///     .with_block_rows(16)
///     .with_timeout(Duration::from_secs(600));
///
/// assert!(config.validate().is_ok());
/// assert!(!config.lenient());
/// ```
#[derive(Debug, Clone)]
pub struct SweepConfig {
    concurrency: Concurrency,
    block_rows: usize,
    lenient: bool,
    timeout: Option<Duration>,
    cancel: Option<CancellationToken>,
}

impl SweepConfig {
    /// Creates a new configuration with defaults.
    ///
    /// Defaults: all workers, 64-row blocks, fail-fast, no timeout.
    pub fn new() -> Self {
        Self {
            concurrency: Concurrency::All,
            block_rows: DEFAULT_BLOCK_ROWS,
            lenient: false,
            timeout: None,
            cancel: None,
        }
    }

    /// Sets the worker bound.
    pub fn with_concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sets the number of grid rows per unit of work.
    pub fn with_block_rows(mut self, rows: usize) -> Self {
        self.block_rows = rows;
        self
    }

    /// Substitutes the unsmoothed input for a failing unit instead of
    /// aborting the sweep.
    pub fn with_lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    /// Aborts the sweep once `timeout` has elapsed.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Aborts the sweep when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    // --- Accessors ---

    /// Returns the worker bound.
    pub fn concurrency(&self) -> Concurrency {
        self.concurrency
    }

    /// Returns the block height in rows.
    pub fn block_rows(&self) -> usize {
        self.block_rows
    }

    /// Returns whether lenient mode is enabled.
    pub fn lenient(&self) -> bool {
        self.lenient
    }

    /// Returns the timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the cancellation token, if any.
    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancel.as_ref()
    }

    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), SweepError> {
        if self.block_rows == 0 {
            return Err(SweepError::InvalidBlockRows);
        }
        Ok(())
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self::new()
    }
}
