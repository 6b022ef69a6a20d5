//! Configuration for transition matrix estimation.

use std::sync::Arc;

use crate::error::MarkovError;
use crate::prior::{SelfTransitionPrior, TransitionPrior};

/// Default blend weight of the prior matrix.
pub const DEFAULT_PRIOR_WEIGHT: f64 = 0.1;

/// Configuration for [`estimate_transitions`](crate::estimate_transitions).
///
/// Use the builder methods to customise parameters.
///
/// # Example
///
/// ```
/// use lcsmooth_markov::{EstimatorConfig, SelfTransitionPrior};
///
/// let config = EstimatorConfig::new()
///     .with_prior_weight(0.25)
///     .with_prior(SelfTransitionPrior::new(0.9).unwrap())
///     .with_sample_stride(4);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug)]
pub struct EstimatorConfig {
    prior_weight: f64,
    prior: Arc<dyn TransitionPrior>,
    sample_stride: usize,
}

impl EstimatorConfig {
    /// Creates a new configuration with defaults.
    ///
    /// Defaults: `prior_weight = 0.1`, `prior = SelfTransitionPrior(0.8)`,
    /// `sample_stride = 1`.
    pub fn new() -> Self {
        Self {
            prior_weight: DEFAULT_PRIOR_WEIGHT,
            prior: Arc::new(SelfTransitionPrior::default()),
            sample_stride: 1,
        }
    }

    /// Sets the blend weight of the prior matrix (0 = purely empirical,
    /// 1 = purely prior).
    pub fn with_prior_weight(mut self, weight: f64) -> Self {
        self.prior_weight = weight;
        self
    }

    /// Sets the prior strategy.
    pub fn with_prior(mut self, prior: impl TransitionPrior + 'static) -> Self {
        self.prior = Arc::new(prior);
        self
    }

    /// Estimates from every `stride`-th pixel only.
    pub fn with_sample_stride(mut self, stride: usize) -> Self {
        self.sample_stride = stride;
        self
    }

    // --- Accessors ---

    /// Returns the blend weight of the prior matrix.
    pub fn prior_weight(&self) -> f64 {
        self.prior_weight
    }

    /// Returns the prior strategy.
    pub fn prior(&self) -> &dyn TransitionPrior {
        self.prior.as_ref()
    }

    /// Returns the pixel sample stride.
    pub fn sample_stride(&self) -> usize {
        self.sample_stride
    }

    /// Validates this configuration.
    ///
    /// Checks that the prior weight is finite and in `[0, 1]` and that the
    /// sample stride is positive.
    pub fn validate(&self) -> Result<(), MarkovError> {
        if !self.prior_weight.is_finite() || !(0.0..=1.0).contains(&self.prior_weight) {
            return Err(MarkovError::InvalidPriorWeight {
                weight: self.prior_weight,
            });
        }
        if self.sample_stride == 0 {
            return Err(MarkovError::InvalidSampleStride);
        }
        Ok(())
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self::new()
    }
}
