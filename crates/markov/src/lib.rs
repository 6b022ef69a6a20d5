//! Class transition matrices for land-cover smoothing.
//!
//! This crate estimates a single C×C row-stochastic transition matrix from a
//! whole class-probability stack and blends it with a prior matrix.
//!
//! # Pipeline
//!
//! ```text
//!  ┌───────────────────┐     ┌───────────────────┐     ┌──────────────┐
//!  │ empirical (M_emp) │────▶│  blend with prior │────▶│  row-normal  │
//!  │ outer-product sum │     │ (1-w)·M_emp+w·M_p │     │  (stochastic)│
//!  └───────────────────┘     └───────────────────┘     └──────────────┘
//! ```
//!
//! # Quick start
//!
//! ```rust
//! use lcsmooth_markov::{EstimatorConfig, estimate_transitions};
//! use lcsmooth_stack::{GridShape, ProbabilityGrid, TemporalProbabilityStack};
//!
//! let shape = GridShape::new(1, 1);
//! let grids = vec![
//!     ProbabilityGrid::from_values(shape, 2, vec![0.9, 0.1]).unwrap(),
//!     ProbabilityGrid::from_values(shape, 2, vec![0.8, 0.2]).unwrap(),
//! ];
//! let stack = TemporalProbabilityStack::from_grids(grids).unwrap();
//!
//! let config = EstimatorConfig::new().with_prior_weight(0.2);
//! let matrix = estimate_transitions(&stack, &config).unwrap();
//! assert!(matrix.validate().is_ok());
//! ```

pub mod config;
pub mod error;
pub mod prior;
pub mod transition;

pub use config::{DEFAULT_PRIOR_WEIGHT, EstimatorConfig};
pub use error::MarkovError;
pub use prior::{DEFAULT_PERSISTENCE, FixedPrior, SelfTransitionPrior, TransitionPrior};
pub use transition::{
    STOCHASTIC_TOLERANCE, TransitionMatrix, empirical_transitions, estimate_transitions,
};
