//! Parallel per-pixel smoothing of a class-probability stack.
//!
//! [`run`] fans the forward-backward engine out over row blocks of the grid
//! with rayon and reassembles the results by index. [`smooth_stack`] chains
//! transition estimation and the sweep.
//!
//! ```text
//!  stack ──▶ estimate_transitions ──▶ matrix
//!    │                                  │
//!    └──────────▶ row blocks ◀──────────┘
//!                 │  │  │   (parallel, read-only inputs)
//!                 ▼  ▼  ▼
//!               assemble by index ──▶ SmoothedStack
//! ```
//!
//! # Quick start
//!
//! ```rust
//! use lcsmooth_hmm::Method;
//! use lcsmooth_markov::EstimatorConfig;
//! use lcsmooth_stack::{GridShape, ProbabilityGrid, TemporalProbabilityStack};
//! use lcsmooth_sweep::{SweepConfig, smooth_stack};
//!
//! let shape = GridShape::new(2, 2);
//! let grids = vec![
//!     ProbabilityGrid::from_values(shape, 2, vec![0.9, 0.1, 0.8, 0.2, 0.1, 0.9, 0.6, 0.4]).unwrap(),
//!     ProbabilityGrid::from_values(shape, 2, vec![0.5, 0.5, 0.7, 0.3, 0.2, 0.8, 0.5, 0.5]).unwrap(),
//! ];
//! let stack = TemporalProbabilityStack::from_grids(grids).unwrap();
//!
//! let out = smooth_stack(
//!     &stack,
//!     &EstimatorConfig::new(),
//!     Method::ForwardBackward,
//!     &SweepConfig::new(),
//! )
//! .unwrap();
//! assert_eq!(out.sweep().smoothed().shape(), shape);
//! ```

pub mod cancel;
pub mod config;
pub mod error;
pub mod partition;
pub mod pipeline;
pub mod sweep;

pub use cancel::CancellationToken;
pub use config::{Concurrency, DEFAULT_BLOCK_ROWS, SweepConfig};
pub use error::{PipelineError, SweepError};
pub use partition::{pixel_range, row_blocks};
pub use pipeline::{PipelineOutput, smooth_sources, smooth_stack};
pub use sweep::{SweepResult, run};
