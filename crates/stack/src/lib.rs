//! Temporal class-probability stacks for land-cover smoothing.
//!
//! This crate holds the data model shared by the estimation and smoothing
//! crates, plus the narrow boundary towards raster backends.
//!
//! # Layout
//!
//! ```text
//!  raster backend ──▶ ProbabilitySource ──load_stack()──▶ TemporalProbabilityStack
//!                                                               │
//!                                                      pixel_series(coord)
//!                                                               ▼
//!                                                        PixelTimeSeries
//!
//!  SmoothedStack ──store_stack()──▶ ProbabilitySink ──▶ raster backend
//!        └──assign_classes()──▶ ClassGrid
//! ```
//!
//! # Quick start
//!
//! ```rust
//! use lcsmooth_stack::{GridShape, PixelCoord, ProbabilityGrid, load_stack};
//!
//! let shape = GridShape::new(1, 1);
//! let y1 = ProbabilityGrid::from_values(shape, 2, vec![0.9, 0.1]).unwrap();
//! let y2 = ProbabilityGrid::from_values(shape, 2, vec![0.2, 0.8]).unwrap();
//!
//! let stack = load_stack(&[y1, y2]).unwrap();
//! let series = stack.pixel_series(PixelCoord::new(0, 0)).unwrap();
//! assert_eq!(series.n_steps(), 2);
//! ```

pub mod adapter;
pub mod error;
pub mod grid;
pub mod labels;
pub mod stack;
pub mod vector;

pub use adapter::{DEFAULT_SUFFIX, load_stack, smoothed_name, store_stack};
pub use error::StackError;
pub use grid::{GridShape, PixelCoord, ProbabilityGrid, ProbabilitySink, ProbabilitySource};
pub use labels::{ClassGrid, assign_classes};
pub use stack::{PixelTimeSeries, SmoothedStack, TemporalProbabilityStack};
pub use vector::{ClassProbabilityVector, DEFAULT_TOLERANCE};
