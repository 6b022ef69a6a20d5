//! Per-pixel hidden Markov smoothing of class-probability series.
//!
//! Each pixel's classifier outputs are treated as noisy observations of a
//! hidden land-cover class that evolves under a shared transition matrix.
//! Two recursions are available:
//!
//! - [`Method::Forward`]: causal filtering.
//! - [`Method::ForwardBackward`]: full-series smoothing (the default).
//!
//! # Quick start
//!
//! ```rust
//! use lcsmooth_hmm::{Method, smooth};
//! use lcsmooth_markov::TransitionMatrix;
//! use lcsmooth_stack::PixelTimeSeries;
//!
//! let matrix = TransitionMatrix::from_rows(&[vec![0.8, 0.2], vec![0.3, 0.7]]).unwrap();
//! let series = PixelTimeSeries::new(2, vec![0.9, 0.1, 0.5, 0.5, 0.2, 0.8]).unwrap();
//!
//! let out = smooth(&series, &matrix, Method::ForwardBackward).unwrap();
//! assert_eq!(out.n_steps(), 3);
//! assert!((out.step(1).iter().sum::<f64>() - 1.0).abs() < 1e-12);
//! ```

pub mod engine;
pub mod error;
pub mod method;
pub mod normalize;

pub use engine::{ForwardBackward, SmoothedPixelTimeSeries, smooth};
pub use error::HmmError;
pub use method::Method;
pub use normalize::{normalize, normalize_or_uniform};
