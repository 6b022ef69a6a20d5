//! Boundary glue between raster backends and the in-memory stack.
//!
//! [`load_stack`] reads every step through [`ProbabilitySource`], checks
//! that all steps agree on extent and class count, and sanitises the values.
//! [`store_stack`] writes a [`SmoothedStack`] back through
//! [`ProbabilitySink`]. [`smoothed_name`] derives output identifiers.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::StackError;
use crate::grid::{ProbabilityGrid, ProbabilitySink, ProbabilitySource};
use crate::stack::{SmoothedStack, TemporalProbabilityStack};
use crate::vector::ClassProbabilityVector;

/// Default marker appended to the identifier of every smoothed output.
pub const DEFAULT_SUFFIX: &str = "_hmm";

/// Reads an ordered list of per-step sources into a stack.
///
/// Shapes are checked for every source before any pixel is read, so a
/// mismatch never leaves a half-loaded stack behind. Non-finite and
/// negative values are replaced with 0.0.
///
/// # Errors
///
/// - [`StackError::EmptyStack`] if `sources` is empty.
/// - [`StackError::ExtentOverflow`] if the extent is too large to address.
/// - [`StackError::ShapeMismatch`] / [`StackError::ClassCountMismatch`] if
///   the sources disagree.
/// - Any error returned by [`ProbabilitySource::get`].
pub fn load_stack<S: ProbabilitySource>(
    sources: &[S],
) -> Result<TemporalProbabilityStack, StackError> {
    let first = sources.first().ok_or(StackError::EmptyStack)?;
    let shape = first.shape();
    let n_classes = first.n_classes();
    shape.value_len(n_classes)?;

    for (step, src) in sources.iter().enumerate().skip(1) {
        if src.shape() != shape {
            return Err(StackError::ShapeMismatch {
                step,
                expected: shape,
                got: src.shape(),
            });
        }
        if src.n_classes() != n_classes {
            return Err(StackError::ClassCountMismatch {
                step,
                expected: n_classes,
                got: src.n_classes(),
            });
        }
    }

    let mut grids = Vec::with_capacity(sources.len());
    let mut n_sanitized = 0usize;
    for (step, src) in sources.iter().enumerate() {
        let mut grid = ProbabilityGrid::zeros(shape, n_classes);
        for idx in 0..shape.n_pixels() {
            let coord = shape.coord_of(idx);
            let v = src.get(coord)?;
            if v.len() != n_classes {
                return Err(StackError::ClassCountMismatch {
                    step,
                    expected: n_classes,
                    got: v.len(),
                });
            }
            grid.pixel_mut(idx).copy_from_slice(v.as_slice());
        }
        n_sanitized += sanitize(grid.values_mut());
        grids.push(grid);
    }

    if n_sanitized > 0 {
        warn!(
            n_values = n_sanitized,
            "replaced non-finite or negative input probabilities with 0"
        );
    }
    debug!(
        n_steps = grids.len(),
        rows = shape.rows,
        cols = shape.cols,
        n_classes,
        "loaded probability stack"
    );

    TemporalProbabilityStack::from_grids(grids)
}

/// Writes every step of `smoothed` into the matching sink.
///
/// # Errors
///
/// - [`StackError::SinkCountMismatch`] if `sinks.len() != smoothed.n_steps()`.
/// - [`StackError::ShapeMismatch`] / [`StackError::ClassCountMismatch`] if a
///   sink disagrees with the stack. All sinks are checked before writing.
/// - Any error returned by [`ProbabilitySink::set`].
pub fn store_stack<K: ProbabilitySink>(
    smoothed: &SmoothedStack,
    sinks: &mut [K],
) -> Result<(), StackError> {
    if sinks.len() != smoothed.n_steps() {
        return Err(StackError::SinkCountMismatch {
            steps: smoothed.n_steps(),
            sinks: sinks.len(),
        });
    }
    let shape = smoothed.shape();
    let n_classes = smoothed.n_classes();
    for (step, sink) in sinks.iter().enumerate() {
        if sink.shape() != shape {
            return Err(StackError::ShapeMismatch {
                step,
                expected: shape,
                got: sink.shape(),
            });
        }
        if sink.n_classes() != n_classes {
            return Err(StackError::ClassCountMismatch {
                step,
                expected: n_classes,
                got: sink.n_classes(),
            });
        }
    }

    for (grid, sink) in smoothed.as_stack().grids().iter().zip(sinks.iter_mut()) {
        for idx in 0..shape.n_pixels() {
            let v = ClassProbabilityVector::new(grid.pixel(idx).to_vec());
            sink.set(shape.coord_of(idx), &v)?;
        }
    }
    Ok(())
}

/// Derives the identifier of a smoothed output from its input identifier.
///
/// The suffix is inserted between the file stem and the extension:
/// `lc_2001.tif` becomes `lc_2001_hmm.tif`.
pub fn smoothed_name(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match input.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    input.with_file_name(file_name)
}

/// Replaces non-finite and negative values with 0.0, returning how many
/// values were changed.
fn sanitize(values: &mut [f64]) -> usize {
    let mut n = 0;
    for v in values.iter_mut() {
        if !v.is_finite() || *v < 0.0 {
            *v = 0.0;
            n += 1;
        }
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridShape, PixelCoord};

    #[test]
    fn sanitize_replaces_bad_values() {
        let mut v = [0.5, f64::NAN, -0.1, f64::INFINITY, 0.0];
        assert_eq!(sanitize(&mut v), 3);
        assert_eq!(v, [0.5, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn smoothed_name_with_extension() {
        assert_eq!(
            smoothed_name(Path::new("/data/lc_2001.tif"), "_hmm"),
            PathBuf::from("/data/lc_2001_hmm.tif")
        );
    }

    #[test]
    fn smoothed_name_without_extension() {
        assert_eq!(
            smoothed_name(Path::new("probs"), DEFAULT_SUFFIX),
            PathBuf::from("probs_hmm")
        );
    }

    #[test]
    fn load_rejects_mismatch_before_reading() {
        let a = ProbabilityGrid::zeros(GridShape::new(2, 2), 3);
        let b = ProbabilityGrid::zeros(GridShape::new(2, 2), 4);
        assert!(matches!(
            load_stack(&[a, b]),
            Err(StackError::ClassCountMismatch {
                step: 1,
                expected: 3,
                got: 4
            })
        ));
    }

    #[test]
    fn load_sanitizes() {
        let shape = GridShape::new(1, 1);
        let a = ProbabilityGrid::from_values(shape, 2, vec![f64::NAN, 1.0]).unwrap();
        let b = ProbabilityGrid::from_values(shape, 2, vec![0.5, 0.5]).unwrap();
        let stack = load_stack(&[a, b]).unwrap();
        let series = stack.pixel_series(PixelCoord::new(0, 0)).unwrap();
        assert_eq!(series.step(0), &[0.0, 1.0]);
    }
}
