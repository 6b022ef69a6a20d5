//! Temporal stacks of probability grids and per-pixel projections.

use crate::error::StackError;
use crate::grid::{GridShape, PixelCoord, ProbabilityGrid};
use crate::vector::ClassProbabilityVector;

/// An ordered sequence of probability grids, one per time step.
///
/// All grids share one spatial extent and one class count. Time steps are
/// stored in chronological order.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalProbabilityStack {
    shape: GridShape,
    n_classes: usize,
    grids: Vec<ProbabilityGrid>,
}

impl TemporalProbabilityStack {
    /// Builds a stack from per-step grids in chronological order.
    ///
    /// # Errors
    ///
    /// - [`StackError::EmptyStack`] if `grids` is empty.
    /// - [`StackError::EmptyExtent`] if the first grid has no pixels.
    /// - [`StackError::NoClasses`] if the first grid has no classes.
    /// - [`StackError::ShapeMismatch`] / [`StackError::ClassCountMismatch`]
    ///   if any grid disagrees with the first one.
    pub fn from_grids(grids: Vec<ProbabilityGrid>) -> Result<Self, StackError> {
        let first = grids.first().ok_or(StackError::EmptyStack)?;
        let shape = first.shape();
        let n_classes = first.n_classes();
        if shape.n_pixels() == 0 {
            return Err(StackError::EmptyExtent { shape });
        }
        if n_classes == 0 {
            return Err(StackError::NoClasses);
        }
        for (step, g) in grids.iter().enumerate().skip(1) {
            if g.shape() != shape {
                return Err(StackError::ShapeMismatch {
                    step,
                    expected: shape,
                    got: g.shape(),
                });
            }
            if g.n_classes() != n_classes {
                return Err(StackError::ClassCountMismatch {
                    step,
                    expected: n_classes,
                    got: g.n_classes(),
                });
            }
        }
        Ok(Self {
            shape,
            n_classes,
            grids,
        })
    }

    /// Spatial extent shared by every step.
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Number of classes per pixel.
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Number of time steps.
    pub fn n_steps(&self) -> usize {
        self.grids.len()
    }

    /// Number of pixels per step.
    pub fn n_pixels(&self) -> usize {
        self.shape.n_pixels()
    }

    /// Grid of time step `t`, or `None` if out of range.
    pub fn grid(&self, t: usize) -> Option<&ProbabilityGrid> {
        self.grids.get(t)
    }

    /// All grids in chronological order.
    pub fn grids(&self) -> &[ProbabilityGrid] {
        &self.grids
    }

    /// Consumes the stack and returns its grids.
    pub fn into_grids(self) -> Vec<ProbabilityGrid> {
        self.grids
    }

    /// Projects the stack at `coord` into a pixel time series.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::OutOfBounds`] if `coord` is outside the extent.
    pub fn pixel_series(&self, coord: PixelCoord) -> Result<PixelTimeSeries, StackError> {
        if !self.shape.contains(coord) {
            return Err(StackError::OutOfBounds {
                row: coord.row,
                col: coord.col,
                shape: self.shape,
            });
        }
        let mut values = vec![0.0; self.n_steps() * self.n_classes];
        self.pixel_series_into(self.shape.index_of(coord), &mut values)?;
        Ok(PixelTimeSeries {
            n_classes: self.n_classes,
            values,
        })
    }

    /// Copies the series of the pixel at linear index `idx` into `out`
    /// (step-major, `n_steps * n_classes` values).
    ///
    /// # Errors
    ///
    /// Returns [`StackError::ValueLengthMismatch`] if `out` has the wrong
    /// length.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= n_pixels()`.
    pub fn pixel_series_into(&self, idx: usize, out: &mut [f64]) -> Result<(), StackError> {
        let expected = self.n_steps() * self.n_classes;
        if out.len() != expected {
            return Err(StackError::ValueLengthMismatch {
                expected,
                got: out.len(),
            });
        }
        for (dst, grid) in out.chunks_exact_mut(self.n_classes).zip(&self.grids) {
            dst.copy_from_slice(grid.pixel(idx));
        }
        Ok(())
    }
}

/// The class-probability sequence of a single pixel.
///
/// Values are stored step-major: step `t` occupies
/// `values[t * n_classes..(t + 1) * n_classes]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelTimeSeries {
    n_classes: usize,
    values: Vec<f64>,
}

impl PixelTimeSeries {
    /// Creates a series from a step-major value buffer.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::RaggedSeries`] if `values.len()` is not a
    /// positive multiple of `n_classes`.
    pub fn new(n_classes: usize, values: Vec<f64>) -> Result<Self, StackError> {
        if n_classes == 0 || values.is_empty() || values.len() % n_classes != 0 {
            return Err(StackError::RaggedSeries {
                len: values.len(),
                n_classes,
            });
        }
        Ok(Self { n_classes, values })
    }

    /// Creates a series from one vector per time step.
    ///
    /// # Errors
    ///
    /// - [`StackError::EmptyStack`] if `steps` is empty.
    /// - [`StackError::ClassCountMismatch`] if the vectors differ in length.
    pub fn from_vectors(steps: &[ClassProbabilityVector]) -> Result<Self, StackError> {
        let first = steps.first().ok_or(StackError::EmptyStack)?;
        let n_classes = first.len();
        let mut values = Vec::with_capacity(steps.len() * n_classes);
        for (step, v) in steps.iter().enumerate() {
            if v.len() != n_classes {
                return Err(StackError::ClassCountMismatch {
                    step,
                    expected: n_classes,
                    got: v.len(),
                });
            }
            values.extend_from_slice(v.as_slice());
        }
        Self::new(n_classes, values)
    }

    /// Number of time steps.
    pub fn n_steps(&self) -> usize {
        self.values.len() / self.n_classes
    }

    /// Number of classes.
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Probabilities at step `t`.
    ///
    /// # Panics
    ///
    /// Panics if `t >= n_steps()`.
    pub fn step(&self, t: usize) -> &[f64] {
        &self.values[t * self.n_classes..(t + 1) * self.n_classes]
    }

    /// Iterates over the steps in chronological order.
    pub fn steps(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks_exact(self.n_classes)
    }

    /// Step-major value buffer.
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// The smoothed counterpart of a [`TemporalProbabilityStack`].
///
/// Has exactly the extent, class count and step count of the input stack
/// it was produced from.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothedStack {
    inner: TemporalProbabilityStack,
}

impl SmoothedStack {
    /// Wraps fully assembled smoothed grids.
    ///
    /// # Errors
    ///
    /// Same as [`TemporalProbabilityStack::from_grids`].
    pub fn from_grids(grids: Vec<ProbabilityGrid>) -> Result<Self, StackError> {
        Ok(Self {
            inner: TemporalProbabilityStack::from_grids(grids)?,
        })
    }

    /// Views the smoothed grids as a stack.
    pub fn as_stack(&self) -> &TemporalProbabilityStack {
        &self.inner
    }

    /// Spatial extent.
    pub fn shape(&self) -> GridShape {
        self.inner.shape()
    }

    /// Number of classes per pixel.
    pub fn n_classes(&self) -> usize {
        self.inner.n_classes()
    }

    /// Number of time steps.
    pub fn n_steps(&self) -> usize {
        self.inner.n_steps()
    }

    /// Grid of time step `t`.
    pub fn grid(&self, t: usize) -> Option<&ProbabilityGrid> {
        self.inner.grid(t)
    }

    /// Consumes the smoothed stack and returns its grids.
    pub fn into_grids(self) -> Vec<ProbabilityGrid> {
        self.inner.into_grids()
    }
}
