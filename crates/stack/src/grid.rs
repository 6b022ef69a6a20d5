//! Single-time-step probability grids and the raster access capability.
//!
//! Raster backends live outside this workspace. They plug in through two
//! narrow traits: [`ProbabilitySource`] (read one pixel's vector) and
//! [`ProbabilitySink`] (write one pixel's vector). [`ProbabilityGrid`] is
//! the in-memory implementation of both.

use std::fmt;

use crate::error::StackError;
use crate::vector::ClassProbabilityVector;

/// Spatial extent of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridShape {
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
}

impl GridShape {
    /// Creates a new extent.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Total number of pixels.
    ///
    /// Only meaningful for an extent that passed [`value_len`](Self::value_len).
    pub fn n_pixels(&self) -> usize {
        self.rows * self.cols
    }

    /// Length of a pixel-major buffer holding `n_classes` values per pixel.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::ExtentOverflow`] if the length does not fit in
    /// `usize`.
    pub fn value_len(&self, n_classes: usize) -> Result<usize, StackError> {
        self.rows
            .checked_mul(self.cols)
            .and_then(|n| n.checked_mul(n_classes))
            .ok_or(StackError::ExtentOverflow {
                shape: *self,
                n_classes,
            })
    }

    /// Returns `true` if `coord` lies inside this extent.
    pub fn contains(&self, coord: PixelCoord) -> bool {
        coord.row < self.rows && coord.col < self.cols
    }

    /// Row-major linear index of `coord`. Does not bounds-check.
    pub fn index_of(&self, coord: PixelCoord) -> usize {
        coord.row * self.cols + coord.col
    }

    /// Coordinate of the row-major linear index `idx`.
    pub fn coord_of(&self, idx: usize) -> PixelCoord {
        PixelCoord::new(idx / self.cols, idx % self.cols)
    }
}

impl fmt::Display for GridShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// A 2-D pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PixelCoord {
    /// Zero-based row.
    pub row: usize,
    /// Zero-based column.
    pub col: usize,
}

impl PixelCoord {
    /// Creates a new coordinate.
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Read access to one time step of class-probability data.
pub trait ProbabilitySource {
    /// Spatial extent of the grid.
    fn shape(&self) -> GridShape;

    /// Number of classes per pixel.
    fn n_classes(&self) -> usize;

    /// Reads the class-probability vector at `coord`.
    fn get(&self, coord: PixelCoord) -> Result<ClassProbabilityVector, StackError>;
}

/// Write access to one time step of class-probability data.
pub trait ProbabilitySink {
    /// Spatial extent of the grid.
    fn shape(&self) -> GridShape;

    /// Number of classes per pixel.
    fn n_classes(&self) -> usize;

    /// Writes the class-probability vector at `coord`.
    fn set(&mut self, coord: PixelCoord, vector: &ClassProbabilityVector)
    -> Result<(), StackError>;
}

/// In-memory grid of class-probability vectors for one time step.
///
/// Values are stored pixel-major: the `n_classes` probabilities of pixel
/// `(row, col)` occupy `values[(row * cols + col) * n_classes..][..n_classes]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityGrid {
    shape: GridShape,
    n_classes: usize,
    values: Vec<f64>,
}

impl ProbabilityGrid {
    /// Creates a zero-filled grid.
    ///
    /// # Panics
    ///
    /// Panics if `rows * cols * n_classes` overflows; check untrusted extents
    /// with [`GridShape::value_len`] first.
    pub fn zeros(shape: GridShape, n_classes: usize) -> Self {
        Self {
            shape,
            n_classes,
            values: vec![0.0; shape.n_pixels() * n_classes],
        }
    }

    /// Creates a grid from a pixel-major value buffer.
    ///
    /// # Errors
    ///
    /// - [`StackError::ExtentOverflow`] if `rows * cols * n_classes` does not
    ///   fit in `usize`.
    /// - [`StackError::ValueLengthMismatch`] if `values.len()` is not
    ///   `rows * cols * n_classes`.
    pub fn from_values(
        shape: GridShape,
        n_classes: usize,
        values: Vec<f64>,
    ) -> Result<Self, StackError> {
        let expected = shape.value_len(n_classes)?;
        if values.len() != expected {
            return Err(StackError::ValueLengthMismatch {
                expected,
                got: values.len(),
            });
        }
        Ok(Self {
            shape,
            n_classes,
            values,
        })
    }

    /// Spatial extent.
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Number of classes per pixel.
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Pixel-major value buffer.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Mutable pixel-major value buffer.
    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Consumes the grid and returns its value buffer.
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Probabilities of the pixel at linear index `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= rows * cols`.
    pub fn pixel(&self, idx: usize) -> &[f64] {
        let start = idx * self.n_classes;
        &self.values[start..start + self.n_classes]
    }

    /// Mutable probabilities of the pixel at linear index `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= rows * cols`.
    pub fn pixel_mut(&mut self, idx: usize) -> &mut [f64] {
        let start = idx * self.n_classes;
        &mut self.values[start..start + self.n_classes]
    }

    fn checked_index(&self, coord: PixelCoord) -> Result<usize, StackError> {
        if !self.shape.contains(coord) {
            return Err(StackError::OutOfBounds {
                row: coord.row,
                col: coord.col,
                shape: self.shape,
            });
        }
        Ok(self.shape.index_of(coord))
    }
}

impl ProbabilitySource for ProbabilityGrid {
    fn shape(&self) -> GridShape {
        self.shape
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn get(&self, coord: PixelCoord) -> Result<ClassProbabilityVector, StackError> {
        let idx = self.checked_index(coord)?;
        Ok(ClassProbabilityVector::new(self.pixel(idx).to_vec()))
    }
}

impl ProbabilitySink for ProbabilityGrid {
    fn shape(&self) -> GridShape {
        self.shape
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn set(
        &mut self,
        coord: PixelCoord,
        vector: &ClassProbabilityVector,
    ) -> Result<(), StackError> {
        if vector.len() != self.n_classes {
            return Err(StackError::VectorLengthMismatch {
                expected: self.n_classes,
                got: vector.len(),
            });
        }
        let idx = self.checked_index(coord)?;
        self.pixel_mut(idx).copy_from_slice(vector.as_slice());
        Ok(())
    }
}
