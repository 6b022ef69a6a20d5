//! Error types for the lcsmooth-stack crate.

use crate::grid::GridShape;

/// Error type for all fallible operations in the lcsmooth-stack crate.
///
/// Shape and class-count mismatches are fatal for a whole stack: they are
/// raised while the stack is being assembled, before any pixel is touched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StackError {
    /// Returned when no time steps are supplied.
    #[error("stack contains no time steps")]
    EmptyStack,

    /// Returned when a grid has zero rows or zero columns.
    #[error("grid has an empty extent: {shape}")]
    EmptyExtent {
        /// The offending extent.
        shape: GridShape,
    },

    /// Returned when a grid carries no classes.
    #[error("grid has no classes")]
    NoClasses,

    /// Returned when a series buffer is not a whole number of steps.
    #[error("ragged series: {len} values do not split into steps of {n_classes} classes")]
    RaggedSeries {
        /// Length of the value buffer.
        len: usize,
        /// Requested class count.
        n_classes: usize,
    },

    /// Returned when a time step reports a different spatial extent.
    #[error("input shape mismatch at step {step}: expected {expected}, got {got}")]
    ShapeMismatch {
        /// Zero-based index of the offending time step.
        step: usize,
        /// Extent of the first time step.
        expected: GridShape,
        /// Extent of the offending time step.
        got: GridShape,
    },

    /// Returned when a time step reports a different class count.
    #[error("input shape mismatch at step {step}: expected {expected} classes, got {got}")]
    ClassCountMismatch {
        /// Zero-based index of the offending time step.
        step: usize,
        /// Class count of the first time step.
        expected: usize,
        /// Class count of the offending time step.
        got: usize,
    },

    /// Returned when a flat value buffer does not match `rows * cols * n_classes`.
    #[error("value buffer length mismatch: expected {expected}, got {got}")]
    ValueLengthMismatch {
        /// Required buffer length.
        expected: usize,
        /// Actual buffer length.
        got: usize,
    },

    /// Returned when `rows * cols * n_classes` does not fit in `usize`.
    #[error("grid extent {shape} with {n_classes} classes is too large to address")]
    ExtentOverflow {
        /// The offending extent.
        shape: GridShape,
        /// Requested class count.
        n_classes: usize,
    },

    /// Returned when a vector written to a grid has the wrong class count.
    #[error("vector length mismatch: grid has {expected} classes, got {got}")]
    VectorLengthMismatch {
        /// Class count of the grid.
        expected: usize,
        /// Length of the vector.
        got: usize,
    },

    /// Returned when a pixel coordinate lies outside the grid.
    #[error("coordinate ({row}, {col}) is outside grid {shape}")]
    OutOfBounds {
        /// Row of the coordinate.
        row: usize,
        /// Column of the coordinate.
        col: usize,
        /// Extent of the grid.
        shape: GridShape,
    },

    /// Returned when the number of output sinks differs from the number of steps.
    #[error("sink count mismatch: stack has {steps} steps, got {sinks} sinks")]
    SinkCountMismatch {
        /// Number of time steps in the stack.
        steps: usize,
        /// Number of sinks supplied.
        sinks: usize,
    },

    /// Returned when a class-code list does not cover every class.
    #[error("class label count mismatch: {n_classes} classes, got {got} labels")]
    LabelCountMismatch {
        /// Number of classes in the stack.
        n_classes: usize,
        /// Number of labels supplied.
        got: usize,
    },
}
