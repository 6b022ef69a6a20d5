//! Error types for the lcsmooth-markov crate.

/// Error type for all fallible operations in the lcsmooth-markov crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MarkovError {
    /// Returned when the stack has fewer than two steps or fewer than two classes.
    #[error(
        "degenerate stack: {n_steps} time step(s) and {n_classes} class(es), need at least 2 of each"
    )]
    DegenerateStack {
        /// Number of time steps in the stack.
        n_steps: usize,
        /// Number of classes in the stack.
        n_classes: usize,
    },

    /// Returned when the prior weight is outside `[0, 1]` or non-finite.
    #[error("invalid prior weight: {weight} (must be in [0, 1])")]
    InvalidPriorWeight {
        /// The invalid weight.
        weight: f64,
    },

    /// Returned when the self-transition persistence is outside `[0, 1]`.
    #[error("invalid persistence: {value} (must be in [0, 1])")]
    InvalidPersistence {
        /// The invalid persistence.
        value: f64,
    },

    /// Returned when the sample stride is zero.
    #[error("sample stride must be at least 1")]
    InvalidSampleStride,

    /// Returned when a matrix is not square or its size does not match the stack.
    #[error("matrix dimension mismatch: expected {expected}x{expected}, got {rows}x{cols}")]
    DimensionMismatch {
        /// Required number of classes.
        expected: usize,
        /// Number of rows supplied.
        rows: usize,
        /// Number of columns in the offending row.
        cols: usize,
    },

    /// Returned when a matrix entry is non-finite or negative.
    #[error("invalid matrix entry [{row}][{col}] = {value}")]
    InvalidEntry {
        /// Row of the entry.
        row: usize,
        /// Column of the entry.
        col: usize,
        /// The invalid value.
        value: f64,
    },

    /// Returned when a matrix row does not sum to one.
    #[error("row {row} sums to {sum}, expected ~1.0")]
    NotStochastic {
        /// Offending row.
        row: usize,
        /// Its sum.
        sum: f64,
    },

    /// Returned when a prior matrix row has no mass and cannot be normalised.
    #[error("prior row {row} has zero mass")]
    ZeroPriorRow {
        /// Offending row.
        row: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_degenerate_stack() {
        let e = MarkovError::DegenerateStack {
            n_steps: 1,
            n_classes: 4,
        };
        assert_eq!(
            e.to_string(),
            "degenerate stack: 1 time step(s) and 4 class(es), need at least 2 of each"
        );
    }

    #[test]
    fn error_invalid_prior_weight() {
        let e = MarkovError::InvalidPriorWeight { weight: 1.5 };
        assert_eq!(
            e.to_string(),
            "invalid prior weight: 1.5 (must be in [0, 1])"
        );
    }

    #[test]
    fn error_dimension_mismatch() {
        let e = MarkovError::DimensionMismatch {
            expected: 3,
            rows: 3,
            cols: 2,
        };
        assert_eq!(
            e.to_string(),
            "matrix dimension mismatch: expected 3x3, got 3x2"
        );
    }

    #[test]
    fn error_not_stochastic() {
        let e = MarkovError::NotStochastic { row: 1, sum: 1.1 };
        assert_eq!(e.to_string(), "row 1 sums to 1.1, expected ~1.0");
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<MarkovError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<MarkovError>();
    }
}
