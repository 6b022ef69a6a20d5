//! Error types for the lcsmooth-hmm crate.

/// Error type for all fallible operations in the lcsmooth-hmm crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HmmError {
    /// Returned by [`normalize`](crate::normalize) when a vector has no mass.
    ///
    /// The smoothing engine recovers from this locally by substituting a
    /// uniform vector; callers of the engine never see it.
    #[error("vector of {len} classes has zero total probability")]
    ZeroMass {
        /// Length of the offending vector.
        len: usize,
    },

    /// Returned when a series is empty.
    #[error("pixel series has no time steps")]
    EmptySeries,

    /// Returned when series and transition matrix disagree on the class count.
    #[error("class count mismatch: series has {series} classes, matrix has {matrix}")]
    ClassCountMismatch {
        /// Classes in the series.
        series: usize,
        /// Classes in the transition matrix.
        matrix: usize,
    },

    /// Returned when an observation or output buffer has the wrong length.
    #[error("buffer length mismatch: expected {expected}, got {got}")]
    BufferLengthMismatch {
        /// Expected buffer length.
        expected: usize,
        /// Actual buffer length.
        got: usize,
    },

    /// Returned when an observation is non-finite or negative.
    #[error("invalid observation at step {step}, class {class}: {value}")]
    InvalidObservation {
        /// Time step of the observation.
        step: usize,
        /// Class index of the observation.
        class: usize,
        /// The invalid value.
        value: f64,
    },

    /// Returned when a method name cannot be parsed.
    #[error("unknown smoothing method: {name:?} (expected \"forward\" or \"forward-backward\")")]
    UnknownMethod {
        /// The unrecognised name.
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_zero_mass() {
        let e = HmmError::ZeroMass { len: 2 };
        assert_eq!(
            e.to_string(),
            "vector of 2 classes has zero total probability"
        );
    }

    #[test]
    fn error_class_count_mismatch() {
        let e = HmmError::ClassCountMismatch {
            series: 3,
            matrix: 4,
        };
        assert_eq!(
            e.to_string(),
            "class count mismatch: series has 3 classes, matrix has 4"
        );
    }

    #[test]
    fn error_invalid_observation() {
        let e = HmmError::InvalidObservation {
            step: 2,
            class: 1,
            value: f64::NAN,
        };
        assert_eq!(e.to_string(), "invalid observation at step 2, class 1: NaN");
    }

    #[test]
    fn error_unknown_method() {
        let e = HmmError::UnknownMethod {
            name: "viterbi".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "unknown smoothing method: \"viterbi\" (expected \"forward\" or \"forward-backward\")"
        );
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<HmmError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<HmmError>();
    }
}
