//! Prior transition matrices blended into the empirical estimate.
//!
//! The prior is a strategy object: the estimator only asks it for a C×C
//! matrix. [`SelfTransitionPrior`] encodes the assumption that land cover
//! persists more often than it changes; [`FixedPrior`] lets callers supply
//! any matrix they trust more.

use std::fmt;

use crate::error::MarkovError;
use crate::transition::{TransitionMatrix, normalize_rows};

/// Default diagonal weight of [`SelfTransitionPrior`].
pub const DEFAULT_PERSISTENCE: f64 = 0.8;

/// Supplies the prior matrix for a given number of classes.
pub trait TransitionPrior: fmt::Debug + Send + Sync {
    /// Short human-readable name, used in logs.
    fn name(&self) -> &'static str;

    /// Builds the row-stochastic prior matrix for `n_classes` classes.
    fn matrix(&self, n_classes: usize) -> Result<TransitionMatrix, MarkovError>;
}

/// Self-transition-biased prior.
///
/// The diagonal holds `persistence`; the remaining `1 - persistence` is
/// spread uniformly over the `C - 1` off-diagonal entries of each row.
/// With the default of 0.8 and four classes every row reads
/// `[0.8, 0.0667, 0.0667, 0.0667]` (diagonal first).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelfTransitionPrior {
    persistence: f64,
}

impl SelfTransitionPrior {
    /// Creates a prior with the given diagonal weight.
    ///
    /// # Errors
    ///
    /// Returns [`MarkovError::InvalidPersistence`] if `persistence` is not a
    /// finite value in `[0, 1]`.
    pub fn new(persistence: f64) -> Result<Self, MarkovError> {
        if !persistence.is_finite() || !(0.0..=1.0).contains(&persistence) {
            return Err(MarkovError::InvalidPersistence { value: persistence });
        }
        Ok(Self { persistence })
    }

    /// Diagonal weight.
    pub fn persistence(&self) -> f64 {
        self.persistence
    }
}

impl Default for SelfTransitionPrior {
    fn default() -> Self {
        Self {
            persistence: DEFAULT_PERSISTENCE,
        }
    }
}

impl TransitionPrior for SelfTransitionPrior {
    fn name(&self) -> &'static str {
        "self-transition"
    }

    fn matrix(&self, n_classes: usize) -> Result<TransitionMatrix, MarkovError> {
        if n_classes < 2 {
            return Ok(TransitionMatrix::from_probs(
                n_classes,
                vec![1.0; n_classes * n_classes],
            ));
        }
        let off = (1.0 - self.persistence) / (n_classes - 1) as f64;
        let mut probs = vec![off; n_classes * n_classes];
        for i in 0..n_classes {
            probs[i * n_classes + i] = self.persistence;
        }
        Ok(TransitionMatrix::from_probs(n_classes, probs))
    }
}

/// A caller-supplied prior matrix.
///
/// Rows are normalised on construction, so any non-negative weights are
/// accepted as long as no row is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedPrior {
    matrix: TransitionMatrix,
}

impl FixedPrior {
    /// Builds a prior from explicit non-negative row weights.
    ///
    /// # Errors
    ///
    /// - [`MarkovError::DimensionMismatch`] if the rows are not square.
    /// - [`MarkovError::InvalidEntry`] on a non-finite or negative weight.
    /// - [`MarkovError::ZeroPriorRow`] if a row has no mass.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, MarkovError> {
        let n = rows.len();
        let mut probs = Vec::with_capacity(n * n);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(MarkovError::DimensionMismatch {
                    expected: n,
                    rows: n,
                    cols: row.len(),
                });
            }
            for (j, &v) in row.iter().enumerate() {
                if !v.is_finite() || v < 0.0 {
                    return Err(MarkovError::InvalidEntry {
                        row: i,
                        col: j,
                        value: v,
                    });
                }
            }
            if row.iter().sum::<f64>() <= 0.0 {
                return Err(MarkovError::ZeroPriorRow { row: i });
            }
            probs.extend_from_slice(row);
        }
        normalize_rows(n.max(1), &mut probs);
        Ok(Self {
            matrix: TransitionMatrix::from_probs(n, probs),
        })
    }

    /// The normalised prior matrix.
    pub fn as_matrix(&self) -> &TransitionMatrix {
        &self.matrix
    }
}

impl From<TransitionMatrix> for FixedPrior {
    fn from(matrix: TransitionMatrix) -> Self {
        Self { matrix }
    }
}

impl TransitionPrior for FixedPrior {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn matrix(&self, n_classes: usize) -> Result<TransitionMatrix, MarkovError> {
        if self.matrix.n_classes() != n_classes {
            return Err(MarkovError::DimensionMismatch {
                expected: n_classes,
                rows: self.matrix.n_classes(),
                cols: self.matrix.n_classes(),
            });
        }
        Ok(self.matrix.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn self_transition_default() {
        let m = SelfTransitionPrior::default().matrix(4).unwrap();
        assert!(m.validate().is_ok());
        for i in 0..4 {
            for j in 0..4 {
                let expected = if i == j { 0.8 } else { 0.2 / 3.0 };
                assert_abs_diff_eq!(m.prob(i, j), expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn self_transition_bounds() {
        assert!(SelfTransitionPrior::new(0.0).is_ok());
        assert!(SelfTransitionPrior::new(1.0).is_ok());
        assert!(matches!(
            SelfTransitionPrior::new(1.01),
            Err(MarkovError::InvalidPersistence { .. })
        ));
        assert!(SelfTransitionPrior::new(f64::NAN).is_err());
    }

    #[test]
    fn self_transition_identity() {
        let m = SelfTransitionPrior::new(1.0).unwrap().matrix(3).unwrap();
        for i in 0..3 {
            assert_abs_diff_eq!(m.prob(i, i), 1.0);
        }
        assert!(m.validate().is_ok());
    }

    #[test]
    fn fixed_prior_normalises_rows() {
        let p = FixedPrior::from_rows(&[vec![3.0, 1.0], vec![1.0, 1.0]]).unwrap();
        let m = p.matrix(2).unwrap();
        assert_eq!(m.row(0), &[0.75, 0.25]);
        assert_eq!(m.row(1), &[0.5, 0.5]);
    }

    #[test]
    fn fixed_prior_rejects_bad_rows() {
        assert!(matches!(
            FixedPrior::from_rows(&[vec![0.0, 0.0], vec![1.0, 1.0]]),
            Err(MarkovError::ZeroPriorRow { row: 0 })
        ));
        assert!(matches!(
            FixedPrior::from_rows(&[vec![1.0, -1.0], vec![1.0, 1.0]]),
            Err(MarkovError::InvalidEntry { row: 0, col: 1, .. })
        ));
        assert!(matches!(
            FixedPrior::from_rows(&[vec![1.0, 1.0, 1.0], vec![1.0, 1.0]]),
            Err(MarkovError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn fixed_prior_size_checked() {
        let p = FixedPrior::from_rows(&[vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        assert!(matches!(
            p.matrix(3),
            Err(MarkovError::DimensionMismatch { expected: 3, .. })
        ));
    }
}
