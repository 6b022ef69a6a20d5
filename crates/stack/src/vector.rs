//! Per-pixel class-probability vectors.

/// Default tolerance used when checking that a vector sums to one.
pub const DEFAULT_TOLERANCE: f64 = 1e-3;

/// An ordered sequence of non-negative class probabilities.
///
/// Raw classifier output is not required to be normalised; smoothed
/// posteriors always are (see [`is_normalized`](Self::is_normalized)).
#[derive(Debug, Clone, PartialEq)]
pub struct ClassProbabilityVector {
    probs: Vec<f64>,
}

impl ClassProbabilityVector {
    /// Wraps a vector of class probabilities.
    pub fn new(probs: Vec<f64>) -> Self {
        Self { probs }
    }

    /// Returns a uniform vector over `n_classes` classes.
    pub fn uniform(n_classes: usize) -> Self {
        let p = if n_classes == 0 {
            0.0
        } else {
            1.0 / n_classes as f64
        };
        Self {
            probs: vec![p; n_classes],
        }
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.probs.len()
    }

    /// Returns `true` when the vector holds no classes.
    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }

    /// Total probability mass.
    pub fn mass(&self) -> f64 {
        self.probs.iter().sum()
    }

    /// Returns `true` if every entry is finite and non-negative and the
    /// entries sum to one within `tol`.
    pub fn is_normalized(&self, tol: f64) -> bool {
        self.probs.iter().all(|p| p.is_finite() && *p >= 0.0) && (self.mass() - 1.0).abs() <= tol
    }

    /// Index of the most probable class; ties resolve to the lowest index.
    ///
    /// Returns `None` for an empty vector.
    pub fn argmax(&self) -> Option<usize> {
        argmax(&self.probs)
    }

    /// Borrows the probabilities.
    pub fn as_slice(&self) -> &[f64] {
        &self.probs
    }

    /// Consumes the vector and returns the probabilities.
    pub fn into_inner(self) -> Vec<f64> {
        self.probs
    }
}

impl From<Vec<f64>> for ClassProbabilityVector {
    fn from(probs: Vec<f64>) -> Self {
        Self::new(probs)
    }
}

impl AsRef<[f64]> for ClassProbabilityVector {
    fn as_ref(&self) -> &[f64] {
        &self.probs
    }
}

/// Index of the largest value in `values`, lowest index on ties.
pub(crate) fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn uniform_sums_to_one() {
        let v = ClassProbabilityVector::uniform(7);
        assert_eq!(v.len(), 7);
        assert_abs_diff_eq!(v.mass(), 1.0, epsilon = 1e-12);
        assert!(v.is_normalized(DEFAULT_TOLERANCE));
    }

    #[test]
    fn is_normalized_tolerance() {
        assert!(ClassProbabilityVector::new(vec![0.5, 0.5004]).is_normalized(1e-3));
        assert!(!ClassProbabilityVector::new(vec![0.5, 0.51]).is_normalized(1e-3));
        assert!(!ClassProbabilityVector::new(vec![1.2, -0.2]).is_normalized(1e-3));
        assert!(!ClassProbabilityVector::new(vec![f64::NAN, 1.0]).is_normalized(1e-3));
    }

    #[test]
    fn argmax_prefers_lowest_on_tie() {
        let v = ClassProbabilityVector::new(vec![0.2, 0.4, 0.4]);
        assert_eq!(v.argmax(), Some(1));
        assert_eq!(ClassProbabilityVector::new(vec![]).argmax(), None);
    }
}
