//! Per-step normalisation.

use crate::error::HmmError;

/// Scales `v` in-place so that it sums to one.
///
/// # Errors
///
/// Returns [`HmmError::ZeroMass`] if the sum is zero or not finite; `v` is
/// left untouched in that case.
pub fn normalize(v: &mut [f64]) -> Result<(), HmmError> {
    let s: f64 = v.iter().sum();
    if !(s > 0.0 && s.is_finite()) {
        return Err(HmmError::ZeroMass { len: v.len() });
    }
    for p in v.iter_mut() {
        *p /= s;
    }
    Ok(())
}

/// Normalises `v`, substituting a uniform vector when it has no mass.
///
/// Returns `true` if the uniform substitution happened.
pub fn normalize_or_uniform(v: &mut [f64]) -> bool {
    match normalize(v) {
        Ok(()) => false,
        Err(_) => {
            let p = 1.0 / v.len() as f64;
            v.fill(p);
            true
        }
    }
}
