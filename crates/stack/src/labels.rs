//! Hard class assignment from smoothed probabilities.

use crate::error::StackError;
use crate::grid::{GridShape, PixelCoord};
use crate::stack::SmoothedStack;
use crate::vector::argmax;

/// A grid of class codes for one time step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassGrid {
    shape: GridShape,
    codes: Vec<u16>,
}

impl ClassGrid {
    /// Spatial extent.
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Row-major class codes.
    pub fn codes(&self) -> &[u16] {
        &self.codes
    }

    /// Class code at `coord`, or `None` if out of bounds.
    pub fn get(&self, coord: PixelCoord) -> Option<u16> {
        if !self.shape.contains(coord) {
            return None;
        }
        Some(self.codes[self.shape.index_of(coord)])
    }
}

/// Assigns every pixel of every step to its most probable class.
///
/// With `codes = None` the class index itself is used as the code. With
/// `codes = Some(list)`, class `k` is reported as `list[k]`. Ties resolve
/// to the lowest class index.
///
/// # Errors
///
/// Returns [`StackError::LabelCountMismatch`] if `codes` does not hold
/// exactly one code per class.
pub fn assign_classes(
    smoothed: &SmoothedStack,
    codes: Option<&[u16]>,
) -> Result<Vec<ClassGrid>, StackError> {
    let n_classes = smoothed.n_classes();
    if let Some(list) = codes
        && list.len() != n_classes
    {
        return Err(StackError::LabelCountMismatch {
            n_classes,
            got: list.len(),
        });
    }

    let shape = smoothed.shape();
    let grids = smoothed
        .as_stack()
        .grids()
        .iter()
        .map(|grid| {
            let codes = (0..shape.n_pixels())
                .map(|idx| {
                    let k = argmax(grid.pixel(idx)).unwrap_or(0);
                    match codes {
                        Some(list) => list[k],
                        None => k as u16,
                    }
                })
                .collect();
            ClassGrid { shape, codes }
        })
        .collect();
    Ok(grids)
}
