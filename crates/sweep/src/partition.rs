//! Row-block partition of the pixel grid.

use std::ops::Range;

use lcsmooth_stack::GridShape;

/// Splits `shape` into consecutive row ranges of at most `block_rows` rows.
///
/// Every row is covered by exactly one range; ranges are returned in
/// ascending order. A zero-height grid yields no ranges.
///
/// # Panics
///
/// Panics if `block_rows` is zero.
pub fn row_blocks(shape: GridShape, block_rows: usize) -> Vec<Range<usize>> {
    assert!(block_rows > 0, "block_rows must be positive");
    (0..shape.rows)
        .step_by(block_rows)
        .map(|start| start..(start + block_rows).min(shape.rows))
        .collect()
}

/// Linear pixel indices covered by a row range.
pub fn pixel_range(shape: GridShape, rows: &Range<usize>) -> Range<usize> {
    rows.start * shape.cols..rows.end * shape.cols
}
