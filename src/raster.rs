//! JSON grid files for per-step probability and class grids.
//!
//! A probability grid is stored as
//! `{"rows": R, "cols": C, "n_classes": K, "values": [...]}` with values in
//! pixel-major order, K per pixel. A class grid replaces `n_classes` and
//! `values` with a row-major `codes` array.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use lcsmooth_stack::{ClassGrid, GridShape, ProbabilityGrid, smoothed_name};

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct GridFile {
    rows: usize,
    cols: usize,
    n_classes: usize,
    values: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct ClassGridFile<'a> {
    rows: usize,
    cols: usize,
    codes: &'a [u16],
}

/// Reads one probability grid.
pub fn read_grid(path: &Path) -> Result<ProbabilityGrid> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read grid: {}", path.display()))?;
    let file: GridFile = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse grid JSON: {}", path.display()))?;
    let shape = GridShape::new(file.rows, file.cols);
    ProbabilityGrid::from_values(shape, file.n_classes, file.values)
        .with_context(|| format!("malformed grid: {}", path.display()))
}

/// Writes one probability grid.
pub fn write_grid(path: &Path, grid: &ProbabilityGrid) -> Result<()> {
    let file = GridFile {
        rows: grid.shape().rows,
        cols: grid.shape().cols,
        n_classes: grid.n_classes(),
        values: grid.values().to_vec(),
    };
    let json = serde_json::to_string(&file).context("failed to serialise grid")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write grid: {}", path.display()))
}

/// Writes one class grid.
pub fn write_class_grid(path: &Path, grid: &ClassGrid) -> Result<()> {
    let file = ClassGridFile {
        rows: grid.shape().rows,
        cols: grid.shape().cols,
        codes: grid.codes(),
    };
    let json = serde_json::to_string(&file).context("failed to serialise class grid")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write class grid: {}", path.display()))
}

/// Output location for `input`: the suffixed name, next to the input or
/// inside `output_dir`.
pub fn output_path(input: &Path, output_dir: Option<&Path>, suffix: &str) -> PathBuf {
    let named = smoothed_name(input, suffix);
    match output_dir {
        Some(dir) => dir.join(named.file_name().unwrap_or_default()),
        None => named,
    }
}
