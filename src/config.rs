use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level lcsmooth configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct LcsmoothConfig {
    /// Input and output settings.
    #[serde(default)]
    pub io: IoToml,

    /// Transition model settings.
    #[serde(default)]
    pub model: ModelToml,

    /// Sweep settings.
    #[serde(default)]
    pub sweep: SweepToml,
}

impl LcsmoothConfig {
    /// Reads and parses a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let toml_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        toml::from_str(&toml_str).context("failed to parse TOML config")
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IoToml {
    /// Per-step probability grids, oldest first.
    #[serde(default)]
    pub inputs: Vec<PathBuf>,
    pub output_dir: Option<PathBuf>,
    #[serde(default = "default_suffix")]
    pub suffix: String,
    #[serde(default)]
    pub assign_class: bool,
    pub class_labels: Option<Vec<u16>>,
}

impl Default for IoToml {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            output_dir: None,
            suffix: default_suffix(),
            assign_class: false,
            class_labels: None,
        }
    }
}

fn default_suffix() -> String {
    lcsmooth_stack::DEFAULT_SUFFIX.to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelToml {
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default = "default_transition_prior")]
    pub transition_prior: f64,
    #[serde(default = "default_persistence")]
    pub persistence: f64,
    /// Explicit prior matrix; replaces the self-transition prior when set.
    pub prior_matrix: Option<Vec<Vec<f64>>>,
    #[serde(default = "default_sample_stride")]
    pub sample_stride: usize,
}

impl Default for ModelToml {
    fn default() -> Self {
        Self {
            method: default_method(),
            transition_prior: default_transition_prior(),
            persistence: default_persistence(),
            prior_matrix: None,
            sample_stride: default_sample_stride(),
        }
    }
}

fn default_method() -> String {
    "forward-backward".to_string()
}
fn default_transition_prior() -> f64 {
    lcsmooth_markov::DEFAULT_PRIOR_WEIGHT
}
fn default_persistence() -> f64 {
    lcsmooth_markov::DEFAULT_PERSISTENCE
}
fn default_sample_stride() -> usize {
    1
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepToml {
    #[serde(default = "default_concurrency")]
    pub concurrency: i64,
    #[serde(default = "default_block_rows")]
    pub block_rows: usize,
    #[serde(default)]
    pub lenient: bool,
    pub timeout_secs: Option<u64>,
}

impl Default for SweepToml {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            block_rows: default_block_rows(),
            lenient: false,
            timeout_secs: None,
        }
    }
}

fn default_concurrency() -> i64 {
    -1
}
fn default_block_rows() -> usize {
    lcsmooth_sweep::DEFAULT_BLOCK_ROWS
}
