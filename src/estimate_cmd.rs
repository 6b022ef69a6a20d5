//! Estimate command: print the transition matrix a smoothing run would use.

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::{info, info_span};

use lcsmooth_markov::estimate_transitions;
use lcsmooth_stack::load_stack;

use crate::cli::EstimateArgs;
use crate::config::LcsmoothConfig;
use crate::{convert, raster};

#[derive(Debug, Serialize)]
struct MatrixReport<'a> {
    n_classes: usize,
    prior: &'a str,
    prior_weight: f64,
    rows: Vec<Vec<f64>>,
}

/// Run the estimation step alone.
pub fn run(args: EstimateArgs) -> Result<()> {
    let _cmd = info_span!("estimate").entered();
    let config = LcsmoothConfig::load(&args.config)?;
    let estimator = convert::build_estimator_config(&config.model)?;

    if config.io.inputs.is_empty() {
        bail!("no inputs: set [io].inputs in config");
    }
    let grids = config
        .io
        .inputs
        .iter()
        .map(|p| raster::read_grid(p))
        .collect::<Result<Vec<_>>>()?;
    let stack = load_stack(&grids).context("input grids disagree")?;
    let matrix = estimate_transitions(&stack, &estimator).context("estimation failed")?;

    let report = MatrixReport {
        n_classes: matrix.n_classes(),
        prior: estimator.prior().name(),
        prior_weight: estimator.prior_weight(),
        rows: matrix.to_rows(),
    };
    let json = serde_json::to_string_pretty(&report).context("failed to serialise matrix")?;
    match args.output {
        Some(path) => {
            std::fs::write(&path, &json)
                .with_context(|| format!("failed to write matrix: {}", path.display()))?;
            info!(path = %path.display(), "matrix written");
        }
        None => println!("{json}"),
    }
    Ok(())
}
