//! Smooth command: estimate, sweep and write one output per input step.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing::{info, info_span, warn};

use lcsmooth_stack::{ProbabilityGrid, assign_classes, store_stack};
use lcsmooth_sweep::smooth_sources;

use crate::cli::SmoothArgs;
use crate::config::LcsmoothConfig;
use crate::{convert, raster};

/// Run the smoothing pipeline.
pub fn run(args: SmoothArgs) -> Result<()> {
    let _cmd = info_span!("smooth").entered();
    // 1. Load project TOML and apply CLI overrides
    let mut config = LcsmoothConfig::load(&args.config)?;
    if let Some(method) = args.method {
        config.model.method = method;
    }
    if let Some(prior) = args.prior {
        config.model.transition_prior = prior;
    }
    if let Some(jobs) = args.jobs {
        config.sweep.concurrency = jobs;
    }
    if let Some(dir) = args.output_dir {
        config.io.output_dir = Some(dir);
    }

    let method = convert::parse_method(&config.model.method)?;
    let estimator = convert::build_estimator_config(&config.model)?;
    let sweep = convert::build_sweep_config(&config.sweep)?;

    if config.io.inputs.is_empty() {
        bail!("no inputs: set [io].inputs in config");
    }
    let outputs: Vec<PathBuf> = config
        .io
        .inputs
        .iter()
        .map(|p| raster::output_path(p, config.io.output_dir.as_deref(), &config.io.suffix))
        .collect();
    if let Some(clash) = config.io.inputs.iter().find(|p| outputs.contains(p)) {
        bail!(
            "output would overwrite input {}: set [io].suffix or [io].output_dir",
            clash.display()
        );
    }

    // 2. Read the per-step grids
    let grids = config
        .io
        .inputs
        .iter()
        .map(|p| raster::read_grid(p))
        .collect::<Result<Vec<_>>>()?;
    info!(n_steps = grids.len(), method = %method, "inputs loaded");

    // 3. Estimate and sweep
    let (_, result) = smooth_sources(&grids, &estimator, method, &sweep)
        .context("smoothing failed")?
        .into_parts();
    if !result.substituted_blocks().is_empty() {
        warn!(
            blocks = ?result.substituted_blocks(),
            "some row blocks were left unsmoothed"
        );
    }
    let smoothed = result.into_smoothed();

    // 4. Write outputs
    if let Some(ref dir) = config.io.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output dir: {}", dir.display()))?;
    }
    if config.io.assign_class {
        let classes = assign_classes(&smoothed, config.io.class_labels.as_deref())
            .context("class assignment failed")?;
        for (grid, path) in classes.iter().zip(&outputs) {
            raster::write_class_grid(path, grid)?;
        }
    } else {
        let mut sinks: Vec<ProbabilityGrid> = (0..smoothed.n_steps())
            .map(|_| ProbabilityGrid::zeros(smoothed.shape(), smoothed.n_classes()))
            .collect();
        store_stack(&smoothed, &mut sinks).context("failed to assemble outputs")?;
        for (grid, path) in sinks.iter().zip(&outputs) {
            raster::write_grid(path, grid)?;
        }
    }

    info!(n_outputs = outputs.len(), "outputs written");
    Ok(())
}
