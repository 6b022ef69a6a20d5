use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Temporal HMM smoothing of land-cover class-probability stacks.
#[derive(Parser)]
#[command(
    name = "lcsmooth",
    version,
    about = "Temporal HMM smoothing of land-cover class-probability stacks"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Estimate the transition matrix and smooth every pixel of the stack.
    Smooth(SmoothArgs),
    /// Estimate the transition matrix only.
    Estimate(EstimateArgs),
}

/// Arguments for the `smooth` subcommand.
#[derive(clap::Args)]
pub struct SmoothArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "lcsmooth.toml")]
    pub config: PathBuf,

    /// Override the smoothing method (forward, forward-backward).
    #[arg(short, long)]
    pub method: Option<String>,

    /// Override the prior blend weight in [0, 1].
    #[arg(short, long)]
    pub prior: Option<f64>,

    /// Override concurrency (-1 all workers, 0/1 sequential, N workers).
    #[arg(short, long, allow_hyphen_values = true)]
    pub jobs: Option<i64>,

    /// Override the output directory.
    #[arg(long = "output-dir")]
    pub output_dir: Option<PathBuf>,
}

/// Arguments for the `estimate` subcommand.
#[derive(clap::Args)]
pub struct EstimateArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "lcsmooth.toml")]
    pub config: PathBuf,

    /// Write the matrix as JSON to this path instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
