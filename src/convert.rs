//! Pure conversion functions: TOML config structs -> crate API config types.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::config::{ModelToml, SweepToml};

use lcsmooth_hmm::Method;
use lcsmooth_markov::{EstimatorConfig, FixedPrior, SelfTransitionPrior};
use lcsmooth_sweep::{Concurrency, SweepConfig};

/// Parses a smoothing method name into the corresponding enum variant.
pub fn parse_method(s: &str) -> Result<Method> {
    s.parse::<Method>()
        .with_context(|| format!("invalid [model].method {s:?}"))
}

/// Builds an [`EstimatorConfig`] from the TOML model configuration.
///
/// An explicit `prior_matrix` takes precedence over `persistence`.
pub fn build_estimator_config(model: &ModelToml) -> Result<EstimatorConfig> {
    let cfg = EstimatorConfig::new()
        .with_prior_weight(model.transition_prior)
        .with_sample_stride(model.sample_stride);
    let cfg = match model.prior_matrix {
        Some(ref rows) => {
            cfg.with_prior(FixedPrior::from_rows(rows).context("invalid [model].prior_matrix")?)
        }
        None => cfg.with_prior(
            SelfTransitionPrior::new(model.persistence).context("invalid [model].persistence")?,
        ),
    };
    cfg.validate().context("invalid [model] section")?;
    Ok(cfg)
}

/// Builds a [`SweepConfig`] from the TOML sweep configuration.
pub fn build_sweep_config(sweep: &SweepToml) -> Result<SweepConfig> {
    let concurrency =
        Concurrency::from_jobs(sweep.concurrency).context("invalid [sweep].concurrency")?;
    let mut cfg = SweepConfig::new()
        .with_concurrency(concurrency)
        .with_block_rows(sweep.block_rows)
        .with_lenient(sweep.lenient);
    if let Some(secs) = sweep.timeout_secs {
        cfg = cfg.with_timeout(Duration::from_secs(secs));
    }
    cfg.validate().context("invalid [sweep] section")?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names() {
        assert_eq!(parse_method("forward").unwrap(), Method::Forward);
        assert_eq!(
            parse_method("Forward-Backward").unwrap(),
            Method::ForwardBackward
        );
        assert!(parse_method("viterbi").is_err());
    }

    #[test]
    fn default_model_uses_self_transition_prior() {
        let cfg = build_estimator_config(&ModelToml::default()).unwrap();
        assert_eq!(cfg.prior().name(), "self-transition");
        assert!((cfg.prior_weight() - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn prior_matrix_selects_fixed_prior() {
        let model = ModelToml {
            prior_matrix: Some(vec![vec![0.9, 0.1], vec![0.2, 0.8]]),
            ..ModelToml::default()
        };
        let cfg = build_estimator_config(&model).unwrap();
        assert_eq!(cfg.prior().name(), "fixed");
    }

    #[test]
    fn bad_prior_weight_rejected() {
        let model = ModelToml {
            transition_prior: 1.5,
            ..ModelToml::default()
        };
        assert!(build_estimator_config(&model).is_err());
    }

    #[test]
    fn sweep_mapping() {
        let sweep = SweepToml {
            concurrency: 0,
            block_rows: 16,
            lenient: true,
            timeout_secs: Some(30),
        };
        let cfg = build_sweep_config(&sweep).unwrap();
        assert_eq!(cfg.concurrency(), Concurrency::Sequential);
        assert_eq!(cfg.block_rows(), 16);
        assert!(cfg.lenient());
        assert_eq!(cfg.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn bad_concurrency_rejected() {
        let sweep = SweepToml {
            concurrency: -5,
            ..SweepToml::default()
        };
        assert!(build_sweep_config(&sweep).is_err());
    }
}
