//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use island_cba::config::ModelConfig;
use island_cba::runner::{AnalysisOptions, ModelRun, run_model};

/// Base-case configuration.
pub fn base_config() -> ModelConfig {
    ModelConfig::base_case()
}

/// Base case with a small Monte Carlo sample for fast tests.
pub fn quick_config(iterations: usize) -> ModelConfig {
    let mut cfg = ModelConfig::base_case();
    cfg.analysis.monte_carlo_iterations = iterations;
    cfg
}

/// Deterministic run only.
pub fn deterministic_options() -> AnalysisOptions {
    AnalysisOptions {
        sensitivity: false,
        monte_carlo: false,
    }
}

/// Deterministic base-case run.
pub fn base_run() -> ModelRun {
    run_model(&base_config())
}

/// Relative comparison with an absolute floor of 1.0.
pub fn approx_eq(a: f64, b: f64, rel: f64) -> bool {
    (a - b).abs() <= rel * a.abs().max(b.abs()).max(1.0)
}
