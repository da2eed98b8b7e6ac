//! Uncertainty and ranking layers run on top of the deterministic model.

pub mod mca;
pub mod monte_carlo;
pub mod sensitivity;

use crate::config::ModelConfig;
use crate::economics::metrics::{Comparison, compare_all};
use crate::model::engine::evaluate_all;

/// Evaluates every pathway under `cfg` and compares the alternatives with the baseline.
pub(crate) fn comparisons_for(cfg: &ModelConfig) -> Vec<Comparison> {
    let outcomes = evaluate_all(cfg);
    let df = cfg.analysis.discount.factors(cfg.horizon());
    compare_all(&outcomes, &df)
}
