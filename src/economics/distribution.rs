//! Distributional impact of tariff changes across income quintiles.

use serde::Serialize;

use crate::config::DistributionConfig;
use crate::model::scenario::ScenarioId;

/// Impact on one income quintile.
#[derive(Debug, Clone, Serialize)]
pub struct QuintileImpact {
    /// 1 = poorest.
    pub quintile: usize,
    pub income_usd: f64,
    pub consumption_kwh: f64,
    /// Change in household welfare (USD/yr, positive = better off).
    pub welfare_change_usd: f64,
    pub welfare_weight: f64,
    /// Electricity spend as a share of income at the base tariff.
    pub burden_before: f64,
    pub burden_after: f64,
}

/// Distributional result for one scenario.
#[derive(Debug, Clone, Serialize)]
pub struct DistributionalImpact {
    pub scenario: ScenarioId,
    /// Change in the residential tariff (USD/kWh).
    pub tariff_change_usd_per_kwh: f64,
    pub quintiles: Vec<QuintileImpact>,
    /// Aggregate welfare change (USD m/yr).
    pub unweighted_welfare_usd_m: f64,
    /// Aggregate welfare change with equity weights (USD m/yr).
    pub weighted_welfare_usd_m: f64,
    /// True when the poorest quintile's burden rises no more than the richest's.
    pub progressive: bool,
}

impl DistributionalImpact {
    /// Passes the LCOE difference to the baseline through to the tariff.
    pub fn compute(
        scenario: ScenarioId,
        lcoe_usd_per_kwh: f64,
        baseline_lcoe_usd_per_kwh: f64,
        cfg: &DistributionConfig,
    ) -> Self {
        let delta = cfg.pass_through * (lcoe_usd_per_kwh - baseline_lcoe_usd_per_kwh);
        let mean_income =
            cfg.quintile_income_usd.iter().sum::<f64>() / cfg.quintile_income_usd.len() as f64;
        let tariff_after = cfg.base_tariff_usd_per_kwh + delta;

        let quintiles: Vec<QuintileImpact> = cfg
            .quintile_income_usd
            .iter()
            .zip(&cfg.quintile_consumption_kwh)
            .enumerate()
            .map(|(i, (&income, &kwh))| QuintileImpact {
                quintile: i + 1,
                income_usd: income,
                consumption_kwh: kwh,
                welfare_change_usd: -delta * kwh,
                welfare_weight: (mean_income / income).powf(cfg.inequality_aversion),
                burden_before: cfg.base_tariff_usd_per_kwh * kwh / income,
                burden_after: tariff_after * kwh / income,
            })
            .collect();

        let scale = cfg.households_per_quintile / 1e6;
        let unweighted = quintiles.iter().map(|q| q.welfare_change_usd).sum::<f64>() * scale;
        let weighted = quintiles
            .iter()
            .map(|q| q.welfare_weight * q.welfare_change_usd)
            .sum::<f64>()
            * scale;

        let burden_change = |q: &QuintileImpact| q.burden_after - q.burden_before;
        let progressive = match (quintiles.first(), quintiles.last()) {
            (Some(poorest), Some(richest)) => burden_change(poorest) <= burden_change(richest) + 1e-15,
            _ => true,
        };

        Self {
            scenario,
            tariff_change_usd_per_kwh: delta,
            quintiles,
            unweighted_welfare_usd_m: unweighted,
            weighted_welfare_usd_m: weighted,
            progressive,
        }
    }
}
