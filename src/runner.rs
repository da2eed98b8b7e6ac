//! Full model runs: deterministic evaluation plus the optional uncertainty layers.

use serde::Serialize;
use tracing::info;

use crate::analysis::mca::{self, McaInput, McaScore};
use crate::analysis::monte_carlo::{self, MonteCarloReport};
use crate::analysis::sensitivity::{self, SensitivityReport};
use crate::config::ModelConfig;
use crate::economics::distribution::DistributionalImpact;
use crate::economics::financing::FinancingSummary;
use crate::economics::metrics::{Comparison, compare_all};
use crate::error::{CbaError, Result};
use crate::model::engine::evaluate_all;
use crate::model::scenario::ScenarioId;
use crate::model::types::ScenarioOutcome;
use crate::params::{ParameterId, ParameterTable};

/// Deterministic results for all seven pathways.
#[derive(Debug, Clone, Serialize)]
pub struct ModelRun {
    /// Calendar year of analysis year 0.
    pub base_year: i32,
    /// Discount factor per analysis year.
    pub discount_factors: Vec<f64>,
    /// One outcome per pathway, baseline first.
    pub outcomes: Vec<ScenarioOutcome>,
    /// One comparison per alternative.
    pub comparisons: Vec<Comparison>,
    pub financing: Vec<FinancingSummary>,
    pub distribution: Vec<DistributionalImpact>,
    pub mca: Vec<McaScore>,
}

impl ModelRun {
    pub fn outcome(&self, id: ScenarioId) -> Option<&ScenarioOutcome> {
        self.outcomes.iter().find(|o| o.scenario == id)
    }

    pub fn comparison(&self, id: ScenarioId) -> Option<&Comparison> {
        self.comparisons.iter().find(|c| c.scenario == id)
    }

    pub fn financing_for(&self, id: ScenarioId) -> Option<&FinancingSummary> {
        self.financing.iter().find(|f| f.scenario == id)
    }

    pub fn distribution_for(&self, id: ScenarioId) -> Option<&DistributionalImpact> {
        self.distribution.iter().find(|d| d.scenario == id)
    }

    /// MCA scores sorted by rank.
    pub fn ranking(&self) -> Vec<&McaScore> {
        let mut r: Vec<&McaScore> = self.mca.iter().collect();
        r.sort_by_key(|s| s.rank);
        r
    }
}

/// Which uncertainty layers `run_analysis` executes.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisOptions {
    pub sensitivity: bool,
    pub monte_carlo: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            sensitivity: true,
            monte_carlo: true,
        }
    }
}

/// Everything written to `results.json`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub config: ModelConfig,
    pub parameters: ParameterTable,
    pub run: ModelRun,
    pub sensitivity: Option<SensitivityReport>,
    pub monte_carlo: Option<MonteCarloReport>,
}

/// Evaluates every pathway and derives comparisons, financing, distribution and MCA.
pub fn run_model(cfg: &ModelConfig) -> ModelRun {
    let df = cfg.analysis.discount.factors(cfg.horizon());
    let outcomes = evaluate_all(cfg);
    let comparisons = compare_all(&outcomes, &df);
    let baseline_lcoe = outcomes
        .iter()
        .find(|o| o.scenario == ScenarioId::StatusQuo)
        .map_or(0.0, |o| o.lcoe_usd_per_kwh);

    let financing: Vec<FinancingSummary> = outcomes
        .iter()
        .map(|o| FinancingSummary::compute(o.scenario, &o.capex_schedule(), &cfg.financing, &df))
        .collect();
    let distribution: Vec<DistributionalImpact> = outcomes
        .iter()
        .map(|o| {
            DistributionalImpact::compute(
                o.scenario,
                o.lcoe_usd_per_kwh,
                baseline_lcoe,
                &cfg.distribution,
            )
        })
        .collect();

    let mca_inputs: Vec<McaInput> = outcomes
        .iter()
        .zip(&financing)
        .zip(&distribution)
        .map(|((o, f), d)| {
            let comparison = comparisons.iter().find(|c| c.scenario == o.scenario);
            McaInput {
                scenario: o.scenario,
                values: [
                    comparison.map_or(0.0, |c| c.npv_usd_m),
                    comparison.map_or(0.0, |c| c.emission_reduction_t),
                    o.lcoe_usd_per_kwh,
                    o.domestic_share,
                    f.peak_debt_service_usd_m,
                    d.weighted_welfare_usd_m,
                    f64::from(o.implementation_risk),
                ],
            }
        })
        .collect();
    let mca = mca::score(&mca_inputs, &cfg.mca);

    for o in &outcomes {
        info!(scenario = o.scenario.key(), lcoe = o.lcoe_usd_per_kwh, "scenario evaluated");
    }

    ModelRun {
        base_year: cfg.analysis.base_year,
        discount_factors: df,
        outcomes,
        comparisons,
        financing,
        distribution,
        mca,
    }
}

/// Applies `table` to `cfg`, validates, and runs the model plus the selected layers.
///
/// `table` may be partial: it is overlaid onto [`ParameterTable::defaults`]
/// for `cfg`, so parameters without a row keep `cfg`'s value as their base.
///
/// # Errors
///
/// Returns `CbaError::Validation` if the configuration is invalid after the
/// parameter table is applied, `CbaError::Parameter` if a row's low or high
/// value would make the configuration invalid, or a sampling error from
/// Monte Carlo.
pub fn run_analysis(
    cfg: &ModelConfig,
    table: &ParameterTable,
    options: AnalysisOptions,
) -> Result<AnalysisReport> {
    let mut full = ParameterTable::defaults(cfg);
    full.overlay(table.clone());

    let mut cfg = cfg.clone();
    full.apply_to(&mut cfg);
    let errors = cfg.validate();
    if !errors.is_empty() {
        return Err(CbaError::Validation(errors));
    }
    // Row numbers refer to the caller's table
    check_bounds(&cfg, table)?;
    let table = &full;

    let run = run_model(&cfg);

    let sensitivity = options.sensitivity.then(|| {
        info!(parameters = table.rows().len(), "running one-way sensitivity");
        sensitivity::run(&cfg, table)
    });

    let monte_carlo = if options.monte_carlo {
        let iterations = cfg.analysis.monte_carlo_iterations;
        info!(iterations, seed = cfg.analysis.seed, "running monte carlo");
        Some(monte_carlo::run(&cfg, table, iterations, cfg.analysis.seed)?)
    } else {
        None
    };

    Ok(AnalysisReport {
        config: cfg,
        parameters: table.clone(),
        run,
        sensitivity,
        monte_carlo,
    })
}

/// Rejects rows whose `low` or `high` end fails validation with every other value at base.
fn check_bounds(cfg: &ModelConfig, table: &ParameterTable) -> Result<()> {
    for (i, row) in table.rows().iter().enumerate() {
        let Some(id) = ParameterId::from_name(&row.parameter) else {
            continue;
        };
        for (end, value) in [("low", row.low), ("high", row.high)] {
            let mut c = cfg.clone();
            id.set(&mut c, value);
            if let Some(e) = c.validate().first() {
                return Err(CbaError::Parameter {
                    row: i + 1,
                    message: format!("{}: {end} value {value} is invalid ({e})", row.parameter),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_run_covers_every_pathway() {
        let run = run_model(&ModelConfig::base_case());
        assert_eq!(run.outcomes.len(), 7);
        assert_eq!(run.comparisons.len(), 6);
        assert_eq!(run.financing.len(), 7);
        assert_eq!(run.distribution.len(), 7);
        assert_eq!(run.mca.len(), 7);
        assert_eq!(run.ranking()[0].rank, 1);
        assert!(run.comparison(ScenarioId::StatusQuo).is_none());
        assert!(run.outcome(ScenarioId::LngTransition).is_some());
    }

    #[test]
    fn status_quo_has_no_tariff_change() {
        let run = run_model(&ModelConfig::base_case());
        let d = run.distribution_for(ScenarioId::StatusQuo).expect("present");
        assert_eq!(d.tariff_change_usd_per_kwh, 0.0);
    }

    #[test]
    fn comparison_npv_matches_its_streams() {
        let run = run_model(&ModelConfig::base_case());
        for c in &run.comparisons {
            let pv: f64 = c
                .net_flows_usd_m
                .iter()
                .zip(&run.discount_factors)
                .map(|(f, d)| f * d)
                .sum();
            assert!((pv - c.npv_usd_m).abs() < 1e-6 * c.npv_usd_m.abs().max(1.0));
        }
    }

    #[test]
    fn analysis_rejects_invalid_parameter_values() {
        let cfg = ModelConfig::base_case();
        let data = "category,parameter,value,low,high,unit,source\n\
                    technology,solar_capacity_factor,1.5,1.0,2.0,fraction,\n";
        let table = ParameterTable::from_csv_reader(data.as_bytes()).expect("csv parses");
        let options = AnalysisOptions {
            sensitivity: false,
            monte_carlo: false,
        };
        let err = run_analysis(&cfg, &table, options).unwrap_err();
        assert!(matches!(err, CbaError::Validation(_)));
    }

    #[test]
    fn analysis_rejects_ranges_outside_the_valid_domain() {
        let cfg = ModelConfig::base_case();
        let data = "category,parameter,value,low,high,unit,source\n\
                    technology,solar_capacity_factor,0.175,0.0,0.2,fraction,\n";
        let table = ParameterTable::from_csv_reader(data.as_bytes()).expect("csv parses");
        let err = run_analysis(&cfg, &table, AnalysisOptions::default()).unwrap_err();
        assert!(matches!(err, CbaError::Parameter { .. }));
        assert!(err.to_string().contains("solar_capacity_factor"));
        assert!(err.to_string().contains("low"));

        let data = "category,parameter,value,low,high,unit,source\n\
                    economic,discount_rate,0.06,-1.0,0.10,fraction,\n";
        let table = ParameterTable::from_csv_reader(data.as_bytes()).expect("csv parses");
        let err = run_analysis(&cfg, &table, AnalysisOptions::default()).unwrap_err();
        assert!(err.to_string().contains("discount_rate"));
    }

    #[test]
    fn partial_table_keeps_config_values_as_base() {
        let mut cfg = ModelConfig::high_fuel_price();
        cfg.analysis.monte_carlo_iterations = 40;
        let data = "category,parameter,value,low,high,unit,source\n\
                    technology,lng_capex,1200,900,1600,USD/kW,\n";
        let table = ParameterTable::from_csv_reader(data.as_bytes()).expect("csv parses");
        let report = run_analysis(&cfg, &table, AnalysisOptions::default()).expect("runs");

        let diesel = cfg.fuel.diesel_price_usd_per_litre;
        assert_eq!(report.config.fuel.diesel_price_usd_per_litre, diesel);
        assert_eq!(report.parameters.rows().len(), ParameterId::ALL.len());

        let sens = report.sensitivity.as_ref().expect("sensitivity ran");
        let row = sens
            .rows
            .iter()
            .find(|r| r.parameter == ParameterId::DieselPrice)
            .expect("diesel row");
        assert_eq!(row.base, diesel);
        let ng = report.run.comparison(ScenarioId::NationalGrid).expect("present");
        let ng_row = sens
            .rows
            .iter()
            .find(|r| r.parameter == ParameterId::DieselPrice && r.scenario == ScenarioId::NationalGrid)
            .expect("national grid row");
        assert!((ng_row.npv_base - ng.npv_usd_m).abs() < 1e-9);

        let mc = report.monte_carlo.as_ref().expect("monte carlo ran");
        let k = ParameterId::ALL
            .iter()
            .position(|&id| id == ParameterId::DieselPrice)
            .expect("registered");
        let mean = mc.draws.iter().map(|d| d.parameters[k]).sum::<f64>() / mc.draws.len() as f64;
        // triangular(0.60, 1.20, 1.10) has mean 0.9667
        assert!(mean > 0.9, "diesel draws centred on {mean}");
    }

    #[test]
    fn analysis_without_layers_skips_them() {
        let cfg = ModelConfig::base_case();
        let table = ParameterTable::defaults(&cfg);
        let options = AnalysisOptions {
            sensitivity: false,
            monte_carlo: false,
        };
        let report = run_analysis(&cfg, &table, options).expect("runs");
        assert!(report.sensitivity.is_none());
        assert!(report.monte_carlo.is_none());
        assert_eq!(report.run.outcomes.len(), 7);
    }
}
