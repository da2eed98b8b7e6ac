//! Incremental cost-benefit metrics of each alternative against the baseline.

use std::fmt;

use serde::Serialize;

use crate::model::discount::{npv_at_rate, present_value};
use crate::model::scenario::ScenarioId;
use crate::model::types::{AnnualRecord, ScenarioOutcome};

/// Lower bracket for the IRR search.
const IRR_LOW: f64 = -0.99;
/// Upper bracket for the IRR search.
const IRR_HIGH: f64 = 1.0;
const IRR_TOLERANCE: f64 = 1e-9;
const IRR_MAX_ITER: usize = 200;

/// Present value of benefits by source (USD m).
#[derive(Debug, Clone, Default, Serialize)]
pub struct BenefitBreakdown {
    pub fuel_savings: f64,
    pub avoided_emissions: f64,
    pub avoided_health: f64,
}

impl BenefitBreakdown {
    pub fn total(&self) -> f64 {
        self.fuel_savings + self.avoided_emissions + self.avoided_health
    }
}

/// CBA result for one alternative against the status quo.
///
/// Computed from the two scenario outcomes so that reported metrics always
/// match the annual streams.
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub scenario: ScenarioId,
    /// Net present value (USD m).
    pub npv_usd_m: f64,
    /// Benefit-cost ratio, `None` when incremental costs are not positive.
    pub bcr: Option<f64>,
    /// Internal rate of return of the net incremental stream.
    pub irr: Option<f64>,
    /// PV of benefits (USD m).
    pub pv_benefits_usd_m: f64,
    /// PV of incremental costs (USD m).
    pub pv_costs_usd_m: f64,
    pub benefits: BenefitBreakdown,
    /// Cumulative emissions avoided (t).
    pub emission_reduction_t: f64,
    /// Avoided emissions as a share of the baseline.
    pub emission_reduction_pct: f64,
    /// LCOE difference to the baseline (USD/kWh).
    pub incremental_lcoe_usd_per_kwh: f64,
    /// Net incremental benefit per year (USD m).
    pub net_flows_usd_m: Vec<f64>,
}

impl Comparison {
    /// Compares `alt` against `baseline` using discount factors `df`.
    pub fn between(baseline: &ScenarioOutcome, alt: &ScenarioOutcome, df: &[f64]) -> Self {
        let diff = |f: fn(&AnnualRecord) -> f64, minuend: &ScenarioOutcome, subtrahend: &ScenarioOutcome| {
            minuend
                .records
                .iter()
                .zip(&subtrahend.records)
                .map(|(m, s)| f(m) - f(s))
                .collect::<Vec<f64>>()
        };

        let fuel_savings = diff(|r| r.fuel_usd_m, baseline, alt);
        let avoided_emissions = diff(|r| r.emission_cost_usd_m, baseline, alt);
        let avoided_health = diff(|r| r.health_cost_usd_m, baseline, alt);
        let costs = diff(|r| r.system_cost_usd_m(), alt, baseline);

        let benefits = BenefitBreakdown {
            fuel_savings: present_value(&fuel_savings, df),
            avoided_emissions: present_value(&avoided_emissions, df),
            avoided_health: present_value(&avoided_health, df),
        };
        let pv_benefits = benefits.total();
        let pv_costs = present_value(&costs, df);

        let net_flows: Vec<f64> = (0..costs.len())
            .map(|t| fuel_savings[t] + avoided_emissions[t] + avoided_health[t] - costs[t])
            .collect();

        let emission_reduction_t = baseline.cumulative_emissions_t - alt.cumulative_emissions_t;
        let emission_reduction_pct = if baseline.cumulative_emissions_t > 0.0 {
            100.0 * emission_reduction_t / baseline.cumulative_emissions_t
        } else {
            0.0
        };

        Self {
            scenario: alt.scenario,
            npv_usd_m: pv_benefits - pv_costs,
            bcr: (pv_costs > 0.0).then(|| pv_benefits / pv_costs),
            irr: irr(&net_flows),
            pv_benefits_usd_m: pv_benefits,
            pv_costs_usd_m: pv_costs,
            benefits,
            emission_reduction_t,
            emission_reduction_pct,
            incremental_lcoe_usd_per_kwh: alt.lcoe_usd_per_kwh - baseline.lcoe_usd_per_kwh,
            net_flows_usd_m: net_flows,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bcr = self
            .bcr
            .map_or_else(|| "n/a".to_string(), |b| format!("{b:.2}"));
        let irr = self
            .irr
            .map_or_else(|| "n/a".to_string(), |r| format!("{:.1}%", r * 100.0));
        write!(
            f,
            "{:<26} | NPV={:>9.1}m  BCR={:>5}  IRR={:>6}  CO2 avoided={:>5.1}%",
            self.scenario.to_string(),
            self.npv_usd_m,
            bcr,
            irr,
            self.emission_reduction_pct,
        )
    }
}

/// Compares every non-baseline outcome against the status quo.
///
/// Returns an empty list when `outcomes` has no status-quo entry.
pub fn compare_all(outcomes: &[ScenarioOutcome], df: &[f64]) -> Vec<Comparison> {
    let Some(baseline) = outcomes.iter().find(|o| o.scenario == ScenarioId::StatusQuo) else {
        return Vec::new();
    };
    outcomes
        .iter()
        .filter(|o| o.scenario != ScenarioId::StatusQuo)
        .map(|alt| Comparison::between(baseline, alt, df))
        .collect()
}

/// Internal rate of return by bisection.
///
/// Returns `None` when the NPV does not change sign over [-99%, 100%].
pub fn irr(flows: &[f64]) -> Option<f64> {
    let mut lo = IRR_LOW;
    let mut hi = IRR_HIGH;
    let mut f_lo = npv_at_rate(flows, lo);
    let f_hi = npv_at_rate(flows, hi);
    if !f_lo.is_finite() || !f_hi.is_finite() || f_lo * f_hi > 0.0 {
        return None;
    }
    // Flat at zero: no sign change to locate
    if f_lo == 0.0 && f_hi == 0.0 {
        return None;
    }
    if f_lo == 0.0 {
        return Some(lo);
    }
    if f_hi == 0.0 {
        return Some(hi);
    }

    for _ in 0..IRR_MAX_ITER {
        let mid = 0.5 * (lo + hi);
        let f_mid = npv_at_rate(flows, mid);
        if f_mid.abs() < IRR_TOLERANCE || (hi - lo) < IRR_TOLERANCE {
            return Some(mid);
        }
        if f_lo * f_mid < 0.0 {
            hi = mid;
        } else {
            lo = mid;
            f_lo = f_mid;
        }
    }
    Some(0.5 * (lo + hi))
}
