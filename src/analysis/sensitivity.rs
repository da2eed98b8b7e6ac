//! One-way sensitivity of each alternative's NPV to every registered parameter.

use serde::Serialize;
use tracing::debug;

use crate::config::ModelConfig;
use crate::model::scenario::ScenarioId;
use crate::params::{ParameterId, ParameterTable};

use super::comparisons_for;

/// NPV response of one alternative to one parameter.
#[derive(Debug, Clone, Serialize)]
pub struct SensitivityRow {
    pub scenario: ScenarioId,
    pub parameter: ParameterId,
    pub low: f64,
    pub base: f64,
    pub high: f64,
    pub npv_low: f64,
    pub npv_base: f64,
    pub npv_high: f64,
    /// |npv_high − npv_low| (USD m).
    pub swing: f64,
    /// Parameter value at which NPV crosses zero, if inside the range.
    pub switching_value: Option<f64>,
}

/// Results of the one-way sensitivity analysis.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SensitivityReport {
    pub rows: Vec<SensitivityRow>,
}

impl SensitivityReport {
    /// Rows of one scenario ordered by descending swing.
    pub fn tornado(&self, scenario: ScenarioId) -> Vec<&SensitivityRow> {
        let mut rows: Vec<&SensitivityRow> =
            self.rows.iter().filter(|r| r.scenario == scenario).collect();
        rows.sort_by(|a, b| b.swing.total_cmp(&a.swing));
        rows
    }
}

/// Runs every registered parameter at its low and high value with the rest at base.
///
/// `cfg` must already carry the table's base values.
pub fn run(cfg: &ModelConfig, table: &ParameterTable) -> SensitivityReport {
    let base_npvs: Vec<(ScenarioId, f64)> = npvs(cfg);
    let mut rows = Vec::with_capacity(ParameterId::ALL.len() * base_npvs.len());

    for id in ParameterId::ALL {
        let range = table.range(id, cfg);
        let npv_at = |value: f64| {
            let mut c = cfg.clone();
            id.set(&mut c, value);
            npvs(&c)
        };
        let low_npvs = npv_at(range.low);
        let high_npvs = npv_at(range.high);

        for ((&(scenario, npv_base), &(_, npv_low)), &(_, npv_high)) in
            base_npvs.iter().zip(&low_npvs).zip(&high_npvs)
        {
            rows.push(SensitivityRow {
                scenario,
                parameter: id,
                low: range.low,
                base: range.base,
                high: range.high,
                npv_low,
                npv_base,
                npv_high,
                swing: (npv_high - npv_low).abs(),
                switching_value: switching_value(
                    [range.low, range.base, range.high],
                    [npv_low, npv_base, npv_high],
                ),
            });
        }
        debug!(parameter = %id, "sensitivity runs complete");
    }

    SensitivityReport { rows }
}

fn npvs(cfg: &ModelConfig) -> Vec<(ScenarioId, f64)> {
    comparisons_for(cfg)
        .into_iter()
        .map(|c| (c.scenario, c.npv_usd_m))
        .collect()
}

/// First zero crossing of the piecewise-linear NPV curve through the three points.
pub fn switching_value(x: [f64; 3], npv: [f64; 3]) -> Option<f64> {
    if npv[1] == 0.0 {
        return Some(x[1]);
    }
    for i in 0..2 {
        let (x0, x1) = (x[i], x[i + 1]);
        let (y0, y1) = (npv[i], npv[i + 1]);
        if x1 <= x0 {
            continue;
        }
        if y0 == 0.0 {
            return Some(x0);
        }
        if y0 * y1 < 0.0 || y1 == 0.0 {
            return Some(x0 + (x1 - x0) * y0 / (y0 - y1));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switching_value_interpolates() {
        let sv = switching_value([0.0, 1.0, 2.0], [-10.0, 10.0, 30.0]).expect("crossing");
        assert!((sv - 0.5).abs() < 1e-12);
        let sv = switching_value([0.0, 1.0, 2.0], [10.0, 5.0, -5.0]).expect("crossing");
        assert!((sv - 1.5).abs() < 1e-12);
    }

    #[test]
    fn switching_value_none_without_crossing() {
        assert_eq!(switching_value([0.0, 1.0, 2.0], [1.0, 2.0, 3.0]), None);
        assert_eq!(switching_value([0.0, 1.0, 2.0], [-1.0, -2.0, -3.0]), None);
    }

    #[test]
    fn switching_value_skips_degenerate_segment() {
        // low == base: only the upper segment counts
        let sv = switching_value([1.0, 1.0, 3.0], [-4.0, -4.0, 4.0]).expect("crossing");
        assert!((sv - 2.0).abs() < 1e-12);
    }

    #[test]
    fn tornado_sorted_by_swing() {
        let row = |parameter, swing| SensitivityRow {
            scenario: ScenarioId::NationalGrid,
            parameter,
            low: 0.0,
            base: 0.0,
            high: 0.0,
            npv_low: 0.0,
            npv_base: 0.0,
            npv_high: 0.0,
            swing,
            switching_value: None,
        };
        let report = SensitivityReport {
            rows: vec![
                row(ParameterId::DieselPrice, 5.0),
                row(ParameterId::DiscountRate, 50.0),
                row(ParameterId::LngPrice, 0.0),
            ],
        };
        let t = report.tornado(ScenarioId::NationalGrid);
        assert_eq!(t[0].parameter, ParameterId::DiscountRate);
        assert_eq!(t[2].parameter, ParameterId::LngPrice);
        assert!(report.tornado(ScenarioId::MaximumRe).is_empty());
    }

    #[test]
    fn diesel_price_raises_renewable_npv() {
        let cfg = ModelConfig::base_case();
        let table = ParameterTable::defaults(&cfg);
        let report = run(&cfg, &table);
        assert_eq!(report.rows.len(), ParameterId::ALL.len() * ScenarioId::ALTERNATIVES.len());
        let row = report
            .rows
            .iter()
            .find(|r| r.scenario == ScenarioId::NationalGrid && r.parameter == ParameterId::DieselPrice)
            .expect("row exists");
        assert!(row.npv_high > row.npv_low);
        assert!(row.swing > 0.0);
    }
}
