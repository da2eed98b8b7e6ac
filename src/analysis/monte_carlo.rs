//! Monte Carlo simulation over triangular parameter distributions.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Triangular};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::ModelConfig;
use crate::error::{CbaError, Result};
use crate::model::scenario::ScenarioId;
use crate::params::{ParameterId, ParameterTable};

use super::comparisons_for;

/// Parameter values and resulting NPVs of one draw.
#[derive(Debug, Clone, Serialize)]
pub struct Draw {
    pub iteration: usize,
    /// Sampled values in `ParameterId::ALL` order.
    pub parameters: Vec<f64>,
    /// NPV per alternative in `ScenarioId::ALTERNATIVES` order (USD m).
    pub npv_usd_m: Vec<f64>,
}

/// NPV distribution of one alternative.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioStats {
    pub scenario: ScenarioId,
    pub mean_npv_usd_m: f64,
    pub std_npv_usd_m: f64,
    pub p5_npv_usd_m: f64,
    pub p50_npv_usd_m: f64,
    pub p95_npv_usd_m: f64,
    pub min_npv_usd_m: f64,
    pub max_npv_usd_m: f64,
    /// Share of draws with NPV > 0.
    pub prob_positive: f64,
    /// Mean BCR over draws where it is defined.
    pub mean_bcr: Option<f64>,
    /// Share of draws in which this alternative has the highest NPV.
    pub prob_best: f64,
}

/// Monte Carlo results.
#[derive(Debug, Clone, Serialize)]
pub struct MonteCarloReport {
    pub iterations: usize,
    pub seed: u64,
    pub scenarios: Vec<ScenarioStats>,
    /// Share of draws in which no alternative beats the baseline.
    pub status_quo_prob_best: f64,
    pub draws: Vec<Draw>,
}

impl MonteCarloReport {
    pub fn stats(&self, scenario: ScenarioId) -> Option<&ScenarioStats> {
        self.scenarios.iter().find(|s| s.scenario == scenario)
    }
}

/// Runs `iterations` draws seeded with `seed`.
///
/// Every registered parameter with a non-degenerate range is sampled from a
/// triangular distribution with mode at the base value. Degenerate ranges
/// stay at their base value.
///
/// # Errors
///
/// Returns `CbaError::Sampling` if a range cannot define a triangular
/// distribution.
pub fn run(
    cfg: &ModelConfig,
    table: &ParameterTable,
    iterations: usize,
    seed: u64,
) -> Result<MonteCarloReport> {
    let samplers = ParameterId::ALL
        .into_iter()
        .map(|id| {
            let range = table.range(id, cfg);
            if range.is_degenerate() {
                return Ok((id, None, range.base));
            }
            Triangular::new(range.low, range.high, range.base)
                .map(|d| (id, Some(d), range.base))
                .map_err(|e| CbaError::Sampling {
                    parameter: id.name().to_string(),
                    message: e.to_string(),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut rng = StdRng::seed_from_u64(seed);
    let n_alt = ScenarioId::ALTERNATIVES.len();
    let mut draws = Vec::with_capacity(iterations);
    let mut bcrs: Vec<Vec<f64>> = vec![Vec::new(); n_alt];
    let progress_step = (iterations / 10).max(1);

    for iteration in 0..iterations {
        let mut c = cfg.clone();
        let mut parameters = Vec::with_capacity(samplers.len());
        for (id, dist, base) in &samplers {
            let value = dist.as_ref().map_or(*base, |d| d.sample(&mut rng));
            id.set(&mut c, value);
            parameters.push(value);
        }

        let comparisons = comparisons_for(&c);
        for (k, comp) in comparisons.iter().enumerate() {
            if let Some(b) = comp.bcr {
                bcrs[k].push(b);
            }
        }
        draws.push(Draw {
            iteration,
            parameters,
            npv_usd_m: comparisons.iter().map(|c| c.npv_usd_m).collect(),
        });

        if (iteration + 1) % progress_step == 0 {
            debug!(done = iteration + 1, total = iterations, "monte carlo progress");
        }
    }

    let mut best_counts = vec![0usize; n_alt];
    let mut status_quo_best = 0usize;
    for d in &draws {
        match best_alternative(&d.npv_usd_m) {
            Some(k) => best_counts[k] += 1,
            None => status_quo_best += 1,
        }
    }

    let share = |count: usize| {
        if iterations == 0 {
            0.0
        } else {
            count as f64 / iterations as f64
        }
    };

    let scenarios = ScenarioId::ALTERNATIVES
        .iter()
        .enumerate()
        .map(|(k, &scenario)| {
            let mut npvs: Vec<f64> = draws.iter().filter_map(|d| d.npv_usd_m.get(k).copied()).collect();
            npvs.sort_by(f64::total_cmp);
            let (mean, std) = mean_std(&npvs);
            ScenarioStats {
                scenario,
                mean_npv_usd_m: mean,
                std_npv_usd_m: std,
                p5_npv_usd_m: percentile(&npvs, 0.05),
                p50_npv_usd_m: percentile(&npvs, 0.50),
                p95_npv_usd_m: percentile(&npvs, 0.95),
                min_npv_usd_m: npvs.first().copied().unwrap_or(0.0),
                max_npv_usd_m: npvs.last().copied().unwrap_or(0.0),
                prob_positive: share(npvs.iter().filter(|&&v| v > 0.0).count()),
                mean_bcr: (!bcrs[k].is_empty())
                    .then(|| bcrs[k].iter().sum::<f64>() / bcrs[k].len() as f64),
                prob_best: share(best_counts[k]),
            }
        })
        .collect();

    info!(iterations, seed, "monte carlo complete");

    Ok(MonteCarloReport {
        iterations,
        seed,
        scenarios,
        status_quo_prob_best: share(status_quo_best),
        draws,
    })
}

/// Index of the alternative with the highest positive NPV; `None` when the baseline (NPV 0) wins.
///
/// Ties go to the lowest index.
fn best_alternative(npvs: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (k, &v) in npvs.iter().enumerate() {
        if v > best.map_or(0.0, |(_, b)| b) {
            best = Some((k, v));
        }
    }
    best.map(|(k, _)| k)
}

fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, var.sqrt())
}

/// Percentile of sorted values with linear interpolation between order statistics.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let h = (n - 1) as f64 * p.clamp(0.0, 1.0);
            let lo = h.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_interpolates() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&v, 0.0), 1.0);
        assert_eq!(percentile(&v, 0.5), 3.0);
        assert_eq!(percentile(&v, 1.0), 5.0);
        assert!((percentile(&v, 0.05) - 1.2).abs() < 1e-12);
        assert_eq!(percentile(&[], 0.5), 0.0);
    }

    #[test]
    fn sample_std() {
        let (m, s) = mean_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(m, 5.0);
        assert!((s - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn baseline_wins_when_nothing_is_positive() {
        assert_eq!(best_alternative(&[-1.0, -5.0]), None);
        assert_eq!(best_alternative(&[-1.0, 3.0, 2.0]), Some(1));
    }

    #[test]
    fn tied_alternatives_go_to_the_earliest() {
        assert_eq!(best_alternative(&[2.0, 5.0, 5.0, 1.0]), Some(1));
        assert_eq!(best_alternative(&[0.0, 0.0]), None);
    }

    #[test]
    fn same_seed_same_draws() {
        let cfg = ModelConfig::base_case();
        let table = ParameterTable::defaults(&cfg);
        let a = run(&cfg, &table, 4, 7).expect("runs");
        let b = run(&cfg, &table, 4, 7).expect("runs");
        assert_eq!(a.draws.len(), 4);
        for (x, y) in a.draws.iter().zip(&b.draws) {
            assert_eq!(x.parameters, y.parameters);
            assert_eq!(x.npv_usd_m, y.npv_usd_m);
        }
        let c = run(&cfg, &table, 4, 8).expect("runs");
        assert_ne!(a.draws[0].parameters, c.draws[0].parameters);
    }

    #[test]
    fn draws_stay_inside_ranges_and_probabilities_sum_to_one() {
        let cfg = ModelConfig::base_case();
        let table = ParameterTable::defaults(&cfg);
        let report = run(&cfg, &table, 6, 42).expect("runs");
        for d in &report.draws {
            for (id, v) in ParameterId::ALL.iter().zip(&d.parameters) {
                let r = table.range(*id, &cfg);
                assert!(*v >= r.low && *v <= r.high, "{id} = {v}");
            }
        }
        let total: f64 = report.scenarios.iter().map(|s| s.prob_best).sum::<f64>()
            + report.status_quo_prob_best;
        assert!((total - 1.0).abs() < 1e-12);
        for s in &report.scenarios {
            assert!(s.p5_npv_usd_m <= s.p50_npv_usd_m && s.p50_npv_usd_m <= s.p95_npv_usd_m);
            assert!(s.min_npv_usd_m <= s.p5_npv_usd_m);
        }
    }

    #[test]
    fn degenerate_ranges_hold_base_value() {
        let cfg = ModelConfig::base_case();
        let data = "category,parameter,value,low,high,unit,source\n\
                    fuel,diesel_price,0.9,0.9,0.9,USD/litre,\n";
        let mut table = ParameterTable::defaults(&cfg);
        table.overlay(ParameterTable::from_csv_reader(data.as_bytes()).expect("csv"));
        let report = run(&cfg, &table, 3, 1).expect("runs");
        let k = ParameterId::ALL
            .iter()
            .position(|&id| id == ParameterId::DieselPrice)
            .expect("registered");
        assert!(report.draws.iter().all(|d| d.parameters[k] == 0.9));
    }
}
