//! Weighted multi-criteria ranking of the pathways.

use serde::Serialize;

use crate::config::McaWeights;
use crate::model::scenario::ScenarioId;

/// Score assigned to every scenario on a criterion with no spread.
const NO_SPREAD_SCORE: f64 = 0.5;

/// Criteria in the order of `McaWeights::as_array`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    /// NPV against the baseline.
    Economic,
    /// Cumulative emissions avoided.
    Emissions,
    /// Levelized cost of electricity.
    Affordability,
    /// Domestic share of generation.
    Security,
    /// Peak annual debt service.
    Fiscal,
    /// Equity-weighted welfare change.
    Equity,
    /// Implementation risk score.
    Implementation,
}

impl Criterion {
    pub const ALL: [Criterion; 7] = [
        Criterion::Economic,
        Criterion::Emissions,
        Criterion::Affordability,
        Criterion::Security,
        Criterion::Fiscal,
        Criterion::Equity,
        Criterion::Implementation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Criterion::Economic => "economic",
            Criterion::Emissions => "emissions",
            Criterion::Affordability => "affordability",
            Criterion::Security => "security",
            Criterion::Fiscal => "fiscal",
            Criterion::Equity => "equity",
            Criterion::Implementation => "implementation",
        }
    }

    pub fn higher_is_better(self) -> bool {
        !matches!(
            self,
            Criterion::Affordability | Criterion::Fiscal | Criterion::Implementation
        )
    }
}

/// Raw criterion values of one scenario, in `Criterion::ALL` order.
#[derive(Debug, Clone, Serialize)]
pub struct McaInput {
    pub scenario: ScenarioId,
    pub values: [f64; 7],
}

/// Normalised scores, weighted total and rank of one scenario.
#[derive(Debug, Clone, Serialize)]
pub struct McaScore {
    pub scenario: ScenarioId,
    pub raw: [f64; 7],
    /// Per-criterion score in [0, 1], 1 = best.
    pub normalized: [f64; 7],
    pub total: f64,
    /// 1 = best.
    pub rank: usize,
}

/// Min-max normalises every criterion and ranks the weighted totals.
///
/// Weights are rescaled to sum to one. Results are returned in input order.
pub fn score(inputs: &[McaInput], weights: &McaWeights) -> Vec<McaScore> {
    let w = weights.as_array();
    let w_sum: f64 = w.iter().sum();
    let w: Vec<f64> = if w_sum > 0.0 {
        w.iter().map(|x| x / w_sum).collect()
    } else {
        vec![1.0 / w.len() as f64; w.len()]
    };

    let mut scores: Vec<McaScore> = inputs
        .iter()
        .map(|i| McaScore {
            scenario: i.scenario,
            raw: i.values,
            normalized: [0.0; 7],
            total: 0.0,
            rank: 0,
        })
        .collect();

    for (c, criterion) in Criterion::ALL.into_iter().enumerate() {
        let min = inputs.iter().map(|i| i.values[c]).fold(f64::INFINITY, f64::min);
        let max = inputs
            .iter()
            .map(|i| i.values[c])
            .fold(f64::NEG_INFINITY, f64::max);
        let spread = max - min;
        for s in &mut scores {
            s.normalized[c] = if spread <= f64::EPSILON * max.abs().max(1.0) {
                NO_SPREAD_SCORE
            } else if criterion.higher_is_better() {
                (s.raw[c] - min) / spread
            } else {
                (max - s.raw[c]) / spread
            };
        }
    }

    for s in &mut scores {
        s.total = s.normalized.iter().zip(&w).map(|(n, w)| n * w).sum();
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total.total_cmp(&scores[a].total));
    for (rank, idx) in order.into_iter().enumerate() {
        scores[idx].rank = rank + 1;
    }
    scores
}
