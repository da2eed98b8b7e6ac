//! Discount schedules and present-value helpers.

use serde::{Deserialize, Serialize};

/// One step of a declining discount schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountStep {
    /// First analysis-year index (0 = base year) at which `rate` applies.
    pub from_year: u32,
    /// Real annual discount rate.
    pub rate: f64,
}

/// Social discount rate over the analysis horizon.
///
/// A declining schedule compounds piecewise: years before a step keep the
/// earlier rate, so lowering the rate later never re-discounts the past.
///
/// # Examples
///
/// ```
/// use island_cba::model::discount::DiscountSchedule;
///
/// let schedule = DiscountSchedule::Constant { rate: 0.10 };
/// let df = schedule.factors(2);
/// assert_eq!(df[0], 1.0);
/// assert!((df[2] - 1.0 / 1.21).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiscountSchedule {
    Constant { rate: f64 },
    Declining { steps: Vec<DiscountStep> },
}

impl Default for DiscountSchedule {
    fn default() -> Self {
        Self::Constant { rate: 0.06 }
    }
}

impl DiscountSchedule {
    /// Rate applied when discounting year `t` back to year `t - 1`.
    pub fn rate_for_year(&self, t: u32) -> f64 {
        match self {
            Self::Constant { rate } => *rate,
            Self::Declining { steps } => steps
                .iter()
                .filter(|s| s.from_year <= t)
                .max_by_key(|s| s.from_year)
                .or_else(|| steps.first())
                .map_or(0.0, |s| s.rate),
        }
    }

    /// Shifts every rate so that the year-0 rate becomes `rate`.
    pub fn set_initial_rate(&mut self, rate: f64) {
        let delta = rate - self.rate_for_year(0);
        match self {
            Self::Constant { rate: r } => *r = rate,
            Self::Declining { steps } => {
                for s in steps.iter_mut() {
                    s.rate += delta;
                }
            }
        }
    }

    /// Discount factors for years `0..=horizon`, with `df[0] = 1`.
    pub fn factors(&self, horizon: u32) -> Vec<f64> {
        let mut out = Vec::with_capacity(horizon as usize + 1);
        let mut df = 1.0;
        out.push(df);
        for t in 1..=horizon {
            df /= 1.0 + self.rate_for_year(t);
            out.push(df);
        }
        out
    }

    /// Every rate in the schedule, for validation.
    pub fn rates(&self) -> Vec<f64> {
        match self {
            Self::Constant { rate } => vec![*rate],
            Self::Declining { steps } => steps.iter().map(|s| s.rate).collect(),
        }
    }
}

/// Present value of `flows` given matching discount factors.
///
/// Extra flows beyond the factor vector are ignored.
pub fn present_value(flows: &[f64], factors: &[f64]) -> f64 {
    flows.iter().zip(factors).map(|(cf, df)| cf * df).sum()
}

/// Present value at a constant rate, year 0 undiscounted.
pub fn npv_at_rate(flows: &[f64], rate: f64) -> f64 {
    let mut df = 1.0;
    let mut total = 0.0;
    for (t, cf) in flows.iter().enumerate() {
        if t > 0 {
            df /= 1.0 + rate;
        }
        total += cf * df;
    }
    total
}
