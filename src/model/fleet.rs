//! Vintage-cohort asset accounting: degradation, retirement and salvage.

use serde::Serialize;

/// Assets installed in the same year.
#[derive(Debug, Clone, Serialize)]
pub struct Cohort {
    /// Analysis-year index of commissioning (negative for pre-existing assets).
    pub install_year: i32,
    /// Nameplate capacity (MW or MWh).
    pub capacity: f64,
    /// Capital cost carried for salvage (USD m).
    pub capex_usd_m: f64,
    /// Economic lifetime (years).
    pub lifetime: u32,
}

impl Cohort {
    /// Returns `true` while the cohort is in service in year `t`.
    pub fn is_active(&self, t: i32) -> bool {
        t >= self.install_year && t < self.install_year + self.lifetime as i32
    }

    /// Age in years at `t` (0 in the commissioning year).
    pub fn age(&self, t: i32) -> i32 {
        t - self.install_year
    }
}

/// A collection of cohorts of one technology.
///
/// # Examples
///
/// ```
/// use island_cba::model::fleet::Fleet;
///
/// let mut solar = Fleet::new(25);
/// solar.add(0, 10.0, 1.5);
/// assert_eq!(solar.active_capacity(0), 10.0);
/// assert!(solar.effective_capacity(10, 0.01) < 10.0);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Fleet {
    lifetime: u32,
    cohorts: Vec<Cohort>,
}

impl Fleet {
    /// Creates an empty fleet whose cohorts share `lifetime`.
    ///
    /// # Panics
    ///
    /// Panics if `lifetime` is zero.
    pub fn new(lifetime: u32) -> Self {
        assert!(lifetime > 0, "lifetime must be > 0");
        Self {
            lifetime,
            cohorts: Vec::new(),
        }
    }

    /// Records a new cohort and returns its capex (USD m).
    ///
    /// `unit_cost` is in USD m per unit of capacity.
    pub fn add(&mut self, install_year: i32, capacity: f64, unit_cost: f64) -> f64 {
        if capacity <= 0.0 {
            return 0.0;
        }
        let capex = capacity * unit_cost;
        self.cohorts.push(Cohort {
            install_year,
            capacity,
            capex_usd_m: capex,
            lifetime: self.lifetime,
        });
        capex
    }

    /// Records pre-existing capacity whose capital cost is sunk.
    pub fn add_existing(&mut self, install_year: i32, capacity: f64) {
        if capacity > 0.0 {
            self.cohorts.push(Cohort {
                install_year,
                capacity,
                capex_usd_m: 0.0,
                lifetime: self.lifetime,
            });
        }
    }

    /// Records a lump asset (e.g. a cable) with its own lifetime.
    pub fn add_lump(&mut self, install_year: i32, capacity: f64, capex_usd_m: f64, lifetime: u32) {
        self.cohorts.push(Cohort {
            install_year,
            capacity,
            capex_usd_m,
            lifetime: lifetime.max(1),
        });
    }

    /// Nameplate capacity in service in year `t`.
    pub fn active_capacity(&self, t: i32) -> f64 {
        self.cohorts
            .iter()
            .filter(|c| c.is_active(t))
            .map(|c| c.capacity)
            .sum()
    }

    /// Degraded capacity in service in year `t`.
    ///
    /// Each cohort loses `degradation` of its output per year of age, so
    /// cohorts of different vintages contribute differently.
    pub fn effective_capacity(&self, t: i32, degradation: f64) -> f64 {
        self.cohorts
            .iter()
            .filter(|c| c.is_active(t))
            .map(|c| c.capacity * (1.0 - degradation).powi(c.age(t)))
            .sum()
    }

    /// Nameplate capacity whose life ends exactly at the start of year `t`.
    pub fn retiring_capacity(&self, t: i32) -> f64 {
        self.cohorts
            .iter()
            .filter(|c| c.install_year + c.lifetime as i32 == t)
            .map(|c| c.capacity)
            .sum()
    }

    /// Straight-line residual value (USD m) after the last analysis year.
    pub fn salvage_value(&self, last_year: i32) -> f64 {
        self.cohorts
            .iter()
            .filter(|c| c.install_year <= last_year)
            .map(|c| {
                let used = last_year - c.install_year + 1;
                let remaining = (c.lifetime as i32 - used).max(0);
                c.capex_usd_m * remaining as f64 / c.lifetime as f64
            })
            .sum()
    }

    /// All cohorts in insertion order.
    pub fn cohorts(&self) -> &[Cohort] {
        &self.cohorts
    }
}

/// Spreads `total` evenly over the construction years preceding `online_index`.
///
/// Years before the base year are folded into year 0. With zero
/// construction years the whole amount falls in the online year.
pub fn construction_schedule(
    total: f64,
    online_index: i32,
    construction_years: u32,
) -> Vec<(u32, f64)> {
    if construction_years == 0 {
        return vec![(online_index.max(0) as u32, total)];
    }
    let per_year = total / construction_years as f64;
    let mut out: Vec<(u32, f64)> = Vec::new();
    for k in 0..construction_years as i32 {
        let year = (online_index - construction_years as i32 + k).max(0) as u32;
        match out.last_mut() {
            Some((y, amount)) if *y == year => *amount += per_year,
            _ => out.push((year, per_year)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn cohort_active_window() {
        let mut f = Fleet::new(3);
        f.add(2, 5.0, 1.0);
        assert_eq!(f.active_capacity(1), 0.0);
        assert_eq!(f.active_capacity(2), 5.0);
        assert_eq!(f.active_capacity(4), 5.0);
        assert_eq!(f.active_capacity(5), 0.0);
        assert_eq!(f.retiring_capacity(5), 5.0);
    }

    #[test]
    fn vintages_degrade_independently() {
        let mut f = Fleet::new(25);
        f.add(0, 10.0, 1.0);
        f.add(5, 10.0, 1.0);
        let eff = f.effective_capacity(10, 0.01);
        let expected = 10.0 * 0.99_f64.powi(10) + 10.0 * 0.99_f64.powi(5);
        assert!((eff - expected).abs() < 1e-12);
    }

    #[test]
    fn existing_capacity_has_no_salvage() {
        let mut f = Fleet::new(25);
        f.add_existing(-5, 68.0);
        assert_eq!(f.active_capacity(0), 68.0);
        assert_eq!(f.retiring_capacity(20), 68.0);
        assert_eq!(f.salvage_value(30), 0.0);
    }

    #[test]
    fn salvage_is_straight_line() {
        let mut f = Fleet::new(20);
        f.add(25, 1.0, 100.0);
        // in service for years 25..=30 => 6 years used, 14 remaining
        assert!((f.salvage_value(30) - 100.0 * 14.0 / 20.0).abs() < 1e-9);
    }

    #[test]
    fn lump_asset_uses_own_lifetime() {
        let mut f = Fleet::new(25);
        f.add_lump(6, 200.0, 2350.0, 40);
        assert!((f.salvage_value(30) - 2350.0 * 15.0 / 40.0).abs() < 1e-9);
    }

    #[test]
    fn construction_spreads_before_online_year() {
        let s = construction_schedule(400.0, 6, 4);
        assert_eq!(s, vec![(2, 100.0), (3, 100.0), (4, 100.0), (5, 100.0)]);
    }

    #[test]
    fn construction_before_base_year_folds_into_year_zero() {
        let s = construction_schedule(300.0, 1, 3);
        assert_eq!(s, vec![(0, 300.0)]);
    }

    proptest! {
        #[test]
        fn salvage_never_exceeds_capex(
            install in 0_i32..30,
            life in 1_u32..50,
            capex in 0.0_f64..1000.0,
        ) {
            let mut f = Fleet::new(life);
            f.add(install, 1.0, capex);
            let s = f.salvage_value(30);
            prop_assert!(s >= 0.0);
            prop_assert!(s <= capex + 1e-9);
        }

        #[test]
        fn construction_schedule_conserves_total(
            total in 0.0_f64..5000.0,
            online in 0_i32..30,
            years in 0_u32..8,
        ) {
            let sum: f64 = construction_schedule(total, online, years).iter().map(|(_, a)| a).sum();
            prop_assert!((sum - total).abs() < 1e-6);
        }
    }
}
