//! Electricity demand projection and daily load shape.

use std::f64::consts::PI;

use crate::config::DemandConfig;

/// Hours in a non-leap year.
pub const HOURS_PER_YEAR: f64 = 8760.0;

/// Steps in the representative day.
pub const HOURS_PER_DAY: usize = 24;

/// Net demand path over the analysis horizon.
#[derive(Debug, Clone)]
pub struct DemandProjection {
    /// Net demand per analysis year (GWh).
    pub demand_gwh: Vec<f64>,
}

impl DemandProjection {
    /// Projects demand for years `0..=horizon`.
    ///
    /// Growth compounds at `growth_rate` until the switch year, then at
    /// `long_run_growth`.
    ///
    /// # Arguments
    ///
    /// * `cfg` - Demand configuration
    /// * `base_year` - Calendar year of index 0
    /// * `horizon` - Last analysis-year index
    pub fn project(cfg: &DemandConfig, base_year: i32, horizon: u32) -> Self {
        let mut demand_gwh = Vec::with_capacity(horizon as usize + 1);
        let mut d = cfg.base_demand_gwh;
        demand_gwh.push(d);
        for t in 1..=horizon as i32 {
            let g = if base_year + t <= cfg.growth_switch_year {
                cfg.growth_rate
            } else {
                cfg.long_run_growth
            };
            d *= 1.0 + g;
            demand_gwh.push(d);
        }
        Self { demand_gwh }
    }

    /// Net demand in year `t` (GWh).
    pub fn net_gwh(&self, t: u32) -> f64 {
        self.demand_gwh[t as usize]
    }
}

/// Gross generation needed to deliver `net_gwh` through losses.
pub fn gross_generation_gwh(net_gwh: f64, loss_fraction: f64) -> f64 {
    net_gwh / (1.0 - loss_fraction)
}

/// Peak demand (MW) implied by annual energy and load factor.
pub fn peak_mw(gross_gwh: f64, load_factor: f64) -> f64 {
    gross_gwh * 1000.0 / (HOURS_PER_YEAR * load_factor)
}

/// Normalised hourly load shape with mean 1.
///
/// `1 + a·sin(2πh/24 + φ)`; the sine sums to zero over whole days.
pub fn load_shape(amplitude: f64, phase_rad: f64) -> [f64; HOURS_PER_DAY] {
    let mut shape = [0.0; HOURS_PER_DAY];
    for (h, v) in shape.iter_mut().enumerate() {
        let angle = 2.0 * PI * h as f64 / HOURS_PER_DAY as f64 + phase_rad;
        *v = 1.0 + amplitude * angle.sin();
    }
    shape
}
