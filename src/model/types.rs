//! Core model types: annual records and per-scenario outcomes.

use std::fmt;

use serde::Serialize;

use super::scenario::ScenarioId;

/// Complete record of one scenario-year.
///
/// Money in USD m (constant base-year prices), energy in GWh.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnnualRecord {
    /// Calendar year.
    pub year: i32,
    /// Analysis-year index (0 = base year).
    pub t: u32,
    /// Net demand delivered to customers.
    pub demand_gwh: f64,
    /// Generation required at the busbar, including losses.
    pub gross_generation_gwh: f64,
    /// Peak demand (MW).
    pub peak_mw: f64,
    /// Solar nameplate in service (MW).
    pub solar_mw: f64,
    /// Battery capacity in service (MWh).
    pub battery_mwh: f64,
    /// Diesel fleet capacity (MW).
    pub diesel_mw: f64,
    /// Renewable energy delivered (direct solar plus battery discharge).
    pub renewable_gwh: f64,
    pub curtailed_gwh: f64,
    pub import_gwh: f64,
    pub lng_gwh: f64,
    pub diesel_gwh: f64,
    /// Renewable share of gross generation.
    pub re_share: f64,
    pub capex_usd_m: f64,
    pub opex_usd_m: f64,
    pub fuel_usd_m: f64,
    pub import_cost_usd_m: f64,
    /// Residual asset value credited in the final year only.
    pub salvage_usd_m: f64,
    /// CO2 emissions (t).
    pub emissions_t: f64,
    pub emission_cost_usd_m: f64,
    pub health_cost_usd_m: f64,
}

impl AnnualRecord {
    /// Capital, operating and power-purchase cost net of salvage, excluding fuel.
    pub fn system_cost_usd_m(&self) -> f64 {
        self.capex_usd_m + self.opex_usd_m + self.import_cost_usd_m - self.salvage_usd_m
    }

    /// Total financial cost including fuel.
    pub fn financial_cost_usd_m(&self) -> f64 {
        self.system_cost_usd_m() + self.fuel_usd_m
    }

    /// Financial cost plus carbon and health damages.
    pub fn economic_cost_usd_m(&self) -> f64 {
        self.financial_cost_usd_m() + self.emission_cost_usd_m + self.health_cost_usd_m
    }

    /// Generation from imported fuel or power (GWh).
    pub fn imported_energy_gwh(&self) -> f64 {
        self.import_gwh + self.lng_gwh + self.diesel_gwh
    }
}

/// Present values of a scenario's cost streams (USD m).
#[derive(Debug, Clone, Default, Serialize)]
pub struct PresentValues {
    pub capex: f64,
    pub opex: f64,
    pub fuel: f64,
    pub import_cost: f64,
    pub salvage: f64,
    pub emission_cost: f64,
    pub health_cost: f64,
    /// Capex + opex + fuel + import − salvage.
    pub financial_cost: f64,
    /// Financial cost plus externalities.
    pub economic_cost: f64,
    /// Discounted gross generation (GWh).
    pub generation_gwh: f64,
}

/// All annual results and summary indicators for one scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub scenario: ScenarioId,
    pub records: Vec<AnnualRecord>,
    pub pv: PresentValues,
    /// Levelized cost of electricity (USD/kWh).
    pub lcoe_usd_per_kwh: f64,
    /// Cumulative CO2 emissions over the horizon (t).
    pub cumulative_emissions_t: f64,
    /// RE share in the final year.
    pub final_re_share: f64,
    /// Share of horizon gross generation not from imported fuel or power.
    pub domestic_share: f64,
    /// Qualitative implementation risk (1–5).
    pub implementation_risk: u8,
}

impl ScenarioOutcome {
    /// Capex per analysis year (USD m).
    pub fn capex_schedule(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.capex_usd_m).collect()
    }

    /// Extracts one stream from every record.
    pub fn stream(&self, f: impl Fn(&AnnualRecord) -> f64) -> Vec<f64> {
        self.records.iter().map(f).collect()
    }
}

impl fmt::Display for ScenarioOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<26} | PV cost={:>9.1}m  LCOE={:.3} $/kWh  RE(final)={:>5.1}%  CO2={:>7.2} Mt",
            self.scenario.to_string(),
            self.pv.financial_cost,
            self.lcoe_usd_per_kwh,
            self.final_re_share * 100.0,
            self.cumulative_emissions_t / 1e6,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_layers_add_up() {
        let r = AnnualRecord {
            capex_usd_m: 10.0,
            opex_usd_m: 2.0,
            fuel_usd_m: 5.0,
            import_cost_usd_m: 1.0,
            salvage_usd_m: 3.0,
            emission_cost_usd_m: 4.0,
            health_cost_usd_m: 0.5,
            ..AnnualRecord::default()
        };
        assert_eq!(r.system_cost_usd_m(), 10.0);
        assert_eq!(r.financial_cost_usd_m(), 15.0);
        assert_eq!(r.economic_cost_usd_m(), 19.5);
    }

    #[test]
    fn outcome_display_does_not_panic() {
        let o = ScenarioOutcome {
            scenario: ScenarioId::NationalGrid,
            records: vec![AnnualRecord::default()],
            pv: PresentValues::default(),
            lcoe_usd_per_kwh: 0.21,
            cumulative_emissions_t: 1.5e7,
            final_re_share: 0.55,
            domestic_share: 0.4,
            implementation_risk: 3,
        };
        let s = format!("{o}");
        assert!(s.contains("National grid"));
    }
}
