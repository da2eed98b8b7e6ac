//! Registry of uncertain parameters and the CSV parameter table.
//!
//! Every parameter that sensitivity analysis, Monte Carlo sampling or the
//! parameter CSV can touch is a [`ParameterId`]. Reads and writes of the
//! underlying [`ModelConfig`] field go through [`ParameterId::get`] and
//! [`ParameterId::set`] only.

use std::fmt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::error::{CbaError, Result};

/// An uncertain model parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterId {
    DiscountRate,
    DieselPrice,
    DieselEscalation,
    DieselConsumption,
    LngPrice,
    LngCapex,
    SolarCapex,
    SolarCapexDecline,
    SolarCapacityFactor,
    BatteryCapex,
    CableCapexPerKm,
    ImportPrice,
    GridCapexPerKm,
    DemandGrowth,
    SocialCostOfCarbon,
    HealthDamageDiesel,
}

/// Static metadata of a registered parameter.
#[derive(Debug, Clone, Copy)]
struct ParameterSpec {
    name: &'static str,
    category: &'static str,
    unit: &'static str,
    low: f64,
    high: f64,
    source: &'static str,
}

const fn spec(
    name: &'static str,
    category: &'static str,
    unit: &'static str,
    low: f64,
    high: f64,
    source: &'static str,
) -> ParameterSpec {
    ParameterSpec {
        name,
        category,
        unit,
        low,
        high,
        source,
    }
}

/// Metadata in `ParameterId::ALL` order.
const REGISTRY: [ParameterSpec; 16] = [
    spec("discount_rate", "economic", "fraction", 0.03, 0.10, "MDB appraisal guidance"),
    spec("diesel_price", "fuel", "USD/litre", 0.60, 1.20, "utility fuel invoices"),
    spec("diesel_escalation", "fuel", "fraction/yr", 0.0, 0.04, "oil price outlook"),
    spec("diesel_consumption", "fuel", "litre/kWh", 0.25, 0.32, "utility plant records"),
    spec("lng_price", "fuel", "USD/MMBtu", 8.0, 18.0, "regional LNG contracts"),
    spec("lng_capex", "technology", "USD/kW", 900.0, 1600.0, "engine plant benchmarks"),
    spec("solar_capex", "technology", "USD/kW", 1100.0, 2000.0, "island solar tenders"),
    spec("solar_capex_decline", "technology", "fraction/yr", 0.0, 0.04, "learning-rate studies"),
    spec("solar_capacity_factor", "technology", "fraction", 0.15, 0.20, "irradiance atlas"),
    spec("battery_capex", "technology", "USD/kWh", 250.0, 500.0, "storage cost surveys"),
    spec("cable_capex_per_km", "infrastructure", "USD m/km", 1.8, 3.8, "HVDC interconnector costs"),
    spec("import_price", "infrastructure", "USD/MWh", 50.0, 100.0, "exporter tariff offer"),
    spec("grid_capex_per_km", "infrastructure", "USD m/km", 1.3, 2.7, "submarine MV cable costs"),
    spec("demand_growth", "demand", "fraction/yr", 0.03, 0.07, "utility load forecast"),
    spec("social_cost_of_carbon", "externality", "USD/tCO2", 50.0, 300.0, "SCC literature range"),
    spec("health_damage_diesel", "externality", "USD/MWh", 20.0, 80.0, "air-quality damage studies"),
];

impl ParameterId {
    /// Every registered parameter.
    pub const ALL: [ParameterId; 16] = [
        ParameterId::DiscountRate,
        ParameterId::DieselPrice,
        ParameterId::DieselEscalation,
        ParameterId::DieselConsumption,
        ParameterId::LngPrice,
        ParameterId::LngCapex,
        ParameterId::SolarCapex,
        ParameterId::SolarCapexDecline,
        ParameterId::SolarCapacityFactor,
        ParameterId::BatteryCapex,
        ParameterId::CableCapexPerKm,
        ParameterId::ImportPrice,
        ParameterId::GridCapexPerKm,
        ParameterId::DemandGrowth,
        ParameterId::SocialCostOfCarbon,
        ParameterId::HealthDamageDiesel,
    ];

    fn spec(self) -> &'static ParameterSpec {
        &REGISTRY[self as usize]
    }

    /// Snake-case name used in CSV files and reports.
    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.name() == name)
    }

    pub fn unit(self) -> &'static str {
        self.spec().unit
    }

    pub fn category(self) -> &'static str {
        self.spec().category
    }

    /// Reads the parameter from a configuration.
    pub fn get(self, cfg: &ModelConfig) -> f64 {
        match self {
            ParameterId::DiscountRate => cfg.analysis.discount.rate_for_year(0),
            ParameterId::DieselPrice => cfg.fuel.diesel_price_usd_per_litre,
            ParameterId::DieselEscalation => cfg.fuel.diesel_escalation,
            ParameterId::DieselConsumption => cfg.fuel.diesel_litres_per_kwh,
            ParameterId::LngPrice => cfg.fuel.lng_price_usd_per_mmbtu,
            ParameterId::LngCapex => cfg.lng.capex_usd_per_kw,
            ParameterId::SolarCapex => cfg.solar.capex_usd_per_kw,
            ParameterId::SolarCapexDecline => cfg.solar.capex_decline,
            ParameterId::SolarCapacityFactor => cfg.solar.capacity_factor,
            ParameterId::BatteryCapex => cfg.battery.capex_usd_per_kwh,
            ParameterId::CableCapexPerKm => cfg.cable.capex_usd_m_per_km,
            ParameterId::ImportPrice => cfg.cable.import_price_usd_per_mwh,
            ParameterId::GridCapexPerKm => cfg.grid.capex_usd_m_per_km,
            ParameterId::DemandGrowth => cfg.demand.growth_rate,
            ParameterId::SocialCostOfCarbon => cfg.externalities.scc_usd_per_t,
            ParameterId::HealthDamageDiesel => cfg.externalities.health_diesel_usd_per_mwh,
        }
    }

    /// Writes the parameter into a configuration.
    ///
    /// A declining discount schedule is shifted as a whole so that its
    /// year-0 rate equals `value`.
    pub fn set(self, cfg: &mut ModelConfig, value: f64) {
        let slot = match self {
            ParameterId::DiscountRate => {
                cfg.analysis.discount.set_initial_rate(value);
                return;
            }
            ParameterId::DieselPrice => &mut cfg.fuel.diesel_price_usd_per_litre,
            ParameterId::DieselEscalation => &mut cfg.fuel.diesel_escalation,
            ParameterId::DieselConsumption => &mut cfg.fuel.diesel_litres_per_kwh,
            ParameterId::LngPrice => &mut cfg.fuel.lng_price_usd_per_mmbtu,
            ParameterId::LngCapex => &mut cfg.lng.capex_usd_per_kw,
            ParameterId::SolarCapex => &mut cfg.solar.capex_usd_per_kw,
            ParameterId::SolarCapexDecline => &mut cfg.solar.capex_decline,
            ParameterId::SolarCapacityFactor => &mut cfg.solar.capacity_factor,
            ParameterId::BatteryCapex => &mut cfg.battery.capex_usd_per_kwh,
            ParameterId::CableCapexPerKm => &mut cfg.cable.capex_usd_m_per_km,
            ParameterId::ImportPrice => &mut cfg.cable.import_price_usd_per_mwh,
            ParameterId::GridCapexPerKm => &mut cfg.grid.capex_usd_m_per_km,
            ParameterId::DemandGrowth => &mut cfg.demand.growth_rate,
            ParameterId::SocialCostOfCarbon => &mut cfg.externalities.scc_usd_per_t,
            ParameterId::HealthDamageDiesel => &mut cfg.externalities.health_diesel_usd_per_mwh,
        };
        *slot = value;
    }

    /// Registry range around `base`, widened so that it always contains `base`.
    pub fn default_range(self, base: f64) -> ParameterRange {
        let s = self.spec();
        ParameterRange {
            low: s.low.min(base),
            base,
            high: s.high.max(base),
        }
    }
}

impl fmt::Display for ParameterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Low / base / high values of one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterRange {
    pub low: f64,
    pub base: f64,
    pub high: f64,
}

impl ParameterRange {
    /// True when low and high coincide.
    pub fn is_degenerate(&self) -> bool {
        (self.high - self.low).abs() < f64::EPSILON * self.base.abs().max(1.0)
    }
}

/// One row of the parameter CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRow {
    pub category: String,
    pub parameter: String,
    pub value: f64,
    pub low: f64,
    pub high: f64,
    pub unit: String,
    #[serde(default)]
    pub source: String,
}

/// Table of parameter values and uncertainty ranges.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParameterTable {
    rows: Vec<ParameterRow>,
}

impl ParameterTable {
    /// Builds one row per registered parameter from `cfg`.
    pub fn defaults(cfg: &ModelConfig) -> Self {
        let rows = ParameterId::ALL
            .into_iter()
            .map(|id| {
                let range = id.default_range(id.get(cfg));
                ParameterRow {
                    category: id.category().to_string(),
                    parameter: id.name().to_string(),
                    value: range.base,
                    low: range.low,
                    high: range.high,
                    unit: id.unit().to_string(),
                    source: id.spec().source.to_string(),
                }
            })
            .collect();
        Self { rows }
    }

    /// Loads a parameter table from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, a row does not parse,
    /// names an unknown parameter, repeats a parameter, or has a value
    /// outside its own `[low, high]` range.
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_csv_reader(file)
    }

    /// Loads a parameter table from any CSV reader.
    ///
    /// # Errors
    ///
    /// See [`ParameterTable::from_csv_path`].
    pub fn from_csv_reader(reader: impl Read) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut rows: Vec<ParameterRow> = Vec::new();

        for (i, record) in rdr.deserialize().enumerate() {
            let row: ParameterRow = record?;
            let line = i + 1;
            if ParameterId::from_name(&row.parameter).is_none() {
                return Err(CbaError::Parameter {
                    row: line,
                    message: format!("unknown parameter \"{}\"", row.parameter),
                });
            }
            if rows.iter().any(|r| r.parameter == row.parameter) {
                return Err(CbaError::Parameter {
                    row: line,
                    message: format!("duplicate parameter \"{}\"", row.parameter),
                });
            }
            if !(row.low <= row.value && row.value <= row.high) {
                return Err(CbaError::Parameter {
                    row: line,
                    message: format!(
                        "{}: value {} outside [{}, {}]",
                        row.parameter, row.value, row.low, row.high
                    ),
                });
            }
            rows.push(row);
        }
        Ok(Self { rows })
    }

    /// Replaces rows of `self` with the matching rows of `other` and appends the rest.
    pub fn overlay(&mut self, other: ParameterTable) {
        for row in other.rows {
            match self.rows.iter_mut().find(|r| r.parameter == row.parameter) {
                Some(existing) => *existing = row,
                None => self.rows.push(row),
            }
        }
    }

    /// Writes every row's value into `cfg`.
    pub fn apply_to(&self, cfg: &mut ModelConfig) {
        for row in &self.rows {
            if let Some(id) = ParameterId::from_name(&row.parameter) {
                id.set(cfg, row.value);
            }
        }
    }

    /// Range of `id`. Without a row, the registry range around `cfg`'s current value.
    pub fn range(&self, id: ParameterId, cfg: &ModelConfig) -> ParameterRange {
        match self.rows.iter().find(|r| r.parameter == id.name()) {
            Some(row) => ParameterRange {
                low: row.low,
                base: row.value,
                high: row.high,
            },
            None => id.default_range(id.get(cfg)),
        }
    }

    pub fn rows(&self) -> &[ParameterRow] {
        &self.rows
    }

    /// Writes the table as CSV in the same schema it is read from.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_csv(&self, writer: impl Write) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for row in &self.rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::discount::{DiscountSchedule, DiscountStep};

    #[test]
    fn registry_order_matches_ids() {
        for (i, id) in ParameterId::ALL.into_iter().enumerate() {
            assert_eq!(id as usize, i);
            assert_eq!(ParameterId::from_name(id.name()), Some(id));
        }
        assert_eq!(ParameterId::from_name("nope"), None);
    }

    #[test]
    fn set_then_get_for_every_parameter() {
        let mut cfg = ModelConfig::default();
        for id in ParameterId::ALL {
            let v = id.get(&cfg) * 1.1 + 0.001;
            id.set(&mut cfg, v);
            assert!((id.get(&cfg) - v).abs() < 1e-12, "{id}");
        }
    }

    #[test]
    fn default_bases_match_config() {
        let cfg = ModelConfig::default();
        let table = ParameterTable::defaults(&cfg);
        assert_eq!(table.rows().len(), 16);
        let r = table.range(ParameterId::DieselPrice, &cfg);
        assert_eq!(r.base, 0.85);
        assert_eq!(r.low, 0.60);
        assert_eq!(r.high, 1.20);
    }

    #[test]
    fn default_range_widens_to_contain_base() {
        let r = ParameterId::DieselPrice.default_range(1.5);
        assert_eq!(r.low, 0.60);
        assert_eq!(r.high, 1.5);
    }

    #[test]
    fn discount_rate_shifts_declining_schedule() {
        let mut cfg = ModelConfig::default();
        cfg.analysis.discount = DiscountSchedule::Declining {
            steps: vec![
                DiscountStep {
                    from_year: 0,
                    rate: 0.06,
                },
                DiscountStep {
                    from_year: 10,
                    rate: 0.04,
                },
            ],
        };
        ParameterId::DiscountRate.set(&mut cfg, 0.08);
        assert!((cfg.analysis.discount.rate_for_year(0) - 0.08).abs() < 1e-12);
        assert!((cfg.analysis.discount.rate_for_year(15) - 0.06).abs() < 1e-12);
    }

    #[test]
    fn csv_loads_and_applies() {
        let data = "category,parameter,value,low,high,unit,source\n\
                    fuel,diesel_price,1.0,0.7,1.3,USD/litre,test\n\
                    economic,discount_rate,0.08,0.05,0.12,fraction,\n";
        let table = ParameterTable::from_csv_reader(data.as_bytes()).expect("valid csv");
        let mut cfg = ModelConfig::default();
        table.apply_to(&mut cfg);
        assert_eq!(cfg.fuel.diesel_price_usd_per_litre, 1.0);
        assert!((cfg.analysis.discount.rate_for_year(0) - 0.08).abs() < 1e-12);
        // missing rows fall back to the registry
        let r = table.range(ParameterId::BatteryCapex, &cfg);
        assert_eq!((r.low, r.base, r.high), (250.0, 350.0, 500.0));
    }

    #[test]
    fn missing_row_centres_on_analysed_config() {
        let cfg = ModelConfig::high_fuel_price();
        let data = "category,parameter,value,low,high,unit,source\n\
                    technology,lng_capex,1200,900,1600,USD/kW,\n";
        let table = ParameterTable::from_csv_reader(data.as_bytes()).expect("csv parses");
        let r = table.range(ParameterId::DieselPrice, &cfg);
        assert_eq!(r.base, ParameterId::DieselPrice.get(&cfg));
        assert!(r.low <= r.base && r.base <= r.high);
    }

    #[test]
    fn csv_rejects_unknown_parameter() {
        let data = "category,parameter,value,low,high,unit,source\n\
                    fuel,whale_oil,1.0,0.5,2.0,USD/litre,\n";
        let err = ParameterTable::from_csv_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, CbaError::Parameter { row: 1, .. }));
        assert!(err.to_string().contains("whale_oil"));
    }

    #[test]
    fn csv_rejects_value_outside_range() {
        let data = "category,parameter,value,low,high,unit,source\n\
                    fuel,diesel_price,0.85,0.6,1.2,USD/litre,\n\
                    fuel,lng_price,20,8,18,USD/MMBtu,\n";
        let err = ParameterTable::from_csv_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, CbaError::Parameter { row: 2, .. }));
    }

    #[test]
    fn csv_rejects_duplicates() {
        let data = "category,parameter,value,low,high,unit,source\n\
                    fuel,diesel_price,0.85,0.6,1.2,USD/litre,\n\
                    fuel,diesel_price,0.9,0.6,1.2,USD/litre,\n";
        assert!(ParameterTable::from_csv_reader(data.as_bytes()).is_err());
    }

    #[test]
    fn written_table_reads_back() {
        let table = ParameterTable::defaults(&ModelConfig::default());
        let mut buf = Vec::new();
        table.write_csv(&mut buf).expect("write");
        let back = ParameterTable::from_csv_reader(buf.as_slice()).expect("read");
        assert_eq!(back.rows(), table.rows());
    }

    #[test]
    fn overlay_replaces_matching_rows() {
        let cfg = ModelConfig::default();
        let mut table = ParameterTable::defaults(&cfg);
        let data = "category,parameter,value,low,high,unit,source\n\
                    fuel,lng_price,14,10,16,USD/MMBtu,override\n";
        table.overlay(ParameterTable::from_csv_reader(data.as_bytes()).expect("csv"));
        assert_eq!(table.rows().len(), 16);
        let r = table.range(ParameterId::LngPrice, &cfg);
        assert_eq!((r.low, r.base, r.high), (10.0, 14.0, 16.0));
    }
}
