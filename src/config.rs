//! TOML-based model configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::discount::{DiscountSchedule, DiscountStep};
use crate::model::scenario::ScenarioId;

/// Top-level model configuration parsed from TOML.
///
/// All sections default to the base case. Load from TOML with
/// [`ModelConfig::from_toml_file`] or use [`ModelConfig::base_case`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    /// Horizon, discounting and run settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Electricity demand projection.
    #[serde(default)]
    pub demand: DemandConfig,
    /// Diesel and LNG fuel prices.
    #[serde(default)]
    pub fuel: FuelConfig,
    /// Solar PV technology and cost.
    #[serde(default)]
    pub solar: SolarConfig,
    /// Battery storage technology and cost.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Diesel generation fleet.
    #[serde(default)]
    pub diesel: DieselConfig,
    /// LNG power plant and terminal.
    #[serde(default)]
    pub lng: LngConfig,
    /// Submarine import cable.
    #[serde(default)]
    pub cable: CableConfig,
    /// Inter-island transmission grid.
    #[serde(default)]
    pub grid: GridConfig,
    /// Carbon and health damage values.
    #[serde(default)]
    pub externalities: ExternalityConfig,
    /// Household quintiles for distributional analysis.
    #[serde(default)]
    pub distribution: DistributionConfig,
    /// Financing mix and loan terms.
    #[serde(default)]
    pub financing: FinancingConfig,
    /// Multi-criteria weights.
    #[serde(default)]
    pub mca: McaWeights,
    /// Per-pathway build settings.
    #[serde(default)]
    pub scenarios: PathwaySettings,
}

/// Horizon, discounting and run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Calendar year of analysis year 0.
    pub base_year: i32,
    /// Number of years after the base year (must be > 0).
    pub horizon_years: u32,
    /// Social discount schedule.
    pub discount: DiscountSchedule,
    /// Master random seed for Monte Carlo draws.
    pub seed: u64,
    /// Number of Monte Carlo draws.
    pub monte_carlo_iterations: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            base_year: 2026,
            horizon_years: 30,
            discount: DiscountSchedule::default(),
            seed: 42,
            monte_carlo_iterations: 1000,
        }
    }
}

impl AnalysisConfig {
    /// Converts a calendar year to an analysis-year index (may be negative).
    pub fn year_index(&self, year: i32) -> i32 {
        year - self.base_year
    }
}

/// Electricity demand projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemandConfig {
    /// Net demand in the base year (GWh).
    pub base_demand_gwh: f64,
    /// Annual growth up to `growth_switch_year`.
    pub growth_rate: f64,
    /// Annual growth after `growth_switch_year`.
    pub long_run_growth: f64,
    /// First calendar year growing at the long-run rate.
    pub growth_switch_year: i32,
    /// Annual load factor used to derive peak demand.
    pub load_factor: f64,
    /// Relative amplitude of the daily load shape.
    pub shape_amplitude: f64,
    /// Phase of the daily load shape (radians).
    pub shape_phase_rad: f64,
    /// Network losses as a share of gross generation without the grid.
    pub loss_fraction: f64,
}

impl Default for DemandConfig {
    fn default() -> Self {
        Self {
            base_demand_gwh: 1200.0,
            growth_rate: 0.05,
            long_run_growth: 0.035,
            growth_switch_year: 2036,
            load_factor: 0.68,
            shape_amplitude: 0.25,
            shape_phase_rad: 2.618,
            loss_fraction: 0.11,
        }
    }
}

/// Diesel and LNG fuel prices (real, base-year USD).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FuelConfig {
    /// Delivered diesel price (USD/litre).
    pub diesel_price_usd_per_litre: f64,
    /// Real annual diesel price escalation.
    pub diesel_escalation: f64,
    /// Specific fuel consumption (litres/kWh).
    pub diesel_litres_per_kwh: f64,
    /// Combustion emissions (kg CO2/litre).
    pub diesel_co2_kg_per_litre: f64,
    /// Delivered LNG price (USD/MMBtu).
    pub lng_price_usd_per_mmbtu: f64,
    /// Real annual LNG price escalation.
    pub lng_escalation: f64,
    /// LNG plant heat rate (MMBtu/MWh).
    pub lng_heat_rate_mmbtu_per_mwh: f64,
}

impl Default for FuelConfig {
    fn default() -> Self {
        Self {
            diesel_price_usd_per_litre: 0.85,
            diesel_escalation: 0.02,
            diesel_litres_per_kwh: 0.28,
            diesel_co2_kg_per_litre: 2.68,
            lng_price_usd_per_mmbtu: 12.0,
            lng_escalation: 0.01,
            lng_heat_rate_mmbtu_per_mwh: 7.5,
        }
    }
}

/// Solar PV technology and cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolarConfig {
    /// Installed capacity in the base year (MW).
    pub existing_mw: f64,
    /// Average age of the existing capacity (years).
    pub existing_age_years: u32,
    /// Ground/rooftop capex in the base year (USD/kW).
    pub capex_usd_per_kw: f64,
    /// Annual real capex decline.
    pub capex_decline: f64,
    /// Annual capacity factor.
    pub capacity_factor: f64,
    /// Annual output degradation.
    pub degradation: f64,
    /// Economic lifetime (years).
    pub lifetime_years: u32,
    /// Fixed O&M (USD/kW-yr).
    pub om_usd_per_kw_yr: f64,
    /// Capex multiplier for near-shore floating arrays.
    pub floating_multiplier: f64,
    /// Capex multiplier for islanded mini-grid installations.
    pub islanded_multiplier: f64,
    /// First generating hour of the typical day.
    pub sunrise_hour: usize,
    /// First non-generating hour after daylight.
    pub sunset_hour: usize,
}

impl Default for SolarConfig {
    fn default() -> Self {
        Self {
            existing_mw: 68.0,
            existing_age_years: 5,
            capex_usd_per_kw: 1500.0,
            capex_decline: 0.02,
            capacity_factor: 0.175,
            degradation: 0.005,
            lifetime_years: 25,
            om_usd_per_kw_yr: 15.0,
            floating_multiplier: 1.25,
            islanded_multiplier: 1.15,
            sunrise_hour: 6,
            sunset_hour: 18,
        }
    }
}

/// Battery storage technology and cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Capex in the base year (USD/kWh).
    pub capex_usd_per_kwh: f64,
    /// Annual real capex decline.
    pub capex_decline: f64,
    /// Economic lifetime (years).
    pub lifetime_years: u32,
    /// Charge efficiency (0.0–1.0].
    pub eta_charge: f64,
    /// Discharge efficiency (0.0–1.0].
    pub eta_discharge: f64,
    /// Power rating per unit of energy capacity (MW/MWh).
    pub c_rate: f64,
    /// Fixed O&M (USD/kWh-yr).
    pub om_usd_per_kwh_yr: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capex_usd_per_kwh: 350.0,
            capex_decline: 0.03,
            lifetime_years: 15,
            eta_charge: 0.95,
            eta_discharge: 0.95,
            c_rate: 0.5,
            om_usd_per_kwh_yr: 5.0,
        }
    }
}

/// Diesel generation fleet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DieselConfig {
    /// Genset capex (USD/kW).
    pub capex_usd_per_kw: f64,
    /// Economic lifetime (years).
    pub lifetime_years: u32,
    /// Variable O&M excluding fuel (USD/MWh).
    pub variable_om_usd_per_mwh: f64,
    /// Firm capacity required per MW of peak.
    pub reserve_margin: f64,
}

impl Default for DieselConfig {
    fn default() -> Self {
        Self {
            capex_usd_per_kw: 900.0,
            lifetime_years: 20,
            variable_om_usd_per_mwh: 25.0,
            reserve_margin: 1.3,
        }
    }
}

/// LNG power plant and import terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LngConfig {
    /// Plant capacity (MW).
    pub capacity_mw: f64,
    /// Plant capex (USD/kW).
    pub capex_usd_per_kw: f64,
    /// Regasification terminal capex (USD m).
    pub terminal_capex_usd_m: f64,
    /// First generating calendar year.
    pub online_year: i32,
    /// Years of construction preceding `online_year`.
    pub construction_years: u32,
    /// Economic lifetime (years).
    pub lifetime_years: u32,
    /// Fixed O&M (USD/kW-yr).
    pub fixed_om_usd_per_kw_yr: f64,
    /// Variable O&M excluding fuel (USD/MWh).
    pub variable_om_usd_per_mwh: f64,
    /// Emission factor (t CO2/MWh).
    pub emission_factor_t_per_mwh: f64,
    /// Maximum share of hourly load in reach of the plant.
    pub reach: f64,
}

impl Default for LngConfig {
    fn default() -> Self {
        Self {
            capacity_mw: 140.0,
            capex_usd_per_kw: 1200.0,
            terminal_capex_usd_m: 200.0,
            online_year: 2031,
            construction_years: 3,
            lifetime_years: 30,
            fixed_om_usd_per_kw_yr: 30.0,
            variable_om_usd_per_mwh: 5.0,
            emission_factor_t_per_mwh: 0.40,
            reach: 0.7,
        }
    }
}

/// Submarine import cable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CableConfig {
    /// Route length (km).
    pub length_km: f64,
    /// Cable capex (USD m/km).
    pub capex_usd_m_per_km: f64,
    /// Converter stations at both ends (USD m).
    pub converter_capex_usd_m: f64,
    /// Transfer capacity (MW).
    pub capacity_mw: f64,
    /// First importing calendar year.
    pub online_year: i32,
    /// Years of construction preceding `online_year`.
    pub construction_years: u32,
    /// Availability factor applied to firm capacity.
    pub availability: f64,
    /// Power purchase price (USD/MWh).
    pub import_price_usd_per_mwh: f64,
    /// Real annual import price escalation.
    pub import_price_escalation: f64,
    /// Annual O&M as a share of capex.
    pub om_share: f64,
    /// Economic lifetime (years).
    pub lifetime_years: u32,
    /// Exporter grid emission factor in the base year (t CO2/MWh).
    pub exporter_emission_factor: f64,
    /// Annual decline of the exporter emission factor.
    pub exporter_ef_decline: f64,
    /// Whether imported power carries the exporter's emissions.
    pub count_import_emissions: bool,
    /// Maximum share of hourly load the cable can serve.
    pub reach: f64,
}

impl Default for CableConfig {
    fn default() -> Self {
        Self {
            length_km: 700.0,
            capex_usd_m_per_km: 2.5,
            converter_capex_usd_m: 600.0,
            capacity_mw: 200.0,
            online_year: 2032,
            construction_years: 4,
            availability: 0.95,
            import_price_usd_per_mwh: 70.0,
            import_price_escalation: 0.0,
            om_share: 0.02,
            lifetime_years: 40,
            exporter_emission_factor: 0.70,
            exporter_ef_decline: 0.03,
            count_import_emissions: true,
            reach: 0.8,
        }
    }
}

/// Inter-island transmission grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Total inter-island line length (km).
    pub length_km: f64,
    /// Capex (USD m/km).
    pub capex_usd_m_per_km: f64,
    /// First operating calendar year.
    pub online_year: i32,
    /// Years of construction preceding `online_year`.
    pub construction_years: u32,
    /// Annual O&M as a share of capex.
    pub om_share: f64,
    /// Economic lifetime (years).
    pub lifetime_years: u32,
    /// Network losses once the grid is online.
    pub loss_fraction: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            length_km: 300.0,
            capex_usd_m_per_km: 1.8,
            online_year: 2031,
            construction_years: 3,
            om_share: 0.02,
            lifetime_years: 40,
            loss_fraction: 0.08,
        }
    }
}

/// Carbon and local air pollution damage values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExternalityConfig {
    /// Social cost of carbon in the base year (USD/t CO2).
    pub scc_usd_per_t: f64,
    /// Real annual SCC growth.
    pub scc_growth: f64,
    /// Health damage of diesel generation (USD/MWh).
    pub health_diesel_usd_per_mwh: f64,
    /// Health damage of LNG generation (USD/MWh).
    pub health_lng_usd_per_mwh: f64,
}

impl Default for ExternalityConfig {
    fn default() -> Self {
        Self {
            scc_usd_per_t: 190.0,
            scc_growth: 0.02,
            health_diesel_usd_per_mwh: 40.0,
            health_lng_usd_per_mwh: 10.0,
        }
    }
}

/// Household income quintiles, poorest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DistributionConfig {
    /// Mean household income per quintile (USD/yr).
    pub quintile_income_usd: [f64; 5],
    /// Household electricity use per quintile (kWh/yr).
    pub quintile_consumption_kwh: [f64; 5],
    /// Households in each quintile.
    pub households_per_quintile: f64,
    /// Average residential tariff in the base year (USD/kWh).
    pub base_tariff_usd_per_kwh: f64,
    /// Share of a system cost change passed through to tariffs.
    pub pass_through: f64,
    /// Elasticity of marginal utility of income.
    pub inequality_aversion: f64,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            quintile_income_usd: [6_000.0, 11_000.0, 16_000.0, 23_000.0, 42_000.0],
            quintile_consumption_kwh: [2_400.0, 3_200.0, 3_900.0, 4_700.0, 6_800.0],
            households_per_quintile: 16_000.0,
            base_tariff_usd_per_kwh: 0.22,
            pass_through: 1.0,
            inequality_aversion: 1.3,
        }
    }
}

/// Financing mix and loan terms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FinancingConfig {
    /// Share of capex covered by grants.
    pub grant_share: f64,
    /// Share of capex covered by concessional loans.
    pub concessional_share: f64,
    pub concessional_rate: f64,
    pub concessional_tenor_years: u32,
    pub concessional_grace_years: u32,
    pub commercial_rate: f64,
    pub commercial_tenor_years: u32,
    pub commercial_grace_years: u32,
    /// Discount rate for grant-element calculations.
    pub reference_rate: f64,
}

impl Default for FinancingConfig {
    fn default() -> Self {
        Self {
            grant_share: 0.15,
            concessional_share: 0.45,
            concessional_rate: 0.015,
            concessional_tenor_years: 25,
            concessional_grace_years: 5,
            commercial_rate: 0.075,
            commercial_tenor_years: 15,
            commercial_grace_years: 2,
            reference_rate: 0.10,
        }
    }
}

impl FinancingConfig {
    /// Share of capex financed commercially.
    pub fn commercial_share(&self) -> f64 {
        (1.0 - self.grant_share - self.concessional_share).max(0.0)
    }
}

/// Multi-criteria weights (normalised at use).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct McaWeights {
    pub economic: f64,
    pub emissions: f64,
    pub affordability: f64,
    pub security: f64,
    pub fiscal: f64,
    pub equity: f64,
    pub implementation: f64,
}

impl Default for McaWeights {
    fn default() -> Self {
        Self {
            economic: 0.30,
            emissions: 0.20,
            affordability: 0.15,
            security: 0.15,
            fiscal: 0.10,
            equity: 0.05,
            implementation: 0.05,
        }
    }
}

impl McaWeights {
    /// Weights in criterion order.
    pub fn as_array(&self) -> [f64; 7] {
        [
            self.economic,
            self.emissions,
            self.affordability,
            self.security,
            self.fiscal,
            self.equity,
            self.implementation,
        ]
    }
}

/// Build settings for one pathway.
///
/// Overriding a pathway in TOML requires every field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathwayConfig {
    /// Target solar share of gross generation.
    pub re_target_share: f64,
    /// Calendar year by which the target is reached.
    pub re_target_year: i32,
    /// Storage added per MW of new solar (MWh/MW).
    pub storage_hours: f64,
    /// Share of new solar built as near-shore floating arrays.
    pub floating_share: f64,
    /// Whether new solar carries the islanded mini-grid premium.
    pub islanded: bool,
    /// Qualitative implementation risk (1 = low, 5 = high).
    pub implementation_risk: u8,
}

impl PathwayConfig {
    fn new(
        re_target_share: f64,
        re_target_year: i32,
        storage_hours: f64,
        floating_share: f64,
        islanded: bool,
        implementation_risk: u8,
    ) -> Self {
        Self {
            re_target_share,
            re_target_year,
            storage_hours,
            floating_share,
            islanded,
            implementation_risk,
        }
    }
}

/// Build settings for all seven pathways.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathwaySettings {
    pub status_quo: PathwayConfig,
    pub full_integration: PathwayConfig,
    pub national_grid: PathwayConfig,
    pub islanded_green: PathwayConfig,
    pub nearshore_solar: PathwayConfig,
    pub maximum_re: PathwayConfig,
    pub lng_transition: PathwayConfig,
}

impl Default for PathwaySettings {
    fn default() -> Self {
        Self {
            status_quo: PathwayConfig::new(0.0, 2026, 0.0, 0.0, false, 1),
            full_integration: PathwayConfig::new(0.30, 2035, 1.0, 0.0, false, 5),
            national_grid: PathwayConfig::new(0.60, 2040, 2.0, 0.0, false, 3),
            islanded_green: PathwayConfig::new(0.45, 2040, 2.0, 0.0, true, 2),
            nearshore_solar: PathwayConfig::new(0.55, 2040, 2.0, 0.5, false, 3),
            maximum_re: PathwayConfig::new(0.85, 2045, 3.0, 0.3, false, 4),
            lng_transition: PathwayConfig::new(0.20, 2035, 0.5, 0.0, false, 3),
        }
    }
}

impl PathwaySettings {
    /// Settings for one pathway.
    pub fn get(&self, id: ScenarioId) -> &PathwayConfig {
        match id {
            ScenarioId::StatusQuo => &self.status_quo,
            ScenarioId::FullIntegration => &self.full_integration,
            ScenarioId::NationalGrid => &self.national_grid,
            ScenarioId::IslandedGreen => &self.islanded_green,
            ScenarioId::NearshoreSolar => &self.nearshore_solar,
            ScenarioId::MaximumRe => &self.maximum_re,
            ScenarioId::LngTransition => &self.lng_transition,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"analysis.horizon_years"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl ModelConfig {
    /// Returns the base-case configuration.
    pub fn base_case() -> Self {
        Self::default()
    }

    /// Returns the high-fuel-price preset: dearer diesel and LNG, faster escalation.
    pub fn high_fuel_price() -> Self {
        Self {
            fuel: FuelConfig {
                diesel_price_usd_per_litre: 1.10,
                diesel_escalation: 0.03,
                lng_price_usd_per_mmbtu: 16.0,
                ..FuelConfig::default()
            },
            ..Self::default()
        }
    }

    /// Returns the low-carbon-price preset: SCC at the bottom of the literature range.
    pub fn low_carbon_price() -> Self {
        Self {
            externalities: ExternalityConfig {
                scc_usd_per_t: 50.0,
                scc_growth: 0.01,
                ..ExternalityConfig::default()
            },
            ..Self::default()
        }
    }

    /// Returns the declining-discount preset: 6% falling to 4% over the horizon.
    pub fn declining_discount() -> Self {
        Self {
            analysis: AnalysisConfig {
                discount: DiscountSchedule::Declining {
                    steps: vec![
                        DiscountStep {
                            from_year: 0,
                            rate: 0.06,
                        },
                        DiscountStep {
                            from_year: 10,
                            rate: 0.05,
                        },
                        DiscountStep {
                            from_year: 20,
                            rate: 0.04,
                        },
                    ],
                },
                ..AnalysisConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &[
        "base_case",
        "high_fuel_price",
        "low_carbon_price",
        "declining_discount",
    ];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "base_case" => Ok(Self::base_case()),
            "high_fuel_price" => Ok(Self::high_fuel_price()),
            "low_carbon_price" => Ok(Self::low_carbon_price()),
            "declining_discount" => Ok(Self::declining_discount()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Last analysis-year index.
    pub fn horizon(&self) -> u32 {
        self.analysis.horizon_years
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut v = Validator::default();

        let a = &self.analysis;
        v.check(a.horizon_years > 0, "analysis.horizon_years", "must be > 0");
        for rate in a.discount.rates() {
            v.check(
                rate > -1.0 && rate < 1.0,
                "analysis.discount",
                "rates must be in (-1, 1)",
            );
        }
        if let DiscountSchedule::Declining { steps } = &a.discount {
            v.check(
                steps.first().is_some_and(|s| s.from_year == 0),
                "analysis.discount.steps",
                "first step must start at from_year = 0",
            );
            v.check(
                steps.windows(2).all(|w| w[0].from_year < w[1].from_year),
                "analysis.discount.steps",
                "from_year must be strictly increasing",
            );
        }

        let d = &self.demand;
        v.positive(d.base_demand_gwh, "demand.base_demand_gwh");
        v.check(
            d.load_factor > 0.0 && d.load_factor <= 1.0,
            "demand.load_factor",
            "must be in (0.0, 1.0]",
        );
        v.check(
            (0.0..1.0).contains(&d.shape_amplitude),
            "demand.shape_amplitude",
            "must be in [0.0, 1.0)",
        );
        v.check(
            (0.0..1.0).contains(&d.loss_fraction),
            "demand.loss_fraction",
            "must be in [0.0, 1.0)",
        );

        let f = &self.fuel;
        v.positive(f.diesel_price_usd_per_litre, "fuel.diesel_price_usd_per_litre");
        v.positive(f.diesel_litres_per_kwh, "fuel.diesel_litres_per_kwh");
        v.positive(f.lng_price_usd_per_mmbtu, "fuel.lng_price_usd_per_mmbtu");
        v.positive(f.lng_heat_rate_mmbtu_per_mwh, "fuel.lng_heat_rate_mmbtu_per_mwh");

        let s = &self.solar;
        v.check(s.existing_mw >= 0.0, "solar.existing_mw", "must be >= 0");
        v.positive(s.capex_usd_per_kw, "solar.capex_usd_per_kw");
        v.check(
            s.capacity_factor > 0.0 && s.capacity_factor < 1.0,
            "solar.capacity_factor",
            "must be in (0.0, 1.0)",
        );
        v.unit_share(s.degradation, "solar.degradation");
        v.unit_share(s.capex_decline, "solar.capex_decline");
        v.check(s.lifetime_years > 0, "solar.lifetime_years", "must be > 0");
        v.check(
            s.sunrise_hour < s.sunset_hour,
            "solar.sunrise_hour",
            "must be < solar.sunset_hour",
        );
        v.check(s.sunset_hour <= 24, "solar.sunset_hour", "must be <= 24");

        let b = &self.battery;
        v.positive(b.capex_usd_per_kwh, "battery.capex_usd_per_kwh");
        v.unit_share(b.capex_decline, "battery.capex_decline");
        v.check(b.lifetime_years > 0, "battery.lifetime_years", "must be > 0");
        v.efficiency(b.eta_charge, "battery.eta_charge");
        v.efficiency(b.eta_discharge, "battery.eta_discharge");
        v.positive(b.c_rate, "battery.c_rate");

        let dz = &self.diesel;
        v.check(dz.lifetime_years > 0, "diesel.lifetime_years", "must be > 0");
        v.check(
            dz.reserve_margin >= 1.0,
            "diesel.reserve_margin",
            "must be >= 1.0",
        );

        let l = &self.lng;
        v.check(l.lifetime_years > 0, "lng.lifetime_years", "must be > 0");
        v.unit_share(l.reach, "lng.reach");
        v.year_in_horizon(a, l.online_year, "lng.online_year");

        let c = &self.cable;
        v.check(c.lifetime_years > 0, "cable.lifetime_years", "must be > 0");
        v.unit_share(c.availability, "cable.availability");
        v.unit_share(c.reach, "cable.reach");
        v.unit_share(c.exporter_ef_decline, "cable.exporter_ef_decline");
        v.year_in_horizon(a, c.online_year, "cable.online_year");

        let g = &self.grid;
        v.check(g.lifetime_years > 0, "grid.lifetime_years", "must be > 0");
        v.check(
            (0.0..1.0).contains(&g.loss_fraction),
            "grid.loss_fraction",
            "must be in [0.0, 1.0)",
        );
        v.year_in_horizon(a, g.online_year, "grid.online_year");

        let dist = &self.distribution;
        v.check(
            dist.quintile_income_usd.iter().all(|x| *x > 0.0),
            "distribution.quintile_income_usd",
            "every quintile must be > 0",
        );
        v.check(
            dist.quintile_consumption_kwh.iter().all(|x| *x > 0.0),
            "distribution.quintile_consumption_kwh",
            "every quintile must be > 0",
        );
        v.positive(
            dist.households_per_quintile,
            "distribution.households_per_quintile",
        );
        v.unit_share(dist.pass_through, "distribution.pass_through");

        let fin = &self.financing;
        v.unit_share(fin.grant_share, "financing.grant_share");
        v.unit_share(fin.concessional_share, "financing.concessional_share");
        v.check(
            fin.grant_share + fin.concessional_share <= 1.0 + 1e-9,
            "financing.concessional_share",
            "grant_share + concessional_share must be <= 1.0",
        );
        v.check(
            fin.concessional_tenor_years > fin.concessional_grace_years,
            "financing.concessional_tenor_years",
            "must be > financing.concessional_grace_years",
        );
        v.check(
            fin.commercial_tenor_years > fin.commercial_grace_years,
            "financing.commercial_tenor_years",
            "must be > financing.commercial_grace_years",
        );

        let w = self.mca.as_array();
        v.check(
            w.iter().all(|x| *x >= 0.0),
            "mca",
            "weights must be >= 0",
        );
        v.check(w.iter().sum::<f64>() > 0.0, "mca", "weights must sum to > 0");

        for id in ScenarioId::ALL {
            let p = self.scenarios.get(id);
            let prefix = format!("scenarios.{}", id.key());
            v.unit_share(p.re_target_share, &format!("{prefix}.re_target_share"));
            v.unit_share(p.floating_share, &format!("{prefix}.floating_share"));
            v.check(
                p.storage_hours >= 0.0,
                &format!("{prefix}.storage_hours"),
                "must be >= 0",
            );
            v.year_in_horizon(a, p.re_target_year, &format!("{prefix}.re_target_year"));
            v.check(
                (1..=5).contains(&p.implementation_risk),
                &format!("{prefix}.implementation_risk"),
                "must be in 1..=5",
            );
        }

        v.errors
    }
}

#[derive(Default)]
struct Validator {
    errors: Vec<ConfigError>,
}

impl Validator {
    fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.errors.push(ConfigError {
                field: field.into(),
                message: message.into(),
            });
        }
    }

    fn positive(&mut self, x: f64, field: &str) {
        self.check(x > 0.0, field, "must be > 0");
    }

    fn unit_share(&mut self, x: f64, field: &str) {
        self.check((0.0..=1.0).contains(&x), field, "must be in [0.0, 1.0]");
    }

    fn efficiency(&mut self, x: f64, field: &str) {
        self.check(x > 0.0 && x <= 1.0, field, "must be in (0.0, 1.0]");
    }

    fn year_in_horizon(&mut self, a: &AnalysisConfig, year: i32, field: &str) {
        let t = a.year_index(year);
        self.check(
            t >= 0 && t <= a.horizon_years as i32,
            field,
            "must fall within the analysis horizon",
        );
    }
}
