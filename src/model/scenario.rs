//! The seven supply pathways and their build rules.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{ModelConfig, PathwayConfig};

/// Identifier of an electricity-supply pathway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioId {
    /// Diesel business-as-usual baseline.
    StatusQuo,
    /// Submarine cable import plus the national grid.
    FullIntegration,
    /// Inter-island grid enabling utility-scale solar.
    NationalGrid,
    /// Islanded solar-battery mini-grids.
    IslandedGreen,
    /// Near-shore floating solar.
    NearshoreSolar,
    /// Grid, floating solar and deep storage.
    MaximumRe,
    /// LNG plant replacing diesel on connected islands.
    LngTransition,
}

impl ScenarioId {
    /// Every pathway, baseline first.
    pub const ALL: [ScenarioId; 7] = [
        Self::StatusQuo,
        Self::FullIntegration,
        Self::NationalGrid,
        Self::IslandedGreen,
        Self::NearshoreSolar,
        Self::MaximumRe,
        Self::LngTransition,
    ];

    /// Every pathway compared against the baseline.
    pub const ALTERNATIVES: [ScenarioId; 6] = [
        Self::FullIntegration,
        Self::NationalGrid,
        Self::IslandedGreen,
        Self::NearshoreSolar,
        Self::MaximumRe,
        Self::LngTransition,
    ];

    /// Snake-case key used in TOML tables and output files.
    pub fn key(self) -> &'static str {
        match self {
            Self::StatusQuo => "status_quo",
            Self::FullIntegration => "full_integration",
            Self::NationalGrid => "national_grid",
            Self::IslandedGreen => "islanded_green",
            Self::NearshoreSolar => "nearshore_solar",
            Self::MaximumRe => "maximum_re",
            Self::LngTransition => "lng_transition",
        }
    }

    /// Parses a snake-case key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.key() == key)
    }

    /// Whether the pathway builds the submarine import cable.
    pub fn has_cable(self) -> bool {
        matches!(self, Self::FullIntegration)
    }

    /// Whether the pathway builds the inter-island grid.
    pub fn has_grid(self) -> bool {
        matches!(
            self,
            Self::FullIntegration | Self::NationalGrid | Self::MaximumRe
        )
    }

    /// Whether the pathway builds the LNG plant and terminal.
    pub fn has_lng(self) -> bool {
        matches!(self, Self::LngTransition)
    }

    /// Resolves the pathway's build rules from configuration.
    pub fn build(self, cfg: &ModelConfig) -> Pathway {
        let settings = cfg.scenarios.get(self).clone();
        let base_multiplier = if settings.islanded {
            cfg.solar.islanded_multiplier
        } else {
            1.0
        };
        let solar_capex_multiplier = (1.0 - settings.floating_share) * base_multiplier
            + settings.floating_share * cfg.solar.floating_multiplier;

        Pathway {
            id: self,
            builds_solar: self != Self::StatusQuo,
            target_index: cfg.analysis.year_index(settings.re_target_year),
            solar_capex_multiplier,
            settings,
        }
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::StatusQuo => "Status quo (diesel)",
            Self::FullIntegration => "Full integration (cable)",
            Self::NationalGrid => "National grid",
            Self::IslandedGreen => "Islanded green",
            Self::NearshoreSolar => "Near-shore solar",
            Self::MaximumRe => "Maximum RE",
            Self::LngTransition => "LNG transition",
        };
        f.write_str(label)
    }
}

/// Resolved build rules for one pathway.
#[derive(Debug, Clone)]
pub struct Pathway {
    pub id: ScenarioId,
    pub settings: PathwayConfig,
    /// `false` for the baseline, which only replaces retiring solar.
    pub builds_solar: bool,
    /// Analysis-year index of the RE target year.
    pub target_index: i32,
    /// Blended capex multiplier for new solar.
    pub solar_capex_multiplier: f64,
}

impl Pathway {
    /// Target solar share of gross generation in year `t`.
    ///
    /// Ramps linearly from `initial_share` at year 0 to the target at the
    /// target year, then holds. Never below `initial_share`.
    pub fn target_share(&self, t: u32, initial_share: f64) -> f64 {
        let target = self.settings.re_target_share.max(initial_share);
        if self.target_index <= 0 || t as i32 >= self.target_index {
            return target;
        }
        initial_share + (target - initial_share) * t as f64 / self.target_index as f64
    }
}
