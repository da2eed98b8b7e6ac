//! Year-by-year scenario evaluation.

use tracing::debug;

use crate::config::ModelConfig;

use super::demand::{
    DemandProjection, HOURS_PER_DAY, HOURS_PER_YEAR, gross_generation_gwh, load_shape, peak_mw,
};
use super::discount::present_value;
use super::dispatch::{DispatchInput, dispatch_year};
use super::fleet::{Fleet, construction_schedule};
use super::scenario::{Pathway, ScenarioId};
use super::types::{AnnualRecord, PresentValues, ScenarioOutcome};

/// Capital cost and commissioning of one infrastructure project.
#[derive(Debug, Clone, Copy)]
struct Project {
    online_index: i32,
    capex_usd_m: f64,
    om_usd_m_per_yr: f64,
}

impl Project {
    fn is_online(&self, t: i32) -> bool {
        t >= self.online_index
    }
}

/// Evaluates one pathway over the full horizon.
///
/// Drives the build rules of the pathway through the vintage fleets, runs
/// the typical-day dispatch each year and prices every energy flow.
pub fn evaluate(cfg: &ModelConfig, id: ScenarioId) -> ScenarioOutcome {
    let pathway = id.build(cfg);
    let a = &cfg.analysis;
    let horizon = cfg.horizon();
    let n = horizon as usize + 1;

    let demand = DemandProjection::project(&cfg.demand, a.base_year, horizon);
    let shape = load_shape(cfg.demand.shape_amplitude, cfg.demand.shape_phase_rad);

    let mut solar = Fleet::new(cfg.solar.lifetime_years);
    solar.add_existing(-(cfg.solar.existing_age_years as i32), cfg.solar.existing_mw);
    let mut battery = Fleet::new(cfg.battery.lifetime_years);
    let mut diesel_builds = Fleet::new(cfg.diesel.lifetime_years);
    let mut infrastructure = Fleet::new(1);
    let mut infra_capex = vec![0.0; n];

    let cable = id.has_cable().then(|| {
        let c = &cfg.cable;
        let capex = c.length_km * c.capex_usd_m_per_km + c.converter_capex_usd_m;
        Project {
            online_index: a.year_index(c.online_year),
            capex_usd_m: capex,
            om_usd_m_per_yr: capex * c.om_share,
        }
    });
    let grid = id.has_grid().then(|| {
        let g = &cfg.grid;
        let capex = g.length_km * g.capex_usd_m_per_km;
        Project {
            online_index: a.year_index(g.online_year),
            capex_usd_m: capex,
            om_usd_m_per_yr: capex * g.om_share,
        }
    });
    let lng = id.has_lng().then(|| {
        let l = &cfg.lng;
        let capex = l.capacity_mw * l.capex_usd_per_kw / 1000.0 + l.terminal_capex_usd_m;
        Project {
            online_index: a.year_index(l.online_year),
            capex_usd_m: capex,
            om_usd_m_per_yr: l.capacity_mw * l.fixed_om_usd_per_kw_yr / 1000.0,
        }
    });

    for (project, construction_years, lifetime, capacity) in [
        (
            cable,
            cfg.cable.construction_years,
            cfg.cable.lifetime_years,
            cfg.cable.capacity_mw,
        ),
        (
            grid,
            cfg.grid.construction_years,
            cfg.grid.lifetime_years,
            cfg.grid.length_km,
        ),
        (
            lng,
            cfg.lng.construction_years,
            cfg.lng.lifetime_years,
            cfg.lng.capacity_mw,
        ),
    ] {
        let Some(p) = project else { continue };
        for (year, amount) in construction_schedule(p.capex_usd_m, p.online_index, construction_years) {
            if let Some(slot) = infra_capex.get_mut(year as usize) {
                *slot += amount;
            }
        }
        infrastructure.add_lump(p.online_index, capacity, p.capex_usd_m, lifetime);
    }

    let base_gross = gross_generation_gwh(demand.net_gwh(0), cfg.demand.loss_fraction);
    let initial_share = solar_energy_gwh(
        solar.effective_capacity(0, cfg.solar.degradation),
        cfg.solar.capacity_factor,
    ) / base_gross;

    let mut diesel_fleet_mw = 0.0;
    let mut records = Vec::with_capacity(n);

    for t in 0..=horizon {
        let ti = t as i32;
        let grid_online = grid.is_some_and(|g| g.is_online(ti));
        let loss = if grid_online {
            cfg.grid.loss_fraction
        } else {
            cfg.demand.loss_fraction
        };
        let net = demand.net_gwh(t);
        let gross = gross_generation_gwh(net, loss);
        let peak = peak_mw(gross, cfg.demand.load_factor);

        let mut capex = infra_capex[t as usize];
        capex += build_renewables(cfg, &pathway, &mut solar, &mut battery, t, gross, initial_share);

        let cable_mw = if cable.is_some_and(|c| c.is_online(ti)) {
            cfg.cable.capacity_mw
        } else {
            0.0
        };
        let lng_mw = if lng.is_some_and(|l| l.is_online(ti)) {
            cfg.lng.capacity_mw
        } else {
            0.0
        };

        let firm_mw = cable_mw * cfg.cable.availability + lng_mw;
        let required_diesel = (peak * cfg.diesel.reserve_margin - firm_mw).max(0.0);
        if t == 0 {
            diesel_fleet_mw = required_diesel;
        } else {
            let kept = diesel_fleet_mw * (1.0 - 1.0 / cfg.diesel.lifetime_years as f64);
            if required_diesel > kept {
                capex += diesel_builds.add(
                    ti,
                    required_diesel - kept,
                    cfg.diesel.capex_usd_per_kw / 1000.0,
                );
                diesel_fleet_mw = required_diesel;
            } else {
                diesel_fleet_mw = kept;
            }
        }

        let mut load_mw = [0.0; HOURS_PER_DAY];
        let mean_mw = gross * 1000.0 / HOURS_PER_YEAR;
        for (h, v) in load_mw.iter_mut().enumerate() {
            *v = mean_mw * shape[h];
        }

        let solar_mw = solar.active_capacity(ti);
        let battery_mwh = battery.active_capacity(ti);
        let d = dispatch_year(&DispatchInput {
            load_mw,
            solar_mw: solar.effective_capacity(ti, cfg.solar.degradation),
            capacity_factor: cfg.solar.capacity_factor,
            sunrise_hour: cfg.solar.sunrise_hour,
            sunset_hour: cfg.solar.sunset_hour,
            battery_mwh,
            c_rate: cfg.battery.c_rate,
            eta_charge: cfg.battery.eta_charge,
            eta_discharge: cfg.battery.eta_discharge,
            import_mw: cable_mw,
            import_reach: cfg.cable.reach,
            lng_mw,
            lng_reach: cfg.lng.reach,
        });

        let f = &cfg.fuel;
        let growth = |rate: f64| (1.0 + rate).powi(ti);
        let diesel_price = f.diesel_price_usd_per_litre * growth(f.diesel_escalation);
        let lng_price = f.lng_price_usd_per_mmbtu * growth(f.lng_escalation);
        let import_price =
            cfg.cable.import_price_usd_per_mwh * growth(cfg.cable.import_price_escalation);

        let fuel = d.diesel_gwh * f.diesel_litres_per_kwh * diesel_price
            + d.lng_gwh * 1000.0 * f.lng_heat_rate_mmbtu_per_mwh * lng_price / 1e6;
        let import_cost = d.import_gwh * 1000.0 * import_price / 1e6;

        let mut opex = solar_mw * cfg.solar.om_usd_per_kw_yr / 1000.0
            + battery_mwh * cfg.battery.om_usd_per_kwh_yr / 1000.0
            + d.diesel_gwh * cfg.diesel.variable_om_usd_per_mwh / 1000.0;
        for project in [cable, grid].into_iter().flatten() {
            if project.is_online(ti) {
                opex += project.om_usd_m_per_yr;
            }
        }
        if let Some(l) = lng.filter(|l| l.is_online(ti)) {
            opex += l.om_usd_m_per_yr + d.lng_gwh * cfg.lng.variable_om_usd_per_mwh / 1000.0;
        }

        let mut emissions_t = d.diesel_gwh * f.diesel_litres_per_kwh * f.diesel_co2_kg_per_litre * 1000.0
            + d.lng_gwh * 1000.0 * cfg.lng.emission_factor_t_per_mwh;
        if cfg.cable.count_import_emissions {
            let ef = cfg.cable.exporter_emission_factor
                * (1.0 - cfg.cable.exporter_ef_decline).powi(ti);
            emissions_t += d.import_gwh * 1000.0 * ef;
        }

        let x = &cfg.externalities;
        let scc = x.scc_usd_per_t * growth(x.scc_growth);
        let emission_cost = emissions_t * scc / 1e6;
        let health_cost = (d.diesel_gwh * x.health_diesel_usd_per_mwh
            + d.lng_gwh * x.health_lng_usd_per_mwh)
            / 1000.0;

        let salvage = if t == horizon {
            solar.salvage_value(ti)
                + battery.salvage_value(ti)
                + diesel_builds.salvage_value(ti)
                + infrastructure.salvage_value(ti)
        } else {
            0.0
        };

        records.push(AnnualRecord {
            year: a.base_year + ti,
            t,
            demand_gwh: net,
            gross_generation_gwh: gross,
            peak_mw: peak,
            solar_mw,
            battery_mwh,
            diesel_mw: diesel_fleet_mw,
            renewable_gwh: d.renewable_gwh(),
            curtailed_gwh: d.curtailed_gwh,
            import_gwh: d.import_gwh,
            lng_gwh: d.lng_gwh,
            diesel_gwh: d.diesel_gwh,
            re_share: if d.load_gwh > 0.0 {
                d.renewable_gwh() / d.load_gwh
            } else {
                0.0
            },
            capex_usd_m: capex,
            opex_usd_m: opex,
            fuel_usd_m: fuel,
            import_cost_usd_m: import_cost,
            salvage_usd_m: salvage,
            emissions_t,
            emission_cost_usd_m: emission_cost,
            health_cost_usd_m: health_cost,
        });
    }

    let outcome = summarize(cfg, &pathway, records);
    debug!(
        scenario = id.key(),
        pv_cost = outcome.pv.financial_cost,
        lcoe = outcome.lcoe_usd_per_kwh,
        "scenario evaluated"
    );
    outcome
}

/// Evaluates every pathway, baseline first.
pub fn evaluate_all(cfg: &ModelConfig) -> Vec<ScenarioOutcome> {
    ScenarioId::ALL.iter().map(|&id| evaluate(cfg, id)).collect()
}

/// Replaces retiring solar and storage, then tops solar up to the pathway target.
///
/// Returns the capex committed in year `t` (USD m).
fn build_renewables(
    cfg: &ModelConfig,
    pathway: &Pathway,
    solar: &mut Fleet,
    battery: &mut Fleet,
    t: u32,
    gross_gwh: f64,
    initial_share: f64,
) -> f64 {
    let ti = t as i32;
    let solar_unit = cfg.solar.capex_usd_per_kw / 1000.0
        * (1.0 - cfg.solar.capex_decline).powi(ti)
        * pathway.solar_capex_multiplier;
    let battery_unit =
        cfg.battery.capex_usd_per_kwh / 1000.0 * (1.0 - cfg.battery.capex_decline).powi(ti);

    let mut capex = 0.0;
    if t > 0 {
        capex += solar.add(ti, solar.retiring_capacity(ti), solar_unit);
        capex += battery.add(ti, battery.retiring_capacity(ti), battery_unit);
    }

    if pathway.builds_solar && t > 0 {
        let share = pathway.target_share(t, initial_share);
        let required_mw =
            share * gross_gwh * 1000.0 / (HOURS_PER_YEAR * cfg.solar.capacity_factor);
        let effective = solar.effective_capacity(ti, cfg.solar.degradation);
        let add_mw = (required_mw - effective).max(0.0);
        capex += solar.add(ti, add_mw, solar_unit);
        capex += battery.add(ti, add_mw * pathway.settings.storage_hours, battery_unit);
    }
    capex
}

fn solar_energy_gwh(effective_mw: f64, capacity_factor: f64) -> f64 {
    effective_mw * HOURS_PER_YEAR * capacity_factor / 1000.0
}

fn summarize(cfg: &ModelConfig, pathway: &Pathway, records: Vec<AnnualRecord>) -> ScenarioOutcome {
    let df = cfg.analysis.discount.factors(cfg.horizon());
    let pv_of = |f: fn(&AnnualRecord) -> f64| {
        let flows: Vec<f64> = records.iter().map(f).collect();
        present_value(&flows, &df)
    };

    let pv = PresentValues {
        capex: pv_of(|r| r.capex_usd_m),
        opex: pv_of(|r| r.opex_usd_m),
        fuel: pv_of(|r| r.fuel_usd_m),
        import_cost: pv_of(|r| r.import_cost_usd_m),
        salvage: pv_of(|r| r.salvage_usd_m),
        emission_cost: pv_of(|r| r.emission_cost_usd_m),
        health_cost: pv_of(|r| r.health_cost_usd_m),
        financial_cost: pv_of(AnnualRecord::financial_cost_usd_m),
        economic_cost: pv_of(AnnualRecord::economic_cost_usd_m),
        generation_gwh: pv_of(|r| r.gross_generation_gwh),
    };

    let lcoe = if pv.generation_gwh > 0.0 {
        pv.financial_cost / pv.generation_gwh
    } else {
        0.0
    };
    let total_gross: f64 = records.iter().map(|r| r.gross_generation_gwh).sum();
    let total_imported: f64 = records.iter().map(AnnualRecord::imported_energy_gwh).sum();

    ScenarioOutcome {
        scenario: pathway.id,
        cumulative_emissions_t: records.iter().map(|r| r.emissions_t).sum(),
        final_re_share: records.last().map_or(0.0, |r| r.re_share),
        domestic_share: if total_gross > 0.0 {
            (1.0 - total_imported / total_gross).max(0.0)
        } else {
            0.0
        },
        implementation_risk: pathway.settings.implementation_risk,
        lcoe_usd_per_kwh: lcoe,
        pv,
        records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ModelConfig {
        ModelConfig::base_case()
    }

    #[test]
    fn produces_one_record_per_year() {
        let out = evaluate(&base(), ScenarioId::StatusQuo);
        assert_eq!(out.records.len(), 31);
        assert_eq!(out.records[0].year, 2026);
        assert_eq!(out.records[30].year, 2056);
    }

    #[test]
    fn status_quo_is_diesel_dominated() {
        let out = evaluate(&base(), ScenarioId::StatusQuo);
        let first = &out.records[0];
        assert!(first.diesel_gwh > 0.8 * first.gross_generation_gwh);
        assert_eq!(first.import_gwh, 0.0);
        assert_eq!(first.lng_gwh, 0.0);
        assert!(first.fuel_usd_m > 200.0 && first.fuel_usd_m < 400.0);
    }

    #[test]
    fn generation_balances_every_year() {
        for id in ScenarioId::ALL {
            let out = evaluate(&base(), id);
            for r in &out.records {
                let supplied = r.renewable_gwh + r.import_gwh + r.lng_gwh + r.diesel_gwh;
                assert!(
                    (supplied - r.gross_generation_gwh).abs() < 1e-6,
                    "{} {}: supplied {supplied} vs gross {}",
                    id.key(),
                    r.year,
                    r.gross_generation_gwh
                );
            }
        }
    }

    #[test]
    fn salvage_only_in_final_year() {
        let out = evaluate(&base(), ScenarioId::NationalGrid);
        let (last, rest) = out.records.split_last().expect("records");
        assert!(rest.iter().all(|r| r.salvage_usd_m == 0.0));
        assert!(last.salvage_usd_m > 0.0);
    }

    #[test]
    fn cable_imports_only_after_online_year() {
        let cfg = base();
        let out = evaluate(&cfg, ScenarioId::FullIntegration);
        for r in &out.records {
            if r.year < cfg.cable.online_year {
                assert_eq!(r.import_gwh, 0.0);
            } else {
                assert!(r.import_gwh > 0.0);
            }
        }
        let construction: f64 = out
            .records
            .iter()
            .filter(|r| r.year < cfg.cable.online_year)
            .map(|r| r.capex_usd_m)
            .sum();
        let cable_capex =
            cfg.cable.length_km * cfg.cable.capex_usd_m_per_km + cfg.cable.converter_capex_usd_m;
        assert!(construction >= cable_capex);
    }

    #[test]
    fn lng_transition_burns_lng_after_commissioning() {
        let cfg = base();
        let out = evaluate(&cfg, ScenarioId::LngTransition);
        let online = out
            .records
            .iter()
            .find(|r| r.year == cfg.lng.online_year)
            .expect("online year in horizon");
        assert!(online.lng_gwh > 0.0);
        assert!(out.records[0].lng_gwh == 0.0);
    }

    #[test]
    fn renewable_pathways_raise_re_share() {
        let cfg = base();
        let sq = evaluate(&cfg, ScenarioId::StatusQuo);
        let max = evaluate(&cfg, ScenarioId::MaximumRe);
        assert!(max.final_re_share > sq.final_re_share + 0.3);
        assert!(max.cumulative_emissions_t < sq.cumulative_emissions_t);
    }

    #[test]
    fn status_quo_replaces_retiring_solar() {
        let cfg = base();
        let out = evaluate(&cfg, ScenarioId::StatusQuo);
        let retire_year = 25 - cfg.solar.existing_age_years as usize;
        assert!((out.records[retire_year].solar_mw - cfg.solar.existing_mw).abs() < 1e-9);
        assert!(out.records[retire_year].capex_usd_m > out.records[retire_year - 1].capex_usd_m);
    }

    #[test]
    fn lcoe_is_plausible() {
        let out = evaluate(&base(), ScenarioId::StatusQuo);
        assert!(out.lcoe_usd_per_kwh > 0.1 && out.lcoe_usd_per_kwh < 0.6);
    }
}
