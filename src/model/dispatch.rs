//! Typical-day hourly merit-order dispatch.
//!
//! Each modelled year is represented by one 24-hour day scaled by 365.

use std::f64::consts::PI;

use serde::Serialize;

use super::demand::HOURS_PER_DAY;
use super::storage::Storage;

/// Days represented by the typical day.
const DAYS_PER_YEAR: f64 = 365.0;

/// Starting state of charge for the warm-up day.
const INITIAL_SOC: f64 = 0.5;

/// Supply stack available in one year.
#[derive(Debug, Clone)]
pub struct DispatchInput {
    /// Hourly gross load (MW).
    pub load_mw: [f64; HOURS_PER_DAY],
    /// Degraded solar capacity (MW).
    pub solar_mw: f64,
    /// Annual solar capacity factor.
    pub capacity_factor: f64,
    /// First generating hour.
    pub sunrise_hour: usize,
    /// First non-generating hour after daylight.
    pub sunset_hour: usize,
    /// Battery energy capacity (MWh).
    pub battery_mwh: f64,
    /// Battery power per MWh of capacity.
    pub c_rate: f64,
    pub eta_charge: f64,
    pub eta_discharge: f64,
    /// Cable import capacity (MW, zero when offline).
    pub import_mw: f64,
    /// Share of hourly load the cable can reach.
    pub import_reach: f64,
    /// LNG capacity (MW, zero when offline).
    pub lng_mw: f64,
    /// Share of hourly load the LNG plant can reach.
    pub lng_reach: f64,
}

/// Dispatch outcome for one hour (MW).
#[derive(Debug, Clone, Serialize)]
pub struct HourDispatch {
    pub hour: usize,
    pub load_mw: f64,
    pub solar_available_mw: f64,
    pub solar_used_mw: f64,
    pub curtailed_mw: f64,
    pub charge_mw: f64,
    pub discharge_mw: f64,
    pub import_mw: f64,
    pub lng_mw: f64,
    pub diesel_mw: f64,
    pub battery_soc: f64,
}

/// Annual energy by source derived from the typical day (GWh).
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnnualDispatch {
    pub load_gwh: f64,
    pub solar_used_gwh: f64,
    pub curtailed_gwh: f64,
    pub charge_gwh: f64,
    pub discharge_gwh: f64,
    pub import_gwh: f64,
    pub lng_gwh: f64,
    pub diesel_gwh: f64,
}

impl AnnualDispatch {
    /// Aggregates an hourly day to annual GWh.
    pub fn from_day(hours: &[HourDispatch]) -> Self {
        let scale = DAYS_PER_YEAR / 1000.0;
        let sum = |f: fn(&HourDispatch) -> f64| hours.iter().map(f).sum::<f64>() * scale;
        Self {
            load_gwh: sum(|h| h.load_mw),
            solar_used_gwh: sum(|h| h.solar_used_mw),
            curtailed_gwh: sum(|h| h.curtailed_mw),
            charge_gwh: sum(|h| h.charge_mw),
            discharge_gwh: sum(|h| h.discharge_mw),
            import_gwh: sum(|h| h.import_mw),
            lng_gwh: sum(|h| h.lng_mw),
            diesel_gwh: sum(|h| h.diesel_mw),
        }
    }

    /// Renewable energy delivered to load (direct solar plus battery discharge).
    pub fn renewable_gwh(&self) -> f64 {
        self.solar_used_gwh + self.discharge_gwh
    }
}

/// Hourly solar output (MW) for `solar_mw` of capacity.
///
/// A half-sine between sunrise and sunset, scaled so that daily energy equals
/// `solar_mw × 24 × capacity_factor`.
pub fn solar_profile(
    solar_mw: f64,
    capacity_factor: f64,
    sunrise_hour: usize,
    sunset_hour: usize,
) -> [f64; HOURS_PER_DAY] {
    let mut profile = [0.0; HOURS_PER_DAY];
    if solar_mw <= 0.0 || sunrise_hour >= sunset_hour {
        return profile;
    }
    let span = (sunset_hour - sunrise_hour) as f64;
    for (h, v) in profile.iter_mut().enumerate() {
        if h >= sunrise_hour && h < sunset_hour.min(HOURS_PER_DAY) {
            *v = (PI * ((h - sunrise_hour) as f64 + 0.5) / span).sin();
        }
    }
    let shape_sum: f64 = profile.iter().sum();
    if shape_sum <= 0.0 {
        return profile;
    }
    let scale = solar_mw * HOURS_PER_DAY as f64 * capacity_factor / shape_sum;
    for v in &mut profile {
        *v *= scale;
    }
    profile
}

/// Dispatches the typical day and returns the steady-state hourly records.
///
/// Merit order: solar, battery, cable import, LNG, diesel. Surplus solar
/// charges the battery and the rest is curtailed. The day is simulated twice
/// from 50% SOC and the second pass is returned.
pub fn dispatch_day(input: &DispatchInput) -> Vec<HourDispatch> {
    let solar = solar_profile(
        input.solar_mw,
        input.capacity_factor,
        input.sunrise_hour,
        input.sunset_hour,
    );
    let mut battery = Storage::new(
        input.battery_mwh.max(0.0),
        INITIAL_SOC,
        input.c_rate,
        input.eta_charge,
        input.eta_discharge,
    );

    // Warm-up pass settles the state of charge
    for h in 0..HOURS_PER_DAY {
        dispatch_hour(h, input, solar[h], &mut battery);
    }
    (0..HOURS_PER_DAY)
        .map(|h| dispatch_hour(h, input, solar[h], &mut battery))
        .collect()
}

/// Dispatches the typical day and aggregates it to annual GWh.
pub fn dispatch_year(input: &DispatchInput) -> AnnualDispatch {
    AnnualDispatch::from_day(&dispatch_day(input))
}

fn dispatch_hour(
    hour: usize,
    input: &DispatchInput,
    solar_mw: f64,
    battery: &mut Storage,
) -> HourDispatch {
    let load = input.load_mw[hour];
    let mut rec = HourDispatch {
        hour,
        load_mw: load,
        solar_available_mw: solar_mw,
        solar_used_mw: 0.0,
        curtailed_mw: 0.0,
        charge_mw: 0.0,
        discharge_mw: 0.0,
        import_mw: 0.0,
        lng_mw: 0.0,
        diesel_mw: 0.0,
        battery_soc: 0.0,
    };

    if solar_mw >= load {
        let surplus = solar_mw - load;
        let charge = battery.charge(surplus);
        rec.solar_used_mw = load;
        rec.charge_mw = charge;
        rec.curtailed_mw = surplus - charge;
    } else {
        rec.solar_used_mw = solar_mw;
        let deficit = load - solar_mw;
        let discharge = battery.discharge(deficit);
        let mut remaining = deficit - discharge;

        let import = remaining.min(input.import_mw).min(input.import_reach * load).max(0.0);
        remaining -= import;
        let lng = remaining.min(input.lng_mw).min(input.lng_reach * load).max(0.0);
        remaining -= lng;

        rec.discharge_mw = discharge;
        rec.import_mw = import;
        rec.lng_mw = lng;
        rec.diesel_mw = remaining.max(0.0);
    }
    rec.battery_soc = battery.soc;
    rec
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_input(load: f64) -> DispatchInput {
        DispatchInput {
            load_mw: [load; HOURS_PER_DAY],
            solar_mw: 0.0,
            capacity_factor: 0.175,
            sunrise_hour: 6,
            sunset_hour: 18,
            battery_mwh: 0.0,
            c_rate: 0.5,
            eta_charge: 0.95,
            eta_discharge: 0.95,
            import_mw: 0.0,
            import_reach: 0.8,
            lng_mw: 0.0,
            lng_reach: 0.7,
        }
    }

    #[test]
    fn solar_profile_matches_capacity_factor() {
        let p = solar_profile(100.0, 0.175, 6, 18);
        let daily: f64 = p.iter().sum();
        assert!((daily - 100.0 * 24.0 * 0.175).abs() < 1e-9);
        assert_eq!(p[3], 0.0);
        assert_eq!(p[18], 0.0);
        assert!(p[11] > p[7]);
    }

    #[test]
    fn diesel_only_serves_all_load() {
        let annual = dispatch_year(&flat_input(100.0));
        assert!((annual.diesel_gwh - 100.0 * 24.0 * 365.0 / 1000.0).abs() < 1e-9);
        assert_eq!(annual.solar_used_gwh, 0.0);
    }

    #[test]
    fn merit_order_prefers_import_then_lng() {
        let mut input = flat_input(100.0);
        input.import_mw = 50.0;
        input.lng_mw = 40.0;
        let day = dispatch_day(&input);
        for h in &day {
            assert!((h.import_mw - 50.0).abs() < 1e-9);
            assert!((h.lng_mw - 40.0).abs() < 1e-9);
            assert!((h.diesel_mw - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn reach_limits_import() {
        let mut input = flat_input(100.0);
        input.import_mw = 500.0;
        input.import_reach = 0.6;
        let day = dispatch_day(&input);
        assert!((day[0].import_mw - 60.0).abs() < 1e-9);
        assert!((day[0].diesel_mw - 40.0).abs() < 1e-9);
    }

    #[test]
    fn hourly_energy_balance_holds() {
        let mut input = flat_input(50.0);
        input.solar_mw = 400.0;
        input.battery_mwh = 200.0;
        input.import_mw = 10.0;
        for h in dispatch_day(&input) {
            let supplied = h.solar_used_mw + h.discharge_mw + h.import_mw + h.lng_mw + h.diesel_mw;
            assert!((supplied - h.load_mw).abs() < 1e-9, "hour {}", h.hour);
            let solar_split = h.solar_used_mw + h.charge_mw + h.curtailed_mw;
            assert!((solar_split - h.solar_available_mw).abs() < 1e-9);
        }
    }

    #[test]
    fn battery_shifts_surplus_to_evening() {
        let mut input = flat_input(50.0);
        input.solar_mw = 400.0;
        let without = dispatch_year(&input);
        input.battery_mwh = 200.0;
        let with = dispatch_year(&input);
        assert!(with.curtailed_gwh < without.curtailed_gwh);
        assert!(with.diesel_gwh < without.diesel_gwh);
        assert!(with.discharge_gwh > 0.0);
    }
}
