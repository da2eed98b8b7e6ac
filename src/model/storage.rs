//! Grid-scale battery storage model.

/// The utility battery in the typical-day dispatch, stepped once per hour.
///
/// Power is in MW and energy in MWh, so with a one-hour step an MW figure is
/// also the MWh moved in that hour. Charging only absorbs solar surplus and
/// discharging only serves the residual deficit ahead of imports and fuel.
#[derive(Debug, Clone)]
pub struct Storage {
    /// Energy capacity (MWh).
    pub capacity_mwh: f64,

    /// State of charge as a fraction (0.0 to 1.0).
    pub soc: f64,

    /// Power rating in either direction (MW).
    pub max_power_mw: f64,

    /// Charging efficiency (0..1.0].
    pub eta_c: f64,

    /// Discharging efficiency (0..1.0].
    pub eta_d: f64,
}

impl Storage {
    /// Creates a battery sized from its energy capacity and C-rate.
    ///
    /// A zero capacity gives a battery that never moves energy, which is how
    /// pathways without storage are dispatched.
    ///
    /// # Panics
    ///
    /// Panics if capacity or C-rate is negative, SOC is outside [0, 1], or an
    /// efficiency is outside (0, 1]. Validated configs never trigger this.
    pub fn new(capacity_mwh: f64, soc: f64, c_rate: f64, eta_c: f64, eta_d: f64) -> Self {
        assert!(capacity_mwh >= 0.0);
        assert!((0.0..=1.0).contains(&soc));
        assert!(c_rate >= 0.0);
        assert!(eta_c > 0.0 && eta_c <= 1.0);
        assert!(eta_d > 0.0 && eta_d <= 1.0);

        Self {
            capacity_mwh,
            soc,
            max_power_mw: capacity_mwh * c_rate,
            eta_c,
            eta_d,
        }
    }

    /// Stored energy available before discharge losses (MWh).
    pub fn stored_mwh(&self) -> f64 {
        self.soc * self.capacity_mwh
    }

    /// Absorbs up to `surplus_mw` for one hour and returns the MW taken from the grid.
    ///
    /// Limited by the power rating and by headroom grossed up for charging losses.
    pub fn charge(&mut self, surplus_mw: f64) -> f64 {
        if self.capacity_mwh <= 0.0 || surplus_mw <= 0.0 {
            return 0.0;
        }
        let headroom_mw = (self.capacity_mwh - self.stored_mwh()).max(0.0) / self.eta_c;
        let taken = surplus_mw.min(self.max_power_mw).min(headroom_mw);
        self.soc = ((self.stored_mwh() + taken * self.eta_c) / self.capacity_mwh).clamp(0.0, 1.0);
        taken
    }

    /// Serves up to `deficit_mw` for one hour and returns the MW delivered to load.
    ///
    /// Limited by the power rating and by stored energy net of discharge losses.
    pub fn discharge(&mut self, deficit_mw: f64) -> f64 {
        if self.capacity_mwh <= 0.0 || deficit_mw <= 0.0 {
            return 0.0;
        }
        let deliverable_mw = self.stored_mwh() * self.eta_d;
        let delivered = deficit_mw.min(self.max_power_mw).min(deliverable_mw);
        self.soc = ((self.stored_mwh() - delivered / self.eta_d) / self.capacity_mwh).clamp(0.0, 1.0);
        delivered
    }
}
