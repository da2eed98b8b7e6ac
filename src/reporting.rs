//! Plain-text summary of an analysis run.

use std::fmt;

use crate::model::scenario::ScenarioId;
use crate::runner::AnalysisReport;

/// Sensitivity drivers listed per alternative.
const TOP_DRIVERS: usize = 3;

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let run = &self.run;
        writeln!(
            f,
            "--- Scenario outcomes ({}-{}) ---",
            run.base_year,
            run.base_year + run.discount_factors.len() as i32 - 1
        )?;
        for o in &run.outcomes {
            writeln!(f, "{o}")?;
        }

        writeln!(f, "\n--- Cost-benefit vs status quo ---")?;
        for c in &run.comparisons {
            writeln!(f, "{c}")?;
        }

        writeln!(f, "\n--- Financing ---")?;
        for s in &run.financing {
            writeln!(
                f,
                "{:<26} | capex={:>8.1}m  peak debt service={:>7.1}m/yr  outstanding={:>8.1}m",
                s.scenario.to_string(),
                s.total_capex_usd_m,
                s.peak_debt_service_usd_m,
                s.outstanding_principal_usd_m,
            )?;
        }

        writeln!(f, "\n--- Distribution ---")?;
        for d in run.distribution.iter().filter(|d| d.scenario != ScenarioId::StatusQuo) {
            writeln!(
                f,
                "{:<26} | tariff {:>+7.4} $/kWh  welfare={:>7.2}m/yr  weighted={:>7.2}m/yr  {}",
                d.scenario.to_string(),
                d.tariff_change_usd_per_kwh,
                d.unweighted_welfare_usd_m,
                d.weighted_welfare_usd_m,
                if d.progressive { "progressive" } else { "regressive" },
            )?;
        }

        writeln!(f, "\n--- Multi-criteria ranking ---")?;
        for s in run.ranking() {
            writeln!(f, "{}. {:<26} score={:.3}", s.rank, s.scenario.to_string(), s.total)?;
        }

        if let Some(mc) = &self.monte_carlo {
            writeln!(
                f,
                "\n--- Monte Carlo ({} draws, seed {}) ---",
                mc.iterations, mc.seed
            )?;
            for s in &mc.scenarios {
                writeln!(
                    f,
                    "{:<26} | mean={:>9.1}m  P5={:>9.1}m  P95={:>9.1}m  P(NPV>0)={:>5.1}%  P(best)={:>5.1}%",
                    s.scenario.to_string(),
                    s.mean_npv_usd_m,
                    s.p5_npv_usd_m,
                    s.p95_npv_usd_m,
                    s.prob_positive * 100.0,
                    s.prob_best * 100.0,
                )?;
            }
            writeln!(
                f,
                "{:<26} | P(best)={:>5.1}%",
                ScenarioId::StatusQuo.to_string(),
                mc.status_quo_prob_best * 100.0
            )?;
        }

        if let Some(sens) = &self.sensitivity {
            writeln!(f, "\n--- Main NPV drivers ---")?;
            for id in ScenarioId::ALTERNATIVES {
                let drivers: Vec<String> = sens
                    .tornado(id)
                    .iter()
                    .take(TOP_DRIVERS)
                    .map(|r| format!("{} ({:.0}m)", r.parameter, r.swing))
                    .collect();
                writeln!(f, "{:<26} | {}", id.to_string(), drivers.join(", "))?;
            }
        }

        Ok(())
    }
}
