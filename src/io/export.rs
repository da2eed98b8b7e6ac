//! CSV and JSON export of analysis results.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::analysis::monte_carlo::MonteCarloReport;
use crate::analysis::sensitivity::SensitivityReport;
use crate::error::Result;
use crate::model::scenario::ScenarioId;
use crate::model::types::ScenarioOutcome;
use crate::params::ParameterId;
use crate::runner::AnalysisReport;

/// Column header for the per-scenario-year cash-flow export.
const CASHFLOW_HEADER: &str = "scenario,year,t,demand_gwh,gross_generation_gwh,peak_mw,\
                               solar_mw,battery_mwh,diesel_mw,renewable_gwh,curtailed_gwh,\
                               import_gwh,lng_gwh,diesel_gwh,re_share,capex_usd_m,opex_usd_m,\
                               fuel_usd_m,import_cost_usd_m,salvage_usd_m,emissions_t,\
                               emission_cost_usd_m,health_cost_usd_m,financial_cost_usd_m";

const SENSITIVITY_HEADER: &str = "scenario,parameter,low,base,high,npv_low,npv_base,npv_high,\
                                  swing,switching_value";

pub const RESULTS_FILE: &str = "results.json";
pub const CASHFLOWS_FILE: &str = "cashflows.csv";
pub const SENSITIVITY_FILE: &str = "sensitivity.csv";
pub const MONTE_CARLO_FILE: &str = "monte_carlo.csv";
pub const PARAMETERS_FILE: &str = "parameters.csv";

fn header(h: &str) -> impl Iterator<Item = &str> {
    h.split(',').map(str::trim)
}

/// Writes one row per scenario-year.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_cashflows_csv(outcomes: &[ScenarioOutcome], writer: impl Write) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(header(CASHFLOW_HEADER))?;

    for o in outcomes {
        for r in &o.records {
            wtr.write_record(&[
                o.scenario.key().to_string(),
                r.year.to_string(),
                r.t.to_string(),
                format!("{:.4}", r.demand_gwh),
                format!("{:.4}", r.gross_generation_gwh),
                format!("{:.4}", r.peak_mw),
                format!("{:.4}", r.solar_mw),
                format!("{:.4}", r.battery_mwh),
                format!("{:.4}", r.diesel_mw),
                format!("{:.4}", r.renewable_gwh),
                format!("{:.4}", r.curtailed_gwh),
                format!("{:.4}", r.import_gwh),
                format!("{:.4}", r.lng_gwh),
                format!("{:.4}", r.diesel_gwh),
                format!("{:.6}", r.re_share),
                format!("{:.4}", r.capex_usd_m),
                format!("{:.4}", r.opex_usd_m),
                format!("{:.4}", r.fuel_usd_m),
                format!("{:.4}", r.import_cost_usd_m),
                format!("{:.4}", r.salvage_usd_m),
                format!("{:.1}", r.emissions_t),
                format!("{:.4}", r.emission_cost_usd_m),
                format!("{:.4}", r.health_cost_usd_m),
                format!("{:.4}", r.financial_cost_usd_m()),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Writes one row per scenario and parameter.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_sensitivity_csv(report: &SensitivityReport, writer: impl Write) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(header(SENSITIVITY_HEADER))?;

    for r in &report.rows {
        wtr.write_record(&[
            r.scenario.key().to_string(),
            r.parameter.name().to_string(),
            r.low.to_string(),
            r.base.to_string(),
            r.high.to_string(),
            format!("{:.4}", r.npv_low),
            format!("{:.4}", r.npv_base),
            format!("{:.4}", r.npv_high),
            format!("{:.4}", r.swing),
            r.switching_value.map_or_else(String::new, |v| format!("{v:.6}")),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes one row per draw: sampled parameters, then NPV per alternative.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_monte_carlo_csv(report: &MonteCarloReport, writer: impl Write) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    let mut columns = vec!["iteration".to_string()];
    columns.extend(ParameterId::ALL.iter().map(|id| id.name().to_string()));
    columns.extend(
        ScenarioId::ALTERNATIVES
            .iter()
            .map(|s| format!("npv_{}", s.key())),
    );
    wtr.write_record(&columns)?;

    for d in &report.draws {
        let mut row = vec![d.iteration.to_string()];
        row.extend(d.parameters.iter().map(|v| format!("{v:.6}")));
        row.extend(d.npv_usd_m.iter().map(|v| format!("{v:.4}")));
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes the full report as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json(report: &AnalysisReport, writer: impl Write) -> Result<()> {
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

fn create(dir: &Path, name: &str) -> io::Result<(PathBuf, io::BufWriter<File>)> {
    let path = dir.join(name);
    let file = File::create(&path)?;
    Ok((path, io::BufWriter::new(file)))
}

/// Writes every output file into `dir`, creating it if needed.
///
/// Sensitivity and Monte Carlo files are only written when the report
/// contains those layers. Returns the paths written.
///
/// # Errors
///
/// Returns an error if the directory or any file cannot be written.
pub fn export_all(report: &AnalysisReport, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    let (path, mut w) = create(dir, RESULTS_FILE)?;
    write_json(report, &mut w)?;
    w.flush()?;
    written.push(path);

    let (path, w) = create(dir, CASHFLOWS_FILE)?;
    write_cashflows_csv(&report.run.outcomes, w)?;
    written.push(path);

    let (path, w) = create(dir, PARAMETERS_FILE)?;
    report.parameters.write_csv(w)?;
    written.push(path);

    if let Some(s) = &report.sensitivity {
        let (path, w) = create(dir, SENSITIVITY_FILE)?;
        write_sensitivity_csv(s, w)?;
        written.push(path);
    }

    if let Some(mc) = &report.monte_carlo {
        let (path, w) = create(dir, MONTE_CARLO_FILE)?;
        write_monte_carlo_csv(mc, w)?;
        written.push(path);
    }

    for p in &written {
        info!(path = %p.display(), "wrote output");
    }
    Ok(written)
}
