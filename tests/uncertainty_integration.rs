mod common;

use std::path::Path;

use island_cba::io::export::{
    CASHFLOWS_FILE, MONTE_CARLO_FILE, PARAMETERS_FILE, RESULTS_FILE, SENSITIVITY_FILE, export_all,
};
use island_cba::model::scenario::ScenarioId;
use island_cba::params::{ParameterId, ParameterTable};
use island_cba::runner::{AnalysisOptions, run_analysis};

use common::{approx_eq, base_config, base_run, deterministic_options, quick_config};

#[test]
fn shipped_parameter_file_reproduces_base_case() {
    let cfg = base_config();
    let table = ParameterTable::from_csv_path(Path::new("data/parameters.csv")).expect("csv loads");
    assert_eq!(table.rows().len(), ParameterId::ALL.len());

    let report = run_analysis(&cfg, &table, deterministic_options()).expect("runs");
    let base = base_run();
    for (a, b) in report.run.comparisons.iter().zip(&base.comparisons) {
        assert_eq!(a.scenario, b.scenario);
        assert!(approx_eq(a.npv_usd_m, b.npv_usd_m, 1e-9));
    }
}

#[test]
fn parameter_override_flows_into_every_layer() {
    let cfg = quick_config(5);
    let mut table = ParameterTable::defaults(&cfg);
    let data = "category,parameter,value,low,high,unit,source\n\
                fuel,diesel_price,1.10,0.90,1.40,USD/litre,stress test\n";
    table.overlay(ParameterTable::from_csv_reader(data.as_bytes()).expect("csv parses"));

    let options = AnalysisOptions {
        sensitivity: true,
        monte_carlo: true,
    };
    let report = run_analysis(&cfg, &table, options).expect("runs");
    assert_eq!(report.config.fuel.diesel_price_usd_per_litre, 1.10);

    let sens = report.sensitivity.as_ref().expect("sensitivity ran");
    let row = sens
        .rows
        .iter()
        .find(|r| r.parameter == ParameterId::DieselPrice)
        .expect("diesel row");
    assert_eq!((row.low, row.base, row.high), (0.90, 1.10, 1.40));

    let mc = report.monte_carlo.as_ref().expect("monte carlo ran");
    let k = ParameterId::ALL
        .iter()
        .position(|&id| id == ParameterId::DieselPrice)
        .expect("registered");
    for d in &mc.draws {
        assert!(d.parameters[k] >= 0.90 && d.parameters[k] <= 1.40);
    }
}

#[test]
fn sensitivity_base_column_matches_deterministic_npv() {
    let cfg = base_config();
    let table = ParameterTable::defaults(&cfg);
    let options = AnalysisOptions {
        sensitivity: true,
        monte_carlo: false,
    };
    let report = run_analysis(&cfg, &table, options).expect("runs");
    let sens = report.sensitivity.as_ref().expect("sensitivity ran");
    for c in &report.run.comparisons {
        let tornado = sens.tornado(c.scenario);
        assert_eq!(tornado.len(), ParameterId::ALL.len());
        assert!(tornado.windows(2).all(|w| w[0].swing >= w[1].swing));
        for row in tornado {
            assert!(approx_eq(row.npv_base, c.npv_usd_m, 1e-12));
            if let Some(sv) = row.switching_value {
                assert!(sv >= row.low && sv <= row.high);
            }
        }
    }
}

#[test]
fn monte_carlo_is_reproducible_by_seed() {
    let cfg = quick_config(8);
    let table = ParameterTable::defaults(&cfg);
    let options = AnalysisOptions {
        sensitivity: false,
        monte_carlo: true,
    };
    let a = run_analysis(&cfg, &table, options).expect("runs");
    let b = run_analysis(&cfg, &table, options).expect("runs");
    let (ma, mb) = (
        a.monte_carlo.as_ref().expect("ran"),
        b.monte_carlo.as_ref().expect("ran"),
    );
    for id in ScenarioId::ALTERNATIVES {
        let (sa, sb) = (ma.stats(id).expect("stats"), mb.stats(id).expect("stats"));
        assert_eq!(sa.mean_npv_usd_m, sb.mean_npv_usd_m);
        assert_eq!(sa.p95_npv_usd_m, sb.p95_npv_usd_m);
        assert!(sa.prob_positive >= 0.0 && sa.prob_positive <= 1.0);
    }
}

#[test]
fn export_writes_every_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let cfg = quick_config(4);
    let table = ParameterTable::defaults(&cfg);
    let options = AnalysisOptions {
        sensitivity: true,
        monte_carlo: true,
    };
    let report = run_analysis(&cfg, &table, options).expect("runs");
    let written = export_all(&report, dir.path()).expect("export");
    assert_eq!(written.len(), 5);

    for name in [
        RESULTS_FILE,
        CASHFLOWS_FILE,
        PARAMETERS_FILE,
        SENSITIVITY_FILE,
        MONTE_CARLO_FILE,
    ] {
        assert!(dir.path().join(name).exists(), "{name} missing");
    }

    let json = std::fs::read_to_string(dir.path().join(RESULTS_FILE)).expect("read json");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(value["run"]["outcomes"].as_array().map(Vec::len), Some(7));
    assert_eq!(value["monte_carlo"]["iterations"], 4);

    let mc = std::fs::read_to_string(dir.path().join(MONTE_CARLO_FILE)).expect("read csv");
    assert_eq!(mc.lines().count(), 5);

    let params = ParameterTable::from_csv_path(&dir.path().join(PARAMETERS_FILE)).expect("reload");
    assert_eq!(params.rows(), report.parameters.rows());
}

#[test]
fn export_skips_layers_that_did_not_run() {
    let dir = tempfile::tempdir().expect("temp dir");
    let cfg = base_config();
    let table = ParameterTable::defaults(&cfg);
    let report = run_analysis(&cfg, &table, deterministic_options()).expect("runs");
    let written = export_all(&report, &dir.path().join("out")).expect("export");
    assert_eq!(written.len(), 3);
    assert!(!dir.path().join("out").join(SENSITIVITY_FILE).exists());
}
