//! island-cba entry point: CLI wiring, logging setup and output export.

use std::path::{Path, PathBuf};
use std::process;

use tracing_subscriber::EnvFilter;

use island_cba::config::ModelConfig;
use island_cba::io::export::export_all;
use island_cba::params::ParameterTable;
use island_cba::runner::{AnalysisOptions, run_analysis};

/// Parsed CLI arguments.
struct CliArgs {
    config_path: Option<String>,
    preset: Option<String>,
    parameters_path: Option<String>,
    seed_override: Option<u64>,
    iterations_override: Option<usize>,
    output_dir: Option<PathBuf>,
    skip_sensitivity: bool,
    skip_monte_carlo: bool,
}

fn print_help() {
    eprintln!("island-cba - cost-benefit analysis of island electricity-supply pathways");
    eprintln!();
    eprintln!("Usage: island-cba [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>          Load model configuration from a TOML file");
    eprintln!(
        "  --preset <name>          Use a built-in preset ({})",
        ModelConfig::PRESETS.join(", ")
    );
    eprintln!("  --parameters <path>      Override parameter values and ranges from CSV");
    eprintln!("  --seed <u64>             Override the Monte Carlo seed");
    eprintln!("  --iterations <n>         Override the number of Monte Carlo draws");
    eprintln!("  --output-dir <dir>       Write results.json and CSV files to <dir>");
    eprintln!("  --skip-sensitivity       Skip the one-way sensitivity analysis");
    eprintln!("  --skip-monte-carlo       Skip the Monte Carlo simulation");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --config or --preset is given, the base_case preset is used.");
    eprintln!("Set RUST_LOG (e.g. RUST_LOG=debug) to change log verbosity.");
}

fn fail(message: &str) -> ! {
    eprintln!("error: {message}");
    process::exit(1);
}

fn value_of<'a>(args: &'a [String], i: usize, flag: &str, what: &str) -> &'a str {
    match args.get(i) {
        Some(v) => v.as_str(),
        None => fail(&format!("{flag} requires {what}")),
    }
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        config_path: None,
        preset: None,
        parameters_path: None,
        seed_override: None,
        iterations_override: None,
        output_dir: None,
        skip_sensitivity: false,
        skip_monte_carlo: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--config" => {
                i += 1;
                cli.config_path = Some(value_of(&args, i, "--config", "a path argument").to_string());
            }
            "--preset" => {
                i += 1;
                cli.preset = Some(value_of(&args, i, "--preset", "a name argument").to_string());
            }
            "--parameters" => {
                i += 1;
                cli.parameters_path =
                    Some(value_of(&args, i, "--parameters", "a path argument").to_string());
            }
            "--seed" => {
                i += 1;
                let v = value_of(&args, i, "--seed", "a u64 argument");
                match v.parse::<u64>() {
                    Ok(s) => cli.seed_override = Some(s),
                    Err(_) => fail(&format!("--seed value \"{v}\" is not a valid u64")),
                }
            }
            "--iterations" => {
                i += 1;
                let v = value_of(&args, i, "--iterations", "a count argument");
                match v.parse::<usize>() {
                    Ok(n) if n > 0 => cli.iterations_override = Some(n),
                    _ => fail(&format!("--iterations value \"{v}\" is not a positive integer")),
                }
            }
            "--output-dir" => {
                i += 1;
                cli.output_dir = Some(PathBuf::from(value_of(
                    &args,
                    i,
                    "--output-dir",
                    "a directory argument",
                )));
            }
            "--skip-sensitivity" => cli.skip_sensitivity = true,
            "--skip-monte-carlo" => cli.skip_monte_carlo = true,
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    if cli.config_path.is_some() && cli.preset.is_some() {
        fail("--config and --preset are mutually exclusive");
    }
    cli
}

fn main() {
    let cli = parse_args();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    // Load config: --config, then --preset, then the base case
    let loaded = if let Some(ref path) = cli.config_path {
        ModelConfig::from_toml_file(Path::new(path))
    } else if let Some(ref name) = cli.preset {
        ModelConfig::from_preset(name)
    } else {
        Ok(ModelConfig::base_case())
    };
    let mut cfg = match loaded {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    if let Some(seed) = cli.seed_override {
        cfg.analysis.seed = seed;
    }
    if let Some(n) = cli.iterations_override {
        cfg.analysis.monte_carlo_iterations = n;
    }

    let errors = cfg.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    // Rows from --parameters override the defaults inside run_analysis
    let table = match cli.parameters_path {
        Some(ref path) => match ParameterTable::from_csv_path(Path::new(path)) {
            Ok(table) => table,
            Err(e) => fail(&format!("failed to load parameters from {path}: {e}")),
        },
        None => ParameterTable::default(),
    };

    let options = AnalysisOptions {
        sensitivity: !cli.skip_sensitivity,
        monte_carlo: !cli.skip_monte_carlo,
    };
    let report = match run_analysis(&cfg, &table, options) {
        Ok(report) => report,
        Err(e) => fail(&e.to_string()),
    };

    println!("{report}");

    if let Some(ref dir) = cli.output_dir {
        if let Err(e) = export_all(&report, dir) {
            fail(&format!("failed to write outputs: {e}"));
        }
        eprintln!("Results written to {}", dir.display());
    }
}
