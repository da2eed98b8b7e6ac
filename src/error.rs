//! Crate-level error type.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by model runs, parameter loading and result export.
#[derive(Error, Debug)]
pub enum CbaError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("invalid configuration:\n{}", join_errors(.0))]
    Validation(Vec<ConfigError>),

    #[error("parameter table row {row}: {message}")]
    Parameter { row: usize, message: String },

    #[error("sampling error for {parameter}: {message}")]
    Sampling { parameter: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CbaError>;

fn join_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(|e| format!("  {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_lists_every_field() {
        let err = CbaError::Validation(vec![
            ConfigError {
                field: "analysis.horizon_years".into(),
                message: "must be > 0".into(),
            },
            ConfigError {
                field: "solar.lifetime_years".into(),
                message: "must be > 0".into(),
            },
        ]);
        let s = err.to_string();
        assert!(s.contains("analysis.horizon_years"));
        assert!(s.contains("solar.lifetime_years"));
    }
}
