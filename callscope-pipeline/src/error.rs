//! Pipeline error types.
//!
//! Analyzers are total and never fail. Errors only arise at the edges:
//! loading records, parsing filter or category input, and validating
//! revenue assumption overrides.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV parse error at line {line}: {source}")]
    Csv {
        line: usize,
        #[source]
        source: csv::Error,
    },

    #[error("Unsupported call file '{}': expected .json, .csv or a directory", .path.display())]
    UnsupportedFile { path: PathBuf },

    #[error("Invalid value for {field}: {value}")]
    InvalidFilter { field: &'static str, value: String },

    #[error("Unknown drill-down category: {0}")]
    UnknownCategory(String),

    #[error("Invalid revenue assumption {name}: {value}")]
    InvalidAssumption { name: &'static str, value: f64 },
}

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
