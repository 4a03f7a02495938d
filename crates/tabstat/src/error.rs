//! Error types for the Tabstat library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Tabstat operations.
///
/// Only caller mistakes surface here. Per-row data-quality problems
/// (unparsable numbers, out-of-range cut values, ...) never error; they
/// are recorded as bounded warnings on the variant metadata instead.
#[derive(Debug, Error)]
pub enum TabstatError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file or no data to analyze.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Configuration error (unsupported transform, bad log base, ...).
    #[error("Configuration error: {0}")]
    Config(String),

    /// A variant referenced a source variant index that does not exist.
    #[error("Variant index {0} not found on base column")]
    VariantNotFound(usize),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The stats provider failed or does not support the requested test.
    #[error("Stats provider error: {0}")]
    Provider(String),
}

/// Result type alias for Tabstat operations.
pub type Result<T> = std::result::Result<T, TabstatError>;
