//! Error types for the proteo-daa library.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum DaaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Protein identity column '{0}' not found in intensity table")]
    MissingIdentityColumn(String),

    #[error("Group '{0}' resolves to no samples")]
    EmptyGroup(String),

    #[error("Statistic undefined for protein '{0}'")]
    UndefinedStatistic(String),

    #[error("Invalid intensity '{value}' at row {row}, column '{column}'")]
    InvalidIntensity {
        value: String,
        row: usize,
        column: String,
    },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Duplicate protein identity '{0}'")]
    DuplicateProtein(String),

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Numerical error: {0}")]
    Numerical(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, DaaError>;
