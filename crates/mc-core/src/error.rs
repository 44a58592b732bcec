//! Error types for microcause

use thiserror::Error;

/// microcause error type
///
/// All errors propagate immediately to the caller; there is no retry and no
/// partial result on failure.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required variable is missing or non-numeric in one or more records
    #[error("Schema error: {0}")]
    Schema(String),

    /// Fewer records than folds, or a fold would end up empty or singleton
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Numerical degeneracy: the requested fit is ill-defined
    #[error("Degenerate fit: {0}")]
    DegenerateFit(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
