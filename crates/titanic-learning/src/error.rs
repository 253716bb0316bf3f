//! Error types for the titanic-learning crate.
//!
//! This module defines [`LearningError`], the main error type used throughout
//! the crate. All public API functions return `Result<T, LearningError>`.
//!
//! # Example
//!
//! ```rust,ignore
//! use titanic_learning::{LearningError, TrainingConfig};
//!
//! fn configure() -> Result<TrainingConfig, LearningError> {
//!     // Errors are propagated with ?
//!     let config = TrainingConfig::builder().n_neighbors(7).build()?;
//!     Ok(config)
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;
use titanic_processing::ProcessingError;

/// The main error type for titanic-learning operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LearningError {
    /// Invalid configuration provided to the trainer or predictor.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid data provided for fitting or prediction.
    ///
    /// Common causes:
    /// - Feature rows of different widths
    /// - Label count not matching the row count
    /// - A single class in the training labels
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A pipeline stage was used before it was fitted.
    #[error("Stage '{0}' used before fit")]
    NotFitted(&'static str),

    /// The persisted pipeline artifact was not found.
    #[error("Model not found: {path}")]
    ModelNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// A persisted split artifact was not found.
    #[error("Artifact not found: {path}")]
    MissingArtifact {
        /// The path that was not found.
        path: PathBuf,
    },

    /// A persisted artifact predates the input data it was derived from.
    #[error("Artifact '{artifact}' is older than input '{input}', retrain first")]
    StaleArtifact { artifact: PathBuf, input: PathBuf },

    /// Report input was not exactly four equal-length sequences matching the labels.
    #[error("Malformed report input: {0}")]
    MalformedReportInput(String),

    /// Report destination does not end in `.csv`.
    #[error("Invalid report file name '{0}': expected a name ending in .csv")]
    InvalidReportFileName(String),

    /// Error raised by dataset loading or feature engineering.
    #[error(transparent)]
    Processing(#[from] ProcessingError),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Pipeline (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LearningError {
    /// Get a stable error code, useful for log filtering.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::InvalidData(_) => "INVALID_DATA",
            Self::NotFitted(_) => "NOT_FITTED",
            Self::ModelNotFound { .. } => "MODEL_NOT_FOUND",
            Self::MissingArtifact { .. } => "MISSING_ARTIFACT",
            Self::StaleArtifact { .. } => "STALE_ARTIFACT",
            Self::MalformedReportInput(_) => "MALFORMED_REPORT_INPUT",
            Self::InvalidReportFileName(_) => "INVALID_REPORT_FILE_NAME",
            Self::Processing(e) => e.error_code(),
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
        }
    }
}

/// Result type alias for learning operations.
pub type Result<T> = std::result::Result<T, LearningError>;
