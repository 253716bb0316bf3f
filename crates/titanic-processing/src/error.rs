//! Custom error types for dataset loading and feature engineering.
//!
//! This module provides the error hierarchy used throughout the processing
//! crate. Every external I/O boundary (HTTP fetch, CSV read/write) maps its
//! failure into a [`ProcessingError`] so callers can log and skip the
//! dependent block instead of panicking.

use thiserror::Error;

/// The main error type for the processing crate.
#[derive(Error, Debug)]
pub enum ProcessingError {
    /// A remote or local dataset source could not be read.
    #[error("Source '{source_name}' unreachable: {reason}")]
    SourceUnreachable { source_name: String, reason: String },

    /// A dataset was read but contains no rows or no columns.
    #[error("Dataset '{0}' is empty")]
    EmptyDataset(String),

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A feature matrix does not have the expected shape.
    #[error("Malformed feature matrix: {0}")]
    MalformedMatrix(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// HTTP request error.
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ProcessingError>,
    },
}

impl ProcessingError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ProcessingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code, useful for log filtering.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SourceUnreachable { .. } => "SOURCE_UNREACHABLE",
            Self::EmptyDataset(_) => "EMPTY_DATASET",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::MalformedMatrix(_) => "MALFORMED_MATRIX",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::HttpRequest(_) => "HTTP_REQUEST_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether a local fallback may still succeed after this error.
    pub fn is_source_failure(&self) -> bool {
        match self {
            Self::SourceUnreachable { .. } | Self::EmptyDataset(_) | Self::HttpRequest(_) => true,
            Self::WithContext { source, .. } => source.is_source_failure(),
            _ => false,
        }
    }
}

/// Result type alias for processing operations.
pub type Result<T> = std::result::Result<T, ProcessingError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ProcessingError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ProcessingError::Io(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            ProcessingError::EmptyDataset("train.csv".to_string()).error_code(),
            "EMPTY_DATASET"
        );
        assert_eq!(
            ProcessingError::ColumnNotFound("Name".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
    }

    #[test]
    fn test_with_context() {
        let error = ProcessingError::ColumnNotFound("Cabin".to_string())
            .with_context("While reading passenger records");
        assert!(error.to_string().contains("While reading passenger records"));
        assert_eq!(error.error_code(), "COLUMN_NOT_FOUND"); // Preserves original code
    }

    #[test]
    fn test_is_source_failure() {
        let unreachable = ProcessingError::SourceUnreachable {
            source_name: "train.csv".to_string(),
            reason: "timeout".to_string(),
        };
        assert!(unreachable.is_source_failure());
        assert!(unreachable.with_context("fetch").is_source_failure());
        assert!(!ProcessingError::InvalidConfig("x".to_string()).is_source_failure());
    }

    #[test]
    fn test_io_context() {
        let io: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let err = io.context("Reading test.csv").unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
        assert!(err.to_string().starts_with("Reading test.csv"));
    }
}
