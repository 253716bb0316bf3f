//! Titanic Dataset Processing Library
//!
//! Loading and feature engineering for the Titanic survival datasets, built
//! with Polars.
//!
//! # Overview
//!
//! - **Dataset Loading**: HTTP fetch of the training and scoring CSVs with a
//!   local-cache fallback
//! - **Passenger Records**: typed rows tolerant of empty cells and absent columns
//! - **Feature Engineering**: deck and title extraction, embarkation fill,
//!   one-hot encoding with fixed reference levels
//! - **Tagged Feature Matrix**: every row remembers whether it is a modeling or
//!   scoring row, so the merged matrix splits back without row arithmetic
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use titanic_processing::{DatasetLoader, FeatureTransformer, ProcessingConfig};
//!
//! let config = ProcessingConfig::builder().data_dir("data").build()?;
//! let datasets = DatasetLoader::new(config.clone())?.load()?;
//! let (train, test) = datasets.records()?;
//!
//! let matrix = FeatureTransformer::new(config).transform(&train, &test)?;
//! let (modeling, scoring) = matrix.split_partitions();
//! println!("{} modeling rows, {} features", modeling.n_rows(), modeling.n_cols());
//! ```

pub mod config;
pub mod error;
pub mod features;
pub mod loader;
pub mod matrix;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{ConfigValidationError, ProcessingConfig, ProcessingConfigBuilder};
pub use error::{ProcessingError, Result as ProcessingResult, ResultExt};
pub use features::{CATEGORICAL_FEATURES, FeatureTransformer, NUMERIC_FEATURES};
pub use loader::{DatasetLoader, DatasetOrigin, Datasets, validate_dataset};
pub use matrix::{FeatureMatrix, FeatureRow};
pub use types::{Label, Partition, PassengerRecord, records_from_dataframe};
