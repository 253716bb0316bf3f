//! Fitted pipeline stages.
//!
//! Each stage is produced by a `fit` constructor and is immutable afterwards:
//! - [`MeanImputer`]: replaces missing values with training-column means
//! - [`StandardScaler`]: centres and scales each column
//! - [`KnnClassifier`]: majority vote among the nearest training rows

mod imputer;
mod knn;
mod scaler;

pub use imputer::MeanImputer;
pub use knn::KnnClassifier;
pub use scaler::StandardScaler;

use crate::error::{LearningError, Result};

/// Check that every row has `width` values.
pub(crate) fn check_width<T>(rows: &[Vec<T>], width: usize, stage: &str) -> Result<()> {
    match rows.iter().position(|row| row.len() != width) {
        Some(idx) => Err(LearningError::InvalidData(format!(
            "{}: row {} has {} values, expected {}",
            stage,
            idx,
            rows[idx].len(),
            width
        ))),
        None => Ok(()),
    }
}
