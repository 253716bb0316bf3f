//! On-disk hand-off between the training and prediction stages.
//!
//! Feature matrices and label vectors are written as headered CSV files.
//! [`ensure_fresh`] guards prediction against artifacts left over from an
//! older dataset.

use chrono::{DateTime, Local};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

use titanic_processing::utils::{read_csv, required_f64_column, write_csv};
use titanic_processing::{FeatureMatrix, Label, Partition};

use crate::error::{LearningError, Result};

/// Column header of the holdout label file.
pub const HOLDOUT_LABEL_COLUMN: &str = "y_holdout";

/// Column header of the prediction file.
pub const PREDICTION_COLUMN: &str = "y_pred";

pub fn write_features(matrix: &FeatureMatrix, path: &Path) -> Result<()> {
    let mut df = matrix.to_dataframe()?;
    write_csv(&mut df, path)?;
    Ok(())
}

/// Read a feature CSV, taking `columns` in that order.
pub fn read_features(path: &Path, columns: &[String], partition: Partition) -> Result<FeatureMatrix> {
    let df = read_artifact(path)?;
    Ok(FeatureMatrix::from_dataframe(&df, columns, partition)?)
}

/// Write labels as a single named column.
pub fn write_labels(labels: &[Label], column: &str, path: &Path) -> Result<()> {
    let mut df = DataFrame::new(vec![Column::new(column.into(), labels.to_vec())])?;
    write_csv(&mut df, path)?;
    Ok(())
}

/// Read a single label column; every cell must hold a value.
pub fn read_labels(path: &Path, column: &str) -> Result<Vec<Label>> {
    let df = read_artifact(path)?;
    required_f64_column(&df, column)?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.map(|v| v.round() as Label).ok_or_else(|| {
                LearningError::InvalidData(format!(
                    "{}: missing label in row {}",
                    path.display(),
                    row
                ))
            })
        })
        .collect()
}

fn read_artifact(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(LearningError::MissingArtifact {
            path: path.to_path_buf(),
        });
    }
    Ok(read_csv(path)?)
}

/// Fail if any artifact is missing or older than any existing input.
///
/// Inputs that do not exist are skipped; there is nothing to compare against.
pub fn ensure_fresh(artifacts: &[PathBuf], inputs: &[PathBuf]) -> Result<()> {
    let input_times = inputs
        .iter()
        .filter(|p| p.exists())
        .map(|p| modified(p).map(|time| (p, time)))
        .collect::<Result<Vec<_>>>()?;

    for artifact in artifacts {
        if !artifact.exists() {
            return Err(LearningError::MissingArtifact {
                path: artifact.clone(),
            });
        }
        let artifact_time = modified(artifact)?;

        for (input, input_time) in &input_times {
            if artifact_time < *input_time {
                debug!(
                    "{} written {} but {} modified {}",
                    artifact.display(),
                    timestamp(artifact_time),
                    input.display(),
                    timestamp(*input_time)
                );
                return Err(LearningError::StaleArtifact {
                    artifact: artifact.clone(),
                    input: (*input).clone(),
                });
            }
        }
    }

    Ok(())
}

fn modified(path: &Path) -> Result<SystemTime> {
    Ok(std::fs::metadata(path)?.modified()?)
}

fn timestamp(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
