use serde::{Deserialize, Serialize};
use tracing::debug;

use super::check_width;
use crate::error::{LearningError, Result};

/// Standardisation to zero mean and unit variance.
///
/// Uses the population standard deviation. Columns with zero variance keep a
/// scale of 1.0, so they are only centred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Err(LearningError::InvalidData(
                "cannot fit scaler on zero rows".to_string(),
            ));
        };
        let width = first.len();
        check_width(rows, width, "scaler")?;

        let n = rows.len() as f64;
        let mut means = Vec::with_capacity(width);
        let mut scales = Vec::with_capacity(width);

        for col in 0..width {
            let mean = rows.iter().map(|row| row[col]).sum::<f64>() / n;
            let variance = rows
                .iter()
                .map(|row| (row[col] - mean).powi(2))
                .sum::<f64>()
                / n;
            let std = variance.sqrt();

            if std > f64::EPSILON {
                scales.push(std);
            } else {
                debug!("Column {} has zero variance, scale set to 1.0", col);
                scales.push(1.0);
            }
            means.push(mean);
        }

        Ok(Self { means, scales })
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    pub fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        check_width(rows, self.means.len(), "scaler")?;

        Ok(rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(self.means.iter().zip(&self.scales))
                    .map(|(value, (mean, scale))| (value - mean) / scale)
                    .collect()
            })
            .collect())
    }
}
