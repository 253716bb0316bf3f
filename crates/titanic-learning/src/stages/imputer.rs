use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::check_width;
use crate::error::{LearningError, Result};

/// Mean imputation fitted on the training fold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeanImputer {
    means: Vec<f64>,
}

impl MeanImputer {
    /// Compute the mean of the observed values in each column.
    ///
    /// A column with no observed values is imputed with 0.0.
    pub fn fit(rows: &[Vec<Option<f64>>], feature_names: &[String]) -> Result<Self> {
        if rows.is_empty() {
            return Err(LearningError::InvalidData(
                "cannot fit imputer on zero rows".to_string(),
            ));
        }
        check_width(rows, feature_names.len(), "imputer")?;

        let means = feature_names
            .iter()
            .enumerate()
            .map(|(col, name)| {
                let (sum, count) = rows
                    .iter()
                    .filter_map(|row| row[col])
                    .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

                if count == 0 {
                    warn!("Column '{}' has no observed values, imputing 0.0", name);
                    0.0
                } else {
                    let mean = sum / count as f64;
                    if count < rows.len() {
                        debug!(
                            "Column '{}': {} missing, mean {:.4}",
                            name,
                            rows.len() - count,
                            mean
                        );
                    }
                    mean
                }
            })
            .collect();

        Ok(Self { means })
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Fill every missing value with its column mean.
    pub fn transform(&self, rows: &[Vec<Option<f64>>]) -> Result<Vec<Vec<f64>>> {
        check_width(rows, self.means.len(), "imputer")?;

        Ok(rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&self.means)
                    .map(|(value, mean)| value.unwrap_or(*mean))
                    .collect()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("f{}", i)).collect()
    }

    #[test]
    fn test_fit_ignores_missing() {
        let rows = vec![
            vec![Some(1.0), Some(10.0)],
            vec![None, Some(20.0)],
            vec![Some(3.0), None],
        ];
        let imputer = MeanImputer::fit(&rows, &names(2)).unwrap();
        assert_eq!(imputer.means(), &[2.0, 15.0]);

        let filled = imputer.transform(&rows).unwrap();
        assert_eq!(filled[1], vec![2.0, 20.0]);
        assert_eq!(filled[2], vec![3.0, 15.0]);
    }

    #[test]
    fn test_all_missing_column_imputes_zero() {
        let rows = vec![vec![None, Some(1.0)], vec![None, Some(2.0)]];
        let imputer = MeanImputer::fit(&rows, &names(2)).unwrap();
        assert_eq!(imputer.means(), &[0.0, 1.5]);
    }

    #[test]
    fn test_transform_uses_training_means() {
        let train = vec![vec![Some(4.0)], vec![Some(6.0)]];
        let imputer = MeanImputer::fit(&train, &names(1)).unwrap();
        let filled = imputer.transform(&[vec![None], vec![Some(100.0)]]).unwrap();
        assert_eq!(filled, vec![vec![5.0], vec![100.0]]);
    }

    #[test]
    fn test_width_mismatch() {
        let imputer = MeanImputer::fit(&[vec![Some(1.0)]], &names(1)).unwrap();
        assert!(matches!(
            imputer.transform(&[vec![Some(1.0), Some(2.0)]]),
            Err(LearningError::InvalidData(_))
        ));
        assert!(MeanImputer::fit(&[], &names(1)).is_err());
    }
}
