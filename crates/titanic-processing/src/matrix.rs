//! Numeric feature matrix with per-row partition tags.
//!
//! Each [`FeatureRow`] carries the [`Partition`] it came from, so splitting the
//! merged data back into modeling and scoring rows is a filter on the tag and
//! never depends on row positions.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ProcessingError, Result};
use crate::types::{Label, Partition};
use crate::utils::required_f64_column;

/// One encoded passenger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub partition: Partition,
    pub label: Option<Label>,
    /// One value per matrix column; `None` marks a missing value.
    pub values: Vec<Option<f64>>,
}

/// Column-named, numeric-only matrix produced by the feature transformer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    rows: Vec<FeatureRow>,
}

impl FeatureMatrix {
    /// Create a matrix, checking that every row matches the column count.
    pub fn new(columns: Vec<String>, rows: Vec<FeatureRow>) -> Result<Self> {
        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.values.len() != columns.len())
        {
            return Err(ProcessingError::MalformedMatrix(format!(
                "row {} has {} values but the matrix has {} columns",
                idx,
                row.values.len(),
                columns.len()
            )));
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column, in row order.
    pub fn column_values(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row.values[idx]).collect())
    }

    /// Number of rows tagged with `partition`.
    pub fn partition_len(&self, partition: Partition) -> usize {
        self.rows.iter().filter(|r| r.partition == partition).count()
    }

    /// Labels in row order.
    pub fn labels(&self) -> Vec<Option<Label>> {
        self.rows.iter().map(|row| row.label).collect()
    }

    /// Feature values in row order.
    pub fn values(&self) -> Vec<Vec<Option<f64>>> {
        self.rows.iter().map(|row| row.values.clone()).collect()
    }

    /// Split into `(modeling, scoring)` by partition tag, keeping row order.
    pub fn split_partitions(self) -> (FeatureMatrix, FeatureMatrix) {
        let (modeling, scoring): (Vec<FeatureRow>, Vec<FeatureRow>) = self
            .rows
            .into_iter()
            .partition(|row| row.partition == Partition::Modeling);

        (
            FeatureMatrix {
                columns: self.columns.clone(),
                rows: modeling,
            },
            FeatureMatrix {
                columns: self.columns,
                rows: scoring,
            },
        )
    }

    /// New matrix containing only the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Result<FeatureMatrix> {
        let rows = indices
            .iter()
            .map(|&i| {
                self.rows.get(i).cloned().ok_or_else(|| {
                    ProcessingError::MalformedMatrix(format!(
                        "row index {} out of bounds for {} rows",
                        i,
                        self.rows.len()
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(FeatureMatrix {
            columns: self.columns.clone(),
            rows,
        })
    }

    /// Feature columns as a DataFrame (labels and tags are not included).
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let columns: Vec<Column> = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let values: Vec<Option<f64>> = self.rows.iter().map(|row| row.values[idx]).collect();
                Column::new(name.as_str().into(), values)
            })
            .collect();

        Ok(DataFrame::new(columns)?)
    }

    /// Rebuild a matrix from a persisted feature frame.
    ///
    /// `columns` fixes the expected order; every name must be present in the
    /// frame. Rows are tagged with `partition` and carry no label.
    pub fn from_dataframe(df: &DataFrame, columns: &[String], partition: Partition) -> Result<Self> {
        let extracted = columns
            .iter()
            .map(|name| required_f64_column(df, name))
            .collect::<Result<Vec<_>>>()?;

        let rows = (0..df.height())
            .map(|i| FeatureRow {
                partition,
                label: None,
                values: extracted.iter().map(|col| col[i]).collect(),
            })
            .collect();

        Ok(Self {
            columns: columns.to_vec(),
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(partition: Partition, label: Option<Label>, values: &[Option<f64>]) -> FeatureRow {
        FeatureRow {
            partition,
            label,
            values: values.to_vec(),
        }
    }

    fn sample_matrix() -> FeatureMatrix {
        FeatureMatrix::new(
            vec!["Age".to_string(), "Sex_male".to_string()],
            vec![
                row(Partition::Modeling, Some(0), &[Some(22.0), Some(1.0)]),
                row(Partition::Scoring, None, &[Some(34.5), Some(1.0)]),
                row(Partition::Modeling, Some(1), &[None, Some(0.0)]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_ragged_rows() {
        let result = FeatureMatrix::new(
            vec!["Age".to_string()],
            vec![row(Partition::Modeling, Some(0), &[Some(1.0), Some(2.0)])],
        );
        assert!(matches!(result, Err(ProcessingError::MalformedMatrix(_))));
    }

    #[test]
    fn test_split_partitions_uses_tags() {
        let (modeling, scoring) = sample_matrix().split_partitions();

        assert_eq!(modeling.n_rows(), 2);
        assert_eq!(scoring.n_rows(), 1);
        assert_eq!(modeling.labels(), vec![Some(0), Some(1)]);
        assert_eq!(scoring.column_values("Age"), Some(vec![Some(34.5)]));
        assert_eq!(modeling.columns(), scoring.columns());
    }

    #[test]
    fn test_select_rows() {
        let matrix = sample_matrix();
        let picked = matrix.select_rows(&[2, 0]).unwrap();
        assert_eq!(picked.labels(), vec![Some(1), Some(0)]);
        assert!(matrix.select_rows(&[3]).is_err());
    }

    #[test]
    fn test_dataframe_round_trip() {
        let matrix = sample_matrix();
        let df = matrix.to_dataframe().unwrap();
        assert_eq!(df.shape(), (3, 2));

        let back = FeatureMatrix::from_dataframe(&df, matrix.columns(), Partition::Scoring).unwrap();
        assert_eq!(back.values(), matrix.values());
        assert_eq!(back.partition_len(Partition::Scoring), 3);
        assert_eq!(back.labels(), vec![None, None, None]);
    }

    #[test]
    fn test_from_dataframe_missing_column() {
        let df = df!["Age" => [1.0]].unwrap();
        let columns = vec!["Age".to_string(), "Fare".to_string()];
        let err = FeatureMatrix::from_dataframe(&df, &columns, Partition::Modeling).unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }
}
