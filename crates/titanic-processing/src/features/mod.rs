//! Feature engineering for the passenger datasets.
//!
//! The transformer merges the modeling and scoring records (each row tagged
//! with its [`Partition`]), derives the `Deck` and `Title` features, fills the
//! embarkation port, one-hot encodes the categorical features and drops one
//! reference level per feature. Identifier and free-text fields (passenger
//! id, cabin, ticket, name) never reach the matrix.
//!
//! # Example
//!
//! ```rust,ignore
//! use titanic_processing::{FeatureTransformer, ProcessingConfig};
//!
//! let transformer = FeatureTransformer::new(ProcessingConfig::default());
//! let matrix = transformer.transform(&train_records, &test_records)?;
//! let (modeling, scoring) = matrix.split_partitions();
//! ```

mod derive;
mod encoding;

pub use derive::{extract_deck, extract_title, fill_embarked};
pub use encoding::OneHotEncoding;

use tracing::{debug, info};

use crate::config::ProcessingConfig;
use crate::error::{ProcessingError, Result};
use crate::matrix::{FeatureMatrix, FeatureRow};
use crate::types::{Label, Partition, PassengerRecord};

/// Numeric features, in matrix column order.
pub const NUMERIC_FEATURES: [&str; 4] = ["Age", "SibSp", "Parch", "Fare"];

/// Categorical features, encoded after the numeric columns in this order.
pub const CATEGORICAL_FEATURES: [&str; 5] = ["Pclass", "Sex", "Embarked", "Deck", "Title"];

/// A passenger after the per-row mapping steps, before encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedPassenger {
    pub partition: Partition,
    pub label: Option<Label>,
    /// Values for [`NUMERIC_FEATURES`].
    pub numeric: [Option<f64>; 4],
    /// Values for [`CATEGORICAL_FEATURES`].
    pub categorical: [Option<String>; 5],
}

/// Turns passenger records into a numeric [`FeatureMatrix`].
#[derive(Debug, Clone, Default)]
pub struct FeatureTransformer {
    config: ProcessingConfig,
}

impl FeatureTransformer {
    pub fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// Apply the per-row mapping steps to one record.
    pub fn derive(&self, partition: Partition, record: &PassengerRecord) -> DerivedPassenger {
        let deck = extract_deck(record.cabin.as_deref(), &self.config.unknown_deck);
        let title = record.name.as_deref().and_then(extract_title);
        let embarked = fill_embarked(record.embarked.as_deref(), &self.config.embarked_fill);

        DerivedPassenger {
            partition,
            label: record.survived,
            numeric: [record.age, record.sib_sp, record.parch, record.fare],
            categorical: [
                record.pclass.map(|p| p.to_string()),
                record.sex.clone(),
                Some(embarked),
                Some(deck),
                title,
            ],
        }
    }

    /// Merge both datasets and encode them into one tagged matrix.
    ///
    /// Modeling rows come first, then scoring rows, each in input order.
    pub fn transform(
        &self,
        modeling: &[PassengerRecord],
        scoring: &[PassengerRecord],
    ) -> Result<FeatureMatrix> {
        let derived: Vec<DerivedPassenger> = modeling
            .iter()
            .map(|r| self.derive(Partition::Modeling, r))
            .chain(scoring.iter().map(|r| self.derive(Partition::Scoring, r)))
            .collect();

        if derived.is_empty() {
            return Err(ProcessingError::EmptyDataset("merged passengers".to_string()));
        }

        let encodings = self.fit_encodings(&derived);

        let mut columns: Vec<String> = NUMERIC_FEATURES.iter().map(|f| f.to_string()).collect();
        for encoding in &encodings {
            columns.extend(encoding.column_names());
        }

        let rows = derived
            .into_iter()
            .map(|passenger| {
                let mut values: Vec<Option<f64>> = passenger.numeric.to_vec();
                for (encoding, value) in encodings.iter().zip(passenger.categorical.iter()) {
                    values.extend(encoding.encode(value.as_deref()).into_iter().map(Some));
                }
                FeatureRow {
                    partition: passenger.partition,
                    label: passenger.label,
                    values,
                }
            })
            .collect();

        let matrix = FeatureMatrix::new(columns, rows)?;
        info!(
            "Encoded {} passengers ({} modeling, {} scoring) into {} feature columns",
            matrix.n_rows(),
            modeling.len(),
            scoring.len(),
            matrix.n_cols()
        );
        Ok(matrix)
    }

    /// Observe levels for every categorical feature and drop the reference levels.
    fn fit_encodings(&self, derived: &[DerivedPassenger]) -> Vec<OneHotEncoding> {
        CATEGORICAL_FEATURES
            .iter()
            .enumerate()
            .map(|(idx, feature)| {
                let mut encoding = OneHotEncoding::fit(
                    feature,
                    derived.iter().map(|p| p.categorical[idx].as_deref()),
                );

                if let Some(level) = self.config.reference_levels.get(*feature) {
                    if encoding.drop_level(level) {
                        debug!("Dropped reference column {}_{}", feature, level);
                    } else {
                        debug!(
                            "Reference level '{}' not observed for {}, nothing dropped",
                            level, feature
                        );
                    }
                }

                debug!("{} levels: {:?}", feature, encoding.levels());
                encoding
            })
            .collect()
    }
}
