//! Configuration for training and prediction.
//!
//! This module provides [`TrainingConfig`], which controls the holdout split,
//! the k-NN classifier and the names of every artifact written to disk. Use
//! [`TrainingConfig::builder()`] for a fluent construction API.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::LearningError;
use crate::report::validate_report_file_name;

/// Configuration for the training and prediction stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of neighbours consulted by the classifier.
    pub n_neighbors: usize,

    /// Fraction of the modeling rows held out for evaluation.
    ///
    /// Must be in range `(0.0, 1.0)` exclusive.
    pub test_size: f64,

    /// Seed for the stratified shuffle.
    pub random_seed: u64,

    /// Directory all artifacts are written to and read from.
    pub output_dir: PathBuf,

    /// Serialized trained pipeline.
    pub model_file: String,

    /// Scoring-set feature matrix.
    pub scoring_features_file: String,

    /// Holdout feature matrix.
    pub holdout_features_file: String,

    /// Holdout labels, single column `y_holdout`.
    pub holdout_labels_file: String,

    /// Per-class classification report.
    pub report_file: String,

    /// Scoring-set predictions, single column `y_pred`.
    pub predictions_file: String,

    /// Refuse to predict from artifacts older than the input datasets.
    pub check_freshness: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            n_neighbors: 7,
            test_size: 0.3,
            random_seed: 42,
            output_dir: PathBuf::from("."),
            model_file: "knn_pipeline.json".to_string(),
            scoring_features_file: "X_test.csv".to_string(),
            holdout_features_file: "X_holdout.csv".to_string(),
            holdout_labels_file: "y_holdout_df.csv".to_string(),
            report_file: "class_report.csv".to_string(),
            predictions_file: "y_pred.csv".to_string(),
            check_freshness: true,
        }
    }
}

impl TrainingConfig {
    /// Create a new builder for `TrainingConfig`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use titanic_learning::TrainingConfig;
    ///
    /// let config = TrainingConfig::builder()
    ///     .n_neighbors(5)
    ///     .output_dir("artifacts")
    ///     .build()
    ///     .expect("valid config");
    /// ```
    #[must_use]
    pub fn builder() -> TrainingConfigBuilder {
        TrainingConfigBuilder::default()
    }

    pub fn model_path(&self) -> PathBuf {
        self.output_dir.join(&self.model_file)
    }

    pub fn scoring_features_path(&self) -> PathBuf {
        self.output_dir.join(&self.scoring_features_file)
    }

    pub fn holdout_features_path(&self) -> PathBuf {
        self.output_dir.join(&self.holdout_features_file)
    }

    pub fn holdout_labels_path(&self) -> PathBuf {
        self.output_dir.join(&self.holdout_labels_file)
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(&self.report_file)
    }

    pub fn predictions_path(&self) -> PathBuf {
        self.output_dir.join(&self.predictions_file)
    }

    /// Artifacts written by training, in write order.
    pub fn training_artifacts(&self) -> [PathBuf; 4] {
        [
            self.scoring_features_path(),
            self.holdout_features_path(),
            self.holdout_labels_path(),
            self.model_path(),
        ]
    }
}

/// Builder for [`TrainingConfig`].
///
/// Created via [`TrainingConfig::builder()`]. All setters return `self` to allow
/// method chaining.
#[derive(Debug, Clone, Default)]
pub struct TrainingConfigBuilder {
    config: TrainingConfig,
}

impl TrainingConfigBuilder {
    /// Set the number of neighbours (default: 7).
    ///
    /// [`build()`](Self::build) returns an error if `k == 0`.
    #[must_use]
    pub fn n_neighbors(mut self, k: usize) -> Self {
        self.config.n_neighbors = k;
        self
    }

    /// Set the holdout fraction (default: 0.3).
    ///
    /// [`build()`](Self::build) returns an error if `size <= 0.0` or `size >= 1.0`.
    #[must_use]
    pub fn test_size(mut self, size: f64) -> Self {
        self.config.test_size = size;
        self
    }

    /// Set the random seed for reproducibility (default: 42).
    #[must_use]
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = seed;
        self
    }

    /// Set the artifact directory (default: ".").
    #[must_use]
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// Set the pipeline artifact file name (default: "knn_pipeline.json").
    #[must_use]
    pub fn model_file(mut self, name: impl Into<String>) -> Self {
        self.config.model_file = name.into();
        self
    }

    /// Set the report file name (default: "class_report.csv").
    #[must_use]
    pub fn report_file(mut self, name: impl Into<String>) -> Self {
        self.config.report_file = name.into();
        self
    }

    /// Set the predictions file name (default: "y_pred.csv").
    #[must_use]
    pub fn predictions_file(mut self, name: impl Into<String>) -> Self {
        self.config.predictions_file = name.into();
        self
    }

    /// Enable or disable the artifact freshness check (default: true).
    #[must_use]
    pub fn check_freshness(mut self, check: bool) -> Self {
        self.config.check_freshness = check;
        self
    }

    /// Build the configuration, validating all settings.
    ///
    /// # Errors
    ///
    /// Returns [`LearningError::InvalidConfig`] if:
    /// - `n_neighbors` is 0
    /// - `test_size` is not in range `(0.0, 1.0)`
    /// - any artifact file name is empty
    /// - `report_file` does not end in `.csv`
    pub fn build(self) -> Result<TrainingConfig, LearningError> {
        if self.config.n_neighbors == 0 {
            return Err(LearningError::InvalidConfig(
                "n_neighbors must be at least 1".to_string(),
            ));
        }

        if !(self.config.test_size > 0.0 && self.config.test_size < 1.0) {
            return Err(LearningError::InvalidConfig(
                "test_size must be between 0.0 and 1.0 (exclusive)".to_string(),
            ));
        }

        let names = [
            ("model_file", &self.config.model_file),
            ("scoring_features_file", &self.config.scoring_features_file),
            ("holdout_features_file", &self.config.holdout_features_file),
            ("holdout_labels_file", &self.config.holdout_labels_file),
            ("report_file", &self.config.report_file),
            ("predictions_file", &self.config.predictions_file),
        ];
        if let Some((field, _)) = names.iter().find(|(_, name)| name.trim().is_empty()) {
            return Err(LearningError::InvalidConfig(format!(
                "{} must not be empty",
                field
            )));
        }

        validate_report_file_name(&self.config.report_file)
            .map_err(|e| LearningError::InvalidConfig(e.to_string()))?;

        Ok(self.config)
    }
}
