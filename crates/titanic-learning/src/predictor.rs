//! Prediction stage: evaluate on the holdout, score the test set.
//!
//! The predictor only reads artifacts written by [`Trainer`](crate::Trainer).
//! Before using them it checks that none predates the input datasets, so a
//! changed `train.csv` cannot be silently scored with an old model.

use std::path::PathBuf;
use tracing::{info, warn};

use titanic_processing::{Label, Partition, ProcessingConfig};

use crate::artifacts::{
    HOLDOUT_LABEL_COLUMN, PREDICTION_COLUMN, ensure_fresh, read_features, read_labels,
    write_labels,
};
use crate::config::TrainingConfig;
use crate::error::{LearningError, Result};
use crate::metrics::{accuracy, precision_recall_fscore_support};
use crate::pipeline::TrainedPipeline;
use crate::report::{ClassificationReport, save_classification_report};

/// Results of one prediction run.
#[derive(Debug, Clone)]
pub struct PredictionOutcome {
    pub report: ClassificationReport,
    pub holdout_accuracy: f64,
    /// Predicted labels for the scoring rows, in row order.
    pub predictions: Vec<Label>,
}

/// Loads the trained pipeline and produces the report and predictions.
#[derive(Debug, Clone)]
pub struct Predictor {
    config: TrainingConfig,
    inputs: Vec<PathBuf>,
}

impl Predictor {
    /// Create a predictor; the freshness inputs default to the dataset file
    /// names of [`ProcessingConfig`] in the artifact directory.
    pub fn new(config: TrainingConfig) -> Self {
        let datasets = ProcessingConfig::default();
        let inputs = vec![
            config.output_dir.join(&datasets.train_file),
            config.output_dir.join(&datasets.test_file),
        ];
        Self { config, inputs }
    }

    /// Use the cached dataset paths of `processing` as freshness inputs.
    #[must_use]
    pub fn with_datasets(self, processing: &ProcessingConfig) -> Self {
        self.with_inputs(vec![processing.train_path(), processing.test_path()])
    }

    /// Input files the artifacts are checked against.
    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    /// Compare artifact ages against these input files instead.
    #[must_use]
    pub fn with_inputs(mut self, inputs: Vec<PathBuf>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn run(&self) -> Result<PredictionOutcome> {
        let pipeline = TrainedPipeline::load(self.config.model_path())?;

        if self.config.check_freshness {
            ensure_fresh(&self.config.training_artifacts(), &self.inputs)?;
        } else {
            warn!("Artifact freshness check disabled");
        }

        let (report, holdout_accuracy) = self.evaluate_holdout(&pipeline)?;
        let predictions = self.score_test_set(&pipeline)?;

        Ok(PredictionOutcome {
            report,
            holdout_accuracy,
            predictions,
        })
    }

    fn evaluate_holdout(&self, pipeline: &TrainedPipeline) -> Result<(ClassificationReport, f64)> {
        let features = read_features(
            &self.config.holdout_features_path(),
            pipeline.feature_names(),
            Partition::Modeling,
        )?;
        let y_true = read_labels(&self.config.holdout_labels_path(), HOLDOUT_LABEL_COLUMN)?;
        if y_true.len() != features.n_rows() {
            return Err(LearningError::InvalidData(format!(
                "holdout has {} feature rows but {} labels",
                features.n_rows(),
                y_true.len()
            )));
        }

        let y_pred = pipeline.predict(&features)?;
        let holdout_accuracy = accuracy(&y_true, &y_pred);
        info!(
            "Holdout accuracy {:.4} over {} rows",
            holdout_accuracy,
            y_true.len()
        );

        let scores = precision_recall_fscore_support(&y_true, &y_pred, pipeline.classes())?;
        let report =
            save_classification_report(&scores, pipeline.classes(), &self.config.report_path())?;
        Ok((report, holdout_accuracy))
    }

    fn score_test_set(&self, pipeline: &TrainedPipeline) -> Result<Vec<Label>> {
        let features = read_features(
            &self.config.scoring_features_path(),
            pipeline.feature_names(),
            Partition::Scoring,
        )?;
        let predictions = pipeline.predict(&features)?;

        let predictions_path = self.config.predictions_path();
        write_labels(&predictions, PREDICTION_COLUMN, &predictions_path)?;
        info!(
            "Wrote {} predictions to {}",
            predictions.len(),
            predictions_path.display()
        );
        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::write_features;
    use crate::pipeline::KnnPipeline;
    use pretty_assertions::assert_eq;
    use std::fs;
    use titanic_processing::{FeatureMatrix, FeatureRow};

    fn config(dir: &std::path::Path) -> TrainingConfig {
        TrainingConfig::builder()
            .output_dir(dir)
            .n_neighbors(1)
            .build()
            .unwrap()
    }

    fn matrix(partition: Partition, values: &[f64]) -> FeatureMatrix {
        FeatureMatrix::new(
            vec!["Fare".to_string()],
            values
                .iter()
                .map(|&v| FeatureRow {
                    partition,
                    label: None,
                    values: vec![Some(v)],
                })
                .collect(),
        )
        .unwrap()
    }

    /// Write a model plus holdout and scoring files by hand.
    fn write_artifacts(config: &TrainingConfig) {
        let train = matrix(Partition::Modeling, &[1.0, 2.0, 10.0, 11.0]);
        KnnPipeline::new(1)
            .fit(&train, &[0, 0, 1, 1])
            .unwrap()
            .save(config.model_path())
            .unwrap();

        write_features(
            &matrix(Partition::Modeling, &[1.5, 10.5]),
            &config.holdout_features_path(),
        )
        .unwrap();
        write_labels(&[0, 1], HOLDOUT_LABEL_COLUMN, &config.holdout_labels_path()).unwrap();
        write_features(
            &matrix(Partition::Scoring, &[0.0, 12.0, 3.0]),
            &config.scoring_features_path(),
        )
        .unwrap();
    }

    #[test]
    fn test_default_inputs_follow_dataset_names() {
        let dir = tempfile::tempdir().unwrap();
        let predictor = Predictor::new(config(dir.path()));
        assert_eq!(
            predictor.inputs(),
            &[dir.path().join("train.csv"), dir.path().join("test.csv")]
        );

        let processing = ProcessingConfig::builder()
            .data_dir("cache")
            .train_file("passengers.csv")
            .offline(true)
            .build()
            .unwrap();
        let predictor = predictor.with_datasets(&processing);
        assert_eq!(
            predictor.inputs(),
            &[
                PathBuf::from("cache").join("passengers.csv"),
                PathBuf::from("cache").join("test.csv")
            ]
        );
    }

    #[test]
    fn test_run_scores_holdout_and_test_set() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        write_artifacts(&config);

        let outcome = Predictor::new(config.clone()).run().unwrap();

        assert_eq!(outcome.predictions, vec![0, 1, 0]);
        assert_eq!(outcome.holdout_accuracy, 1.0);
        assert_eq!(outcome.report.summary().support, 2.0);
        assert!(config.report_path().exists());
        assert_eq!(
            read_labels(&config.predictions_path(), PREDICTION_COLUMN).unwrap(),
            vec![0, 1, 0]
        );
    }

    #[test]
    fn test_label_count_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        write_artifacts(&config);
        write_labels(&[0], HOLDOUT_LABEL_COLUMN, &config.holdout_labels_path()).unwrap();

        let err = Predictor::new(config.clone()).run().unwrap_err();
        assert!(matches!(err, LearningError::InvalidData(_)));
        assert!(!config.report_path().exists());
    }

    #[test]
    fn test_missing_model() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("train.csv"), "PassengerId\n1\n").unwrap();

        let err = Predictor::new(config(dir.path())).run().unwrap_err();
        assert_eq!(err.error_code(), "MODEL_NOT_FOUND");
    }
}
