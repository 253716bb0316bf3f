//! Training stage: split, fit and persist.

use std::path::PathBuf;
use tracing::info;

use titanic_processing::{FeatureMatrix, Label, Partition};

use crate::artifacts::{HOLDOUT_LABEL_COLUMN, write_features, write_labels};
use crate::config::TrainingConfig;
use crate::error::{LearningError, Result};
use crate::pipeline::{KnnPipeline, TrainedPipeline};
use crate::split::stratified_split;

/// Summary of one training run.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub pipeline: TrainedPipeline,
    pub train_rows: usize,
    pub holdout_rows: usize,
    pub scoring_rows: usize,
    /// Files written, in write order.
    pub artifacts: Vec<PathBuf>,
}

/// Fits the pipeline on the modeling rows and writes the training artifacts.
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Run the training stage on the merged feature matrix.
    ///
    /// Writes the scoring features, the holdout features and labels, and the
    /// fitted pipeline. Any failure aborts the stage.
    pub fn run(&self, matrix: FeatureMatrix) -> Result<TrainingOutcome> {
        let (modeling, scoring) = matrix.split_partitions();
        info!(
            "Training on {} modeling rows; {} scoring rows set aside",
            modeling.n_rows(),
            scoring.n_rows()
        );

        let labels = modeling_labels(&modeling)?;
        let split = stratified_split(&labels, self.config.test_size, self.config.random_seed)?;

        let train = modeling.select_rows(&split.train)?;
        let holdout = modeling.select_rows(&split.holdout)?;
        let train_labels: Vec<Label> = split.train.iter().map(|&i| labels[i]).collect();
        let holdout_labels: Vec<Label> = split.holdout.iter().map(|&i| labels[i]).collect();
        info!(
            "Stratified split: {} train / {} holdout (test_size {}, seed {})",
            train.n_rows(),
            holdout.n_rows(),
            self.config.test_size,
            self.config.random_seed
        );

        let pipeline = KnnPipeline::new(self.config.n_neighbors).fit(&train, &train_labels)?;

        let [scoring_path, holdout_path, labels_path, model_path] = self.config.training_artifacts();
        write_features(&scoring, &scoring_path)?;
        write_features(&holdout, &holdout_path)?;
        write_labels(&holdout_labels, HOLDOUT_LABEL_COLUMN, &labels_path)?;
        pipeline.save(&model_path)?;

        info!("Training artifacts written to {}", self.config.output_dir.display());

        Ok(TrainingOutcome {
            pipeline,
            train_rows: train.n_rows(),
            holdout_rows: holdout.n_rows(),
            scoring_rows: scoring.n_rows(),
            artifacts: vec![scoring_path, holdout_path, labels_path, model_path],
        })
    }
}

/// Labels of the modeling partition; every row must be labelled.
fn modeling_labels(modeling: &FeatureMatrix) -> Result<Vec<Label>> {
    if modeling.is_empty() {
        return Err(LearningError::InvalidData(format!(
            "no {} rows to train on",
            Partition::Modeling
        )));
    }

    modeling
        .labels()
        .into_iter()
        .enumerate()
        .map(|(row, label)| {
            label.ok_or_else(|| {
                LearningError::InvalidData(format!("modeling row {} has no survival label", row))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::read_labels;
    use pretty_assertions::assert_eq;
    use titanic_processing::FeatureRow;

    fn tagged_matrix(n_modeling: usize, n_scoring: usize) -> FeatureMatrix {
        let modeling = (0..n_modeling).map(|i| FeatureRow {
            partition: Partition::Modeling,
            label: Some((i % 2) as Label),
            values: vec![Some(i as f64), Some((i % 2) as f64)],
        });
        let scoring = (0..n_scoring).map(|i| FeatureRow {
            partition: Partition::Scoring,
            label: None,
            values: vec![Some(i as f64 + 0.5), None],
        });

        FeatureMatrix::new(
            vec!["Age".to_string(), "Sex_male".to_string()],
            modeling.chain(scoring).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_run_writes_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let config = TrainingConfig::builder()
            .output_dir(dir.path())
            .n_neighbors(3)
            .build()
            .unwrap();

        let outcome = Trainer::new(config.clone()).run(tagged_matrix(20, 5)).unwrap();

        assert_eq!(outcome.holdout_rows, 6);
        assert_eq!(outcome.train_rows, 14);
        assert_eq!(outcome.scoring_rows, 5);
        assert!(outcome.artifacts.iter().all(|p| p.exists()));

        let holdout_labels = read_labels(&config.holdout_labels_path(), HOLDOUT_LABEL_COLUMN).unwrap();
        assert_eq!(holdout_labels.len(), 6);
        // Balanced classes stay balanced in the holdout
        assert_eq!(holdout_labels.iter().filter(|&&l| l == 1).count(), 3);
    }

    #[test]
    fn test_unlabelled_modeling_row_is_rejected() {
        let mut matrix = tagged_matrix(6, 0);
        let mut rows = matrix.rows().to_vec();
        rows[2].label = None;
        matrix = FeatureMatrix::new(matrix.columns().to_vec(), rows).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let config = TrainingConfig::builder().output_dir(dir.path()).build().unwrap();
        let result = Trainer::new(config).run(matrix);
        assert!(matches!(result, Err(LearningError::InvalidData(_))));
    }

    #[test]
    fn test_no_modeling_rows() {
        let result = Trainer::default().run(tagged_matrix(0, 3));
        assert!(matches!(result, Err(LearningError::InvalidData(_))));
    }
}
