//! Three-stage classification pipeline and its persisted form.
//!
//! [`KnnPipeline`] describes the pipeline (mean imputation, standard scaling,
//! k-NN) before fitting. [`KnnPipeline::fit`] runs the stages in order, each
//! stage fitted on the output of the previous one, and returns an immutable
//! [`TrainedPipeline`].
//!
//! # Lifecycle
//!
//! A `TrainedPipeline` is created in one of two ways:
//!
//! 1. **From training**: [`KnnPipeline::fit`]
//! 2. **From disk**: [`TrainedPipeline::load`] on a file written by
//!    [`TrainedPipeline::save`]
//!
//! # Example
//!
//! ```rust,ignore
//! use titanic_learning::{KnnPipeline, TrainedPipeline};
//!
//! let pipeline = KnnPipeline::new(7).fit(&holdout_train, &labels)?;
//! pipeline.save("knn_pipeline.json")?;
//!
//! let restored = TrainedPipeline::load("knn_pipeline.json")?;
//! let predictions = restored.predict(&scoring)?;
//! ```

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::{debug, info};

use titanic_processing::{FeatureMatrix, Label};

use crate::error::{LearningError, Result};
use crate::stages::{KnnClassifier, MeanImputer, StandardScaler};

/// Unfitted pipeline description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnnPipeline {
    n_neighbors: usize,
}

impl Default for KnnPipeline {
    fn default() -> Self {
        Self { n_neighbors: 7 }
    }
}

impl KnnPipeline {
    pub fn new(n_neighbors: usize) -> Self {
        Self { n_neighbors }
    }

    pub fn n_neighbors(&self) -> usize {
        self.n_neighbors
    }

    /// Fit imputer, scaler and classifier on `features` and `labels`.
    pub fn fit(&self, features: &FeatureMatrix, labels: &[Label]) -> Result<TrainedPipeline> {
        if features.n_rows() != labels.len() {
            return Err(LearningError::InvalidData(format!(
                "{} feature rows but {} labels",
                features.n_rows(),
                labels.len()
            )));
        }

        let rows = features.values();
        let imputer = MeanImputer::fit(&rows, features.columns())?;
        let imputed = imputer.transform(&rows)?;

        let scaler = StandardScaler::fit(&imputed)?;
        let scaled = scaler.transform(&imputed)?;

        let classifier = KnnClassifier::fit(self.n_neighbors, &scaled, labels)?;

        info!(
            "Fitted pipeline on {} rows x {} features (k = {}, classes {:?})",
            features.n_rows(),
            features.n_cols(),
            self.n_neighbors,
            classifier.classes()
        );

        Ok(TrainedPipeline {
            feature_names: features.columns().to_vec(),
            imputer,
            scaler,
            classifier,
            fitted_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        })
    }
}

/// A fitted pipeline, immutable and ready for inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedPipeline {
    feature_names: Vec<String>,
    imputer: MeanImputer,
    scaler: StandardScaler,
    classifier: KnnClassifier,
    fitted_at: String,
}

static_assertions::assert_impl_all!(TrainedPipeline: Send, Sync);

impl TrainedPipeline {
    /// Feature columns the pipeline was fitted on, in order.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Class labels known to the classifier, ascending.
    pub fn classes(&self) -> &[Label] {
        self.classifier.classes()
    }

    pub fn n_neighbors(&self) -> usize {
        self.classifier.n_neighbors()
    }

    pub fn fitted_at(&self) -> &str {
        &self.fitted_at
    }

    pub fn imputer(&self) -> &MeanImputer {
        &self.imputer
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    /// Impute and scale a feature matrix with the fitted statistics.
    pub fn transform(&self, features: &FeatureMatrix) -> Result<Vec<Vec<f64>>> {
        if features.columns() != self.feature_names.as_slice() {
            return Err(LearningError::InvalidData(format!(
                "feature columns {:?} do not match fitted columns {:?}",
                features.columns(),
                self.feature_names
            )));
        }

        let imputed = self.imputer.transform(&features.values())?;
        self.scaler.transform(&imputed)
    }

    pub fn predict(&self, features: &FeatureMatrix) -> Result<Vec<Label>> {
        let scaled = self.transform(features)?;
        let predictions = self.classifier.predict(&scaled)?;
        debug!("Predicted {} rows", predictions.len());
        Ok(predictions)
    }

    /// Write the pipeline as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        info!("Saved pipeline to {}", path.display());
        Ok(())
    }

    /// Restore a pipeline written by [`save`](Self::save).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LearningError::ModelNotFound {
                path: path.to_path_buf(),
            });
        }

        let reader = BufReader::new(File::open(path)?);
        let pipeline: Self = serde_json::from_reader(reader)?;
        debug!(
            "Loaded pipeline fitted at {} ({} features)",
            pipeline.fitted_at,
            pipeline.feature_names.len()
        );
        Ok(pipeline)
    }
}
