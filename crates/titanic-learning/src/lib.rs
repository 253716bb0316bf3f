//! # titanic-learning
//!
//! k-nearest-neighbours survival model for the Titanic datasets.
//!
//! This crate takes the tagged feature matrix built by `titanic-processing`
//! and runs the modelling half of the workflow:
//!
//! - **Split**: seeded, stratified train/holdout split of the modeling rows
//! - **Pipeline**: mean imputation, standard scaling and k-NN, fitted in order
//! - **Persistence**: the trained pipeline is stored as JSON next to the
//!   holdout and scoring feature files
//! - **Evaluation**: per-class precision, recall, F1 and support written as a
//!   classification report, plus predictions for the scoring rows
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use titanic_learning::{Predictor, Trainer, TrainingConfig};
//!
//! let config = TrainingConfig::builder().output_dir("data").build()?;
//!
//! let outcome = Trainer::new(config.clone()).run(matrix)?;
//! println!("Trained on {} rows", outcome.train_rows);
//!
//! let prediction = Predictor::new(config).run()?;
//! println!("Holdout accuracy: {:.3}", prediction.holdout_accuracy);
//! ```

pub mod artifacts;
pub mod config;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod predictor;
pub mod report;
pub mod split;
pub mod stages;
pub mod trainer;

// Re-exports for convenient access
pub use config::{TrainingConfig, TrainingConfigBuilder};
pub use error::{LearningError, Result};
pub use metrics::{accuracy, precision_recall_fscore_support};
pub use pipeline::{KnnPipeline, TrainedPipeline};
pub use predictor::{PredictionOutcome, Predictor};
pub use report::{ClassificationReport, ReportRow, ScoreTuple, save_classification_report};
pub use split::{HoldoutSplit, stratified_split};
pub use stages::{KnnClassifier, MeanImputer, StandardScaler};
pub use trainer::{Trainer, TrainingOutcome};
