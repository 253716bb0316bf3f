//! CLI entry point for the Titanic survival workflow.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use titanic_learning::{ClassificationReport, Predictor, Trainer, TrainingConfig};
use titanic_processing::{
    DatasetLoader, Datasets, FeatureMatrix, FeatureTransformer, ProcessingConfig,
};
use tracing::{error, info, warn};

/// Workflow stages; `run` chains all of them.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Download the datasets and refresh the local cache
    Fetch,
    /// Fetch, engineer features, split and fit the pipeline
    Train,
    /// Evaluate on the holdout and score the test set from saved artifacts
    Predict,
    /// Fetch, train and predict in one go (default)
    Run,
}

#[derive(Parser, Debug)]
#[command(
    author = "Titanic Workflow Team",
    version,
    about = "k-NN survival model for the Titanic datasets",
    long_about = "Downloads the Titanic training and scoring sets, engineers features,\n\
                  fits an imputer -> scaler -> k-NN pipeline on a stratified split and\n\
                  writes a classification report plus test-set predictions.\n\n\
                  EXAMPLES:\n  \
                  # Full workflow in the current directory\n  \
                  titanic\n\n  \
                  # Use only the cached CSVs in data/\n  \
                  titanic --data-dir data --offline\n\n  \
                  # Re-score from saved artifacts\n  \
                  titanic predict --data-dir data"
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Directory for cached datasets and all artifacts
    #[arg(long, default_value = ".", global = true)]
    data_dir: PathBuf,

    /// Base URL the dataset file names are appended to
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Skip the download and use the cached datasets only
    #[arg(long, global = true)]
    offline: bool,

    /// Number of neighbours for the classifier
    #[arg(short = 'k', long, default_value = "7", global = true)]
    neighbors: usize,

    /// Fraction of labelled rows held out for evaluation
    #[arg(long, default_value = "0.3", global = true)]
    test_size: f64,

    /// Seed for the stratified split
    #[arg(long, default_value = "42", global = true)]
    seed: u64,

    /// Predict even if artifacts are older than the datasets
    #[arg(long, global = true)]
    skip_freshness_check: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet);

    // Invalid configuration is the only failure that exits non-zero
    let mut processing_builder = ProcessingConfig::builder()
        .data_dir(&args.data_dir)
        .offline(args.offline);
    if let Some(ref url) = args.base_url {
        processing_builder = processing_builder.base_url(url);
    }
    let processing = processing_builder.build()?;

    let training = TrainingConfig::builder()
        .output_dir(&args.data_dir)
        .n_neighbors(args.neighbors)
        .test_size(args.test_size)
        .random_seed(args.seed)
        .check_freshness(!args.skip_freshness_check)
        .build()?;

    let command = args.command.unwrap_or(Command::Run);
    info!("Running '{:?}' in {}", command, args.data_dir.display());

    match command {
        Command::Fetch => {
            load_datasets(&processing);
        }
        Command::Train => {
            train_stage(&processing, &training);
        }
        Command::Predict => {
            predict_stage(&processing, &training, args.quiet);
        }
        Command::Run => {
            if train_stage(&processing, &training) {
                predict_stage(&processing, &training, args.quiet);
            } else {
                warn!("Skipping prediction because training did not complete");
            }
        }
    }

    Ok(())
}

/// Fetch (or fall back to the cache). Logs and returns `None` on failure.
fn load_datasets(config: &ProcessingConfig) -> Option<Datasets> {
    let loaded = DatasetLoader::new(config.clone()).and_then(|loader| loader.load());
    match loaded {
        Ok(datasets) => {
            info!("Datasets ready ({:?})", datasets.origin);
            Some(datasets)
        }
        Err(e) => {
            error!("Could not load datasets [{}]: {}", e.error_code(), e);
            warn!(
                "Place {} and {} in {} to run offline",
                config.train_file,
                config.test_file,
                config.data_dir.display()
            );
            None
        }
    }
}

fn build_features(config: &ProcessingConfig, datasets: &Datasets) -> Option<FeatureMatrix> {
    let matrix = datasets
        .records()
        .and_then(|(train, test)| FeatureTransformer::new(config.clone()).transform(&train, &test));
    match matrix {
        Ok(matrix) => Some(matrix),
        Err(e) => {
            error!("Feature engineering failed [{}]: {}", e.error_code(), e);
            None
        }
    }
}

/// Load, transform and train. Returns whether all artifacts were written.
fn train_stage(processing: &ProcessingConfig, training: &TrainingConfig) -> bool {
    let Some(datasets) = load_datasets(processing) else {
        warn!("Skipping training: no datasets");
        return false;
    };
    let Some(matrix) = build_features(processing, &datasets) else {
        warn!("Skipping training: no feature matrix");
        return false;
    };

    match Trainer::new(training.clone()).run(matrix) {
        Ok(outcome) => {
            info!(
                "Training complete: {} train, {} holdout, {} scoring rows",
                outcome.train_rows, outcome.holdout_rows, outcome.scoring_rows
            );
            true
        }
        Err(e) => {
            error!("Training failed [{}]: {}", e.error_code(), e);
            false
        }
    }
}

fn predict_stage(processing: &ProcessingConfig, training: &TrainingConfig, quiet: bool) {
    let predictor = Predictor::new(training.clone()).with_datasets(processing);

    match predictor.run() {
        Ok(outcome) => {
            if !quiet {
                print_report(&outcome.report, outcome.holdout_accuracy);
            }
            info!("Predicted {} scoring rows", outcome.predictions.len());
        }
        Err(e) => {
            error!("Prediction failed [{}]: {}", e.error_code(), e);
            warn!("Run 'titanic train' to regenerate the artifacts");
        }
    }
}

/// Print the report table.
///
/// Uses `println!` because the table is the primary output of the command,
/// independent of the log level.
fn print_report(report: &ClassificationReport, holdout_accuracy: f64) {
    println!(
        "\n{:<10} {:>10} {:>10} {:>10} {:>10}",
        "class", "precision", "recall", "f1_score", "support"
    );
    println!("{}", "-".repeat(54));
    for row in report.rows() {
        println!(
            "{:<10} {:>10.2} {:>10.2} {:>10.2} {:>10.0}",
            row.class, row.precision, row.recall, row.f1_score, row.support
        );
    }
    println!("\nHoldout accuracy: {:.4}", holdout_accuracy);
}
