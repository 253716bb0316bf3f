//! Dataset acquisition with a local-cache fallback.
//!
//! [`DatasetLoader::load`] fetches the training and scoring CSVs over HTTP,
//! validates them and caches them in the data directory. When the remote
//! source is unreachable (or the loader is offline) the cached files are used
//! instead.

use polars::prelude::*;
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::ProcessingConfig;
use crate::error::{ProcessingError, Result, ResultExt};
use crate::types::{PassengerRecord, records_from_dataframe};
use crate::utils::{read_csv, read_csv_bytes, write_csv};

/// Where a loaded dataset pair came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetOrigin {
    Remote,
    LocalCache,
}

/// The training and scoring datasets of one run.
#[derive(Debug, Clone)]
pub struct Datasets {
    pub train: DataFrame,
    pub test: DataFrame,
    pub origin: DatasetOrigin,
}

impl Datasets {
    /// Convert both frames into passenger records.
    pub fn records(&self) -> Result<(Vec<PassengerRecord>, Vec<PassengerRecord>)> {
        let train = records_from_dataframe(&self.train).context("Reading training records")?;
        let test = records_from_dataframe(&self.test).context("Reading scoring records")?;
        Ok((train, test))
    }
}

/// Check that a dataset has at least one row and one column.
///
/// Logs the outcome either way.
pub fn validate_dataset(name: &str, df: &DataFrame) -> bool {
    let valid = df.height() > 0 && df.width() > 0;
    if valid {
        info!("{} loaded correctly ({} rows, {} columns)", name, df.height(), df.width());
    } else {
        warn!("{} did NOT load correctly", name);
    }
    valid
}

/// Loads the two source datasets.
#[derive(Debug)]
pub struct DatasetLoader {
    config: ProcessingConfig,
    client: Option<Client>,
}

impl DatasetLoader {
    /// Create a loader. No HTTP client is built when the config is offline.
    pub fn new(config: ProcessingConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| ProcessingError::InvalidConfig(e.to_string()))?;

        let client = if config.offline {
            None
        } else {
            Some(
                Client::builder()
                    .timeout(Duration::from_secs(config.request_timeout_secs))
                    .build()?,
            )
        };

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// Remote URL of a dataset file.
    pub fn url_for(&self, file: &str) -> String {
        if self.config.base_url.ends_with('/') {
            format!("{}{}", self.config.base_url, file)
        } else {
            format!("{}/{}", self.config.base_url, file)
        }
    }

    /// Download and parse one remote CSV.
    pub fn fetch(&self, file: &str) -> Result<DataFrame> {
        let url = self.url_for(file);
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| ProcessingError::SourceUnreachable {
                source_name: url.clone(),
                reason: "loader is offline".to_string(),
            })?;

        info!("Fetching {}", url);
        let response = client.get(&url).send()?;

        if !response.status().is_success() {
            return Err(ProcessingError::SourceUnreachable {
                source_name: url,
                reason: format!("HTTP {}", response.status()),
            });
        }

        let bytes = response.bytes()?;
        read_csv_bytes(bytes.to_vec(), &url)
    }

    /// Read one cached CSV from the data directory.
    pub fn read_local(&self, file: &str) -> Result<DataFrame> {
        read_csv(&self.config.data_dir.join(file))
    }

    /// Fetch both datasets, falling back to the local cache.
    ///
    /// Remote data that validates is written to the cache before returning.
    /// Fails only when neither source yields a valid pair.
    pub fn load(&self) -> Result<Datasets> {
        if self.config.offline {
            info!("Offline mode, reading cached datasets");
        } else {
            match self.fetch_remote() {
                Ok((train, test)) => {
                    self.persist(&train, &test)?;
                    return Ok(Datasets {
                        train,
                        test,
                        origin: DatasetOrigin::Remote,
                    });
                }
                Err(e) => {
                    error!("Remote datasets unavailable [{}]: {}", e.error_code(), e);
                    warn!(
                        "Falling back to cached {} and {} in {}",
                        self.config.train_file,
                        self.config.test_file,
                        self.config.data_dir.display()
                    );
                }
            }
        }

        let train = self.read_local(&self.config.train_file)?;
        let test = self.read_local(&self.config.test_file)?;
        self.ensure_valid(&train, &test)?;

        Ok(Datasets {
            train,
            test,
            origin: DatasetOrigin::LocalCache,
        })
    }

    fn fetch_remote(&self) -> Result<(DataFrame, DataFrame)> {
        let train = self.fetch(&self.config.train_file)?;
        let test = self.fetch(&self.config.test_file)?;
        self.ensure_valid(&train, &test)?;
        Ok((train, test))
    }

    fn ensure_valid(&self, train: &DataFrame, test: &DataFrame) -> Result<()> {
        // Evaluate both so each dataset gets its own log line
        let train_ok = validate_dataset(&self.config.train_file, train);
        let test_ok = validate_dataset(&self.config.test_file, test);

        if !train_ok {
            return Err(ProcessingError::EmptyDataset(self.config.train_file.clone()));
        }
        if !test_ok {
            return Err(ProcessingError::EmptyDataset(self.config.test_file.clone()));
        }
        Ok(())
    }

    fn persist(&self, train: &DataFrame, test: &DataFrame) -> Result<()> {
        write_csv(&mut train.clone(), &self.config.train_path())?;
        write_csv(&mut test.clone(), &self.config.test_path())?;
        info!("Cached datasets in {}", self.config.data_dir.display());
        Ok(())
    }
}
