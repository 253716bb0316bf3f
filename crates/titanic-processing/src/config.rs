//! Configuration types for dataset loading and feature engineering.
//!
//! The fixed "magic" values of the workflow (the embarkation fill value, the
//! unknown-deck sentinel and the dropped reference levels) live here as named
//! configuration instead of being recomputed from the data on every run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::features::CATEGORICAL_FEATURES;

/// Default location of the remote CSV sources.
pub const DEFAULT_BASE_URL: &str =
    "https://raw.githubusercontent.com/kylegilde/D622-Machine-Learning/master/titanic-data/";

/// Reference levels dropped after one-hot encoding, one per categorical feature.
pub const DEFAULT_REFERENCE_LEVELS: [(&str, &str); 5] = [
    ("Pclass", "3"),
    ("Sex", "female"),
    ("Embarked", "S"),
    ("Deck", "A"),
    ("Title", "Mr"),
];

/// Configuration for the processing stage.
///
/// Use [`ProcessingConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use titanic_processing::ProcessingConfig;
///
/// let config = ProcessingConfig::builder()
///     .data_dir("data")
///     .offline(true)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Base URL the dataset file names are appended to.
    pub base_url: String,

    /// File name of the training (modeling) dataset.
    /// Default: "train.csv"
    pub train_file: String,

    /// File name of the scoring dataset.
    /// Default: "test.csv"
    pub test_file: String,

    /// Directory holding the cached datasets and all later artifacts.
    /// Default: "."
    pub data_dir: PathBuf,

    /// HTTP timeout for each remote fetch.
    /// Default: 30
    pub request_timeout_secs: u64,

    /// Skip the remote fetch and use only the local cache.
    /// Default: false
    pub offline: bool,

    /// Value used for missing embarkation ports (the training-set mode).
    /// Default: "S"
    pub embarked_fill: String,

    /// Deck assigned to passengers without a cabin.
    /// Default: "Unknown"
    pub unknown_deck: String,

    /// Categorical feature -> level whose indicator column is dropped.
    pub reference_levels: BTreeMap<String, String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            train_file: "train.csv".to_string(),
            test_file: "test.csv".to_string(),
            data_dir: PathBuf::from("."),
            request_timeout_secs: 30,
            offline: false,
            embarked_fill: "S".to_string(),
            unknown_deck: "Unknown".to_string(),
            reference_levels: default_reference_levels(),
        }
    }
}

fn default_reference_levels() -> BTreeMap<String, String> {
    DEFAULT_REFERENCE_LEVELS
        .iter()
        .map(|(feature, level)| (feature.to_string(), level.to_string()))
        .collect()
}

impl ProcessingConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ProcessingConfigBuilder {
        ProcessingConfigBuilder::default()
    }

    /// Path of the cached training dataset.
    pub fn train_path(&self) -> PathBuf {
        self.data_dir.join(&self.train_file)
    }

    /// Path of the cached scoring dataset.
    pub fn test_path(&self) -> PathBuf {
        self.data_dir.join(&self.test_file)
    }

    /// Name of the dropped indicator column for a categorical feature, if any.
    pub fn reference_column(&self, feature: &str) -> Option<String> {
        self.reference_levels
            .get(feature)
            .map(|level| format!("{}_{}", feature, level))
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.offline && self.base_url.trim().is_empty() {
            return Err(ConfigValidationError::EmptyField("base_url".to_string()));
        }

        for (field, value) in [
            ("train_file", &self.train_file),
            ("test_file", &self.test_file),
            ("embarked_fill", &self.embarked_fill),
            ("unknown_deck", &self.unknown_deck),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigValidationError::EmptyField(field.to_string()));
            }
        }

        if self.train_file == self.test_file {
            return Err(ConfigValidationError::DuplicateFileName(
                self.train_file.clone(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }

        if let Some(unknown) = self
            .reference_levels
            .keys()
            .find(|feature| !CATEGORICAL_FEATURES.contains(&feature.as_str()))
        {
            return Err(ConfigValidationError::UnknownFeature(unknown.clone()));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Configuration field '{0}' must not be empty")]
    EmptyField(String),

    #[error("Training and scoring datasets share the file name '{0}'")]
    DuplicateFileName(String),

    #[error("Request timeout must be at least one second")]
    InvalidTimeout,

    #[error("Reference level given for unknown categorical feature '{0}'")]
    UnknownFeature(String),
}

/// Builder for [`ProcessingConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct ProcessingConfigBuilder {
    base_url: Option<String>,
    train_file: Option<String>,
    test_file: Option<String>,
    data_dir: Option<PathBuf>,
    request_timeout_secs: Option<u64>,
    offline: Option<bool>,
    embarked_fill: Option<String>,
    unknown_deck: Option<String>,
    reference_levels: Option<BTreeMap<String, String>>,
}

impl ProcessingConfigBuilder {
    /// Set the base URL for the remote datasets.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the training dataset file name.
    pub fn train_file(mut self, name: impl Into<String>) -> Self {
        self.train_file = Some(name.into());
        self
    }

    /// Set the scoring dataset file name.
    pub fn test_file(mut self, name: impl Into<String>) -> Self {
        self.test_file = Some(name.into());
        self
    }

    /// Set the directory for cached datasets and artifacts.
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(path.into());
        self
    }

    /// Set the HTTP timeout in seconds.
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    /// Only use the local cache, never the network.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = Some(offline);
        self
    }

    /// Set the fill value for missing embarkation ports.
    pub fn embarked_fill(mut self, value: impl Into<String>) -> Self {
        self.embarked_fill = Some(value.into());
        self
    }

    /// Set the sentinel deck for passengers without a cabin.
    pub fn unknown_deck(mut self, value: impl Into<String>) -> Self {
        self.unknown_deck = Some(value.into());
        self
    }

    /// Override the reference level dropped for one categorical feature.
    pub fn reference_level(mut self, feature: impl Into<String>, level: impl Into<String>) -> Self {
        self.reference_levels
            .get_or_insert_with(default_reference_levels)
            .insert(feature.into(), level.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `ProcessingConfig` or an error if validation fails.
    pub fn build(self) -> Result<ProcessingConfig, ConfigValidationError> {
        let defaults = ProcessingConfig::default();
        let config = ProcessingConfig {
            base_url: self.base_url.unwrap_or(defaults.base_url),
            train_file: self.train_file.unwrap_or(defaults.train_file),
            test_file: self.test_file.unwrap_or(defaults.test_file),
            data_dir: self.data_dir.unwrap_or(defaults.data_dir),
            request_timeout_secs: self
                .request_timeout_secs
                .unwrap_or(defaults.request_timeout_secs),
            offline: self.offline.unwrap_or(defaults.offline),
            embarked_fill: self.embarked_fill.unwrap_or(defaults.embarked_fill),
            unknown_deck: self.unknown_deck.unwrap_or(defaults.unknown_deck),
            reference_levels: self.reference_levels.unwrap_or(defaults.reference_levels),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProcessingConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.train_file, "train.csv");
        assert_eq!(config.test_file, "test.csv");
        assert_eq!(config.embarked_fill, "S");
        assert_eq!(config.unknown_deck, "Unknown");
        assert_eq!(config.reference_levels.len(), 5);
        assert!(!config.offline);
    }

    #[test]
    fn test_reference_column() {
        let config = ProcessingConfig::default();
        assert_eq!(config.reference_column("Pclass"), Some("Pclass_3".to_string()));
        assert_eq!(config.reference_column("Title"), Some("Title_Mr".to_string()));
        assert_eq!(config.reference_column("Age"), None);
    }

    #[test]
    fn test_builder_custom_values() {
        let config = ProcessingConfig::builder()
            .data_dir("cache")
            .offline(true)
            .base_url("")
            .reference_level("Deck", "Unknown")
            .build()
            .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("cache"));
        assert!(config.offline);
        assert_eq!(config.reference_column("Deck"), Some("Deck_Unknown".to_string()));
        // Other reference levels keep their defaults
        assert_eq!(config.reference_column("Sex"), Some("Sex_female".to_string()));
        assert_eq!(config.train_path(), PathBuf::from("cache").join("train.csv"));
    }

    #[test]
    fn test_validation_empty_url_online() {
        let result = ProcessingConfig::builder().base_url("  ").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::EmptyField(field) if field == "base_url"
        ));
    }

    #[test]
    fn test_validation_duplicate_file_names() {
        let result = ProcessingConfig::builder()
            .train_file("data.csv")
            .test_file("data.csv")
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::DuplicateFileName(_)
        ));
    }

    #[test]
    fn test_validation_unknown_feature() {
        let result = ProcessingConfig::builder()
            .reference_level("Ticket", "A5")
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::UnknownFeature(feature) if feature == "Ticket"
        ));
    }

    #[test]
    fn test_config_serialization() {
        let config = ProcessingConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: ProcessingConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config.embarked_fill, deserialized.embarked_fill);
        assert_eq!(config.reference_levels, deserialized.reference_levels);
    }
}
