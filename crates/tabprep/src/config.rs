//! Configuration types for the preprocessing pipeline.
//!
//! Every path and name the pipeline touches is a field here; nothing is read
//! from the working directory implicitly. Build a configuration with
//! [`PipelineConfig::builder()`] or deserialize one from JSON with
//! [`PipelineConfig::from_json_file`].

use crate::error::{PrepError, Result};
use crate::schema::ColumnRole;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_INPUT_PATH: &str = "data/projectdata.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "processed_data";
pub const DEFAULT_TARGET_COLUMN: &str = "Churn";
pub const DEFAULT_TEST_SIZE: f64 = 0.2;
pub const DEFAULT_RANDOM_SEED: u64 = 42;

/// Which rows the cleaner removes before splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CleaningPolicy {
    /// Drop exact duplicate rows, keeping the first occurrence
    #[default]
    DropDuplicates,
    /// Drop rows with a missing value in any column
    DropMissing,
    /// Drop rows with missing values, then exact duplicates
    DropMissingAndDuplicates,
    /// Keep every row
    None,
}

/// Which rows the preprocessor learns its statistics from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FitStrategy {
    /// Fit on every row, then split. Test rows leak into the learned
    /// statistics; kept as the default so outputs match earlier runs.
    #[default]
    FullDataset,
    /// Split first, fit on training rows only, transform both partitions.
    TrainOnly,
}

/// Strategy for imputing missing numeric values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NumericImputation {
    /// Use the mean of non-null values
    #[default]
    Mean,
    /// Use the median of non-null values
    Median,
}

/// Strategy for imputing missing categorical values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalImputation {
    /// Use the most frequent value (ties go to the smallest value)
    #[default]
    MostFrequent,
    /// Use the constant "missing"
    Constant,
}

/// Header written on the transformed feature files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeatureHeader {
    /// `Age`, `City_Delhi`, ...
    #[default]
    Named,
    /// `0`, `1`, `2`, ...
    Ordinal,
}

/// Configuration for the preprocessing pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// CSV file to load.
    /// Default: "data/projectdata.csv"
    pub input_path: PathBuf,

    /// Directory receiving `X_train.csv`, `X_test.csv`, `y_train.csv`, `y_test.csv`.
    /// Created if absent.
    /// Default: "processed_data"
    pub output_dir: PathBuf,

    /// Column holding the prediction target.
    /// Default: "Churn"
    pub target_column: String,

    /// Row removal applied before the feature/target split.
    /// Default: DropDuplicates
    pub cleaning_policy: CleaningPolicy,

    /// Whether the preprocessor is fitted before or after splitting.
    /// Default: FullDataset
    pub fit_strategy: FitStrategy,

    /// Fraction of rows assigned to the test partition (exclusive 0.0 - 1.0).
    /// Default: 0.2
    pub test_size: f64,

    /// Seed for the row shuffle.
    /// Default: 42
    pub random_seed: u64,

    /// Default: Mean
    pub numeric_imputation: NumericImputation,

    /// Default: MostFrequent
    pub categorical_imputation: CategoricalImputation,

    /// Explicit roles for feature columns, overriding dtype-based detection.
    /// Default: empty
    pub column_roles: BTreeMap<String, ColumnRole>,

    /// Default: Named
    pub feature_header: FeatureHeader,

    /// Write the fitted preprocessor to `preprocessor.json` in the output directory.
    /// Default: false
    pub save_preprocessor: bool,

    /// Write `run_report.json` to the output directory.
    /// Default: false
    pub emit_report: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            target_column: DEFAULT_TARGET_COLUMN.to_string(),
            cleaning_policy: CleaningPolicy::default(),
            fit_strategy: FitStrategy::default(),
            test_size: DEFAULT_TEST_SIZE,
            random_seed: DEFAULT_RANDOM_SEED,
            numeric_imputation: NumericImputation::default(),
            categorical_imputation: CategoricalImputation::default(),
            column_roles: BTreeMap::new(),
            feature_header: FeatureHeader::default(),
            save_preprocessor: false,
            emit_report: false,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PrepError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config
            .validate()
            .map_err(|e| PrepError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(ConfigValidationError::InvalidTestSize(self.test_size));
        }

        if self.target_column.trim().is_empty() {
            return Err(ConfigValidationError::EmptyTargetColumn);
        }

        if let Some(role) = self.column_roles.get(&self.target_column) {
            return Err(ConfigValidationError::RoleOnTarget {
                column: self.target_column.clone(),
                role: *role,
            });
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid test size: {0} (must be strictly between 0.0 and 1.0)")]
    InvalidTestSize(f64),

    #[error("Target column name must not be empty")]
    EmptyTargetColumn,

    #[error("Column role {role:?} assigned to target column '{column}'")]
    RoleOnTarget { column: String, role: ColumnRole },
}

impl From<ConfigValidationError> for PrepError {
    fn from(err: ConfigValidationError) -> Self {
        PrepError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    input_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    target_column: Option<String>,
    cleaning_policy: Option<CleaningPolicy>,
    fit_strategy: Option<FitStrategy>,
    test_size: Option<f64>,
    random_seed: Option<u64>,
    numeric_imputation: Option<NumericImputation>,
    categorical_imputation: Option<CategoricalImputation>,
    column_roles: BTreeMap<String, ColumnRole>,
    feature_header: Option<FeatureHeader>,
    save_preprocessor: Option<bool>,
    emit_report: Option<bool>,
}

impl PipelineConfigBuilder {
    /// Start from an existing configuration, e.g. one loaded from JSON.
    pub fn from_config(config: PipelineConfig) -> Self {
        Self {
            input_path: Some(config.input_path),
            output_dir: Some(config.output_dir),
            target_column: Some(config.target_column),
            cleaning_policy: Some(config.cleaning_policy),
            fit_strategy: Some(config.fit_strategy),
            test_size: Some(config.test_size),
            random_seed: Some(config.random_seed),
            numeric_imputation: Some(config.numeric_imputation),
            categorical_imputation: Some(config.categorical_imputation),
            column_roles: config.column_roles,
            feature_header: Some(config.feature_header),
            save_preprocessor: Some(config.save_preprocessor),
            emit_report: Some(config.emit_report),
        }
    }

    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    pub fn target_column(mut self, column: impl Into<String>) -> Self {
        self.target_column = Some(column.into());
        self
    }

    pub fn cleaning_policy(mut self, policy: CleaningPolicy) -> Self {
        self.cleaning_policy = Some(policy);
        self
    }

    pub fn fit_strategy(mut self, strategy: FitStrategy) -> Self {
        self.fit_strategy = Some(strategy);
        self
    }

    /// Set the test fraction.
    ///
    /// # Arguments
    /// * `size` - Value strictly between 0.0 and 1.0 (e.g., 0.2 = 20%)
    pub fn test_size(mut self, size: f64) -> Self {
        self.test_size = Some(size);
        self
    }

    pub fn random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn numeric_imputation(mut self, strategy: NumericImputation) -> Self {
        self.numeric_imputation = Some(strategy);
        self
    }

    pub fn categorical_imputation(mut self, strategy: CategoricalImputation) -> Self {
        self.categorical_imputation = Some(strategy);
        self
    }

    /// Declare the role of a feature column explicitly.
    ///
    /// Can be called repeatedly; later calls for the same column win.
    pub fn column_role(mut self, column: impl Into<String>, role: ColumnRole) -> Self {
        self.column_roles.insert(column.into(), role);
        self
    }

    pub fn feature_header(mut self, header: FeatureHeader) -> Self {
        self.feature_header = Some(header);
        self
    }

    pub fn save_preprocessor(mut self, save: bool) -> Self {
        self.save_preprocessor = Some(save);
        self
    }

    pub fn emit_report(mut self, emit: bool) -> Self {
        self.emit_report = Some(emit);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> std::result::Result<PipelineConfig, ConfigValidationError> {
        let config = PipelineConfig {
            input_path: self
                .input_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_PATH)),
            output_dir: self
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            target_column: self
                .target_column
                .unwrap_or_else(|| DEFAULT_TARGET_COLUMN.to_string()),
            cleaning_policy: self.cleaning_policy.unwrap_or_default(),
            fit_strategy: self.fit_strategy.unwrap_or_default(),
            test_size: self.test_size.unwrap_or(DEFAULT_TEST_SIZE),
            random_seed: self.random_seed.unwrap_or(DEFAULT_RANDOM_SEED),
            numeric_imputation: self.numeric_imputation.unwrap_or_default(),
            categorical_imputation: self.categorical_imputation.unwrap_or_default(),
            column_roles: self.column_roles,
            feature_header: self.feature_header.unwrap_or_default(),
            save_preprocessor: self.save_preprocessor.unwrap_or(false),
            emit_report: self.emit_report.unwrap_or(false),
        };

        config.validate()?;
        Ok(config)
    }
}
