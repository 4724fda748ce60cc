//! Tabular Data Preprocessing Library
//!
//! Turns a raw CSV into model-ready train/test matrices with Polars.
//!
//! # Overview
//!
//! The pipeline runs five stages in order:
//!
//! - **Loading**: read a CSV with a header row, inferring column dtypes
//! - **Cleaning**: drop duplicate rows and/or rows with missing values
//! - **Splitting**: separate the target column from the features
//! - **Preprocessing**: impute and standardize numeric columns, impute and
//!   one-hot encode categorical columns
//! - **Persisting**: shuffle rows with a fixed seed into train/test
//!   partitions and write `X_train.csv`, `X_test.csv`, `y_train.csv`, `y_test.csv`
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tabprep::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::builder()
//!     .input_path("data/projectdata.csv")
//!     .target_column("Churn")
//!     .output_dir("processed_data")
//!     .build()?;
//!
//! let result = Pipeline::builder().config(config).build()?.run()?;
//!
//! println!(
//!     "{} train / {} test rows, {} features",
//!     result.summary.train_rows, result.summary.test_rows, result.summary.output_features
//! );
//! ```
//!
//! # Using the stages directly
//!
//! ```rust,ignore
//! use tabprep::{DataCleaner, CleaningPolicy, Preprocessor, PipelineConfig};
//! use tabprep::{load_csv, split_features_target};
//!
//! let df = load_csv("data/projectdata.csv")?;
//! let (df, _report) = DataCleaner::new(CleaningPolicy::DropDuplicates).clean(df)?;
//! let split = split_features_target(&df, "Churn")?;
//!
//! let mut preprocessor = Preprocessor::build(&split.features, &PipelineConfig::default())?;
//! let x = preprocessor.fit_transform(&split.features)?;
//! println!("{:?}", preprocessor.feature_names()?);
//! ```
//!
//! # Fit strategy
//!
//! By default the preprocessor is fitted on every row before the train/test
//! split, which lets test rows influence the learned means, scales and
//! vocabularies. [`FitStrategy::TrainOnly`] fits on the training rows only;
//! both strategies assign the same rows to each partition for a given seed.

pub mod cleaner;
pub mod config;
pub mod error;
pub mod exploratory;
pub mod loader;
pub mod pipeline;
pub mod preprocessor;
pub mod reporting;
pub mod schema;
pub mod split;
pub mod splitter;
pub mod transformers;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{CleaningReport, DataCleaner};
pub use config::{
    CategoricalImputation, CleaningPolicy, ConfigValidationError, FeatureHeader, FitStrategy,
    NumericImputation, PipelineConfig, PipelineConfigBuilder,
};
pub use error::{PrepError, Result as PrepResult, ResultExt};
pub use exploratory::{ExploratoryOutcome, run_exploratory, sample_dataset};
pub use loader::{load_csv, parse_csv_str};
pub use pipeline::{
    ClosureProgressReporter, Pipeline, PipelineBuilder, PipelineStage, ProgressReporter,
    ProgressUpdate,
};
pub use preprocessor::Preprocessor;
pub use reporting::OutputWriter;
pub use schema::{ColumnPartition, ColumnRole, classify_columns};
pub use split::{SplitIndices, TrainTestSplit};
pub use splitter::{FeatureTargetSplit, split_features_target};
pub use transformers::{CategoricalImputer, NumericImputer, OneHotEncoder, StandardScaler};
pub use types::{OutputPaths, PipelineResult, ProcessedData, RunSummary};
pub use utils::{DtypeCategory, get_dtype_category, is_numeric_dtype};
