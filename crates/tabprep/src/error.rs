//! Error types for the preprocessing pipeline.
//!
//! Every stage returns [`Result`], whose error is [`PrepError`]. Nothing in
//! the library recovers locally: errors travel up to the caller, optionally
//! wrapped with context describing the stage that failed.
//!
//! Errors serialize as `{ "code": ..., "message": ... }` so a run report or
//! a wrapping service can surface them without matching on variants.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while preparing a dataset.
#[derive(Error, Debug)]
pub enum PrepError {
    /// Input file does not exist.
    #[error("Input file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// A named column (target, override or transformer input) is absent.
    #[error("Column '{0}' does not exist in the data")]
    ColumnNotFound(String),

    /// Settings that contradict the data, such as an override for an unknown column.
    #[error("Bad configuration: {0}")]
    InvalidConfig(String),

    /// Dataset has no rows (or no usable columns) at a stage that needs them.
    #[error("Dataset is empty: {0}")]
    EmptyDataset(String),

    /// No observed values in a column, so no statistic can be learned.
    #[error("Column '{0}' has no observed values to fit on")]
    NoValidValues(String),

    /// Transform requested before fit.
    #[error("{0} has not been fitted")]
    NotFitted(&'static str),

    /// Train/test split cannot be produced for the given row count.
    #[error("Cannot split {rows} rows with test size {test_size}: {reason}")]
    InvalidSplit {
        rows: usize,
        test_size: f64,
        reason: String,
    },

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("DataFrame operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Config, preprocessor or report (de)serialization.
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Another error, annotated with the step that raised it.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PrepError>,
    },
}

impl PrepError {
    /// Wrap this error with a description of the failing step.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PrepError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::FileNotFound(_) => "FILE_NOT_FOUND",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::EmptyDataset(_) => "EMPTY_DATASET",
            Self::NoValidValues(_) => "NO_VALID_VALUES",
            Self::NotFitted(_) => "NOT_FITTED",
            Self::InvalidSplit { .. } => "INVALID_SPLIT",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// The innermost error, skipping any context wrappers.
    pub fn root(&self) -> &PrepError {
        match self {
            Self::WithContext { source, .. } => source.root(),
            other => other,
        }
    }
}

impl Serialize for PrepError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PrepError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

pub type Result<T> = std::result::Result<T, PrepError>;

/// `.context(..)` for the result types the library deals in.
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PrepError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PrepError::Io(e).with_context(context))
    }
}
