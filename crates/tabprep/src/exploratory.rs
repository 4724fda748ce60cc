//! A small hand-built dataset for trying out missing-value cleaning.
//!
//! Independent of the main pipeline: builds five rows of sample data, drops
//! the rows with any missing value and writes what is left to a CSV file.

use crate::cleaner::DataCleaner;
use crate::error::{Result, ResultExt};
use crate::reporting::write_csv;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default output file for [`run_exploratory`].
pub const DEFAULT_EXPLORATORY_OUTPUT: &str = "cleaned_data.csv";

/// Frames produced by an exploratory run.
#[derive(Debug, Clone)]
pub struct ExploratoryOutcome {
    pub original: DataFrame,
    pub cleaned: DataFrame,
    pub output_path: PathBuf,
}

/// The sample dataset: three columns, five rows, one missing value in each column.
pub fn sample_dataset() -> Result<DataFrame> {
    let df = df![
        "Name" => [Some("Alice"), Some("Bob"), Some("Charlie"), None, Some("Eve")],
        "Age" => [Some(25i64), Some(30), None, Some(22), Some(29)],
        "City" => [Some("Delhi"), Some("Mumbai"), Some("Delhi"), Some("Kolkata"), None],
    ]?;
    Ok(df)
}

/// Drop incomplete rows from the sample dataset and save the result.
pub fn run_exploratory(output_path: impl AsRef<Path>) -> Result<ExploratoryOutcome> {
    let output_path = output_path.as_ref().to_path_buf();

    let original = sample_dataset()?;
    let mut cleaned = DataCleaner::drop_missing(&original)?;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).context(format!("Creating {}", parent.display()))?;
    }
    write_csv(&mut cleaned, &output_path)?;

    info!(
        "Kept {} of {} sample rows, saved to {}",
        cleaned.height(),
        original.height(),
        output_path.display()
    );

    Ok(ExploratoryOutcome {
        original,
        cleaned,
        output_path,
    })
}
