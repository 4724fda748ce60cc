//! Writes split CSVs, the fitted preprocessor and the run report to disk.

use crate::config::FeatureHeader;
use crate::error::{Result, ResultExt};
use crate::preprocessor::Preprocessor;
use crate::split::TrainTestSplit;
use crate::types::{OutputPaths, RunSummary};
use polars::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

pub const X_TRAIN_FILE: &str = "X_train.csv";
pub const X_TEST_FILE: &str = "X_test.csv";
pub const Y_TRAIN_FILE: &str = "y_train.csv";
pub const Y_TEST_FILE: &str = "y_test.csv";
pub const PREPROCESSOR_FILE: &str = "preprocessor.json";
pub const REPORT_FILE: &str = "run_report.json";

/// Write a frame as comma-delimited CSV with a header row and no index.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path).context(format!("Creating {}", path.display()))?;

    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(df)
        .context(format!("Writing {}", path.display()))?;

    Ok(())
}

/// Writes pipeline outputs into a single directory.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    output_dir: PathBuf,
    header: FeatureHeader,
}

impl OutputWriter {
    pub fn new(output_dir: impl Into<PathBuf>, header: FeatureHeader) -> Self {
        Self {
            output_dir: output_dir.into(),
            header,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write `X_train.csv`, `X_test.csv`, `y_train.csv` and `y_test.csv`.
    ///
    /// The directory is created if needed and existing files are overwritten.
    pub fn write_split(&self, split: &TrainTestSplit) -> Result<OutputPaths> {
        fs::create_dir_all(&self.output_dir)
            .context(format!("Creating {}", self.output_dir.display()))?;

        let x_train = self.write_features(&split.x_train, X_TRAIN_FILE)?;
        let x_test = self.write_features(&split.x_test, X_TEST_FILE)?;
        let y_train = self.write_target(&split.y_train, Y_TRAIN_FILE)?;
        let y_test = self.write_target(&split.y_test, Y_TEST_FILE)?;

        info!(
            "Saved train/test splits to {} ({} train, {} test rows)",
            self.output_dir.display(),
            split.train_len(),
            split.test_len()
        );

        Ok(OutputPaths {
            x_train,
            x_test,
            y_train,
            y_test,
            preprocessor: None,
            report: None,
        })
    }

    /// Write the fitted preprocessor as `preprocessor.json`.
    pub fn write_preprocessor(&self, preprocessor: &Preprocessor) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(PREPROCESSOR_FILE);
        preprocessor.save_json(&path)?;
        info!("Preprocessor saved: {}", path.display());
        Ok(path)
    }

    /// Write the run summary as `run_report.json`.
    pub fn write_report(&self, summary: &RunSummary) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let path = self.output_dir.join(REPORT_FILE);
        let mut file = File::create(&path)?;
        file.write_all(serde_json::to_string_pretty(summary)?.as_bytes())?;

        info!("Report saved: {}", path.display());
        Ok(path)
    }

    fn write_features(&self, x: &DataFrame, file_name: &str) -> Result<PathBuf> {
        let mut df = x.clone();
        if self.header == FeatureHeader::Ordinal {
            let names: Vec<String> = (0..df.width()).map(|i| i.to_string()).collect();
            df.set_column_names(names)?;
        }

        let path = self.output_dir.join(file_name);
        write_csv(&mut df, &path)?;
        Ok(path)
    }

    fn write_target(&self, y: &Series, file_name: &str) -> Result<PathBuf> {
        let mut df = DataFrame::new(vec![y.clone().into_column()])?;
        let path = self.output_dir.join(file_name);
        write_csv(&mut df, &path)?;
        Ok(path)
    }
}
