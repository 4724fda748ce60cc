use crate::cleaner::CleaningReport;
use crate::config::{CleaningPolicy, FitStrategy};
use crate::preprocessor::Preprocessor;
use crate::split::TrainTestSplit;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Run Summary
// ============================================================================

/// What a pipeline run did, in a form suitable for logging or `run_report.json`.
///
/// # Example
///
/// ```rust,ignore
/// let result = Pipeline::builder().config(config).build()?.run()?;
/// let summary = &result.summary;
/// println!(
///     "{} train / {} test rows, {} features in {}ms",
///     summary.train_rows, summary.test_rows, summary.output_features, summary.duration_ms
/// );
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Local time the run finished, RFC 3339.
    pub generated_at: String,
    /// Input file, absent for in-memory runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_path: Option<String>,
    pub target_column: String,

    pub rows_loaded: usize,
    pub columns_loaded: usize,
    pub cleaning_policy: CleaningPolicy,
    pub cleaning: CleaningReport,

    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    /// Feature columns left out of the output matrix.
    pub skipped_columns: Vec<String>,

    /// Width of the transformed feature matrix.
    pub output_features: usize,
    pub feature_names: Vec<String>,

    pub fit_strategy: FitStrategy,
    pub test_size: f64,
    pub random_seed: u64,
    pub train_rows: usize,
    pub test_rows: usize,

    /// Total execution time in milliseconds.
    pub duration_ms: u64,
}

impl RunSummary {
    /// Share of loaded rows removed by cleaning, in percent.
    pub fn rows_removed_percentage(&self) -> f32 {
        if self.rows_loaded == 0 {
            0.0
        } else {
            (self.cleaning.rows_removed() as f32 / self.rows_loaded as f32) * 100.0
        }
    }
}

// ============================================================================
// Pipeline Outputs
// ============================================================================

/// Files written by a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputPaths {
    pub x_train: PathBuf,
    pub x_test: PathBuf,
    pub y_train: PathBuf,
    pub y_test: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preprocessor: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<PathBuf>,
}

impl OutputPaths {
    /// Every written file, the four splits first.
    pub fn all(&self) -> Vec<&PathBuf> {
        let mut paths = vec![&self.x_train, &self.x_test, &self.y_train, &self.y_test];
        paths.extend(self.preprocessor.iter());
        paths.extend(self.report.iter());
        paths
    }
}

/// Result of [`Pipeline::run`](crate::Pipeline::run).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub summary: RunSummary,
    pub outputs: OutputPaths,
}

/// Result of [`Pipeline::process`](crate::Pipeline::process): the in-memory
/// stages without touching the filesystem.
#[derive(Debug, Clone)]
pub struct ProcessedData {
    pub split: TrainTestSplit,
    pub preprocessor: Preprocessor,
    pub summary: RunSummary,
}
