//! Main preprocessing pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! orchestrating load, clean, split, transform and persist.

use crate::cleaner::DataCleaner;
use crate::config::{FitStrategy, PipelineConfig};
use crate::error::{PrepError, Result, ResultExt};
use crate::loader::load_csv;
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::preprocessor::Preprocessor;
use crate::reporting::OutputWriter;
use crate::split::{SplitIndices, TrainTestSplit, take_rows, take_values};
use crate::splitter::split_features_target;
use crate::types::{PipelineResult, ProcessedData, RunSummary};
use chrono::Local;
use polars::prelude::*;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// The main preprocessing pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use tabprep::{Pipeline, PipelineConfig, FitStrategy};
///
/// let config = PipelineConfig::builder()
///     .input_path("data/projectdata.csv")
///     .target_column("Churn")
///     .fit_strategy(FitStrategy::TrainOnly)
///     .build()?;
///
/// let result = Pipeline::builder()
///     .config(config)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .run()?;
///
/// println!("Wrote {}", result.outputs.x_train.display());
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    cleaner: DataCleaner,
    writer: OutputWriter,
}

static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage: load the configured input, process it and write the
    /// outputs to the configured directory.
    ///
    /// Errors propagate unchanged; files already written are left in place.
    pub fn run(&self) -> Result<PipelineResult> {
        self.finish(self.run_internal())
    }

    /// Run the in-memory stages on an already loaded dataset.
    ///
    /// Nothing is written to disk.
    pub fn process(&self, df: DataFrame) -> Result<ProcessedData> {
        self.finish(self.process_internal(df, None, Instant::now()))
    }

    fn finish<T>(&self, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                self.report_progress(ProgressUpdate::complete("Pipeline completed successfully"));
                Ok(value)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn run_internal(&self) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let input_path = self.config.input_path.as_path();

        info!("Starting preprocessing pipeline...");
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Loading,
            0.0,
            format!("Loading {}...", input_path.display()),
        ));

        let df = load_csv(input_path).context("Loading dataset")?;

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Loading,
            1.0,
            format!("Loaded {} rows x {} columns", df.height(), df.width()),
        ));

        let processed = self.process_internal(df, Some(input_path), start_time)?;

        // Step 6: Persist
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Persisting,
            0.0,
            "Saving train/test splits...",
        ));
        info!("Step 6: Saving outputs to {}", self.writer.output_dir().display());

        let mut outputs = self
            .writer
            .write_split(&processed.split)
            .context("Saving train/test splits")?;

        if self.config.save_preprocessor {
            outputs.preprocessor = Some(self.writer.write_preprocessor(&processed.preprocessor)?);
        }

        let mut summary = processed.summary;
        summary.duration_ms = start_time.elapsed().as_millis() as u64;

        if self.config.emit_report {
            outputs.report = Some(self.writer.write_report(&summary)?);
        }

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Persisting,
            1.0,
            format!("Saved {} files", outputs.all().len()),
        ));

        info!("Pipeline finished in {}ms", summary.duration_ms);

        Ok(PipelineResult { summary, outputs })
    }

    fn process_internal(
        &self,
        df: DataFrame,
        input_path: Option<&Path>,
        start_time: Instant,
    ) -> Result<ProcessedData> {
        let rows_loaded = df.height();
        let columns_loaded = df.width();

        // Step 1: Clean
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Cleaning,
            0.0,
            "Cleaning dataset...",
        ));
        info!("Step 1: Cleaning ({:?})...", self.cleaner.policy());

        let (df, cleaning) = self.cleaner.clean(df).context("Cleaning dataset")?;
        if df.height() == 0 {
            return Err(PrepError::EmptyDataset(format!(
                "no rows left after cleaning ({} loaded)",
                rows_loaded
            )));
        }

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Cleaning,
            1.0,
            format!("Removed {} rows", cleaning.rows_removed()),
        ));

        // Step 2: Separate the target
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Splitting,
            0.0,
            format!("Separating target '{}'...", self.config.target_column),
        ));
        info!("Step 2: Separating target '{}'...", self.config.target_column);

        let split = split_features_target(&df, &self.config.target_column)?;
        let features = split.features;
        let target = split.target;

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Splitting,
            1.0,
            format!("{} feature columns", features.width()),
        ));

        // Step 3: Build the preprocessor
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Building,
            0.0,
            "Classifying feature columns...",
        ));
        info!("Step 3: Building preprocessor...");

        let mut preprocessor =
            Preprocessor::build(&features, &self.config).context("Building preprocessor")?;

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Building,
            1.0,
            format!(
                "{} numeric, {} categorical columns",
                preprocessor.partition().numeric.len(),
                preprocessor.partition().categorical.len()
            ),
        ));

        // Step 4 and 5: Fit/transform and partition rows. The row partition is
        // drawn the same way for both strategies so membership matches.
        let indices = SplitIndices::shuffled(
            features.height(),
            self.config.test_size,
            self.config.random_seed,
        )?;

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Transforming,
            0.0,
            "Fitting preprocessor...",
        ));

        let train_test = match self.config.fit_strategy {
            FitStrategy::FullDataset => {
                info!("Step 4: Fitting on all {} rows...", features.height());
                let x = preprocessor
                    .fit_transform(&features)
                    .context("Transforming features")?;

                self.report_progress(ProgressUpdate::new(
                    PipelineStage::Partitioning,
                    0.0,
                    "Splitting rows into train/test...",
                ));
                info!("Step 5: Splitting rows (test size {})...", self.config.test_size);
                TrainTestSplit::from_indices(&x, &target, indices)?
            }
            FitStrategy::TrainOnly => {
                info!("Step 4: Fitting on {} training rows...", indices.train.len());
                let train_features = take_rows(&features, &indices.train)?;
                let test_features = take_rows(&features, &indices.test)?;

                preprocessor
                    .fit(&train_features)
                    .context("Fitting preprocessor")?;
                let x_train = preprocessor
                    .transform(&train_features)
                    .context("Transforming training rows")?;
                let x_test = preprocessor
                    .transform(&test_features)
                    .context("Transforming test rows")?;

                self.report_progress(ProgressUpdate::new(
                    PipelineStage::Partitioning,
                    0.0,
                    "Assembling train/test partitions...",
                ));
                info!("Step 5: Assembling partitions...");
                TrainTestSplit {
                    x_train,
                    x_test,
                    y_train: take_values(&target, &indices.train)?,
                    y_test: take_values(&target, &indices.test)?,
                    train_indices: indices.train,
                    test_indices: indices.test,
                }
            }
        };

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Partitioning,
            1.0,
            format!(
                "{} train / {} test rows",
                train_test.train_len(),
                train_test.test_len()
            ),
        ));

        let partition = preprocessor.partition();
        let feature_names = preprocessor.feature_names()?;
        let summary = RunSummary {
            generated_at: Local::now().to_rfc3339(),
            input_path: input_path.map(|p| p.display().to_string()),
            target_column: self.config.target_column.clone(),
            rows_loaded,
            columns_loaded,
            cleaning_policy: self.cleaner.policy(),
            cleaning,
            numeric_columns: partition.numeric.clone(),
            categorical_columns: partition.categorical.clone(),
            skipped_columns: partition.skipped.clone(),
            output_features: feature_names.len(),
            feature_names,
            fit_strategy: self.config.fit_strategy,
            test_size: self.config.test_size,
            random_seed: self.config.random_seed,
            train_rows: train_test.train_len(),
            test_rows: train_test.test_len(),
            duration_ms: start_time.elapsed().as_millis() as u64,
        };

        Ok(ProcessedData {
            split: train_test,
            preprocessor,
            summary,
        })
    }
}

/// Builder for creating a [`Pipeline`] with custom configuration.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// This is a convenience method for simple progress handling.
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, crate::config::ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let writer = OutputWriter::new(config.output_dir.clone(), config.feature_header);

        Ok(Pipeline {
            cleaner: DataCleaner::new(config.cleaning_policy),
            config,
            progress_reporter: self.progress_reporter,
            writer,
        })
    }
}
