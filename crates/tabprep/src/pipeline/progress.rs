//! Stage notifications emitted while a [`Pipeline`](super::Pipeline) runs.
//!
//! Each stage owns a fixed slice of the 0..1 progress range, so a listener
//! can draw a bar without knowing the stage list.
//!
//! # Example
//!
//! ```rust,ignore
//! use tabprep::Pipeline;
//!
//! let result = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:>3.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run()?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the preprocessing pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Reading the input CSV
    Loading,
    /// Dropping missing and/or duplicate rows
    Cleaning,
    /// Separating features from the target
    Splitting,
    /// Classifying columns and building the transform chains
    Building,
    /// Fitting and applying the preprocessor
    Transforming,
    /// Dividing rows into train and test partitions
    Partitioning,
    /// Writing output files
    Persisting,
    /// Terminal: all outputs written
    Complete,
    /// Terminal: an error stopped the run
    Failed,
}

impl PipelineStage {
    /// Label for status lines.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Data",
            Self::Cleaning => "Removing Rows",
            Self::Splitting => "Separating Target",
            Self::Building => "Building Preprocessor",
            Self::Transforming => "Transforming Features",
            Self::Partitioning => "Splitting Train/Test",
            Self::Persisting => "Saving Outputs",
            Self::Complete => "Done",
            Self::Failed => "Aborted",
        }
    }

    /// Share of the overall run this stage accounts for (0.0 - 1.0).
    ///
    /// The non-terminal weights sum to 1.0.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Loading => 0.15,
            Self::Cleaning => 0.10,
            Self::Splitting => 0.05,
            Self::Building => 0.05,
            Self::Transforming => 0.35,
            Self::Partitioning => 0.10,
            Self::Persisting => 0.20,
            Self::Complete | Self::Failed => 0.0,
        }
    }

    /// Overall progress at which this stage begins.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Loading => 0.0,
            Self::Cleaning => 0.15,
            Self::Splitting => 0.25,
            Self::Building => 0.30,
            Self::Transforming => 0.35,
            Self::Partitioning => 0.70,
            Self::Persisting => 0.80,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// One notification: where the run is and what it is doing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: PipelineStage,
    /// Fraction of the whole run, clamped to 0..=1
    pub progress: f32,
    /// Fraction of `stage`, clamped to 0..=1
    pub stage_progress: f32,
    pub message: String,
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

impl ProgressUpdate {
    pub fn new(stage: PipelineStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let within = stage_progress.clamp(0.0, 1.0);
        let overall = (stage.base_progress() + stage.weight() * within).min(1.0);
        Self {
            stage,
            progress: overall,
            stage_progress: within,
            message: message.into(),
        }
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self::terminal(PipelineStage::Complete, 1.0, message)
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::terminal(PipelineStage::Failed, 0.0, message)
    }

    fn terminal(stage: PipelineStage, at: f32, message: impl Into<String>) -> Self {
        Self {
            stage,
            progress: at,
            stage_progress: at,
            message: message.into(),
        }
    }
}

/// Receives progress updates from the pipeline.
///
/// Implementations must be `Send + Sync` so a pipeline holding one can be
/// moved to a worker thread.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// Forwards every update to a closure. Built by `PipelineBuilder::on_progress`.
pub struct ClosureProgressReporter<F> {
    on_update: F,
}

impl<F: Fn(ProgressUpdate) + Send + Sync> ClosureProgressReporter<F> {
    pub fn new(on_update: F) -> Self {
        Self { on_update }
    }
}

impl<F: Fn(ProgressUpdate) + Send + Sync> ProgressReporter for ClosureProgressReporter<F> {
    fn report(&self, update: ProgressUpdate) {
        (self.on_update)(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const STAGES: [PipelineStage; 7] = [
        PipelineStage::Loading,
        PipelineStage::Cleaning,
        PipelineStage::Splitting,
        PipelineStage::Building,
        PipelineStage::Transforming,
        PipelineStage::Partitioning,
        PipelineStage::Persisting,
    ];

    #[test]
    fn test_weights_sum_to_one() {
        let total: f32 = STAGES.iter().map(|s| s.weight()).sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_base_progress_is_cumulative() {
        let mut expected = 0.0;
        for stage in STAGES {
            assert!(
                (stage.base_progress() - expected).abs() < 1e-6,
                "{:?}",
                stage
            );
            expected += stage.weight();
        }
    }

    #[test]
    fn test_update_inside_stage() {
        let update = ProgressUpdate::new(PipelineStage::Transforming, 0.5, "Fitting...");
        assert_eq!(update.stage, PipelineStage::Transforming);
        assert_eq!(update.stage_progress, 0.5);
        assert!((update.progress - 0.525).abs() < 1e-6);
        assert_eq!(update.message, "Fitting...");
    }

    #[test]
    fn test_progress_update_clamps() {
        let update = ProgressUpdate::new(PipelineStage::Persisting, 3.0, "over");
        assert_eq!(update.stage_progress, 1.0);
        assert!(update.progress <= 1.0);
    }

    #[test]
    fn test_progress_update_terminal() {
        assert_eq!(ProgressUpdate::complete("Done").progress, 1.0);
        assert_eq!(ProgressUpdate::failed("boom").stage, PipelineStage::Failed);
    }

    #[test]
    fn test_closure_reporter_forwards_updates() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let reporter = ClosureProgressReporter::new(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        reporter.report(ProgressUpdate::new(PipelineStage::Loading, 0.0, "a"));
        reporter.report(ProgressUpdate::new(PipelineStage::Cleaning, 0.0, "b"));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_stage_serialization() {
        let json = serde_json::to_string(&PipelineStage::Partitioning).unwrap();
        assert_eq!(json, "\"partitioning\"");
    }
}
