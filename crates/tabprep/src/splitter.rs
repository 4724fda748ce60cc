//! Feature/target separation.

use crate::error::{PrepError, Result};
use polars::prelude::*;
use tracing::debug;

/// A dataset separated into its feature table and target column.
///
/// `features` holds every source column except the target, in source order.
/// Both halves always have the same number of rows.
#[derive(Debug, Clone)]
pub struct FeatureTargetSplit {
    pub features: DataFrame,
    pub target: Series,
}

impl FeatureTargetSplit {
    pub fn height(&self) -> usize {
        self.target.len()
    }

    pub fn target_name(&self) -> &str {
        self.target.name().as_str()
    }
}

/// Separate the target column from the rest of the dataset.
pub fn split_features_target(df: &DataFrame, target: &str) -> Result<FeatureTargetSplit> {
    let target_series = df
        .column(target)
        .map_err(|_| PrepError::ColumnNotFound(target.to_string()))?
        .as_materialized_series()
        .clone();

    let features = df.drop(target)?;

    debug!(
        "Split '{}' from {} feature columns",
        target,
        features.width()
    );

    Ok(FeatureTargetSplit {
        features,
        target: target_series,
    })
}
