//! The composite feature transform.
//!
//! A [`Preprocessor`] runs two chains side by side over a feature table:
//!
//! - numeric columns: impute, then standardize
//! - categorical columns: impute, then one-hot encode
//!
//! The output is a dense Float64 frame with the numeric block first and the
//! categorical block second, each in classification order. Output names are
//! made unique at fit, so a numeric `plan_a` next to a categorical `plan`
//! holding `a` yields `plan_a` and `plan_a_1`.
//!
//! Columns with no observed values at fit time are dropped from the output
//! and reported as skipped. Under [`CategoricalImputation::Constant`] an
//! empty categorical column is kept and encodes as `<col>_missing`.

use crate::config::{CategoricalImputation, NumericImputation, PipelineConfig};
use crate::error::{PrepError, Result, ResultExt};
use crate::schema::{ColumnPartition, classify_columns};
use crate::transformers::{
    CategoricalImputer, NumericImputer, OneHotEncoder, StandardScaler, input_series,
};
use crate::utils::{column_names, to_f64, to_str, unique_names};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

/// Fitted (or fittable) numeric and categorical transform chains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preprocessor {
    /// Roles from classification, before any fit
    classified: ColumnPartition,
    /// Roles in effect after fit
    partition: ColumnPartition,
    feature_names: Vec<String>,
    numeric_imputer: NumericImputer,
    scaler: StandardScaler,
    categorical_imputer: CategoricalImputer,
    encoder: OneHotEncoder,
    is_fitted: bool,
}

static_assertions::assert_impl_all!(Preprocessor: Send, Sync);

impl Preprocessor {
    /// Classify the feature columns and build unfitted chains for them.
    pub fn build(features: &DataFrame, config: &PipelineConfig) -> Result<Self> {
        let partition = classify_columns(features, &config.column_roles)?;

        if partition.is_empty() {
            return Err(PrepError::EmptyDataset(
                "no numeric or categorical feature columns to transform".to_string(),
            ));
        }

        info!(
            "Preprocessor: {} numeric, {} categorical, {} skipped columns",
            partition.numeric.len(),
            partition.categorical.len(),
            partition.skipped.len()
        );

        Ok(Self::from_partition(
            partition,
            config.numeric_imputation,
            config.categorical_imputation,
        ))
    }

    /// Build unfitted chains for an already classified table.
    pub fn from_partition(
        partition: ColumnPartition,
        numeric_imputation: NumericImputation,
        categorical_imputation: CategoricalImputation,
    ) -> Self {
        Self {
            classified: partition.clone(),
            partition,
            feature_names: Vec::new(),
            numeric_imputer: NumericImputer::new(numeric_imputation),
            scaler: StandardScaler::new(),
            categorical_imputer: CategoricalImputer::new(categorical_imputation),
            encoder: OneHotEncoder::new(),
            is_fitted: false,
        }
    }

    /// Learn imputation values, scaling parameters and vocabularies.
    pub fn fit(&mut self, features: &DataFrame) -> Result<&mut Self> {
        if features.height() == 0 {
            return Err(PrepError::EmptyDataset(
                "cannot fit the preprocessor on zero rows".to_string(),
            ));
        }

        debug!("Fitting preprocessor on {} rows", features.height());

        self.partition = self.fit_partition(features)?;
        if self.partition.is_empty() {
            return Err(PrepError::EmptyDataset(
                "every feature column is empty or skipped".to_string(),
            ));
        }

        let imputed = self
            .numeric_imputer
            .fit_transform(features, &self.partition.numeric)
            .context("Fitting numeric imputer")?;
        self.scaler
            .fit(&imputed, &self.partition.numeric)
            .context("Fitting scaler")?;

        let imputed = self
            .categorical_imputer
            .fit_transform(features, &self.partition.categorical)
            .context("Fitting categorical imputer")?;
        self.encoder
            .fit(&imputed, &self.partition.categorical)
            .context("Fitting one-hot encoder")?;

        let mut names = self.partition.numeric.clone();
        names.extend(self.encoder.feature_names().iter().cloned());
        self.feature_names = unique_names(names);

        self.is_fitted = true;
        Ok(self)
    }

    /// Drop columns that have nothing to learn from out of the classified roles.
    fn fit_partition(&self, features: &DataFrame) -> Result<ColumnPartition> {
        let mut empty = Vec::new();

        for col_name in &self.classified.numeric {
            let values = to_f64(input_series(features, col_name)?)?;
            if values.null_count() == values.len() {
                empty.push(col_name.clone());
            }
        }
        if self.categorical_imputer.strategy() == CategoricalImputation::MostFrequent {
            for col_name in &self.classified.categorical {
                let values = to_str(input_series(features, col_name)?)?;
                if values.null_count() == values.len() {
                    empty.push(col_name.clone());
                }
            }
        }

        if empty.is_empty() {
            return Ok(self.classified.clone());
        }
        for col_name in &empty {
            warn!("Column '{}' has no observed values, leaving it out", col_name);
        }

        let is_empty = |c: &String| empty.contains(c);
        let skipped = column_names(features)
            .into_iter()
            .filter(|c| self.classified.skipped.contains(c) || is_empty(c))
            .collect();

        Ok(ColumnPartition {
            numeric: self
                .classified
                .numeric
                .iter()
                .filter(|c| !is_empty(*c))
                .cloned()
                .collect(),
            categorical: self
                .classified
                .categorical
                .iter()
                .filter(|c| !is_empty(*c))
                .cloned()
                .collect(),
            skipped,
        })
    }

    /// Apply the fitted chains to a feature table.
    pub fn transform(&self, features: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PrepError::NotFitted("Preprocessor"));
        }

        let numeric = self
            .scaler
            .transform(&self.numeric_imputer.transform(features)?)?;
        let categorical = self
            .encoder
            .transform(&self.categorical_imputer.transform(features)?)?;

        let mut columns = numeric.take_columns();
        columns.extend(categorical.take_columns());
        for (col, name) in columns.iter_mut().zip(&self.feature_names) {
            col.rename(name.as_str().into());
        }

        let out = DataFrame::new(columns)?;
        debug!("Transformed {} rows into {} features", out.height(), out.width());
        Ok(out)
    }

    pub fn fit_transform(&mut self, features: &DataFrame) -> Result<DataFrame> {
        self.fit(features)?;
        self.transform(features)
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    pub fn partition(&self) -> &ColumnPartition {
        &self.partition
    }

    /// Output column names, numeric block then indicator block.
    pub fn feature_names(&self) -> Result<Vec<String>> {
        if !self.is_fitted {
            return Err(PrepError::NotFitted("Preprocessor"));
        }
        Ok(self.feature_names.clone())
    }

    pub fn numeric_imputer(&self) -> &NumericImputer {
        &self.numeric_imputer
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn categorical_imputer(&self) -> &CategoricalImputer {
        &self.categorical_imputer
    }

    pub fn encoder(&self) -> &OneHotEncoder {
        &self.encoder
    }

    /// Write the preprocessor state as pretty-printed JSON.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).context(format!("Writing {}", path.display()))?;
        Ok(())
    }

    /// Restore a preprocessor written by [`Preprocessor::save_json`].
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(PrepError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
