//! Standard scaling: `(x - mean) / std`.

use super::{frame_from_series, input_series};
use crate::error::{PrepError, Result};
use crate::utils::to_f64;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Mean and scale learned for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleParams {
    pub column: String,
    pub mean: f64,
    pub scale: f64,
}

/// Standardizes numeric columns with the population standard deviation.
///
/// Columns with zero variance get a scale of 1.0, so they transform to all
/// zeros instead of NaN.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    params: Vec<ScaleParams>,
    is_fitted: bool,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<&mut Self> {
        let mut params = Vec::with_capacity(columns.len());

        for col_name in columns {
            let values = to_f64(input_series(df, col_name)?)?;
            let mean = values
                .mean()
                .ok_or_else(|| PrepError::NoValidValues(col_name.clone()))?;
            let std = values.std(0).unwrap_or(0.0);
            let scale = if std == 0.0 || !std.is_finite() { 1.0 } else { std };

            debug!("Scaling '{}': mean={:.4}, scale={:.4}", col_name, mean, scale);
            params.push(ScaleParams {
                column: col_name.clone(),
                mean,
                scale,
            });
        }

        self.params = params;
        self.is_fitted = true;
        Ok(self)
    }

    /// Return the fitted columns standardized, in fit order.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PrepError::NotFitted("StandardScaler"));
        }

        let columns = self
            .params
            .iter()
            .map(|p| {
                let values = to_f64(input_series(df, &p.column)?)?;
                let scaled: Vec<Option<f64>> = values
                    .into_iter()
                    .map(|v| v.map(|x| (x - p.mean) / p.scale))
                    .collect();
                Ok(Series::new(p.column.as_str().into(), scaled))
            })
            .collect::<Result<Vec<_>>>()?;

        frame_from_series(columns)
    }

    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    pub fn params(&self) -> &[ScaleParams] {
        &self.params
    }
}
