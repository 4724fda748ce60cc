//! Missing value imputation.
//!
//! [`NumericImputer`] fills nulls with the mean or median learned at fit and
//! outputs Float64 columns. [`CategoricalImputer`] fills nulls with the most
//! frequent value (or the constant `"missing"`) and outputs String columns.

use super::{frame_from_series, input_series};
use crate::config::{CategoricalImputation, NumericImputation};
use crate::error::{PrepError, Result};
use crate::utils::{string_mode, to_f64, to_str};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fill value used by [`CategoricalImputation::Constant`].
pub const MISSING_CATEGORY: &str = "missing";

/// A learned fill value for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillValue<T> {
    pub column: String,
    pub value: T,
}

/// Imputes numeric columns, casting them to Float64.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericImputer {
    strategy: NumericImputation,
    fill_values: Vec<FillValue<f64>>,
    is_fitted: bool,
}

impl NumericImputer {
    pub fn new(strategy: NumericImputation) -> Self {
        Self {
            strategy,
            fill_values: Vec::new(),
            is_fitted: false,
        }
    }

    /// Learn the fill value for each column.
    ///
    /// A column with no observed values fails with [`PrepError::NoValidValues`];
    /// the preprocessor leaves such columns out before fitting.
    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<&mut Self> {
        let mut fill_values = Vec::with_capacity(columns.len());

        for col_name in columns {
            let values = to_f64(input_series(df, col_name)?)?;
            let stat = match self.strategy {
                NumericImputation::Mean => values.mean(),
                NumericImputation::Median => values.median(),
            };
            let value = stat
                .filter(|v| v.is_finite())
                .ok_or_else(|| PrepError::NoValidValues(col_name.clone()))?;

            debug!("Numeric fill for '{}': {:?} = {}", col_name, self.strategy, value);
            fill_values.push(FillValue {
                column: col_name.clone(),
                value,
            });
        }

        self.fill_values = fill_values;
        self.is_fitted = true;
        Ok(self)
    }

    /// Return the fitted columns as Float64 with nulls filled.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PrepError::NotFitted("NumericImputer"));
        }

        let columns = self
            .fill_values
            .iter()
            .map(|fill| {
                let values = to_f64(input_series(df, &fill.column)?)?;
                let filled: Vec<f64> = values
                    .into_iter()
                    .map(|v| v.unwrap_or(fill.value))
                    .collect();
                Ok(Series::new(fill.column.as_str().into(), filled))
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

    pub fn strategy(&self) -> NumericImputation {
        self.strategy
    }

    pub fn fill_values(&self) -> &[FillValue<f64>] {
        &self.fill_values
    }
}

/// Imputes categorical columns, casting them to String.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalImputer {
    strategy: CategoricalImputation,
    fill_values: Vec<FillValue<String>>,
    is_fitted: bool,
}

impl CategoricalImputer {
    pub fn new(strategy: CategoricalImputation) -> Self {
        Self {
            strategy,
            fill_values: Vec::new(),
            is_fitted: false,
        }
    }

    /// Learn the fill value for each column.
    ///
    /// With `MostFrequent`, ties go to the lexicographically smallest value and
    /// a column with no observed values fails with [`PrepError::NoValidValues`].
    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<&mut Self> {
        let mut fill_values = Vec::with_capacity(columns.len());

        for col_name in columns {
            let value = match self.strategy {
                CategoricalImputation::MostFrequent => {
                    let values = to_str(input_series(df, col_name)?)?;
                    string_mode(&values)
                        .ok_or_else(|| PrepError::NoValidValues(col_name.clone()))?
                }
                CategoricalImputation::Constant => {
                    // Still check presence so a bad column name fails at fit
                    input_series(df, col_name)?;
                    MISSING_CATEGORY.to_string()
                }
            };

            debug!("Categorical fill for '{}': '{}'", col_name, value);
            fill_values.push(FillValue {
                column: col_name.clone(),
                value,
            });
        }

        self.fill_values = fill_values;
        self.is_fitted = true;
        Ok(self)
    }

    /// Return the fitted columns as String with nulls filled.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PrepError::NotFitted("CategoricalImputer"));
        }

        let columns = self
            .fill_values
            .iter()
            .map(|fill| {
                let values = to_str(input_series(df, &fill.column)?)?;
                let filled: Vec<String> = values
                    .into_iter()
                    .map(|v| v.unwrap_or(fill.value.as_str()).to_string())
                    .collect();
                Ok(Series::new(fill.column.as_str().into(), filled))
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

    pub fn strategy(&self) -> CategoricalImputation {
        self.strategy
    }

    pub fn fill_values(&self) -> &[FillValue<String>] {
        &self.fill_values
    }
}
