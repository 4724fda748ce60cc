//! Fit/transform building blocks used by the preprocessor.
//!
//! Each transformer learns per-column parameters in `fit` and applies them in
//! `transform`. Transforming before fitting fails with
//! [`PrepError::NotFitted`]. All of them serialize with serde so a fitted
//! preprocessor can be saved and restored.

pub mod encoder;
pub mod imputer;
pub mod scaler;

pub use encoder::OneHotEncoder;
pub use imputer::{CategoricalImputer, NumericImputer};
pub use scaler::StandardScaler;

use crate::error::{PrepError, Result};
use polars::prelude::*;

/// Look up an input column, mapping a miss to [`PrepError::ColumnNotFound`].
pub(crate) fn input_series<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|col| col.as_materialized_series())
        .map_err(|_| PrepError::ColumnNotFound(name.to_string()))
}

/// Assemble transformed columns into a frame.
pub(crate) fn frame_from_series(columns: Vec<Series>) -> Result<DataFrame> {
    let columns: Vec<Column> = columns.into_iter().map(|s| s.into_column()).collect();
    Ok(DataFrame::new(columns)?)
}
