//! One-hot encoding against a vocabulary learned at fit.

use super::{frame_from_series, input_series};
use crate::error::{PrepError, Result};
use crate::utils::{sorted_categories, to_str, unique_names};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Sorted categories observed for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub column: String,
    pub categories: Vec<String>,
}

impl Vocabulary {
    /// Requested indicator names, `<column>_<category>`.
    ///
    /// These can repeat across columns (`a` + `b_c` vs `a_b` + `c`); the
    /// encoder's [`feature_names`](OneHotEncoder::feature_names) are the
    /// deduplicated form.
    pub fn indicator_names(&self) -> impl Iterator<Item = String> + '_ {
        self.categories
            .iter()
            .map(move |cat| format!("{}_{}", self.column, cat))
    }
}

/// Expands each categorical column into 0.0/1.0 indicator columns.
///
/// Values not seen at fit produce all zeros across that column's block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OneHotEncoder {
    vocabularies: Vec<Vocabulary>,
    /// One per indicator, in output order, unique
    feature_names: Vec<String>,
    is_fitted: bool,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<&mut Self> {
        let mut vocabularies = Vec::with_capacity(columns.len());

        for col_name in columns {
            let values = to_str(input_series(df, col_name)?)?;
            let categories = sorted_categories(&values);
            debug!("Encoding '{}' with {} categories", col_name, categories.len());
            vocabularies.push(Vocabulary {
                column: col_name.clone(),
                categories,
            });
        }

        self.feature_names = unique_names(
            vocabularies
                .iter()
                .flat_map(|v| v.indicator_names())
                .collect(),
        );
        self.vocabularies = vocabularies;
        self.is_fitted = true;
        Ok(self)
    }

    /// Return the indicator columns for every fitted column, in fit order.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PrepError::NotFitted("OneHotEncoder"));
        }

        let mut columns = Vec::with_capacity(self.feature_names.len());
        let mut names = self.feature_names.iter();

        for vocab in &self.vocabularies {
            let values = to_str(input_series(df, &vocab.column)?)?;

            let unseen = values
                .into_iter()
                .filter(|v| match *v {
                    Some(v) => vocab
                        .categories
                        .binary_search_by(|c| c.as_str().cmp(v))
                        .is_err(),
                    None => true,
                })
                .count();
            if unseen > 0 {
                warn!(
                    "Column '{}': {} values outside the fitted categories encode as all zeros",
                    vocab.column, unseen
                );
            }

            for (category, name) in vocab.categories.iter().zip(names.by_ref()) {
                let indicator: Vec<f64> = values
                    .into_iter()
                    .map(|v| if v == Some(category.as_str()) { 1.0 } else { 0.0 })
                    .collect();
                columns.push(Series::new(name.as_str().into(), indicator));
            }
        }

        frame_from_series(columns)
    }

    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    pub fn vocabularies(&self) -> &[Vocabulary] {
        &self.vocabularies
    }

    /// Names of all indicator columns, in output order.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }
}
