//! Column classification.
//!
//! [`classify_columns`] decides, for every feature column, whether it goes
//! through the numeric chain, the categorical chain, or is left out of the
//! output. The decision depends only on the column's storage dtype and any
//! explicit role overrides, so it can be recomputed on every run.

use crate::error::{PrepError, Result};
use crate::utils::{DtypeCategory, get_dtype_category};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// How a feature column is treated by the preprocessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    /// Impute then standardize
    Numeric,
    /// Impute then one-hot encode
    Categorical,
    /// Excluded from the output matrix
    Skip,
}

impl ColumnRole {
    /// Role implied by a dtype category when no override is given.
    pub fn from_dtype_category(category: DtypeCategory) -> Self {
        match category {
            DtypeCategory::Numeric => ColumnRole::Numeric,
            DtypeCategory::Text => ColumnRole::Categorical,
            DtypeCategory::Boolean | DtypeCategory::Temporal | DtypeCategory::Other => {
                ColumnRole::Skip
            }
        }
    }
}

/// Result of classifying a feature table.
///
/// Each list keeps the column order of the source table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPartition {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
    pub skipped: Vec<String>,
}

impl ColumnPartition {
    /// Number of columns that reach the output matrix.
    pub fn used_len(&self) -> usize {
        self.numeric.len() + self.categorical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used_len() == 0
    }

    /// Resolved role of a column, if it was part of the classified table.
    pub fn role_of(&self, column: &str) -> Option<ColumnRole> {
        if self.numeric.iter().any(|c| c == column) {
            Some(ColumnRole::Numeric)
        } else if self.categorical.iter().any(|c| c == column) {
            Some(ColumnRole::Categorical)
        } else if self.skipped.iter().any(|c| c == column) {
            Some(ColumnRole::Skip)
        } else {
            None
        }
    }
}

/// Classify every column of a feature table.
///
/// Integer and float columns are numeric, string and categorical columns
/// are categorical, everything else is skipped. An entry in `overrides`
/// replaces the dtype-based role for that column. Overrides naming a column
/// that is not in `features` are rejected.
pub fn classify_columns(
    features: &DataFrame,
    overrides: &BTreeMap<String, ColumnRole>,
) -> Result<ColumnPartition> {
    let names = features.get_column_names();

    let unknown: Vec<&str> = overrides
        .keys()
        .map(|k| k.as_str())
        .filter(|k| !names.iter().any(|n| n.as_str() == *k))
        .collect();
    if !unknown.is_empty() {
        return Err(PrepError::InvalidConfig(format!(
            "column_roles names columns not present in the feature table: {}",
            unknown.join(", ")
        )));
    }

    let mut partition = ColumnPartition::default();

    for col in features.get_columns() {
        let name = col.name().to_string();
        let category = get_dtype_category(col.dtype());

        let role = match overrides.get(&name) {
            Some(role) => {
                debug!("Column '{}' ({:?}) forced to {:?}", name, category, role);
                *role
            }
            None => {
                let role = ColumnRole::from_dtype_category(category);
                if role == ColumnRole::Skip {
                    warn!(
                        "Skipping column '{}': {} columns are neither numeric nor categorical",
                        name,
                        col.dtype()
                    );
                }
                role
            }
        };

        match role {
            ColumnRole::Numeric => partition.numeric.push(name),
            ColumnRole::Categorical => partition.categorical.push(name),
            ColumnRole::Skip => partition.skipped.push(name),
        }
    }

    debug!(
        "Classified {} numeric, {} categorical, {} skipped columns",
        partition.numeric.len(),
        partition.categorical.len(),
        partition.skipped.len()
    );

    Ok(partition)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mixed_frame() -> DataFrame {
        df![
            "tenure" => [1i64, 24, 60],
            "monthly" => [29.5, 56.0, 99.9],
            "contract" => ["monthly", "yearly", "two_year"],
            "paperless" => [true, false, true],
            "zip" => [10001i64, 94105, 60601],
        ]
        .unwrap()
    }

    #[test]
    fn test_classify_by_dtype() {
        let partition = classify_columns(&mixed_frame(), &BTreeMap::new()).unwrap();

        assert_eq!(partition.numeric, vec!["tenure", "monthly", "zip"]);
        assert_eq!(partition.categorical, vec!["contract"]);
        assert_eq!(partition.skipped, vec!["paperless"]);
        assert_eq!(partition.used_len(), 4);
    }

    #[test]
    fn test_classify_with_overrides() {
        let mut overrides = BTreeMap::new();
        overrides.insert("zip".to_string(), ColumnRole::Categorical);
        overrides.insert("paperless".to_string(), ColumnRole::Categorical);
        overrides.insert("monthly".to_string(), ColumnRole::Skip);

        let partition = classify_columns(&mixed_frame(), &overrides).unwrap();

        assert_eq!(partition.numeric, vec!["tenure"]);
        assert_eq!(partition.categorical, vec!["contract", "paperless", "zip"]);
        assert_eq!(partition.skipped, vec!["monthly"]);
        assert_eq!(partition.role_of("zip"), Some(ColumnRole::Categorical));
        assert_eq!(partition.role_of("nope"), None);
    }

    #[test]
    fn test_unknown_override_is_rejected() {
        let mut overrides = BTreeMap::new();
        overrides.insert("Churn".to_string(), ColumnRole::Numeric);

        let result = classify_columns(&mixed_frame(), &overrides);
        assert!(matches!(result, Err(PrepError::InvalidConfig(msg)) if msg.contains("Churn")));
    }

    #[test]
    fn test_classification_is_repeatable() {
        let df = mixed_frame();
        let first = classify_columns(&df, &BTreeMap::new()).unwrap();
        let second = classify_columns(&df, &BTreeMap::new()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_role_serde_names() {
        let json = serde_json::to_string(&ColumnRole::Categorical).unwrap();
        assert_eq!(json, "\"categorical\"");
        let role: ColumnRole = serde_json::from_str("\"skip\"").unwrap();
        assert_eq!(role, ColumnRole::Skip);
    }
}
