//! Shared utilities for the preprocessing pipeline.
//!
//! Dtype inspection and small Series helpers used by the cleaner, the
//! column classifier and the transformers.

use polars::prelude::*;
use std::collections::{BTreeMap, HashSet};

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Storage category of a column's data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// String or categorical storage
    Text,
    /// Boolean type
    Boolean,
    /// Date, datetime, time or duration types
    Temporal,
    /// Anything else (lists, structs, nulls, ...)
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a temporal type.
#[inline]
pub fn is_temporal_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time | DataType::Duration(_)
    )
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if is_temporal_dtype(dtype) {
        DtypeCategory::Temporal
    } else if matches!(dtype, DataType::Boolean) {
        DtypeCategory::Boolean
    } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
        DtypeCategory::Text
    } else {
        DtypeCategory::Other
    }
}

// =============================================================================
// Series Helpers
// =============================================================================

/// Cast a Series to Float64. Values that cannot be represented become null.
pub fn to_f64(series: &Series) -> PolarsResult<Float64Chunked> {
    let cast = series.cast(&DataType::Float64)?;
    Ok(cast.f64()?.clone())
}

/// Cast a Series to String.
pub fn to_str(series: &Series) -> PolarsResult<StringChunked> {
    let cast = series.cast(&DataType::String)?;
    Ok(cast.str()?.clone())
}

/// Most frequent non-null value of a string column.
///
/// Ties resolve to the lexicographically smallest value so the result does
/// not depend on row order.
pub fn string_mode(values: &StringChunked) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for val in values.into_iter().flatten() {
        *counts.entry(val).or_insert(0) += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for (val, count) in counts {
        // BTreeMap iterates in ascending order, so strict > keeps the smallest on ties
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((val, count));
        }
    }
    best.map(|(val, _)| val.to_string())
}

/// Sorted distinct non-null values of a string column.
pub fn sorted_categories(values: &StringChunked) -> Vec<String> {
    let mut categories: Vec<String> = values
        .into_iter()
        .flatten()
        .map(|s| s.to_string())
        .collect();
    categories.sort();
    categories.dedup();
    categories
}

/// Column names of a DataFrame as owned strings.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Make output column names unique, keeping their order.
///
/// The first occurrence keeps its name. Later repeats get `_1`, `_2`, ...
/// choosing the smallest suffix that clashes with no name in the input and
/// no name already handed out.
pub fn unique_names(names: Vec<String>) -> Vec<String> {
    let requested: HashSet<String> = names.iter().cloned().collect();
    let mut taken: HashSet<String> = HashSet::with_capacity(names.len());

    names
        .into_iter()
        .map(|name| {
            if taken.insert(name.clone()) {
                return name;
            }
            let mut k = 1usize;
            loop {
                let candidate = format!("{}_{}", name, k);
                if !requested.contains(&candidate) && taken.insert(candidate.clone()) {
                    return candidate;
                }
                k += 1;
            }
        })
        .collect()
}

/// Number of null cells across the whole DataFrame.
pub fn total_null_count(df: &DataFrame) -> usize {
    df.get_columns().iter().map(|col| col.null_count()).sum()
}

// =============================================================================
// Tests
// =============================================================================
