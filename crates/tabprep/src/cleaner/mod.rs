//! Row-level dataset cleaning.
//!
//! Two independent policies exist: dropping rows with any missing value and
//! dropping exact duplicate rows. [`CleaningPolicy`] selects one, both, or
//! neither. Every policy keeps the column set and the relative order of the
//! rows it retains, and applying a policy twice gives the same result as
//! applying it once.

use crate::config::CleaningPolicy;
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// What a cleaning pass removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub rows_before: usize,
    pub rows_after: usize,
    /// Rows dropped because a column was null.
    pub missing_removed: usize,
    /// Rows dropped as exact repeats of an earlier row.
    pub duplicates_removed: usize,
}

impl CleaningReport {
    /// Total rows removed.
    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }
}

/// Applies a [`CleaningPolicy`] to a dataset.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataCleaner {
    policy: CleaningPolicy,
}

impl DataCleaner {
    pub fn new(policy: CleaningPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> CleaningPolicy {
        self.policy
    }

    /// Clean a dataset according to the configured policy.
    pub fn clean(&self, df: DataFrame) -> Result<(DataFrame, CleaningReport)> {
        let mut report = CleaningReport {
            rows_before: df.height(),
            ..Default::default()
        };

        info!("Cleaning dataset ({:?})...", self.policy);

        let df = match self.policy {
            CleaningPolicy::DropMissing => {
                let cleaned = Self::drop_missing(&df)?;
                report.missing_removed = df.height() - cleaned.height();
                cleaned
            }
            CleaningPolicy::DropDuplicates => {
                let cleaned = Self::drop_duplicates(&df)?;
                report.duplicates_removed = df.height() - cleaned.height();
                cleaned
            }
            CleaningPolicy::DropMissingAndDuplicates => {
                let without_missing = Self::drop_missing(&df)?;
                report.missing_removed = df.height() - without_missing.height();
                let cleaned = Self::drop_duplicates(&without_missing)?;
                report.duplicates_removed = without_missing.height() - cleaned.height();
                cleaned
            }
            CleaningPolicy::None => df,
        };

        report.rows_after = df.height();

        if report.missing_removed > 0 {
            debug!("Removed {} rows with missing values", report.missing_removed);
        }
        if report.duplicates_removed > 0 {
            debug!("Removed {} duplicate rows", report.duplicates_removed);
        }
        info!(
            "Cleaning kept {} of {} rows",
            report.rows_after, report.rows_before
        );

        Ok((df, report))
    }

    /// Drop every row that has a null in any column.
    pub fn drop_missing(df: &DataFrame) -> Result<DataFrame> {
        if df.height() == 0 || df.width() == 0 {
            return Ok(df.clone());
        }

        let mut keep = BooleanChunked::full("keep".into(), true, df.height());
        for col in df.get_columns() {
            if col.null_count() > 0 {
                keep = &keep & &col.is_not_null();
            }
        }

        Ok(df.filter(&keep)?)
    }

    /// Drop rows that repeat an earlier row across all columns.
    ///
    /// The first occurrence is kept and the original row order is preserved.
    pub fn drop_duplicates(df: &DataFrame) -> Result<DataFrame> {
        if df.height() < 2 || df.width() == 0 {
            return Ok(df.clone());
        }

        let deduped = df
            .clone()
            .lazy()
            .unique_stable(None, UniqueKeepStrategy::First)
            .collect()?;

        Ok(deduped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(df: &DataFrame) -> Vec<String> {
        (0..df.height())
            .map(|i| {
                df.get_row(i)
                    .unwrap()
                    .0
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join("|")
            })
            .collect()
    }

    fn sample_with_duplicates() -> DataFrame {
        df![
            "customer" => ["a", "b", "a", "c", "b", "a"],
            "tenure" => [Some(1), Some(2), Some(1), None, Some(2), Some(3)],
            "churn" => ["yes", "no", "yes", "no", "no", "yes"],
        ]
        .unwrap()
    }

    #[test]
    fn test_drop_duplicates_keeps_first_in_order() {
        let df = sample_with_duplicates();
        let cleaned = DataCleaner::drop_duplicates(&df).unwrap();

        assert_eq!(cleaned.height(), 4);
        let customers: Vec<Option<&str>> = cleaned
            .column("customer")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(customers, vec![Some("a"), Some("b"), Some("c"), Some("a")]);
        assert_eq!(cleaned.get_column_names(), df.get_column_names());
    }

    #[test]
    fn test_drop_duplicates_leaves_no_identical_rows() {
        let cleaned = DataCleaner::drop_duplicates(&sample_with_duplicates()).unwrap();
        let mut seen = rows(&cleaned);
        let total = seen.len();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), total);
    }

    #[test]
    fn test_drop_duplicates_is_idempotent() {
        let once = DataCleaner::drop_duplicates(&sample_with_duplicates()).unwrap();
        let twice = DataCleaner::drop_duplicates(&once).unwrap();
        assert!(once.equals_missing(&twice));
    }

    #[test]
    fn test_drop_duplicates_treats_nulls_as_equal() {
        let df = df![
            "x" => [None, None, Some(1)],
            "y" => ["a", "a", "a"],
        ]
        .unwrap();
        let cleaned = DataCleaner::drop_duplicates(&df).unwrap();
        assert_eq!(cleaned.height(), 2);
    }

    #[test]
    fn test_drop_missing() {
        let df = df![
            "Name" => [Some("Alice"), Some("Bob"), Some("Charlie"), None, Some("Eve")],
            "Age" => [Some(25), Some(30), None, Some(22), Some(29)],
            "City" => [Some("Delhi"), Some("Mumbai"), Some("Delhi"), Some("Kolkata"), None],
        ]
        .unwrap();

        let cleaned = DataCleaner::drop_missing(&df).unwrap();

        assert_eq!(rows(&cleaned).len(), 2);
        assert_eq!(
            cleaned.column("Name").unwrap().str().unwrap().get(0),
            Some("Alice")
        );
        assert_eq!(
            cleaned.column("Name").unwrap().str().unwrap().get(1),
            Some("Bob")
        );
        assert_eq!(cleaned.width(), 3);
    }

    #[test]
    fn test_clean_report_counts() {
        let cleaner = DataCleaner::new(CleaningPolicy::DropMissingAndDuplicates);
        let (cleaned, report) = cleaner.clean(sample_with_duplicates()).unwrap();

        // One row has a null tenure, then two repeats remain
        assert_eq!(report.rows_before, 6);
        assert_eq!(report.missing_removed, 1);
        assert_eq!(report.duplicates_removed, 2);
        assert_eq!(report.rows_after, 3);
        assert_eq!(report.rows_removed(), 3);
        assert_eq!(cleaned.height(), 3);
    }

    #[test]
    fn test_clean_none_policy_is_passthrough() {
        let df = sample_with_duplicates();
        let (cleaned, report) = DataCleaner::new(CleaningPolicy::None)
            .clean(df.clone())
            .unwrap();
        assert!(cleaned.equals_missing(&df));
        assert_eq!(report.rows_removed(), 0);
    }

    #[test]
    fn test_empty_frame() {
        let df = DataFrame::empty();
        assert_eq!(DataCleaner::drop_duplicates(&df).unwrap().height(), 0);
        assert_eq!(DataCleaner::drop_missing(&df).unwrap().height(), 0);
    }
}
