//! Seeded train/test row partitioning.

use crate::error::{PrepError, Result};
use polars::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::debug;

/// Row positions assigned to each partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<IdxSize>,
    pub test: Vec<IdxSize>,
}

impl SplitIndices {
    /// Shuffle `0..n_rows` with a seeded RNG and cut it in two.
    ///
    /// The first `ceil(n_rows * test_size)` shuffled positions form the test
    /// set and the remainder the training set. The same inputs always give
    /// the same partitions.
    pub fn shuffled(n_rows: usize, test_size: f64, seed: u64) -> Result<Self> {
        let invalid = |reason: &str| PrepError::InvalidSplit {
            rows: n_rows,
            test_size,
            reason: reason.to_string(),
        };

        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(invalid("test size must be strictly between 0 and 1"));
        }
        if n_rows == 0 {
            return Err(invalid("no rows to split"));
        }

        let n_test = (n_rows as f64 * test_size).ceil() as usize;
        if n_test >= n_rows {
            return Err(invalid("the training partition would be empty"));
        }

        let mut indices: Vec<IdxSize> = (0..n_rows as IdxSize).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let train = indices.split_off(n_test);
        debug!(
            "Split {} rows into {} train / {} test (seed {})",
            n_rows,
            train.len(),
            indices.len(),
            seed
        );

        Ok(Self {
            train,
            test: indices,
        })
    }
}

/// Select rows of a frame by position.
pub fn take_rows(df: &DataFrame, indices: &[IdxSize]) -> Result<DataFrame> {
    let idx = IdxCa::from_vec("idx".into(), indices.to_vec());
    Ok(df.take(&idx)?)
}

/// Select values of a series by position.
pub fn take_values(series: &Series, indices: &[IdxSize]) -> Result<Series> {
    let idx = IdxCa::from_vec("idx".into(), indices.to_vec());
    Ok(series.take(&idx)?)
}

/// Transformed features and targets divided into train and test partitions.
///
/// `train_indices` and `test_indices` are positions in the cleaned dataset,
/// so row `i` of `x_test` and row `i` of `y_test` both come from
/// `test_indices[i]`.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: DataFrame,
    pub x_test: DataFrame,
    pub y_train: Series,
    pub y_test: Series,
    pub train_indices: Vec<IdxSize>,
    pub test_indices: Vec<IdxSize>,
}

impl TrainTestSplit {
    /// Partition an already transformed matrix and its target.
    pub fn from_indices(x: &DataFrame, y: &Series, indices: SplitIndices) -> Result<Self> {
        Ok(Self {
            x_train: take_rows(x, &indices.train)?,
            x_test: take_rows(x, &indices.test)?,
            y_train: take_values(y, &indices.train)?,
            y_test: take_values(y, &indices.test)?,
            train_indices: indices.train,
            test_indices: indices.test,
        })
    }

    pub fn train_len(&self) -> usize {
        self.train_indices.len()
    }

    pub fn test_len(&self) -> usize {
        self.test_indices.len()
    }
}
