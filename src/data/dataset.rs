use ndarray::{Array2, Axis};

use crate::error::{NetError, Result};

/// Feature rows paired with one integer class label per row.
///
/// Features are expected in `[0, 1]`; label range is checked by whoever
/// consumes the dataset against its own class count.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Array2<f64>,
    labels: Vec<usize>,
}

impl Dataset {
    pub fn new(features: Array2<f64>, labels: Vec<usize>) -> Result<Dataset> {
        if features.nrows() != labels.len() {
            return Err(NetError::DimensionMismatch {
                what: "label count (feature rows)",
                expected: features.nrows(),
                actual: labels.len(),
            });
        }
        Ok(Dataset { features, labels })
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// New dataset made of the given rows, in the given order.
    pub fn select(&self, indices: &[usize]) -> Result<Dataset> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.len()) {
            return Err(NetError::DimensionMismatch {
                what: "row index bound",
                expected: self.len(),
                actual: bad,
            });
        }
        let features = self.features.select(Axis(0), indices);
        let labels = indices.iter().map(|&i| self.labels[i]).collect();
        Ok(Dataset { features, labels })
    }
}

/// The three splits an experiment works with.
#[derive(Debug, Clone)]
pub struct DataSplits {
    pub train: Dataset,
    pub validation: Dataset,
    pub test: Dataset,
}

impl DataSplits {
    /// Groups three datasets, checking that they share one feature dimensionality.
    pub fn new(train: Dataset, validation: Dataset, test: Dataset) -> Result<DataSplits> {
        for (what, other) in [("validation feature columns", &validation), ("test feature columns", &test)] {
            if other.n_features() != train.n_features() {
                return Err(NetError::DimensionMismatch {
                    what,
                    expected: train.n_features(),
                    actual: other.n_features(),
                });
            }
        }
        Ok(DataSplits { train, validation, test })
    }
}
