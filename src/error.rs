use thiserror::Error;

/// Everything that can go wrong while building, training or evaluating a network.
#[derive(Debug, Error)]
pub enum NetError {
    /// A training or evaluation set with no rows.
    #[error("dataset is empty")]
    EmptyDataset,

    #[error("{what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("label {label} at row {row} is outside the class range [0, {n_class})")]
    LabelOutOfRange {
        row: usize,
        label: usize,
        n_class: usize,
    },

    #[error("predicted and true label sequences differ in length ({predicted} vs {truth})")]
    LengthMismatch { predicted: usize, truth: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("malformed data: {0}")]
    DataFormat(String),

    /// The objective produced a NaN or infinite loss or gradient entry.
    #[error("non-finite {what} at iteration {iteration}")]
    NumericInstability { what: &'static str, iteration: usize },

    #[error("optimization failed at iteration {iteration}: {reason}")]
    OptimizationFailure { iteration: usize, reason: String },

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NetError>;
