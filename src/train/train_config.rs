use std::sync::mpsc;
use std::sync::{Arc, atomic::AtomicBool};

use crate::optim::{IterationStats, RunControl};
use crate::train::hyperparameters::Hyperparameters;

/// Configuration for a `train_network` run.
///
/// # Fields
/// - `hyperparameters` — model size, regularization, budget and optimizer
/// - `progress_tx`     — optional channel sender; one `IterationStats` is sent
///                       per optimizer iteration. If the receiver is dropped
///                       training stops early (clean shutdown).
/// - `stop_flag`       — optional atomic flag; when set to `true` from another
///                       thread training stops after the current iteration.
#[derive(Debug, Clone, Default)]
pub struct TrainConfig {
    pub hyperparameters: Hyperparameters,
    pub progress_tx: Option<mpsc::Sender<IterationStats>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl TrainConfig {
    /// Creates a minimal `TrainConfig` with no progress channel and no stop flag.
    pub fn new(hyperparameters: Hyperparameters) -> Self {
        TrainConfig {
            hyperparameters,
            progress_tx: None,
            stop_flag: None,
        }
    }

    pub(crate) fn run_control(&self) -> RunControl {
        RunControl {
            max_iterations: self.hyperparameters.max_iterations,
            gradient_tolerance: self.hyperparameters.gradient_tolerance,
            progress_tx: self.progress_tx.clone(),
            stop_flag: self.stop_flag.clone(),
        }
    }
}
