pub mod experiment;
pub mod hyperparameters;
pub mod train_config;
pub mod trainer;

pub use experiment::{evaluate, run_experiment, ExperimentReport};
pub use hyperparameters::{Hyperparameters, OptimizerKind};
pub use train_config::TrainConfig;
pub use trainer::{train_network, TrainOutcome};
