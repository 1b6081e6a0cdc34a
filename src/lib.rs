pub mod activation;
pub mod data;
pub mod error;
pub mod eval;
pub mod logging;
pub mod loss;
pub mod math;
pub mod network;
pub mod optim;
pub mod train;

// Convenience re-exports
pub use activation::sigmoid::sigmoid;
pub use data::dataset::{DataSplits, Dataset};
pub use error::{NetError, Result};
pub use eval::accuracy::accuracy;
pub use loss::squared_error::SquaredErrorObjective;
pub use math::init::initialize_weights;
pub use network::{Network, Topology, TrainedModel};
pub use optim::{ConjugateGradient, GradientDescent, Minimizer, Minimum, Objective, RunControl, Termination};
pub use train::{run_experiment, train_network, Hyperparameters, TrainConfig};
