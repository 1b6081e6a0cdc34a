use tracing::info;

use crate::data::dataset::{DataSplits, Dataset};
use crate::error::Result;
use crate::eval::accuracy::accuracy;
use crate::network::model::TrainedModel;
use crate::network::network::Network;
use crate::optim::Termination;
use crate::train::train_config::TrainConfig;
use crate::train::trainer::train_network;

/// Accuracies of one train-then-evaluate run, plus the model it produced.
#[derive(Debug, Clone)]
pub struct ExperimentReport {
    /// Percentage of correctly classified training rows.
    pub train_accuracy: f64,
    /// `None` when the validation split is empty.
    pub validation_accuracy: Option<f64>,
    pub test_accuracy: f64,
    pub model: TrainedModel,
    pub iterations: usize,
    pub initial_loss: f64,
    pub final_loss: f64,
    pub termination: Termination,
}

/// Percentage of rows of `data` that `network` classifies correctly.
pub fn evaluate(network: &Network, data: &Dataset) -> Result<f64> {
    let predicted = network.predict(data.features())?;
    accuracy(&predicted, data.labels())
}

/// Trains on `splits.train` and scores the result on all three splits.
pub fn run_experiment(splits: &DataSplits, config: &TrainConfig) -> Result<ExperimentReport> {
    let outcome = train_network(&splits.train, config)?;
    let network = &outcome.network;

    let train_accuracy = evaluate(network, &splits.train)?;
    let validation_accuracy = if splits.validation.is_empty() {
        None
    } else {
        Some(evaluate(network, &splits.validation)?)
    };
    let test_accuracy = evaluate(network, &splits.test)?;

    info!(train_accuracy, ?validation_accuracy, test_accuracy, "evaluation finished");

    Ok(ExperimentReport {
        train_accuracy,
        validation_accuracy,
        test_accuracy,
        model: TrainedModel::from_network(network, config.hyperparameters.lambda),
        iterations: outcome.minimum.iterations,
        initial_loss: outcome.minimum.initial_value,
        final_loss: outcome.minimum.value,
        termination: outcome.minimum.termination,
    })
}
