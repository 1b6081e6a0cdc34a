use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::data::dataset::Dataset;
use crate::error::{NetError, Result};
use crate::loss::squared_error::SquaredErrorObjective;
use crate::math::init::initialize_weights;
use crate::network::network::Network;
use crate::network::topology::Topology;
use crate::optim::Minimum;
use crate::train::train_config::TrainConfig;

/// A trained network together with how the optimizer got there.
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub network: Network,
    pub minimum: Minimum,
}

/// Random generator for a run: seeded when `seed` is set, OS entropy otherwise.
pub fn run_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Fits a fresh network to `train`.
///
/// The input width comes from the data; hidden width, class count,
/// regularization, budget and optimizer come from `config.hyperparameters`.
/// W1 is initialized before W2 from the same generator, so a fixed seed
/// reproduces the run exactly.
///
/// Non-convergence is not an error: the returned `minimum.termination` says
/// why the optimizer stopped.
pub fn train_network(train: &Dataset, config: &TrainConfig) -> Result<TrainOutcome> {
    let hp = &config.hyperparameters;
    hp.validate()?;
    if train.is_empty() {
        return Err(NetError::EmptyDataset);
    }

    let topology = Topology::new(train.n_features(), hp.n_hidden, hp.n_class)?;
    let mut rng = run_rng(hp.seed);
    let w1 = initialize_weights(topology.n_input, topology.n_hidden, &mut rng);
    let w2 = initialize_weights(topology.n_hidden, topology.n_class, &mut rng);
    let initial = topology.unroll(&w1, &w2)?;

    let objective = SquaredErrorObjective::new(topology, train, hp.lambda)?;
    let minimizer = hp.optimizer.build();

    info!(
        samples = train.len(),
        n_input = topology.n_input,
        n_hidden = topology.n_hidden,
        n_class = topology.n_class,
        parameters = topology.param_len(),
        lambda = hp.lambda,
        optimizer = minimizer.name(),
        "training started"
    );

    let minimum = minimizer.minimize(&objective, initial, &config.run_control())?;

    info!(
        iterations = minimum.iterations,
        evaluations = minimum.evaluations,
        initial_loss = minimum.initial_value,
        final_loss = minimum.value,
        termination = ?minimum.termination,
        "training finished"
    );

    let network = Network::from_parameters(&topology, minimum.params.view())?;
    Ok(TrainOutcome { network, minimum })
}
