use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{NetError, Result};
use crate::network::network::Network;

/// Everything needed to reload a trained network later: the hidden-layer
/// width, both weight matrices and the regularization strength they were
/// fitted with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    pub n_hidden: usize,
    pub w1: Array2<f64>,
    pub w2: Array2<f64>,
    pub lambda: f64,
}

impl TrainedModel {
    pub fn from_network(network: &Network, lambda: f64) -> TrainedModel {
        TrainedModel {
            n_hidden: network.topology().n_hidden,
            w1: network.w1().clone(),
            w2: network.w2().clone(),
            lambda,
        }
    }

    /// Rebuilds the predictor, checking that `n_hidden` agrees with both matrices.
    pub fn network(&self) -> Result<Network> {
        if self.w1.nrows() != self.n_hidden {
            return Err(NetError::DimensionMismatch {
                what: "W1 rows (n_hidden)",
                expected: self.n_hidden,
                actual: self.w1.nrows(),
            });
        }
        Network::new(self.w1.clone(), self.w2.clone())
    }

    /// Serializes the model to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a model from a JSON file previously written by `save_json`.
    pub fn load_json(path: &str) -> Result<TrainedModel> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
