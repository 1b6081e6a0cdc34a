use ndarray::{s, Array1, Array2, ArrayView1};

use crate::activation::sigmoid::{sigmoid_array, sigmoid_derivative_from_output};
use crate::data::dataset::Dataset;
use crate::error::{NetError, Result};
use crate::math::matrix::{one_hot, squared_norm, with_bias_column};
use crate::network::topology::Topology;
use crate::optim::Objective;

/// Regularized sum-of-squared-errors objective for the one-hidden-layer
/// sigmoid network, with its backpropagated gradient.
///
/// For N training rows, outputs `Z2` and one-hot targets `Y`:
///
/// ```text
/// J(W1, W2) = sum((Y - Z2)^2) / (2N) + lambda * (|W1|^2 + |W2|^2) / N
/// ```
///
/// The gradient adds `lambda * W / N` for the penalty (bias columns
/// included), which is half the derivative of the penalty term in `J`.
///
/// The biased input matrix and the one-hot targets are built once at
/// construction, so `evaluate` only borrows `self` and can be called from
/// several threads at once.
#[derive(Debug, Clone)]
pub struct SquaredErrorObjective {
    topology: Topology,
    inputs: Array2<f64>,
    targets: Array2<f64>,
    lambda: f64,
}

impl SquaredErrorObjective {
    /// # Errors
    /// - `EmptyDataset` if `data` has no rows
    /// - `DimensionMismatch` if the feature count differs from `topology.n_input`
    /// - `LabelOutOfRange` if any label is not below `topology.n_class`
    /// - `InvalidConfig` if `lambda` is negative or not finite
    pub fn new(topology: Topology, data: &Dataset, lambda: f64) -> Result<SquaredErrorObjective> {
        if data.is_empty() {
            return Err(NetError::EmptyDataset);
        }
        if data.n_features() != topology.n_input {
            return Err(NetError::DimensionMismatch {
                what: "feature columns",
                expected: topology.n_input,
                actual: data.n_features(),
            });
        }
        if let Some((row, &label)) = data
            .labels()
            .iter()
            .enumerate()
            .find(|(_, label)| **label >= topology.n_class)
        {
            return Err(NetError::LabelOutOfRange { row, label, n_class: topology.n_class });
        }
        if !lambda.is_finite() || lambda < 0.0 {
            return Err(NetError::InvalidConfig(format!(
                "lambda must be finite and non-negative, got {lambda}"
            )));
        }

        Ok(SquaredErrorObjective {
            topology,
            inputs: with_bias_column(data.features()),
            targets: one_hot(data.labels(), topology.n_class),
            lambda,
        })
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Number of training rows.
    pub fn n_samples(&self) -> usize {
        self.inputs.nrows()
    }
}

impl Objective for SquaredErrorObjective {
    fn dim(&self) -> usize {
        self.topology.param_len()
    }

    fn evaluate(&self, params: ArrayView1<f64>) -> Result<(f64, Array1<f64>)> {
        let params = params.as_standard_layout();
        let (w1, w2) = self.topology.roll(params.view())?;
        let n = self.n_samples() as f64;
        let x = &self.inputs;
        let y = &self.targets;

        // ── Forward pass over the whole batch ──────────────────────────────
        let z1 = sigmoid_array(&x.dot(&w1.t()));
        let z1_bias = with_bias_column(&z1);
        let z2 = sigmoid_array(&z1_bias.dot(&w2.t()));

        let residual = y - &z2;
        let error_sum: f64 = residual.iter().map(|r| r * r).sum();

        // ── Backward pass ──────────────────────────────────────────────────
        // delta = (y - z2)(1 - z2)z2; the error term is carried with the
        // sign flipped, hence the negations below.
        let delta = &residual * &sigmoid_derivative_from_output(&z2);
        let mut grad_w2 = -delta.t().dot(&z1_bias);

        let w2_no_bias = w2.slice(s![.., ..self.topology.n_hidden]);
        let hidden = sigmoid_derivative_from_output(&z1) * &(-delta.dot(&w2_no_bias));
        let mut grad_w1 = hidden.t().dot(x);

        // ── Averaging and L2 penalty ───────────────────────────────────────
        grad_w1.scaled_add(self.lambda, &w1);
        grad_w2.scaled_add(self.lambda, &w2);
        grad_w1 /= n;
        grad_w2 /= n;

        let penalty = self.lambda * (squared_norm(&w1) + squared_norm(&w2)) / n;
        let value = error_sum / (2.0 * n) + penalty;

        // Same W1-then-W2 row-major order as the parameter vector.
        let gradient: Array1<f64> = grad_w1.iter().chain(grad_w2.iter()).copied().collect();

        Ok((value, gradient))
    }
}
