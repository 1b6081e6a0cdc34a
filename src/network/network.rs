use ndarray::{Array1, Array2, ArrayBase, ArrayView1, Data, Ix2};

use crate::activation::sigmoid::sigmoid_array;
use crate::error::{NetError, Result};
use crate::math::matrix::{argmax_rows, with_bias_column};
use crate::network::topology::Topology;

/// A fitted network: the two weight matrices, frozen after training.
///
/// `w1` is (n_hidden, n_input + 1) and `w2` is (n_class, n_hidden + 1); the
/// last column of each holds the bias weights.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    w1: Array2<f64>,
    w2: Array2<f64>,
}

impl Network {
    /// Builds a network from explicit weight matrices, checking that they chain.
    pub fn new(w1: Array2<f64>, w2: Array2<f64>) -> Result<Network> {
        if w1.nrows() == 0 || w1.ncols() < 2 {
            return Err(NetError::InvalidConfig(format!(
                "W1 must have at least one row and two columns, got {:?}",
                w1.dim()
            )));
        }
        if w2.ncols() != w1.nrows() + 1 {
            return Err(NetError::DimensionMismatch {
                what: "W2 columns (n_hidden + 1)",
                expected: w1.nrows() + 1,
                actual: w2.ncols(),
            });
        }
        if w2.nrows() == 0 {
            return Err(NetError::InvalidConfig("W2 must have at least one row".to_owned()));
        }
        Ok(Network { w1, w2 })
    }

    /// Copies the weights out of a flat parameter vector.
    pub fn from_parameters(topology: &Topology, params: ArrayView1<f64>) -> Result<Network> {
        let params = params.as_standard_layout();
        let (w1, w2) = topology.roll(params.view())?;
        Ok(Network { w1: w1.to_owned(), w2: w2.to_owned() })
    }

    pub fn topology(&self) -> Topology {
        Topology {
            n_input: self.w1.ncols() - 1,
            n_hidden: self.w1.nrows(),
            n_class: self.w2.nrows(),
        }
    }

    pub fn w1(&self) -> &Array2<f64> {
        &self.w1
    }

    pub fn w2(&self) -> &Array2<f64> {
        &self.w2
    }

    /// Flattens the weights back into a parameter vector.
    pub fn parameters(&self) -> Result<Array1<f64>> {
        self.topology().unroll(&self.w1, &self.w2)
    }

    /// Output activations for every row of `data`, shape (rows, n_class).
    pub fn forward<S>(&self, data: &ArrayBase<S, Ix2>) -> Result<Array2<f64>>
    where
        S: Data<Elem = f64>,
    {
        let n_input = self.w1.ncols() - 1;
        if data.ncols() != n_input {
            return Err(NetError::DimensionMismatch {
                what: "feature columns",
                expected: n_input,
                actual: data.ncols(),
            });
        }

        let x = with_bias_column(data);
        let z1 = sigmoid_array(&x.dot(&self.w1.t()));
        let z1 = with_bias_column(&z1);
        Ok(sigmoid_array(&z1.dot(&self.w2.t())))
    }

    /// Predicted class (argmax of the output layer) for every row, in row order.
    pub fn predict<S>(&self, data: &ArrayBase<S, Ix2>) -> Result<Vec<usize>>
    where
        S: Data<Elem = f64>,
    {
        let outputs = self.forward(data)?;
        Ok(argmax_rows(&outputs))
    }
}
