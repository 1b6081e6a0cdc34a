use ndarray::{concatenate, Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{NetError, Result};

/// Layer sizes of the single-hidden-layer network (bias units not counted).
///
/// The network's trainable state is a flat parameter vector: W1 flattened
/// row-major, immediately followed by W2 flattened row-major.
///
/// - W1: (n_hidden, n_input + 1), input -> hidden
/// - W2: (n_class, n_hidden + 1), hidden -> output
///
/// In both matrices the last column holds the bias weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    pub n_input: usize,
    pub n_hidden: usize,
    pub n_class: usize,
}

impl Topology {
    pub fn new(n_input: usize, n_hidden: usize, n_class: usize) -> Result<Topology> {
        if n_input == 0 || n_hidden == 0 || n_class == 0 {
            return Err(NetError::InvalidConfig(format!(
                "layer sizes must be at least 1 (n_input={n_input}, n_hidden={n_hidden}, n_class={n_class})"
            )));
        }
        Ok(Topology { n_input, n_hidden, n_class })
    }

    pub fn w1_shape(&self) -> (usize, usize) {
        (self.n_hidden, self.n_input + 1)
    }

    pub fn w2_shape(&self) -> (usize, usize) {
        (self.n_class, self.n_hidden + 1)
    }

    fn w1_len(&self) -> usize {
        self.n_hidden * (self.n_input + 1)
    }

    /// Length of the flat parameter vector.
    pub fn param_len(&self) -> usize {
        self.w1_len() + self.n_class * (self.n_hidden + 1)
    }

    /// Flattens W1 then W2 into one parameter vector.
    pub fn unroll(&self, w1: &Array2<f64>, w2: &Array2<f64>) -> Result<Array1<f64>> {
        check_shape("W1", self.w1_shape(), w1.dim())?;
        check_shape("W2", self.w2_shape(), w2.dim())?;
        // iter() walks in logical row-major order whatever the memory layout.
        let flat_w1: Array1<f64> = w1.iter().copied().collect();
        let flat_w2: Array1<f64> = w2.iter().copied().collect();
        Ok(concatenate(Axis(0), &[flat_w1.view(), flat_w2.view()])?)
    }

    /// Reshapes a parameter vector into (W1, W2) views without copying.
    ///
    /// `params` must be contiguous; a strided view fails with
    /// `NetError::Shape`. Use `as_standard_layout()` first when in doubt.
    pub fn roll<'a>(
        &self,
        params: ArrayView1<'a, f64>,
    ) -> Result<(ArrayView2<'a, f64>, ArrayView2<'a, f64>)> {
        if params.len() != self.param_len() {
            return Err(NetError::DimensionMismatch {
                what: "parameter vector length",
                expected: self.param_len(),
                actual: params.len(),
            });
        }
        let (head, tail) = params.split_at(Axis(0), self.w1_len());
        let w1 = head.into_shape(self.w1_shape())?;
        let w2 = tail.into_shape(self.w2_shape())?;
        Ok((w1, w2))
    }
}

fn check_shape(what: &'static str, expected: (usize, usize), actual: (usize, usize)) -> Result<()> {
    if expected.0 != actual.0 {
        return Err(NetError::DimensionMismatch { what, expected: expected.0, actual: actual.0 });
    }
    if expected.1 != actual.1 {
        return Err(NetError::DimensionMismatch { what, expected: expected.1, actual: actual.1 });
    }
    Ok(())
}
