use ndarray::{Array, ArrayBase, Data, Dimension};

/// Logistic sigmoid `1 / (1 + e^(-z))`.
///
/// Evaluated as `e^z / (1 + e^z)` for negative `z` so the exponential never
/// overflows: large negative inputs saturate to 0.0 and large positive inputs
/// to 1.0 instead of producing NaN.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Element-wise sigmoid over an array of any dimension.
pub fn sigmoid_array<S, D>(z: &ArrayBase<S, D>) -> Array<f64, D>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    z.mapv(sigmoid)
}

/// Sigmoid derivative expressed through its output: `a * (1 - a)` where `a = sigmoid(z)`.
pub fn sigmoid_derivative_from_output<S, D>(a: &ArrayBase<S, D>) -> Array<f64, D>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    a.mapv(|x| x * (1.0 - x))
}
