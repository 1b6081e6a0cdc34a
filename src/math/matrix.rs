use ndarray::{s, Array2, ArrayBase, Data, Ix1, Ix2};

/// Returns a copy of `m` with a trailing column of ones (the bias unit).
///
/// Shape: (rows, cols) -> (rows, cols + 1).
pub fn with_bias_column<S>(m: &ArrayBase<S, Ix2>) -> Array2<f64>
where
    S: Data<Elem = f64>,
{
    let (rows, cols) = m.dim();
    let mut res = Array2::ones((rows, cols + 1));
    res.slice_mut(s![.., ..cols]).assign(m);
    res
}

/// One-hot encodes `labels` into a (labels.len(), n_class) matrix.
///
/// Labels are expected to be in `[0, n_class)`; callers validate this first.
pub fn one_hot(labels: &[usize], n_class: usize) -> Array2<f64> {
    let mut res = Array2::zeros((labels.len(), n_class));
    for (row, &label) in labels.iter().enumerate() {
        res[[row, label]] = 1.0;
    }
    res
}

/// Index of the maximum element. Ties go to the lowest index.
pub fn argmax<S>(v: &ArrayBase<S, Ix1>) -> usize
where
    S: Data<Elem = f64>,
{
    let mut best = 0;
    for (i, &x) in v.iter().enumerate() {
        if x > v[best] {
            best = i;
        }
    }
    best
}

/// Row-wise argmax.
pub fn argmax_rows<S>(m: &ArrayBase<S, Ix2>) -> Vec<usize>
where
    S: Data<Elem = f64>,
{
    m.rows().into_iter().map(|row| argmax(&row)).collect()
}

/// Sum of squared entries (squared Frobenius norm).
pub fn squared_norm<S>(m: &ArrayBase<S, Ix2>) -> f64
where
    S: Data<Elem = f64>,
{
    m.iter().map(|x| x * x).sum()
}
