use crate::error::{NetError, Result};

/// Percentage (0 to 100) of positions where `predicted` equals `truth`.
pub fn accuracy(predicted: &[usize], truth: &[usize]) -> Result<f64> {
    if predicted.len() != truth.len() {
        return Err(NetError::LengthMismatch {
            predicted: predicted.len(),
            truth: truth.len(),
        });
    }
    if truth.is_empty() {
        return Err(NetError::EmptyDataset);
    }

    let hits = predicted.iter().zip(truth).filter(|(p, t)| p == t).count();
    Ok(100.0 * hits as f64 / truth.len() as f64)
}
