use rand::seq::SliceRandom;
use rand::Rng;

use crate::data::dataset::Dataset;
use crate::error::{NetError, Result};

/// Randomly holds out `validation_len` rows of `data`.
///
/// Rows are permuted once; the first `len - validation_len` go to the
/// returned training set and the rest to the validation set, so the two are
/// disjoint and together cover every row.
pub fn holdout<R>(data: &Dataset, validation_len: usize, rng: &mut R) -> Result<(Dataset, Dataset)>
where
    R: Rng + ?Sized,
{
    if validation_len >= data.len() {
        return Err(NetError::InvalidConfig(format!(
            "validation size {validation_len} leaves no training rows out of {}",
            data.len()
        )));
    }

    let mut indices: Vec<usize> = (0..data.len()).collect();
    indices.shuffle(rng);
    let (train_idx, validation_idx) = indices.split_at(data.len() - validation_len);

    Ok((data.select(train_idx)?, data.select(validation_idx)?))
}
