use ndarray::Array2;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;

/// Half-width of the uniform initialization interval:
/// `sqrt(6) / sqrt(fan_in + fan_out + 1)`.
pub fn init_bound(fan_in: usize, fan_out: usize) -> f64 {
    6.0_f64.sqrt() / ((fan_in + fan_out + 1) as f64).sqrt()
}

/// Random weights for a layer with `fan_in` inputs and `fan_out` units.
///
/// Shape: (fan_out, fan_in + 1). The extra column holds the bias weights.
/// Entries are uniform on `[-ε, ε]` with `ε = init_bound(fan_in, fan_out)`,
/// small enough to keep the first sigmoid activations away from saturation
/// while still breaking symmetry between hidden units.
pub fn initialize_weights<R>(fan_in: usize, fan_out: usize, rng: &mut R) -> Array2<f64>
where
    R: Rng + ?Sized,
{
    let epsilon = init_bound(fan_in, fan_out);
    Array2::random_using(
        (fan_out, fan_in + 1),
        Uniform::new_inclusive(-epsilon, epsilon),
        rng,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn shape_and_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for &(fan_in, fan_out) in &[(1, 1), (3, 2), (784, 88), (88, 10)] {
            let w = initialize_weights(fan_in, fan_out, &mut rng);
            assert_eq!(w.dim(), (fan_out, fan_in + 1));
            let eps = init_bound(fan_in, fan_out);
            assert!(w.iter().all(|&x| (-eps..=eps).contains(&x)));
        }
    }

    #[test]
    fn bound_depends_on_fan_in_and_fan_out() {
        assert_eq!(init_bound(2, 3), 1.0);
        assert!(init_bound(784, 88) < init_bound(88, 10));
    }

    #[test]
    fn same_seed_same_weights() {
        let a = initialize_weights(5, 4, &mut StdRng::seed_from_u64(42));
        let b = initialize_weights(5, 4, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
