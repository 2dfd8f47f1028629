//! Bootstrap row sampling for ensemble training.
//!
//! Every tree is trained on its own sample of rows drawn uniformly **with
//! replacement**, so the sample size may exceed the number of available rows.

use ndarray::{Array2, ArrayView2, Axis};
use rand::Rng;

/// Draw `sample_size` row indices from `0..n_rows`, with replacement.
///
/// Returns an empty vector when `n_rows == 0`.
pub fn sample_with_replacement<R: Rng + ?Sized>(
    n_rows: usize,
    sample_size: usize,
    rng: &mut R,
) -> Vec<usize> {
    if n_rows == 0 {
        return Vec::new();
    }
    (0..sample_size).map(|_| rng.gen_range(0..n_rows)).collect()
}

/// Gather a bootstrap sample of `sample_size` rows of `x` into an owned matrix.
pub fn bootstrap_rows<R: Rng + ?Sized>(
    x: ArrayView2<'_, f64>,
    sample_size: usize,
    rng: &mut R,
) -> Array2<f64> {
    let indices = sample_with_replacement(x.nrows(), sample_size, rng);
    x.select(Axis(0), &indices)
}
