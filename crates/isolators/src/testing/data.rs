use ndarray::{Array2, Array4};
use rand::prelude::*;

/// Value written into injected anomalies and outliers.
pub const OUTLIER_VALUE: f64 = 100.0;

/// Generate a random `[rows, cols]` feature matrix.
///
/// Values are uniform in `[min, max]`.
pub fn random_features(rows: usize, cols: usize, seed: u64, min: f64, max: f64) -> Array2<f64> {
	assert!(max >= min);
	let mut rng = StdRng::seed_from_u64(seed);
	let width = max - min;
	Array2::from_shape_simple_fn((rows, cols), || min + rng.gen::<f64>() * width)
}

/// A dense cluster in `[-1, 1]^cols` with one far outlier as the last row.
///
/// The outlier sits at [`OUTLIER_VALUE`] in every feature.
pub fn clustered_with_outlier(rows: usize, cols: usize, seed: u64) -> Array2<f64> {
	assert!(rows >= 2);
	let mut x = random_features(rows, cols, seed, -1.0, 1.0);
	x.row_mut(rows - 1).fill(OUTLIER_VALUE);
	x
}

/// Random feature tensor `[tile_rows, tile_cols, n_frames, n_features]`, uniform in `[0, 1]`.
pub fn random_feature_tensor(
	tile_rows: usize,
	tile_cols: usize,
	n_frames: usize,
	n_features: usize,
	seed: u64,
) -> Array4<f64> {
	let mut rng = StdRng::seed_from_u64(seed);
	Array4::from_shape_simple_fn((tile_rows, tile_cols, n_frames, n_features), || rng.gen::<f64>())
}

/// Random feature tensor with anomalous frames injected.
///
/// Every feature of each `(tile_row, tile_col, frame)` in `anomalies` is set to
/// [`OUTLIER_VALUE`].
pub fn feature_tensor_with_anomalies(
	shape: (usize, usize, usize, usize),
	seed: u64,
	anomalies: &[(usize, usize, usize)],
) -> Array4<f64> {
	let (tile_rows, tile_cols, n_frames, n_features) = shape;
	let mut x = random_feature_tensor(tile_rows, tile_cols, n_frames, n_features, seed);
	for &(r, c, f) in anomalies {
		x.slice_mut(ndarray::s![r, c, f, ..]).fill(OUTLIER_VALUE);
	}
	x
}
