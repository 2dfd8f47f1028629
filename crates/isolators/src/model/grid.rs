//! Per-tile train-then-score orchestration over a feature tensor.

use std::time::Instant;

use ndarray::{s, Array1, Array3, ArrayView2, ArrayView4};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::error::{ConfigError, IsolationError};
use crate::model::ForestConfig;
use crate::repr::TreeEnsemble;
use crate::training::{TrainingLogger, Verbosity};
use crate::utils::{run_with_threads, tile_seed, Parallelism};

/// Scores every frame of every tile of a `(tile_rows, tile_cols, n_frames, n_features)`
/// feature tensor against a forest trained on that tile's own frames.
///
/// Tiles are independent: each one gets a fresh [`TreeEnsemble`] trained on
/// `features[r, c, .., ..]` with its own random stream derived from the
/// configured seed and the tile coordinates. The result is therefore identical
/// for any thread count.
///
/// # Example
///
/// ```
/// use isolators::model::{ForestConfig, TileScoringGrid};
/// use isolators::testing::data::random_feature_tensor;
///
/// let features = random_feature_tensor(2, 3, 16, 4, 0);
/// let config = ForestConfig::builder().n_trees(10).sample_size(16).build().unwrap();
/// let grid = TileScoringGrid::new(config).unwrap();
///
/// let scores = grid.score(features.view()).unwrap();
/// assert_eq!(scores.dim(), (2, 3, 16));
/// assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)));
/// ```
#[derive(Debug, Clone)]
pub struct TileScoringGrid {
    config: ForestConfig,
}

impl TileScoringGrid {
    /// Create a grid, validating `config`.
    pub fn new(config: ForestConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Score every frame of every tile.
    ///
    /// Returns an array of shape `(tile_rows, tile_cols, n_frames)`. A tensor
    /// with no tile rows or no tile columns yields an empty output.
    ///
    /// # Errors
    ///
    /// - [`IsolationError::InvalidInput`] if the tensor has no frames or no features
    /// - [`IsolationError::Tile`] wrapping the first failing tile in row-major order
    /// - [`IsolationError::Config`] if the thread pool cannot be built
    pub fn score(&self, features: ArrayView4<'_, f64>) -> Result<Array3<f64>, IsolationError> {
        let (tile_rows, tile_cols, n_frames, n_features) = features.dim();
        if tile_rows == 0 || tile_cols == 0 {
            return Ok(Array3::zeros((tile_rows, tile_cols, n_frames)));
        }
        check_tile_shape(n_frames, n_features)?;

        let mut logger = TrainingLogger::new(self.config.verbosity);
        logger.info(&format!(
            "scoring {tile_rows}x{tile_cols} tiles: {n_frames} frames, {n_features} features, \
             {} trees of {} samples",
            self.config.n_trees, self.config.sample_size
        ));
        if n_frames == 1 {
            logger.warn("single-frame tiles: c(1) = 0, so every score collapses to 0 or 1");
        }

        let n_tiles = tile_rows * tile_cols;
        let per_tile = run_with_threads(self.config.thread_count(), |parallelism| {
            self.score_tiles(features, n_tiles, parallelism, &logger)
        })?;

        let mut output = Array3::zeros((tile_rows, tile_cols, n_frames));
        for (idx, scores) in per_tile.into_iter().enumerate() {
            let (r, c) = (idx / tile_cols, idx % tile_cols);
            output.slice_mut(s![r, c, ..]).assign(&scores?);
        }

        logger.stage_done("tile scoring");
        Ok(output)
    }

    /// Train the forest for tile `(row, col)`.
    ///
    /// Uses the same random stream as [`score`](Self::score), so the returned
    /// ensemble is exactly the one that scores this tile there.
    pub fn train_tile(
        &self,
        features: ArrayView4<'_, f64>,
        row: usize,
        col: usize,
    ) -> Result<TreeEnsemble, IsolationError> {
        let x = tile_slice(features, row, col)?;
        self.train_slice(x, row, col)
            .map_err(|e| e.at_tile(row, col))
    }

    /// Scores of every frame of tile `(row, col)`, in frame order.
    pub fn score_tile(
        &self,
        features: ArrayView4<'_, f64>,
        row: usize,
        col: usize,
    ) -> Result<Array1<f64>, IsolationError> {
        let x = tile_slice(features, row, col)?;
        self.score_slice(x, row, col)
            .map_err(|e| e.at_tile(row, col))
    }

    fn score_tiles(
        &self,
        features: ArrayView4<'_, f64>,
        n_tiles: usize,
        parallelism: Parallelism,
        logger: &TrainingLogger,
    ) -> Vec<Result<Array1<f64>, IsolationError>> {
        let tile_cols = features.dim().1;
        parallelism.maybe_par_map(0..n_tiles, |idx| {
            let (r, c) = (idx / tile_cols, idx % tile_cols);
            let started = Instant::now();
            let scores = self
                .score_slice(features.slice(s![r, c, .., ..]), r, c)
                .map_err(|e| e.at_tile(r, c))?;
            if logger.enabled(Verbosity::Debug) {
                logger.debug(&format!(
                    "tile ({r}, {c}) scored in {:.3}s, max score {:.4}",
                    started.elapsed().as_secs_f64(),
                    scores.fold(0.0_f64, |acc, &v| acc.max(v))
                ));
            }
            Ok(scores)
        })
    }

    fn train_slice(
        &self,
        x: ArrayView2<'_, f64>,
        row: usize,
        col: usize,
    ) -> Result<TreeEnsemble, IsolationError> {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(tile_seed(self.config.seed, row, col));
        TreeEnsemble::train(x, &self.config.ensemble_params(), &mut rng)
    }

    fn score_slice(
        &self,
        x: ArrayView2<'_, f64>,
        row: usize,
        col: usize,
    ) -> Result<Array1<f64>, IsolationError> {
        let ensemble = self.train_slice(x, row, col)?;
        ensemble.score_all(x, self.config.height_limit)
    }
}

fn check_tile_shape(n_frames: usize, n_features: usize) -> Result<(), IsolationError> {
    if n_frames == 0 {
        return Err(IsolationError::InvalidInput {
            reason: "feature tensor has no frames",
        });
    }
    if n_features == 0 {
        return Err(IsolationError::InvalidInput {
            reason: "feature tensor has no features",
        });
    }
    Ok(())
}

fn tile_slice(
    features: ArrayView4<'_, f64>,
    row: usize,
    col: usize,
) -> Result<ArrayView2<'_, f64>, IsolationError> {
    let (tile_rows, tile_cols, _, _) = features.dim();
    if row >= tile_rows || col >= tile_cols {
        return Err(IsolationError::InvalidInput {
            reason: "tile index out of bounds",
        });
    }
    Ok(features.slice_move(s![row, col, .., ..]))
}
