//! Ensemble of partition trees and anomaly scoring.

use ndarray::{Array1, ArrayView2};
use rand::Rng;

use super::tree::{PartitionTree, TreeValidationError};
use crate::data::SampleAccessor;
use crate::error::{ConfigError, IsolationError};
use crate::normalize::average_path_length;
use crate::training::sampling::bootstrap_rows;

/// Ensemble construction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnsembleParams {
    /// Number of trees. Default: 100.
    pub n_trees: usize,
    /// Rows drawn (with replacement) per tree. Default: 256.
    pub sample_size: usize,
}

impl Default for EnsembleParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            sample_size: 256,
        }
    }
}

impl EnsembleParams {
    /// Validate parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_trees == 0 {
            return Err(ConfigError::InvalidNTrees(self.n_trees));
        }
        if self.sample_size == 0 {
            return Err(ConfigError::InvalidSampleSize(self.sample_size));
        }
        Ok(())
    }
}

/// A trained isolation forest for one observation set.
///
/// Scores use `c(n_samples)` as the normaliser, where `n_samples` is the row
/// count of the full training set, not the per-tree sample size.
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    trees: Vec<PartitionTree>,
    n_samples: usize,
    n_features: usize,
}

impl TreeEnsemble {
    /// Train `params.n_trees` trees, each on an independent bootstrap sample
    /// of `params.sample_size` rows of `x`.
    ///
    /// # Errors
    ///
    /// - [`IsolationError::Config`] for a zero tree count or sample size
    /// - [`IsolationError::InvalidInput`] if `x` has no rows or no columns
    pub fn train<R: Rng + ?Sized>(
        x: ArrayView2<'_, f64>,
        params: &EnsembleParams,
        rng: &mut R,
    ) -> Result<Self, IsolationError> {
        params.validate()?;
        if x.nrows() == 0 {
            return Err(IsolationError::InvalidInput {
                reason: "observation set has no rows",
            });
        }
        if x.ncols() == 0 {
            return Err(IsolationError::InvalidInput {
                reason: "observation set has no features",
            });
        }

        let trees = (0..params.n_trees)
            .map(|_| {
                let sample = bootstrap_rows(x, params.sample_size, rng);
                PartitionTree::build(sample.view(), rng)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            trees,
            n_samples: x.nrows(),
            n_features: x.ncols(),
        })
    }

    /// Number of trees.
    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Row count of the training set (the score normalization base).
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Number of features per observation.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Get a reference to a specific tree.
    #[inline]
    pub fn tree(&self, idx: usize) -> &PartitionTree {
        &self.trees[idx]
    }

    /// Iterate over trees.
    pub fn trees(&self) -> impl Iterator<Item = &PartitionTree> {
        self.trees.iter()
    }

    /// Mean path length of `sample` over all trees.
    pub fn mean_path_length<S: SampleAccessor + ?Sized>(
        &self,
        sample: &S,
        height_limit: usize,
    ) -> Result<f64, IsolationError> {
        self.check_features(sample)?;
        Ok(self.mean_path_length_unchecked(sample, height_limit))
    }

    /// Anomaly score of `sample` in `[0, 1]`: `2^(-mean_path / c(n_samples))`.
    ///
    /// Values near 1 mark easily isolated observations; values around 0.5 or
    /// below are typical.
    pub fn score<S: SampleAccessor + ?Sized>(
        &self,
        sample: &S,
        height_limit: usize,
    ) -> Result<f64, IsolationError> {
        self.check_features(sample)?;
        Ok(self.score_unchecked(sample, height_limit))
    }

    /// Score every row of `samples`, in row order.
    pub fn score_all(
        &self,
        samples: ArrayView2<'_, f64>,
        height_limit: usize,
    ) -> Result<Array1<f64>, IsolationError> {
        if samples.ncols() != self.n_features {
            return Err(IsolationError::DimensionMismatch {
                expected: self.n_features,
                got: samples.ncols(),
            });
        }
        Ok(samples
            .rows()
            .into_iter()
            .map(|row| self.score_unchecked(&row, height_limit))
            .collect())
    }

    /// Validate every tree.
    pub fn validate(&self) -> Result<(), (usize, TreeValidationError)> {
        self.trees
            .iter()
            .enumerate()
            .try_for_each(|(i, tree)| tree.validate().map_err(|e| (i, e)))
    }

    fn check_features<S: SampleAccessor + ?Sized>(&self, sample: &S) -> Result<(), IsolationError> {
        if sample.n_features() != self.n_features {
            return Err(IsolationError::DimensionMismatch {
                expected: self.n_features,
                got: sample.n_features(),
            });
        }
        Ok(())
    }

    fn mean_path_length_unchecked<S: SampleAccessor + ?Sized>(
        &self,
        sample: &S,
        height_limit: usize,
    ) -> f64 {
        let total: f64 = self
            .trees
            .iter()
            .map(|tree| tree.path_length(sample, height_limit, 0))
            .sum();
        total / self.trees.len() as f64
    }

    fn score_unchecked<S: SampleAccessor + ?Sized>(&self, sample: &S, height_limit: usize) -> f64 {
        let mean = self.mean_path_length_unchecked(sample, height_limit);
        anomaly_score(mean, average_path_length(self.n_samples))
    }
}

/// `2^(-mean / c)`, with `0 / 0` taken as an exponent of zero.
///
/// A zero normaliser only arises for single-row training sets; a positive
/// mean then yields `2^-inf = 0`.
#[inline]
fn anomaly_score(mean_path: f64, normalizer: f64) -> f64 {
    if normalizer == 0.0 && mean_path == 0.0 {
        return 1.0;
    }
    (-mean_path / normalizer).exp2()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::data::clustered_with_outlier;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;
    use rstest::rstest;

    fn rng(seed: u64) -> Xoshiro256PlusPlus {
        Xoshiro256PlusPlus::seed_from_u64(seed)
    }

    #[test]
    fn default_params() {
        let params = EnsembleParams::default();
        assert_eq!(params.n_trees, 100);
        assert_eq!(params.sample_size, 256);
        assert!(params.validate().is_ok());
    }

    #[rstest]
    #[case(EnsembleParams { n_trees: 0, sample_size: 10 }, ConfigError::InvalidNTrees(0))]
    #[case(EnsembleParams { n_trees: 10, sample_size: 0 }, ConfigError::InvalidSampleSize(0))]
    fn invalid_params_rejected(#[case] params: EnsembleParams, #[case] expected: ConfigError) {
        let x = array![[1.0], [2.0]];
        let err = TreeEnsemble::train(x.view(), &params, &mut rng(0)).unwrap_err();
        assert_eq!(err, IsolationError::Config(expected));
    }

    #[test]
    fn rejects_empty_input() {
        let x = Array2::<f64>::zeros((0, 4));
        let err = TreeEnsemble::train(x.view(), &EnsembleParams::default(), &mut rng(0)).unwrap_err();
        assert!(matches!(err, IsolationError::InvalidInput { .. }));
    }

    #[rstest]
    #[case(100)]
    #[case(20)]
    #[case(1)]
    fn builds_requested_tree_count(#[case] n_trees: usize) {
        let x = clustered_with_outlier(50, 3, 1);
        let params = EnsembleParams { n_trees, sample_size: 32 };
        let forest = TreeEnsemble::train(x.view(), &params, &mut rng(2)).unwrap();
        assert_eq!(forest.n_trees(), n_trees);
        assert_eq!(forest.trees().count(), n_trees);
        assert_eq!(forest.n_samples(), 50);
        assert_eq!(forest.n_features(), 3);
        for tree in forest.trees() {
            assert_eq!(tree.num_obs(0), 32);
        }
        forest.validate().unwrap();
    }

    #[test]
    fn sample_size_may_exceed_rows() {
        let x = array![[0.0, 1.0], [2.0, 3.0], [4.0, 5.0]];
        let forest = TreeEnsemble::train(x.view(), &EnsembleParams::default(), &mut rng(3)).unwrap();
        assert_eq!(forest.tree(0).num_obs(0), 256);
        // Normalization uses the full row count, not the sample size.
        assert_eq!(forest.n_samples(), 3);
    }

    #[test]
    fn score_uses_full_row_count_normalizer() {
        let x = clustered_with_outlier(40, 2, 4);
        let forest = TreeEnsemble::train(
            x.view(),
            &EnsembleParams { n_trees: 10, sample_size: 64 },
            &mut rng(5),
        )
        .unwrap();
        let row = x.row(0);
        let mean = forest.mean_path_length(&row, 20).unwrap();
        let expected = 2f64.powf(-mean / average_path_length(40));
        assert_abs_diff_eq!(forest.score(&row, 20).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn score_all_matches_score_and_is_deterministic() {
        let x = clustered_with_outlier(60, 4, 6);
        let forest = TreeEnsemble::train(
            x.view(),
            &EnsembleParams { n_trees: 25, sample_size: 64 },
            &mut rng(7),
        )
        .unwrap();

        let first = forest.score_all(x.view(), 20).unwrap();
        let second = forest.score_all(x.view(), 20).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 60);
        for (row, &s) in x.rows().into_iter().zip(first.iter()) {
            assert_eq!(forest.score(&row, 20).unwrap(), s);
            assert!((0.0..=1.0).contains(&s));
        }
    }

    #[test]
    fn outlier_scores_higher_than_cluster() {
        let x = clustered_with_outlier(256, 3, 8);
        let forest = TreeEnsemble::train(x.view(), &EnsembleParams::default(), &mut rng(9)).unwrap();

        let outlier = forest.score(&[100.0, 100.0, 100.0], 20).unwrap();
        let center = forest.score(&[0.0, 0.0, 0.0], 20).unwrap();
        assert!(outlier > center, "outlier {outlier} <= center {center}");
        assert!(outlier > 0.5);
    }

    #[test]
    fn dimension_mismatch() {
        let x = array![[0.0, 1.0], [2.0, 3.0]];
        let forest = TreeEnsemble::train(
            x.view(),
            &EnsembleParams { n_trees: 3, sample_size: 4 },
            &mut rng(10),
        )
        .unwrap();

        let err = forest.score(&[1.0], 20).unwrap_err();
        assert_eq!(err, IsolationError::DimensionMismatch { expected: 2, got: 1 });

        let wide = Array2::<f64>::zeros((5, 3));
        let err = forest.score_all(wide.view(), 20).unwrap_err();
        assert_eq!(err, IsolationError::DimensionMismatch { expected: 2, got: 3 });
    }

    #[test]
    fn single_row_training_set() {
        let x = array![[3.0, 4.0]];
        let forest = TreeEnsemble::train(
            x.view(),
            &EnsembleParams { n_trees: 5, sample_size: 8 },
            &mut rng(11),
        )
        .unwrap();
        // Every tree is one leaf holding 8 copies; c(1) = 0 drives the score to 0.
        assert_abs_diff_eq!(
            forest.mean_path_length(&[3.0, 4.0], 20).unwrap(),
            average_path_length(8),
            epsilon = 1e-12
        );
        assert_eq!(forest.score(&[3.0, 4.0], 20).unwrap(), 0.0);

        let forest = TreeEnsemble::train(
            x.view(),
            &EnsembleParams { n_trees: 5, sample_size: 1 },
            &mut rng(12),
        )
        .unwrap();
        assert_eq!(forest.score(&[3.0, 4.0], 20).unwrap(), 1.0);
    }

    #[test]
    fn anomaly_score_bounds() {
        assert_eq!(anomaly_score(0.0, 5.0), 1.0);
        assert_abs_diff_eq!(anomaly_score(5.0, 5.0), 0.5);
        assert_eq!(anomaly_score(3.0, 0.0), 0.0);
        assert_eq!(anomaly_score(0.0, 0.0), 1.0);
    }
}
