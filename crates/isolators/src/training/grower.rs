//! Randomized tree growing.
//!
//! [`TreeGrower`] turns an observation set into a [`PartitionTree`]. Nodes are
//! expanded from an explicit stack in depth-first, left-before-right order,
//! so the random stream is consumed exactly as a recursive left-first build
//! would consume it while the call stack stays flat.

use std::ops::Range;

use ndarray::ArrayView2;
use rand::Rng;

use super::partition::RowPartitioner;
use crate::error::IsolationError;
use crate::repr::tree::NO_CHILD;
use crate::repr::{NodeId, PartitionTree};

/// Draws allowed before falling back to the lower bound.
const MAX_THRESHOLD_DRAWS: usize = 8;

/// Grows one [`PartitionTree`] over a fixed observation set.
pub struct TreeGrower<'a> {
    samples: ArrayView2<'a, f64>,
    split_features: Vec<u32>,
    split_thresholds: Vec<f64>,
    left_children: Vec<NodeId>,
    right_children: Vec<NodeId>,
    num_obs: Vec<usize>,
}

impl<'a> TreeGrower<'a> {
    /// Prepare a grower for `samples` (rows = observations).
    ///
    /// # Errors
    ///
    /// [`IsolationError::InvalidInput`] for an observation set without rows or columns.
    pub fn new(samples: ArrayView2<'a, f64>) -> Result<Self, IsolationError> {
        if samples.nrows() == 0 {
            return Err(IsolationError::InvalidInput {
                reason: "observation set has no rows",
            });
        }
        if samples.ncols() == 0 {
            return Err(IsolationError::InvalidInput {
                reason: "observation set has no features",
            });
        }

        // A tree over n rows has at most 2n - 1 nodes.
        let capacity = 2 * samples.nrows() - 1;
        Ok(Self {
            samples,
            split_features: Vec::with_capacity(capacity),
            split_thresholds: Vec::with_capacity(capacity),
            left_children: Vec::with_capacity(capacity),
            right_children: Vec::with_capacity(capacity),
            num_obs: Vec::with_capacity(capacity),
        })
    }

    /// Grow the tree, consuming randomness from `rng`.
    pub fn grow<R: Rng + ?Sized>(mut self, rng: &mut R) -> PartitionTree {
        let samples = self.samples;
        let n_rows = samples.nrows();
        let n_features = samples.ncols();
        let mut partitioner = RowPartitioner::new(n_rows);

        let root = self.push_node(n_rows);
        let mut stack: Vec<(NodeId, Range<usize>)> = vec![(root, 0..n_rows)];

        while let Some((node, range)) = stack.pop() {
            let feature = rng.gen_range(0..n_features);
            let column = samples.column(feature);

            let (min, max) = partitioner
                .rows(range.clone())
                .iter()
                .map(|&r| column[r as usize])
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                    (lo.min(v), hi.max(v))
                });

            // Constant (or single-row) partition: the node stays a leaf.
            if !(min < max) {
                continue;
            }

            let threshold = draw_threshold(rng, min, max);
            let (left_range, right_range) =
                partitioner.split(range, |r| column[r as usize] <= threshold);

            let left = self.push_child(&left_range);
            let right = self.push_child(&right_range);

            let i = node as usize;
            self.split_features[i] = feature as u32;
            self.split_thresholds[i] = threshold;
            self.left_children[i] = left;
            self.right_children[i] = right;

            // Right first so the left subtree is grown first.
            if right != NO_CHILD {
                stack.push((right, right_range));
            }
            if left != NO_CHILD {
                stack.push((left, left_range));
            }
        }

        PartitionTree::from_parts(
            n_features,
            self.split_features,
            self.split_thresholds,
            self.left_children,
            self.right_children,
            self.num_obs,
        )
    }

    fn push_node(&mut self, num_obs: usize) -> NodeId {
        let id = self.num_obs.len() as NodeId;
        self.split_features.push(0);
        self.split_thresholds.push(f64::NAN);
        self.left_children.push(NO_CHILD);
        self.right_children.push(NO_CHILD);
        self.num_obs.push(num_obs);
        id
    }

    fn push_child(&mut self, range: &Range<usize>) -> NodeId {
        if range.is_empty() {
            NO_CHILD
        } else {
            self.push_node(range.len())
        }
    }
}

/// Draw a threshold uniformly from the open interval `(min, max)`.
///
/// The draw interpolates between the bounds instead of scaling `max - min`,
/// which overflows for bounds near `±f64::MAX`. Draws that round onto either
/// bound are redrawn. When `min` and `max` are adjacent floats no value lies
/// strictly between them and `min` is accepted after a few attempts; the
/// split is still non-trivial.
fn draw_threshold<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    for _ in 0..MAX_THRESHOLD_DRAWS {
        let u: f64 = rng.gen();
        let threshold = min * (1.0 - u) + max * u;
        if threshold > min && threshold < max {
            return threshold;
        }
    }
    min
}
