//! Partition tree storage, path length evaluation and structural validation.
//!
//! A [`PartitionTree`] stores its nodes as parallel arrays indexed by
//! [`NodeId`] (root = 0). Every node records `num_obs`, the number of sampled
//! observations that reached it during construction. A node is a leaf iff it
//! has no children; an internal node may miss one child when that side of its
//! split was empty.

use ndarray::ArrayView2;
use rand::Rng;

use super::NodeId;
use crate::data::SampleAccessor;
use crate::error::IsolationError;
use crate::normalize::average_path_length;
use crate::training::grower::TreeGrower;

/// Marker for an absent child.
pub(crate) const NO_CHILD: NodeId = NodeId::MAX;

// ============================================================================
// TreeValidationError
// ============================================================================

/// Structural validation errors for [`PartitionTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeValidationError {
    /// Tree has no nodes.
    EmptyTree,
    /// Node arrays have different lengths.
    ArrayLenMismatch { field: &'static str, len: usize, n_nodes: usize },
    /// A child pointer references an out-of-bounds node.
    ChildOutOfBounds {
        node: NodeId,
        side: &'static str,
        child: NodeId,
        n_nodes: usize,
    },
    /// A node references itself as a child.
    SelfLoop { node: NodeId },
    /// A node was reached by more than one path.
    DuplicateVisit { node: NodeId },
    /// A node exists in storage but is unreachable from the root.
    UnreachableNode { node: NodeId },
    /// A split refers to a feature the tree was not trained on.
    FeatureOutOfBounds { node: NodeId, feature: u32, n_features: usize },
    /// An internal node's count differs from the sum of its children's counts.
    ObsCountMismatch { node: NodeId, num_obs: usize, children: usize },
    /// A node holds no observations.
    EmptyNode { node: NodeId },
}

// ============================================================================
// PartitionTree
// ============================================================================

/// A randomized binary partition tree (isolation tree).
///
/// Built with [`PartitionTree::build`]; immutable afterwards.
#[derive(Debug, Clone)]
pub struct PartitionTree {
    n_features: usize,
    split_features: Box<[u32]>,
    split_thresholds: Box<[f64]>,
    left_children: Box<[NodeId]>,
    right_children: Box<[NodeId]>,
    num_obs: Box<[usize]>,
}

impl PartitionTree {
    /// Build a tree over `samples` (rows = observations, columns = features).
    ///
    /// Each node tries exactly one uniformly chosen feature. If that feature is
    /// constant over the node's rows the node becomes a leaf, even when other
    /// features still vary. Otherwise a threshold is drawn uniformly from
    /// `(min, max)`; rows with `value <= threshold` go left, the rest go right,
    /// and an empty side gets no child.
    ///
    /// Construction uses an explicit worklist, so degenerate data cannot
    /// exhaust the stack. Subtrees are grown left before right.
    ///
    /// # Errors
    ///
    /// [`IsolationError::InvalidInput`] if `samples` has no rows or no columns.
    pub fn build<R: Rng + ?Sized>(
        samples: ArrayView2<'_, f64>,
        rng: &mut R,
    ) -> Result<Self, IsolationError> {
        Ok(TreeGrower::new(samples)?.grow(rng))
    }

    /// Assemble a tree from parallel node arrays.
    pub(crate) fn from_parts(
        n_features: usize,
        split_features: Vec<u32>,
        split_thresholds: Vec<f64>,
        left_children: Vec<NodeId>,
        right_children: Vec<NodeId>,
        num_obs: Vec<usize>,
    ) -> Self {
        let n_nodes = num_obs.len();
        debug_assert_eq!(n_nodes, split_features.len());
        debug_assert_eq!(n_nodes, split_thresholds.len());
        debug_assert_eq!(n_nodes, left_children.len());
        debug_assert_eq!(n_nodes, right_children.len());

        Self {
            n_features,
            split_features: split_features.into_boxed_slice(),
            split_thresholds: split_thresholds.into_boxed_slice(),
            left_children: left_children.into_boxed_slice(),
            right_children: right_children.into_boxed_slice(),
            num_obs: num_obs.into_boxed_slice(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of nodes in the tree.
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.num_obs.len()
    }

    /// Number of features the tree was trained on.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Check if a node is a leaf (no children).
    #[inline]
    pub fn is_leaf(&self, node: NodeId) -> bool {
        let i = node as usize;
        self.left_children[i] == NO_CHILD && self.right_children[i] == NO_CHILD
    }

    /// Feature index of a split node; `None` for leaves.
    #[inline]
    pub fn split_feature(&self, node: NodeId) -> Option<usize> {
        (!self.is_leaf(node)).then(|| self.split_features[node as usize] as usize)
    }

    /// Threshold of a split node; `None` for leaves.
    #[inline]
    pub fn split_threshold(&self, node: NodeId) -> Option<f64> {
        (!self.is_leaf(node)).then(|| self.split_thresholds[node as usize])
    }

    /// Left child (`value <= threshold`), if present.
    #[inline]
    pub fn left_child(&self, node: NodeId) -> Option<NodeId> {
        let child = self.left_children[node as usize];
        (child != NO_CHILD).then_some(child)
    }

    /// Right child (`value > threshold`), if present.
    #[inline]
    pub fn right_child(&self, node: NodeId) -> Option<NodeId> {
        let child = self.right_children[node as usize];
        (child != NO_CHILD).then_some(child)
    }

    /// Number of observations that reached `node` during construction.
    #[inline]
    pub fn num_obs(&self, node: NodeId) -> usize {
        self.num_obs[node as usize]
    }

    /// Number of leaves.
    pub fn n_leaves(&self) -> usize {
        (0..self.n_nodes() as NodeId)
            .filter(|&n| self.is_leaf(n))
            .count()
    }

    /// Depth of the deepest node (root = 0).
    pub fn max_depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(0 as NodeId, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(self.left_child(node).map(|c| (c, depth + 1)));
            stack.extend(self.right_child(node).map(|c| (c, depth + 1)));
        }
        deepest
    }

    // =========================================================================
    // Evaluation
    // =========================================================================

    /// Path length of `sample`, starting from depth 0.
    ///
    /// See [`evaluate_from`](Self::evaluate_from).
    #[inline]
    pub fn evaluate<S: SampleAccessor + ?Sized>(
        &self,
        sample: &S,
        height_limit: usize,
    ) -> Result<f64, IsolationError> {
        self.evaluate_from(sample, height_limit, 0)
    }

    /// Path length of `sample`, with the root at `current_depth`.
    ///
    /// The walk stops at the first node where the depth exceeds
    /// `height_limit`, the node is a leaf, or the comparison routes to a
    /// missing child, and returns `depth + c(num_obs)` for that node.
    ///
    /// # Errors
    ///
    /// [`IsolationError::DimensionMismatch`] if `sample` does not have
    /// [`n_features`](Self::n_features) features.
    pub fn evaluate_from<S: SampleAccessor + ?Sized>(
        &self,
        sample: &S,
        height_limit: usize,
        current_depth: usize,
    ) -> Result<f64, IsolationError> {
        self.check_features(sample)?;
        Ok(self.path_length(sample, height_limit, current_depth))
    }

    #[inline]
    pub(crate) fn check_features<S: SampleAccessor + ?Sized>(
        &self,
        sample: &S,
    ) -> Result<(), IsolationError> {
        if sample.n_features() != self.n_features {
            return Err(IsolationError::DimensionMismatch {
                expected: self.n_features,
                got: sample.n_features(),
            });
        }
        Ok(())
    }

    /// Path length without the dimension check.
    #[inline]
    pub(crate) fn path_length<S: SampleAccessor + ?Sized>(
        &self,
        sample: &S,
        height_limit: usize,
        mut depth: usize,
    ) -> f64 {
        let mut node: NodeId = 0;
        loop {
            let i = node as usize;
            let next = if depth > height_limit || self.is_leaf(node) {
                NO_CHILD
            } else if sample.feature(self.split_features[i] as usize) <= self.split_thresholds[i] {
                self.left_children[i]
            } else {
                self.right_children[i]
            };
            if next == NO_CHILD {
                return depth as f64 + average_path_length(self.num_obs[i]);
            }

            node = next;
            depth += 1;
        }
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Validate structural invariants.
    ///
    /// Checks that every node is reachable exactly once from the root, child
    /// pointers are in bounds, split features are in range, no node is empty,
    /// and every internal node's `num_obs` equals the sum over its children.
    pub fn validate(&self) -> Result<(), TreeValidationError> {
        let n_nodes = self.n_nodes();
        if n_nodes == 0 {
            return Err(TreeValidationError::EmptyTree);
        }
        for (field, len) in [
            ("split_features", self.split_features.len()),
            ("split_thresholds", self.split_thresholds.len()),
            ("left_children", self.left_children.len()),
            ("right_children", self.right_children.len()),
        ] {
            if len != n_nodes {
                return Err(TreeValidationError::ArrayLenMismatch { field, len, n_nodes });
            }
        }

        let mut visited = vec![false; n_nodes];
        let mut stack: Vec<NodeId> = vec![0];

        while let Some(node) = stack.pop() {
            let i = node as usize;
            if visited[i] {
                return Err(TreeValidationError::DuplicateVisit { node });
            }
            visited[i] = true;

            if self.num_obs[i] == 0 {
                return Err(TreeValidationError::EmptyNode { node });
            }
            if self.is_leaf(node) {
                continue;
            }

            let feature = self.split_features[i];
            if feature as usize >= self.n_features {
                return Err(TreeValidationError::FeatureOutOfBounds {
                    node,
                    feature,
                    n_features: self.n_features,
                });
            }

            let mut children_obs = 0;
            for (side, child) in [
                ("left", self.left_children[i]),
                ("right", self.right_children[i]),
            ] {
                if child == NO_CHILD {
                    continue;
                }
                if child == node {
                    return Err(TreeValidationError::SelfLoop { node });
                }
                if child as usize >= n_nodes {
                    return Err(TreeValidationError::ChildOutOfBounds {
                        node,
                        side,
                        child,
                        n_nodes,
                    });
                }
                children_obs += self.num_obs[child as usize];
                stack.push(child);
            }

            if children_obs != self.num_obs[i] {
                return Err(TreeValidationError::ObsCountMismatch {
                    node,
                    num_obs: self.num_obs[i],
                    children: children_obs,
                });
            }
        }

        if let Some(i) = visited.iter().position(|&v| !v) {
            return Err(TreeValidationError::UnreachableNode { node: i as NodeId });
        }

        Ok(())
    }
}
