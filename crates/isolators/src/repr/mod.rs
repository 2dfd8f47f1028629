//! Trained isolation tree and ensemble representations.

/// Node identifier: an index into a tree's node arrays.
pub type NodeId = u32;

pub mod ensemble;
pub mod tree;

pub use ensemble::{EnsembleParams, TreeEnsemble};
pub use tree::{PartitionTree, TreeValidationError};
