//! Training infrastructure for isolation trees.
//!
//! - [`grower`]: worklist-based randomized tree growing
//! - [`partition`]: in-place row partitioning shared by the grower
//! - [`sampling`]: bootstrap row sampling (with replacement)
//! - [`TrainingLogger`], [`Verbosity`]: verbosity-gated logging

pub mod grower;
mod logger;
pub mod partition;
pub mod sampling;

pub use grower::TreeGrower;
pub use logger::{TrainingLogger, Verbosity};
pub use sampling::{bootstrap_rows, sample_with_replacement};
