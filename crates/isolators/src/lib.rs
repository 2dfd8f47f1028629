//! isolators: per-tile isolation forests for anomaly scoring.
//!
//! Takes a feature tensor of shape `(tile_rows, tile_cols, n_frames, n_features)`,
//! trains one isolation forest per tile on that tile's frames, and scores every
//! frame against its own tile's forest. Scores lie in `[0, 1]`; values near 1
//! mark frames that are easy to isolate.
//!
//! # Key Types
//!
//! - [`TileScoringGrid`] - Train-then-score over a whole tensor, in parallel across tiles
//! - [`ForestConfig`] - Configuration builder
//! - [`TreeEnsemble`] / [`PartitionTree`] - Trained forests and trees
//! - [`average_path_length`] - The score normalizer `c(n)`
//!
//! # Scoring
//!
//! Use `ForestConfig::builder()` to configure, then `TileScoringGrid::score()`.
//! See the [`model`] module for details. Single observation sets can be
//! handled directly with [`TreeEnsemble::train`] and [`TreeEnsemble::score_all`].

// Re-export approx traits for users who want to compare scores
pub use approx;

pub mod data;
pub mod error;
pub mod model;
pub mod normalize;
pub mod repr;
pub mod testing;
pub mod training;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// High-level API
pub use model::{ForestConfig, TileScoringGrid};

// Trained representations
pub use repr::{EnsembleParams, PartitionTree, TreeEnsemble};

// Errors
pub use error::{ConfigError, IsolationError};

// Logging
pub use training::Verbosity;

// Shared utilities
pub use normalize::average_path_length;
pub use utils::{run_with_threads, Parallelism};
