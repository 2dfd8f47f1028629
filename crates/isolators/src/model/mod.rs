//! High-level scoring API.
//!
//! - [`ForestConfig`]: validated configuration built with a builder
//! - [`TileScoringGrid`]: trains and scores one forest per tile of a feature tensor
//!
//! # Example
//!
//! ```
//! use isolators::model::{ForestConfig, TileScoringGrid};
//! use isolators::testing::data::feature_tensor_with_anomalies;
//!
//! // One anomalous frame in tile (0, 1).
//! let features = feature_tensor_with_anomalies((1, 2, 48, 3), 0, &[(0, 1, 5)]);
//! let grid = TileScoringGrid::new(ForestConfig::builder().build().unwrap()).unwrap();
//! let scores = grid.score(features.view()).unwrap();
//!
//! let tile = scores.slice(ndarray::s![0, 1, ..]);
//! let top = tile
//!     .iter()
//!     .enumerate()
//!     .max_by(|a, b| a.1.total_cmp(b.1))
//!     .map(|(frame, _)| frame);
//! assert_eq!(top, Some(5));
//! ```

pub mod config;
pub mod grid;

pub use config::ForestConfig;
pub use grid::TileScoringGrid;
