//! Tile scoring configuration with builder pattern.
//!
//! [`ForestConfig`] collects every knob of a scoring pass and uses the `bon`
//! crate for builder generation with validation at `build()`.
//!
//! # Example
//!
//! ```
//! use isolators::model::ForestConfig;
//! use isolators::training::Verbosity;
//!
//! // All defaults: 100 trees, 256 rows per tree, height limit 20.
//! let config = ForestConfig::builder().build().unwrap();
//! assert_eq!(config.n_trees, 100);
//!
//! let config = ForestConfig::builder()
//!     .n_trees(50)
//!     .sample_size(128)
//!     .height_limit(12)
//!     .seed(7)
//!     .verbosity(Verbosity::Info)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.height_limit, 12);
//! ```

use std::num::NonZeroUsize;

use bon::Builder;

use crate::error::ConfigError;
use crate::repr::EnsembleParams;
use crate::training::Verbosity;

/// Configuration for per-tile forest training and scoring.
#[derive(Debug, Clone, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct ForestConfig {
    // === Ensemble ===
    /// Trees per tile. Default: 100.
    #[builder(default = 100)]
    pub n_trees: usize,

    /// Rows drawn with replacement for each tree. Default: 256.
    ///
    /// May exceed the number of frames.
    #[builder(default = 256)]
    pub sample_size: usize,

    // === Evaluation ===
    /// Depth past which path evaluation stops. Default: 20.
    #[builder(default = 20)]
    pub height_limit: usize,

    // === Reproducibility ===
    /// Global random seed; each tile derives its own stream from it. Default: 42.
    #[builder(default = 42)]
    pub seed: u64,

    // === Resource control ===
    /// Number of threads. `None` uses all available cores.
    pub n_threads: Option<NonZeroUsize>,

    // === Logging ===
    /// Verbosity level. Default: `Silent`.
    #[builder(default)]
    pub verbosity: Verbosity,
}

impl<S: forest_config_builder::IsComplete> ForestConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `n_trees == 0` or `sample_size == 0`.
    pub fn build(self) -> Result<ForestConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl ForestConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ensemble_params().validate()
    }

    /// Per-tile ensemble parameters.
    pub fn ensemble_params(&self) -> EnsembleParams {
        EnsembleParams {
            n_trees: self.n_trees,
            sample_size: self.sample_size,
        }
    }

    /// Thread count in `run_with_threads` semantics (0 = auto).
    pub fn thread_count(&self) -> usize {
        self.n_threads.map_or(0, NonZeroUsize::get)
    }

    /// Convert a signed height limit, rejecting negative values.
    ///
    /// ```
    /// use isolators::model::ForestConfig;
    ///
    /// assert_eq!(ForestConfig::height_limit_from_signed(20), Ok(20));
    /// assert!(ForestConfig::height_limit_from_signed(-1).is_err());
    /// ```
    pub fn height_limit_from_signed(height_limit: i64) -> Result<usize, ConfigError> {
        usize::try_from(height_limit).map_err(|_| ConfigError::InvalidHeightLimit(height_limit))
    }
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            sample_size: 256,
            height_limit: 20,
            seed: 42,
            n_threads: None,
            verbosity: Verbosity::default(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
