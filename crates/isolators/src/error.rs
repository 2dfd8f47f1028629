//! Error types shared across the crate.
//!
//! All failures here are structural precondition violations on in-memory
//! data. They are surfaced immediately; nothing is retried.

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// n_trees must be > 0.
    #[error("n_trees must be > 0, got {0}")]
    InvalidNTrees(usize),

    /// sample_size must be > 0.
    #[error("sample_size must be > 0, got {0}")]
    InvalidSampleSize(usize),

    /// height_limit must be >= 0.
    #[error("height_limit must be >= 0, got {0}")]
    InvalidHeightLimit(i64),

    /// n_threads was requested but a thread pool could not be created.
    #[error("failed to create a thread pool with {n_threads} threads: {reason}")]
    ThreadPool { n_threads: usize, reason: String },
}

/// Errors produced while building or evaluating isolation trees.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IsolationError {
    /// The observation set cannot be used to build a tree or ensemble.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: &'static str },

    /// A query vector does not have the trained feature cardinality.
    #[error("dimension mismatch: expected {expected} features, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Invalid construction-time configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An error raised while processing a single tile of a feature tensor.
    #[error("tile ({row}, {col}): {source}")]
    Tile {
        row: usize,
        col: usize,
        #[source]
        source: Box<IsolationError>,
    },
}

impl IsolationError {
    /// Attach tile coordinates to an error.
    pub(crate) fn at_tile(self, row: usize, col: usize) -> Self {
        match self {
            // Configuration problems are not tile specific.
            Self::Config(_) | Self::Tile { .. } => self,
            other => Self::Tile {
                row,
                col,
                source: Box::new(other),
            },
        }
    }

    /// The underlying error, with any tile context stripped.
    pub fn root_cause(&self) -> &IsolationError {
        match self {
            Self::Tile { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
