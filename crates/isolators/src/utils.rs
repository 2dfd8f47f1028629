//! Parallelism configuration and seeding helpers.
//!
//! Tiles are independent, so the unit of parallel work is one tile. Components
//! receive a [`Parallelism`] flag; the thread pool itself is set up once at the
//! API boundary via [`run_with_threads`].

use rayon::prelude::*;

use crate::error::ConfigError;

// =============================================================================
// Parallelism Configuration
// =============================================================================

/// Whether parallel execution is allowed.
///
/// When `true`, components may use `rayon` parallel iterators.
/// When `false`, components must use sequential iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parallelism {
    Sequential,
    Parallel,
}

impl Parallelism {
    /// Create from thread count semantics.
    ///
    /// - 0 = auto (parallel if the rayon pool has multiple threads, sequential otherwise)
    /// - 1 = sequential
    /// - >1 = parallel
    #[inline]
    pub fn from_threads(n_threads: usize) -> Self {
        if n_threads == 1 || (n_threads == 0 && rayon::current_num_threads() == 1) {
            Parallelism::Sequential
        } else {
            Parallelism::Parallel
        }
    }

    /// Returns `true` if parallel execution is allowed.
    #[inline]
    pub fn is_parallel(self) -> bool {
        matches!(self, Parallelism::Parallel)
    }

    /// Map over `iter`, in parallel when allowed. Output order matches input order.
    #[inline]
    pub fn maybe_par_map<T, B, I, F>(self, iter: I, f: F) -> Vec<B>
    where
        T: Send,
        B: Send,
        I: IntoIterator<Item = T> + IntoParallelIterator<Item = T>,
        F: Fn(T) -> B + Sync + Send,
    {
        if self.is_parallel() {
            iter.into_par_iter().map(f).collect()
        } else {
            iter.into_iter().map(f).collect()
        }
    }
}

// =============================================================================
// Thread Pool Setup
// =============================================================================

/// Run a closure with the appropriate thread pool.
///
/// Thread count semantics:
/// - `0` = auto (use the global rayon pool)
/// - `1` = sequential (no thread pool)
/// - `n > 1` = use exactly `n` threads
///
/// # Errors
///
/// Returns [`ConfigError::ThreadPool`] if a dedicated pool cannot be built.
///
/// # Example
///
/// ```
/// use isolators::run_with_threads;
///
/// let answer = run_with_threads(1, |_| 42).unwrap();
/// assert_eq!(answer, 42);
/// ```
pub fn run_with_threads<T: Send>(
    n_threads: usize,
    f: impl FnOnce(Parallelism) -> T + Send,
) -> Result<T, ConfigError> {
    let parallelism = Parallelism::from_threads(n_threads);

    match (parallelism, n_threads) {
        (Parallelism::Sequential, _) => Ok(f(Parallelism::Sequential)),
        (Parallelism::Parallel, 0) => Ok(f(Parallelism::Parallel)),
        (Parallelism::Parallel, n) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| ConfigError::ThreadPool {
                    n_threads: n,
                    reason: e.to_string(),
                })?;
            Ok(pool.install(|| f(Parallelism::Parallel)))
        }
    }
}

// =============================================================================
// Seeding
// =============================================================================

/// Derive an independent seed for the tile at `(row, col)`.
///
/// Mixes the coordinates into the global seed with the SplitMix64 finalizer,
/// so neighbouring tiles get decorrelated streams and the result does not
/// depend on the order in which tiles are processed.
#[inline]
pub fn tile_seed(seed: u64, row: usize, col: usize) -> u64 {
    let mut z = seed
        ^ (row as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (col as u64).wrapping_add(1).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_parallelism_from_threads() {
        assert!(!Parallelism::from_threads(1).is_parallel());
        assert!(Parallelism::from_threads(2).is_parallel());
        assert!(Parallelism::from_threads(8).is_parallel());
    }

    #[test]
    fn test_run_with_threads_sequential() {
        let result = run_with_threads(1, |p| (p, 42)).unwrap();
        assert_eq!(result, (Parallelism::Sequential, 42));
    }

    #[test]
    fn test_run_with_threads_explicit() {
        let result = run_with_threads(2, |_| rayon::current_num_threads()).unwrap();
        assert_eq!(result, 2);
    }

    #[test]
    fn test_maybe_par_map_preserves_order() {
        let seq: Vec<_> = Parallelism::Sequential.maybe_par_map(0..100usize, |i| i * 2);
        let par: Vec<_> = Parallelism::Parallel.maybe_par_map(0..100usize, |i| i * 2);
        assert_eq!(seq, par);
        assert_eq!(seq[..5], [0, 2, 4, 6, 8]);
    }

    #[test]
    fn test_tile_seed_distinct_per_tile() {
        let seeds: HashSet<u64> = (0..32)
            .flat_map(|r| (0..32).map(move |c| tile_seed(42, r, c)))
            .collect();
        assert_eq!(seeds.len(), 32 * 32);
    }

    #[test]
    fn test_tile_seed_is_not_symmetric() {
        assert_ne!(tile_seed(7, 1, 2), tile_seed(7, 2, 1));
        assert_eq!(tile_seed(7, 1, 2), tile_seed(7, 1, 2));
        assert_ne!(tile_seed(7, 1, 2), tile_seed(8, 1, 2));
    }
}
