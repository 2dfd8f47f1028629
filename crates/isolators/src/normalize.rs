//! Expected path length normalization.
//!
//! `c(n)` is the average path length of an unsuccessful search in a binary
//! search tree over `n` points. It serves two purposes:
//!
//! - correction added at a leaf that still holds `n` observations, and
//! - denominator turning a mean path length into a score in `[0, 1]`.

/// Euler–Mascheroni constant, truncated to the precision the scores are defined with.
pub const EULER_GAMMA: f64 = 0.5772156649;

/// Expected path length `c(n)` of a random partition tree over `n` observations.
///
/// - `n > 2`: `2 * (ln(n - 1) + γ) - 2 * (n - 1) / n`
/// - `n == 2`: `1`
/// - `n < 2`: `0`
///
/// # Example
///
/// ```
/// use isolators::normalize::average_path_length;
///
/// assert_eq!(average_path_length(1), 0.0);
/// assert_eq!(average_path_length(2), 1.0);
/// assert!((average_path_length(1000) - 12.96994).abs() < 1e-5);
/// ```
#[inline]
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}
