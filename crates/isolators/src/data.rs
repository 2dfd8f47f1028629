//! Feature access for tree traversal.
//!
//! [`SampleAccessor`] is implemented for plain slices, arrays, vectors and
//! ndarray 1-d arrays/views, so any of them can be scored without copying.
//!
//! ```
//! use isolators::data::SampleAccessor;
//!
//! let features: &[f64] = &[0.5, 1.2, 3.4];
//! assert_eq!(features.feature(1), 1.2);
//! assert_eq!(features.n_features(), 3);
//! ```

use ndarray::{Array1, ArrayView1};

/// Access features for a single observation (one frame of one tile).
pub trait SampleAccessor {
    /// Get the feature value at the given index.
    fn feature(&self, index: usize) -> f64;

    /// Number of features in this sample.
    fn n_features(&self) -> usize;
}

impl SampleAccessor for [f64] {
    #[inline]
    fn feature(&self, index: usize) -> f64 {
        self[index]
    }

    #[inline]
    fn n_features(&self) -> usize {
        self.len()
    }
}

impl<const N: usize> SampleAccessor for [f64; N] {
    #[inline]
    fn feature(&self, index: usize) -> f64 {
        self[index]
    }

    #[inline]
    fn n_features(&self) -> usize {
        N
    }
}

impl SampleAccessor for Vec<f64> {
    #[inline]
    fn feature(&self, index: usize) -> f64 {
        self[index]
    }

    #[inline]
    fn n_features(&self) -> usize {
        self.len()
    }
}

impl<T: SampleAccessor + ?Sized> SampleAccessor for &T {
    #[inline]
    fn feature(&self, index: usize) -> f64 {
        (**self).feature(index)
    }

    #[inline]
    fn n_features(&self) -> usize {
        (**self).n_features()
    }
}

// May be strided, e.g. a row of a column-major view.
impl SampleAccessor for ArrayView1<'_, f64> {
    #[inline]
    fn feature(&self, index: usize) -> f64 {
        self[index]
    }

    #[inline]
    fn n_features(&self) -> usize {
        self.len()
    }
}

impl SampleAccessor for Array1<f64> {
    #[inline]
    fn feature(&self, index: usize) -> f64 {
        self[index]
    }

    #[inline]
    fn n_features(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn first_and_len<S: SampleAccessor + ?Sized>(s: &S) -> (f64, usize) {
        (s.feature(0), s.n_features())
    }

    #[test]
    fn accessors_agree() {
        let v = vec![1.0, 2.0, 3.0];
        let a = [1.0, 2.0, 3.0];
        let arr = array![1.0, 2.0, 3.0];

        assert_eq!(first_and_len(&v[..]), (1.0, 3));
        assert_eq!(first_and_len(&v), (1.0, 3));
        assert_eq!(first_and_len(&a), (1.0, 3));
        assert_eq!(first_and_len(&arr), (1.0, 3));
        assert_eq!(first_and_len(&arr.view()), (1.0, 3));
    }

    #[test]
    fn strided_view() {
        let m = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let col = m.column(1);
        assert_eq!(col.n_features(), 3);
        assert_eq!(col.feature(2), 6.0);
    }
}
