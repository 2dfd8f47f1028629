//! Row partitioning for tree building.
//!
//! Rows of a node occupy a contiguous range of one shared position list:
//!
//! ```text
//! positions: [rows of node a...][rows of node b...][rows of node c...]
//! ```
//!
//! Splitting a node partitions its range in place (left rows first) and the
//! two halves become the ranges of its children, so a tree over `n` rows
//! needs a single `n`-element buffer.

use std::ops::Range;

/// Row partitioner using a contiguous position list.
#[derive(Debug, Clone)]
pub struct RowPartitioner {
    positions: Vec<u32>,
}

impl RowPartitioner {
    /// Create a partitioner over rows `0..num_rows`.
    pub fn new(num_rows: usize) -> Self {
        Self {
            positions: (0..num_rows as u32).collect(),
        }
    }

    /// Row indices in `range`.
    #[inline]
    pub fn rows(&self, range: Range<usize>) -> &[u32] {
        &self.positions[range]
    }

    /// Partition the rows in `range` so that rows satisfying `goes_left` come first.
    ///
    /// Returns `(left_range, right_range)`; either may be empty.
    pub fn split(
        &mut self,
        range: Range<usize>,
        goes_left: impl Fn(u32) -> bool,
    ) -> (Range<usize>, Range<usize>) {
        let start = range.start;
        let end = range.end;
        let mid = start + partition_in_place(&mut self.positions[range], goes_left);
        (start..mid, mid..end)
    }
}

/// Two-pointer partition: `[0..left)` holds left rows, `[right..len)` right rows.
///
/// Returns the number of rows going left.
fn partition_in_place(rows: &mut [u32], goes_left: impl Fn(u32) -> bool) -> usize {
    let mut left = 0;
    let mut right = rows.len();

    while left < right {
        if goes_left(rows[left]) {
            left += 1;
        } else {
            right -= 1;
            rows.swap(left, right);
        }
    }

    left
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_partitioner() {
        let p = RowPartitioner::new(5);
        assert_eq!(p.rows(0..5), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_split_basic() {
        let mut p = RowPartitioner::new(6);
        let (left, right) = p.split(0..6, |r| r % 2 == 0);
        assert_eq!(left, 0..3);
        assert_eq!(right, 3..6);
        assert!(p.rows(left).iter().all(|r| r % 2 == 0));
        assert!(p.rows(right).iter().all(|r| r % 2 == 1));
    }

    #[test]
    fn test_split_one_sided() {
        let mut p = RowPartitioner::new(4);
        let (left, right) = p.split(0..4, |_| true);
        assert_eq!((left.len(), right.len()), (4, 0));
        let (left, right) = p.split(0..4, |_| false);
        assert_eq!((left.len(), right.len()), (0, 4));
    }

    #[test]
    fn test_nested_splits_keep_all_rows() {
        let mut p = RowPartitioner::new(10);
        let (left, right) = p.split(0..10, |r| r < 7);
        let (ll, lr) = p.split(left, |r| r < 3);
        let (rl, rr) = p.split(right, |r| r < 9);

        let mut seen: Vec<u32> = [ll, lr, rl, rr]
            .into_iter()
            .flat_map(|range| p.rows(range).to_vec())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
    }
}
