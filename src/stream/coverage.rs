// src/stream/coverage.rs
//! Coverage tracking for out-of-order writes.
//!
//! Offsets are relative to the stream's read origin. Covered ranges are kept
//! as a sorted list of disjoint, non-adjacent half-open intervals, so marking,
//! prefix lookup, and consumption cost O(number of gaps) rather than
//! O(number of bytes).

use std::ops::Range;

/// Set of covered offsets, stored as merged intervals.
///
/// # Example
///
/// ```rust
/// use seqbuf::stream::RangeSet;
///
/// let mut set = RangeSet::new();
/// set.insert(0..5);
/// set.insert(6..8);
/// assert_eq!(set.contiguous_prefix(), 5);
///
/// set.consume(4);
/// assert_eq!(set.ranges().collect::<Vec<_>>(), vec![0..1, 2..4]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeSet {
    ranges: Vec<Range<u64>>,
}

impl RangeSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks every offset in `range` as covered.
    ///
    /// Overlapping or adjacent intervals are merged; marking an already
    /// covered range is a no-op.
    pub fn insert(&mut self, range: Range<u64>) {
        if range.start >= range.end {
            return;
        }

        // First interval that overlaps or touches `range` on the left, and one
        // past the last that overlaps or touches it on the right.
        let first = self.ranges.partition_point(|r| r.end < range.start);
        let last = self.ranges.partition_point(|r| r.start <= range.end);

        if first == last {
            self.ranges.insert(first, range);
            return;
        }

        let start = range.start.min(self.ranges[first].start);
        let end = range.end.max(self.ranges[last - 1].end);
        self.ranges.splice(first..last, std::iter::once(start..end));
    }

    /// Largest `n` such that every offset in `[0, n)` is covered.
    #[inline]
    pub fn contiguous_prefix(&self) -> u64 {
        match self.ranges.first() {
            Some(r) if r.start == 0 => r.end,
            _ => 0,
        }
    }

    /// Removes `[0, n)` and shifts every remaining offset down by `n`.
    ///
    /// The caller must not consume past the covered prefix:
    /// `n <= self.contiguous_prefix()`. Consuming further is a contract
    /// violation and leaves the relative offsets meaningless.
    pub fn consume(&mut self, n: u64) {
        if n == 0 {
            return;
        }
        debug_assert!(n <= self.contiguous_prefix(), "consumed past covered prefix");

        let dropped = self.ranges.partition_point(|r| r.end <= n);
        self.ranges.drain(..dropped);
        for r in self.ranges.iter_mut() {
            r.start = r.start.saturating_sub(n);
            r.end -= n;
        }
    }

    /// Returns `true` if no offset is covered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Total number of covered offsets.
    pub fn covered(&self) -> u64 {
        self.ranges.iter().map(|r| r.end - r.start).sum()
    }

    /// Covered intervals in ascending order.
    pub fn ranges(&self) -> impl Iterator<Item = Range<u64>> + '_ {
        self.ranges.iter().cloned()
    }

    /// Removes every interval.
    pub fn clear(&mut self) {
        self.ranges.clear();
    }
}
