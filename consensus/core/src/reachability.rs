use crate::Hash;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Integer domain of reachability intervals
pub type IntervalBound = u64;

/// A half-open interval `[start, end)` of the reachability index.
///
/// Every node of the selected-parent tree owns one. A node's interval contains
/// the intervals of its whole subtree, which turns chain ancestry into a pair of
/// integer comparisons.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub struct Interval {
    pub start: IntervalBound,
    pub end: IntervalBound,
}

impl Display for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

impl Interval {
    pub fn new(start: IntervalBound, end: IntervalBound) -> Self {
        debug_assert!(start <= end);
        Interval { start, end }
    }

    /// An empty interval anchored at `at`
    pub fn empty_at(at: IntervalBound) -> Self {
        Self::new(at, at)
    }

    pub fn size(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns true if `other` lies within `self` (an interval contains itself)
    pub fn contains(&self, other: Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Containment which additionally requires `other` to end before `self`.
    /// Children are always allocated from [`Interval::children_capacity`], so a
    /// node's interval strictly contains every interval in its subtree.
    pub fn strictly_contains(&self, other: Self) -> bool {
        self.start <= other.start && other.end < self.end
    }

    /// The part of the interval available to children. The last slot is kept
    /// by the node itself.
    pub fn children_capacity(&self) -> Self {
        if self.is_empty() {
            *self
        } else {
            Self::new(self.start, self.end - 1)
        }
    }

    /// Splits the interval into two halves, the left one taking the extra slot of an odd size
    pub fn split_half(&self) -> (Self, Self) {
        let left_size = self.size().div_ceil(2);
        let mid = self.start + left_size;
        (Self::new(self.start, mid), Self::new(mid, self.end))
    }

    /// Splits the interval into consecutive intervals of exactly the given sizes.
    /// The sizes must add up to the interval size.
    pub fn split_exact(&self, sizes: &[u64]) -> Vec<Self> {
        debug_assert_eq!(sizes.iter().sum::<u64>(), self.size(), "sizes must sum to the interval size");
        let mut start = self.start;
        sizes
            .iter()
            .map(|size| {
                let interval = Self::new(start, start + size);
                start += size;
                interval
            })
            .collect()
    }

    /// Splits the interval into consecutive intervals where each one is at least
    /// as large as its requested size, and the slack is distributed with weights
    /// that grow exponentially with the requested size. Larger subtrees are the
    /// likelier to keep growing, so they receive most of the room.
    ///
    /// Computation is integer only: the weight of a size is `2^(63 - d)` where `d`
    /// is its distance from the largest requested size (saturated at 63).
    pub fn split_exponential(&self, sizes: &[u64]) -> Vec<Self> {
        let interval_size = self.size();
        let sizes_sum: u64 = sizes.iter().sum();
        debug_assert!(interval_size >= sizes_sum, "interval must be able to contain the requested sizes");
        if interval_size == sizes_sum || sizes.is_empty() {
            return self.split_exact(sizes);
        }

        let remaining = (interval_size - sizes_sum) as u128;
        let max_size = sizes.iter().copied().max().unwrap_or_default();
        let weights: Vec<u128> = sizes.iter().map(|&size| 1u128 << (63 - (max_size - size).min(63))).collect();
        let weights_sum: u128 = weights.iter().sum();

        let mut biased_sizes = Vec::with_capacity(sizes.len());
        let mut distributed = 0u128;
        for (i, (&size, &weight)) in sizes.iter().zip(weights.iter()).enumerate() {
            let bias = if i == sizes.len() - 1 { remaining - distributed } else { remaining * weight / weights_sum };
            distributed += bias;
            biased_sizes.push(size + bias as u64);
        }
        self.split_exact(&biased_sizes)
    }
}

/// The reachability record of a block: its place in the selected-parent tree
/// and its future covering set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReachabilityData {
    /// Tree parent (the selected parent), absent for the root
    pub parent: Option<Hash>,
    pub interval: Interval,
    pub height: u64,
    /// Tree children in insertion order, which is also interval order
    pub children: Vec<Hash>,
    /// Blocks in this block's future that are not in the subtree of another
    /// member, sorted by interval start
    pub future_covering_set: Vec<Hash>,
}

impl ReachabilityData {
    pub fn new(parent: Option<Hash>, interval: Interval, height: u64) -> Self {
        Self { parent, interval, height, children: Vec::new(), future_covering_set: Vec::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_containment() {
        let outer = Interval::new(1, 100);
        assert!(outer.contains(outer));
        assert!(!outer.strictly_contains(outer));
        assert!(outer.strictly_contains(Interval::new(1, 99)));
        assert!(outer.contains(Interval::new(10, 100)));
        assert!(!outer.strictly_contains(Interval::new(10, 100)));
        assert!(!Interval::new(5, 10).contains(Interval::new(9, 11)));
    }

    #[test]
    fn test_children_capacity_reserves_last_slot() {
        let interval = Interval::new(1, 11);
        assert_eq!(interval.children_capacity(), Interval::new(1, 10));
        assert!(interval.strictly_contains(interval.children_capacity()));
        assert!(Interval::empty_at(4).children_capacity().is_empty());
    }

    #[test]
    fn test_split_half() {
        let (left, right) = Interval::new(1, 12).split_half();
        assert_eq!(left, Interval::new(1, 7));
        assert_eq!(right, Interval::new(7, 12));
        let (left, right) = Interval::new(3, 4).split_half();
        assert_eq!((left.size(), right.size()), (1, 0));
    }

    #[test]
    fn test_split_exact() {
        let parts = Interval::new(10, 20).split_exact(&[2, 0, 8]);
        assert_eq!(parts, vec![Interval::new(10, 12), Interval::new(12, 12), Interval::new(12, 20)]);
    }

    #[test]
    fn test_split_exponential() {
        let interval = Interval::new(0, 100);
        let parts = interval.split_exponential(&[10, 1, 2]);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts.iter().map(|p| p.size()).sum::<u64>(), 100);
        for (part, size) in parts.iter().zip([10u64, 1, 2]) {
            assert!(part.size() >= size);
        }
        // the largest subtree receives most of the slack
        assert!(parts[0].size() > 80);
        // intervals are consecutive
        assert_eq!(parts[0].end, parts[1].start);
        assert_eq!(parts[1].end, parts[2].start);
        assert_eq!(parts[2].end, 100);

        let exact = Interval::new(0, 3).split_exponential(&[1, 2]);
        assert_eq!(exact, vec![Interval::new(0, 1), Interval::new(1, 3)]);
    }
}
