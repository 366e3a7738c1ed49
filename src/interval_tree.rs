use core::fmt;
use core::iter::FusedIterator;

use crate::node_ref::NodeRef;
use crate::raw::{Augment, Handle, RawIter, RawTree};

/// A closed interval `[lo, hi]` over `i64` endpoints.
///
/// Ordered lexicographically by `(lo, hi)`, so two intervals compare equal
/// only when both endpoints match. This composite order is what makes
/// [`IntervalTree::find_exact`] a plain tree search even among intervals
/// sharing a low endpoint.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Interval {
    lo: i64,
    hi: i64,
}

impl Interval {
    /// Creates the closed interval `[lo, hi]`.
    ///
    /// # Panics
    ///
    /// Panics if `lo > hi`.
    #[must_use]
    pub fn new(lo: i64, hi: i64) -> Self {
        assert!(lo <= hi, "`Interval::new()` - `lo` > `hi`!");
        Self { lo, hi }
    }

    /// The low endpoint.
    #[must_use]
    pub const fn lo(self) -> i64 {
        self.lo
    }

    /// The high endpoint.
    #[must_use]
    pub const fn hi(self) -> i64 {
        self.hi
    }

    /// Returns true if the two closed intervals share at least one point:
    /// neither lies entirely before the other.
    ///
    /// # Examples
    ///
    /// ```
    /// use garnet_tree::Interval;
    ///
    /// assert!(Interval::new(0, 5).overlaps(&Interval::new(5, 9)));
    /// assert!(!Interval::new(0, 4).overlaps(&Interval::new(5, 9)));
    /// ```
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        !(self.hi < other.lo) && !(other.hi < self.lo)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lo, self.hi)
    }
}

/// Maximum high endpoint in a subtree; the interval-overlap aggregate.
///
/// The sentinel carries `i64::MIN` as the identity, standing in for
/// negative infinity.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct MaxHi(i64);

impl Augment<Interval> for MaxHi {
    fn identity() -> Self {
        Self(i64::MIN)
    }

    fn recompute(payload: &Interval, left: Self, right: Self) -> Self {
        Self(left.0.max(right.0).max(payload.hi))
    }

    fn on_left_rotation_complete(tree: &mut RawTree<Interval, Self>, new_root: Handle) {
        // Same transfer as the size aggregate: the promoted node covers the
        // demoted node's old subtree, so the old aggregate moves up intact.
        let demoted = tree.node(new_root).left;
        let inherited = tree.aug(demoted);
        tree.set_aug(new_root, inherited);
        tree.recompute_node(demoted);
    }

    fn on_right_rotation_complete(tree: &mut RawTree<Interval, Self>, new_root: Handle) {
        let demoted = tree.node(new_root).right;
        let inherited = tree.aug(demoted);
        tree.set_aug(new_root, inherited);
        tree.recompute_node(demoted);
    }
}

/// An interval tree: a red-black tree of [`Interval`]s, keyed by `(lo, hi)`
/// and augmented with each subtree's maximum high endpoint, answering overlap
/// queries in O(log n).
///
/// Coincident intervals may be stored multiple times.
///
/// # Examples
///
/// ```
/// use garnet_tree::{Interval, IntervalTree};
///
/// let mut bookings = IntervalTree::new();
/// bookings.insert(Interval::new(9, 11));
/// bookings.insert(Interval::new(13, 15));
///
/// // Anything clashing with 10..=13?
/// let clash = bookings.find_overlap(&Interval::new(10, 13)).unwrap();
/// assert!(bookings.get(clash).overlaps(&Interval::new(10, 13)));
///
/// // 16..=18 is free.
/// assert!(bookings.find_overlap(&Interval::new(16, 18)).is_none());
/// ```
pub struct IntervalTree {
    raw: RawTree<Interval, MaxHi>,
}

impl IntervalTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self { raw: RawTree::new() }
    }

    /// Returns the number of intervals in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns true if the tree contains no intervals.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Inserts an interval and returns a handle to its node.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, interval: Interval) -> NodeRef {
        NodeRef(self.raw.insert(interval))
    }

    /// Removes the node behind `node` and returns its interval.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Panics
    ///
    /// May panic if `node` is stale; see [`NodeRef`].
    pub fn remove(&mut self, node: NodeRef) -> Interval {
        self.raw.pop(node.0)
    }

    /// Removes one exact occurrence of `interval`, or returns `None` if no
    /// interval has both the same endpoints.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove_interval(&mut self, interval: &Interval) -> Option<Interval> {
        let handle = self.raw.search(interval);
        (!handle.is_nil()).then(|| self.raw.pop(handle))
    }

    /// Returns the interval behind `node`.
    ///
    /// # Panics
    ///
    /// May panic if `node` is stale; see [`NodeRef`].
    #[must_use]
    pub fn get(&self, node: NodeRef) -> &Interval {
        self.raw.payload(node.0)
    }

    /// Finds *some* stored interval overlapping `query`, with no promise of
    /// which one when several do. Use
    /// [`find_min_overlap`](IntervalTree::find_min_overlap) for the
    /// leftmost match.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn find_overlap(&self, query: &Interval) -> Option<NodeRef> {
        let mut handle = self.raw.root();
        while !handle.is_nil() && !self.raw.payload(handle).overlaps(query) {
            let left = self.raw.node(handle).left;
            // If the left subtree reaches the query at all, an overlap can
            // only be there; otherwise only the right subtree can hold one.
            handle = if self.raw.aug(left).0 >= query.lo {
                left
            } else {
                self.raw.node(handle).right
            };
        }
        (!handle.is_nil()).then(|| NodeRef(handle))
    }

    /// Finds the overlapping interval with the minimum low endpoint, or
    /// `None` if nothing overlaps `query`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use garnet_tree::{Interval, IntervalTree};
    ///
    /// let mut tree = IntervalTree::new();
    /// tree.insert(Interval::new(6, 10));
    /// tree.insert(Interval::new(8, 9));
    ///
    /// let node = tree.find_min_overlap(&Interval::new(9, 17)).unwrap();
    /// assert_eq!(*tree.get(node), Interval::new(6, 10));
    /// ```
    #[must_use]
    pub fn find_min_overlap(&self, query: &Interval) -> Option<NodeRef> {
        let handle = self.min_overlap_in(self.raw.root(), query);
        (!handle.is_nil()).then(|| NodeRef(handle))
    }

    fn min_overlap_in(&self, handle: Handle, query: &Interval) -> Handle {
        if handle.is_nil() {
            return Handle::NIL;
        }
        let node = self.raw.node(handle);
        let overlaps_here = node.payload().overlaps(query);
        if self.raw.aug(node.left).0 >= query.lo {
            // The leftmost overlap, if any exists at all, is in the left
            // subtree or at this node; the right subtree starts at a low
            // endpoint no smaller than this node's.
            let found = self.min_overlap_in(node.left, query);
            if !found.is_nil() {
                found
            } else if overlaps_here {
                handle
            } else {
                Handle::NIL
            }
        } else if overlaps_here {
            handle
        } else {
            self.min_overlap_in(node.right, query)
        }
    }

    /// Finds a stored interval with exactly `query`'s endpoints.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn find_exact(&self, query: &Interval) -> Option<NodeRef> {
        let handle = self.raw.search(query);
        (!handle.is_nil()).then(|| NodeRef(handle))
    }

    /// Lazy iteration in `(lo, hi)` order; call `.rev()` for the reverse.
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            raw: self.raw.iter(),
            tree: &self.raw,
        }
    }

    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        self.raw.check_invariants();
    }
}

impl Default for IntervalTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IntervalTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<Interval> for IntervalTree {
    fn from_iter<I: IntoIterator<Item = Interval>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl Extend<Interval> for IntervalTree {
    fn extend<I: IntoIterator<Item = Interval>>(&mut self, iter: I) {
        for interval in iter {
            self.insert(interval);
        }
    }
}

impl<'a> IntoIterator for &'a IntervalTree {
    type Item = &'a Interval;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Double-ended in-order iterator over an [`IntervalTree`]'s intervals.
pub struct Iter<'a> {
    raw: RawIter<'a, Interval, MaxHi>,
    tree: &'a RawTree<Interval, MaxHi>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Interval;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        self.raw.next().map(|handle| tree.payload(handle))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.raw.size_hint()
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        self.raw.next_back().map(|handle| tree.payload(handle))
    }
}

impl ExactSizeIterator for Iter<'_> {}
impl FusedIterator for Iter<'_> {}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    fn textbook_tree() -> IntervalTree {
        IntervalTree::from_iter([
            Interval::new(16, 21),
            Interval::new(8, 9),
            Interval::new(25, 30),
            Interval::new(5, 8),
            Interval::new(0, 3),
            Interval::new(6, 10),
            Interval::new(15, 23),
            Interval::new(17, 19),
            Interval::new(19, 20),
            Interval::new(26, 26),
        ])
    }

    #[test]
    fn overlap_queries_on_the_textbook_tree() {
        let tree = textbook_tree();
        tree.check_invariants();

        let node = tree.find_exact(&Interval::new(6, 10)).unwrap();
        assert_eq!(*tree.get(node), Interval::new(6, 10));
        assert!(tree.find_exact(&Interval::new(10, 12)).is_none());

        // Any overlap is acceptable from `find_overlap`...
        let node = tree.find_overlap(&Interval::new(9, 17)).unwrap();
        assert!(tree.get(node).overlaps(&Interval::new(9, 17)));
        // ...but `find_min_overlap` must return the leftmost one.
        let node = tree.find_min_overlap(&Interval::new(9, 17)).unwrap();
        assert_eq!(*tree.get(node), Interval::new(6, 10));

        let node = tree.find_min_overlap(&Interval::new(17, 19)).unwrap();
        assert_eq!(*tree.get(node), Interval::new(15, 23));

        // Gaps report nothing.
        assert!(tree.find_overlap(&Interval::new(12, 14)).is_none());
        assert!(tree.find_min_overlap(&Interval::new(12, 14)).is_none());
        assert!(tree.find_overlap(&Interval::new(31, 100)).is_none());
    }

    #[test]
    fn removals_shift_the_minimum_overlap() {
        let mut tree = textbook_tree();

        assert_eq!(tree.remove_interval(&Interval::new(15, 23)), Some(Interval::new(15, 23)));
        tree.check_invariants();
        let node = tree.find_min_overlap(&Interval::new(17, 19)).unwrap();
        assert_eq!(*tree.get(node), Interval::new(16, 21));

        assert_eq!(tree.remove_interval(&Interval::new(0, 3)), Some(Interval::new(0, 3)));
        tree.check_invariants();
        assert!(tree.find_overlap(&Interval::new(0, 3)).is_none());
        assert!(tree.find_min_overlap(&Interval::new(0, 3)).is_none());

        assert_eq!(tree.remove_interval(&Interval::new(0, 3)), None);
        assert_eq!(tree.len(), 8);
    }

    #[test]
    fn iteration_is_sorted_by_lo_then_hi() {
        let tree = textbook_tree();
        let intervals: Vec<Interval> = tree.iter().copied().collect();
        let mut sorted = intervals.clone();
        sorted.sort();
        assert_eq!(intervals, sorted);
        assert_eq!(intervals[0], Interval::new(0, 3));
        assert_eq!(intervals[9], Interval::new(26, 26));
    }

    #[test]
    #[should_panic(expected = "`Interval::new()` - `lo` > `hi`!")]
    fn backwards_interval_is_rejected() {
        let _ = Interval::new(3, 0);
    }

    fn interval_strategy() -> impl Strategy<Value = Interval> {
        (0i64..100, 0i64..20).prop_map(|(lo, width)| Interval::new(lo, lo + width))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Overlap queries must agree with a brute-force scan at every step
        /// of a random insert/remove interleaving.
        #[test]
        fn queries_match_brute_force(
            ops in prop::collection::vec((any::<bool>(), interval_strategy()), 0..64),
            queries in prop::collection::vec(interval_strategy(), 8),
        ) {
            let mut tree = IntervalTree::new();
            let mut model: Vec<Interval> = Vec::new();

            for (is_delete, interval) in ops {
                if is_delete {
                    let removed = tree.remove_interval(&interval);
                    match model.iter().position(|i| *i == interval) {
                        Some(index) => {
                            model.swap_remove(index);
                            prop_assert_eq!(removed, Some(interval));
                        }
                        None => prop_assert_eq!(removed, None),
                    }
                } else {
                    tree.insert(interval);
                    model.push(interval);
                }
                tree.check_invariants();

                for query in &queries {
                    let expected_min = model.iter().filter(|i| i.overlaps(query)).min().copied();
                    let found_any = tree.find_overlap(query).map(|n| *tree.get(n));
                    let found_min = tree.find_min_overlap(query).map(|n| *tree.get(n));

                    // Same emptiness, and any reported overlap is genuine.
                    prop_assert_eq!(found_any.is_some(), expected_min.is_some());
                    if let Some(found) = found_any {
                        prop_assert!(found.overlaps(query));
                    }
                    // The minimum query is exact on the low endpoint.
                    prop_assert_eq!(found_min.map(|i| i.lo()), expected_min.map(|i| i.lo()));
                }
            }
        }
    }
}
