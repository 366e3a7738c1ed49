use core::cmp::Ordering;
use core::fmt;
use core::iter::FusedIterator;
use core::ops::Index;

use crate::node_ref::NodeRef;
use crate::rank::Rank;
use crate::raw::{Augment, Handle, RawIter, RawTree};

/// Subtree node count; the order-statistics aggregate.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct SubtreeSize(usize);

impl<T: Ord> Augment<T> for SubtreeSize {
    fn identity() -> Self {
        Self(0)
    }

    fn recompute(_payload: &T, left: Self, right: Self) -> Self {
        Self(left.0 + right.0 + 1)
    }

    fn on_left_rotation_complete(tree: &mut RawTree<T, Self>, new_root: Handle) {
        // The promoted node now covers exactly the demoted node's old
        // subtree, so it inherits that aggregate wholesale; only the demoted
        // node needs a local recompute.
        let demoted = tree.node(new_root).left;
        let inherited = tree.aug(demoted);
        tree.set_aug(new_root, inherited);
        tree.recompute_node(demoted);
    }

    fn on_right_rotation_complete(tree: &mut RawTree<T, Self>, new_root: Handle) {
        let demoted = tree.node(new_root).right;
        let inherited = tree.aug(demoted);
        tree.set_aug(new_root, inherited);
        tree.recompute_node(demoted);
    }
}

/// An order-statistics tree: a red-black tree of values with O(log n)
/// [`select`](OsTree::select) and [`rank`](OsTree::rank) queries.
///
/// Values only need a [total order]; equal values may be stored multiple
/// times and are kept adjacent in iteration order. Use
/// [`find`](OsTree::find) before inserting to enforce uniqueness.
///
/// It is a logic error for a value to be mutated in such a way that its
/// ordering relative to any other value changes while it is in the tree.
///
/// # Examples
///
/// ```
/// use garnet_tree::OsTree;
///
/// let mut latencies = OsTree::new();
/// for sample in [12, 7, 93, 7, 41, 20] {
///     latencies.insert(sample);
/// }
///
/// // The median (3rd of 6 values, 1-based).
/// let median = latencies.select(3).unwrap();
/// assert_eq!(*latencies.get(median), 12);
///
/// // Where does a known sample sit?
/// assert_eq!(latencies.rank_of_value(&41), Some(5));
/// ```
///
/// [total order]: core::cmp::Ord
pub struct OsTree<T: Ord> {
    raw: RawTree<T, SubtreeSize>,
}

impl<T: Ord> OsTree<T> {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self { raw: RawTree::new() }
    }

    /// Returns the number of values in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns true if the tree contains no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Inserts a value and returns a handle to its node.
    ///
    /// Duplicates are accepted; an equal value is placed immediately before
    /// existing ones in iteration order.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, value: T) -> NodeRef {
        NodeRef(self.raw.insert(value))
    }

    /// Removes the node behind `node` and returns its value.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Panics
    ///
    /// May panic if `node` is stale (its value was already removed); see
    /// [`NodeRef`].
    pub fn remove(&mut self, node: NodeRef) -> T {
        self.raw.pop(node.0)
    }

    /// Removes one occurrence of `value`, returning it, or `None` if absent.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove_value(&mut self, value: &T) -> Option<T> {
        let handle = self.raw.search(value);
        (!handle.is_nil()).then(|| self.raw.pop(handle))
    }

    /// Returns the value behind `node`.
    ///
    /// # Panics
    ///
    /// May panic if `node` is stale; see [`NodeRef`].
    #[must_use]
    pub fn get(&self, node: NodeRef) -> &T {
        self.raw.payload(node.0)
    }

    /// Finds a node holding a value equal to `value`.
    ///
    /// Among duplicates, returns the one closest to the root.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn find(&self, value: &T) -> Option<NodeRef> {
        let handle = self.raw.search(value);
        (!handle.is_nil()).then(|| NodeRef(handle))
    }

    /// Returns true if the tree holds a value equal to `value`.
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        self.find(value).is_some()
    }

    /// Returns the smallest value, or `None` if the tree is empty.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        (!self.is_empty()).then(|| self.raw.payload(self.raw.min(self.raw.root())))
    }

    /// Returns the largest value, or `None` if the tree is empty.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        (!self.is_empty()).then(|| self.raw.payload(self.raw.max(self.raw.root())))
    }

    /// Returns the node at the 1-based `rank` in sorted order, or `None` if
    /// `rank` is zero or exceeds [`len`](OsTree::len).
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use garnet_tree::OsTree;
    ///
    /// let mut tree = OsTree::new();
    /// tree.insert(10);
    /// tree.insert(30);
    /// tree.insert(20);
    ///
    /// let second = tree.select(2).unwrap();
    /// assert_eq!(*tree.get(second), 20);
    /// assert!(tree.select(0).is_none());
    /// assert!(tree.select(4).is_none());
    /// ```
    #[must_use]
    pub fn select(&self, rank: usize) -> Option<NodeRef> {
        if rank == 0 || rank > self.len() {
            return None;
        }
        let mut handle = self.raw.root();
        let mut rank = rank;
        loop {
            let left = self.raw.node(handle).left;
            let left_size = self.raw.aug(left).0;
            match rank.cmp(&(left_size + 1)) {
                Ordering::Equal => return Some(NodeRef(handle)),
                Ordering::Less => handle = left,
                Ordering::Greater => {
                    rank -= left_size + 1;
                    handle = self.raw.node(handle).right;
                }
            }
        }
    }

    /// Returns the 1-based rank of `node` in sorted order.
    ///
    /// Inverse of [`select`](OsTree::select): `tree.rank(tree.select(i)?) == i`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Panics
    ///
    /// May panic if `node` is stale; see [`NodeRef`].
    #[must_use]
    pub fn rank(&self, node: NodeRef) -> usize {
        let mut handle = node.0;
        let mut rank = self.raw.aug(self.raw.node(handle).left).0 + 1;
        while handle != self.raw.root() {
            let parent = self.raw.node(handle).parent;
            if handle == self.raw.node(parent).right {
                rank += self.raw.aug(self.raw.node(parent).left).0 + 1;
            }
            handle = parent;
        }
        rank
    }

    /// Returns the 1-based rank of a value equal to `value` (the same node
    /// [`find`](OsTree::find) would return), or `None` if absent.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn rank_of_value(&self, value: &T) -> Option<usize> {
        self.rank_in(self.raw.root(), value)
    }

    fn rank_in(&self, handle: Handle, value: &T) -> Option<usize> {
        if handle.is_nil() {
            return None;
        }
        let node = self.raw.node(handle);
        let left_size = self.raw.aug(node.left).0;
        match value.cmp(node.payload()) {
            Ordering::Equal => Some(left_size + 1),
            Ordering::Less => self.rank_in(node.left, value),
            Ordering::Greater => self.rank_in(node.right, value).map(|rank| left_size + 1 + rank),
        }
    }

    /// Lazy ascending iteration; call `.rev()` for descending.
    ///
    /// The iterator borrows the tree, so the tree cannot be mutated while it
    /// is alive.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
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

impl<T: Ord> Default for OsTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord + fmt::Debug> fmt::Debug for OsTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: Ord> FromIterator<T> for OsTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<T: Ord> Extend<T> for OsTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T: Ord> IntoIterator for &'a OsTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Indexes the tree by 1-based [`Rank`].
///
/// # Panics
///
/// Panics if the rank is zero or out of bounds.
///
/// # Examples
///
/// ```
/// use garnet_tree::{OsTree, Rank};
///
/// let tree = OsTree::from_iter([5, 1, 3]);
/// assert_eq!(tree[Rank(2)], 3);
/// ```
impl<T: Ord> Index<Rank> for OsTree<T> {
    type Output = T;

    fn index(&self, rank: Rank) -> &Self::Output {
        self.select(rank.0).map(|node| self.get(node)).expect("rank out of bounds")
    }
}

/// Double-ended in-order iterator over an [`OsTree`]'s values.
pub struct Iter<'a, T: Ord> {
    raw: RawIter<'a, T, SubtreeSize>,
    tree: &'a RawTree<T, SubtreeSize>,
}

impl<'a, T: Ord> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        self.raw.next().map(|handle| tree.payload(handle))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.raw.size_hint()
    }
}

impl<T: Ord> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        self.raw.next_back().map(|handle| tree.payload(handle))
    }
}

impl<T: Ord> ExactSizeIterator for Iter<'_, T> {}
impl<T: Ord> FusedIterator for Iter<'_, T> {}
