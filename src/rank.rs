/// A 1-based rank into the sorted order of a tree.
///
/// `Rank(1)` is the smallest element. Ranks are 1-based to match the usual
/// statement of the selection problem ("the i-th order statistic").
///
/// # Examples
///
/// ```
/// use garnet_tree::{OsTree, Rank};
///
/// let mut tree = OsTree::new();
/// tree.insert(30);
/// tree.insert(10);
/// tree.insert(20);
///
/// assert_eq!(tree[Rank(1)], 10);
/// assert_eq!(tree[Rank(3)], 30);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Rank(pub usize);
