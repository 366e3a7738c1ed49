use core::iter::FusedIterator;

use super::arena::Arena;
use super::augment::Augment;
use super::handle::Handle;
use super::node::{Color, Node};

/// The red-black balancing engine shared by both specializations.
///
/// All nodes live in an arena and link to each other through [`Handle`]s.
/// Slot 0 holds the shared sentinel: a genuine black node with no payload and
/// the aggregate's identity value, standing for every empty subtree and for
/// "no parent". Its left/right links are never written; its parent link is
/// scratch space that [`transplant`](RawTree::transplant) is allowed to set so
/// deletion fixup can start walking upward from an empty `fix_from`.
///
/// Equal payloads are inserted to the LEFT of existing ones, so in-order
/// iteration yields duplicates in reverse insertion order. The engine does
/// not reject duplicates; a caller wanting uniqueness searches first.
pub(crate) struct RawTree<P, A: Augment<P>> {
    nodes: Arena<Node<P, A>>,
    root: Handle,
    len: usize,
    /// Black height of the root, maintained incrementally by the fixups and
    /// cross-checked against a full recount by the test-mode checker.
    black_height: usize,
}

impl<P, A: Augment<P>> RawTree<P, A> {
    pub(crate) fn new() -> Self {
        let mut nodes = Arena::new();
        let sentinel = nodes.alloc(Node::sentinel(A::identity()));
        debug_assert!(sentinel.is_nil());
        Self {
            nodes,
            root: Handle::NIL,
            len: 0,
            black_height: 0,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) const fn root(&self) -> Handle {
        self.root
    }

    #[inline]
    pub(crate) fn node(&self, handle: Handle) -> &Node<P, A> {
        self.nodes.get(handle)
    }

    #[inline]
    fn node_mut(&mut self, handle: Handle) -> &mut Node<P, A> {
        self.nodes.get_mut(handle)
    }

    /// Returns the payload of a live, non-sentinel node.
    #[inline]
    pub(crate) fn payload(&self, handle: Handle) -> &P {
        self.node(handle).payload()
    }

    #[inline]
    pub(crate) fn aug(&self, handle: Handle) -> A {
        self.node(handle).aug
    }

    #[inline]
    pub(crate) fn set_aug(&mut self, handle: Handle, aug: A) {
        debug_assert!(!handle.is_nil());
        self.node_mut(handle).aug = aug;
    }

    #[inline]
    fn color(&self, handle: Handle) -> Color {
        self.node(handle).color()
    }

    #[inline]
    fn parent(&self, handle: Handle) -> Handle {
        self.node(handle).parent
    }

    /// Reapplies the aggregate rule at one node, from its children.
    pub(crate) fn recompute_node(&mut self, handle: Handle) {
        debug_assert!(!handle.is_nil());
        let (left, right) = {
            let node = self.node(handle);
            (node.left, node.right)
        };
        let left_aug = self.aug(left);
        let right_aug = self.aug(right);
        let node = self.node_mut(handle);
        let aug = A::recompute(node.payload(), left_aug, right_aug);
        node.aug = aug;
    }

    /// Reapplies the aggregate rule from `handle` up to the root.
    ///
    /// Called after every insertion/deletion splice, before color fixup, so
    /// rotations never read stale aggregates.
    fn update_upward(&mut self, mut handle: Handle) {
        while !handle.is_nil() {
            self.recompute_node(handle);
            handle = self.parent(handle);
        }
    }

    // ─── Structural primitives ──────────────────────────────────────────────

    /// Minimum of the subtree rooted at `handle`.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is the sentinel (empty subtree).
    pub(crate) fn min(&self, mut handle: Handle) -> Handle {
        assert!(!handle.is_nil(), "`RawTree::min()` - empty subtree!");
        while !self.node(handle).left.is_nil() {
            handle = self.node(handle).left;
        }
        handle
    }

    /// Maximum of the subtree rooted at `handle`.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is the sentinel (empty subtree).
    pub(crate) fn max(&self, mut handle: Handle) -> Handle {
        assert!(!handle.is_nil(), "`RawTree::max()` - empty subtree!");
        while !self.node(handle).right.is_nil() {
            handle = self.node(handle).right;
        }
        handle
    }

    /// In-order successor, or the sentinel if `handle` is the maximum.
    pub(crate) fn successor(&self, mut handle: Handle) -> Handle {
        let right = self.node(handle).right;
        if !right.is_nil() {
            return self.min(right);
        }
        while !handle.is_nil() {
            let parent = self.parent(handle);
            if !parent.is_nil() && handle == self.node(parent).left {
                return parent;
            }
            handle = parent;
        }
        Handle::NIL
    }

    /// In-order predecessor, or the sentinel if `handle` is the minimum.
    pub(crate) fn predecessor(&self, mut handle: Handle) -> Handle {
        let left = self.node(handle).left;
        if !left.is_nil() {
            return self.max(left);
        }
        while !handle.is_nil() {
            let parent = self.parent(handle);
            if !parent.is_nil() && handle == self.node(parent).right {
                return parent;
            }
            handle = parent;
        }
        Handle::NIL
    }

    /// Promotes `node`'s right child above it, then runs the left-rotation
    /// hook on the promoted node so the caller never observes a rotated but
    /// unaugmented subtree.
    fn rotate_left(&mut self, node: Handle) {
        let promoted = self.node(node).right;
        let parent = self.parent(node);
        self.node_mut(promoted).parent = parent;
        if !parent.is_nil() {
            if node == self.node(parent).left {
                self.node_mut(parent).left = promoted;
            } else {
                self.node_mut(parent).right = promoted;
            }
        }
        self.node_mut(node).parent = promoted;
        let inner = self.node(promoted).left;
        self.node_mut(node).right = inner;
        self.node_mut(inner).parent = node;
        self.node_mut(promoted).left = node;
        if node == self.root {
            self.root = promoted;
        }
        A::on_left_rotation_complete(self, promoted);
    }

    /// Mirror of [`rotate_left`](RawTree::rotate_left).
    fn rotate_right(&mut self, node: Handle) {
        let promoted = self.node(node).left;
        let parent = self.parent(node);
        self.node_mut(promoted).parent = parent;
        if !parent.is_nil() {
            if node == self.node(parent).left {
                self.node_mut(parent).left = promoted;
            } else {
                self.node_mut(parent).right = promoted;
            }
        }
        self.node_mut(node).parent = promoted;
        let inner = self.node(promoted).right;
        self.node_mut(node).left = inner;
        self.node_mut(inner).parent = node;
        self.node_mut(promoted).right = node;
        if node == self.root {
            self.root = promoted;
        }
        A::on_right_rotation_complete(self, promoted);
    }

    /// Replaces the subtree rooted at `u` with the one rooted at `v`.
    ///
    /// `v`'s parent link is set unconditionally, even when `v` is the
    /// sentinel; deletion fixup relies on that to find its starting parent.
    fn transplant(&mut self, u: Handle, v: Handle) {
        let parent = self.parent(u);
        if u == self.root {
            self.root = v;
        } else if u == self.node(parent).left {
            self.node_mut(parent).left = v;
        } else {
            self.node_mut(parent).right = v;
        }
        self.node_mut(v).parent = parent;
    }

    // ─── Insertion ──────────────────────────────────────────────────────────

    /// Inserts a payload, restoring all invariants. Returns the new node.
    pub(crate) fn insert(&mut self, payload: P) -> Handle
    where
        P: Ord,
    {
        let node = self.insert_raw(payload);
        // Seed the new node's aggregate and refresh its ancestors eagerly;
        // fixup's rotations keep them correct through the hooks.
        self.update_upward(node);
        self.insert_fixup(node);
        self.len += 1;
        node
    }

    /// Splices a new red node in as a leaf, without rebalancing.
    fn insert_raw(&mut self, payload: P) -> Handle
    where
        P: Ord,
    {
        let mut cursor = self.root;
        let mut parent = Handle::NIL;
        while !cursor.is_nil() {
            parent = cursor;
            // Ties descend LEFT.
            cursor = if payload <= *self.payload(cursor) {
                self.node(cursor).left
            } else {
                self.node(cursor).right
            };
        }

        let node = self.nodes.alloc(Node::new(payload, A::identity()));
        self.node_mut(node).parent = parent;
        if parent.is_nil() {
            self.root = node;
        } else if *self.payload(node) <= *self.payload(parent) {
            self.node_mut(parent).left = node;
        } else {
            self.node_mut(parent).right = node;
        }
        node
    }

    /// Restores the red-black invariants after [`insert_raw`](RawTree::insert_raw).
    ///
    /// Loop invariant: at most one red-red violation exists, between `node`
    /// and its parent. The parent being red implies a (black) grandparent.
    fn insert_fixup(&mut self, mut node: Handle) {
        while self.color(self.parent(node)) == Color::Red {
            let parent = self.parent(node);
            let gparent = self.parent(parent);
            if parent == self.node(gparent).left {
                let uncle = self.node(gparent).right;
                if self.color(uncle) == Color::Red {
                    // Case 1: red uncle. Recolor and move the violation up.
                    self.node_mut(parent).set_color(Color::Black);
                    self.node_mut(uncle).set_color(Color::Black);
                    self.node_mut(gparent).set_color(Color::Red);
                    node = gparent;
                } else {
                    if node == self.node(parent).right {
                        // Case 2: inner grandchild. Rotate into Case 3.
                        node = parent;
                        self.rotate_left(node);
                    }
                    // Case 3: outer grandchild. Recolor and rotate the
                    // grandparent; the loop condition then fails.
                    let parent = self.parent(node);
                    let gparent = self.parent(parent);
                    self.node_mut(parent).set_color(Color::Black);
                    self.node_mut(gparent).set_color(Color::Red);
                    self.rotate_right(gparent);
                }
            } else {
                // Mirror image of the block above.
                let uncle = self.node(gparent).left;
                if self.color(uncle) == Color::Red {
                    self.node_mut(parent).set_color(Color::Black);
                    self.node_mut(uncle).set_color(Color::Black);
                    self.node_mut(gparent).set_color(Color::Red);
                    node = gparent;
                } else {
                    if node == self.node(parent).left {
                        node = parent;
                        self.rotate_right(node);
                    }
                    let parent = self.parent(node);
                    let gparent = self.parent(parent);
                    self.node_mut(parent).set_color(Color::Black);
                    self.node_mut(gparent).set_color(Color::Red);
                    self.rotate_left(gparent);
                }
            }
        }

        if self.color(self.root) == Color::Red {
            self.black_height += 1;
            let root = self.root;
            self.node_mut(root).set_color(Color::Black);
        }
    }

    // ─── Deletion ───────────────────────────────────────────────────────────

    /// Detaches `node` from the tree, restoring all invariants, and returns
    /// its payload. The freed slot is recycled; any outstanding handle to it
    /// is invalidated.
    ///
    /// Precondition: `node` is live and reachable in this tree.
    pub(crate) fn pop(&mut self, node: Handle) -> P {
        let (removed_color, fix_from) = self.pop_raw(node);
        // `fix_from` may be the sentinel, whose parent link `transplant` set
        // to the splice point.
        let start = if fix_from.is_nil() { self.parent(fix_from) } else { fix_from };
        self.update_upward(start);
        if removed_color == Color::Black {
            self.pop_fixup(fix_from);
        }
        self.len -= 1;
        self.nodes.take(node).into_payload()
    }

    /// Splices `node` out without rebalancing.
    ///
    /// Returns the color that left the tree (the removed node's, or the
    /// relocated successor's original color) and the node from which fixup
    /// must start.
    fn pop_raw(&mut self, node: Handle) -> (Color, Handle) {
        let mut removed_color = self.color(node);
        let fix_from;
        let left = self.node(node).left;
        let right = self.node(node).right;
        if left.is_nil() {
            fix_from = right;
            self.transplant(node, right);
        } else if right.is_nil() {
            fix_from = left;
            self.transplant(node, left);
        } else {
            // Splice the successor out of its own position, then into
            // `node`'s, inheriting `node`'s color and left subtree.
            let succ = self.min(right);
            removed_color = self.color(succ);
            fix_from = self.node(succ).right;
            if self.parent(succ) == node {
                self.node_mut(fix_from).parent = succ;
            } else {
                self.transplant(succ, fix_from);
                self.node_mut(succ).right = right;
                self.node_mut(right).parent = succ;
            }
            self.transplant(node, succ);
            let color = self.color(node);
            self.node_mut(succ).set_color(color);
            self.node_mut(succ).left = left;
            self.node_mut(left).parent = succ;
        }
        (removed_color, fix_from)
    }

    /// Restores the red-black invariants after a black node left the tree.
    ///
    /// `node` carries the "double black" deficiency; the loop moves it up or
    /// discharges it with at most three rotations.
    fn pop_fixup(&mut self, mut node: Handle) {
        let mut exited_from_case_2 = true;
        while node != self.root && self.color(node) == Color::Black {
            let mut parent = self.parent(node);
            if node == self.node(parent).left {
                let mut sibling = self.node(parent).right;
                debug_assert!(!sibling.is_nil());
                if self.color(sibling) == Color::Red {
                    // Case 1: red sibling. Rotate so the sibling is black.
                    self.node_mut(sibling).set_color(Color::Black);
                    self.node_mut(parent).set_color(Color::Red);
                    self.rotate_left(parent);
                    parent = self.parent(node);
                    sibling = self.node(parent).right;
                }
                let near = self.node(sibling).left;
                let far = self.node(sibling).right;
                if self.color(near) == Color::Black && self.color(far) == Color::Black {
                    // Case 2: both nephews black. Move the deficiency up.
                    self.node_mut(sibling).set_color(Color::Red);
                    node = parent;
                } else {
                    if self.color(far) == Color::Black {
                        // Case 3: far nephew black. Rotate into Case 4.
                        self.node_mut(near).set_color(Color::Black);
                        self.node_mut(sibling).set_color(Color::Red);
                        self.rotate_right(sibling);
                        sibling = self.parent(sibling);
                    }
                    // Case 4: far nephew red. Discharge the deficiency.
                    let parent_color = self.color(parent);
                    self.node_mut(sibling).set_color(parent_color);
                    self.node_mut(parent).set_color(Color::Black);
                    let far = self.node(sibling).right;
                    self.node_mut(far).set_color(Color::Black);
                    self.rotate_left(parent);
                    node = self.root;
                    exited_from_case_2 = false;
                }
            } else {
                // Mirror image of the block above.
                let mut sibling = self.node(parent).left;
                debug_assert!(!sibling.is_nil());
                if self.color(sibling) == Color::Red {
                    self.node_mut(sibling).set_color(Color::Black);
                    self.node_mut(parent).set_color(Color::Red);
                    self.rotate_right(parent);
                    parent = self.parent(node);
                    sibling = self.node(parent).left;
                }
                let near = self.node(sibling).right;
                let far = self.node(sibling).left;
                if self.color(near) == Color::Black && self.color(far) == Color::Black {
                    self.node_mut(sibling).set_color(Color::Red);
                    node = parent;
                } else {
                    if self.color(far) == Color::Black {
                        self.node_mut(near).set_color(Color::Black);
                        self.node_mut(sibling).set_color(Color::Red);
                        self.rotate_left(sibling);
                        sibling = self.parent(sibling);
                    }
                    let parent_color = self.color(parent);
                    self.node_mut(sibling).set_color(parent_color);
                    self.node_mut(parent).set_color(Color::Black);
                    let far = self.node(sibling).left;
                    self.node_mut(far).set_color(Color::Black);
                    self.rotate_right(parent);
                    node = self.root;
                    exited_from_case_2 = false;
                }
            }
        }

        // The root's black height drops when the tree emptied, or when the
        // deficiency bubbled all the way up without being discharged.
        if self.root.is_nil() || (exited_from_case_2 && self.color(node) == Color::Black) {
            self.black_height -= 1;
        }
        self.node_mut(node).set_color(Color::Black);
    }

    // ─── Search and iteration ───────────────────────────────────────────────

    /// Finds a node comparing equal to `key`, or the sentinel.
    ///
    /// Among duplicates, returns the one closest to the root.
    pub(crate) fn search(&self, key: &P) -> Handle
    where
        P: Ord,
    {
        let mut cursor = self.root;
        while !cursor.is_nil() {
            cursor = match key.cmp(self.payload(cursor)) {
                core::cmp::Ordering::Equal => return cursor,
                core::cmp::Ordering::Less => self.node(cursor).left,
                core::cmp::Ordering::Greater => self.node(cursor).right,
            };
        }
        Handle::NIL
    }

    /// Lazy in-order traversal of node handles.
    ///
    /// The iterator borrows the tree, so no structural mutation can happen
    /// while it is alive.
    pub(crate) fn iter(&self) -> RawIter<'_, P, A> {
        let (front, back) = if self.root.is_nil() {
            (Handle::NIL, Handle::NIL)
        } else {
            (self.min(self.root), self.max(self.root))
        };
        RawIter {
            tree: self,
            front,
            back,
            remaining: self.len,
        }
    }

    // ─── Self-verification ──────────────────────────────────────────────────

    /// Asserts every invariant the engine promises: sentinel fixed point,
    /// root color, red adjacency, uniform black height (against the tracked
    /// counter), BST order, aggregate correctness, and node count.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self)
    where
        P: Ord,
        A: PartialEq + core::fmt::Debug,
    {
        let nil = self.node(Handle::NIL);
        assert_eq!(nil.color(), Color::Black);
        assert!(nil.left.is_nil());
        assert!(nil.right.is_nil());
        assert_eq!(nil.aug, A::identity());

        assert_eq!(self.color(self.root), Color::Black);
        let (black_height, count) = self.check_subtree(self.root);
        assert_eq!(self.black_height, black_height);
        assert_eq!(self.len, count);

        // In-order traversal must be sorted (ties permitted either side of
        // the comparison, hence `<=`).
        let mut previous: Option<&P> = None;
        for handle in self.iter() {
            let payload = self.payload(handle);
            if let Some(previous) = previous {
                assert!(previous <= payload);
            }
            previous = Some(payload);
        }
    }

    #[cfg(test)]
    fn check_subtree(&self, handle: Handle) -> (usize, usize)
    where
        P: Ord,
        A: PartialEq + core::fmt::Debug,
    {
        if handle.is_nil() {
            return (0, 0);
        }
        let node = self.node(handle);

        if node.color() == Color::Red {
            assert_eq!(self.color(node.left), Color::Black);
            assert_eq!(self.color(node.right), Color::Black);
        }

        if !node.left.is_nil() {
            assert_eq!(self.parent(node.left), handle);
        }
        if !node.right.is_nil() {
            assert_eq!(self.parent(node.right), handle);
        }

        let expected = A::recompute(node.payload(), self.aug(node.left), self.aug(node.right));
        assert_eq!(node.aug, expected);

        let (left_height, left_count) = self.check_subtree(node.left);
        let (right_height, right_count) = self.check_subtree(node.right);
        let left_height = left_height + usize::from(self.color(node.left) == Color::Black);
        let right_height = right_height + usize::from(self.color(node.right) == Color::Black);
        assert_eq!(left_height, right_height);
        (left_height, left_count + right_count + 1)
    }
}

/// Double-ended in-order iterator over node handles.
pub(crate) struct RawIter<'a, P, A: Augment<P>> {
    tree: &'a RawTree<P, A>,
    front: Handle,
    back: Handle,
    remaining: usize,
}

impl<P, A: Augment<P>> Iterator for RawIter<'_, P, A> {
    type Item = Handle;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.front;
        self.remaining -= 1;
        if self.remaining > 0 {
            self.front = self.tree.successor(handle);
        }
        Some(handle)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<P, A: Augment<P>> DoubleEndedIterator for RawIter<'_, P, A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.back;
        self.remaining -= 1;
        if self.remaining > 0 {
            self.back = self.tree.predecessor(handle);
        }
        Some(handle)
    }
}

impl<P, A: Augment<P>> ExactSizeIterator for RawIter<'_, P, A> {}
impl<P, A: Augment<P>> FusedIterator for RawIter<'_, P, A> {}
