use super::handle::Handle;
use super::raw_tree::RawTree;

/// The augmentation hook protocol.
///
/// A specialization stores one aggregate value of this type per node and
/// supplies the rules that keep it consistent. The engine routes every
/// structural change through exactly three choke points:
///
/// - [`recompute`](Augment::recompute) is applied at a node, then walked to
///   the root, after every insertion or deletion splice;
/// - [`on_left_rotation_complete`](Augment::on_left_rotation_complete) and
///   [`on_right_rotation_complete`](Augment::on_right_rotation_complete) run
///   at the end of the rotation primitives, before any caller can observe the
///   rotated subtree.
///
/// A rotation only changes the subtree boundaries of two nodes (the demoted
/// old root and the promoted new root), so the hooks must restore both in
/// O(1) from locally reachable aggregates. Rotations during fixup can be
/// numerous; hooks must not recurse.
///
/// The sentinel carries [`identity`](Augment::identity) forever; correct
/// `recompute` rules treat it as the aggregate's neutral element.
pub(crate) trait Augment<P>: Copy {
    /// The aggregate stored at the sentinel.
    fn identity() -> Self;

    /// Aggregate for a node, from its payload and its children's aggregates.
    fn recompute(payload: &P, left: Self, right: Self) -> Self;

    /// Restores the aggregates of `new_root` and its left child (the demoted
    /// node) after a left rotation.
    fn on_left_rotation_complete(tree: &mut RawTree<P, Self>, new_root: Handle) {
        let demoted = tree.node(new_root).left;
        tree.recompute_node(demoted);
        tree.recompute_node(new_root);
    }

    /// Restores the aggregates of `new_root` and its right child (the demoted
    /// node) after a right rotation.
    fn on_right_rotation_complete(tree: &mut RawTree<P, Self>, new_root: Handle) {
        let demoted = tree.node(new_root).right;
        tree.recompute_node(demoted);
        tree.recompute_node(new_root);
    }
}
