use crate::raw::Handle;

/// Opaque handle to a node currently stored in a tree.
///
/// Returned by insertion and search operations so that rank queries and
/// removals can address a specific node, including one of several equal
/// payloads. A `NodeRef` is only valid for the tree that issued it and only
/// while that node is still present: removing the node recycles its slot, and
/// using a stale `NodeRef` afterwards panics or addresses whichever node was
/// allocated into the slot since. This is a documented precondition, not a
/// checked invariant.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NodeRef(pub(crate) Handle);
