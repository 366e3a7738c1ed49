mod arena;
mod augment;
mod handle;
mod node;
mod raw_tree;

pub(crate) use augment::Augment;
pub(crate) use handle::Handle;
pub(crate) use raw_tree::{RawIter, RawTree};
