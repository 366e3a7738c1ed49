//! Augmented red-black tree collections for Rust.
//!
//! This crate provides one balanced-tree engine and two specializations of
//! its augmentation protocol:
//!
//! - [`OsTree`] - an order-statistics tree with O(log n)
//!   [`select`](OsTree::select) (the i-th smallest value) and
//!   [`rank`](OsTree::rank) (a value's 1-based sorted position)
//! - [`IntervalTree`] - an interval tree with O(log n) overlap queries:
//!   [`find_overlap`](IntervalTree::find_overlap),
//!   [`find_min_overlap`](IntervalTree::find_min_overlap), and
//!   [`find_exact`](IntervalTree::find_exact)
//!
//! # Example
//!
//! ```
//! use garnet_tree::{Interval, IntervalTree, OsTree, Rank};
//!
//! let mut scores = OsTree::new();
//! scores.insert(85);
//! scores.insert(100);
//! scores.insert(92);
//!
//! // The median score, by rank.
//! assert_eq!(scores[Rank(2)], 92);
//! assert_eq!(scores.rank_of_value(&100), Some(3));
//!
//! let mut meetings = IntervalTree::new();
//! meetings.insert(Interval::new(9, 10));
//! meetings.insert(Interval::new(14, 16));
//!
//! let clash = meetings.find_min_overlap(&Interval::new(10, 15)).unwrap();
//! assert_eq!(*meetings.get(clash), Interval::new(9, 10));
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library
//!   dependency
//! - **One engine, two indexes** - Both trees share a single red-black
//!   balancing engine; each supplies a per-node aggregate (subtree size, or
//!   maximum high endpoint) and the O(1) rules that keep it consistent
//!   through every rotation and splice
//! - **Handle-based** - Nodes live in an arena and are addressed by
//!   [`NodeRef`], so duplicates can be removed individually
//!
//! # Implementation
//!
//! The engine is the classic sentinel-based red-black tree: every empty
//! subtree and absent parent is one shared black nil node, so the fixup state
//! machines never branch on a null link. Aggregates are restored at the only
//! places subtree shape changes: a hook at the end of each rotation plus a
//! path-to-root recompute after each splice.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod node_ref;
mod rank;
mod raw;

pub mod interval_tree;
pub mod os_tree;

pub use interval_tree::{Interval, IntervalTree};
pub use node_ref::NodeRef;
pub use os_tree::OsTree;
pub use rank::Rank;
