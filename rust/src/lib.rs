//! B+ tree implementation in Rust with a map-like API.
//!
//! [`BPlusTreeMap`] keeps every entry in leaf nodes chained in key order,
//! with internal nodes holding only separator keys. Nodes live in two
//! arenas and refer to each other by [`NodeId`], so parent and sibling
//! links never own anything.
//!
//! Each node holds at most `degree` keys in a [`BoundedArray`]. A full
//! node refuses a new entry with a typed [`Rejected::Overflow`]; the tree
//! splits it (copying the separator up from leaves, pushing it up from
//! internal nodes) and retries the insert from the root. Splits can be
//! watched through [`BPlusTreeMap::on_before_split`] and
//! [`BPlusTreeMap::on_after_split`].
//!
//! Deletion never merges or rebalances nodes.
//!
//! # Examples
//!
//! ```
//! use bplustree::BPlusTreeMap;
//!
//! let mut tree = BPlusTreeMap::new(4).unwrap();
//! for k in [5, -3, 1, 2, -4, 3, 4, 0, -2, -1] {
//!     tree.insert(k, k * 100);
//! }
//! assert_eq!(tree.len(), 10);
//! assert_eq!(tree.delete(&5), Ok((5, 500)));
//! assert!(!tree.contains_key(&5));
//!
//! let keys: Vec<i32> = tree.keys().copied().collect();
//! assert_eq!(keys, vec![-4, -3, -2, -1, 0, 1, 2, 3, 4]);
//! assert!(tree.check_invariants());
//! ```

mod arena;
mod bounded_array;
mod construction;
mod delete_operations;
mod error;
mod get_operations;
mod insert_operations;
mod iteration;
mod node;
mod observers;
mod tree_structure;
mod types;
mod validation;

pub use arena::{ArenaStats, NodeArena};
pub use bounded_array::BoundedArray;
pub use construction::{validate_degree, DEFAULT_DEGREE};
pub use error::{
    BPlusTreeError, BTreeResult, BTreeResultExt, InitResult, KeyResult, ModifyResult,
};
pub use iteration::{ItemIterator, KeyIterator, RangeIterator, ReverseItemIterator, ValueIterator};
pub use observers::SplitObservers;
pub use types::{
    BPlusTreeMap, InternalNode, LeafNode, NodeId, NodeRef, NodeView, Rejected, MIN_DEGREE,
    NULL_NODE,
};
