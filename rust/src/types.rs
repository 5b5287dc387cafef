//! Core types and data structures for BPlusTreeMap.
//!
//! This module contains all the fundamental data structures, type definitions,
//! and constants used throughout the B+ tree implementation.

use std::fmt;
use std::marker::PhantomData;

use crate::arena::NodeArena;
use crate::bounded_array::BoundedArray;
use crate::error::BPlusTreeError;
use crate::observers::SplitObservers;

pub use crate::arena::{NodeId, NULL_NODE};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Minimum degree (maximum keys per node) accepted by the tree
pub const MIN_DEGREE: usize = 4;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// In-memory B+ tree mapping unique, ordered keys to values.
///
/// All values live in leaf nodes. Leaves are chained in key order in both
/// directions, so full scans never descend the tree more than once.
/// Internal nodes only hold separator keys and child handles.
///
/// # Type Parameters
///
/// * `K` - Key type, totally ordered. Cloned when a leaf split copies a
///   separator up into its parent.
/// * `V` - Value type, opaque to the tree.
///
/// # Examples
///
/// ```
/// use bplustree::BPlusTreeMap;
///
/// let mut tree = BPlusTreeMap::new(4).unwrap();
/// for i in 0..5 {
///     tree.insert(i, i * 10);
/// }
///
/// // Five keys do not fit in a degree-4 leaf, so the root is now internal
/// assert!(!tree.is_leaf_root());
/// assert_eq!(tree.search(&3), Ok(&30));
/// assert_eq!(tree.len(), 5);
/// ```
///
/// # Degree Guidelines
///
/// - Minimum degree: 4 (enforced)
/// - A node splits when a new key arrives while it holds `degree` keys
/// - Deletion never merges nodes, so heavy deletes leave sparse leaves
pub struct BPlusTreeMap<K, V> {
    /// Maximum number of keys per node.
    pub(crate) degree: usize,
    /// The root node of the tree.
    pub(crate) root: NodeRef<K, V>,
    /// Arena storage for leaf nodes.
    pub(crate) leaf_arena: NodeArena<LeafNode<K, V>>,
    /// Arena storage for internal nodes.
    pub(crate) internal_arena: NodeArena<InternalNode<K, V>>,
    /// Callbacks fired around every split.
    pub(crate) observers: SplitObservers<K, V>,
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for BPlusTreeMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BPlusTreeMap")
            .field("degree", &self.degree)
            .field("root", &self.root)
            .field("leaf_arena", &self.leaf_arena)
            .field("internal_arena", &self.internal_arena)
            .finish_non_exhaustive()
    }
}

/// Leaf node containing key-value pairs.
#[derive(Debug, Clone)]
pub struct LeafNode<K, V> {
    /// Arena id of this node.
    pub(crate) id: NodeId,
    /// Maximum number of keys this node can hold.
    pub(crate) degree: usize,
    /// Sorted keys.
    pub(crate) keys: BoundedArray<K>,
    /// Values, index-aligned with `keys`.
    pub(crate) values: BoundedArray<V>,
    /// Owning internal node, `NULL_NODE` for the root.
    pub(crate) parent: NodeId,
    /// Next leaf in key order.
    pub(crate) next: NodeId,
    /// Previous leaf in key order.
    pub(crate) previous: NodeId,
}

/// Internal node containing separator keys and child handles.
#[derive(Debug, Clone)]
pub struct InternalNode<K, V> {
    /// Arena id of this node.
    pub(crate) id: NodeId,
    /// Maximum number of keys this node can hold.
    pub(crate) degree: usize,
    /// Sorted separator keys.
    pub(crate) keys: BoundedArray<K>,
    /// Child handles; always one more than `keys` once populated.
    pub(crate) children: BoundedArray<NodeRef<K, V>>,
    /// Owning internal node, `NULL_NODE` for the root.
    pub(crate) parent: NodeId,
    /// Next internal node on the same level.
    pub(crate) next: NodeId,
    /// Previous internal node on the same level.
    pub(crate) previous: NodeId,
}

// ============================================================================
// NODE HANDLES
// ============================================================================

/// Node reference that can be either a leaf or internal node
pub enum NodeRef<K, V> {
    Leaf(NodeId, PhantomData<(K, V)>),
    Internal(NodeId, PhantomData<(K, V)>),
}

impl<K, V> Clone for NodeRef<K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for NodeRef<K, V> {}

impl<K, V> PartialEq for NodeRef<K, V> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NodeRef::Leaf(a, _), NodeRef::Leaf(b, _)) => a == b,
            (NodeRef::Internal(a, _), NodeRef::Internal(b, _)) => a == b,
            _ => false,
        }
    }
}

impl<K, V> Eq for NodeRef<K, V> {}

impl<K, V> fmt::Debug for NodeRef<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Leaf(id, _) => write!(f, "Leaf({})", id),
            NodeRef::Internal(id, _) => write!(f, "Internal({})", id),
        }
    }
}

impl<K, V> NodeRef<K, V> {
    pub fn leaf(id: NodeId) -> Self {
        NodeRef::Leaf(id, PhantomData)
    }

    pub fn internal(id: NodeId) -> Self {
        NodeRef::Internal(id, PhantomData)
    }

    /// Return the raw node ID.
    pub fn id(&self) -> NodeId {
        match *self {
            NodeRef::Leaf(id, _) => id,
            NodeRef::Internal(id, _) => id,
        }
    }

    /// Returns true if this reference points to a leaf node.
    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeRef::Leaf(_, _))
    }
}

/// Borrowed view of a node, handed to split observers and validation.
pub enum NodeView<'a, K, V> {
    Leaf(&'a LeafNode<K, V>),
    Internal(&'a InternalNode<K, V>),
}

impl<K, V> Clone for NodeView<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for NodeView<'_, K, V> {}

impl<'a, K, V> NodeView<'a, K, V> {
    pub fn node_ref(&self) -> NodeRef<K, V> {
        match *self {
            NodeView::Leaf(leaf) => NodeRef::leaf(leaf.id),
            NodeView::Internal(internal) => NodeRef::internal(internal.id),
        }
    }

    pub fn keys(&self) -> &'a [K] {
        match *self {
            NodeView::Leaf(leaf) => leaf.keys.as_slice(),
            NodeView::Internal(internal) => internal.keys.as_slice(),
        }
    }

    pub fn min_key(&self) -> Option<&'a K> {
        self.keys().first()
    }

    pub fn max_key(&self) -> Option<&'a K> {
        self.keys().last()
    }

    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeView::Leaf(_))
    }

    /// Parent id, `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        match *self {
            NodeView::Leaf(leaf) => leaf.parent(),
            NodeView::Internal(internal) => internal.parent(),
        }
    }

    /// Right neighbour on the same level.
    pub fn next(&self) -> Option<NodeId> {
        match *self {
            NodeView::Leaf(leaf) => leaf.next(),
            NodeView::Internal(internal) => internal.next(),
        }
    }

    /// Left neighbour on the same level.
    pub fn previous(&self) -> Option<NodeId> {
        match *self {
            NodeView::Leaf(leaf) => leaf.previous(),
            NodeView::Internal(internal) => internal.previous(),
        }
    }
}

// ============================================================================
// NODE INSERT OUTCOMES
// ============================================================================

/// Why a node refused an entry.
#[derive(Debug, PartialEq, Eq)]
pub enum Rejected<K, T> {
    /// The node is full; the tree splits `node` and retries with the entry.
    Overflow { node: NodeId, key: K, item: T },
    /// The key exists and overwriting was not allowed. Entry handed back.
    Duplicate { key: K, item: T },
    /// The node's own storage disagreed with itself.
    Invariant(BPlusTreeError),
}

impl<K, T> Rejected<K, T> {
    /// Take the refused entry back, if the node still had it.
    pub fn into_entry(self) -> Option<(K, T)> {
        match self {
            Rejected::Overflow { key, item, .. } | Rejected::Duplicate { key, item } => {
                Some((key, item))
            }
            Rejected::Invariant(_) => None,
        }
    }
}

impl<K, T> From<Rejected<K, T>> for BPlusTreeError {
    fn from(rejected: Rejected<K, T>) -> Self {
        match rejected {
            Rejected::Duplicate { .. } => Self::DuplicateKey,
            Rejected::Overflow { node, .. } => {
                Self::invariant("Node insert", &format!("node {} overflowed without a split", node))
            }
            Rejected::Invariant(err) => err,
        }
    }
}
