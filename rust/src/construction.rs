//! Construction and initialization logic for BPlusTreeMap and nodes.
//!
//! This module contains degree validation, arena initialization and the
//! constructors for empty leaves and freshly grown internal roots.

use crate::arena::NodeArena;
use crate::bounded_array::BoundedArray;
use crate::error::{BPlusTreeError, BTreeResult, InitResult, TreeResult};
use crate::observers::SplitObservers;
use crate::types::{BPlusTreeMap, InternalNode, LeafNode, NodeId, NodeRef, MIN_DEGREE, NULL_NODE};

/// Default degree for B+ tree nodes
pub const DEFAULT_DEGREE: usize = 16;

impl<K, V> BPlusTreeMap<K, V> {
    /// Create a B+ tree whose nodes hold at most `degree` keys.
    ///
    /// # Arguments
    ///
    /// * `degree` - Maximum number of keys per node (minimum 4)
    ///
    /// # Returns
    ///
    /// Returns `Ok(BPlusTreeMap)` if the degree is valid, `Err(BPlusTreeError)` otherwise.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree::BPlusTreeMap;
    ///
    /// let tree = BPlusTreeMap::<i32, String>::new(16).unwrap();
    /// assert!(tree.is_empty());
    /// assert!(BPlusTreeMap::<i32, String>::new(3).is_err());
    /// ```
    pub fn new(degree: usize) -> InitResult<Self> {
        validate_degree(degree)?;
        Ok(Self::with_valid_degree(degree))
    }

    /// Empty tree for an already validated degree.
    fn with_valid_degree(degree: usize) -> Self {
        Self {
            degree,
            root: NodeRef::leaf(0),
            leaf_arena: NodeArena::with_first(LeafNode::new(degree).stamped(0)),
            internal_arena: NodeArena::new(),
            observers: SplitObservers::default(),
        }
    }

    /// Create a B+ tree with default degree.
    ///
    /// This is equivalent to calling `new(DEFAULT_DEGREE)`.
    pub fn with_default_degree() -> InitResult<Self> {
        Self::new(DEFAULT_DEGREE)
    }

    /// Maximum number of keys per node, fixed at construction.
    pub fn degree(&self) -> usize {
        self.degree
    }
}

/// Allocate `leaf`, stamping it with the id it was given.
pub(crate) fn allocate_leaf_in<K, V>(
    arena: &mut NodeArena<LeafNode<K, V>>,
    leaf: LeafNode<K, V>,
) -> TreeResult<NodeId> {
    let id = arena.next_id()?;
    arena.allocate(leaf.stamped(id))
}

/// Allocate `node`, stamping it with the id it was given.
pub(crate) fn allocate_internal_in<K, V>(
    arena: &mut NodeArena<InternalNode<K, V>>,
    mut node: InternalNode<K, V>,
) -> TreeResult<NodeId> {
    node.id = arena.next_id()?;
    arena.allocate(node)
}

impl<K, V> LeafNode<K, V> {
    /// Creates a new, unlinked leaf node holding at most `degree` keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree::LeafNode;
    ///
    /// let leaf: LeafNode<i32, String> = LeafNode::new(16);
    /// assert!(leaf.is_empty());
    /// assert_eq!(leaf.parent(), None);
    /// ```
    pub fn new(degree: usize) -> Self {
        Self {
            id: NULL_NODE,
            degree,
            keys: BoundedArray::new(degree),
            values: BoundedArray::new(degree),
            parent: NULL_NODE,
            next: NULL_NODE,
            previous: NULL_NODE,
        }
    }

    pub(crate) fn stamped(mut self, id: NodeId) -> Self {
        self.id = id;
        self
    }
}

impl<K, V> InternalNode<K, V> {
    /// Creates a new, empty internal node holding at most `degree` keys.
    pub fn new(degree: usize) -> Self {
        // One more child slot than key slots
        Self {
            id: NULL_NODE,
            degree,
            keys: BoundedArray::new(degree),
            children: BoundedArray::new(degree + 1),
            parent: NULL_NODE,
            next: NULL_NODE,
            previous: NULL_NODE,
        }
    }

    /// Creates the node that becomes a new root after the old root split:
    /// one separator between the two halves.
    pub fn with_halves(
        degree: usize,
        separator: K,
        lo: NodeRef<K, V>,
        hi: NodeRef<K, V>,
    ) -> BTreeResult<Self> {
        let mut node = Self::new(degree);
        node.keys.append(separator)?;
        node.children.append(lo)?;
        node.children.append(hi)?;
        Ok(node)
    }
}

// Default implementation
impl<K, V> Default for BPlusTreeMap<K, V> {
    /// Create a B+ tree with default degree.
    fn default() -> Self {
        Self::with_valid_degree(DEFAULT_DEGREE)
    }
}

/// Validate that a degree is suitable for B+ tree nodes.
///
/// # Returns
///
/// Returns `Ok(())` if valid, `Err(BPlusTreeError::InvalidDegree)` otherwise.
pub fn validate_degree(degree: usize) -> BTreeResult<()> {
    if degree < MIN_DEGREE {
        Err(BPlusTreeError::invalid_degree(degree, MIN_DEGREE))
    } else {
        Ok(())
    }
}
