//! GET operations for BPlusTreeMap.
//!
//! This module contains all the read operations for the B+ tree, including
//! key lookup, value retrieval, and helper methods for accessing nodes.

use std::ops::Index;

use crate::arena::NodeArena;
use crate::error::{BPlusTreeError, BTreeResult, KeyResult, TreeResult};
use crate::types::{BPlusTreeMap, InternalNode, LeafNode, NodeId, NodeRef, NodeView};

impl<K: Ord, V> BPlusTreeMap<K, V> {
    // ============================================================================
    // PUBLIC GET OPERATIONS
    // ============================================================================

    /// Strict lookup: the value stored under `key`, or `KeyNotFound`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree::{BPlusTreeError, BPlusTreeMap};
    ///
    /// let mut tree = BPlusTreeMap::new(16).unwrap();
    /// tree.insert(1, "one");
    /// assert_eq!(tree.search(&1), Ok(&"one"));
    /// assert_eq!(tree.search(&2), Err(BPlusTreeError::KeyNotFound));
    /// ```
    pub fn search(&self, key: &K) -> KeyResult<&V> {
        let leaf_id = self.find_leaf(key)?;
        self.get_leaf(leaf_id)
            .ok_or_else(|| missing_node("search", leaf_id))?
            .get_item(key)
    }

    /// Get a reference to the value associated with a key.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree::BPlusTreeMap;
    ///
    /// let mut tree = BPlusTreeMap::new(16).unwrap();
    /// tree.insert(1, "one");
    /// assert_eq!(tree.get(&1), Some(&"one"));
    /// assert_eq!(tree.get(&2), None);
    /// ```
    pub fn get(&self, key: &K) -> Option<&V> {
        self.search(key).ok()
    }

    /// Get a mutable reference to the value for a key.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree::BPlusTreeMap;
    ///
    /// let mut tree = BPlusTreeMap::new(16).unwrap();
    /// tree.insert(1, "one");
    /// if let Some(value) = tree.get_mut(&1) {
    ///     *value = "ONE";
    /// }
    /// assert_eq!(tree.get(&1), Some(&"ONE"));
    /// ```
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let leaf_id = self.find_leaf(key).ok()?;
        self.get_leaf_mut(leaf_id)?.get_mut(key)
    }

    /// Check if key exists in the tree.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Get value for a key, falling back to `default` when it is absent.
    ///
    /// ```
    /// use bplustree::BPlusTreeMap;
    ///
    /// let mut tree = BPlusTreeMap::new(16).unwrap();
    /// tree.insert(1, "one");
    /// assert_eq!(tree.get_or_default(&1, &"default"), &"one");
    /// assert_eq!(tree.get_or_default(&2, &"default"), &"default");
    /// ```
    pub fn get_or_default<'a>(&'a self, key: &K, default: &'a V) -> &'a V {
        self.get(key).unwrap_or(default)
    }

    /// Look up several keys at once. Fails on the first missing key.
    pub fn get_many(&self, keys: &[K]) -> BTreeResult<Vec<&V>> {
        keys.iter().map(|key| self.search(key)).collect()
    }

    // ============================================================================
    // ROUTING
    // ============================================================================

    /// Descend from the root to the leaf whose key range covers `key`.
    pub(crate) fn find_leaf(&self, key: &K) -> TreeResult<NodeId> {
        let mut node = self.root;
        loop {
            match node {
                NodeRef::Leaf(id, _) => return Ok(id),
                NodeRef::Internal(id, _) => {
                    let internal = self
                        .get_internal(id)
                        .ok_or_else(|| missing_node("find_leaf", id))?;
                    node = internal.child_for(key).ok_or_else(|| {
                        BPlusTreeError::invariant(
                            "find_leaf",
                            &format!("internal node {} has no children", id),
                        )
                    })?;
                }
            }
        }
    }
}

impl<K, V> BPlusTreeMap<K, V> {
    // ============================================================================
    // ARENA ACCESS
    // ============================================================================

    pub fn get_leaf(&self, id: NodeId) -> Option<&LeafNode<K, V>> {
        self.leaf_arena.get(id)
    }

    pub(crate) fn get_leaf_mut(&mut self, id: NodeId) -> Option<&mut LeafNode<K, V>> {
        self.leaf_arena.get_mut(id)
    }

    pub fn get_internal(&self, id: NodeId) -> Option<&InternalNode<K, V>> {
        self.internal_arena.get(id)
    }

    pub(crate) fn get_internal_mut(&mut self, id: NodeId) -> Option<&mut InternalNode<K, V>> {
        self.internal_arena.get_mut(id)
    }

    /// Borrowed view of whichever node `node` names.
    pub fn node_view(&self, node: NodeRef<K, V>) -> Option<NodeView<'_, K, V>> {
        view_in(&self.leaf_arena, &self.internal_arena, node)
    }

    /// Parent of `node`, `None` when it is the root.
    pub(crate) fn parent_of(&self, node: NodeRef<K, V>) -> TreeResult<Option<NodeId>> {
        self.node_view(node)
            .map(|view| view.parent())
            .ok_or_else(|| missing_node("parent_of", node.id()))
    }
}

/// Resolve `node` against the arenas directly, so callers can keep other
/// tree fields borrowed mutably.
pub(crate) fn view_in<'a, K, V>(
    leaves: &'a NodeArena<LeafNode<K, V>>,
    internals: &'a NodeArena<InternalNode<K, V>>,
    node: NodeRef<K, V>,
) -> Option<NodeView<'a, K, V>> {
    match node {
        NodeRef::Leaf(id, _) => leaves.get(id).map(NodeView::Leaf),
        NodeRef::Internal(id, _) => internals.get(id).map(NodeView::Internal),
    }
}

pub(crate) fn missing_node(context: &str, id: NodeId) -> BPlusTreeError {
    BPlusTreeError::invariant(context, &format!("node {} is not in the arena", id))
}

impl<K: Ord, V> Index<&K> for BPlusTreeMap<K, V> {
    type Output = V;

    /// Returns a reference to the value for `key`.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present, like `BTreeMap`'s indexer.
    fn index(&self, key: &K) -> &V {
        match self.get(key) {
            Some(value) => value,
            None => panic!("key not found in BPlusTreeMap"),
        }
    }
}
