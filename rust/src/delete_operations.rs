//! DELETE operations for BPlusTreeMap.
//!
//! Deletion removes the entry from its leaf and stops there. Nodes are never
//! merged or rebalanced, so a leaf may end up underfull or even empty while
//! its separators in the parents stay valid bounds.

use tracing::{debug, trace};

use crate::arena::NodeArena;
use crate::error::{BPlusTreeError, BTreeResultExt, KeyResult};
use crate::get_operations::missing_node;
use crate::types::{BPlusTreeMap, LeafNode, NodeRef};

impl<K: Ord, V> BPlusTreeMap<K, V> {
    /// Remove `key`, returning the stored pair.
    ///
    /// Fails with `KeyNotFound` when the key is absent; the tree is left
    /// unchanged in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree::{BPlusTreeError, BPlusTreeMap};
    ///
    /// let mut tree = BPlusTreeMap::new(4).unwrap();
    /// tree.insert(5, "five");
    /// assert_eq!(tree.delete(&5), Ok((5, "five")));
    /// assert_eq!(tree.delete(&5), Err(BPlusTreeError::KeyNotFound));
    /// assert!(tree.is_empty());
    /// ```
    pub fn delete(&mut self, key: &K) -> KeyResult<(K, V)> {
        let leaf_id = self.find_leaf(key).with_operation("delete")?;
        let removed = self
            .get_leaf_mut(leaf_id)
            .ok_or_else(|| missing_node("delete", leaf_id))?
            .delete(key)
            .with_operation("delete")?;
        match removed {
            Some(entry) => {
                trace!(leaf = leaf_id, "deleted key");
                Ok(entry)
            }
            None => Err(BPlusTreeError::KeyNotFound),
        }
    }

    /// Remove `key`, returning its value if it was present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.delete(key).ok().map(|(_, value)| value)
    }
}

impl<K, V> BPlusTreeMap<K, V> {
    /// Drop every entry and node, leaving a single empty root leaf.
    ///
    /// The degree and any registered split observers are kept.
    pub fn clear(&mut self) {
        let leaves = self.leaf_arena.len();
        let internals = self.internal_arena.len();

        self.leaf_arena = NodeArena::with_first(LeafNode::new(self.degree).stamped(0));
        self.internal_arena.clear();
        self.root = NodeRef::leaf(0);
        debug!(leaves, internals, "cleared tree");
    }
}
