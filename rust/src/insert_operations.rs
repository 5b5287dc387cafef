//! INSERT operations for BPlusTreeMap.
//!
//! This module contains the insertion operations for the B+ tree: routing an
//! entry to its leaf, splitting nodes that refuse it for lack of room, and
//! growing a new root when a split reaches the top.
//!
//! An insert never splits on the way down. A full node hands the entry back
//! as [`Rejected::Overflow`]; the tree splits that node, then retries the
//! whole top-down insert. The split itself only moves existing entries, so
//! the retry sees the same logical contents in a roomier shape.

use tracing::{debug, trace};

use crate::construction::{allocate_internal_in, allocate_leaf_in};
use crate::error::{BPlusTreeError, BTreeResultExt, ModifyResult, TreeResult};
use crate::get_operations::{missing_node, view_in};
use crate::types::{BPlusTreeMap, InternalNode, NodeId, NodeRef, Rejected};

/// Outcome of splitting one node: separator for the parent plus both halves.
type SplitHalves<K, V> = (K, NodeRef<K, V>, NodeRef<K, V>);

impl<K: Ord + Clone, V> BPlusTreeMap<K, V> {
    // ============================================================================
    // PUBLIC INSERT OPERATIONS
    // ============================================================================

    /// Insert a key-value pair, returning the previous value for `key`.
    ///
    /// # Panics
    ///
    /// Panics if the tree's structure is found corrupted mid-insert. That
    /// only happens through a bug in this crate; use [`try_insert`] to get
    /// the `InvariantViolation` back as an error instead.
    ///
    /// [`try_insert`]: BPlusTreeMap::try_insert
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree::BPlusTreeMap;
    ///
    /// let mut tree = BPlusTreeMap::new(4).unwrap();
    /// assert_eq!(tree.insert(1, "v1"), None);
    /// assert_eq!(tree.insert(1, "v2"), Some("v1"));
    /// assert_eq!(tree.search(&1), Ok(&"v2"));
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.try_insert(key, value) {
            Ok(previous) => previous,
            Err(err) => panic!("BPlusTreeMap corrupted during insert: {}", err),
        }
    }

    /// Insert a key-value pair, overwriting any existing value.
    ///
    /// Returns the previous value, or the `InvariantViolation` that stopped
    /// the insert.
    pub fn try_insert(&mut self, key: K, value: V) -> ModifyResult<Option<V>> {
        self.insert_entry(key, value, true).with_operation("insert")
    }

    /// Insert a key that must not be present yet.
    ///
    /// An existing key fails with `DuplicateKey` and leaves the tree as it was.
    ///
    /// ```
    /// use bplustree::{BPlusTreeError, BPlusTreeMap};
    ///
    /// let mut tree = BPlusTreeMap::new(4).unwrap();
    /// tree.try_insert_unique(7, "first").unwrap();
    /// assert_eq!(tree.try_insert_unique(7, "second"), Err(BPlusTreeError::DuplicateKey));
    /// assert_eq!(tree[&7], "first");
    /// ```
    pub fn try_insert_unique(&mut self, key: K, value: V) -> ModifyResult<()> {
        self.insert_entry(key, value, false)
            .map(|_| ())
            .with_operation("insert_unique")
    }

    // ============================================================================
    // INSERT DRIVER
    // ============================================================================

    fn insert_entry(
        &mut self,
        mut key: K,
        mut value: V,
        overwrite_on_equality: bool,
    ) -> ModifyResult<Option<V>> {
        loop {
            let leaf_id = self.find_leaf(&key)?;
            let leaf = self
                .get_leaf_mut(leaf_id)
                .ok_or_else(|| missing_node("insert", leaf_id))?;

            match leaf.insert(key, value, overwrite_on_equality) {
                Ok(previous) => return Ok(previous),
                Err(Rejected::Overflow { node, key: k, item }) => {
                    trace!(leaf = node, "leaf full, splitting before retry");
                    self.split_node(NodeRef::leaf(node))?;
                    key = k;
                    value = item;
                }
                Err(rejected) => return Err(rejected.into()),
            }
        }
    }

    // ============================================================================
    // SPLIT PROTOCOL
    // ============================================================================

    /// Split a full node and hook both halves into the tree.
    ///
    /// Observers see the node before it is touched and both halves once
    /// the sibling chain is rewired, but before the parent learns about the
    /// new high half.
    pub(crate) fn split_node(&mut self, node: NodeRef<K, V>) -> TreeResult<()> {
        if let Some(view) = view_in(&self.leaf_arena, &self.internal_arena, node) {
            self.observers.notify_before(view);
        }

        let (separator, lo, hi) = match node {
            NodeRef::Leaf(id, _) => self.split_leaf(id)?,
            NodeRef::Internal(id, _) => self.split_internal(id)?,
        };

        let halves = (
            view_in(&self.leaf_arena, &self.internal_arena, lo),
            view_in(&self.leaf_arena, &self.internal_arena, hi),
        );
        match halves {
            (Some(lo_view), Some(hi_view)) => {
                debug!(
                    lo = lo.id(),
                    hi = hi.id(),
                    leaf = lo.is_leaf(),
                    lo_len = lo_view.len(),
                    hi_len = hi_view.len(),
                    "split node"
                );
                self.observers.notify_after(lo_view, hi_view);
            }
            _ => return Err(missing_node("split_node", hi.id())),
        }

        self.attach_split(separator, lo, hi)
    }

    /// Leaf half of the protocol. The separator is a copy of the high
    /// half's first key, which stays in the leaf as well.
    fn split_leaf(&mut self, id: NodeId) -> TreeResult<SplitHalves<K, V>> {
        // Fail before moving entries if the arena is exhausted
        self.leaf_arena.next_id()?;

        let high = self
            .get_leaf_mut(id)
            .ok_or_else(|| missing_node("split_leaf", id))?
            .split()?;
        let separator = high.first_key().cloned().ok_or_else(|| {
            BPlusTreeError::invariant("split_leaf", "high half of a split is empty")
        })?;
        let old_next = high.next;
        let hi_id = allocate_leaf_in(&mut self.leaf_arena, high)?;

        if let Some(next) = self.leaf_arena.get_mut(old_next) {
            next.previous = hi_id;
        }
        if let Some(lo) = self.leaf_arena.get_mut(id) {
            lo.next = hi_id;
        }
        Ok((separator, NodeRef::leaf(id), NodeRef::leaf(hi_id)))
    }

    /// Internal half of the protocol. The median key is pushed up and kept
    /// in neither half; children moved to the high half are reparented.
    fn split_internal(&mut self, id: NodeId) -> TreeResult<SplitHalves<K, V>> {
        self.internal_arena.next_id()?;

        let (promoted, high) = self
            .get_internal_mut(id)
            .ok_or_else(|| missing_node("split_internal", id))?
            .split()?;
        let old_next = high.next;
        let moved = high.children().to_vec();
        let hi_id = allocate_internal_in(&mut self.internal_arena, high)?;

        for child in moved {
            self.set_parent(child, hi_id)?;
        }
        if let Some(next) = self.internal_arena.get_mut(old_next) {
            next.previous = hi_id;
        }
        if let Some(lo) = self.internal_arena.get_mut(id) {
            lo.next = hi_id;
        }
        Ok((promoted, NodeRef::internal(id), NodeRef::internal(hi_id)))
    }

    /// Insert `(separator, hi)` next to `lo` in its parent, splitting the
    /// parent first whenever it is full.
    ///
    /// `lo` keeps the split node's arena id, so the parent's existing handle
    /// already names it. After a parent split `lo` may live in either half,
    /// so its parent is looked up again on every retry.
    fn attach_split(
        &mut self,
        mut separator: K,
        lo: NodeRef<K, V>,
        hi: NodeRef<K, V>,
    ) -> TreeResult<()> {
        loop {
            let parent_id = match self.parent_of(lo)? {
                Some(parent_id) => parent_id,
                None => return self.grow_root(separator, lo, hi),
            };
            let parent = self
                .get_internal_mut(parent_id)
                .ok_or_else(|| missing_node("attach_split", parent_id))?;

            match parent.insert(separator, hi) {
                Ok(()) => return self.set_parent(hi, parent_id),
                Err(Rejected::Overflow { node, key, .. }) => {
                    trace!(parent = node, "parent full, splitting before retry");
                    self.split_node(NodeRef::internal(node))?;
                    separator = key;
                }
                Err(rejected) => return Err(rejected.into()),
            }
        }
    }

    /// Replace the root with a new internal node over the two halves.
    fn grow_root(&mut self, separator: K, lo: NodeRef<K, V>, hi: NodeRef<K, V>) -> TreeResult<()> {
        let root = InternalNode::with_halves(self.degree, separator, lo, hi)?;
        let root_id = allocate_internal_in(&mut self.internal_arena, root)?;
        self.set_parent(lo, root_id)?;
        self.set_parent(hi, root_id)?;
        self.root = NodeRef::internal(root_id);
        debug!(root = root_id, height = self.height(), "grew new root");
        Ok(())
    }
}

impl<K, V> BPlusTreeMap<K, V> {
    pub(crate) fn set_parent(&mut self, node: NodeRef<K, V>, parent: NodeId) -> TreeResult<()> {
        let slot = match node {
            NodeRef::Leaf(id, _) => self.leaf_arena.get_mut(id).map(|leaf| &mut leaf.parent),
            NodeRef::Internal(id, _) => self
                .internal_arena
                .get_mut(id)
                .map(|internal| &mut internal.parent),
        };
        match slot {
            Some(slot) => {
                *slot = parent;
                Ok(())
            }
            None => Err(missing_node("set_parent", node.id())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifth_key_splits_degree_four_root() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        for i in 0..4 {
            tree.insert(i, i);
        }
        assert!(tree.is_leaf_root());
        assert_eq!(tree.count_nodes_in_tree(), (1, 0));

        tree.insert(4, 4);
        assert!(!tree.is_leaf_root());
        assert_eq!(tree.root_keys(), vec![&2]);
        assert_eq!(tree.leaf_sizes(), vec![2, 3]);
        assert_eq!(tree.len(), 5);
        tree.check_invariants_detailed().unwrap();
    }

    #[test]
    fn test_split_links_leaves_both_ways() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        for i in 0..5 {
            tree.insert(i, ());
        }
        let lo = tree.get_leaf(tree.find_leaf(&0).unwrap()).unwrap();
        let hi = tree.get_leaf(tree.find_leaf(&4).unwrap()).unwrap();
        assert_eq!(lo.next(), Some(hi.id()));
        assert_eq!(hi.previous(), Some(lo.id()));
        assert_eq!(lo.previous(), None);
        assert_eq!(hi.next(), None);
        assert_eq!(lo.parent(), hi.parent());
    }

    #[test]
    fn test_split_in_middle_of_chain_relinks_old_next() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        for i in [10, 20, 30, 40, 50, 1, 2, 3] {
            tree.insert(i, ());
        }
        // The leftmost leaf split after the first split, between two leaves
        let ids: Vec<NodeId> = tree.leaf_ids();
        assert_eq!(ids.len(), 3);
        for pair in ids.windows(2) {
            let left = tree.get_leaf(pair[0]).unwrap();
            let right = tree.get_leaf(pair[1]).unwrap();
            assert_eq!(left.next(), Some(right.id()));
            assert_eq!(right.previous(), Some(left.id()));
        }
        tree.check_invariants_detailed().unwrap();
    }

    #[test]
    fn test_cascading_splits_grow_height() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        for i in 0..200 {
            tree.insert(i, i);
            tree.check_invariants_detailed().unwrap();
        }
        assert!(tree.height() >= 4);
        assert!(tree.internal_count() > 1);
        assert_eq!(tree.len(), 200);
    }

    #[test]
    fn test_descending_inserts_keep_order() {
        let mut tree = BPlusTreeMap::new(5).unwrap();
        for i in (0..100).rev() {
            tree.insert(i, i * 2);
        }
        let keys: Vec<i32> = tree.keys().copied().collect();
        assert_eq!(keys, (0..100).collect::<Vec<_>>());
        tree.check_invariants_detailed().unwrap();
    }

    #[test]
    fn test_worked_degree_five_construction() {
        let mut tree = BPlusTreeMap::new(5).unwrap();
        for k in [10, 7, 15, 5, 30, 20, 13, 3, 11, 21, 8, 9] {
            tree.insert(k, k);
        }
        assert_eq!(tree.root_keys(), vec![&10, &15]);
        assert_eq!(tree.get_internal(tree.root.id()).unwrap().children().len(), 3);
    }

    #[test]
    fn test_unique_insert_into_full_leaf_leaves_tree_unchanged() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        for i in 0..4 {
            tree.insert(i, i);
        }
        assert_eq!(tree.try_insert_unique(2, 99), Err(BPlusTreeError::DuplicateKey));
        assert!(tree.is_leaf_root());
        assert_eq!(tree[&2], 2);
    }

    #[test]
    fn test_overwrite_never_splits() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        for i in 0..4 {
            tree.insert(i, i);
        }
        assert_eq!(tree.try_insert(3, 30), Ok(Some(3)));
        assert!(tree.is_leaf_root());
    }
}
