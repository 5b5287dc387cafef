//! Node implementations for BPlusTreeMap.
//!
//! This module contains the node-local halves of insertion, deletion, routing
//! and splitting. Anything that needs arena ids (sibling wiring, reparenting,
//! attaching a split to its parent) is finished by the tree in
//! `insert_operations`.

use std::mem;

use crate::error::{BPlusTreeError, BTreeResult, KeyResult};
use crate::types::{InternalNode, LeafNode, NodeId, NodeRef, Rejected, NULL_NODE};

fn link(id: NodeId) -> Option<NodeId> {
    (id != NULL_NODE).then_some(id)
}

// ============================================================================
// LEAF NODE IMPLEMENTATION
// ============================================================================

impl<K: Ord, V> LeafNode<K, V> {
    // ============================================================================
    // GET OPERATIONS
    // ============================================================================

    /// Binary-search membership test.
    pub fn contains_key(&self, key: &K) -> bool {
        self.keys.contains_sorted(key)
    }

    /// Get a value by key from this leaf node.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.keys
            .find_insertion_point(key)
            .ok()
            .and_then(|index| self.values.get(index))
    }

    /// Get a mutable reference to a value by key from this leaf node.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let index = self.keys.find_insertion_point(key).ok()?;
        self.values.get_mut(index)
    }

    /// Strict lookup, `KeyNotFound` when absent.
    pub fn get_item(&self, key: &K) -> KeyResult<&V> {
        self.get(key).ok_or(BPlusTreeError::KeyNotFound)
    }

    // ============================================================================
    // INSERT OPERATIONS
    // ============================================================================

    /// Insert a key-value pair into this leaf.
    ///
    /// An existing key has its value replaced (returning the old one) when
    /// `overwrite_on_equality` is set, and is refused with
    /// [`Rejected::Duplicate`] otherwise. A new key arriving at a full leaf is
    /// refused with [`Rejected::Overflow`]; the leaf is left untouched.
    pub fn insert(
        &mut self,
        key: K,
        value: V,
        overwrite_on_equality: bool,
    ) -> Result<Option<V>, Rejected<K, V>> {
        match self.keys.find_insertion_point(&key) {
            Ok(_) if !overwrite_on_equality => Err(Rejected::Duplicate { key, item: value }),
            Ok(index) => match self.values.get_mut(index) {
                Some(slot) => Ok(Some(mem::replace(slot, value))),
                None => Err(Rejected::Invariant(BPlusTreeError::invariant(
                    "LeafNode::insert",
                    "key without a value",
                ))),
            },
            Err(_) if self.is_full() => Err(Rejected::Overflow {
                node: self.id,
                key,
                item: value,
            }),
            Err(index) => {
                let broken = |e: BPlusTreeError| -> Rejected<K, V> {
                    Rejected::Invariant(e.into_invariant("LeafNode::insert"))
                };
                self.keys.insert_at(key, index).map_err(broken)?;
                self.values.insert_at(value, index).map_err(broken)?;
                Ok(None)
            }
        }
    }

    // ============================================================================
    // DELETE OPERATIONS
    // ============================================================================

    /// Remove a key-value pair from this leaf node. Absent keys are a no-op.
    pub fn delete(&mut self, key: &K) -> BTreeResult<Option<(K, V)>> {
        let index = match self.keys.find_insertion_point(key) {
            Ok(index) => index,
            Err(_) => return Ok(None),
        };
        let context = "LeafNode::delete";
        let key = self.keys.delete_at(index).map_err(|e| e.into_invariant(context))?;
        let value = self.values.delete_at(index).map_err(|e| e.into_invariant(context))?;
        Ok(Some((key, value)))
    }

    // ============================================================================
    // SPLIT
    // ============================================================================

    /// Split this leaf at `len / 2`, returning the new high half.
    ///
    /// `self` keeps the low half in place. The high half inherits the parent
    /// and the old `next` link and points back at `self`; the caller
    /// allocates it and finishes the chain (`self.next`, old next's
    /// `previous`). The separator to copy up is the high half's first key.
    pub fn split(&mut self) -> BTreeResult<LeafNode<K, V>> {
        if self.len() < 2 {
            return Err(BPlusTreeError::invariant(
                "LeafNode::split",
                &format!("cannot split a leaf holding {} keys", self.len()),
            ));
        }
        let mid = self.len() / 2;
        let context = "LeafNode::split";
        let keys = self.keys.split_off(mid).map_err(|e| e.into_invariant(context))?;
        let values = self.values.split_off(mid).map_err(|e| e.into_invariant(context))?;

        Ok(LeafNode {
            id: NULL_NODE,
            degree: self.degree,
            keys,
            values,
            parent: self.parent,
            next: self.next,
            previous: self.id,
        })
    }
}

impl<K, V> LeafNode<K, V> {
    // ============================================================================
    // ACCESSORS
    // ============================================================================

    /// Returns the number of key-value pairs in this leaf.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if this leaf node is empty.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns true if this leaf node is at capacity.
    pub fn is_full(&self) -> bool {
        self.keys.len() >= self.degree
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn keys(&self) -> &[K] {
        self.keys.as_slice()
    }

    pub fn values(&self) -> &[V] {
        self.values.as_slice()
    }

    pub fn key_at(&self, index: usize) -> Option<&K> {
        self.keys.get(index)
    }

    pub fn value_at(&self, index: usize) -> Option<&V> {
        self.values.get(index)
    }

    pub fn first_key(&self) -> Option<&K> {
        self.keys.first()
    }

    pub fn last_key(&self) -> Option<&K> {
        self.keys.last()
    }

    pub fn parent(&self) -> Option<NodeId> {
        link(self.parent)
    }

    pub fn next(&self) -> Option<NodeId> {
        link(self.next)
    }

    pub fn previous(&self) -> Option<NodeId> {
        link(self.previous)
    }
}

// ============================================================================
// INTERNAL NODE IMPLEMENTATION
// ============================================================================

impl<K: Ord, V> InternalNode<K, V> {
    // ============================================================================
    // ROUTING
    // ============================================================================

    /// Index of the child whose subtree may hold `key`.
    ///
    /// First separator greater than `key` wins; a key equal to a separator
    /// routes to the right of it.
    pub fn child_index_for(&self, key: &K) -> usize {
        match self.keys.find_insertion_point(key) {
            Ok(index) => index + 1,
            Err(index) => index,
        }
    }

    /// The child whose subtree may hold `key`.
    pub fn child_for(&self, key: &K) -> Option<NodeRef<K, V>> {
        self.children.get(self.child_index_for(key)).copied()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.keys.contains_sorted(key)
    }

    // ============================================================================
    // INSERT OPERATIONS
    // ============================================================================

    /// Insert a separator with the child that sits to its right.
    ///
    /// Separators carry no values, so an existing separator is always
    /// refused. A full node is refused with [`Rejected::Overflow`].
    pub fn insert(&mut self, key: K, child: NodeRef<K, V>) -> Result<(), Rejected<K, NodeRef<K, V>>> {
        let index = match self.keys.find_insertion_point(&key) {
            Ok(_) => return Err(Rejected::Duplicate { key, item: child }),
            Err(index) => index,
        };
        if self.is_full() {
            return Err(Rejected::Overflow {
                node: self.id,
                key,
                item: child,
            });
        }
        if self.children.len() != self.keys.len() + 1 {
            return Err(Rejected::Invariant(BPlusTreeError::invariant(
                "InternalNode::insert",
                &format!(
                    "{} keys with {} children",
                    self.keys.len(),
                    self.children.len()
                ),
            )));
        }

        let broken = |e: BPlusTreeError| -> Rejected<K, NodeRef<K, V>> {
            Rejected::Invariant(e.into_invariant("InternalNode::insert"))
        };
        self.keys.insert_at(key, index).map_err(broken)?;
        self.children.insert_at(child, index + 1).map_err(broken)?;
        Ok(())
    }

    // ============================================================================
    // SPLIT
    // ============================================================================

    /// Split this node at `len / 2`, returning the promoted separator and
    /// the new high half.
    ///
    /// The median key leaves both halves. `self` keeps `keys[..mid]` and
    /// `children[..=mid]`; the high half gets the rest. The caller allocates
    /// the high half, reparents its children and finishes the sibling links.
    pub fn split(&mut self) -> BTreeResult<(K, InternalNode<K, V>)> {
        if self.len() < 3 {
            return Err(BPlusTreeError::invariant(
                "InternalNode::split",
                &format!("cannot split a node holding {} keys", self.len()),
            ));
        }
        let mid = self.len() / 2;
        let context = "InternalNode::split";
        let keys = self.keys.split_off(mid + 1).map_err(|e| e.into_invariant(context))?;
        let children = self
            .children
            .split_off(mid + 1)
            .map_err(|e| e.into_invariant(context))?;
        let promoted = self.keys.delete_at(mid).map_err(|e| e.into_invariant(context))?;

        let high = InternalNode {
            id: NULL_NODE,
            degree: self.degree,
            keys,
            children,
            parent: self.parent,
            next: self.next,
            previous: self.id,
        };
        Ok((promoted, high))
    }
}

impl<K, V> InternalNode<K, V> {
    /// Returns the number of separator keys in this node.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns true if this node is at capacity.
    pub fn is_full(&self) -> bool {
        self.keys.len() >= self.degree
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn keys(&self) -> &[K] {
        self.keys.as_slice()
    }

    pub fn children(&self) -> &[NodeRef<K, V>] {
        self.children.as_slice()
    }

    /// Position of `child` among this node's children.
    pub fn position_of(&self, child: NodeRef<K, V>) -> Option<usize> {
        self.children.index_of(&child)
    }

    pub fn parent(&self) -> Option<NodeId> {
        link(self.parent)
    }

    pub fn next(&self) -> Option<NodeId> {
        link(self.next)
    }

    pub fn previous(&self) -> Option<NodeId> {
        link(self.previous)
    }
}
