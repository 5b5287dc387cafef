//! Tree structure queries for BPlusTreeMap.
//!
//! This module contains size queries, node counting, per-level and
//! per-leaf statistics, and the leaf chain navigation helpers that
//! iteration and validation share.

use crate::arena::ArenaStats;
use crate::types::{BPlusTreeMap, LeafNode, NodeId, NodeRef};

// ============================================================================
// TREE STRUCTURE OPERATIONS
// ============================================================================

impl<K, V> BPlusTreeMap<K, V> {
    /// Returns the number of entries in the tree.
    ///
    /// Sums the leaf sizes along the sibling chain, starting from the
    /// leftmost leaf.
    pub fn len(&self) -> usize {
        self.leaves().map(|leaf| leaf.len()).sum()
    }

    /// Returns true if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.leaves().all(|leaf| leaf.is_empty())
    }

    /// Returns true if the root is a leaf node.
    pub fn is_leaf_root(&self) -> bool {
        self.root.is_leaf()
    }

    /// Handle of the current root.
    pub fn root(&self) -> NodeRef<K, V> {
        self.root
    }

    /// Returns the number of leaf nodes in the tree.
    pub fn leaf_count(&self) -> usize {
        self.count_nodes_in_tree().0
    }

    /// Returns the number of internal nodes in the tree.
    pub fn internal_count(&self) -> usize {
        self.count_nodes_in_tree().1
    }

    /// Count the leaf and internal nodes reachable from the root.
    pub fn count_nodes_in_tree(&self) -> (usize, usize) {
        self.count_nodes_recursive(self.root)
    }

    fn count_nodes_recursive(&self, node: NodeRef<K, V>) -> (usize, usize) {
        match node {
            NodeRef::Leaf(_, _) => (1, 0),
            NodeRef::Internal(id, _) => match self.get_internal(id) {
                Some(internal) => internal.children().iter().fold((0, 1), |acc, &child| {
                    let (leaves, internals) = self.count_nodes_recursive(child);
                    (acc.0 + leaves, acc.1 + internals)
                }),
                // Invalid internal reference
                None => (0, 0),
            },
        }
    }

    /// Number of levels, counting the leaf level. A lone root leaf is height 1.
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut node = self.root;
        while let NodeRef::Internal(id, _) = node {
            match self
                .get_internal(id)
                .and_then(|internal| internal.children().first())
            {
                Some(&child) => node = child,
                None => break,
            }
            height += 1;
        }
        height
    }

    /// Entry counts of each leaf in key order.
    pub fn leaf_sizes(&self) -> Vec<usize> {
        self.leaves().map(|leaf| leaf.len()).collect()
    }

    /// Separator keys of the root, empty while the root is a leaf.
    pub fn root_keys(&self) -> Vec<&K> {
        match self.root {
            NodeRef::Leaf(_, _) => Vec::new(),
            NodeRef::Internal(id, _) => self
                .get_internal(id)
                .map(|root| root.keys().iter().collect())
                .unwrap_or_default(),
        }
    }

    pub fn leaf_arena_stats(&self) -> ArenaStats {
        self.leaf_arena.stats()
    }

    pub fn internal_arena_stats(&self) -> ArenaStats {
        self.internal_arena.stats()
    }

    // ============================================================================
    // TREE NAVIGATION HELPERS
    // ============================================================================

    /// The leftmost leaf, found by descending the first child of every level.
    pub fn first_leaf_id(&self) -> Option<NodeId> {
        self.edge_leaf_id(|children| children.first())
    }

    /// The rightmost leaf, found by descending the last child of every level.
    pub fn last_leaf_id(&self) -> Option<NodeId> {
        self.edge_leaf_id(|children| children.last())
    }

    fn edge_leaf_id<F>(&self, pick: F) -> Option<NodeId>
    where
        F: Fn(&[NodeRef<K, V>]) -> Option<&NodeRef<K, V>>,
    {
        let mut node = self.root;
        loop {
            match node {
                NodeRef::Leaf(id, _) => return Some(id),
                NodeRef::Internal(id, _) => {
                    node = *pick(self.get_internal(id)?.children())?;
                }
            }
        }
    }

    /// Leaf ids in chain order.
    pub(crate) fn leaf_ids(&self) -> Vec<NodeId> {
        self.leaves().map(|leaf| leaf.id()).collect()
    }

    /// Leaves in chain order.
    pub(crate) fn leaves(&self) -> impl Iterator<Item = &LeafNode<K, V>> + '_ {
        let first = self.first_leaf_id().and_then(|id| self.get_leaf(id));
        std::iter::successors(first, move |leaf| {
            leaf.next().and_then(|id| self.get_leaf(id))
        })
    }
}
