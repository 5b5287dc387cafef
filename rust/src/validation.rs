//! Validation utilities for BPlusTreeMap.
//!
//! This module walks the whole tree and reports the first broken structural
//! invariant it finds. Minimum occupancy is not checked: deletes never
//! rebalance, so underfull and empty non-root leaves are legal.

use crate::error::{BPlusTreeError, BTreeResult, TreeResult};
use crate::get_operations::missing_node;
use crate::types::{BPlusTreeMap, NodeId, NodeRef, NodeView, NULL_NODE};

/// Nodes of one tree level, left to right.
type Level<K, V> = Vec<NodeRef<K, V>>;

// ============================================================================
// VALIDATION METHODS
// ============================================================================

impl<K: Ord, V> BPlusTreeMap<K, V> {
    /// Check if the tree maintains B+ tree invariants.
    pub fn check_invariants(&self) -> bool {
        self.check_invariants_detailed().is_ok()
    }

    /// Check invariants with detailed error reporting.
    ///
    /// Covers per-node ordering and sizes, separator bounds for every
    /// subtree, parent back-references, uniform leaf depth, sibling links on
    /// every level, the completeness of the leaf chain, non-overlapping key
    /// ranges between neighbours, and agreement between the tree and its
    /// arenas.
    pub fn check_invariants_detailed(&self) -> BTreeResult<()> {
        let mut levels: Vec<Level<K, V>> = Vec::new();
        self.check_subtree(self.root, None, None, NULL_NODE, 0, &mut levels)?;

        let leaf_depth = levels.len() - 1;
        for (depth, level) in levels.iter().enumerate() {
            if level.iter().any(|node| node.is_leaf() != (depth == leaf_depth)) {
                return Err(violation(
                    "Leaf depth",
                    &format!("level {} mixes leaves and internal nodes", depth),
                ));
            }
            self.check_sibling_links(depth, level)?;
            self.check_level_order(depth, level)?;
        }

        self.check_leaf_chain_completeness(&levels[leaf_depth])?;
        self.check_linked_list_invariants()?;
        self.check_arena_tree_consistency()
    }

    /// Recursively check one node against the bounds its ancestors impose.
    ///
    /// Every key `k` under the node satisfies `lower <= k < upper`.
    fn check_subtree<'a>(
        &'a self,
        node: NodeRef<K, V>,
        lower: Option<&'a K>,
        upper: Option<&'a K>,
        parent: NodeId,
        depth: usize,
        levels: &mut Vec<Level<K, V>>,
    ) -> TreeResult<()> {
        if levels.len() <= depth {
            levels.push(Vec::new());
        }
        levels[depth].push(node);

        let view = self
            .node_view(node)
            .ok_or_else(|| missing_node("check_invariants", node.id()))?;
        let id = node.id();

        if view.node_ref() != node {
            return Err(violation(
                "Node identity",
                &format!("handle {:?} resolves to {:?}", node, view.node_ref()),
            ));
        }
        if view.parent() != (parent != NULL_NODE).then_some(parent) {
            return Err(violation(
                "Parent link",
                &format!("node {} has parent {:?}, expected {}", id, view.parent(), parent),
            ));
        }

        let keys = view.keys();
        if keys.len() > self.degree {
            return Err(violation(
                "Node capacity",
                &format!("node {} holds {} keys, degree is {}", id, keys.len(), self.degree),
            ));
        }
        if let Some(index) = keys.windows(2).position(|pair| pair[0] >= pair[1]) {
            return Err(violation(
                "Key order",
                &format!("node {} keys out of order at index {}", id, index + 1),
            ));
        }
        let in_bounds = |key: &K| {
            lower.map_or(true, |lower| key >= lower) && upper.map_or(true, |upper| key < upper)
        };
        if let Some(index) = keys.iter().position(|key| !in_bounds(key)) {
            return Err(violation(
                "Separator bounds",
                &format!("node {} key at index {} escapes its parent's range", id, index),
            ));
        }

        match view {
            NodeView::Leaf(leaf) => {
                if leaf.values().len() != keys.len() {
                    return Err(violation(
                        "Leaf storage",
                        &format!(
                            "leaf {} has {} keys and {} values",
                            id,
                            keys.len(),
                            leaf.values().len()
                        ),
                    ));
                }
                Ok(())
            }
            NodeView::Internal(internal) => {
                let children = internal.children();
                if keys.is_empty() || children.len() != keys.len() + 1 {
                    return Err(violation(
                        "Internal storage",
                        &format!(
                            "internal {} has {} keys and {} children",
                            id,
                            keys.len(),
                            children.len()
                        ),
                    ));
                }
                for (index, &child) in children.iter().enumerate() {
                    let child_lower = if index == 0 { lower } else { keys.get(index - 1) };
                    let child_upper = if index == keys.len() { upper } else { keys.get(index) };
                    self.check_subtree(child, child_lower, child_upper, id, depth + 1, levels)?;
                }
                Ok(())
            }
        }
    }

    /// Neighbours on one level point at each other, and the ends point nowhere.
    fn check_sibling_links(&self, depth: usize, level: &[NodeRef<K, V>]) -> TreeResult<()> {
        let views = level
            .iter()
            .map(|&node| {
                self.node_view(node)
                    .ok_or_else(|| missing_node("check_sibling_links", node.id()))
            })
            .collect::<TreeResult<Vec<_>>>()?;

        let (first, last) = match (views.first(), views.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Ok(()),
        };
        if first.previous().is_some() || last.next().is_some() {
            return Err(violation(
                "Sibling links",
                &format!("level {} chain does not end at its outermost nodes", depth),
            ));
        }
        for pair in views.windows(2) {
            let (left, right) = (pair[0].node_ref().id(), pair[1].node_ref().id());
            if pair[0].next() != Some(right) || pair[1].previous() != Some(left) {
                return Err(violation(
                    "Sibling links",
                    &format!("level {} nodes {} and {} are not linked both ways", depth, left, right),
                ));
            }
        }
        Ok(())
    }

    /// Key ranges of neighbours on a level are disjoint and ascending.
    /// Nodes emptied by deletes have no range and are skipped.
    fn check_level_order(&self, depth: usize, level: &[NodeRef<K, V>]) -> TreeResult<()> {
        let mut previous_max: Option<(&K, NodeId)> = None;
        for &node in level {
            let view = match self.node_view(node) {
                Some(view) if !view.is_empty() => view,
                _ => continue,
            };
            if let (Some((max, left)), Some(min)) = (previous_max, view.min_key()) {
                if max >= min {
                    return Err(violation(
                        "Sibling order",
                        &format!(
                            "level {} node {} overlaps its left neighbour {}",
                            depth,
                            node.id(),
                            left
                        ),
                    ));
                }
            }
            previous_max = view.max_key().map(|max| (max, node.id()));
        }
        Ok(())
    }

    /// The chain reached from the leftmost leaf visits exactly the leaves
    /// of the tree, in tree order.
    fn check_leaf_chain_completeness(&self, leaves: &[NodeRef<K, V>]) -> TreeResult<()> {
        let tree_order: Vec<NodeId> = leaves.iter().map(|leaf| leaf.id()).collect();
        let chain = self.leaf_ids();
        if tree_order != chain {
            return Err(violation(
                "Linked list",
                &format!("tree has {:?}, linked list has {:?}", tree_order, chain),
            ));
        }
        Ok(())
    }

    /// Iteration yields strictly ascending keys, as many as `len()` counts.
    fn check_linked_list_invariants(&self) -> TreeResult<()> {
        let keys = self.all_keys();
        if let Some(index) = keys.windows(2).position(|pair| pair[0] >= pair[1]) {
            return Err(violation(
                "Iteration order",
                &format!("iterator returned unsorted keys at index {}", index + 1),
            ));
        }
        if keys.len() != self.len() {
            return Err(violation(
                "Iteration count",
                &format!("iterator returned {} keys but tree has {} items", keys.len(), self.len()),
            ));
        }
        Ok(())
    }

    /// Nodes are never freed, so every allocated node must be in the tree.
    fn check_arena_tree_consistency(&self) -> TreeResult<()> {
        let (tree_leaves, tree_internals) = self.count_nodes_in_tree();
        let leaf_stats = self.leaf_arena_stats();
        let internal_stats = self.internal_arena_stats();

        if tree_leaves != leaf_stats.allocated_count {
            return Err(violation(
                "Leaf consistency check",
                &format!("{} in tree vs {} in arena", tree_leaves, leaf_stats.allocated_count),
            ));
        }
        if tree_internals != internal_stats.allocated_count {
            return Err(violation(
                "Internal consistency check",
                &format!(
                    "{} in tree vs {} in arena",
                    tree_internals, internal_stats.allocated_count
                ),
            ));
        }
        Ok(())
    }
}

fn violation(context: &str, details: &str) -> BPlusTreeError {
    BPlusTreeError::invariant(context, details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounded_array::BoundedArray;

    fn tree_with(degree: usize, keys: impl IntoIterator<Item = i32>) -> BPlusTreeMap<i32, i32> {
        let mut tree = BPlusTreeMap::new(degree).unwrap();
        for k in keys {
            tree.insert(k, k);
        }
        tree
    }

    #[test]
    fn test_fresh_and_grown_trees_validate() {
        assert!(BPlusTreeMap::<i32, i32>::new(4).unwrap().check_invariants());
        let tree = tree_with(4, (0..500).map(|k| (k * 7919) % 500));
        assert_eq!(tree.check_invariants_detailed(), Ok(()));
    }

    #[test]
    fn test_detects_out_of_order_leaf_keys() {
        let mut tree = tree_with(8, [1, 2, 3]);
        let leaf_id = tree.root.id();
        let scrambled = BoundedArray::from_vec(vec![3, 2, 1], 8).unwrap();
        tree.get_leaf_mut(leaf_id).unwrap().keys = scrambled;

        let err = tree.check_invariants_detailed().unwrap_err();
        assert!(err.is_invariant_violation());
        assert!(err.to_string().contains("Key order"));
        assert!(!tree.check_invariants());
    }

    #[test]
    fn test_detects_broken_sibling_link() {
        let mut tree = tree_with(4, 0..20);
        let first = tree.first_leaf_id().unwrap();
        tree.get_leaf_mut(first).unwrap().next = NULL_NODE;

        let err = tree.check_invariants_detailed().unwrap_err();
        assert!(err.to_string().contains("Sibling links"));
    }

    #[test]
    fn test_detects_key_outside_separator_range() {
        let mut tree = tree_with(4, 0..5);
        // Leaf [0, 1] sits left of separator 2; smuggle a larger key in
        let left = tree.first_leaf_id().unwrap();
        tree.get_leaf_mut(left).unwrap().insert(9, 9, true).unwrap();

        let err = tree.check_invariants_detailed().unwrap_err();
        assert!(err.to_string().contains("Separator bounds"));
    }

    #[test]
    fn test_detects_wrong_parent() {
        let mut tree = tree_with(4, 0..5);
        let last = tree.last_leaf_id().unwrap();
        tree.get_leaf_mut(last).unwrap().parent = NULL_NODE;

        let err = tree.check_invariants_detailed().unwrap_err();
        assert!(err.to_string().contains("Parent link"));
    }

    #[test]
    fn test_empty_leaves_are_legal() {
        let mut tree = tree_with(4, 0..40);
        for k in 0..30 {
            tree.delete(&k).unwrap();
        }
        assert!(tree.leaf_sizes().iter().filter(|&&size| size == 0).count() > 1);
        assert_eq!(tree.check_invariants_detailed(), Ok(()));
    }
}
