//! Iterator implementations for BPlusTreeMap.
//!
//! Every iterator walks the leaf chain, holding a borrowed reference to the
//! current leaf so each step touches the arena at most once per leaf.
//! Iterators are created fresh per call and reflect the tree as it is then.

use std::ops::{Bound, RangeBounds};

use crate::types::{BPlusTreeMap, LeafNode};

// ============================================================================
// ITERATOR STRUCTS
// ============================================================================

/// Iterator over key-value pairs in ascending key order.
pub struct ItemIterator<'a, K, V> {
    tree: &'a BPlusTreeMap<K, V>,
    leaf: Option<&'a LeafNode<K, V>>,
    index: usize,
}

/// Iterator over key-value pairs in descending key order, following the
/// `previous` links from the rightmost leaf.
pub struct ReverseItemIterator<'a, K, V> {
    tree: &'a BPlusTreeMap<K, V>,
    leaf: Option<&'a LeafNode<K, V>>,
    remaining: usize,
}

/// Iterator over keys in the B+ tree.
pub struct KeyIterator<'a, K, V> {
    items: ItemIterator<'a, K, V>,
}

/// Iterator over values in the B+ tree.
pub struct ValueIterator<'a, K, V> {
    items: ItemIterator<'a, K, V>,
}

/// Iterator over the entries within a key range.
///
/// Routing finds the leaf holding the start bound, then the iterator walks
/// the chain until a key passes the end bound.
pub struct RangeIterator<'a, K, V> {
    items: ItemIterator<'a, K, V>,
    end: Bound<K>,
    finished: bool,
}

// ============================================================================
// BPLUSTREE ITERATOR METHODS
// ============================================================================

impl<K, V> BPlusTreeMap<K, V> {
    /// Returns an iterator over all key-value pairs in sorted order.
    pub fn items(&self) -> ItemIterator<'_, K, V> {
        ItemIterator::new(self)
    }

    /// Returns an iterator over all key-value pairs in descending order.
    pub fn items_rev(&self) -> ReverseItemIterator<'_, K, V> {
        ReverseItemIterator::new(self)
    }

    /// Returns an iterator over all keys in sorted order.
    pub fn keys(&self) -> KeyIterator<'_, K, V> {
        KeyIterator {
            items: self.items(),
        }
    }

    /// Returns an iterator over all values in key order.
    pub fn values(&self) -> ValueIterator<'_, K, V> {
        ValueIterator {
            items: self.items(),
        }
    }

    /// Borrowed keys in ascending order, collected.
    pub fn all_keys(&self) -> Vec<&K> {
        self.keys().collect()
    }

    /// Borrowed values in key order, collected.
    pub fn all_values(&self) -> Vec<&V> {
        self.values().collect()
    }

    /// Smallest entry, skipping leaves emptied by deletes.
    pub fn first(&self) -> Option<(&K, &V)> {
        self.items().next()
    }

    /// Largest entry, skipping leaves emptied by deletes.
    pub fn last(&self) -> Option<(&K, &V)> {
        self.items_rev().next()
    }
}

impl<K: Ord + Clone, V> BPlusTreeMap<K, V> {
    /// Returns an iterator over the entries whose keys fall in `range`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree::BPlusTreeMap;
    ///
    /// let tree: BPlusTreeMap<i32, i32> = (0..20).map(|i| (i, i * i)).collect();
    /// let squares: Vec<i32> = tree.range(3..6).map(|(_, v)| *v).collect();
    /// assert_eq!(squares, vec![9, 16, 25]);
    /// assert_eq!(tree.range(18..).count(), 2);
    /// ```
    pub fn range<R>(&self, range: R) -> RangeIterator<'_, K, V>
    where
        R: RangeBounds<K>,
    {
        let items = match range.start_bound() {
            Bound::Unbounded => self.items(),
            Bound::Included(start) => self.items_from(start, false),
            Bound::Excluded(start) => self.items_from(start, true),
        };
        RangeIterator {
            items,
            end: range.end_bound().cloned(),
            finished: false,
        }
    }

    /// Position an item iterator at the first key `>= start` (or `> start`).
    fn items_from(&self, start: &K, exclusive: bool) -> ItemIterator<'_, K, V> {
        let leaf = self
            .find_leaf(start)
            .ok()
            .and_then(|id| self.get_leaf(id));
        let index = leaf.map_or(0, |leaf| match leaf.keys.find_insertion_point(start) {
            Ok(index) if exclusive => index + 1,
            Ok(index) | Err(index) => index,
        });
        ItemIterator {
            tree: self,
            leaf,
            index,
        }
    }
}

// ============================================================================
// ITEMITERATOR IMPLEMENTATION
// ============================================================================

impl<'a, K, V> ItemIterator<'a, K, V> {
    pub fn new(tree: &'a BPlusTreeMap<K, V>) -> Self {
        Self {
            tree,
            leaf: tree.first_leaf_id().and_then(|id| tree.get_leaf(id)),
            index: 0,
        }
    }
}

impl<'a, K, V> Iterator for ItemIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let leaf = self.leaf?;
            if let (Some(key), Some(value)) = (leaf.key_at(self.index), leaf.value_at(self.index))
            {
                self.index += 1;
                return Some((key, value));
            }
            self.leaf = leaf.next().and_then(|id| self.tree.get_leaf(id));
            self.index = 0;
        }
    }
}

// ============================================================================
// REVERSEITEMITERATOR IMPLEMENTATION
// ============================================================================

impl<'a, K, V> ReverseItemIterator<'a, K, V> {
    pub fn new(tree: &'a BPlusTreeMap<K, V>) -> Self {
        let leaf = tree.last_leaf_id().and_then(|id| tree.get_leaf(id));
        Self {
            tree,
            leaf,
            remaining: leaf.map_or(0, |leaf| leaf.len()),
        }
    }
}

impl<'a, K, V> Iterator for ReverseItemIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let leaf = self.leaf?;
            if self.remaining > 0 {
                self.remaining -= 1;
                return leaf
                    .key_at(self.remaining)
                    .zip(leaf.value_at(self.remaining));
            }
            self.leaf = leaf.previous().and_then(|id| self.tree.get_leaf(id));
            self.remaining = self.leaf.map_or(0, |leaf| leaf.len());
        }
    }
}

// ============================================================================
// KEY / VALUE ITERATORS
// ============================================================================

impl<'a, K, V> Iterator for KeyIterator<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next().map(|(k, _)| k)
    }
}

impl<'a, K, V> Iterator for ValueIterator<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next().map(|(_, v)| v)
    }
}

// ============================================================================
// RANGEITERATOR IMPLEMENTATION
// ============================================================================

impl<'a, K: Ord, V> Iterator for RangeIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let (key, value) = self.items.next()?;
        let beyond_end = match &self.end {
            Bound::Included(end) => key > end,
            Bound::Excluded(end) => key >= end,
            Bound::Unbounded => false,
        };
        if beyond_end {
            self.finished = true;
            return None;
        }
        Some((key, value))
    }
}

// ============================================================================
// COLLECTION TRAITS
// ============================================================================

impl<'a, K, V> IntoIterator for &'a BPlusTreeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = ItemIterator<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.items()
    }
}

impl<K: Ord + Clone, V> FromIterator<(K, V)> for BPlusTreeMap<K, V> {
    /// Builds a default-degree tree; later duplicates overwrite earlier ones.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::default();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord + Clone, V> Extend<(K, V)> for BPlusTreeMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}
