//! Arena storage for tree nodes.
//!
//! Nodes refer to each other (parent, siblings, children) by `NodeId` into
//! an arena instead of by pointer, so the back-references never own anything.
//! Nodes are only ever appended: the tree never frees a node individually.

use std::convert::TryFrom;

use crate::error::{BPlusTreeError, BTreeResult};

pub type NodeId = u32;
pub const NULL_NODE: NodeId = u32::MAX;

/// Statistics for a node arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaStats {
    pub allocated_count: usize,
    pub reserved_capacity: usize,
}

/// Append-only arena handing out dense `NodeId`s.
#[derive(Debug, Clone)]
pub struct NodeArena<T> {
    storage: Vec<T>,
}

impl<T> Default for NodeArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> NodeArena<T> {
    /// Create a new empty arena
    pub fn new() -> Self {
        Self {
            storage: Vec::new(),
        }
    }

    /// Arena holding a single item at id 0.
    pub fn with_first(item: T) -> Self {
        Self {
            storage: vec![item],
        }
    }

    /// Id the next `allocate` call will hand out.
    pub fn next_id(&self) -> BTreeResult<NodeId> {
        match NodeId::try_from(self.storage.len()) {
            Ok(id) if id != NULL_NODE => Ok(id),
            _ => Err(BPlusTreeError::invariant(
                "Arena allocation",
                &format!("{} nodes exhaust the id space", self.storage.len()),
            )),
        }
    }

    /// Allocate a new item in the arena and return its ID
    #[inline]
    pub fn allocate(&mut self, item: T) -> BTreeResult<NodeId> {
        let id = self.next_id()?;
        self.storage.push(item);
        Ok(id)
    }

    /// Get a reference to an item in the arena
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&T> {
        if id == NULL_NODE {
            return None;
        }
        self.storage.get(usize::try_from(id).ok()?)
    }

    /// Get a mutable reference to an item in the arena
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        if id == NULL_NODE {
            return None;
        }
        self.storage.get_mut(usize::try_from(id).ok()?)
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Drop every node. Ids handed out earlier become dangling.
    pub fn clear(&mut self) {
        self.storage.clear();
    }

    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            allocated_count: self.storage.len(),
            reserved_capacity: self.storage.capacity(),
        }
    }
}
