//! Fixed-capacity, count-tracked storage shared by every node.
//!
//! `BoundedArray` reserves its storage once and refuses to grow past the
//! capacity it was built with. Only the `[0, len)` region is ever observable.

use std::ops::Index;

use crate::error::{BPlusTreeError, BTreeResult};

/// Fixed-capacity ordered storage for node keys, values and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedArray<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> BoundedArray<T> {
    /// Creates an empty array that can hold at most `capacity` items.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Wraps existing items. Fails if they do not fit in `capacity`.
    pub fn from_vec(mut items: Vec<T>, capacity: usize) -> BTreeResult<Self> {
        if items.len() > capacity {
            return Err(BPlusTreeError::invariant(
                "BoundedArray::from_vec",
                &format!("{} items exceed capacity {}", items.len(), capacity),
            ));
        }
        items.reserve_exact(capacity - items.len());
        Ok(Self { items, capacity })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Inserts `value` at `index`, shifting `[index, len)` one slot right.
    pub fn insert_at(&mut self, value: T, index: usize) -> BTreeResult<()> {
        if self.is_full() {
            return Err(BPlusTreeError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        if index > self.items.len() {
            return Err(BPlusTreeError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        self.items.insert(index, value);
        Ok(())
    }

    /// Removes and returns the item at `index`, shifting the tail left.
    pub fn delete_at(&mut self, index: usize) -> BTreeResult<T> {
        if index >= self.items.len() {
            return Err(BPlusTreeError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    /// Same as `insert_at(value, len)`.
    pub fn append(&mut self, value: T) -> BTreeResult<()> {
        let len = self.items.len();
        self.insert_at(value, len)
    }

    /// Moves `[at, len)` into a new array with the same capacity.
    pub fn split_off(&mut self, at: usize) -> BTreeResult<Self> {
        if at > self.items.len() {
            return Err(BPlusTreeError::IndexOutOfRange {
                index: at,
                len: self.items.len(),
            });
        }
        let mut tail = Vec::with_capacity(self.capacity);
        tail.extend(self.items.drain(at..));
        Ok(Self {
            items: tail,
            capacity: self.capacity,
        })
    }

    /// Drops every item; capacity is unchanged.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Binary search comparing `selector(item)` against `key`.
    ///
    /// `Ok(i)` means found at `i`; `Err(i)` is the lower-bound insertion index.
    pub fn find_insertion_point_by<Q, F>(&self, key: &Q, mut selector: F) -> Result<usize, usize>
    where
        Q: Ord + ?Sized,
        F: FnMut(&T) -> &Q,
    {
        self.items.binary_search_by(|item| selector(item).cmp(key))
    }
}

impl<T: Ord> BoundedArray<T> {
    /// Binary search over the valid region.
    #[inline]
    pub fn find_insertion_point(&self, key: &T) -> Result<usize, usize> {
        self.items.binary_search(key)
    }

    /// Binary-search membership test for sorted key arrays.
    pub fn contains_sorted(&self, key: &T) -> bool {
        self.find_insertion_point(key).is_ok()
    }
}

impl<T: PartialEq> BoundedArray<T> {
    /// Linear equality scan.
    pub fn index_of(&self, value: &T) -> Option<usize> {
        self.items.iter().position(|item| item == value)
    }

    /// Overwrites the first item equal to `old` with `new`, in place.
    /// Returns false when nothing matched.
    pub fn replace_value(&mut self, old: &T, new: T) -> bool {
        match self.index_of(old) {
            Some(index) => {
                self.items[index] = new;
                true
            }
            None => false,
        }
    }
}

impl<T> Index<usize> for BoundedArray<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<'a, T> IntoIterator for &'a BoundedArray<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
