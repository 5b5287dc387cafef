//! Split observation hooks.
//!
//! Closures registered here run synchronously inside the split protocol.
//! They only ever see shared [`NodeView`]s, so they cannot change the tree.

use std::fmt;

use crate::types::{BPlusTreeMap, NodeView};

type BeforeSplit<K, V> = Box<dyn FnMut(NodeView<'_, K, V>)>;
type AfterSplit<K, V> = Box<dyn FnMut(NodeView<'_, K, V>, NodeView<'_, K, V>)>;

/// Registered split callbacks, at most one of each kind.
pub struct SplitObservers<K, V> {
    pub(crate) before: Option<BeforeSplit<K, V>>,
    pub(crate) after: Option<AfterSplit<K, V>>,
}

impl<K, V> Default for SplitObservers<K, V> {
    fn default() -> Self {
        Self {
            before: None,
            after: None,
        }
    }
}

impl<K, V> fmt::Debug for SplitObservers<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SplitObservers")
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .finish()
    }
}

impl<K, V> SplitObservers<K, V> {
    pub(crate) fn notify_before(&mut self, node: NodeView<'_, K, V>) {
        if let Some(hook) = self.before.as_mut() {
            hook(node);
        }
    }

    pub(crate) fn notify_after(&mut self, lo: NodeView<'_, K, V>, hi: NodeView<'_, K, V>) {
        if let Some(hook) = self.after.as_mut() {
            hook(lo, hi);
        }
    }
}

impl<K, V> BPlusTreeMap<K, V> {
    /// Register a callback fired with the overflowing node just before it splits.
    ///
    /// Replaces any earlier before-split callback.
    pub fn on_before_split<F>(&mut self, hook: F)
    where
        F: FnMut(NodeView<'_, K, V>) + 'static,
    {
        self.observers.before = Some(Box::new(hook));
    }

    /// Register a callback fired with the low and high halves right after a split.
    ///
    /// Replaces any earlier after-split callback.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::cell::Cell;
    /// use std::rc::Rc;
    /// use bplustree::BPlusTreeMap;
    ///
    /// let splits = Rc::new(Cell::new(0));
    /// let seen = Rc::clone(&splits);
    ///
    /// let mut tree: BPlusTreeMap<i32, ()> = BPlusTreeMap::new(4).unwrap();
    /// tree.on_after_split(move |lo, hi| {
    ///     assert!(lo.max_key() < hi.min_key());
    ///     seen.set(seen.get() + 1);
    /// });
    /// for i in 0..5 {
    ///     tree.insert(i, ());
    /// }
    /// assert_eq!(splits.get(), 1);
    /// ```
    pub fn on_after_split<F>(&mut self, hook: F)
    where
        F: FnMut(NodeView<'_, K, V>, NodeView<'_, K, V>) + 'static,
    {
        self.observers.after = Some(Box::new(hook));
    }

    /// Remove both split callbacks.
    pub fn clear_split_observers(&mut self) {
        self.observers = SplitObservers::default();
    }
}
