//! Chain nodes and the arena that recycles them
//!
//! Nodes live in one `Vec` and refer to each other by slot index, with
//! [`TAIL`] marking the end of a chain. Freed slots go onto a LIFO free list
//! and are handed out again before the arena grows.

use crate::containers::Array;
use std::fmt;

/// End-of-chain marker
pub(crate) const TAIL: usize = usize::MAX;

/// One key/value pair linked into a bucket chain.
#[derive(Clone)]
pub(crate) struct Entry<K, V> {
    hash: i32,
    key: K,
    value: Option<V>,
    next: usize,
}

impl<K: Copy, V> Entry<K, V> {
    /// Spread hash of the key
    #[inline]
    pub(crate) fn hash(&self) -> i32 {
        self.hash
    }

    #[inline]
    pub(crate) fn key(&self) -> K {
        self.key
    }

    /// Stored value, `None` while the slot sits in the free list
    #[inline]
    pub(crate) fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    /// Slot index of the next node in the chain, or [`TAIL`]
    #[inline]
    pub(crate) fn next(&self) -> usize {
        self.next
    }

    #[inline]
    pub(crate) fn matches(&self, hash: i32, key: K) -> bool
    where
        K: PartialEq,
    {
        self.hash == hash && self.key == key
    }

    #[inline]
    pub(crate) fn value_mut(&mut self) -> Option<&mut V> {
        self.value.as_mut()
    }

    #[inline]
    pub(crate) fn replace_value(&mut self, value: V) -> Option<V> {
        self.value.replace(value)
    }

    #[inline]
    pub(crate) fn take_value(&mut self) -> Option<V> {
        self.value.take()
    }

    #[inline]
    pub(crate) fn set_next(&mut self, next: usize) {
        self.next = next;
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Entry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Entry");
        d.field("hash", &self.hash)
            .field("key", &self.key)
            .field("value", &self.value);
        if self.next == TAIL {
            d.field("next", &format_args!("TAIL"));
        } else {
            d.field("next", &self.next);
        }
        d.finish()
    }
}

/// Slot arena with a LIFO free list.
///
/// A slot index is owned by exactly one chain or by the free list, never
/// both: [`EntryPool::take`] removes it from the free list and
/// [`EntryPool::put`] clears it before pushing it back.
pub(crate) struct EntryPool<K, V> {
    slots: Vec<Entry<K, V>>,
    free: Array<usize>,
}

impl<K: Copy, V> EntryPool<K, V> {
    /// Create an empty arena
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Array::new(),
        }
    }

    /// Initialize a slot with the given fields and return its index.
    ///
    /// Reuses the most recently freed slot, otherwise appends a new one.
    pub(crate) fn take(&mut self, hash: i32, key: K, value: V, next: usize) -> usize {
        match self.free.pop() {
            Some(index) => {
                let entry = &mut self.slots[index];
                entry.hash = hash;
                entry.key = key;
                entry.value = Some(value);
                entry.next = next;
                index
            }
            None => {
                log::trace!("entry pool empty, allocating slot {}", self.slots.len());
                self.slots.push(Entry {
                    hash,
                    key,
                    value: Some(value),
                    next,
                });
                self.slots.len() - 1
            }
        }
    }

    /// Clear the slot at `index` and push it onto the free list.
    ///
    /// Returns the value the slot held. The caller must already have
    /// unlinked the slot from its chain.
    pub(crate) fn put(&mut self, index: usize) -> Option<V> {
        debug_assert!(!self.free.contains(&index), "slot {} freed twice", index);
        let entry = &mut self.slots[index];
        entry.next = TAIL;
        let value = entry.value.take();
        self.free.add(index);
        value
    }

    #[inline]
    pub(crate) fn get(&self, index: usize) -> &Entry<K, V> {
        &self.slots[index]
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, index: usize) -> &mut Entry<K, V> {
        &mut self.slots[index]
    }

    /// Number of slots waiting on the free list
    pub(crate) fn pooled(&self) -> usize {
        self.free.len()
    }

    /// Number of slots ever allocated, live or free
    #[cfg(test)]
    pub(crate) fn allocated(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots currently owned by a chain
    #[cfg(test)]
    pub(crate) fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}

impl<K: Copy, V> Default for EntryPool<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for EntryPool<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryPool")
            .field("allocated", &self.slots.len())
            .field("pooled", &self.free.len())
            .finish()
    }
}
