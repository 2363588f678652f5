//! ConcurrentArray: an [`Array`] guarded by a single [`StampedLock`]
//!
//! Every structural mutation (add, remove, growth) runs in the lock's write
//! mode, so growth copies elements into the new buffer with no intermediate
//! state visible to other threads. Presence checks, size queries and
//! snapshots go through the optimistic read path and only block while a
//! writer is inside its critical section.
//!
//! Composed structures use [`ConcurrentArray::scoped_read`] and
//! [`ConcurrentArray::scoped_write`] to run several operations under one
//! critical section:
//!
//! ```rust
//! use primkey::containers::ConcurrentArray;
//!
//! let array = ConcurrentArray::new();
//! array.scoped_write(|a| {
//!     a.add(1).add(2).add(3);
//! });
//! let sum: i32 = array.scoped_read(|a| a.iter().sum());
//! assert_eq!(sum, 6);
//! ```

use super::array::Array;
use crate::config::ArrayConfig;
use crate::error::Result;
use crate::sync::{LockStats, StampedLock};
use std::fmt;

/// Thread-safe growable array guarded by a stamped lock.
pub struct ConcurrentArray<T> {
    inner: StampedLock<Array<T>>,
}

impl<T> ConcurrentArray<T> {
    /// Create an empty array with the default capacity
    pub fn new() -> Self {
        Self::from_array(Array::new())
    }

    /// Create an empty array with room for `capacity` elements
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_array(Array::with_capacity(capacity))
    }

    /// Create an array from a validated configuration
    pub fn with_config(config: ArrayConfig) -> Result<Self> {
        Ok(Self::from_array(Array::with_config(config)?))
    }

    /// Wrap an existing array
    pub fn from_array(array: Array<T>) -> Self {
        Self {
            inner: StampedLock::new(array),
        }
    }

    /// Run `f` with the array held in read mode.
    pub fn scoped_read<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&Array<T>) -> R,
    {
        self.inner.read(f)
    }

    /// Run `f` with the array held in write mode.
    ///
    /// The lock is released on every exit path, including a panic inside `f`.
    pub fn scoped_write<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut Array<T>) -> R,
    {
        self.inner.write(f)
    }

    /// Run `f` under an optimistic read, escalating to read mode on failure.
    ///
    /// `f` may run twice and must not have side effects.
    pub fn optimistic_read<R, F>(&self, f: F) -> R
    where
        F: Fn(&Array<T>) -> R,
    {
        self.inner.read_optimistic(f)
    }

    /// Number of elements. Advisory while other threads mutate.
    pub fn len(&self) -> usize {
        self.inner.read_optimistic(|a| a.len())
    }

    /// Returns true if empty. Advisory while other threads mutate.
    pub fn is_empty(&self) -> bool {
        self.inner.read_optimistic(|a| a.is_empty())
    }

    /// Append an element
    pub fn add(&self, element: T) {
        self.inner.write(|a| {
            a.add(element);
        });
    }

    /// Remove the element at `index` with swap-with-last semantics
    pub fn fast_remove_by_index(&self, index: usize) -> Option<T> {
        self.inner.write(|a| a.fast_remove_by_index(index))
    }

    /// Remove the element at `index`, preserving order
    pub fn slow_remove_by_index(&self, index: usize) -> Option<T> {
        self.inner.write(|a| a.slow_remove_by_index(index))
    }

    /// Remove and return the last element
    pub fn pop(&self) -> Option<T> {
        self.inner.write(|a| a.pop())
    }

    /// Remove and return the first element
    pub fn poll(&self) -> Option<T> {
        self.inner.write(|a| a.poll())
    }

    /// Remove every element
    pub fn clear(&self) {
        self.inner.write(|a| a.clear());
    }

    /// Visit every element in order while holding read mode.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&T),
    {
        self.inner.read(|a| a.iter().for_each(|e| f(e)));
    }

    /// Lock usage counters
    pub fn stats(&self) -> LockStats {
        self.inner.stats()
    }

    /// Consume into the underlying array
    pub fn into_inner(self) -> Array<T> {
        self.inner.into_inner()
    }
}

impl<T: Clone> ConcurrentArray<T> {
    /// Clone of the element at `index`
    pub fn get(&self, index: usize) -> Option<T> {
        self.inner.read_optimistic(|a| a.get(index).cloned())
    }

    /// Clone of the first element
    pub fn first(&self) -> Option<T> {
        self.inner.read_optimistic(|a| a.first().cloned())
    }

    /// Clone of the last element
    pub fn last(&self) -> Option<T> {
        self.inner.read_optimistic(|a| a.last().cloned())
    }

    /// Consistent copy of every element, in order
    pub fn snapshot(&self) -> Vec<T> {
        self.inner.read_optimistic(|a| a.as_slice().to_vec())
    }
}

impl<T: PartialEq> ConcurrentArray<T> {
    /// Returns true if an equal element is present
    pub fn contains(&self, element: &T) -> bool {
        self.inner.read_optimistic(|a| a.contains(element))
    }

    /// Append `element` unless an equal one is already present.
    ///
    /// Returns true if the element was added. The check and the add happen
    /// under one write critical section.
    pub fn add_if_absent(&self, element: T) -> bool {
        self.inner.write(|a| {
            if a.contains(&element) {
                false
            } else {
                a.add(element);
                true
            }
        })
    }

    /// Remove the first equal element with swap-with-last semantics
    pub fn fast_remove(&self, element: &T) -> Option<T> {
        self.inner.write(|a| a.fast_remove(element))
    }

    /// Remove the first equal element, preserving order
    pub fn slow_remove(&self, element: &T) -> Option<T> {
        self.inner.write(|a| a.slow_remove(element))
    }
}

impl<T> Default for ConcurrentArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Array<T>> for ConcurrentArray<T> {
    fn from(array: Array<T>) -> Self {
        Self::from_array(array)
    }
}

impl<T> FromIterator<T> for ConcurrentArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_array(iter.into_iter().collect())
    }
}

impl<T: fmt::Debug> fmt::Debug for ConcurrentArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.read(|a| f.debug_tuple("ConcurrentArray").field(a).finish())
    }
}
