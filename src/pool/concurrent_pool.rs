//! Thread-safe reusable pool backed by [`ConcurrentArray`]
//!
//! `take` checks emptiness optimistically, then pops under the array's write
//! lock and calls [`Reusable::reuse`] on the popped object. `put` calls
//! [`Reusable::free`] and pushes under the write lock. Every object popped
//! leaves the array inside one critical section, so no two callers can ever
//! receive the same object without an intervening `put`.

use super::Reusable;
use crate::containers::ConcurrentArray;
use crossbeam_utils::CachePadded;
use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of pool traffic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// `take` calls served from the free list
    pub hits: u64,
    /// `take` calls that found the pool empty
    pub misses: u64,
    /// Objects returned with `put`
    pub returns: u64,
}

impl PoolStats {
    /// Fraction of takes served from the free list, 0.0 when none were made.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Thread-safe LIFO free list of reusable objects.
pub struct ConcurrentReusablePool<E> {
    free: ConcurrentArray<E>,
    hits: CachePadded<AtomicU64>,
    misses: CachePadded<AtomicU64>,
    returns: CachePadded<AtomicU64>,
}

impl<E: Reusable> ConcurrentReusablePool<E> {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty pool with room for `capacity` free objects
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            free: ConcurrentArray::with_capacity(capacity),
            hits: CachePadded::new(AtomicU64::new(0)),
            misses: CachePadded::new(AtomicU64::new(0)),
            returns: CachePadded::new(AtomicU64::new(0)),
        }
    }

    /// Pop the most recently freed object, if any
    pub fn take(&self) -> Option<E> {
        let popped = if self.free.is_empty() {
            None
        } else {
            self.free.pop()
        };

        match popped {
            Some(mut element) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                element.reuse();
                Some(element)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                log::trace!("pool empty on take");
                None
            }
        }
    }

    /// Pop a freed object or build one with `factory`
    pub fn take_or_else<F>(&self, factory: F) -> E
    where
        F: FnOnce() -> E,
    {
        match self.take() {
            Some(element) => element,
            None => factory(),
        }
    }

    /// Free `element` and push it onto the free list
    pub fn put(&self, mut element: E) {
        element.free();
        self.free.add(element);
        self.returns.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of free objects. Advisory under concurrent use.
    pub fn len(&self) -> usize {
        self.free.len()
    }

    /// Returns true if no free object is available. Advisory under concurrent use.
    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    /// Drop every free object
    pub fn clear(&self) {
        self.free.clear();
    }

    /// Traffic counters
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            returns: self.returns.load(Ordering::Relaxed),
        }
    }
}

impl<E: Reusable + PartialEq> ConcurrentReusablePool<E> {
    /// Remove a free object equal to `element` so it is never handed out
    pub fn remove(&self, element: &E) -> Option<E> {
        self.free.fast_remove(element)
    }
}

impl<E: Reusable> Default for ConcurrentReusablePool<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for ConcurrentReusablePool<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrentReusablePool")
            .field("free", &self.free.scoped_read(|a| a.len()))
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .field("returns", &self.returns.load(Ordering::Relaxed))
            .finish()
    }
}
