//! Thread-safe primitive-keyed dictionary
//!
//! The bucket table sits behind a [`StampedLock`]. Writers (`put`, `remove`,
//! `clear`, `apply` and resizes triggered by `put`) hold it in exclusive mode,
//! so two writers never interleave and a resize is never observed half done.
//! `get` and `contains_key` take the optimistic path: they read without
//! blocking and only fall back to a shared read when a writer was active.
//!
//! A `get` racing a `remove` of the same key may return either the value or
//! `None`. Callers needing a stronger ordering must synchronize externally.
//!
//! `len` and `is_empty` read a mirror of the size that writers publish with
//! release ordering before leaving the critical section.
//!
//! # Examples
//!
//! ```rust
//! use primkey::dictionary::ConcurrentIntegerDictionary;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let dict = Arc::new(ConcurrentIntegerDictionary::new());
//! let handles: Vec<_> = (0..4)
//!     .map(|t| {
//!         let dict = Arc::clone(&dict);
//!         thread::spawn(move || {
//!             for i in 0..100 {
//!                 dict.put(t * 100 + i, i);
//!             }
//!         })
//!     })
//!     .collect();
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! assert_eq!(dict.len(), 400);
//! assert_eq!(dict.get(250), Some(50));
//! ```

use super::table::Table;
use super::{Dictionary, DictionaryKey};
use crate::config::{Config, DictionaryConfig};
use crate::error::{PrimkeyError, Result};
use crate::sync::{LockStats, StampedLock, StampedWriteGuard};
use crossbeam_utils::CachePadded;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Open-chaining hash table keyed by a primitive integer, shareable across threads.
pub struct ConcurrentDictionary<K, V> {
    table: StampedLock<Table<K, V>>,
    size: CachePadded<AtomicUsize>,
}

impl<K: DictionaryKey, V> ConcurrentDictionary<K, V> {
    /// Create a dictionary with 16 buckets and load factor 0.75
    pub fn new() -> Self {
        Self::from_table(Table::new(&DictionaryConfig::default()))
    }

    /// Create a dictionary with at least `capacity` buckets
    pub fn with_capacity(capacity: usize) -> Self {
        let config = DictionaryConfig {
            initial_capacity: capacity,
            ..DictionaryConfig::default()
        };
        Self::from_table(Table::new(&config))
    }

    /// Create a dictionary from explicit sizing parameters
    pub fn with_capacity_and_load_factor(capacity: usize, load_factor: f32) -> Result<Self> {
        Self::with_config(DictionaryConfig::new(capacity, load_factor))
    }

    /// Create a dictionary from a configuration, validating it first
    pub fn with_config(config: DictionaryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_table(Table::new(&config)))
    }

    fn from_table(table: Table<K, V>) -> Self {
        Self {
            size: CachePadded::new(AtomicUsize::new(table.len())),
            table: StampedLock::new(table),
        }
    }

    /// Run `f` on the table in exclusive mode and publish the resulting size,
    /// also when `f` unwinds.
    fn write<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut Table<K, V>) -> R,
    {
        let mut section = WriteSection {
            table: self.table.write_guard(),
            size: &self.size,
        };
        f(&mut *section.table)
    }

    /// Insert or replace, returning the previous value
    pub fn put(&self, key: K, value: V) -> Option<V> {
        self.write(|t| t.put(key, value))
    }

    /// Remove `key`, returning its value
    pub fn remove(&self, key: K) -> Option<V> {
        self.write(|t| t.remove(key))
    }

    pub fn contains_key(&self, key: K) -> bool {
        self.table.read_optimistic(|t| t.contains_key(key))
    }

    /// Returns true if some key maps to `value`; `None` is an invalid argument
    pub fn contains_value(&self, value: Option<&V>) -> Result<bool>
    where
        V: PartialEq,
    {
        let value = value.ok_or_else(|| PrimkeyError::invalid_argument("value is absent"))?;
        Ok(self.table.read(|t| t.contains_value(value)))
    }

    /// Number of stored pairs, as published by the last completed write
    pub fn len(&self) -> usize {
        self.size.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every pair, returning the chain nodes to the entry pool
    pub fn clear(&self) {
        self.write(|t| t.clear());
    }

    /// Replace every value `v` with `transform(v)` in one critical section
    pub fn apply<F>(&self, transform: F)
    where
        F: FnMut(V) -> V,
    {
        self.write(|t| t.apply(transform));
    }

    /// Visit every value while holding the table in shared mode.
    ///
    /// Writers block until the visit completes. Calling a mutating method on
    /// this dictionary from `f` deadlocks.
    pub fn for_each_value<F>(&self, mut f: F)
    where
        F: FnMut(&V),
    {
        self.table.read(|t| t.iter().for_each(|(_, v)| f(v)));
    }

    /// Visit every pair while holding the table in shared mode
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(K, &V),
    {
        self.table.read(|t| t.iter().for_each(|(k, v)| f(k, v)));
    }

    /// Visit every pair with a shared argument while holding the table in shared mode
    pub fn for_each_with<T, F>(&self, arg: &T, mut f: F)
    where
        F: FnMut(K, &V, &T),
    {
        self.table.read(|t| t.iter().for_each(|(k, v)| f(k, v, arg)));
    }

    /// Current bucket count
    pub fn capacity(&self) -> usize {
        self.table.read_optimistic(|t| t.capacity())
    }

    /// Size at which the next insert doubles the bucket count
    pub fn threshold(&self) -> usize {
        self.table.read_optimistic(|t| t.threshold())
    }

    pub fn load_factor(&self) -> f32 {
        self.table.read_optimistic(|t| t.load_factor())
    }

    /// Free chain nodes waiting to be reused
    pub fn pooled_entries(&self) -> usize {
        self.table.read_optimistic(|t| t.pooled_entries())
    }

    /// Lock usage counters
    pub fn lock_stats(&self) -> LockStats {
        self.table.stats()
    }
}

impl<K: DictionaryKey, V: Clone> ConcurrentDictionary<K, V> {
    /// Clone of the value stored under `key`
    pub fn get(&self, key: K) -> Option<V> {
        self.table.read_optimistic(|t| t.get(key).cloned())
    }

    /// Value under `key`, inserting `factory()` on a miss.
    ///
    /// `factory` runs at most once per call, with no lock held, so it may
    /// read or write this dictionary. The miss is re-checked in exclusive
    /// mode: when another thread stored a value for `key` in the meantime,
    /// that value wins and the freshly built one is dropped. Every caller
    /// gets the value that ended up stored.
    pub fn get_or_insert_with<F>(&self, key: K, factory: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(key) {
            return value;
        }
        let candidate = factory();
        self.write(|t| match t.get(key) {
            Some(stored) => stored.clone(),
            None => {
                t.put(key, candidate.clone());
                candidate
            }
        })
    }

    /// Value under `key`, inserting `factory(key)` on a miss
    pub fn get_or_insert_with_key<F>(&self, key: K, factory: F) -> V
    where
        F: FnOnce(K) -> V,
    {
        self.get_or_insert_with(key, || factory(key))
    }

    /// Value under `key`, inserting `factory(arg)` on a miss
    pub fn get_or_insert_with_arg<T, F>(&self, key: K, arg: T, factory: F) -> V
    where
        F: FnOnce(T) -> V,
    {
        self.get_or_insert_with(key, || factory(arg))
    }

    /// Consistent copy of every pair, in bucket order
    pub fn to_vec(&self) -> Vec<(K, V)> {
        self.table
            .read_optimistic(|t| t.iter().map(|(k, v)| (k, v.clone())).collect())
    }
}

impl<K: DictionaryKey, V: Clone> Dictionary<K, V> for ConcurrentDictionary<K, V> {
    fn put(&mut self, key: K, value: V) -> Option<V> {
        ConcurrentDictionary::put(self, key, value)
    }

    fn get(&self, key: K) -> Option<V> {
        ConcurrentDictionary::get(self, key)
    }

    fn get_or_insert_with<F>(&mut self, key: K, factory: F) -> V
    where
        F: FnOnce() -> V,
    {
        ConcurrentDictionary::get_or_insert_with(self, key, factory)
    }

    fn get_or_insert_with_key<F>(&mut self, key: K, factory: F) -> V
    where
        F: FnOnce(K) -> V,
    {
        ConcurrentDictionary::get_or_insert_with_key(self, key, factory)
    }

    fn get_or_insert_with_arg<T, F>(&mut self, key: K, arg: T, factory: F) -> V
    where
        F: FnOnce(T) -> V,
    {
        ConcurrentDictionary::get_or_insert_with_arg(self, key, arg, factory)
    }

    fn remove(&mut self, key: K) -> Option<V> {
        ConcurrentDictionary::remove(self, key)
    }

    fn contains_key(&self, key: K) -> bool {
        ConcurrentDictionary::contains_key(self, key)
    }

    fn contains_value(&self, value: Option<&V>) -> Result<bool>
    where
        V: PartialEq,
    {
        ConcurrentDictionary::contains_value(self, value)
    }

    fn len(&self) -> usize {
        ConcurrentDictionary::len(self)
    }

    fn clear(&mut self) {
        ConcurrentDictionary::clear(self);
    }

    fn apply<F>(&mut self, transform: F)
    where
        F: FnMut(V) -> V,
    {
        ConcurrentDictionary::apply(self, transform);
    }

    fn for_each_value<F>(&self, f: F)
    where
        F: FnMut(&V),
    {
        ConcurrentDictionary::for_each_value(self, f);
    }

    fn for_each<F>(&self, f: F)
    where
        F: FnMut(K, &V),
    {
        ConcurrentDictionary::for_each(self, f);
    }

    fn for_each_with<T, F>(&self, arg: &T, f: F)
    where
        F: FnMut(K, &V, &T),
    {
        ConcurrentDictionary::for_each_with(self, arg, f);
    }
}

/// Exclusive section over the table. Publishes the size before the lock is released.
struct WriteSection<'a, K: DictionaryKey, V> {
    table: StampedWriteGuard<'a, Table<K, V>>,
    size: &'a AtomicUsize,
}

impl<K: DictionaryKey, V> Drop for WriteSection<'_, K, V> {
    fn drop(&mut self) {
        self.size.store(self.table.len(), Ordering::Release);
    }
}

impl<K: DictionaryKey, V> Default for ConcurrentDictionary<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: DictionaryKey, V> FromIterator<(K, V)> for ConcurrentDictionary<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Table::new(&DictionaryConfig::default());
        for (key, value) in iter {
            table.put(key, value);
        }
        Self::from_table(table)
    }
}

impl<K: DictionaryKey, V: fmt::Debug> fmt::Debug for ConcurrentDictionary<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.table.read(|t| t.fmt_pairs(f, "ConcurrentDictionary"))
    }
}
