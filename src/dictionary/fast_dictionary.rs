//! Single-threaded primitive-keyed dictionary
//!
//! # Examples
//!
//! ```rust
//! use primkey::dictionary::FastIntegerDictionary;
//!
//! let mut dict = FastIntegerDictionary::new();
//! for key in 0..=12 {
//!     dict.put(key, format!("v{}", key));
//! }
//! assert_eq!(dict.capacity(), 32);
//! assert_eq!(dict.get(7).map(String::as_str), Some("v7"));
//!
//! assert_eq!(dict.remove(7), Some("v7".to_string()));
//! assert_eq!(dict.pooled_entries(), 1);
//! ```

use super::table::{Iter, Table};
use super::{Dictionary, DictionaryKey};
use crate::config::{Config, DictionaryConfig};
use crate::error::{PrimkeyError, Result};
use std::fmt;

/// Open-chaining hash table keyed by a primitive integer.
///
/// Not synchronized. Mutating while iterating is rejected by the borrow
/// checker rather than detected at runtime.
pub struct FastDictionary<K, V> {
    table: Table<K, V>,
}

impl<K: DictionaryKey, V> FastDictionary<K, V> {
    /// Create a dictionary with 16 buckets and load factor 0.75
    pub fn new() -> Self {
        Self {
            table: Table::new(&DictionaryConfig::default()),
        }
    }

    /// Create a dictionary with at least `capacity` buckets.
    ///
    /// The count is rounded up to a power of two, and a zero capacity gives
    /// a single bucket.
    pub fn with_capacity(capacity: usize) -> Self {
        let config = DictionaryConfig {
            initial_capacity: capacity,
            ..DictionaryConfig::default()
        };
        Self {
            table: Table::new(&config),
        }
    }

    /// Create a dictionary from explicit sizing parameters
    pub fn with_capacity_and_load_factor(capacity: usize, load_factor: f32) -> Result<Self> {
        Self::with_config(DictionaryConfig::new(capacity, load_factor))
    }

    /// Create a dictionary from a configuration, validating it first
    pub fn with_config(config: DictionaryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            table: Table::new(&config),
        })
    }

    /// Insert or replace, returning the previous value
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        self.table.put(key, value)
    }

    pub fn get(&self, key: K) -> Option<&V> {
        self.table.get(key)
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        self.table.get_mut(key)
    }

    /// Value under `key`, inserting `factory()` on a miss
    pub fn get_or_insert_with<F>(&mut self, key: K, factory: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        if !self.table.contains_key(key) {
            self.table.put(key, factory());
        }
        self.stored_mut(key)
    }

    /// Value under `key`, inserting `factory(key)` on a miss
    pub fn get_or_insert_with_key<F>(&mut self, key: K, factory: F) -> &mut V
    where
        F: FnOnce(K) -> V,
    {
        self.get_or_insert_with(key, || factory(key))
    }

    /// Value under `key`, inserting `factory(arg)` on a miss
    pub fn get_or_insert_with_arg<T, F>(&mut self, key: K, arg: T, factory: F) -> &mut V
    where
        F: FnOnce(T) -> V,
    {
        self.get_or_insert_with(key, || factory(arg))
    }

    // Looked up again after the insert so the stored value is what comes back
    fn stored_mut(&mut self, key: K) -> &mut V {
        match self.table.get_mut(key) {
            Some(value) => value,
            None => unreachable!("key {} missing right after insert", key),
        }
    }

    pub fn remove(&mut self, key: K) -> Option<V> {
        self.table.remove(key)
    }

    pub fn contains_key(&self, key: K) -> bool {
        self.table.contains_key(key)
    }

    /// Returns true if some key maps to `value`; `None` is an invalid argument
    pub fn contains_value(&self, value: Option<&V>) -> Result<bool>
    where
        V: PartialEq,
    {
        let value = value.ok_or_else(|| PrimkeyError::invalid_argument("value is absent"))?;
        Ok(self.table.contains_value(value))
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Remove every pair. Bucket count and pooled entries are kept.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Replace every value `v` with `transform(v)`
    pub fn apply<F>(&mut self, transform: F)
    where
        F: FnMut(V) -> V,
    {
        self.table.apply(transform);
    }

    pub fn for_each_value<F>(&self, mut f: F)
    where
        F: FnMut(&V),
    {
        self.table.iter().for_each(|(_, v)| f(v));
    }

    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(K, &V),
    {
        self.table.iter().for_each(|(k, v)| f(k, v));
    }

    pub fn for_each_with<T, F>(&self, arg: &T, mut f: F)
    where
        F: FnMut(K, &V, &T),
    {
        self.table.iter().for_each(|(k, v)| f(k, v, arg));
    }

    /// Iterate over `(key, &value)` pairs in bucket order
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.table.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.table.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.table.iter().map(|(_, v)| v)
    }

    /// Current bucket count
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Size at which the next insert doubles the bucket count
    pub fn threshold(&self) -> usize {
        self.table.threshold()
    }

    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    /// Free chain nodes waiting to be reused
    pub fn pooled_entries(&self) -> usize {
        self.table.pooled_entries()
    }
}

impl<K: DictionaryKey, V: Clone> Dictionary<K, V> for FastDictionary<K, V> {
    fn put(&mut self, key: K, value: V) -> Option<V> {
        FastDictionary::put(self, key, value)
    }

    fn get(&self, key: K) -> Option<V> {
        FastDictionary::get(self, key).cloned()
    }

    fn get_or_insert_with<F>(&mut self, key: K, factory: F) -> V
    where
        F: FnOnce() -> V,
    {
        FastDictionary::get_or_insert_with(self, key, factory).clone()
    }

    fn get_or_insert_with_key<F>(&mut self, key: K, factory: F) -> V
    where
        F: FnOnce(K) -> V,
    {
        FastDictionary::get_or_insert_with_key(self, key, factory).clone()
    }

    fn get_or_insert_with_arg<T, F>(&mut self, key: K, arg: T, factory: F) -> V
    where
        F: FnOnce(T) -> V,
    {
        FastDictionary::get_or_insert_with_arg(self, key, arg, factory).clone()
    }

    fn remove(&mut self, key: K) -> Option<V> {
        FastDictionary::remove(self, key)
    }

    fn contains_key(&self, key: K) -> bool {
        FastDictionary::contains_key(self, key)
    }

    fn contains_value(&self, value: Option<&V>) -> Result<bool>
    where
        V: PartialEq,
    {
        FastDictionary::contains_value(self, value)
    }

    fn len(&self) -> usize {
        self.table.len()
    }

    fn clear(&mut self) {
        self.table.clear();
    }

    fn apply<F>(&mut self, transform: F)
    where
        F: FnMut(V) -> V,
    {
        self.table.apply(transform);
    }

    fn for_each_value<F>(&self, f: F)
    where
        F: FnMut(&V),
    {
        FastDictionary::for_each_value(self, f);
    }

    fn for_each<F>(&self, f: F)
    where
        F: FnMut(K, &V),
    {
        FastDictionary::for_each(self, f);
    }

    fn for_each_with<T, F>(&self, arg: &T, f: F)
    where
        F: FnMut(K, &V, &T),
    {
        FastDictionary::for_each_with(self, arg, f);
    }
}

impl<K: DictionaryKey, V> Default for FastDictionary<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: DictionaryKey, V> FromIterator<(K, V)> for FastDictionary<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dict = Self::new();
        dict.extend(iter);
        dict
    }
}

impl<K: DictionaryKey, V> Extend<(K, V)> for FastDictionary<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.table.put(key, value);
        }
    }
}

impl<'a, K: DictionaryKey, V> IntoIterator for &'a FastDictionary<K, V> {
    type Item = (K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.table.iter()
    }
}

impl<K: DictionaryKey, V: fmt::Debug> fmt::Debug for FastDictionary<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.table.fmt_pairs(f, "FastDictionary")
    }
}
