//! Bucket table shared by the fast and concurrent dictionaries
//!
//! `buckets[i]` holds the slot index of the head of chain `i` (or [`TAIL`]).
//! New nodes are linked in at the head. When the post-insert size reaches the
//! threshold a new bucket vector of twice the length is built, every chain is
//! relinked into it, and it replaces the old one.

use super::entry::{Entry, EntryPool, TAIL};
use super::{index_for, DictionaryKey, MAXIMUM_CAPACITY};
use crate::config::dictionary::threshold_for;
use crate::config::DictionaryConfig;
use std::fmt;

pub(crate) struct Table<K, V> {
    buckets: Vec<usize>,
    entries: EntryPool<K, V>,
    size: usize,
    threshold: usize,
    load_factor: f32,
    max_length: usize,
}

impl<K: DictionaryKey, V> Table<K, V> {
    /// Build an empty table. `config` is assumed valid.
    pub(crate) fn new(config: &DictionaryConfig) -> Self {
        let length = config.table_length();
        let threshold = config.initial_threshold();
        log::debug!(
            "new {:?}-keyed table: {} buckets, load factor {}, threshold {}",
            K::KIND,
            length,
            config.load_factor,
            threshold
        );
        Self {
            buckets: vec![TAIL; length],
            entries: EntryPool::new(),
            size: 0,
            threshold,
            load_factor: config.load_factor,
            max_length: MAXIMUM_CAPACITY,
        }
    }

    /// Table that stops growing at `max_length` buckets instead of the maximum capacity
    #[cfg(test)]
    pub(crate) fn with_max_length(config: &DictionaryConfig, max_length: usize) -> Self {
        Self {
            max_length,
            ..Self::new(config)
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.size
    }

    /// Bucket count
    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub(crate) fn threshold(&self) -> usize {
        self.threshold
    }

    #[inline]
    pub(crate) fn load_factor(&self) -> f32 {
        self.load_factor
    }

    #[inline]
    pub(crate) fn pooled_entries(&self) -> usize {
        self.entries.pooled()
    }

    fn find(&self, key: K) -> Option<usize> {
        let hash = key.spread();
        let mut cursor = self.buckets[index_for(hash, self.buckets.len())];
        while cursor != TAIL {
            let entry = self.entries.get(cursor);
            if entry.matches(hash, key) {
                return Some(cursor);
            }
            cursor = entry.next();
        }
        None
    }

    pub(crate) fn get(&self, key: K) -> Option<&V> {
        self.find(key).and_then(|slot| self.entries.get(slot).value())
    }

    pub(crate) fn get_mut(&mut self, key: K) -> Option<&mut V> {
        let slot = self.find(key)?;
        self.entries.get_mut(slot).value_mut()
    }

    pub(crate) fn contains_key(&self, key: K) -> bool {
        self.find(key).is_some()
    }

    pub(crate) fn put(&mut self, key: K, value: V) -> Option<V> {
        let hash = key.spread();
        let index = index_for(hash, self.buckets.len());

        let mut cursor = self.buckets[index];
        while cursor != TAIL {
            let entry = self.entries.get_mut(cursor);
            if entry.matches(hash, key) {
                return entry.replace_value(value);
            }
            cursor = entry.next();
        }

        self.add_entry(hash, key, value, index);
        None
    }

    fn add_entry(&mut self, hash: i32, key: K, value: V, index: usize) {
        let head = self.buckets[index];
        self.buckets[index] = self.entries.take(hash, key, value, head);
        self.size += 1;
        if self.size >= self.threshold {
            self.resize();
        }
    }

    pub(crate) fn remove(&mut self, key: K) -> Option<V> {
        let hash = key.spread();
        let index = index_for(hash, self.buckets.len());

        let mut prev = TAIL;
        let mut cursor = self.buckets[index];
        while cursor != TAIL {
            let entry = self.entries.get(cursor);
            let next = entry.next();
            if entry.matches(hash, key) {
                return self.unlink(index, prev, cursor);
            }
            prev = cursor;
            cursor = next;
        }
        None
    }

    /// Unlink `slot` from chain `bucket`, given its predecessor (or [`TAIL`]
    /// for the head), and return it to the entry pool.
    fn unlink(&mut self, bucket: usize, prev: usize, slot: usize) -> Option<V> {
        let next = self.entries.get(slot).next();
        if prev == TAIL {
            self.buckets[bucket] = next;
        } else {
            self.entries.get_mut(prev).set_next(next);
        }
        self.size -= 1;
        self.entries.put(slot)
    }

    fn resize(&mut self) {
        let old_length = self.buckets.len();
        let Some(new_length) = grown_length(old_length, self.max_length) else {
            if self.threshold != usize::MAX {
                log::warn!(
                    "table reached maximum capacity of {} buckets, growth disabled",
                    self.max_length
                );
            }
            self.threshold = usize::MAX;
            return;
        };

        let mut new_buckets = vec![TAIL; new_length];
        self.transfer(&mut new_buckets);
        self.buckets = new_buckets;
        self.threshold = threshold_for(new_length, self.load_factor);
        log::debug!(
            "resized table {} -> {} buckets, {} entries, next threshold {}",
            old_length,
            new_length,
            self.size,
            self.threshold
        );
    }

    /// Relink every node into `new_buckets`. Chain order is reversed.
    fn transfer(&mut self, new_buckets: &mut [usize]) {
        let length = new_buckets.len();
        for bucket in 0..self.buckets.len() {
            let mut cursor = self.buckets[bucket];
            while cursor != TAIL {
                let entry = self.entries.get_mut(cursor);
                let next = entry.next();
                let index = index_for(entry.hash(), length);
                entry.set_next(new_buckets[index]);
                new_buckets[index] = cursor;
                cursor = next;
            }
        }
    }

    /// Unlink every node and return it to the entry pool. Keeps the bucket count.
    pub(crate) fn clear(&mut self) {
        for bucket in 0..self.buckets.len() {
            let mut cursor = std::mem::replace(&mut self.buckets[bucket], TAIL);
            while cursor != TAIL {
                let next = self.entries.get(cursor).next();
                self.entries.put(cursor);
                cursor = next;
            }
        }
        self.size = 0;
    }

    pub(crate) fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.iter().any(|(_, v)| v == value)
    }

    /// Replace every value in place. If `transform` panics, the pair whose
    /// value it consumed is removed, so the table stays consistent.
    pub(crate) fn apply<F>(&mut self, mut transform: F)
    where
        F: FnMut(V) -> V,
    {
        for bucket in 0..self.buckets.len() {
            let mut prev = TAIL;
            let mut cursor = self.buckets[bucket];
            while cursor != TAIL {
                let Some(value) = self.entries.get_mut(cursor).take_value() else {
                    unreachable!("chained slot {} holds no value", cursor);
                };
                let guard = UnlinkOnUnwind {
                    table: &mut *self,
                    bucket,
                    prev,
                    slot: cursor,
                };
                let value = transform(value);
                std::mem::forget(guard);

                let entry = self.entries.get_mut(cursor);
                entry.replace_value(value);
                prev = cursor;
                cursor = entry.next();
            }
        }
    }

    pub(crate) fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            table: self,
            bucket: 0,
            cursor: TAIL,
            remaining: self.size,
        }
    }

    /// Write `[key - value]` for every pair.
    pub(crate) fn fmt_pairs(&self, f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result
    where
        V: fmt::Debug,
    {
        write!(f, "{} size = {} :", name, self.size)?;
        for (key, value) in self.iter() {
            write!(f, " [{} - {:?}]", key, value)?;
        }
        Ok(())
    }
}

/// Drops the pair at `slot` if a transform unwinds after taking its value.
struct UnlinkOnUnwind<'a, K: DictionaryKey, V> {
    table: &'a mut Table<K, V>,
    bucket: usize,
    prev: usize,
    slot: usize,
}

impl<K: DictionaryKey, V> Drop for UnlinkOnUnwind<'_, K, V> {
    fn drop(&mut self) {
        self.table.unlink(self.bucket, self.prev, self.slot);
    }
}

/// Bucket count after doubling, `None` once `max_length` is reached.
fn grown_length(length: usize, max_length: usize) -> Option<usize> {
    if length >= max_length {
        None
    } else {
        Some(length * 2)
    }
}

/// Iterator over `(key, &value)` in bucket order.
pub struct Iter<'a, K, V> {
    table: &'a Table<K, V>,
    bucket: usize,
    cursor: usize,
    remaining: usize,
}

impl<'a, K: DictionaryKey, V> Iterator for Iter<'a, K, V> {
    type Item = (K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.cursor != TAIL {
                let entry: &'a Entry<K, V> = self.table.entries.get(self.cursor);
                self.cursor = entry.next();
                if let Some(value) = entry.value() {
                    self.remaining = self.remaining.saturating_sub(1);
                    return Some((entry.key(), value));
                }
                continue;
            }
            if self.bucket >= self.table.buckets.len() {
                return None;
            }
            self.cursor = self.table.buckets[self.bucket];
            self.bucket += 1;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K: DictionaryKey, V> ExactSizeIterator for Iter<'_, K, V> {}
