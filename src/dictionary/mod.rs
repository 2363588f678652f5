//! Primitive-keyed hash dictionaries
//!
//! Open-chaining hash tables keyed by `i32` or `i64`, with chain nodes kept
//! in an index arena and recycled through a free list instead of being
//! dropped and reallocated.
//!
//! # Variants
//!
//! - **`FastDictionary`**: single-threaded, mutators take `&mut self`
//! - **`ConcurrentDictionary`**: shareable across threads. Writers hold a
//!   stamped lock in exclusive mode, lookups run optimistically and only
//!   block while a writer is inside its critical section
//!
//! Both implement [`Dictionary`], so callers choose the implementation
//! without changing the call shape.
//!
//! # Examples
//!
//! ```rust
//! use primkey::dictionary::{Dictionary, FastIntegerDictionary, ConcurrentLongDictionary};
//!
//! fn fill<D: Dictionary<i32, String>>(dict: &mut D) {
//!     for key in 0..4 {
//!         dict.put(key, format!("v{}", key));
//!     }
//! }
//!
//! let mut fast = FastIntegerDictionary::new();
//! fill(&mut fast);
//! assert_eq!(fast.get(2), Some(&"v2".to_string()));
//!
//! let shared = ConcurrentLongDictionary::new();
//! shared.put(1i64 << 40, 7u32);
//! assert_eq!(shared.get(1i64 << 40), Some(7));
//! ```

pub mod concurrent_dictionary;
pub(crate) mod entry;
pub mod fast_dictionary;
pub(crate) mod table;

pub use concurrent_dictionary::ConcurrentDictionary;
pub use fast_dictionary::FastDictionary;
pub use table::Iter;

use crate::containers::Array;
use crate::error::Result;
use std::fmt;
use std::hash::Hash;

/// Bucket count used when no capacity is requested
pub const DEFAULT_INITIAL_CAPACITY: usize = 16;
/// Ratio of pairs to buckets at which the table doubles
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;
/// Largest bucket count; once reached the table stops growing
pub const MAXIMUM_CAPACITY: usize = 1 << 30;

/// Width of a dictionary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// 32-bit keys
    Int,
    /// 64-bit keys
    Long,
}

/// Primitive integer usable as a dictionary key.
pub trait DictionaryKey: Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Key width
    const KIND: KeyKind;

    /// Mixed 32-bit hash used for bucket selection.
    fn spread(self) -> i32;
}

/// Decorrelates the low bits of `h` so sequential keys don't pile into a
/// handful of buckets once masked.
#[inline]
pub(crate) fn supplemental_hash(h: i32) -> i32 {
    let mut h = h as u32;
    h ^= (h >> 20) ^ (h >> 12);
    (h ^ (h >> 7) ^ (h >> 4)) as i32
}

/// Bucket index for `hash` in a table of `length` buckets (a power of two).
#[inline]
pub(crate) fn index_for(hash: i32, length: usize) -> usize {
    (hash as u32 as usize) & (length - 1)
}

impl DictionaryKey for i32 {
    const KIND: KeyKind = KeyKind::Int;

    #[inline]
    fn spread(self) -> i32 {
        supplemental_hash(self)
    }
}

impl DictionaryKey for i64 {
    const KIND: KeyKind = KeyKind::Long;

    #[inline]
    fn spread(self) -> i32 {
        let folded = (self ^ ((self as u64) >> 32) as i64) as i32;
        supplemental_hash(folded)
    }
}

/// Operations shared by every dictionary variant.
///
/// Values come back cloned so that the concurrent variant never hands out a
/// reference into a table another thread may be mutating. `FastDictionary`
/// also has an inherent `get` returning `&V`.
pub trait Dictionary<K: DictionaryKey, V: Clone> {
    /// Insert or replace, returning the previous value
    fn put(&mut self, key: K, value: V) -> Option<V>;

    /// Value stored under `key`
    fn get(&self, key: K) -> Option<V>;

    /// Value stored under `key`, inserting `factory()` on a miss
    fn get_or_insert_with<F>(&mut self, key: K, factory: F) -> V
    where
        F: FnOnce() -> V;

    /// Value stored under `key`, inserting `factory(key)` on a miss
    fn get_or_insert_with_key<F>(&mut self, key: K, factory: F) -> V
    where
        F: FnOnce(K) -> V;

    /// Value stored under `key`, inserting `factory(arg)` on a miss
    fn get_or_insert_with_arg<T, F>(&mut self, key: K, arg: T, factory: F) -> V
    where
        F: FnOnce(T) -> V;

    /// Remove `key`, returning its value
    fn remove(&mut self, key: K) -> Option<V>;

    /// Returns true if `key` is present
    fn contains_key(&self, key: K) -> bool;

    /// Returns true if some key maps to `value`.
    ///
    /// Fails with `InvalidArgument` when `value` is `None`; absent values are
    /// never stored.
    fn contains_value(&self, value: Option<&V>) -> Result<bool>
    where
        V: PartialEq;

    /// Number of stored pairs
    fn len(&self) -> usize;

    /// Returns true if no pair is stored
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every pair, returning the chain nodes to the entry pool
    fn clear(&mut self);

    /// Replace every value `v` with `transform(v)`
    fn apply<F>(&mut self, transform: F)
    where
        F: FnMut(V) -> V;

    /// Visit every value
    fn for_each_value<F>(&self, f: F)
    where
        F: FnMut(&V);

    /// Visit every pair
    fn for_each<F>(&self, f: F)
    where
        F: FnMut(K, &V);

    /// Visit every pair along with a shared argument
    fn for_each_with<T, F>(&self, arg: &T, f: F)
    where
        F: FnMut(K, &V, &T);

    /// Copy every pair into `target`. Does nothing when this dictionary is empty.
    fn move_to<D>(&self, target: &mut D)
    where
        D: Dictionary<K, V> + ?Sized,
    {
        if self.is_empty() {
            return;
        }
        self.for_each(|key, value| {
            target.put(key, value.clone());
        });
    }

    /// Append every key to `container`
    fn keys_into<'a>(&self, container: &'a mut Array<K>) -> &'a mut Array<K> {
        self.for_each(|key, _| {
            container.add(key);
        });
        container
    }

    /// Append every value to `container`
    fn values_into<'a>(&self, container: &'a mut Array<V>) -> &'a mut Array<V> {
        self.for_each_value(|value| {
            container.add(value.clone());
        });
        container
    }
}

/// Single-threaded dictionary keyed by `i32`
pub type FastIntegerDictionary<V> = FastDictionary<i32, V>;
/// Single-threaded dictionary keyed by `i64`
pub type FastLongDictionary<V> = FastDictionary<i64, V>;
/// Thread-safe dictionary keyed by `i32`
pub type ConcurrentIntegerDictionary<V> = ConcurrentDictionary<i32, V>;
/// Thread-safe dictionary keyed by `i64`
pub type ConcurrentLongDictionary<V> = ConcurrentDictionary<i64, V>;
