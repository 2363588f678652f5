//! # Primkey: Primitive-Keyed Dictionaries and Reusable Pools
//!
//! Allocation-averse hash dictionaries keyed by `i32`/`i64`, a stamped-lock
//! concurrent array, and the reusable-object pools built on top of it.
//!
//! ## Key Features
//!
//! - **Primitive-Keyed Dictionaries**: open-chaining tables whose chain nodes
//!   are recycled through an index arena instead of being reallocated
//! - **Concurrent Dictionary**: exclusive writers, optimistic non-blocking readers
//! - **Stamped Lock**: version-validated optimistic reads over `parking_lot::RwLock`
//! - **Concurrent Array**: growable sequence with scoped read/write sections
//! - **Reusable Pools**: single-threaded and concurrent LIFO free lists
//! - **Configuration**: validated presets, environment variables and JSON files
//!
//! ## Quick Start
//!
//! ```rust
//! use primkey::{
//!     Array, ConcurrentIntegerDictionary, ConcurrentReusablePool, Config,
//!     Dictionary, DictionaryConfig, FastLongDictionary,
//! };
//!
//! // Single-threaded dictionary
//! let mut dict = FastLongDictionary::new();
//! dict.put(1 << 40, "far");
//! assert_eq!(dict.get(1 << 40), Some(&"far"));
//!
//! // Shared dictionary with a tuned configuration
//! let shared = ConcurrentIntegerDictionary::with_config(
//!     DictionaryConfig::performance_preset(),
//! ).unwrap();
//! shared.put(7, 70u64);
//! assert_eq!(shared.get_or_insert_with(7, || 0), 70);
//!
//! // Bulk export into an array
//! let mut keys = Array::new();
//! shared.keys_into(&mut keys);
//! assert_eq!(keys.as_slice(), &[7]);
//!
//! // Pooled buffers
//! let pool: ConcurrentReusablePool<Vec<u8>> = ConcurrentReusablePool::new();
//! let buf = pool.take_or_else(|| Vec::with_capacity(1024));
//! pool.put(buf);
//! assert_eq!(pool.len(), 1);
//! ```

pub mod config;
pub mod containers;
pub mod dictionary;
pub mod error;
pub mod pool;
pub mod sync;

pub use config::{ArrayConfig, Config, DictionaryConfig};
pub use containers::{Array, ConcurrentArray};
pub use dictionary::{
    ConcurrentDictionary, ConcurrentIntegerDictionary, ConcurrentLongDictionary, Dictionary,
    DictionaryKey, FastDictionary, FastIntegerDictionary, FastLongDictionary, KeyKind,
};
pub use error::{PrimkeyError, Result};
pub use pool::{ConcurrentReusablePool, FastReusablePool, PoolStats, Reusable};
pub use sync::{LockStats, StampedLock};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library (currently only logs the version)
pub fn init() {
    log::debug!("Initializing primkey v{}", VERSION);
}
