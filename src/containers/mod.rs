//! Sequence containers
//!
//! - **`Array<T>`** - growable sequence with swap-with-last and shifting removal
//! - **`ConcurrentArray<T>`** - `Array<T>` behind a stamped lock, with scoped
//!   read/write entry points for composed structures

pub mod array;
pub mod concurrent_array;

pub use array::Array;
pub use concurrent_array::ConcurrentArray;
