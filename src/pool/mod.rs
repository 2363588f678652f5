//! Reusable object pools
//!
//! Pools keep released objects on a free list so that hot paths can recycle
//! them instead of allocating fresh ones.
//!
//! # Architecture
//!
//! - **`Reusable`**: contract for poolable objects. `free` clears state on the
//!   way in, `reuse` prepares the object on the way out
//! - **`FastReusablePool`**: single-threaded LIFO free list over [`Array`]
//! - **`ConcurrentReusablePool`**: the same surface over [`ConcurrentArray`],
//!   inheriting its locking
//!
//! The dictionaries recycle their chain nodes through an index arena of
//! their own instead of these pools.
//!
//! [`Array`]: crate::containers::Array
//! [`ConcurrentArray`]: crate::containers::ConcurrentArray

pub mod concurrent_pool;
pub mod fast_pool;

pub use concurrent_pool::{ConcurrentReusablePool, PoolStats};
pub use fast_pool::FastReusablePool;

/// An object that can be returned to a pool and handed out again.
pub trait Reusable {
    /// Release held state. Called when the object is put back into a pool.
    fn free(&mut self);

    /// Prepare the object for another use. Called when it leaves a pool.
    fn reuse(&mut self) {}
}

impl<T> Reusable for Option<T> {
    fn free(&mut self) {
        *self = None;
    }
}

impl<T: Reusable + ?Sized> Reusable for Box<T> {
    fn free(&mut self) {
        (**self).free();
    }

    fn reuse(&mut self) {
        (**self).reuse();
    }
}

impl Reusable for String {
    fn free(&mut self) {
        self.clear();
    }
}

impl<T> Reusable for Vec<T> {
    fn free(&mut self) {
        self.clear();
    }
}
