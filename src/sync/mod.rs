//! Synchronization primitives shared by the concurrent containers.

pub mod stamped_lock;

pub use stamped_lock::{LockStats, Stamp, StampedLock, StampedReadGuard, StampedWriteGuard};
