//! Stamped lock: a reader-writer lock with an optimistic read mode
//!
//! The lock pairs a `parking_lot::RwLock` with a version counter. The counter
//! is odd while a writer is inside its critical section and is advanced on
//! both write acquisition and write release, so a reader that copies a stamp,
//! performs a read, and finds the counter unchanged knows that no write began
//! in between.
//!
//! Three access modes are provided:
//!
//! - **Optimistic read** ([`StampedLock::read_optimistic`]): takes a stamp,
//!   makes a non-blocking shared attempt, runs the reader, then validates the
//!   stamp. If a writer is active or the stamp went stale, the read is
//!   escalated once to a blocking shared read. It never spins.
//! - **Shared read** ([`StampedLock::read`], [`StampedLock::read_guard`]).
//! - **Exclusive write** ([`StampedLock::write`], [`StampedLock::write_guard`]).
//!
//! # Examples
//!
//! ```rust
//! use primkey::sync::StampedLock;
//!
//! let lock = StampedLock::new(vec![1, 2, 3]);
//!
//! let stamp = lock.try_optimistic_read().unwrap();
//! lock.write(|v| v.push(4));
//! assert!(!lock.validate(stamp));
//!
//! let len = lock.read_optimistic(|v| v.len());
//! assert_eq!(len, 4);
//! ```

use crossbeam_utils::CachePadded;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};

/// Version token handed out by [`StampedLock::try_optimistic_read`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Stamp(u64);

impl Stamp {
    /// Raw counter value. Always even.
    #[inline]
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Counters describing how a lock has been used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockStats {
    /// Optimistic reads that completed without escalation
    pub optimistic_reads: u64,
    /// Optimistic reads that had to escalate to a shared read
    pub optimistic_failures: u64,
    /// Shared (read-mode) acquisitions, including escalations
    pub shared_reads: u64,
    /// Exclusive (write-mode) acquisitions
    pub exclusive_writes: u64,
}

impl LockStats {
    /// Fraction of optimistic attempts that succeeded, 1.0 when none were made.
    pub fn optimistic_success_ratio(&self) -> f64 {
        let attempts = self.optimistic_reads + self.optimistic_failures;
        if attempts == 0 {
            1.0
        } else {
            self.optimistic_reads as f64 / attempts as f64
        }
    }
}

#[derive(Default)]
struct LockCounters {
    optimistic_reads: AtomicU64,
    optimistic_failures: AtomicU64,
    shared_reads: AtomicU64,
    exclusive_writes: AtomicU64,
}

/// Reader-writer lock with a validated optimistic read mode.
pub struct StampedLock<T> {
    version: CachePadded<AtomicU64>,
    data: RwLock<T>,
    counters: LockCounters,
}

impl<T> StampedLock<T> {
    /// Create a new lock protecting `value`.
    pub fn new(value: T) -> Self {
        Self {
            version: CachePadded::new(AtomicU64::new(0)),
            data: RwLock::new(value),
            counters: LockCounters::default(),
        }
    }

    /// Take a stamp for an optimistic read, or `None` while a writer is active.
    #[inline]
    pub fn try_optimistic_read(&self) -> Option<Stamp> {
        let version = self.version.load(Ordering::Acquire);
        if version & 1 == 0 {
            Some(Stamp(version))
        } else {
            None
        }
    }

    /// Returns true if no write has begun since `stamp` was taken.
    #[inline]
    pub fn validate(&self, stamp: Stamp) -> bool {
        self.version.load(Ordering::Acquire) == stamp.0
    }

    /// Current raw version counter. Odd while write-locked.
    #[inline]
    pub fn current_stamp(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Returns true while a writer holds the lock.
    #[inline]
    pub fn is_write_locked(&self) -> bool {
        self.current_stamp() & 1 == 1
    }

    /// Run `f` under an optimistic read, escalating to a shared read on failure.
    ///
    /// `f` may run twice: once optimistically and once after escalation. Its
    /// result from a failed attempt is discarded.
    pub fn read_optimistic<R, F>(&self, f: F) -> R
    where
        F: Fn(&T) -> R,
    {
        if let Some(stamp) = self.try_optimistic_read() {
            if let Some(guard) = self.data.try_read() {
                let result = f(&*guard);
                drop(guard);
                if self.validate(stamp) {
                    self.counters
                        .optimistic_reads
                        .fetch_add(1, Ordering::Relaxed);
                    return result;
                }
            }
        }

        self.counters
            .optimistic_failures
            .fetch_add(1, Ordering::Relaxed);
        log::trace!("optimistic read invalidated, escalating to shared read");
        let guard = self.read_guard();
        f(&*guard)
    }

    /// Run `f` while holding the lock in shared mode.
    pub fn read<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        let guard = self.read_guard();
        f(&*guard)
    }

    /// Run `f` while holding the lock in exclusive mode.
    pub fn write<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut guard = self.write_guard();
        f(&mut *guard)
    }

    /// Acquire the lock in shared mode.
    pub fn read_guard(&self) -> StampedReadGuard<'_, T> {
        let inner = self.data.read();
        self.counters.shared_reads.fetch_add(1, Ordering::Relaxed);
        StampedReadGuard { inner }
    }

    /// Acquire the lock in exclusive mode.
    ///
    /// The stamp turns odd on acquisition and even again when the guard drops,
    /// invalidating every stamp handed out before the write.
    pub fn write_guard(&self) -> StampedWriteGuard<'_, T> {
        let inner = self.data.write();
        self.version.fetch_add(1, Ordering::AcqRel);
        self.counters
            .exclusive_writes
            .fetch_add(1, Ordering::Relaxed);
        StampedWriteGuard {
            version: &self.version,
            inner,
        }
    }

    /// Snapshot of the usage counters.
    pub fn stats(&self) -> LockStats {
        LockStats {
            optimistic_reads: self.counters.optimistic_reads.load(Ordering::Relaxed),
            optimistic_failures: self.counters.optimistic_failures.load(Ordering::Relaxed),
            shared_reads: self.counters.shared_reads.load(Ordering::Relaxed),
            exclusive_writes: self.counters.exclusive_writes.load(Ordering::Relaxed),
        }
    }

    /// Mutable access without locking; the borrow checker guarantees exclusivity.
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    /// Consume the lock, returning the protected value.
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T: Default> Default for StampedLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for StampedLock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("StampedLock");
        d.field("stamp", &self.current_stamp());
        match self.data.try_read() {
            Some(guard) => d.field("data", &&*guard),
            None => d.field("data", &format_args!("<write-locked>")),
        };
        d.finish()
    }
}

/// Shared-mode guard returned by [`StampedLock::read_guard`].
pub struct StampedReadGuard<'a, T> {
    inner: RwLockReadGuard<'a, T>,
}

impl<T> Deref for StampedReadGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Exclusive-mode guard returned by [`StampedLock::write_guard`].
pub struct StampedWriteGuard<'a, T> {
    version: &'a AtomicU64,
    inner: RwLockWriteGuard<'a, T>,
}

impl<T> Deref for StampedWriteGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T> DerefMut for StampedWriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl<T> Drop for StampedWriteGuard<'_, T> {
    fn drop(&mut self) {
        // Runs before `inner` releases the RwLock, so the stamp is even again
        // by the time the next writer can get in.
        self.version.fetch_add(1, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_fresh_lock_stamp_is_valid() {
        let lock = StampedLock::new(0u32);
        let stamp = lock.try_optimistic_read().unwrap();
        assert_eq!(stamp.value() % 2, 0);
        assert!(lock.validate(stamp));
        assert!(!lock.is_write_locked());
    }

    #[test]
    fn test_write_invalidates_stamp() {
        let lock = StampedLock::new(0u32);
        let stamp = lock.try_optimistic_read().unwrap();
        lock.write(|v| *v += 1);
        assert!(!lock.validate(stamp));
        assert_eq!(lock.current_stamp(), stamp.value() + 2);

        let fresh = lock.try_optimistic_read().unwrap();
        assert!(lock.validate(fresh));
    }

    #[test]
    fn test_no_stamp_while_write_locked() {
        let lock = StampedLock::new(0u32);
        let guard = lock.write_guard();
        assert!(lock.is_write_locked());
        assert!(lock.try_optimistic_read().is_none());
        drop(guard);
        assert!(lock.try_optimistic_read().is_some());
    }

    #[test]
    fn test_read_optimistic_counts_success() {
        let lock = StampedLock::new(vec![1, 2, 3]);
        assert_eq!(lock.read_optimistic(|v| v.len()), 3);

        let stats = lock.stats();
        assert_eq!(stats.optimistic_reads, 1);
        assert_eq!(stats.optimistic_failures, 0);
        assert_eq!(stats.shared_reads, 0);
    }

    #[test]
    fn test_read_optimistic_escalates_while_writer_active() {
        let lock = Arc::new(StampedLock::new(10u64));
        let guard = lock.write_guard();

        let (started_tx, started_rx) = std::sync::mpsc::channel();
        let reader = {
            let lock = Arc::clone(&lock);
            thread::spawn(move || {
                started_tx.send(()).unwrap();
                lock.read_optimistic(|v| *v)
            })
        };

        started_rx.recv().unwrap();
        thread::sleep(std::time::Duration::from_millis(20));
        drop(guard);

        assert_eq!(reader.join().unwrap(), 10);
        let stats = lock.stats();
        // Exactly one attempt; if it escalated, it took exactly one shared read
        assert_eq!(stats.optimistic_reads + stats.optimistic_failures, 1);
        assert_eq!(stats.shared_reads, stats.optimistic_failures);
    }

    #[test]
    fn test_read_optimistic_escalates_on_stale_stamp() {
        let lock = StampedLock::new(1u32);
        let stamp = lock.try_optimistic_read().unwrap();
        lock.write(|v| *v = 2);
        assert!(!lock.validate(stamp));

        // A stale stamp is never revived by later reads
        assert_eq!(lock.read_optimistic(|v| *v), 2);
        assert!(!lock.validate(stamp));
    }

    #[test]
    fn test_write_guard_releases_on_panic() {
        let lock = Arc::new(StampedLock::new(0u32));
        let cloned = Arc::clone(&lock);
        let result = thread::spawn(move || {
            cloned.write(|_| panic!("writer failed"));
        })
        .join();
        assert!(result.is_err());

        // parking_lot does not poison; the stamp must be even again
        assert!(!lock.is_write_locked());
        assert_eq!(lock.read(|v| *v), 0);
    }

    #[test]
    fn test_get_mut_and_into_inner() {
        let mut lock = StampedLock::new(String::from("a"));
        lock.get_mut().push('b');
        assert_eq!(lock.into_inner(), "ab");
    }

    #[test]
    fn test_concurrent_writers_are_exclusive() {
        let lock = Arc::new(StampedLock::new(0u64));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let lock = Arc::clone(&lock);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        lock.write(|v| *v += 1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(lock.read(|v| *v), 4000);
        assert_eq!(lock.stats().exclusive_writes, 4000);
        assert_eq!(lock.current_stamp(), 8000);
    }

    #[test]
    fn test_success_ratio() {
        let stats = LockStats::default();
        assert_eq!(stats.optimistic_success_ratio(), 1.0);

        let stats = LockStats {
            optimistic_reads: 3,
            optimistic_failures: 1,
            ..Default::default()
        };
        assert_eq!(stats.optimistic_success_ratio(), 0.75);
    }

    #[test]
    fn test_debug_output() {
        let lock = StampedLock::new(5);
        let debug = format!("{:?}", lock);
        assert!(debug.contains("StampedLock"));
        assert!(debug.contains('5'));
    }
}
