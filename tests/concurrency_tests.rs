//! Concurrency tests for the shared containers
//!
//! Each test separates a concurrent phase from a verification phase that
//! runs after every worker has joined, and asserts invariants rather than
//! timing-dependent counts.

use crossbeam_utils::thread as crossbeam_thread;
use primkey::containers::ConcurrentArray;
use primkey::dictionary::{ConcurrentIntegerDictionary, ConcurrentLongDictionary};
use primkey::pool::{ConcurrentReusablePool, Reusable};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

const THREADS: usize = 8;

// =============================================================================
// CONCURRENT DICTIONARY
// =============================================================================

#[test]
fn test_disjoint_key_stress() {
    let per_thread = 2_000;
    let dict = ConcurrentIntegerDictionary::with_capacity(1);
    let barrier = Barrier::new(THREADS);

    crossbeam_thread::scope(|s| {
        for t in 0..THREADS {
            let dict = &dict;
            let barrier = &barrier;
            s.spawn(move |_| {
                barrier.wait();
                for i in 0..per_thread {
                    let key = (t * per_thread + i) as i32;
                    dict.put(key, format!("t{}-{}", t, i));
                }
            });
        }
    })
    .unwrap();

    assert_eq!(dict.len(), THREADS * per_thread);
    for t in 0..THREADS {
        for i in 0..per_thread {
            let key = (t * per_thread + i) as i32;
            assert_eq!(dict.get(key), Some(format!("t{}-{}", t, i)));
        }
    }
    assert!(dict.capacity() >= THREADS * per_thread);
}

#[test]
fn test_disjoint_long_keys_with_removals() {
    let per_thread = 1_000i64;
    let dict = ConcurrentLongDictionary::new();

    crossbeam_thread::scope(|s| {
        for t in 0..THREADS as i64 {
            let dict = &dict;
            s.spawn(move |_| {
                for i in 0..per_thread {
                    // Same low half across threads, distinct high half
                    let key = (t << 32) | i;
                    dict.put(key, i);
                    if i % 2 == 1 {
                        assert_eq!(dict.remove(key), Some(i));
                    }
                }
            });
        }
    })
    .unwrap();

    assert_eq!(dict.len(), THREADS * per_thread as usize / 2);
    for t in 0..THREADS as i64 {
        for i in 0..per_thread {
            let expected = if i % 2 == 0 { Some(i) } else { None };
            assert_eq!(dict.get((t << 32) | i), expected);
        }
    }
}

#[test]
fn test_get_racing_remove_returns_value_or_absent() {
    let dict = Arc::new(ConcurrentIntegerDictionary::new());
    let rounds = 5_000;
    let done = Arc::new(AtomicUsize::new(0));

    let writer = {
        let dict = Arc::clone(&dict);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for round in 0..rounds {
                dict.put(1, round);
                dict.remove(1);
            }
            done.store(1, Ordering::Release);
        })
    };

    let reader = {
        let dict = Arc::clone(&dict);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut last = 0;
            while done.load(Ordering::Acquire) == 0 {
                if let Some(v) = dict.get(1) {
                    assert!(v < rounds);
                    // Writes to one key are ordered, so values never go back
                    assert!(v >= last, "saw {} after {}", v, last);
                    last = v;
                }
            }
        })
    };

    writer.join().unwrap();
    reader.join().unwrap();
    assert_eq!(dict.get(1), None);
    assert!(dict.is_empty());
}

#[test]
fn test_get_or_insert_contention_agrees_on_stored_value() {
    let keys = 64;
    let dict = ConcurrentIntegerDictionary::new();
    let factory_calls = AtomicUsize::new(0);
    let barrier = Barrier::new(THREADS);

    let observed: Vec<Vec<i32>> = crossbeam_thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS as i32)
            .map(|t| {
                let dict = &dict;
                let calls = &factory_calls;
                let barrier = &barrier;
                s.spawn(move |_| {
                    barrier.wait();
                    (0..keys)
                        .map(|key| {
                            dict.get_or_insert_with_key(key, |k| {
                                calls.fetch_add(1, Ordering::SeqCst);
                                k * 1_000 + t
                            })
                        })
                        .collect::<Vec<i32>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
    .unwrap();

    let calls = factory_calls.load(Ordering::SeqCst);
    assert!(calls >= keys as usize && calls <= keys as usize * THREADS);
    assert_eq!(dict.len(), keys as usize);
    // Whichever factory won, every thread got the stored value
    for key in 0..keys {
        let stored = dict.get(key).unwrap();
        assert_eq!(stored / 1_000, key);
        assert!(observed.iter().all(|values| values[key as usize] == stored));
    }
}

#[test]
fn test_readers_never_see_partial_resize() {
    let stable = 256;
    let dict = ConcurrentIntegerDictionary::with_capacity(1);
    for key in 0..stable {
        dict.put(-1 - key, key);
    }

    crossbeam_thread::scope(|s| {
        let dict = &dict;
        s.spawn(move |_| {
            // Forces many resizes while readers run
            for key in 0..20_000 {
                dict.put(key, key);
            }
        });
        for _ in 0..4 {
            s.spawn(move |_| {
                for round in 0..5_000 {
                    let key = round % stable;
                    assert_eq!(dict.get(-1 - key), Some(key));
                    assert!(dict.contains_key(-1 - key));
                }
            });
        }
    })
    .unwrap();

    assert_eq!(dict.len(), stable as usize + 20_000);
}

// =============================================================================
// REUSABLE POOL
// =============================================================================

#[derive(Debug, Default)]
struct Packet {
    payload: Vec<u8>,
    owner: Option<usize>,
}

impl Reusable for Packet {
    fn free(&mut self) {
        self.payload.clear();
        self.owner = None;
    }
}

#[test]
fn test_pool_exclusivity_under_contention() {
    let pool: ConcurrentReusablePool<Box<Packet>> = ConcurrentReusablePool::new();
    for _ in 0..16 {
        pool.put(Box::default());
    }
    let checked_out = Mutex::new(HashSet::new());
    let barrier = Barrier::new(THREADS);

    crossbeam_thread::scope(|s| {
        for t in 0..THREADS {
            let pool = &pool;
            let checked_out = &checked_out;
            let barrier = &barrier;
            s.spawn(move |_| {
                barrier.wait();
                for round in 0..2_000 {
                    let mut packet = pool.take_or_else(Box::default);
                    let address = &*packet as *const Packet as usize;
                    assert!(
                        checked_out.lock().unwrap().insert(address),
                        "packet delivered twice"
                    );

                    // Freed packets never carry a previous owner's data
                    assert!(packet.payload.is_empty());
                    assert_eq!(packet.owner, None);
                    packet.owner = Some(t);
                    packet.payload.extend_from_slice(&(round as u32).to_le_bytes());

                    assert!(checked_out.lock().unwrap().remove(&address));
                    pool.put(packet);
                }
            });
        }
    })
    .unwrap();

    let stats = pool.stats();
    assert_eq!(stats.hits + stats.misses, (THREADS * 2_000) as u64);
    assert_eq!(stats.returns, 16 + (THREADS * 2_000) as u64);
    assert_eq!(pool.len() as u64, 16 + stats.misses);
}

// =============================================================================
// CONCURRENT ARRAY
// =============================================================================

#[test]
fn test_array_add_if_absent_is_atomic() {
    let array = ConcurrentArray::new();
    let added = AtomicUsize::new(0);

    crossbeam_thread::scope(|s| {
        for _ in 0..THREADS {
            let array = &array;
            let added = &added;
            s.spawn(move |_| {
                for value in 0..500 {
                    if array.add_if_absent(value) {
                        added.fetch_add(1, Ordering::Relaxed);
                    }
                }
            });
        }
    })
    .unwrap();

    assert_eq!(added.load(Ordering::Relaxed), 500);
    let mut values = array.snapshot();
    values.sort_unstable();
    assert_eq!(values, (0..500).collect::<Vec<_>>());
}

#[test]
fn test_array_snapshots_are_consistent() {
    let array = ConcurrentArray::new();

    crossbeam_thread::scope(|s| {
        let array = &array;
        s.spawn(move |_| {
            // Elements are always added and removed in pairs
            for i in 0..5_000u32 {
                array.scoped_write(|a| {
                    a.add(i).add(i);
                });
                if i % 2 == 0 {
                    array.scoped_write(|a| {
                        a.pop();
                        a.pop();
                    });
                }
            }
        });
        for _ in 0..3 {
            s.spawn(move |_| {
                for _ in 0..2_000 {
                    let snapshot = array.snapshot();
                    assert_eq!(snapshot.len() % 2, 0);
                    assert!(snapshot.chunks(2).all(|pair| pair[0] == pair[1]));
                }
            });
        }
    })
    .unwrap();

    assert_eq!(array.len(), 5_000);
}
