//! Single-threaded reusable pool

use super::Reusable;
use crate::containers::Array;

/// LIFO free list of reusable objects for single-threaded use.
///
/// ```rust
/// use primkey::pool::FastReusablePool;
///
/// let mut pool: FastReusablePool<Vec<u8>> = FastReusablePool::new();
/// let mut buf = pool.take_or_else(|| Vec::with_capacity(64));
/// buf.extend_from_slice(b"hello");
/// pool.put(buf);
///
/// let buf = pool.take_or_else(Vec::new);
/// assert!(buf.is_empty());
/// assert!(buf.capacity() >= 64);
/// ```
#[derive(Debug)]
pub struct FastReusablePool<E> {
    free: Array<E>,
}

impl<E: Reusable> FastReusablePool<E> {
    /// Create an empty pool
    pub fn new() -> Self {
        Self { free: Array::new() }
    }

    /// Create an empty pool with room for `capacity` free objects
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            free: Array::with_capacity(capacity),
        }
    }

    /// Pop the most recently freed object, if any
    pub fn take(&mut self) -> Option<E> {
        let mut element = self.free.pop()?;
        element.reuse();
        Some(element)
    }

    /// Pop a freed object or build one with `factory`
    pub fn take_or_else<F>(&mut self, factory: F) -> E
    where
        F: FnOnce() -> E,
    {
        match self.take() {
            Some(element) => element,
            None => factory(),
        }
    }

    /// Free `element` and push it onto the free list
    pub fn put(&mut self, mut element: E) {
        element.free();
        self.free.add(element);
    }

    /// Number of free objects
    pub fn len(&self) -> usize {
        self.free.len()
    }

    /// Returns true if no free object is available
    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    /// Drop every free object
    pub fn clear(&mut self) {
        self.free.clear();
    }
}

impl<E: Reusable + PartialEq> FastReusablePool<E> {
    /// Remove a free object equal to `element` so it is never handed out
    pub fn remove(&mut self, element: &E) -> Option<E> {
        self.free.fast_remove(element)
    }
}

impl<E: Reusable> Default for FastReusablePool<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Node {
        id: u32,
        payload: Option<String>,
        reused: u32,
    }

    impl Reusable for Node {
        fn free(&mut self) {
            self.payload = None;
        }

        fn reuse(&mut self) {
            self.reused += 1;
        }
    }

    #[test]
    fn test_empty_take_returns_none() {
        let mut pool: FastReusablePool<Node> = FastReusablePool::new();
        assert!(pool.is_empty());
        assert!(pool.take().is_none());
    }

    #[test]
    fn test_take_or_else_builds_when_empty() {
        let mut pool: FastReusablePool<Node> = FastReusablePool::new();
        let node = pool.take_or_else(|| Node {
            id: 9,
            ..Default::default()
        });
        assert_eq!(node.id, 9);
        assert_eq!(node.reused, 0);
    }

    #[test]
    fn test_put_frees_and_take_reuses() {
        let mut pool = FastReusablePool::new();
        pool.put(Node {
            id: 1,
            payload: Some("old".into()),
            reused: 0,
        });
        assert_eq!(pool.len(), 1);

        let node = pool.take_or_else(Node::default);
        assert_eq!(node.id, 1);
        assert_eq!(node.payload, None);
        assert_eq!(node.reused, 1);
    }

    #[test]
    fn test_lifo_order() {
        let mut pool = FastReusablePool::new();
        for id in 0..3 {
            pool.put(Node {
                id,
                ..Default::default()
            });
        }
        let order: Vec<u32> = std::iter::from_fn(|| pool.take()).map(|n| n.id).collect();
        assert_eq!(order, vec![2, 1, 0]);
    }

    #[test]
    fn test_remove() {
        let mut pool = FastReusablePool::new();
        pool.put(String::from("a"));
        pool.put(String::from("b"));
        // Both strings are cleared on put, so they compare equal
        assert_eq!(pool.remove(&String::new()), Some(String::new()));
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.remove(&String::from("x")), None);
    }
}
