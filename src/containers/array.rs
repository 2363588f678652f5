//! Array: growable sequence container with explicit doubling growth
//!
//! `Array<T>` is the plain, single-threaded sequence used for bulk exports out
//! of dictionaries, as the storage of [`ConcurrentArray`](super::ConcurrentArray),
//! and as the free list of the reusable pools. Compared to `Vec<T>` it adds the
//! removal flavours the pools and dictionaries need: constant-time
//! swap-with-last removal and order-preserving shifting removal, both by index
//! and by value.
//!
//! Emptiness is routine: `pop`, `poll`, `first`, `last` and out-of-range
//! removals return `None` rather than failing.
//!
//! ```rust
//! use primkey::containers::Array;
//!
//! let mut array: Array<char> = ['a', 'b', 'c'].into_iter().collect();
//! assert_eq!(array.fast_remove_by_index(0), Some('a'));
//! assert_eq!(array.as_slice(), &['c', 'b']);
//! ```

use crate::config::{ArrayConfig, Config};
use crate::error::{check_bounds, Result};
use crate::pool::Reusable;
use std::fmt;
use std::ops::Index;

/// Initial capacity used by [`Array::new`]
pub const DEFAULT_ARRAY_CAPACITY: usize = 10;

/// Largest capacity an array may be configured with
pub const MAX_ARRAY_CAPACITY: usize = i32::MAX as usize;

/// Growable sequence with explicit doubling growth.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Array<T> {
    elements: Vec<T>,
}

impl<T> Array<T> {
    /// Create an empty array with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_ARRAY_CAPACITY)
    }

    /// Create an empty array with room for `capacity` elements
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elements: Vec::with_capacity(capacity),
        }
    }

    /// Create an array from a validated configuration
    pub fn with_config(config: ArrayConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_capacity(config.initial_capacity))
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true if the array holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of slots available before the next growth
    #[inline]
    pub fn capacity(&self) -> usize {
        self.elements.capacity()
    }

    /// Append an element, doubling the capacity when full
    pub fn add(&mut self, element: T) -> &mut Self {
        if self.elements.len() == self.elements.capacity() {
            self.grow(self.elements.len() + 1);
        }
        self.elements.push(element);
        self
    }

    /// Append every element of `elements`
    pub fn add_all<I>(&mut self, elements: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
    {
        let iter = elements.into_iter();
        let (lower, _) = iter.size_hint();
        self.prepare_for_size(self.len() + lower);
        for element in iter {
            self.add(element);
        }
        self
    }

    /// Make sure at least `size` elements fit without further growth
    pub fn prepare_for_size(&mut self, size: usize) {
        if size > self.elements.capacity() {
            self.grow(size);
        }
    }

    /// Element at `index`, if any
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.elements.get(index)
    }

    /// Mutable element at `index`, if any
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.elements.get_mut(index)
    }

    /// Replace the element at `index`, returning the previous one
    pub fn set(&mut self, index: usize, element: T) -> Result<T> {
        check_bounds(index, self.len())?;
        Ok(std::mem::replace(&mut self.elements[index], element))
    }

    /// First element, if any
    #[inline]
    pub fn first(&self) -> Option<&T> {
        self.elements.first()
    }

    /// Last element, if any
    #[inline]
    pub fn last(&self) -> Option<&T> {
        self.elements.last()
    }

    /// Remove and return the last element
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        self.elements.pop()
    }

    /// Remove and return the first element, preserving the order of the rest
    pub fn poll(&mut self) -> Option<T> {
        self.slow_remove_by_index(0)
    }

    /// Remove the element at `index` by moving the last element into its slot.
    ///
    /// O(1); does not preserve order.
    pub fn fast_remove_by_index(&mut self, index: usize) -> Option<T> {
        if index >= self.elements.len() {
            return None;
        }
        Some(self.elements.swap_remove(index))
    }

    /// Remove the element at `index` by shifting the tail left.
    ///
    /// O(n); preserves order.
    pub fn slow_remove_by_index(&mut self, index: usize) -> Option<T> {
        if index >= self.elements.len() {
            return None;
        }
        Some(self.elements.remove(index))
    }

    /// Clear every element, keeping the allocated capacity
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Drop spare capacity
    pub fn trim_to_size(&mut self) {
        self.elements.shrink_to_fit();
    }

    /// Iterate over the elements in order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elements.iter()
    }

    /// Iterate mutably over the elements in order
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.elements.iter_mut()
    }

    /// View the elements as a slice
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.elements
    }

    /// Consume the array into a `Vec`
    pub fn into_vec(self) -> Vec<T> {
        self.elements
    }

    fn grow(&mut self, min_capacity: usize) {
        let target = min_capacity.max(self.elements.capacity().saturating_mul(2));
        self.elements.reserve_exact(target - self.elements.len());
    }
}

impl<T: PartialEq> Array<T> {
    /// Position of the first element equal to `element`
    pub fn index_of(&self, element: &T) -> Option<usize> {
        self.elements.iter().position(|e| e == element)
    }

    /// Returns true if an equal element is present
    pub fn contains(&self, element: &T) -> bool {
        self.index_of(element).is_some()
    }

    /// Remove the first equal element with swap-with-last semantics
    pub fn fast_remove(&mut self, element: &T) -> Option<T> {
        let index = self.index_of(element)?;
        self.fast_remove_by_index(index)
    }

    /// Remove the first equal element, preserving order
    pub fn slow_remove(&mut self, element: &T) -> Option<T> {
        let index = self.index_of(element)?;
        self.slow_remove_by_index(index)
    }
}

impl<T: Ord> Array<T> {
    /// Sort the elements in ascending order
    pub fn sort(&mut self) -> &mut Self {
        self.elements.sort_unstable();
        self
    }
}

impl<T> Default for Array<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Reusable for Array<T> {
    fn free(&mut self) {
        self.clear();
    }
}

impl<T> Index<usize> for Array<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.elements[index]
    }
}

impl<T> FromIterator<T> for Array<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Self::with_capacity(0);
        array.add_all(iter);
        array
    }
}

impl<T> Extend<T> for Array<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.add_all(iter);
    }
}

impl<T> IntoIterator for Array<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Array<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl<T> From<Vec<T>> for Array<T> {
    fn from(elements: Vec<T>) -> Self {
        Self { elements }
    }
}

impl<T: fmt::Debug> fmt::Debug for Array<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.elements.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> Array<char> {
        ['a', 'b', 'c'].into_iter().collect()
    }

    #[test]
    fn test_new() {
        let array: Array<i32> = Array::new();
        assert!(array.is_empty());
        assert_eq!(array.len(), 0);
        assert!(array.capacity() >= DEFAULT_ARRAY_CAPACITY);
    }

    #[test]
    fn test_growth_doubles() {
        let mut array = Array::with_capacity(4);
        let mut next = 0;
        while array.len() < array.capacity() {
            array.add(next);
            next += 1;
        }
        let full = array.capacity();

        array.add(next);
        assert!(array.capacity() >= full * 2);
        assert_eq!(array.len(), full + 1);
        assert_eq!(array[full], next);
    }

    #[test]
    fn test_growth_from_zero() {
        let mut array = Array::with_capacity(0);
        array.add(1);
        assert!(array.capacity() >= 1);
        assert_eq!(array[0], 1);
    }

    #[test]
    fn test_fast_remove_by_index_swaps_last() {
        let mut array = abc();
        assert_eq!(array.fast_remove_by_index(0), Some('a'));
        assert_eq!(array.as_slice(), &['c', 'b']);
    }

    #[test]
    fn test_slow_remove_by_index_preserves_order() {
        let mut array = abc();
        assert_eq!(array.slow_remove_by_index(0), Some('a'));
        assert_eq!(array.as_slice(), &['b', 'c']);
    }

    #[test]
    fn test_out_of_range_removal() {
        let mut array = abc();
        assert_eq!(array.fast_remove_by_index(3), None);
        assert_eq!(array.slow_remove_by_index(10), None);
        assert_eq!(array.len(), 3);
    }

    #[test]
    fn test_remove_by_value() {
        let mut array = abc();
        assert_eq!(array.fast_remove(&'a'), Some('a'));
        assert_eq!(array.as_slice(), &['c', 'b']);
        assert_eq!(array.slow_remove(&'c'), Some('c'));
        assert_eq!(array.as_slice(), &['b']);
        assert_eq!(array.slow_remove(&'z'), None);
    }

    #[test]
    fn test_empty_results() {
        let mut array: Array<u8> = Array::new();
        assert_eq!(array.pop(), None);
        assert_eq!(array.poll(), None);
        assert_eq!(array.first(), None);
        assert_eq!(array.last(), None);
    }

    #[test]
    fn test_pop_and_poll() {
        let mut array = abc();
        assert_eq!(array.pop(), Some('c'));
        assert_eq!(array.poll(), Some('a'));
        assert_eq!(array.as_slice(), &['b']);
    }

    #[test]
    fn test_set_bounds() {
        let mut array = abc();
        assert_eq!(array.set(1, 'x').unwrap(), 'b');
        assert_eq!(array[1], 'x');
        assert!(array.set(3, 'y').is_err());
    }

    #[test]
    fn test_contains_and_index_of() {
        let array = abc();
        assert!(array.contains(&'b'));
        assert_eq!(array.index_of(&'c'), Some(2));
        assert_eq!(array.index_of(&'q'), None);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut array = abc();
        let capacity = array.capacity();
        array.clear();
        assert!(array.is_empty());
        assert_eq!(array.capacity(), capacity);

        array.add('d');
        array.trim_to_size();
        assert!(array.capacity() <= capacity);
        assert_eq!(array.as_slice(), &['d']);
    }

    #[test]
    fn test_free_clears() {
        let mut array = abc();
        array.free();
        assert!(array.is_empty());
    }

    #[test]
    fn test_sort_and_extend() {
        let mut array: Array<i32> = vec![3, 1, 2].into();
        array.extend([0, 5]);
        array.sort();
        assert_eq!(array.as_slice(), &[0, 1, 2, 3, 5]);
        assert_eq!(array.into_vec(), vec![0, 1, 2, 3, 5]);
    }

    #[test]
    fn test_prepare_for_size() {
        let mut array: Array<u64> = Array::with_capacity(2);
        array.prepare_for_size(100);
        assert!(array.capacity() >= 100);
        assert!(array.is_empty());
    }

    #[test]
    fn test_with_config() {
        let array: Array<u8> = Array::with_config(ArrayConfig::new(64)).unwrap();
        assert!(array.capacity() >= 64);
        assert!(Array::<u8>::with_config(ArrayConfig::new(MAX_ARRAY_CAPACITY + 1)).is_err());
    }

    #[test]
    fn test_debug() {
        assert_eq!(format!("{:?}", abc()), "['a', 'b', 'c']");
    }
}
