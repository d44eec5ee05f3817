//! Deque: double-ended queue over a power-of-two ring buffer
//!
//! Logical index `i` lives in physical slot `(head + i) & (capacity - 1)`.
//! Capacity is always a power of two so wraparound is a mask, never a
//! division. Both ends grow and shrink in O(1) amortized time; inserting or
//! removing in the middle shifts whichever side of the index is shorter.
//!
//! Growth allocates a buffer of twice the capacity from the deque's own
//! allocator, moves the elements so the logical head lands in slot 0, and only
//! then frees the old buffer. A refused allocation therefore leaves the deque
//! exactly as it was.

use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;

use crate::common::{upper_pow_two, MAX_POW_TWO};
use crate::config::CollectionSettings;
use crate::error::{check_bounds, NutError, Result};
use crate::memory::{AllocatorRef, SlotBuf};

/// Construction parameters for [`Deque`]
#[derive(Debug, Clone)]
pub struct DequeConfig {
    /// Requested initial capacity; rounded up to a power of two (minimum 2)
    pub capacity: usize,
    /// Capacity growth may not exceed; must be a power of two
    pub max_capacity: usize,
    /// Allocator for the ring buffer
    pub allocator: AllocatorRef,
}

impl DequeConfig {
    /// Default configuration: 8 slots, unbounded growth, system allocator
    pub const DEFAULT: Self = Self {
        capacity: 8,
        max_capacity: MAX_POW_TWO,
        allocator: AllocatorRef::System,
    };

    /// Defaults with the initial capacity taken from `settings`
    pub fn from_settings(settings: &CollectionSettings) -> Self {
        Self {
            capacity: settings.default_capacity,
            ..Self::DEFAULT
        }
    }

    /// Set the initial capacity
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the growth ceiling
    pub fn with_max_capacity(mut self, max_capacity: usize) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    /// Set the allocator
    pub fn with_allocator(mut self, allocator: AllocatorRef) -> Self {
        self.allocator = allocator;
        self
    }
}

impl Default for DequeConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Double-ended queue backed by a circular buffer
pub struct Deque<T> {
    buf: SlotBuf<T>,
    head: usize,
    size: usize,
    max_capacity: usize,
}

#[inline]
fn vacant_slot() -> NutError {
    NutError::fatal("deque slot unexpectedly vacant")
}

impl<T> Deque<T> {
    /// Create a deque with [`DequeConfig::DEFAULT`]
    pub fn new() -> Result<Self> {
        Self::with_config(DequeConfig::DEFAULT)
    }

    /// Create a deque from `config`
    ///
    /// The requested capacity is rounded up to a power of two and clamped to
    /// `max_capacity`. Fails with `InvalidCapacity` when `max_capacity` is not
    /// a power of two of at least 2, and with `OutOfMemory` when the buffer
    /// cannot be allocated.
    pub fn with_config(config: DequeConfig) -> Result<Self> {
        let max_capacity = config.max_capacity;
        if max_capacity < 2 || !max_capacity.is_power_of_two() {
            return Err(NutError::invalid_capacity(max_capacity));
        }

        let capacity = upper_pow_two(config.capacity).min(max_capacity);
        let buf = SlotBuf::new(capacity, config.allocator)?;

        Ok(Self {
            buf,
            head: 0,
            size: 0,
            max_capacity,
        })
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether the deque holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of slots in the ring buffer (always a power of two)
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Growth ceiling
    #[inline]
    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    /// Allocator the deque draws from
    #[inline]
    pub fn allocator(&self) -> &AllocatorRef {
        self.buf.allocator()
    }

    #[inline]
    fn mask(&self) -> usize {
        self.buf.capacity() - 1
    }

    /// Physical slot of logical index `index`
    #[inline]
    fn slot(&self, index: usize) -> usize {
        self.head.wrapping_add(index) & self.mask()
    }

    /// Append at the back; same as [`Deque::add_last`]
    #[inline]
    pub fn add(&mut self, element: T) -> Result<()> {
        self.add_last(element)
    }

    /// Prepend at the front
    pub fn add_first(&mut self, element: T) -> Result<()> {
        self.reserve_one()?;

        self.head = self.head.wrapping_sub(1) & self.mask();
        let head = self.head;
        self.buf[head] = Some(element);
        self.size += 1;
        Ok(())
    }

    /// Append at the back
    pub fn add_last(&mut self, element: T) -> Result<()> {
        self.reserve_one()?;

        let tail = self.slot(self.size);
        self.buf[tail] = Some(element);
        self.size += 1;
        Ok(())
    }

    /// Insert `element` so that it ends up at logical `index`
    ///
    /// `index` may equal `len()`, which appends. Elements on the shorter side
    /// of `index` are shifted by one slot.
    pub fn add_at(&mut self, index: usize, element: T) -> Result<()> {
        if index > self.size {
            return Err(NutError::out_of_range(index, self.size));
        }
        if index == 0 {
            return self.add_first(element);
        }
        if index == self.size {
            return self.add_last(element);
        }

        self.reserve_one()?;

        if index <= self.size - index {
            // Front segment [0, index) moves one slot towards the front
            self.head = self.head.wrapping_sub(1) & self.mask();
            for i in 0..index {
                let (to, from) = (self.slot(i), self.slot(i + 1));
                self.buf.swap(to, from);
            }
        } else {
            // Back segment [index, size) moves one slot towards the back
            for i in (index..self.size).rev() {
                let (to, from) = (self.slot(i + 1), self.slot(i));
                self.buf.swap(to, from);
            }
        }

        let at = self.slot(index);
        self.buf[at] = Some(element);
        self.size += 1;
        Ok(())
    }

    /// Replace the element at `index`, returning the previous one
    pub fn replace_at(&mut self, index: usize, element: T) -> Result<T> {
        check_bounds(index, self.size)?;
        let at = self.slot(index);
        self.buf[at].replace(element).ok_or_else(vacant_slot)
    }

    /// Remove and return the element at `index`
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        check_bounds(index, self.size)?;
        if index == 0 {
            return self.remove_first();
        }
        if index == self.size - 1 {
            return self.remove_last();
        }

        let at = self.slot(index);
        let removed = self.buf[at].take().ok_or_else(vacant_slot)?;

        if index < self.size - 1 - index {
            // Close the gap from the front
            for i in (0..index).rev() {
                let (to, from) = (self.slot(i + 1), self.slot(i));
                self.buf.swap(to, from);
            }
            self.head = (self.head + 1) & self.mask();
        } else {
            // Close the gap from the back
            for i in index + 1..self.size {
                let (to, from) = (self.slot(i - 1), self.slot(i));
                self.buf.swap(to, from);
            }
        }

        self.size -= 1;
        Ok(removed)
    }

    /// Remove and return the first element
    pub fn remove_first(&mut self) -> Result<T> {
        if self.size == 0 {
            return Err(NutError::out_of_range(0, 0));
        }

        let head = self.head;
        let removed = self.buf[head].take().ok_or_else(vacant_slot)?;
        self.head = (head + 1) & self.mask();
        self.size -= 1;
        Ok(removed)
    }

    /// Remove and return the last element
    pub fn remove_last(&mut self) -> Result<T> {
        if self.size == 0 {
            return Err(NutError::out_of_range(0, 0));
        }

        let last = self.slot(self.size - 1);
        let removed = self.buf[last].take().ok_or_else(vacant_slot)?;
        self.size -= 1;
        Ok(removed)
    }

    /// Drop every element; capacity is kept
    pub fn clear(&mut self) {
        for i in 0..self.size {
            let at = self.slot(i);
            self.buf[at] = None;
        }
        self.head = 0;
        self.size = 0;
    }

    /// Hand every element to `f` front to back, leaving the deque empty
    pub fn clear_with<F: FnMut(T)>(&mut self, mut f: F) {
        for i in 0..self.size {
            let at = self.slot(i);
            if let Some(element) = self.buf[at].take() {
                f(element);
            }
        }
        self.head = 0;
        self.size = 0;
    }

    /// Consume the deque, handing every element to `f` front to back
    pub fn destroy_with<F: FnMut(T)>(mut self, f: F) {
        self.clear_with(f);
    }

    /// Element at `index`
    pub fn get_at(&self, index: usize) -> Result<&T> {
        check_bounds(index, self.size)?;
        self.buf[self.slot(index)].as_ref().ok_or_else(vacant_slot)
    }

    /// Mutable element at `index`
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        check_bounds(index, self.size)?;
        let at = self.slot(index);
        self.buf[at].as_mut().ok_or_else(vacant_slot)
    }

    /// First element
    pub fn get_first(&self) -> Result<&T> {
        self.get_at(0)
    }

    /// Last element
    pub fn get_last(&self) -> Result<&T> {
        if self.size == 0 {
            return Err(NutError::out_of_range(0, 0));
        }
        self.get_at(self.size - 1)
    }

    /// Make room for one more element, doubling the buffer if full
    pub(crate) fn reserve_one(&mut self) -> Result<()> {
        if self.size < self.capacity() {
            return Ok(());
        }
        self.expand()
    }

    fn expand(&mut self) -> Result<()> {
        let capacity = self.capacity();
        if capacity >= self.max_capacity {
            log::warn!("deque at maximum capacity {}", capacity);
            return Err(NutError::max_capacity(capacity));
        }

        let new_capacity = capacity << 1;
        self.relocate(new_capacity).map_err(|e| {
            log::warn!("deque growth to {} slots failed: {}", new_capacity, e);
            e
        })?;

        log::debug!("deque grew from {} to {} slots", capacity, new_capacity);
        Ok(())
    }

    /// Move every element into a fresh buffer of `capacity` slots, head first
    fn relocate(&mut self, capacity: usize) -> Result<()> {
        let mut buf = self.buf.sibling(capacity)?;
        for i in 0..self.size {
            let from = self.slot(i);
            buf[i] = self.buf[from].take();
        }
        self.buf = buf;
        self.head = 0;
        Ok(())
    }

    /// Shrink the buffer to the smallest power of two holding every element
    pub fn trim_capacity(&mut self) -> Result<()> {
        let capacity = self.capacity();
        let target = upper_pow_two(self.size);
        if target >= capacity {
            return Ok(());
        }

        self.relocate(target)?;
        log::debug!("deque trimmed from {} to {} slots", capacity, target);
        Ok(())
    }

    /// Copy into a new deque of the same capacity, cloning each element
    pub fn copy_shallow(&self) -> Result<Self>
    where
        T: Clone,
    {
        self.copy_deep(T::clone)
    }

    /// Copy into a new deque of the same capacity, producing each element with `cp`
    pub fn copy_deep<F: FnMut(&T) -> T>(&self, mut cp: F) -> Result<Self> {
        let mut buf = self.buf.sibling(self.capacity())?;
        for (slot, element) in buf.iter_mut().zip(self.iter()) {
            *slot = Some(cp(element));
        }

        Ok(Self {
            buf,
            head: 0,
            size: self.size,
            max_capacity: self.max_capacity,
        })
    }

    /// Reverse the order of the elements in place
    pub fn reverse(&mut self) {
        let size = self.size;
        for i in 0..size / 2 {
            let (a, b) = (self.slot(i), self.slot(size - 1 - i));
            self.buf.swap(a, b);
        }
    }

    /// Number of elements equal to `element`
    pub fn contains(&self, element: &T) -> usize
    where
        T: PartialEq,
    {
        self.iter().filter(|e| *e == element).count()
    }

    /// Number of elements `cmp` considers equal to `element`
    pub fn contains_value<F>(&self, element: &T, cmp: F) -> usize
    where
        F: Fn(&T, &T) -> Ordering,
    {
        self.iter()
            .filter(|e| cmp(*e, element) == Ordering::Equal)
            .count()
    }

    /// Index of the first element equal to `element`
    pub fn index_of(&self, element: &T) -> Result<usize>
    where
        T: PartialEq,
    {
        self.iter()
            .position(|e| e == element)
            .ok_or(NutError::ValueNotFound)
    }

    /// Remove the first element equal to `element`
    pub fn remove(&mut self, element: &T) -> Result<T>
    where
        T: PartialEq,
    {
        let index = self.index_of(element)?;
        self.remove_at(index)
    }

    /// Call `f` on every element front to back
    pub fn foreach<F: FnMut(&T)>(&self, f: F) {
        self.iter().for_each(f);
    }

    /// Keep only the elements for which `pred` returns true
    ///
    /// Fails with `OutOfRange` on an empty deque.
    pub fn filter_mut<F: FnMut(&T) -> bool>(&mut self, mut pred: F) -> Result<()> {
        if self.size == 0 {
            return Err(NutError::out_of_range(0, 0));
        }

        let mut kept = 0;
        for i in 0..self.size {
            let from = self.slot(i);
            let keep = match self.buf[from].as_ref() {
                Some(element) => pred(element),
                None => false,
            };
            if keep {
                let to = self.slot(kept);
                self.buf.swap(to, from);
                kept += 1;
            } else {
                self.buf[from] = None;
            }
        }

        self.size = kept;
        Ok(())
    }

    /// New deque holding clones of the elements for which `pred` returns true
    ///
    /// Fails with `OutOfRange` on an empty deque.
    pub fn filter<F: FnMut(&T) -> bool>(&self, mut pred: F) -> Result<Self>
    where
        T: Clone,
    {
        if self.size == 0 {
            return Err(NutError::out_of_range(0, 0));
        }

        let mut buf = self.buf.sibling(self.capacity())?;
        let mut kept = 0;
        for element in self.iter().filter(|e| pred(*e)) {
            buf[kept] = Some(element.clone());
            kept += 1;
        }

        Ok(Self {
            buf,
            head: 0,
            size: kept,
            max_capacity: self.max_capacity,
        })
    }

    /// Front-to-back iterator
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            deque: self,
            front: 0,
            back: self.size,
        }
    }

    /// Mutating cursor positioned before the first element
    pub fn cursor(&mut self) -> CursorMut<'_, T> {
        CursorMut {
            deque: self,
            index: 0,
            current: None,
        }
    }

    /// Cursor walking this deque and `other` in lockstep
    pub fn zip_cursor<'a, U>(&'a mut self, other: &'a mut Deque<U>) -> ZipCursorMut<'a, T, U> {
        ZipCursorMut {
            first: self,
            second: other,
            index: 0,
            current: None,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Deque<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T> IntoIterator for &'a Deque<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

/// Front-to-back iterator over a [`Deque`]
pub struct Iter<'a, T> {
    deque: &'a Deque<T>,
    front: usize,
    back: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.front == self.back {
            return None;
        }
        let deque = self.deque;
        let element = deque.buf[deque.slot(self.front)].as_ref();
        self.front += 1;
        element
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        let deque = self.deque;
        deque.buf[deque.slot(self.back)].as_ref()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Cursor over a [`Deque`] that can edit around the element it last yielded
///
/// At most one of `remove`/`replace` applies to each yielded element;
/// `add` inserts after it without the new element being visited.
pub struct CursorMut<'a, T> {
    deque: &'a mut Deque<T>,
    index: usize,
    current: Option<usize>,
}

impl<'a, T> CursorMut<'a, T> {
    /// Advance and yield the next element
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&mut T> {
        if self.index >= self.deque.size {
            return None;
        }
        let index = self.index;
        self.index += 1;
        self.current = Some(index);
        self.deque.get_mut(index).ok()
    }

    /// Remove the element last yielded by `next`
    pub fn remove(&mut self) -> Result<T> {
        let index = self.current.ok_or(NutError::ValueNotFound)?;
        let removed = self.deque.remove_at(index)?;
        self.current = None;
        self.index = index;
        Ok(removed)
    }

    /// Insert `element` after the element last yielded (at the front before
    /// the first `next`)
    pub fn add(&mut self, element: T) -> Result<()> {
        self.deque.add_at(self.index, element)?;
        self.index += 1;
        Ok(())
    }

    /// Replace the element last yielded, returning it
    pub fn replace(&mut self, element: T) -> Result<T> {
        let index = self.current.ok_or(NutError::ValueNotFound)?;
        self.deque.replace_at(index, element)
    }

    /// Logical index of the element last yielded
    pub fn index(&self) -> Option<usize> {
        self.current
    }
}

/// Lockstep cursor over two deques
///
/// Iteration stops at the end of the shorter deque. Every edit applies to
/// both deques or to neither.
pub struct ZipCursorMut<'a, T, U> {
    first: &'a mut Deque<T>,
    second: &'a mut Deque<U>,
    index: usize,
    current: Option<usize>,
}

impl<'a, T, U> ZipCursorMut<'a, T, U> {
    /// Advance and yield the next pair
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<(&mut T, &mut U)> {
        let index = self.index;
        if index >= self.first.size || index >= self.second.size {
            return None;
        }
        self.index += 1;
        self.current = Some(index);

        match (self.first.get_mut(index), self.second.get_mut(index)) {
            (Ok(a), Ok(b)) => Some((a, b)),
            _ => None,
        }
    }

    /// Remove the pair last yielded
    pub fn remove(&mut self) -> Result<(T, U)> {
        let index = self.current.ok_or(NutError::ValueNotFound)?;
        check_bounds(index, self.first.size.min(self.second.size))?;

        let a = self.first.remove_at(index)?;
        let b = self.second.remove_at(index)?;
        self.current = None;
        self.index = index;
        Ok((a, b))
    }

    /// Insert a pair after the pair last yielded
    ///
    /// Room is reserved in both deques before either is modified, so a
    /// failed growth inserts nothing.
    pub fn add(&mut self, a: T, b: U) -> Result<()> {
        let index = self.index;
        if index > self.first.size || index > self.second.size {
            return Err(NutError::out_of_range(
                index,
                self.first.size.min(self.second.size),
            ));
        }

        self.first.reserve_one()?;
        self.second.reserve_one()?;
        self.first.add_at(index, a)?;
        self.second.add_at(index, b)?;
        self.index += 1;
        Ok(())
    }

    /// Replace the pair last yielded, returning the previous pair
    pub fn replace(&mut self, a: T, b: U) -> Result<(T, U)> {
        let index = self.current.ok_or(NutError::ValueNotFound)?;
        check_bounds(index, self.first.size.min(self.second.size))?;

        let old_a = self.first.replace_at(index, a)?;
        let old_b = self.second.replace_at(index, b)?;
        Ok((old_a, old_b))
    }

    /// Index of the pair last yielded
    pub fn index(&self) -> Option<usize> {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::BoundedAllocator;
    use std::sync::Arc;

    fn contents<T: Clone>(deque: &Deque<T>) -> Vec<T> {
        deque.iter().cloned().collect()
    }

    fn deque_with_capacity(capacity: usize) -> Deque<i32> {
        Deque::with_config(DequeConfig::DEFAULT.with_capacity(capacity)).unwrap()
    }

    #[test]
    fn test_new_rounds_capacity() {
        assert_eq!(deque_with_capacity(0).capacity(), 2);
        assert_eq!(deque_with_capacity(5).capacity(), 8);
        assert_eq!(deque_with_capacity(16).capacity(), 16);
        assert_eq!(Deque::<i32>::new().unwrap().capacity(), 8);
    }

    #[test]
    fn test_new_rejects_bad_max_capacity() {
        let config = DequeConfig::DEFAULT.with_max_capacity(12);
        assert!(matches!(
            Deque::<i32>::with_config(config),
            Err(NutError::InvalidCapacity { capacity: 12 })
        ));
        let config = DequeConfig::DEFAULT.with_max_capacity(1);
        assert!(Deque::<i32>::with_config(config).is_err());
    }

    #[test]
    fn test_basic_scenario() {
        let mut deque = Deque::new().unwrap();
        deque.add_last(1).unwrap();
        deque.add_last(2).unwrap();
        deque.add_first(0).unwrap();
        assert_eq!(contents(&deque), vec![0, 1, 2]);

        assert_eq!(deque.remove_at(1).unwrap(), 1);
        assert_eq!(contents(&deque), vec![0, 2]);
    }

    #[test]
    fn test_wraparound_growth_unrotates() {
        let mut deque = deque_with_capacity(4);
        deque.add_last(2).unwrap();
        deque.add_last(3).unwrap();
        deque.add_first(1).unwrap();
        deque.add_first(0).unwrap();
        assert_eq!(deque.capacity(), 4);

        deque.add_last(4).unwrap();
        assert_eq!(deque.capacity(), 8);
        assert_eq!(deque.head, 0);
        assert_eq!(contents(&deque), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_add_at_both_halves_across_wrap() {
        let mut deque = deque_with_capacity(8);
        for i in [3, 4, 5] {
            deque.add_last(i).unwrap();
        }
        for i in [2, 1] {
            deque.add_first(i).unwrap();
        }
        // [1, 2, 3, 4, 5] with head wrapped to the end of the buffer
        deque.add_at(1, 10).unwrap();
        deque.add_at(5, 20).unwrap();
        deque.add_at(7, 30).unwrap();
        assert_eq!(contents(&deque), vec![1, 10, 2, 3, 4, 20, 5, 30]);
        assert_eq!(deque.capacity(), 8);
    }

    #[test]
    fn test_add_at_bounds() {
        let mut deque = deque_with_capacity(4);
        deque.add_at(0, 1).unwrap();
        deque.add_at(1, 3).unwrap();
        deque.add_at(1, 2).unwrap();
        assert_eq!(contents(&deque), vec![1, 2, 3]);
        assert_eq!(
            deque.add_at(5, 9),
            Err(NutError::OutOfRange { index: 5, size: 3 })
        );
    }

    #[test]
    fn test_remove_at_both_sides() {
        let mut deque = deque_with_capacity(8);
        for i in 0..8 {
            deque.add_last(i).unwrap();
        }
        assert_eq!(deque.remove_at(2).unwrap(), 2);
        assert_eq!(deque.remove_at(5).unwrap(), 6);
        assert_eq!(contents(&deque), vec![0, 1, 3, 4, 5, 7]);
        assert_eq!(
            deque.remove_at(6),
            Err(NutError::OutOfRange { index: 6, size: 6 })
        );
    }

    #[test]
    fn test_empty_deque_errors() {
        let mut deque: Deque<i32> = Deque::new().unwrap();
        assert!(matches!(deque.remove_first(), Err(NutError::OutOfRange { .. })));
        assert!(matches!(deque.remove_last(), Err(NutError::OutOfRange { .. })));
        assert!(matches!(deque.get_first(), Err(NutError::OutOfRange { .. })));
        assert!(matches!(deque.get_last(), Err(NutError::OutOfRange { .. })));
        assert!(matches!(deque.get_at(0), Err(NutError::OutOfRange { .. })));
        assert!(matches!(deque.filter_mut(|_| true), Err(NutError::OutOfRange { .. })));
    }

    #[test]
    fn test_max_capacity() {
        let config = DequeConfig::DEFAULT.with_capacity(2).with_max_capacity(4);
        let mut deque = Deque::with_config(config).unwrap();
        for i in 0..4 {
            deque.add_last(i).unwrap();
        }
        assert_eq!(deque.add_last(4), Err(NutError::MaxCapacity { capacity: 4 }));
        assert_eq!(deque.add_first(4), Err(NutError::MaxCapacity { capacity: 4 }));
        assert_eq!(contents(&deque), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_failed_growth_keeps_state() {
        let bounded = Arc::new(BoundedAllocator::unbounded());
        let config = DequeConfig::DEFAULT
            .with_capacity(4)
            .with_allocator(AllocatorRef::from_arc(bounded.clone()));
        let mut deque = Deque::with_config(config).unwrap();
        deque.add_last(1).unwrap();
        deque.add_last(2).unwrap();
        deque.add_first(0).unwrap();
        deque.add_first(-1).unwrap();

        bounded.freeze();
        assert!(matches!(deque.add_last(3), Err(NutError::OutOfMemory { .. })));
        assert!(matches!(deque.add_at(2, 9), Err(NutError::OutOfMemory { .. })));
        assert_eq!(deque.capacity(), 4);
        assert_eq!(contents(&deque), vec![-1, 0, 1, 2]);

        bounded.set_limit(usize::MAX);
        deque.add_last(3).unwrap();
        assert_eq!(contents(&deque), vec![-1, 0, 1, 2, 3]);
    }

    #[test]
    fn test_trim_capacity() {
        let mut deque = deque_with_capacity(64);
        for i in 0..5 {
            deque.add_first(i).unwrap();
        }
        deque.trim_capacity().unwrap();
        assert_eq!(deque.capacity(), 8);
        assert_eq!(contents(&deque), vec![4, 3, 2, 1, 0]);

        deque.trim_capacity().unwrap();
        assert_eq!(deque.capacity(), 8);
    }

    #[test]
    fn test_reverse_and_search() {
        let mut deque = deque_with_capacity(4);
        for i in [1, 2, 3, 2, 5] {
            deque.add_last(i).unwrap();
        }
        deque.reverse();
        assert_eq!(contents(&deque), vec![5, 2, 3, 2, 1]);
        assert_eq!(deque.contains(&2), 2);
        assert_eq!(deque.contains_value(&3, |a, b| a.cmp(b)), 1);
        assert_eq!(deque.index_of(&3), Ok(2));
        assert_eq!(deque.index_of(&9), Err(NutError::ValueNotFound));
        assert_eq!(deque.remove(&2), Ok(2));
        assert_eq!(contents(&deque), vec![5, 3, 2, 1]);
        assert_eq!(deque.remove(&9), Err(NutError::ValueNotFound));
    }

    #[test]
    fn test_filter_and_copies() {
        let mut deque = deque_with_capacity(4);
        for i in 0..10 {
            deque.add_first(i).unwrap();
        }
        let evens = deque.filter(|e| e % 2 == 0).unwrap();
        assert_eq!(contents(&evens), vec![8, 6, 4, 2, 0]);

        let doubled = deque.copy_deep(|e| e * 2).unwrap();
        assert_eq!(doubled.get_at(0), Ok(&18));
        let copy = deque.copy_shallow().unwrap();
        assert_eq!(contents(&copy), contents(&deque));
        assert_eq!(copy.capacity(), deque.capacity());

        deque.filter_mut(|e| *e >= 7).unwrap();
        assert_eq!(contents(&deque), vec![9, 8, 7]);
    }

    #[test]
    fn test_clear_with_visits_in_order() {
        let mut deque = deque_with_capacity(2);
        for i in 0..5 {
            deque.add_last(i).unwrap();
        }
        let mut seen = Vec::new();
        deque.clear_with(|e| seen.push(e));
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        assert!(deque.is_empty());
        deque.add_first(1).unwrap();
        assert_eq!(deque.get_last(), Ok(&1));
    }

    #[test]
    fn test_iter_double_ended() {
        let mut deque = deque_with_capacity(4);
        for i in 0..3 {
            deque.add_first(i).unwrap();
        }
        assert_eq!(deque.iter().len(), 3);
        assert_eq!(deque.iter().rev().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(format!("{:?}", deque), "[2, 1, 0]");
    }

    #[test]
    fn test_cursor_remove_every_second() {
        let mut deque = deque_with_capacity(4);
        for i in 0..10 {
            deque.add_last(i).unwrap();
        }

        let mut cursor = deque.cursor();
        let mut visit = 0;
        while cursor.next().is_some() {
            if visit % 2 == 1 {
                cursor.remove().unwrap();
            }
            visit += 1;
        }
        assert_eq!(visit, 10);
        assert_eq!(contents(&deque), vec![0, 2, 4, 6, 8]);
    }

    #[test]
    fn test_cursor_add_and_replace() {
        let mut deque = deque_with_capacity(2);
        for i in [1, 3, 5] {
            deque.add_last(i).unwrap();
        }

        let mut cursor = deque.cursor();
        assert_eq!(cursor.replace(0), Err(NutError::ValueNotFound));
        let mut visited = Vec::new();
        while let Some(value) = cursor.next() {
            let value = *value;
            visited.push(value);
            cursor.add(value + 1).unwrap();
            if value == 3 {
                assert_eq!(cursor.index(), Some(2));
                assert_eq!(cursor.replace(30), Ok(3));
            }
        }
        assert_eq!(visited, vec![1, 3, 5]);
        assert_eq!(contents(&deque), vec![1, 2, 30, 4, 5, 6]);
    }

    #[test]
    fn test_cursor_remove_requires_current() {
        let mut deque = deque_with_capacity(2);
        deque.add_last(1).unwrap();
        let mut cursor = deque.cursor();
        assert_eq!(cursor.remove(), Err(NutError::ValueNotFound));
        cursor.next();
        assert_eq!(cursor.remove(), Ok(1));
        assert_eq!(cursor.remove(), Err(NutError::ValueNotFound));
        assert!(cursor.next().is_none());
    }

    #[test]
    fn test_zip_cursor_lockstep() {
        let mut numbers = deque_with_capacity(4);
        let mut names: Deque<&str> = Deque::new().unwrap();
        for (n, s) in [(1, "one"), (2, "two"), (3, "three")] {
            numbers.add_last(n).unwrap();
            names.add_last(s).unwrap();
        }
        names.add_last("extra").unwrap();

        let mut zip = numbers.zip_cursor(&mut names);
        let mut pairs = 0;
        while let Some((n, s)) = zip.next() {
            pairs += 1;
            if *n == 2 {
                assert_eq!(*s, "two");
                zip.remove().unwrap();
                zip.add(20, "twenty").unwrap();
            }
        }
        assert_eq!(pairs, 3);
        assert_eq!(contents(&numbers), vec![1, 20, 3]);
        assert_eq!(contents(&names), vec!["one", "twenty", "three", "extra"]);
    }

    #[test]
    fn test_zip_cursor_add_is_all_or_nothing() {
        let bounded = Arc::new(BoundedAllocator::unbounded());
        let config = DequeConfig::DEFAULT
            .with_capacity(2)
            .with_allocator(AllocatorRef::from_arc(bounded.clone()));
        let mut first = Deque::new().unwrap();
        let mut second = Deque::with_config(config).unwrap();
        first.add_last(1).unwrap();
        second.add_last(1).unwrap();
        second.add_last(2).unwrap();
        bounded.freeze();

        let mut zip = first.zip_cursor(&mut second);
        zip.next();
        assert!(matches!(zip.add(9, 9), Err(NutError::OutOfMemory { .. })));
        assert_eq!(contents(&first), vec![1]);
        assert_eq!(contents(&second), vec![1, 2]);
    }

    #[test]
    fn test_from_settings() {
        let settings = CollectionSettings {
            default_capacity: 20,
            ..CollectionSettings::default()
        };
        let deque: Deque<u8> = Deque::with_config(DequeConfig::from_settings(&settings)).unwrap();
        assert_eq!(deque.capacity(), 32);
    }
}
