//! Array: contiguous growable sequence with a configurable growth factor
//!
//! Elements occupy slots `0..len()` of a [`SlotBuf`]; the tail slots stay
//! vacant. When full, capacity is multiplied by `exp_factor` (clamped to
//! `max_capacity`) through an allocate-move-free cycle, so a failed growth
//! leaves the array untouched.

use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use std::slice;

use crate::common::MAX_ELEMENTS;
use crate::config::CollectionSettings;
use crate::error::{check_bounds, check_range, NutError, Result};
use crate::memory::{AllocatorRef, SlotBuf};

/// Construction parameters for [`Array`]
#[derive(Debug, Clone)]
pub struct ArrayConfig {
    /// Initial capacity; must be non-zero
    pub capacity: usize,
    /// Growth multiplier; values `<= 1` fall back to 2
    pub exp_factor: f32,
    /// Capacity growth may not exceed
    pub max_capacity: usize,
    /// Allocator for the element buffer
    pub allocator: AllocatorRef,
}

impl ArrayConfig {
    /// Default configuration: 8 slots doubling up to [`MAX_ELEMENTS`]
    pub const DEFAULT: Self = Self {
        capacity: 8,
        exp_factor: 2.0,
        max_capacity: MAX_ELEMENTS,
        allocator: AllocatorRef::System,
    };

    /// Defaults with capacity and growth factor taken from `settings`
    pub fn from_settings(settings: &CollectionSettings) -> Self {
        Self {
            capacity: settings.default_capacity,
            exp_factor: settings.growth_factor,
            ..Self::DEFAULT
        }
    }

    /// Set the initial capacity
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the growth multiplier
    pub fn with_exp_factor(mut self, exp_factor: f32) -> Self {
        self.exp_factor = exp_factor;
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

impl Default for ArrayConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Dynamic array
pub struct Array<T> {
    buf: SlotBuf<T>,
    size: usize,
    exp_factor: f32,
    max_capacity: usize,
}

#[inline]
fn vacant_slot() -> NutError {
    NutError::fatal("array slot unexpectedly vacant")
}

impl<T> Array<T> {
    /// Create an array with [`ArrayConfig::DEFAULT`]
    pub fn new() -> Result<Self> {
        Self::with_config(ArrayConfig::DEFAULT)
    }

    /// Create an array from `config`
    ///
    /// Fails with `InvalidCapacity` when the capacity is zero, exceeds
    /// `max_capacity`, or when one growth step would overflow
    /// [`MAX_ELEMENTS`].
    pub fn with_config(config: ArrayConfig) -> Result<Self> {
        let capacity = config.capacity;
        if capacity == 0 || capacity > config.max_capacity || capacity > MAX_ELEMENTS {
            return Err(NutError::invalid_capacity(capacity));
        }

        let exp_factor = if config.exp_factor.is_finite() && config.exp_factor > 1.0 {
            config.exp_factor
        } else {
            2.0
        };
        if exp_factor as f64 >= MAX_ELEMENTS as f64 / capacity as f64 {
            return Err(NutError::invalid_capacity(capacity));
        }

        Ok(Self {
            buf: SlotBuf::new(capacity, config.allocator)?,
            size: 0,
            exp_factor,
            max_capacity: config.max_capacity.min(MAX_ELEMENTS),
        })
    }

    /// Empty array sharing this array's growth settings and allocator
    fn sibling(&self, capacity: usize) -> Result<Self> {
        Ok(Self {
            buf: self.buf.sibling(capacity.max(1))?,
            size: 0,
            exp_factor: self.exp_factor,
            max_capacity: self.max_capacity,
        })
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether the array holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Allocated slots
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Growth multiplier in effect
    #[inline]
    pub fn exp_factor(&self) -> f32 {
        self.exp_factor
    }

    /// Allocator the array draws from
    #[inline]
    pub fn allocator(&self) -> &AllocatorRef {
        self.buf.allocator()
    }

    /// Occupied slots, for containers layered on top of the array
    #[inline]
    pub(crate) fn slots_mut(&mut self) -> &mut [Option<T>] {
        &mut self.buf[..self.size]
    }

    /// Append `element`
    pub fn add(&mut self, element: T) -> Result<()> {
        self.reserve_one()?;
        let at = self.size;
        self.buf[at] = Some(element);
        self.size += 1;
        Ok(())
    }

    /// Insert `element` at `index`, shifting later elements up
    ///
    /// `index` may equal `len()`, which appends.
    pub fn add_at(&mut self, index: usize, element: T) -> Result<()> {
        if index > self.size {
            return Err(NutError::out_of_range(index, self.size));
        }
        self.reserve_one()?;

        // The vacant slot at `size` rotates down to `index`
        let size = self.size;
        self.buf[index..=size].rotate_right(1);
        self.buf[index] = Some(element);
        self.size += 1;
        Ok(())
    }

    /// Replace the element at `index`, returning the previous one
    pub fn replace_at(&mut self, index: usize, element: T) -> Result<T> {
        check_bounds(index, self.size)?;
        self.buf[index].replace(element).ok_or_else(vacant_slot)
    }

    /// Swap the elements at `i` and `j`
    pub fn swap_at(&mut self, i: usize, j: usize) -> Result<()> {
        check_bounds(i, self.size)?;
        check_bounds(j, self.size)?;
        self.buf.swap(i, j);
        Ok(())
    }

    /// Remove and return the element at `index`, shifting later elements down
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        check_bounds(index, self.size)?;

        let removed = self.buf[index].take().ok_or_else(vacant_slot)?;
        let size = self.size;
        self.buf[index..size].rotate_left(1);
        self.size -= 1;
        Ok(removed)
    }

    /// Remove and return the last element
    pub fn remove_last(&mut self) -> Result<T> {
        if self.size == 0 {
            return Err(NutError::out_of_range(0, 0));
        }
        self.size -= 1;
        let last = self.size;
        self.buf[last].take().ok_or_else(vacant_slot)
    }

    /// Remove the first element equal to `element`
    pub fn remove(&mut self, element: &T) -> Result<T>
    where
        T: PartialEq,
    {
        let index = self.index_of(element)?;
        self.remove_at(index)
    }

    /// Drop every element; capacity is kept
    pub fn clear(&mut self) {
        for slot in self.buf[..self.size].iter_mut() {
            *slot = None;
        }
        self.size = 0;
    }

    /// Hand every element to `f` in order, leaving the array empty
    pub fn clear_with<F: FnMut(T)>(&mut self, mut f: F) {
        for slot in self.buf[..self.size].iter_mut() {
            if let Some(element) = slot.take() {
                f(element);
            }
        }
        self.size = 0;
    }

    /// Consume the array, handing every element to `f` in order
    pub fn destroy_with<F: FnMut(T)>(mut self, f: F) {
        self.clear_with(f);
    }

    /// Element at `index`
    pub fn get_at(&self, index: usize) -> Result<&T> {
        check_bounds(index, self.size)?;
        self.buf[index].as_ref().ok_or_else(vacant_slot)
    }

    /// Mutable element at `index`
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        check_bounds(index, self.size)?;
        self.buf[index].as_mut().ok_or_else(vacant_slot)
    }

    /// Last element
    pub fn get_last(&self) -> Result<&T> {
        if self.size == 0 {
            return Err(NutError::out_of_range(0, 0));
        }
        self.get_at(self.size - 1)
    }

    /// New array holding clones of elements `from..=to`
    pub fn subarray(&self, from: usize, to: usize) -> Result<Self>
    where
        T: Clone,
    {
        check_range(from, to, self.size)?;

        let mut sub = self.sibling(to - from + 1)?;
        for (slot, element) in sub.buf.iter_mut().zip(self.iter().skip(from)) {
            *slot = Some(element.clone());
        }
        sub.size = to - from + 1;
        Ok(sub)
    }

    /// Copy into a new array of the same capacity, cloning each element
    pub fn copy_shallow(&self) -> Result<Self>
    where
        T: Clone,
    {
        self.copy_deep(T::clone)
    }

    /// Copy into a new array of the same capacity, producing each element with `cp`
    pub fn copy_deep<F: FnMut(&T) -> T>(&self, mut cp: F) -> Result<Self> {
        let mut copy = self.sibling(self.capacity())?;
        for (slot, element) in copy.buf.iter_mut().zip(self.iter()) {
            *slot = Some(cp(element));
        }
        copy.size = self.size;
        Ok(copy)
    }

    /// Reverse the order of the elements in place
    pub fn reverse(&mut self) {
        self.buf[..self.size].reverse();
    }

    /// Shrink capacity to the number of elements (at least one slot)
    pub fn trim_capacity(&mut self) -> Result<()> {
        let capacity = self.capacity();
        let target = self.size.max(1);
        if target >= capacity {
            return Ok(());
        }

        self.relocate(target)?;
        log::debug!("array trimmed from {} to {} slots", capacity, target);
        Ok(())
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

    /// Stable sort by `cmp`
    pub fn sort<F>(&mut self, mut cmp: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.buf[..self.size].sort_by(|a, b| match (a, b) {
            (Some(a), Some(b)) => cmp(a, b),
            _ => Ordering::Equal,
        });
    }

    /// Apply `f` to every element in place
    pub fn map<F: FnMut(&mut T)>(&mut self, mut f: F) {
        for element in self.buf[..self.size].iter_mut().flatten() {
            f(element);
        }
    }

    /// Fold the elements left to right with `f`
    ///
    /// Returns `None` for an empty array without calling `f`, and a clone of
    /// the only element for a single-element array.
    pub fn reduce<F>(&self, mut f: F) -> Option<T>
    where
        T: Clone,
        F: FnMut(T, &T) -> T,
    {
        let mut elements = self.iter();
        let first = elements.next()?.clone();
        Some(elements.fold(first, |acc, e| f(acc, e)))
    }

    /// Call `f` on every element in order
    pub fn foreach<F: FnMut(&T)>(&self, f: F) {
        self.iter().for_each(f);
    }

    /// Keep only the elements for which `pred` returns true
    ///
    /// Fails with `OutOfRange` on an empty array.
    pub fn filter_mut<F: FnMut(&T) -> bool>(&mut self, mut pred: F) -> Result<()> {
        if self.size == 0 {
            return Err(NutError::out_of_range(0, 0));
        }

        let mut kept = 0;
        for i in 0..self.size {
            let keep = self.buf[i].as_ref().map_or(false, &mut pred);
            if keep {
                self.buf.swap(kept, i);
                kept += 1;
            } else {
                self.buf[i] = None;
            }
        }

        self.size = kept;
        Ok(())
    }

    /// New array holding clones of the elements for which `pred` returns true
    ///
    /// Fails with `OutOfRange` on an empty array.
    pub fn filter<F: FnMut(&T) -> bool>(&self, mut pred: F) -> Result<Self>
    where
        T: Clone,
    {
        if self.size == 0 {
            return Err(NutError::out_of_range(0, 0));
        }

        let mut filtered = self.sibling(self.capacity())?;
        for element in self.iter().filter(|e| pred(*e)) {
            let at = filtered.size;
            filtered.buf[at] = Some(element.clone());
            filtered.size += 1;
        }
        Ok(filtered)
    }

    /// Make room for one more element
    pub(crate) fn reserve_one(&mut self) -> Result<()> {
        if self.size < self.capacity() {
            return Ok(());
        }
        self.expand()
    }

    fn expand(&mut self) -> Result<()> {
        let capacity = self.capacity();
        if capacity >= self.max_capacity {
            log::warn!("array at maximum capacity {}", capacity);
            return Err(NutError::max_capacity(capacity));
        }

        let grown = (capacity as f64 * self.exp_factor as f64) as usize;
        let new_capacity = grown.max(capacity + 1).min(self.max_capacity);
        self.relocate(new_capacity).map_err(|e| {
            log::warn!("array growth to {} slots failed: {}", new_capacity, e);
            e
        })?;

        log::debug!("array grew from {} to {} slots", capacity, new_capacity);
        Ok(())
    }

    fn relocate(&mut self, capacity: usize) -> Result<()> {
        let mut buf = self.buf.sibling(capacity)?;
        for (dst, src) in buf.iter_mut().zip(self.buf[..self.size].iter_mut()) {
            *dst = src.take();
        }
        self.buf = buf;
        Ok(())
    }

    /// In-order iterator
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.buf[..self.size].iter(),
        }
    }

    /// Mutating cursor positioned before the first element
    pub fn cursor(&mut self) -> CursorMut<'_, T> {
        CursorMut {
            array: self,
            index: 0,
            current: None,
        }
    }

    /// Cursor walking this array and `other` in lockstep
    pub fn zip_cursor<'a, U>(&'a mut self, other: &'a mut Array<U>) -> ZipCursorMut<'a, T, U> {
        ZipCursorMut {
            first: self,
            second: other,
            index: 0,
            current: None,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Array<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T> IntoIterator for &'a Array<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

/// Iterator over the elements of an [`Array`]
pub struct Iter<'a, T> {
    inner: slice::Iter<'a, Option<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.inner.next().and_then(Option::as_ref)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        self.inner.next_back().and_then(Option::as_ref)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Cursor over an [`Array`] that can edit around the element it last yielded
pub struct CursorMut<'a, T> {
    array: &'a mut Array<T>,
    index: usize,
    current: Option<usize>,
}

impl<'a, T> CursorMut<'a, T> {
    /// Advance and yield the next element
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&mut T> {
        if self.index >= self.array.size {
            return None;
        }
        let index = self.index;
        self.index += 1;
        self.current = Some(index);
        self.array.get_mut(index).ok()
    }

    /// Remove the element last yielded by `next`
    pub fn remove(&mut self) -> Result<T> {
        let index = self.current.ok_or(NutError::ValueNotFound)?;
        let removed = self.array.remove_at(index)?;
        self.current = None;
        self.index = index;
        Ok(removed)
    }

    /// Insert `element` after the element last yielded; it is not visited
    pub fn add(&mut self, element: T) -> Result<()> {
        self.array.add_at(self.index, element)?;
        self.index += 1;
        Ok(())
    }

    /// Replace the element last yielded, returning it
    pub fn replace(&mut self, element: T) -> Result<T> {
        let index = self.current.ok_or(NutError::ValueNotFound)?;
        self.array.replace_at(index, element)
    }

    /// Index of the element last yielded
    pub fn index(&self) -> Option<usize> {
        self.current
    }
}

/// Lockstep cursor over two arrays; edits apply to both or neither
pub struct ZipCursorMut<'a, T, U> {
    first: &'a mut Array<T>,
    second: &'a mut Array<U>,
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
