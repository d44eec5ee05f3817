//! Stack: LIFO adapter over [`Array`]

use std::fmt;
use std::iter::Rev;

use super::array::{self, Array, ArrayConfig};
use crate::error::Result;
use crate::memory::AllocatorRef;

/// Construction parameters for [`Stack`]; the backing array's config
pub type StackConfig = ArrayConfig;

/// LIFO stack
///
/// The top of the stack is the last element of the backing array, so push
/// and pop are amortized O(1).
pub struct Stack<T> {
    items: Array<T>,
}

impl<T> Stack<T> {
    /// Create a stack with [`ArrayConfig::DEFAULT`]
    pub fn new() -> Result<Self> {
        Self::with_config(StackConfig::DEFAULT)
    }

    /// Create a stack from `config`
    pub fn with_config(config: StackConfig) -> Result<Self> {
        Ok(Self {
            items: Array::with_config(config)?,
        })
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    #[inline]
    pub fn allocator(&self) -> &AllocatorRef {
        self.items.allocator()
    }

    /// Push `element` on top
    pub fn push(&mut self, element: T) -> Result<()> {
        self.items.add(element)
    }

    /// Top element
    ///
    /// Fails with `OutOfRange` on an empty stack.
    pub fn peek(&self) -> Result<&T> {
        self.items.get_last()
    }

    /// Remove and return the top element
    ///
    /// Fails with `OutOfRange` on an empty stack.
    pub fn pop(&mut self) -> Result<T> {
        self.items.remove_last()
    }

    /// Drop every element
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Consume the stack, handing every element to `f` bottom to top
    pub fn destroy_with<F: FnMut(T)>(self, f: F) {
        self.items.destroy_with(f);
    }

    /// Apply `f` to every element in place, bottom to top
    pub fn map<F: FnMut(&mut T)>(&mut self, f: F) {
        self.items.map(f);
    }

    /// Iterator from the top of the stack to the bottom
    pub fn iter(&self) -> Rev<array::Iter<'_, T>> {
        self.items.iter().rev()
    }

    /// Cursor from the bottom of the stack to the top that may replace
    /// elements in place
    pub fn cursor(&mut self) -> CursorMut<'_, T> {
        CursorMut {
            inner: self.items.cursor(),
        }
    }

    /// Lockstep cursor over this stack and `other`, bottom to top
    ///
    /// Stops at the end of the shorter stack.
    pub fn zip_cursor<'a, U>(&'a mut self, other: &'a mut Stack<U>) -> ZipCursorMut<'a, T, U> {
        ZipCursorMut {
            inner: self.items.zip_cursor(&mut other.items),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Stack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Stack cursor; removal and insertion below the top are not offered
pub struct CursorMut<'a, T> {
    inner: array::CursorMut<'a, T>,
}

impl<'a, T> CursorMut<'a, T> {
    /// Advance and yield the next element
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&mut T> {
        self.inner.next()
    }

    /// Replace the element last yielded, returning it
    ///
    /// Fails with `ValueNotFound` before the first `next`.
    pub fn replace(&mut self, element: T) -> Result<T> {
        self.inner.replace(element)
    }

    /// Depth of the element last yielded, counted from the bottom
    pub fn index(&self) -> Option<usize> {
        self.inner.index()
    }
}

/// Lockstep cursor over two stacks
pub struct ZipCursorMut<'a, T, U> {
    inner: array::ZipCursorMut<'a, T, U>,
}

impl<'a, T, U> ZipCursorMut<'a, T, U> {
    /// Advance and yield the next pair
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<(&mut T, &mut U)> {
        self.inner.next()
    }

    /// Replace the pair last yielded, returning it
    pub fn replace(&mut self, a: T, b: U) -> Result<(T, U)> {
        self.inner.replace(a, b)
    }

    pub fn index(&self) -> Option<usize> {
        self.inner.index()
    }
}
