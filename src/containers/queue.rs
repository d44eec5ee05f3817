//! Queue: FIFO adapter over [`Deque`]
//!
//! Elements are enqueued at the deque's logical tail and polled from its
//! logical head, so iteration order is arrival order.

use std::fmt;

use super::deque::{self, Deque, DequeConfig};
use crate::error::Result;
use crate::memory::AllocatorRef;

/// Construction parameters for [`Queue`]; the backing deque's config
pub type QueueConfig = DequeConfig;

/// FIFO queue
pub struct Queue<T> {
    items: Deque<T>,
}

impl<T> Queue<T> {
    /// Create a queue with [`DequeConfig::DEFAULT`]
    pub fn new() -> Result<Self> {
        Self::with_config(QueueConfig::DEFAULT)
    }

    /// Create a queue from `config`
    pub fn with_config(config: QueueConfig) -> Result<Self> {
        Ok(Self {
            items: Deque::with_config(config)?,
        })
    }

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

    /// Append `element` at the tail
    pub fn enqueue(&mut self, element: T) -> Result<()> {
        self.items.add_last(element)
    }

    /// Oldest element, the next one `poll` returns
    pub fn peek(&self) -> Result<&T> {
        self.items.get_first()
    }

    /// Remove and return the oldest element
    pub fn poll(&mut self) -> Result<T> {
        self.items.remove_first()
    }

    /// Drop every element
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Consume the queue, handing every element to `f` oldest first
    pub fn destroy_with<F: FnMut(T)>(self, f: F) {
        self.items.destroy_with(f);
    }

    /// Iterator from the oldest element to the newest
    pub fn iter(&self) -> deque::Iter<'_, T> {
        self.items.iter()
    }

    /// Cursor that may replace elements in place
    pub fn cursor(&mut self) -> CursorMut<'_, T> {
        CursorMut {
            inner: self.items.cursor(),
        }
    }

    /// Lockstep cursor over this queue and `other`
    pub fn zip_cursor<'a, U>(&'a mut self, other: &'a mut Queue<U>) -> ZipCursorMut<'a, T, U> {
        ZipCursorMut {
            inner: self.items.zip_cursor(&mut other.items),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Queue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Queue cursor; removal and insertion would break FIFO order and are not
/// offered
pub struct CursorMut<'a, T> {
    inner: deque::CursorMut<'a, T>,
}

impl<'a, T> CursorMut<'a, T> {
    /// Advance and yield the next element
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&mut T> {
        self.inner.next()
    }

    /// Replace the element last yielded, returning it
    pub fn replace(&mut self, element: T) -> Result<T> {
        self.inner.replace(element)
    }

    pub fn index(&self) -> Option<usize> {
        self.inner.index()
    }
}

/// Lockstep cursor over two queues
pub struct ZipCursorMut<'a, T, U> {
    inner: deque::ZipCursorMut<'a, T, U>,
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
