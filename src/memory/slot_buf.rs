//! Fixed-capacity buffer of optional slots drawn from a [`MemoryAllocator`]
//!
//! `SlotBuf<T>` is the single place where container storage touches raw
//! memory. Each slot is an `Option<T>`: `None` marks a vacant position so
//! ring buffers and arenas never read uninitialised memory. The buffer never
//! reallocates in place; growth builds a fresh buffer, moves the payloads and
//! drops the old one, so a failed allocation leaves the original untouched.

use std::alloc::Layout;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;
use std::slice;

use super::{AllocatorRef, MemoryAllocator};
use crate::error::{NutError, Result};

/// Heap buffer of `capacity` optional slots
pub struct SlotBuf<T> {
    ptr: NonNull<Option<T>>,
    capacity: usize,
    allocator: AllocatorRef,
    _marker: PhantomData<Option<T>>,
}

// SAFETY: SlotBuf owns its slots like a Box<[Option<T>]>
unsafe impl<T: Send> Send for SlotBuf<T> {}
unsafe impl<T: Sync> Sync for SlotBuf<T> {}

impl<T> SlotBuf<T> {
    /// Allocate `capacity` vacant slots from `allocator`
    pub fn new(capacity: usize, allocator: AllocatorRef) -> Result<Self> {
        let layout = Self::layout(capacity)?;

        let ptr = if layout.size() == 0 {
            NonNull::dangling()
        } else {
            allocator
                .allocate(layout)
                .ok_or_else(|| NutError::out_of_memory(layout.size()))?
                .cast::<Option<T>>()
        };

        // Every slot starts as `None` whatever bytes the allocator hands back
        for i in 0..capacity {
            // SAFETY: `i < capacity` and the block holds `capacity` slots
            unsafe { ptr.as_ptr().add(i).write(None) };
        }

        Ok(Self {
            ptr,
            capacity,
            allocator,
            _marker: PhantomData,
        })
    }

    /// Buffer with no slots; never allocates
    pub fn empty(allocator: AllocatorRef) -> Self {
        Self {
            ptr: NonNull::dangling(),
            capacity: 0,
            allocator,
            _marker: PhantomData,
        }
    }

    /// Number of slots
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Allocator the buffer was drawn from
    #[inline]
    pub fn allocator(&self) -> &AllocatorRef {
        &self.allocator
    }

    /// Allocate a sibling buffer of `capacity` slots from the same allocator
    pub fn sibling(&self, capacity: usize) -> Result<Self> {
        Self::new(capacity, self.allocator.clone())
    }

    /// Byte footprint of a buffer with `capacity` slots
    pub fn bytes_for(capacity: usize) -> usize {
        Self::layout(capacity).map(|l| l.size()).unwrap_or(usize::MAX)
    }

    fn layout(capacity: usize) -> Result<Layout> {
        Layout::array::<Option<T>>(capacity).map_err(|_| {
            NutError::out_of_memory(capacity.saturating_mul(std::mem::size_of::<Option<T>>()))
        })
    }
}

impl<T> Deref for SlotBuf<T> {
    type Target = [Option<T>];

    #[inline]
    fn deref(&self) -> &[Option<T>] {
        // SAFETY: every slot is initialised in `new`
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.capacity) }
    }
}

impl<T> DerefMut for SlotBuf<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [Option<T>] {
        // SAFETY: every slot is initialised in `new` and we hold `&mut self`
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.capacity) }
    }
}

impl<T> Drop for SlotBuf<T> {
    fn drop(&mut self) {
        // SAFETY: slots are initialised and dropped exactly once here
        unsafe {
            std::ptr::drop_in_place(std::ptr::slice_from_raw_parts_mut(
                self.ptr.as_ptr(),
                self.capacity,
            ));
        }

        if let Ok(layout) = Self::layout(self.capacity) {
            if layout.size() != 0 {
                // SAFETY: the block came from this allocator with this layout
                unsafe { self.allocator.deallocate(self.ptr.cast(), layout) };
            }
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SlotBuf<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
