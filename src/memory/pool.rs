//! Chunk-recycling allocator for high-frequency small allocations
//!
//! List and tree nodes are allocated and released one arena block at a time;
//! a [`PoolAllocator`] keeps released chunks on a free list so churn-heavy
//! workloads stop hitting the global allocator. Requests that do not fit a
//! chunk fall through to the system allocator.

use std::alloc::{self, Layout};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::MemoryAllocator;
use crate::error::{NutError, Result};

/// Chunk geometry and free-list cap for a [`PoolAllocator`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Bytes per chunk; the largest request served from the free list
    pub chunk_size: usize,
    /// Free-list length above which released chunks go back to the system
    pub max_chunks: usize,
    /// Chunk alignment, a power of two
    pub alignment: usize,
}

impl PoolConfig {
    pub fn new(chunk_size: usize, max_chunks: usize, alignment: usize) -> Self {
        Self {
            chunk_size,
            max_chunks,
            alignment,
        }
    }

    /// Sized for arena blocks of list and tree nodes
    pub fn for_nodes() -> Self {
        Self::new(512, 256, 16)
    }

    /// Sized for array, deque and heap growth buffers up to 16 KiB
    pub fn for_buffers() -> Self {
        Self::new(16 * 1024, 32, 16)
    }

    fn chunk_layout(&self) -> Result<Layout> {
        Layout::from_size_align(self.chunk_size, self.alignment).map_err(|_| {
            NutError::configuration(format!(
                "no layout for {} byte chunks aligned to {}",
                self.chunk_size, self.alignment
            ))
        })
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::for_nodes()
    }
}

/// Snapshot of a pool's counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Chunks parked on the free list
    pub chunks: usize,
    /// Bytes parked on the free list
    pub parked_bytes: u64,
    pub alloc_count: u64,
    pub dealloc_count: u64,
    /// Requests served from a parked chunk
    pub reused: u64,
    /// Requests that needed a new chunk
    pub fresh: u64,
    /// Requests too large or too aligned for a chunk
    pub fallbacks: u64,
}

/// Allocator that recycles fixed-size chunks
pub struct PoolAllocator {
    config: PoolConfig,
    chunk_layout: Layout,
    free_chunks: Mutex<Vec<*mut u8>>,
    alloc_count: AtomicU64,
    dealloc_count: AtomicU64,
    reused: AtomicU64,
    fresh: AtomicU64,
    fallbacks: AtomicU64,
}

// SAFETY: the raw chunk pointers are owned by the pool and only touched under the mutex
unsafe impl Send for PoolAllocator {}
unsafe impl Sync for PoolAllocator {}

impl PoolAllocator {
    /// Fails with `Configuration` for a zero chunk size or a bad alignment
    pub fn new(config: PoolConfig) -> Result<Self> {
        if config.chunk_size == 0 {
            return Err(NutError::configuration("pool chunk_size is zero"));
        }
        if !config.alignment.is_power_of_two() {
            return Err(NutError::configuration(format!(
                "pool alignment {} is not a power of two",
                config.alignment
            )));
        }

        let chunk_layout = config.chunk_layout()?;
        Ok(Self {
            config,
            chunk_layout,
            free_chunks: Mutex::new(Vec::new()),
            alloc_count: AtomicU64::new(0),
            dealloc_count: AtomicU64::new(0),
            reused: AtomicU64::new(0),
            fresh: AtomicU64::new(0),
            fallbacks: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn stats(&self) -> PoolStats {
        let chunks = self.lock_free_chunks().len();
        PoolStats {
            chunks,
            parked_bytes: (chunks * self.config.chunk_size) as u64,
            alloc_count: self.alloc_count.load(Ordering::Relaxed),
            dealloc_count: self.dealloc_count.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            fresh: self.fresh.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
        }
    }

    /// Return every parked chunk to the system
    pub fn clear(&self) {
        let mut free_chunks = self.lock_free_chunks();
        for chunk in free_chunks.drain(..) {
            // SAFETY: parked chunks were allocated with `chunk_layout`
            unsafe { alloc::dealloc(chunk, self.chunk_layout) };
        }
    }

    #[inline]
    fn fits(&self, layout: Layout) -> bool {
        layout.size() <= self.config.chunk_size && layout.align() <= self.config.alignment
    }

    fn lock_free_chunks(&self) -> MutexGuard<'_, Vec<*mut u8>> {
        self.free_chunks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MemoryAllocator for PoolAllocator {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        self.alloc_count.fetch_add(1, Ordering::Relaxed);

        if !self.fits(layout) {
            self.fallbacks.fetch_add(1, Ordering::Relaxed);
            // SAFETY: callers never pass zero-sized layouts
            return NonNull::new(unsafe { alloc::alloc(layout) });
        }

        if let Some(chunk) = self.lock_free_chunks().pop() {
            self.reused.fetch_add(1, Ordering::Relaxed);
            return NonNull::new(chunk);
        }

        self.fresh.fetch_add(1, Ordering::Relaxed);
        // SAFETY: chunk_layout has a non-zero size, checked in `new`
        let chunk = NonNull::new(unsafe { alloc::alloc(self.chunk_layout) });
        if chunk.is_none() {
            log::warn!("pool failed to allocate a {} byte chunk", self.config.chunk_size);
        }
        chunk
    }

    unsafe fn deallocate(&self, block: NonNull<u8>, layout: Layout) {
        self.dealloc_count.fetch_add(1, Ordering::Relaxed);

        if !self.fits(layout) {
            // SAFETY: oversized blocks came straight from the system allocator
            unsafe { alloc::dealloc(block.as_ptr(), layout) };
            return;
        }

        let mut free_chunks = self.lock_free_chunks();
        if free_chunks.len() < self.config.max_chunks {
            free_chunks.push(block.as_ptr());
        } else {
            // SAFETY: pooled blocks are always full chunks
            unsafe { alloc::dealloc(block.as_ptr(), self.chunk_layout) };
        }
    }
}

impl Drop for PoolAllocator {
    fn drop(&mut self) {
        self.clear();
    }
}

impl std::fmt::Debug for PoolAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolAllocator")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}
