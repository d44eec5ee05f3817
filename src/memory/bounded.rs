//! Byte-budgeted allocator with traffic statistics
//!
//! [`BoundedAllocator`] serves requests from the global allocator until the
//! configured budget is spent, then refuses. Shrinking the budget at runtime
//! makes the next growth of any container fail deterministically, which is
//! how out-of-memory paths are exercised.

use std::alloc::{self, Layout};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use super::MemoryAllocator;

/// Snapshot of a [`BoundedAllocator`]'s counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundedStats {
    /// Configured byte budget
    pub limit: usize,
    /// Bytes currently handed out
    pub in_use: usize,
    /// Highest value `in_use` has reached
    pub peak: usize,
    /// Successful allocations
    pub allocations: u64,
    /// Deallocations
    pub deallocations: u64,
    /// Refused requests
    pub failures: u64,
}

/// Allocator that refuses requests once `limit` bytes are outstanding
#[derive(Debug)]
pub struct BoundedAllocator {
    limit: AtomicUsize,
    in_use: AtomicUsize,
    peak: AtomicUsize,
    allocations: AtomicU64,
    deallocations: AtomicU64,
    failures: AtomicU64,
}

impl BoundedAllocator {
    /// Create an allocator with a budget of `limit` bytes
    pub fn new(limit: usize) -> Self {
        Self {
            limit: AtomicUsize::new(limit),
            in_use: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            allocations: AtomicU64::new(0),
            deallocations: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    /// Allocator with no effective budget, useful for counting only
    pub fn unbounded() -> Self {
        Self::new(usize::MAX)
    }

    /// Change the budget; outstanding blocks are unaffected
    pub fn set_limit(&self, limit: usize) {
        self.limit.store(limit, Ordering::SeqCst);
    }

    /// Restrict the budget to what is currently in use
    pub fn freeze(&self) {
        self.set_limit(self.in_use.load(Ordering::SeqCst));
    }

    /// Bytes still available under the budget
    pub fn remaining(&self) -> usize {
        let limit = self.limit.load(Ordering::SeqCst);
        limit.saturating_sub(self.in_use.load(Ordering::SeqCst))
    }

    /// Current counters
    pub fn stats(&self) -> BoundedStats {
        BoundedStats {
            limit: self.limit.load(Ordering::SeqCst),
            in_use: self.in_use.load(Ordering::SeqCst),
            peak: self.peak.load(Ordering::SeqCst),
            allocations: self.allocations.load(Ordering::Relaxed),
            deallocations: self.deallocations.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }

    fn reserve(&self, size: usize) -> bool {
        let limit = self.limit.load(Ordering::SeqCst);
        let reserved = self
            .in_use
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                current.checked_add(size).filter(|&total| total <= limit)
            });
        match reserved {
            Ok(previous) => {
                self.peak.fetch_max(previous + size, Ordering::SeqCst);
                true
            }
            Err(_) => false,
        }
    }

    fn refuse(&self, layout: Layout) -> Option<NonNull<u8>> {
        self.failures.fetch_add(1, Ordering::Relaxed);
        log::debug!(
            "bounded allocator refused {} bytes ({} of {} in use)",
            layout.size(),
            self.in_use.load(Ordering::SeqCst),
            self.limit.load(Ordering::SeqCst)
        );
        None
    }

    fn serve(&self, layout: Layout, zeroed: bool) -> Option<NonNull<u8>> {
        if !self.reserve(layout.size()) {
            return self.refuse(layout);
        }

        // SAFETY: callers never pass zero-sized layouts
        let raw = unsafe {
            if zeroed {
                alloc::alloc_zeroed(layout)
            } else {
                alloc::alloc(layout)
            }
        };

        match NonNull::new(raw) {
            Some(block) => {
                self.allocations.fetch_add(1, Ordering::Relaxed);
                Some(block)
            }
            None => {
                self.in_use.fetch_sub(layout.size(), Ordering::SeqCst);
                self.refuse(layout)
            }
        }
    }
}

impl Default for BoundedAllocator {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl MemoryAllocator for BoundedAllocator {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        self.serve(layout, false)
    }

    fn allocate_zeroed(&self, layout: Layout) -> Option<NonNull<u8>> {
        self.serve(layout, true)
    }

    unsafe fn deallocate(&self, block: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded contract of `MemoryAllocator::deallocate`
        unsafe { alloc::dealloc(block.as_ptr(), layout) };
        self.in_use.fetch_sub(layout.size(), Ordering::SeqCst);
        self.deallocations.fetch_add(1, Ordering::Relaxed);
    }
}
