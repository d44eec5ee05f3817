//! Memory management for container storage
//!
//! Every container draws its buffers and nodes from a [`MemoryAllocator`]
//! captured at construction. The allocator is a small trait with three entry
//! points mirroring `malloc`/`calloc`/`free`; [`AllocatorRef`] is the handle
//! containers actually hold.
//!
//! Three allocators ship with the crate:
//!
//! - [`SystemAllocator`]: forwards to the global allocator
//! - [`BoundedAllocator`]: enforces a byte budget and counts traffic, which
//!   makes allocation failure reproducible
//! - [`PoolAllocator`]: recycles fixed-size chunks for small requests
//!
//! Storage primitives built on top:
//!
//! - [`SlotBuf`]: a fixed-capacity buffer of optional slots
//! - [`NodeArena`]: free-list node storage addressed by [`NodeId`]

use std::alloc::{self, Layout};
use std::fmt;
use std::ptr::{self, NonNull};
use std::sync::Arc;

pub mod arena;
pub mod bounded;
pub mod pool;
pub mod slot_buf;

pub use arena::{NodeArena, NodeId};
pub use bounded::{BoundedAllocator, BoundedStats};
pub use pool::{PoolAllocator, PoolConfig, PoolStats};
pub use slot_buf::SlotBuf;

/// Allocation callbacks used by every container
///
/// Implementations must be thread-safe so that containers holding a shared
/// handle stay `Send`. Zero-sized layouts are never passed in; storage code
/// short-circuits them.
pub trait MemoryAllocator: Send + Sync {
    /// Allocate a block for `layout`; `None` reports exhaustion
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Allocate a zero-filled block for `layout`
    ///
    /// For embedders whose raw buffers rely on all-zero bytes. Container
    /// storage never calls it: [`SlotBuf`] writes `None` into every slot,
    /// because an all-zero `Option<T>` is not guaranteed to be `None`.
    fn allocate_zeroed(&self, layout: Layout) -> Option<NonNull<u8>> {
        let block = self.allocate(layout)?;
        // SAFETY: `block` was just allocated with room for `layout.size()` bytes
        unsafe { ptr::write_bytes(block.as_ptr(), 0, layout.size()) };
        Some(block)
    }

    /// Release a block previously returned by this allocator
    ///
    /// # Safety
    ///
    /// `block` must have been returned by `allocate` or `allocate_zeroed` on
    /// this same allocator with the same `layout`, and must not be used after
    /// this call.
    unsafe fn deallocate(&self, block: NonNull<u8>, layout: Layout);
}

/// Allocator backed by the process-wide global allocator
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemAllocator;

impl MemoryAllocator for SystemAllocator {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        // SAFETY: callers never pass zero-sized layouts
        NonNull::new(unsafe { alloc::alloc(layout) })
    }

    fn allocate_zeroed(&self, layout: Layout) -> Option<NonNull<u8>> {
        // SAFETY: callers never pass zero-sized layouts
        NonNull::new(unsafe { alloc::alloc_zeroed(layout) })
    }

    unsafe fn deallocate(&self, block: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded contract of `MemoryAllocator::deallocate`
        unsafe { alloc::dealloc(block.as_ptr(), layout) }
    }
}

/// Handle to the allocator a container was built with
///
/// `System` is a plain variant so configuration constants can name it.
#[derive(Clone, Default)]
pub enum AllocatorRef {
    /// The global allocator
    #[default]
    System,
    /// A caller-supplied allocator shared between containers
    Custom(Arc<dyn MemoryAllocator>),
}

impl AllocatorRef {
    /// Wrap an owned allocator
    pub fn custom<A: MemoryAllocator + 'static>(allocator: A) -> Self {
        Self::Custom(Arc::new(allocator))
    }

    /// Share an allocator the caller keeps a handle to (e.g. to read stats)
    pub fn from_arc<A: MemoryAllocator + 'static>(allocator: Arc<A>) -> Self {
        Self::Custom(allocator)
    }

    /// Whether two handles dispatch to the same allocator instance
    pub fn same_as(&self, other: &AllocatorRef) -> bool {
        match (self, other) {
            (Self::System, Self::System) => true,
            (Self::Custom(a), Self::Custom(b)) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            _ => false,
        }
    }

    #[inline]
    fn get(&self) -> &dyn MemoryAllocator {
        match self {
            Self::System => &SystemAllocator,
            Self::Custom(allocator) => allocator.as_ref(),
        }
    }
}

impl MemoryAllocator for AllocatorRef {
    #[inline]
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        self.get().allocate(layout)
    }

    #[inline]
    fn allocate_zeroed(&self, layout: Layout) -> Option<NonNull<u8>> {
        self.get().allocate_zeroed(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, block: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded contract of `MemoryAllocator::deallocate`
        unsafe { self.get().deallocate(block, layout) }
    }
}

impl fmt::Debug for AllocatorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => f.write_str("AllocatorRef::System"),
            Self::Custom(_) => f.write_str("AllocatorRef::Custom(..)"),
        }
    }
}
