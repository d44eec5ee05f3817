//! Allocator port tests: every container must route its storage through the
//! allocator captured at construction and return all of it on drop.

use std::alloc::{self, Layout};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use nut_collections::memory::{
    AllocatorRef, BoundedAllocator, MemoryAllocator, PoolAllocator, PoolConfig,
};
use nut_collections::{
    Array, ArrayConfig, Deque, DequeConfig, HashTable, HashTableConfig, List, ListConfig, NutError,
    PQueue, PQueueConfig, SList, TreeTable, TreeTableConfig,
};

/// Counts live blocks and hands out memory from the global allocator
#[derive(Default)]
struct CountingAllocator {
    live: AtomicUsize,
}

impl MemoryAllocator for CountingAllocator {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        self.live.fetch_add(1, Ordering::SeqCst);
        NonNull::new(unsafe { alloc::alloc(layout) })
    }

    fn allocate_zeroed(&self, layout: Layout) -> Option<NonNull<u8>> {
        self.live.fetch_add(1, Ordering::SeqCst);
        NonNull::new(unsafe { alloc::alloc_zeroed(layout) })
    }

    unsafe fn deallocate(&self, block: NonNull<u8>, layout: Layout) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        unsafe { alloc::dealloc(block.as_ptr(), layout) }
    }
}

// =============================================================================
// OWNERSHIP OF STRUCTURAL MEMORY
// =============================================================================

#[test]
fn test_every_container_uses_its_own_allocator() {
    let counting = Arc::new(CountingAllocator::default());
    let handle = AllocatorRef::from_arc(counting.clone());

    {
        let mut array = Array::with_config(ArrayConfig::DEFAULT.with_allocator(handle.clone())).unwrap();
        let mut deque = Deque::with_config(DequeConfig::DEFAULT.with_allocator(handle.clone())).unwrap();
        let mut list = List::with_config(ListConfig::DEFAULT.with_allocator(handle.clone())).unwrap();
        let mut slist = SList::with_config(ListConfig::DEFAULT.with_allocator(handle.clone())).unwrap();
        let mut heap = PQueue::with_config(
            PQueueConfig::DEFAULT.with_allocator(handle.clone()),
            |a: &u32, b: &u32| a.cmp(b),
        )
        .unwrap();
        let mut table = HashTable::with_config(
            HashTableConfig::<u32>::DEFAULT.with_allocator(handle.clone()),
        )
        .unwrap();
        let mut tree = TreeTable::with_config(
            TreeTableConfig::<u32>::DEFAULT.with_allocator(handle.clone()),
        )
        .unwrap();

        for v in 0..100u32 {
            array.add(v).unwrap();
            deque.add_first(v).unwrap();
            list.add(v).unwrap();
            slist.add(v).unwrap();
            heap.push(v).unwrap();
            table.add(v, v).unwrap();
            tree.add(v, v).unwrap();
        }

        assert!(counting.live.load(Ordering::SeqCst) >= 7);
        assert!(array.allocator().same_as(&handle));
        assert!(tree.allocator().same_as(&handle));
        assert!(!deque.allocator().same_as(&AllocatorRef::System));
    }

    assert_eq!(counting.live.load(Ordering::SeqCst), 0);
}

#[test]
fn test_copies_draw_from_the_source_allocator() {
    let bounded = Arc::new(BoundedAllocator::unbounded());
    let config = ArrayConfig::DEFAULT.with_allocator(AllocatorRef::from_arc(bounded.clone()));
    let mut array = Array::with_config(config).unwrap();
    for v in 0..10 {
        array.add(v).unwrap();
    }

    let before = bounded.stats().allocations;
    let copy = array.copy_shallow().unwrap();
    let sub = array.subarray(2, 4).unwrap();
    assert_eq!(bounded.stats().allocations, before + 2);
    assert!(copy.allocator().same_as(array.allocator()));
    drop((copy, sub, array));
    assert_eq!(bounded.stats().in_use, 0);
}

// =============================================================================
// BOUNDED BUDGETS
// =============================================================================

#[test]
fn test_budget_exhaustion_is_recoverable() {
    let bounded = Arc::new(BoundedAllocator::new(4096));
    let config = ListConfig::DEFAULT.with_allocator(AllocatorRef::from_arc(bounded.clone()));
    let mut list = List::with_config(config).unwrap();

    let mut added = 0u64;
    let err = loop {
        match list.add(added) {
            Ok(()) => added += 1,
            Err(e) => break e,
        }
    };

    assert!(matches!(err, NutError::OutOfMemory { .. }));
    assert!(err.is_recoverable());
    assert_eq!(list.len() as u64, added);
    assert!(bounded.stats().peak <= 4096);
    assert!(bounded.stats().failures >= 1);

    // Freeing a node leaves a slot that needs no new memory
    list.remove_first().unwrap();
    list.add(u64::MAX).unwrap();
    assert_eq!(list.get_last(), Ok(&u64::MAX));
}

#[test]
fn test_shared_budget_between_containers() {
    let bounded = Arc::new(BoundedAllocator::new(1 << 20));
    let handle = AllocatorRef::from_arc(bounded.clone());
    let mut a = Deque::with_config(DequeConfig::DEFAULT.with_allocator(handle.clone())).unwrap();
    let mut b = Deque::with_config(DequeConfig::DEFAULT.with_allocator(handle)).unwrap();

    for v in 0..1_000u64 {
        a.add(v).unwrap();
        b.add(v).unwrap();
    }
    let both = bounded.stats().in_use;
    drop(a);
    let one = bounded.stats().in_use;
    assert!(one < both);
    drop(b);
    assert_eq!(bounded.stats().in_use, 0);
    assert_eq!(bounded.stats().allocations, bounded.stats().deallocations);
}

// =============================================================================
// POOL
// =============================================================================

#[test]
fn test_pool_recycles_growth_buffers() {
    let pool = Arc::new(PoolAllocator::new(PoolConfig::for_buffers()).unwrap());
    let handle = AllocatorRef::from_arc(pool.clone());

    for _ in 0..3 {
        let config = DequeConfig::DEFAULT.with_capacity(2).with_allocator(handle.clone());
        let mut deque = Deque::with_config(config).unwrap();
        for v in 0..32u32 {
            deque.add(v).unwrap();
        }
    }

    let stats = pool.stats();
    assert_eq!(stats.alloc_count, stats.dealloc_count);
    assert!(stats.reused > 0);
    assert!(stats.chunks > 0);
}

#[test]
fn test_pool_falls_back_for_large_requests() {
    let pool = Arc::new(PoolAllocator::new(PoolConfig::new(64, 4, 8)).unwrap());
    let config = ArrayConfig::DEFAULT
        .with_capacity(1_000)
        .with_allocator(AllocatorRef::from_arc(pool.clone()));
    let mut array = Array::with_config(config).unwrap();
    array.add(1u64).unwrap();
    drop(array);

    let stats = pool.stats();
    assert_eq!(stats.fallbacks, 1);
    assert_eq!(stats.chunks, 0);

    assert!(matches!(
        PoolAllocator::new(PoolConfig::new(64, 4, 3)),
        Err(NutError::Configuration { .. })
    ));
}
