//! PQueue: binary max-heap over [`Array`]
//!
//! "Max" is relative to the comparator: `top` is the element every other
//! element compares `Less` than or `Equal` to. Pass a reversed comparator for
//! min-heap behaviour.

use std::cmp::Ordering;
use std::fmt;

use super::array::{self, Array, ArrayConfig};
use crate::common::{cmp_ord, CompareFn};
use crate::config::CollectionSettings;
use crate::error::{NutError, Result};
use crate::memory::AllocatorRef;

/// Construction parameters for [`PQueue`]
#[derive(Debug, Clone)]
pub struct PQueueConfig {
    /// Initial heap slots; must be non-zero
    pub capacity: usize,
    /// Growth multiplier of the backing array
    pub exp_factor: f32,
    pub allocator: AllocatorRef,
}

impl PQueueConfig {
    /// Default configuration: 8 slots doubling on growth, system allocator
    pub const DEFAULT: Self = Self {
        capacity: 8,
        exp_factor: 2.0,
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

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_exp_factor(mut self, exp_factor: f32) -> Self {
        self.exp_factor = exp_factor;
        self
    }

    pub fn with_allocator(mut self, allocator: AllocatorRef) -> Self {
        self.allocator = allocator;
        self
    }
}

impl Default for PQueueConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Priority queue ordered by a caller comparator
pub struct PQueue<T> {
    heap: Array<T>,
    cmp: CompareFn<T>,
}

#[inline]
fn parent(i: usize) -> usize {
    (i - 1) / 2
}

impl<T: Ord> PQueue<T> {
    /// Max-heap by the element's own `Ord`
    pub fn new() -> Result<Self> {
        Self::with_config(PQueueConfig::DEFAULT, cmp_ord::<T>)
    }
}

impl<T> PQueue<T> {
    /// Max-heap by `cmp` with the default configuration
    pub fn with_comparator(cmp: CompareFn<T>) -> Result<Self> {
        Self::with_config(PQueueConfig::DEFAULT, cmp)
    }

    /// Max-heap by `cmp` built from `config`
    pub fn with_config(config: PQueueConfig, cmp: CompareFn<T>) -> Result<Self> {
        let array_config = ArrayConfig::DEFAULT
            .with_capacity(config.capacity)
            .with_exp_factor(config.exp_factor)
            .with_allocator(config.allocator);
        Ok(Self {
            heap: Array::with_config(array_config)?,
            cmp,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.heap.capacity()
    }

    /// Comparator the heap is ordered by
    #[inline]
    pub fn comparator(&self) -> CompareFn<T> {
        self.cmp
    }

    /// Insert `element`
    pub fn push(&mut self, element: T) -> Result<()> {
        self.heap.add(element)?;
        let last = self.heap.len() - 1;
        self.sift_up(last);
        Ok(())
    }

    /// Highest-priority element
    pub fn top(&self) -> Result<&T> {
        if self.is_empty() {
            return Err(NutError::out_of_range(0, 0));
        }
        self.heap.get_at(0)
    }

    /// Remove and return the highest-priority element
    pub fn pop(&mut self) -> Result<T> {
        let len = self.heap.len();
        if len == 0 {
            return Err(NutError::out_of_range(0, 0));
        }

        self.heap.swap_at(0, len - 1)?;
        let top = self.heap.remove_last()?;
        self.sift_down(0);
        Ok(top)
    }

    /// Drop every element
    pub fn clear(&mut self) {
        self.heap.clear();
    }

    /// Consume the queue, handing every element to `f` in heap order
    pub fn destroy_with<F: FnMut(T)>(self, f: F) {
        self.heap.destroy_with(f);
    }

    /// Iterator in heap (not priority) order
    pub fn iter(&self) -> array::Iter<'_, T> {
        self.heap.iter()
    }

    fn sift_up(&mut self, mut i: usize) {
        let cmp = self.cmp;
        let slots = self.heap.slots_mut();
        while i > 0 {
            let p = parent(i);
            if !greater(cmp, slots, i, p) {
                break;
            }
            slots.swap(i, p);
            i = p;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let cmp = self.cmp;
        let slots = self.heap.slots_mut();
        let len = slots.len();
        loop {
            let left = 2 * i + 1;
            if left >= len {
                break;
            }
            let right = left + 1;

            let mut largest = i;
            if greater(cmp, slots, left, largest) {
                largest = left;
            }
            if right < len && greater(cmp, slots, right, largest) {
                largest = right;
            }
            if largest == i {
                break;
            }

            slots.swap(i, largest);
            i = largest;
        }
    }
}

/// Whether slot `a` outranks slot `b`
#[inline]
fn greater<T>(cmp: CompareFn<T>, slots: &[Option<T>], a: usize, b: usize) -> bool {
    match (&slots[a], &slots[b]) {
        (Some(x), Some(y)) => cmp(x, y) == Ordering::Greater,
        _ => false,
    }
}

impl<T: fmt::Debug> fmt::Debug for PQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PQueue")
            .field("len", &self.len())
            .field("top", &self.top().ok())
            .finish()
    }
}
