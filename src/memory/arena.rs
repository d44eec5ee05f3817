//! Free-list node storage for linked containers
//!
//! Linked lists, hash chains and the red-black tree keep their nodes in a
//! [`NodeArena`] and link them by [`NodeId`] instead of by pointer. Slots
//! never move while occupied, so an id stays valid until its node is removed;
//! iterators rely on that to survive removals of other nodes. Vacant slots are
//! threaded into a LIFO free list and reused before the arena grows.

use std::fmt;
use std::ops::{Index, IndexMut};

use super::{AllocatorRef, SlotBuf};
use crate::error::{NutError, Result};

/// Slots allocated by the first insertion into an empty arena
const INITIAL_SLOTS: usize = 4;

/// Largest number of slots an arena can address
pub const MAX_NODES: usize = u32::MAX as usize;

/// Stable handle to a node stored in a [`NodeArena`]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Slot position of the node
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

enum Slot<N> {
    Occupied(N),
    Vacant(Option<NodeId>),
}

/// Growable node storage drawn from an allocator
pub struct NodeArena<N> {
    slots: SlotBuf<Slot<N>>,
    used: usize,
    free_head: Option<NodeId>,
    len: usize,
}

impl<N> NodeArena<N> {
    /// Empty arena; the first insertion allocates
    pub fn new(allocator: AllocatorRef) -> Self {
        Self {
            slots: SlotBuf::empty(allocator),
            used: 0,
            free_head: None,
            len: 0,
        }
    }

    /// Arena with room for `capacity` nodes before growing
    pub fn with_capacity(capacity: usize, allocator: AllocatorRef) -> Result<Self> {
        if capacity > MAX_NODES {
            return Err(NutError::invalid_capacity(capacity));
        }
        Ok(Self {
            slots: SlotBuf::new(capacity, allocator)?,
            used: 0,
            free_head: None,
            len: 0,
        })
    }

    /// Number of live nodes
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the arena holds no live nodes
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocated slots
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Allocator backing the arena
    #[inline]
    pub fn allocator(&self) -> &AllocatorRef {
        self.slots.allocator()
    }

    /// Store `node`, growing the arena if every slot is taken
    ///
    /// On failure the arena is unchanged and `node` is dropped.
    pub fn insert(&mut self, node: N) -> Result<NodeId> {
        if let Some(id) = self.free_head {
            let slot = &mut self.slots[id.index()];
            match slot.take() {
                Some(Slot::Vacant(next)) => {
                    self.free_head = next;
                    *slot = Some(Slot::Occupied(node));
                    self.len += 1;
                    return Ok(id);
                }
                other => {
                    *slot = other;
                    return Err(NutError::fatal("arena free list points at a live slot"));
                }
            }
        }

        if self.used == self.slots.capacity() {
            self.grow(self.used + 1)?;
        }

        let id = NodeId(self.used as u32);
        self.slots[self.used] = Some(Slot::Occupied(node));
        self.used += 1;
        self.len += 1;
        Ok(id)
    }

    /// Remove and return the node at `id`
    pub fn remove(&mut self, id: NodeId) -> Option<N> {
        let slot = self.slots.get_mut(id.index())?;
        if !matches!(slot, Some(Slot::Occupied(_))) {
            return None;
        }

        match slot.replace(Slot::Vacant(self.free_head)) {
            Some(Slot::Occupied(node)) => {
                self.free_head = Some(id);
                self.len -= 1;
                Some(node)
            }
            _ => None,
        }
    }

    /// Shared access to a live node
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&N> {
        match self.slots.get(id.index()) {
            Some(Some(Slot::Occupied(node))) => Some(node),
            _ => None,
        }
    }

    /// Exclusive access to a live node
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut N> {
        match self.slots.get_mut(id.index()) {
            Some(Some(Slot::Occupied(node))) => Some(node),
            _ => None,
        }
    }

    /// Exclusive access to two distinct live nodes at once
    pub fn pair_mut(&mut self, a: NodeId, b: NodeId) -> Option<(&mut N, &mut N)> {
        if a == b {
            return None;
        }
        let (lo, hi, swapped) = if a < b { (a, b, false) } else { (b, a, true) };
        if hi.index() >= self.slots.len() {
            return None;
        }

        let (head, tail) = self.slots.split_at_mut(hi.index());
        match (&mut head[lo.index()], &mut tail[0]) {
            (Some(Slot::Occupied(x)), Some(Slot::Occupied(y))) => {
                if swapped {
                    Some((y, x))
                } else {
                    Some((x, y))
                }
            }
            _ => None,
        }
    }

    /// Ensure `additional` more nodes can be inserted without allocating
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        let available = self.slots.capacity() - self.len;
        if additional <= available {
            return Ok(());
        }

        // Vacant slots below `used` stay on the free list; only the tail grows
        let needed = self
            .used
            .checked_add(additional - (self.used - self.len))
            .filter(|&n| n <= MAX_NODES)
            .ok_or_else(|| NutError::max_capacity(self.slots.capacity()))?;
        self.grow(needed)
    }

    /// Drop every node, keeping the allocated slots
    pub fn clear(&mut self) {
        for slot in self.slots[..self.used].iter_mut() {
            *slot = None;
        }
        self.reset();
    }

    /// Hand every live node to `f` in slot order, leaving the arena empty
    pub fn drain_with<F: FnMut(N)>(&mut self, mut f: F) {
        for slot in self.slots[..self.used].iter_mut() {
            if let Some(Slot::Occupied(node)) = slot.take() {
                f(node);
            }
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.used = 0;
        self.free_head = None;
        self.len = 0;
    }

    /// Grow to at least `min_capacity` slots, doubling where possible
    fn grow(&mut self, min_capacity: usize) -> Result<()> {
        let capacity = self.slots.capacity();
        if capacity >= MAX_NODES {
            log::warn!("node arena cannot grow beyond {} slots", capacity);
            return Err(NutError::max_capacity(capacity));
        }

        let doubled = if capacity == 0 {
            INITIAL_SLOTS
        } else {
            capacity.saturating_mul(2)
        };
        let new_capacity = doubled.max(min_capacity).min(MAX_NODES);

        let mut slots = self.slots.sibling(new_capacity)?;
        for (dst, src) in slots.iter_mut().zip(self.slots[..self.used].iter_mut()) {
            *dst = src.take();
        }
        self.slots = slots;

        log::debug!("node arena grew from {} to {} slots", capacity, new_capacity);
        Ok(())
    }
}

impl<N> Index<NodeId> for NodeArena<N> {
    type Output = N;

    #[inline]
    fn index(&self, id: NodeId) -> &N {
        match self.get(id) {
            Some(node) => node,
            None => panic!("no live node at {:?}", id),
        }
    }
}

impl<N> IndexMut<NodeId> for NodeArena<N> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut N {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("no live node at {:?}", id),
        }
    }
}

impl<N: fmt::Debug> fmt::Debug for NodeArena<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let live = self.slots[..self.used].iter().filter_map(|slot| match slot {
            Some(Slot::Occupied(node)) => Some(node),
            _ => None,
        });
        f.debug_list().entries(live).finish()
    }
}
