//! List: doubly linked list over a node arena
//!
//! Nodes live in a [`NodeArena`] and link to each other by [`NodeId`].
//! Splicing, unlinking and sorting only rewrite links; payloads never move
//! between nodes. Bulk insertions reserve arena room up front so they either
//! complete or leave both lists untouched.

use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use std::mem;

use super::array::{Array, ArrayConfig};
use crate::config::CollectionSettings;
use crate::error::{check_bounds, check_range, NutError, Result};
use crate::memory::{AllocatorRef, NodeArena, NodeId};

/// Construction parameters for [`List`] and [`SList`](super::SList)
#[derive(Debug, Clone)]
pub struct ListConfig {
    /// Node slots to allocate up front; 0 defers allocation to the first insert
    pub capacity: usize,
    /// Allocator for the node arena
    pub allocator: AllocatorRef,
}

impl ListConfig {
    /// Default configuration: lazy allocation from the system allocator
    pub const DEFAULT: Self = Self {
        capacity: 0,
        allocator: AllocatorRef::System,
    };

    /// Defaults with the initial node capacity taken from `settings`
    pub fn from_settings(settings: &CollectionSettings) -> Self {
        Self {
            capacity: settings.default_capacity,
            ..Self::DEFAULT
        }
    }

    /// Set the initial node capacity
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the allocator
    pub fn with_allocator(mut self, allocator: AllocatorRef) -> Self {
        self.allocator = allocator;
        self
    }

    pub(crate) fn arena<N>(&self) -> Result<NodeArena<N>> {
        if self.capacity == 0 {
            Ok(NodeArena::new(self.allocator.clone()))
        } else {
            NodeArena::with_capacity(self.capacity, self.allocator.clone())
        }
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

struct Node<T> {
    data: T,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

/// Doubly linked list
pub struct List<T> {
    nodes: NodeArena<Node<T>>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
}

impl<T> List<T> {
    /// Create a list with [`ListConfig::DEFAULT`]
    pub fn new() -> Result<Self> {
        Self::with_config(ListConfig::DEFAULT)
    }

    /// Create a list from `config`
    pub fn with_config(config: ListConfig) -> Result<Self> {
        Ok(Self {
            nodes: config.arena()?,
            head: None,
            tail: None,
        })
    }

    fn sibling(&self) -> Self {
        Self {
            nodes: NodeArena::new(self.nodes.allocator().clone()),
            head: None,
            tail: None,
        }
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the list holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocator the list draws nodes from
    #[inline]
    pub fn allocator(&self) -> &AllocatorRef {
        self.nodes.allocator()
    }

    /// Node at `index`, walking from the nearer end
    fn node_at(&self, index: usize) -> Option<NodeId> {
        let len = self.len();
        if index >= len {
            return None;
        }

        if index < len / 2 {
            let mut cursor = self.head;
            for _ in 0..index {
                cursor = self.nodes[cursor?].next;
            }
            cursor
        } else {
            let mut cursor = self.tail;
            for _ in 0..len - 1 - index {
                cursor = self.nodes[cursor?].prev;
            }
            cursor
        }
    }

    fn find(&self, element: &T) -> Option<(usize, NodeId)>
    where
        T: PartialEq,
    {
        let mut cursor = self.head;
        let mut index = 0;
        while let Some(id) = cursor {
            if self.nodes[id].data == *element {
                return Some((index, id));
            }
            cursor = self.nodes[id].next;
            index += 1;
        }
        None
    }

    /// Link a new node between `prev` and `next` (either may be absent)
    fn link_between(
        &mut self,
        prev: Option<NodeId>,
        next: Option<NodeId>,
        data: T,
    ) -> Result<NodeId> {
        let id = self.nodes.insert(Node { data, prev, next })?;

        match prev {
            Some(p) => self.nodes[p].next = Some(id),
            None => self.head = Some(id),
        }
        match next {
            Some(n) => self.nodes[n].prev = Some(id),
            None => self.tail = Some(id),
        }
        Ok(id)
    }

    fn unlink(&mut self, id: NodeId) -> Option<T> {
        let node = self.nodes.remove(id)?;

        match node.prev {
            Some(p) => self.nodes[p].next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(n) => self.nodes[n].prev = node.prev,
            None => self.tail = node.prev,
        }
        Some(node.data)
    }

    /// Append `element`; same as [`List::add_last`]
    #[inline]
    pub fn add(&mut self, element: T) -> Result<()> {
        self.add_last(element)
    }

    /// Prepend `element`
    pub fn add_first(&mut self, element: T) -> Result<()> {
        self.link_between(None, self.head, element).map(|_| ())
    }

    /// Append `element`
    pub fn add_last(&mut self, element: T) -> Result<()> {
        self.link_between(self.tail, None, element).map(|_| ())
    }

    /// Insert `element` at `index`; `index == len()` appends
    pub fn add_at(&mut self, index: usize, element: T) -> Result<()> {
        let len = self.len();
        if index > len {
            return Err(NutError::out_of_range(index, len));
        }
        if index == len {
            return self.add_last(element);
        }

        let next = self.node_at(index);
        let prev = next.and_then(|n| self.nodes[n].prev);
        self.link_between(prev, next, element).map(|_| ())
    }

    /// Insert the elements of `items` as one run between `prev` and `next`
    ///
    /// Arena room is reserved first, so either every element is linked or
    /// nothing is.
    fn insert_run<I>(
        &mut self,
        mut prev: Option<NodeId>,
        next: Option<NodeId>,
        count: usize,
        items: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        self.nodes.reserve(count)?;
        for data in items {
            prev = Some(self.link_between(prev, next, data)?);
        }
        Ok(())
    }

    /// Boundary nodes around position `index` (`index <= len()`)
    fn gap_at(&self, index: usize) -> Result<(Option<NodeId>, Option<NodeId>)> {
        let len = self.len();
        if index > len {
            return Err(NutError::out_of_range(index, len));
        }
        if index == len {
            return Ok((self.tail, None));
        }
        let next = self.node_at(index);
        Ok((next.and_then(|n| self.nodes[n].prev), next))
    }

    /// Append clones of every element of `other`
    pub fn add_all(&mut self, other: &List<T>) -> Result<()>
    where
        T: Clone,
    {
        self.add_all_at(other, self.len())
    }

    /// Insert clones of every element of `other` starting at `index`
    pub fn add_all_at(&mut self, other: &List<T>, index: usize) -> Result<()>
    where
        T: Clone,
    {
        let (prev, next) = self.gap_at(index)?;
        self.insert_run(prev, next, other.len(), other.iter().cloned())
    }

    /// Move every element of `other` to the end of this list
    pub fn splice(&mut self, other: &mut List<T>) -> Result<()> {
        self.splice_at(other, self.len())
    }

    /// Move every element of `other` into this list starting at `index`
    ///
    /// `other` is left empty. If this list cannot make room, both lists are
    /// unchanged.
    pub fn splice_at(&mut self, other: &mut List<T>, index: usize) -> Result<()> {
        let (prev, next) = self.gap_at(index)?;
        if other.is_empty() {
            return Ok(());
        }

        self.nodes.reserve(other.len())?;
        let mut at = prev;
        while let Ok(data) = other.remove_first() {
            at = Some(self.link_between(at, next, data)?);
        }
        Ok(())
    }

    /// Remove the first element equal to `element`
    pub fn remove(&mut self, element: &T) -> Result<T>
    where
        T: PartialEq,
    {
        let (_, id) = self.find(element).ok_or(NutError::ValueNotFound)?;
        self.unlink(id).ok_or(NutError::ValueNotFound)
    }

    /// Remove and return the first element
    pub fn remove_first(&mut self) -> Result<T> {
        let head = self.head.ok_or(NutError::ValueNotFound)?;
        self.unlink(head).ok_or(NutError::ValueNotFound)
    }

    /// Remove and return the last element
    pub fn remove_last(&mut self) -> Result<T> {
        let tail = self.tail.ok_or(NutError::ValueNotFound)?;
        self.unlink(tail).ok_or(NutError::ValueNotFound)
    }

    /// Remove and return the element at `index`
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        check_bounds(index, self.len())?;
        let id = self
            .node_at(index)
            .ok_or_else(|| NutError::out_of_range(index, self.len()))?;
        self.unlink(id).ok_or(NutError::ValueNotFound)
    }

    /// Drop every element
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }

    /// Hand every element to `f` front to back, leaving the list empty
    pub fn clear_with<F: FnMut(T)>(&mut self, mut f: F) {
        while let Ok(data) = self.remove_first() {
            f(data);
        }
    }

    /// Consume the list, handing every element to `f` front to back
    pub fn destroy_with<F: FnMut(T)>(mut self, f: F) {
        self.clear_with(f);
    }

    /// First element
    pub fn get_first(&self) -> Result<&T> {
        let head = self.head.ok_or(NutError::ValueNotFound)?;
        Ok(&self.nodes[head].data)
    }

    /// Last element
    pub fn get_last(&self) -> Result<&T> {
        let tail = self.tail.ok_or(NutError::ValueNotFound)?;
        Ok(&self.nodes[tail].data)
    }

    /// Element at `index`
    pub fn get_at(&self, index: usize) -> Result<&T> {
        check_bounds(index, self.len())?;
        let id = self
            .node_at(index)
            .ok_or_else(|| NutError::out_of_range(index, self.len()))?;
        Ok(&self.nodes[id].data)
    }

    /// Mutable element at `index`
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        check_bounds(index, self.len())?;
        let id = self
            .node_at(index)
            .ok_or_else(|| NutError::out_of_range(index, self.len()))?;
        Ok(&mut self.nodes[id].data)
    }

    /// Replace the element at `index`, returning the previous one
    pub fn replace_at(&mut self, index: usize, element: T) -> Result<T> {
        let slot = self.get_mut(index)?;
        Ok(mem::replace(slot, element))
    }

    /// New list holding clones of elements `from..=to`
    pub fn sublist(&self, from: usize, to: usize) -> Result<Self>
    where
        T: Clone,
    {
        check_range(from, to, self.len())?;

        let mut sub = self.sibling();
        let count = to - from + 1;
        sub.insert_run(None, None, count, self.iter().skip(from).take(count).cloned())?;
        Ok(sub)
    }

    /// Copy into a new list, cloning each element
    pub fn copy_shallow(&self) -> Result<Self>
    where
        T: Clone,
    {
        self.copy_deep(T::clone)
    }

    /// Copy into a new list, producing each element with `cp`
    pub fn copy_deep<F: FnMut(&T) -> T>(&self, cp: F) -> Result<Self> {
        let mut copy = self.sibling();
        copy.insert_run(None, None, self.len(), self.iter().map(cp))?;
        Ok(copy)
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
        self.find(element)
            .map(|(index, _)| index)
            .ok_or(NutError::ValueNotFound)
    }

    /// Clone the elements into an [`Array`] drawn from the same allocator
    pub fn to_array(&self) -> Result<Array<T>>
    where
        T: Clone,
    {
        let config = ArrayConfig::DEFAULT
            .with_capacity(self.len().max(1))
            .with_allocator(self.allocator().clone());
        let mut array = Array::with_config(config)?;
        for element in self.iter() {
            array.add(element.clone())?;
        }
        Ok(array)
    }

    /// Reverse the list by swapping every node's links
    pub fn reverse(&mut self) {
        let mut cursor = self.head;
        while let Some(id) = cursor {
            let node = &mut self.nodes[id];
            mem::swap(&mut node.prev, &mut node.next);
            cursor = node.prev;
        }
        mem::swap(&mut self.head, &mut self.tail);
    }

    /// Stable merge sort by `cmp`; only links are rewritten
    pub fn sort<F>(&mut self, mut cmp: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let head = merge_sort_links(
            &mut self.nodes,
            self.head,
            |nodes, id| nodes[id].next,
            |nodes, id, next| nodes[id].next = next,
            |nodes, a, b| cmp(&nodes[a].data, &nodes[b].data),
        );

        // Rebuild back links from the sorted forward chain
        let mut prev = None;
        let mut cursor = head;
        while let Some(id) = cursor {
            self.nodes[id].prev = prev;
            prev = Some(id);
            cursor = self.nodes[id].next;
        }
        self.head = head;
        self.tail = prev;
    }

    /// Call `f` on every element front to back
    pub fn foreach<F: FnMut(&T)>(&self, f: F) {
        self.iter().for_each(f);
    }

    /// Keep only the elements for which `pred` returns true
    ///
    /// Fails with `OutOfRange` on an empty list.
    pub fn filter_mut<F: FnMut(&T) -> bool>(&mut self, mut pred: F) -> Result<()> {
        if self.is_empty() {
            return Err(NutError::out_of_range(0, 0));
        }

        let mut cursor = self.head;
        while let Some(id) = cursor {
            cursor = self.nodes[id].next;
            if !pred(&self.nodes[id].data) {
                self.unlink(id);
            }
        }
        Ok(())
    }

    /// New list holding clones of the elements for which `pred` returns true
    ///
    /// Fails with `OutOfRange` on an empty list.
    pub fn filter<F: FnMut(&T) -> bool>(&self, mut pred: F) -> Result<Self>
    where
        T: Clone,
    {
        if self.is_empty() {
            return Err(NutError::out_of_range(0, 0));
        }

        let mut filtered = self.sibling();
        for element in self.iter().filter(|e| pred(*e)) {
            filtered.add_last(element.clone())?;
        }
        Ok(filtered)
    }

    /// Double-ended iterator, front to back
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            front: self.head,
            back: self.tail,
            remaining: self.len(),
        }
    }

    /// Mutating cursor walking front to back
    pub fn cursor(&mut self) -> CursorMut<'_, T> {
        let next = self.head;
        CursorMut {
            list: self,
            current: None,
            next,
            position: 0,
        }
    }

    /// Mutating cursor walking back to front
    pub fn cursor_back(&mut self) -> DescCursorMut<'_, T> {
        let next = self.tail;
        let before = self.len();
        DescCursorMut {
            list: self,
            current: None,
            next,
            before,
        }
    }
}

/// Bottom-up merge sort over a forward-linked chain
///
/// Works purely on node ids through the supplied accessors and returns the
/// new head. Ties keep their original order.
pub(crate) fn merge_sort_links<A, G, S, C>(
    ctx: &mut A,
    head: Option<NodeId>,
    get_next: G,
    set_next: S,
    mut cmp: C,
) -> Option<NodeId>
where
    A: ?Sized,
    G: Fn(&A, NodeId) -> Option<NodeId>,
    S: Fn(&mut A, NodeId, Option<NodeId>),
    C: FnMut(&A, NodeId, NodeId) -> Ordering,
{
    let mut head = head;
    let mut width = 1usize;

    loop {
        let mut p = head;
        head = None;
        let mut tail: Option<NodeId> = None;
        let mut merges = 0;

        while let Some(start) = p {
            merges += 1;

            // Right run starts `width` nodes after the left one
            let mut q = Some(start);
            let mut p_len = 0;
            while p_len < width {
                p_len += 1;
                q = q.and_then(|id| get_next(ctx, id));
                if q.is_none() {
                    break;
                }
            }
            let mut q_len = width;
            let mut left = Some(start);

            loop {
                let e = match (left, q) {
                    (Some(a), Some(b)) if p_len > 0 && q_len > 0 => {
                        if cmp(ctx, a, b) != Ordering::Greater {
                            p_len -= 1;
                            left = get_next(ctx, a);
                            a
                        } else {
                            q_len -= 1;
                            q = get_next(ctx, b);
                            b
                        }
                    }
                    (Some(a), _) if p_len > 0 => {
                        p_len -= 1;
                        left = get_next(ctx, a);
                        a
                    }
                    (_, Some(b)) if q_len > 0 => {
                        q_len -= 1;
                        q = get_next(ctx, b);
                        b
                    }
                    _ => break,
                };

                match tail {
                    Some(t) => set_next(ctx, t, Some(e)),
                    None => head = Some(e),
                }
                tail = Some(e);
            }

            p = q;
        }

        if let Some(t) = tail {
            set_next(ctx, t, None);
        }

        if merges <= 1 {
            return head;
        }
        width *= 2;
    }
}

impl<T: fmt::Debug> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T> IntoIterator for &'a List<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

/// Double-ended iterator over a [`List`]
pub struct Iter<'a, T> {
    list: &'a List<T>,
    front: Option<NodeId>,
    back: Option<NodeId>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let node = &self.list.nodes[self.front?];
        self.front = node.next;
        self.remaining -= 1;
        Some(&node.data)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let node = &self.list.nodes[self.back?];
        self.back = node.prev;
        self.remaining -= 1;
        Some(&node.data)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Front-to-back cursor over a [`List`]
pub struct CursorMut<'a, T> {
    list: &'a mut List<T>,
    current: Option<(NodeId, usize)>,
    next: Option<NodeId>,
    position: usize,
}

impl<'a, T> CursorMut<'a, T> {
    /// Advance and yield the next element
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&mut T> {
        let id = self.next?;
        self.next = self.list.nodes[id].next;
        self.current = Some((id, self.position));
        self.position += 1;
        Some(&mut self.list.nodes[id].data)
    }

    /// Remove the element last yielded by `next`
    pub fn remove(&mut self) -> Result<T> {
        let (id, _) = self.current.take().ok_or(NutError::ValueNotFound)?;
        let data = self.list.unlink(id).ok_or(NutError::ValueNotFound)?;
        self.position -= 1;
        Ok(data)
    }

    /// Insert `element` after the element last yielded; it is not visited
    pub fn add(&mut self, element: T) -> Result<()> {
        let prev = match self.next {
            Some(n) => self.list.nodes[n].prev,
            None => self.list.tail,
        };
        self.list.link_between(prev, self.next, element)?;
        self.position += 1;
        Ok(())
    }

    /// Replace the element last yielded, returning it
    pub fn replace(&mut self, element: T) -> Result<T> {
        let (id, _) = self.current.ok_or(NutError::ValueNotFound)?;
        Ok(mem::replace(&mut self.list.nodes[id].data, element))
    }

    /// Index of the element last yielded
    pub fn index(&self) -> Option<usize> {
        self.current.map(|(_, index)| index)
    }
}

/// Back-to-front cursor over a [`List`]
pub struct DescCursorMut<'a, T> {
    list: &'a mut List<T>,
    current: Option<(NodeId, usize)>,
    next: Option<NodeId>,
    /// Elements not yet yielded (all of them precede `current`)
    before: usize,
}

impl<'a, T> DescCursorMut<'a, T> {
    /// Step towards the front and yield the element
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&mut T> {
        let id = self.next?;
        self.next = self.list.nodes[id].prev;
        self.before -= 1;
        self.current = Some((id, self.before));
        Some(&mut self.list.nodes[id].data)
    }

    /// Remove the element last yielded
    pub fn remove(&mut self) -> Result<T> {
        let (id, _) = self.current.take().ok_or(NutError::ValueNotFound)?;
        self.list.unlink(id).ok_or(NutError::ValueNotFound)
    }

    /// Insert `element` in front of the element last yielded (in list
    /// order); the walk has already passed it
    pub fn add(&mut self, element: T) -> Result<()> {
        let next = match self.next {
            Some(p) => self.list.nodes[p].next,
            None => self.list.head,
        };
        self.list.link_between(self.next, next, element)?;
        if let Some((_, index)) = self.current.as_mut() {
            *index += 1;
        }
        Ok(())
    }

    /// Replace the element last yielded, returning it
    pub fn replace(&mut self, element: T) -> Result<T> {
        let (id, _) = self.current.ok_or(NutError::ValueNotFound)?;
        Ok(mem::replace(&mut self.list.nodes[id].data, element))
    }

    /// Index (from the front) of the element last yielded
    pub fn index(&self) -> Option<usize> {
        self.current.map(|(_, index)| index)
    }
}
