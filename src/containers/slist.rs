//! SList: singly linked list over a node arena
//!
//! Same contract as [`List`](super::List) with forward links only. Operations
//! at the tail that need the predecessor (`remove_last`, `add_at` near the end)
//! walk from the head.

use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use std::mem;

use super::array::{Array, ArrayConfig};
use super::list::{merge_sort_links, ListConfig};
use crate::error::{check_bounds, check_range, NutError, Result};
use crate::memory::{AllocatorRef, NodeArena, NodeId};

struct Node<T> {
    data: T,
    next: Option<NodeId>,
}

/// Singly linked list
pub struct SList<T> {
    nodes: NodeArena<Node<T>>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
}

impl<T> SList<T> {
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

    fn node_at(&self, index: usize) -> Option<NodeId> {
        if index >= self.len() {
            return None;
        }
        if index == self.len() - 1 {
            return self.tail;
        }
        let mut cursor = self.head;
        for _ in 0..index {
            cursor = self.nodes[cursor?].next;
        }
        cursor
    }

    /// Link a new node after `prev` (or at the head)
    fn link_after(&mut self, prev: Option<NodeId>, data: T) -> Result<NodeId> {
        let next = match prev {
            Some(p) => self.nodes[p].next,
            None => self.head,
        };
        let id = self.nodes.insert(Node { data, next })?;

        match prev {
            Some(p) => self.nodes[p].next = Some(id),
            None => self.head = Some(id),
        }
        if next.is_none() {
            self.tail = Some(id);
        }
        Ok(id)
    }

    /// Unlink the node following `prev` (or the head)
    fn unlink_after(&mut self, prev: Option<NodeId>) -> Option<T> {
        let id = match prev {
            Some(p) => self.nodes[p].next?,
            None => self.head?,
        };
        let node = self.nodes.remove(id)?;

        match prev {
            Some(p) => self.nodes[p].next = node.next,
            None => self.head = node.next,
        }
        if node.next.is_none() {
            self.tail = prev;
        }
        Some(node.data)
    }

    /// Predecessor of position `index`, `None` meaning "at the head"
    fn prev_of(&self, index: usize) -> Result<Option<NodeId>> {
        let len = self.len();
        if index > len {
            return Err(NutError::out_of_range(index, len));
        }
        if index == 0 {
            return Ok(None);
        }
        Ok(self.node_at(index - 1))
    }

    /// Append `element`; same as [`SList::add_last`]
    #[inline]
    pub fn add(&mut self, element: T) -> Result<()> {
        self.add_last(element)
    }

    /// Prepend `element`
    pub fn add_first(&mut self, element: T) -> Result<()> {
        self.link_after(None, element).map(|_| ())
    }

    /// Append `element`
    pub fn add_last(&mut self, element: T) -> Result<()> {
        self.link_after(self.tail, element).map(|_| ())
    }

    /// Insert `element` at `index`; `index == len()` appends
    pub fn add_at(&mut self, index: usize, element: T) -> Result<()> {
        let prev = self.prev_of(index)?;
        self.link_after(prev, element).map(|_| ())
    }

    fn insert_run<I>(&mut self, mut prev: Option<NodeId>, count: usize, items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        self.nodes.reserve(count)?;
        for data in items {
            prev = Some(self.link_after(prev, data)?);
        }
        Ok(())
    }

    /// Append clones of every element of `other`
    pub fn add_all(&mut self, other: &SList<T>) -> Result<()>
    where
        T: Clone,
    {
        self.insert_run(self.tail, other.len(), other.iter().cloned())
    }

    /// Insert clones of every element of `other` starting at `index`
    pub fn add_all_at(&mut self, other: &SList<T>, index: usize) -> Result<()>
    where
        T: Clone,
    {
        let prev = self.prev_of(index)?;
        self.insert_run(prev, other.len(), other.iter().cloned())
    }

    /// Move every element of `other` to the end of this list
    pub fn splice(&mut self, other: &mut SList<T>) -> Result<()> {
        self.splice_at(other, self.len())
    }

    /// Move every element of `other` into this list starting at `index`
    ///
    /// `other` is left empty. If this list cannot make room, both lists are
    /// unchanged.
    pub fn splice_at(&mut self, other: &mut SList<T>, index: usize) -> Result<()> {
        let mut prev = self.prev_of(index)?;
        if other.is_empty() {
            return Ok(());
        }

        self.nodes.reserve(other.len())?;
        while let Ok(data) = other.remove_first() {
            prev = Some(self.link_after(prev, data)?);
        }
        Ok(())
    }

    /// Remove the first element equal to `element`
    pub fn remove(&mut self, element: &T) -> Result<T>
    where
        T: PartialEq,
    {
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(id) = cursor {
            if self.nodes[id].data == *element {
                return self.unlink_after(prev).ok_or(NutError::ValueNotFound);
            }
            prev = Some(id);
            cursor = self.nodes[id].next;
        }
        Err(NutError::ValueNotFound)
    }

    /// Remove and return the first element
    pub fn remove_first(&mut self) -> Result<T> {
        self.unlink_after(None).ok_or(NutError::ValueNotFound)
    }

    /// Remove and return the last element
    pub fn remove_last(&mut self) -> Result<T> {
        if self.is_empty() {
            return Err(NutError::ValueNotFound);
        }
        let prev = self.prev_of(self.len() - 1)?;
        self.unlink_after(prev).ok_or(NutError::ValueNotFound)
    }

    /// Remove and return the element at `index`
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        check_bounds(index, self.len())?;
        let prev = self.prev_of(index)?;
        self.unlink_after(prev)
            .ok_or_else(|| NutError::out_of_range(index, self.len()))
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
        Ok(mem::replace(self.get_mut(index)?, element))
    }

    /// New list holding clones of elements `from..=to`
    pub fn sublist(&self, from: usize, to: usize) -> Result<Self>
    where
        T: Clone,
    {
        check_range(from, to, self.len())?;
        let count = to - from + 1;
        let mut sub = self.sibling();
        sub.insert_run(None, count, self.iter().skip(from).take(count).cloned())?;
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
        copy.insert_run(None, self.len(), self.iter().map(cp))?;
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
        self.iter()
            .position(|e| e == element)
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

    /// Reverse the links in place
    pub fn reverse(&mut self) {
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(id) = cursor {
            cursor = mem::replace(&mut self.nodes[id].next, prev);
            prev = Some(id);
        }
        self.tail = self.head;
        self.head = prev;
    }

    /// Stable merge sort by `cmp`; only links are rewritten
    pub fn sort<F>(&mut self, mut cmp: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.head = merge_sort_links(
            &mut self.nodes,
            self.head,
            |nodes, id| nodes[id].next,
            |nodes, id, next| nodes[id].next = next,
            |nodes, a, b| cmp(&nodes[a].data, &nodes[b].data),
        );

        let mut cursor = self.head;
        while let Some(id) = cursor {
            self.tail = Some(id);
            cursor = self.nodes[id].next;
        }
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

        let mut prev = None;
        let mut cursor = self.head;
        while let Some(id) = cursor {
            cursor = self.nodes[id].next;
            if pred(&self.nodes[id].data) {
                prev = Some(id);
            } else {
                self.unlink_after(prev);
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

    /// Iterator front to back
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            next: self.head,
            remaining: self.len(),
        }
    }

    /// Mutating cursor walking front to back
    pub fn cursor(&mut self) -> CursorMut<'_, T> {
        let next = self.head;
        CursorMut {
            list: self,
            current: None,
            before_current: None,
            next,
            before_next: None,
            position: 0,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T> IntoIterator for &'a SList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

/// Iterator over an [`SList`]
pub struct Iter<'a, T> {
    list: &'a SList<T>,
    next: Option<NodeId>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let node = &self.list.nodes[self.next?];
        self.next = node.next;
        self.remaining -= 1;
        Some(&node.data)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Front-to-back cursor over an [`SList`]
///
/// Tracks the predecessor of both the current and the upcoming node so that
/// removal and insertion stay O(1).
pub struct CursorMut<'a, T> {
    list: &'a mut SList<T>,
    current: Option<(NodeId, usize)>,
    before_current: Option<NodeId>,
    next: Option<NodeId>,
    before_next: Option<NodeId>,
    position: usize,
}

impl<'a, T> CursorMut<'a, T> {
    /// Advance and yield the next element
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&mut T> {
        let id = self.next?;
        self.before_current = self.before_next;
        self.before_next = Some(id);
        self.next = self.list.nodes[id].next;
        self.current = Some((id, self.position));
        self.position += 1;
        Some(&mut self.list.nodes[id].data)
    }

    /// Remove the element last yielded by `next`
    pub fn remove(&mut self) -> Result<T> {
        let (id, _) = self.current.take().ok_or(NutError::ValueNotFound)?;
        let data = self
            .list
            .unlink_after(self.before_current)
            .ok_or(NutError::ValueNotFound)?;
        if self.before_next == Some(id) {
            self.before_next = self.before_current;
        }
        self.position -= 1;
        Ok(data)
    }

    /// Insert `element` after the element last yielded; it is not visited
    pub fn add(&mut self, element: T) -> Result<()> {
        let id = self.list.link_after(self.before_next, element)?;
        self.before_next = Some(id);
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

#[cfg(test)]
mod tests {
    use super::*;

    fn slist_of(values: &[i32]) -> SList<i32> {
        let mut list = SList::new().unwrap();
        for &v in values {
            list.add(v).unwrap();
        }
        list
    }

    fn contents(list: &SList<i32>) -> Vec<i32> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_basic_ops() {
        let mut list = slist_of(&[1, 3]);
        list.add_first(0).unwrap();
        list.add_at(2, 2).unwrap();
        list.add_at(4, 4).unwrap();
        assert_eq!(contents(&list), vec![0, 1, 2, 3, 4]);
        assert_eq!(list.get_last(), Ok(&4));
        assert_eq!(list.remove_last(), Ok(4));
        assert_eq!(list.get_last(), Ok(&3));
        assert_eq!(list.remove_at(0), Ok(0));
        assert_eq!(list.get_first(), Ok(&1));
        assert_eq!(list.remove(&2), Ok(2));
        assert_eq!(contents(&list), vec![1, 3]);
        assert_eq!(list.get_last(), Ok(&3));
    }

    #[test]
    fn test_remove_only_element_resets_ends() {
        let mut list = slist_of(&[7]);
        assert_eq!(list.remove_last(), Ok(7));
        assert_eq!(list.get_first(), Err(NutError::ValueNotFound));
        assert_eq!(list.get_last(), Err(NutError::ValueNotFound));
        list.add(8).unwrap();
        assert_eq!(list.get_first(), Ok(&8));
        assert_eq!(list.get_last(), Ok(&8));
    }

    #[test]
    fn test_splice_and_add_all() {
        let mut a = slist_of(&[1, 4]);
        let mut b = slist_of(&[2, 3]);
        a.splice_at(&mut b, 1).unwrap();
        assert_eq!(contents(&a), vec![1, 2, 3, 4]);
        assert!(b.is_empty());

        let c = slist_of(&[5, 6]);
        a.add_all(&c).unwrap();
        a.add_all_at(&c, 0).unwrap();
        assert_eq!(contents(&a), vec![5, 6, 1, 2, 3, 4, 5, 6]);
        assert_eq!(a.get_last(), Ok(&6));
    }

    #[test]
    fn test_reverse_and_sort() {
        let mut list = slist_of(&[3, 1, 2]);
        list.reverse();
        assert_eq!(contents(&list), vec![2, 1, 3]);
        assert_eq!(list.get_last(), Ok(&3));

        list.add(0).unwrap();
        list.sort(|a, b| a.cmp(b));
        assert_eq!(contents(&list), vec![0, 1, 2, 3]);
        assert_eq!(list.get_last(), Ok(&3));
        list.add(9).unwrap();
        assert_eq!(list.get_last(), Ok(&9));
    }

    #[test]
    fn test_filter_mut_updates_tail() {
        let mut list = slist_of(&[1, 2, 3, 4]);
        list.filter_mut(|e| e % 2 == 1).unwrap();
        assert_eq!(contents(&list), vec![1, 3]);
        assert_eq!(list.get_last(), Ok(&3));
    }

    #[test]
    fn test_cursor_remove_every_second() {
        let mut list = slist_of(&[0, 1, 2, 3, 4, 5]);
        let mut cursor = list.cursor();
        let mut visit = 0;
        while cursor.next().is_some() {
            if visit % 2 == 1 {
                cursor.remove().unwrap();
            }
            visit += 1;
        }
        assert_eq!(contents(&list), vec![0, 2, 4]);
        assert_eq!(list.get_last(), Ok(&4));
    }

    #[test]
    fn test_cursor_remove_then_add() {
        let mut list = slist_of(&[1, 2, 3]);
        let mut cursor = list.cursor();
        cursor.next();
        cursor.next();
        assert_eq!(cursor.index(), Some(1));
        assert_eq!(cursor.remove(), Ok(2));
        cursor.add(20).unwrap();
        assert_eq!(cursor.next().copied(), Some(3));
        assert_eq!(cursor.index(), Some(2));
        cursor.add(4).unwrap();
        assert!(cursor.next().is_none());
        assert_eq!(contents(&list), vec![1, 20, 3, 4]);
        assert_eq!(list.get_last(), Ok(&4));
    }

    #[test]
    fn test_cursor_add_at_head_before_next() {
        let mut list = slist_of(&[5]);
        let mut cursor = list.cursor();
        cursor.add(1).unwrap();
        assert_eq!(cursor.next().copied(), Some(5));
        assert_eq!(cursor.index(), Some(1));
        assert_eq!(contents(&list), vec![1, 5]);
    }

    #[test]
    fn test_sublist_copy_to_array() {
        let list = slist_of(&[1, 2, 3, 4]);
        assert_eq!(contents(&list.sublist(1, 2).unwrap()), vec![2, 3]);
        assert_eq!(contents(&list.copy_deep(|e| e + 1).unwrap()), vec![2, 3, 4, 5]);
        assert_eq!(list.to_array().unwrap().len(), 4);
        assert_eq!(list.index_of(&3), Ok(2));
        assert_eq!(list.contains(&9), 0);
    }
}
