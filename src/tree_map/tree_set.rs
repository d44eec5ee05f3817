//! TreeSet: a [`TreeTable`] whose values are all `()`
//!
//! Lookups that miss report `ValueNotFound`, since the element is the value
//! a set caller is asking about.

use std::fmt;

use super::tree_table::{self, TreeTable, TreeTableConfig};
use crate::common::CompareFn;
use crate::error::{NutError, Result};
use crate::memory::AllocatorRef;

/// Construction parameters for [`TreeSet`]; the backing table's config
pub type TreeSetConfig<K> = TreeTableConfig<K>;

/// Ordered set of unique elements
pub struct TreeSet<K> {
    table: TreeTable<K, ()>,
}

fn not_found(_: NutError) -> NutError {
    NutError::ValueNotFound
}

impl<K: Ord> TreeSet<K> {
    /// Create a set ordered by `K`'s `Ord`
    pub fn new() -> Result<Self> {
        Self::with_config(TreeSetConfig::DEFAULT)
    }
}

impl<K> TreeSet<K> {
    /// Create a set ordered by `cmp`
    pub fn with_comparator(cmp: CompareFn<K>) -> Result<Self> {
        Self::with_config(TreeSetConfig::with_comparator(cmp))
    }

    pub fn with_config(config: TreeSetConfig<K>) -> Result<Self> {
        Ok(Self {
            table: TreeTable::with_config(config)?,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    #[inline]
    pub fn allocator(&self) -> &AllocatorRef {
        self.table.allocator()
    }

    /// Add `element`; returns false if an equal element was already present
    pub fn add(&mut self, element: K) -> Result<bool> {
        Ok(self.table.add(element, ())?.is_none())
    }

    /// Remove and return the stored element equal to `element`
    pub fn remove(&mut self, element: &K) -> Result<K> {
        self.table
            .remove_entry(element)
            .map(|(key, _)| key)
            .map_err(not_found)
    }

    /// Drop every element
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Consume the set, handing every element to `f`
    pub fn destroy_with<F: FnMut(K)>(self, mut f: F) {
        self.table.destroy_with(|key, _| f(key));
    }

    /// Smallest element
    pub fn get_first(&self) -> Result<&K> {
        self.table.get_first_key().map_err(not_found)
    }

    /// Largest element
    pub fn get_last(&self) -> Result<&K> {
        self.table.get_last_key().map_err(not_found)
    }

    /// Smallest element strictly greater than `element`
    pub fn get_greater_than(&self, element: &K) -> Result<&K> {
        self.table.get_greater_than(element).map_err(not_found)
    }

    /// Largest element strictly less than `element`
    pub fn get_lesser_than(&self, element: &K) -> Result<&K> {
        self.table.get_lesser_than(element).map_err(not_found)
    }

    pub fn contains(&self, element: &K) -> bool {
        self.table.contains_key(element)
    }

    /// Call `f` on every element in ascending order
    pub fn foreach<F: FnMut(&K)>(&self, f: F) {
        self.table.foreach_key(f);
    }

    /// Ascending iterator
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Ascending cursor that can remove the element it last yielded
    pub fn cursor(&mut self) -> CursorMut<'_, K> {
        CursorMut {
            inner: self.table.cursor(),
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for TreeSet<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, K> IntoIterator for &'a TreeSet<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Iter<'a, K> {
        self.iter()
    }
}

/// Ascending iterator over a [`TreeSet`]
pub struct Iter<'a, K> {
    inner: tree_table::Iter<'a, K, ()>,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K> DoubleEndedIterator for Iter<'a, K> {
    fn next_back(&mut self) -> Option<&'a K> {
        self.inner.next_back().map(|(key, _)| key)
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

/// Cursor over a [`TreeSet`]
pub struct CursorMut<'a, K> {
    inner: tree_table::CursorMut<'a, K, ()>,
}

impl<'a, K> CursorMut<'a, K> {
    /// Advance and yield the next element
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&K> {
        self.inner.next().map(|(key, _)| key)
    }

    /// Remove the element last yielded
    pub fn remove(&mut self) -> Result<K> {
        self.inner.remove().map(|(key, _)| key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_remove_missing() {
        let mut set = TreeSet::new().unwrap();
        assert_eq!(set.add(4), Ok(true));
        assert_eq!(set.add(4), Ok(false));
        assert_eq!(set.len(), 1);
        assert_eq!(set.remove(&4), Ok(4));
        assert_eq!(set.remove(&4), Err(NutError::ValueNotFound));
        assert_eq!(set.get_first(), Err(NutError::ValueNotFound));
        assert_eq!(set.get_last(), Err(NutError::ValueNotFound));
    }

    #[test]
    fn test_neighbours() {
        let mut set = TreeSet::new().unwrap();
        for v in [10, 30, 20] {
            set.add(v).unwrap();
        }
        assert_eq!(set.get_first(), Ok(&10));
        assert_eq!(set.get_last(), Ok(&30));
        assert_eq!(set.get_greater_than(&10), Ok(&20));
        assert_eq!(set.get_lesser_than(&20), Ok(&10));
        assert_eq!(set.get_greater_than(&30), Err(NutError::ValueNotFound));
        assert_eq!(set.get_lesser_than(&10), Err(NutError::ValueNotFound));
        assert_eq!(set.iter().rev().copied().collect::<Vec<_>>(), vec![30, 20, 10]);
    }

    #[test]
    fn test_cursor_remove_evens() {
        let mut set = TreeSet::new().unwrap();
        for v in (0..40).rev() {
            set.add(v).unwrap();
        }
        let mut cursor = set.cursor();
        while let Some(&v) = cursor.next() {
            if v % 2 == 0 {
                assert_eq!(cursor.remove(), Ok(v));
            }
        }
        assert_eq!(
            set.iter().copied().collect::<Vec<_>>(),
            (1..40).step_by(2).collect::<Vec<_>>()
        );
        let mut count = 0;
        set.foreach(|_| count += 1);
        assert_eq!(count, 20);
    }
}
