//! HashSet: a [`HashTable`] whose values are all `()`

use std::fmt;
use std::hash::Hash;

use super::hash_table::{self, HashTable, HashTableConfig};
use crate::error::Result;
use crate::memory::AllocatorRef;

/// Construction parameters for [`HashSet`]; the backing table's config
pub type HashSetConfig<K> = HashTableConfig<K>;

/// Unordered set of unique keys
pub struct HashSet<K> {
    table: HashTable<K, ()>,
}

impl<K: Hash + Eq> HashSet<K> {
    /// Create a set with [`HashTableConfig::DEFAULT`]
    pub fn new() -> Result<Self> {
        Self::with_config(HashSetConfig::DEFAULT)
    }
}

impl<K> HashSet<K> {
    /// Create a set from `config`
    pub fn with_config(config: HashSetConfig<K>) -> Result<Self> {
        Ok(Self {
            table: HashTable::with_config(config)?,
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

    /// Number of buckets in the backing table
    #[inline]
    pub fn capacity(&self) -> usize {
        self.table.capacity()
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
    ///
    /// Fails with `KeyNotFound` when absent.
    pub fn remove(&mut self, element: &K) -> Result<K> {
        self.table.remove_entry(element).map(|(key, _)| key)
    }

    pub fn contains(&self, element: &K) -> bool {
        self.table.contains_key(element)
    }

    /// Drop every element
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Consume the set, handing every element to `f`
    pub fn destroy_with<F: FnMut(K)>(self, mut f: F) {
        self.table.destroy_with(|key, _| f(key));
    }

    /// Call `f` on every element
    pub fn foreach<F: FnMut(&K)>(&self, f: F) {
        self.table.foreach_key(f);
    }

    /// Iterator over the elements in bucket order
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Cursor that can remove the element it last yielded
    pub fn cursor(&mut self) -> CursorMut<'_, K> {
        CursorMut {
            inner: self.table.cursor(),
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for HashSet<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, K> IntoIterator for &'a HashSet<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Iter<'a, K> {
        self.iter()
    }
}

/// Iterator over a [`HashSet`]
pub struct Iter<'a, K> {
    inner: hash_table::Iter<'a, K, ()>,
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

impl<K> ExactSizeIterator for Iter<'_, K> {}

/// Cursor over a [`HashSet`]
pub struct CursorMut<'a, K> {
    inner: hash_table::CursorMut<'a, K, ()>,
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
