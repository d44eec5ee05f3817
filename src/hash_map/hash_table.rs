//! HashTable: separate-chaining hash map with pluggable callbacks
//!
//! Buckets hold the head of a singly linked chain of entries; entries live in a
//! [`NodeArena`] and remember their full hash, so a rehash only relinks them.
//! The bucket count is always a power of two and indexed by masking.
//!
//! # Examples
//!
//! ```rust
//! use nut_collections::hash_map::HashTable;
//!
//! let mut table = HashTable::<String, i32>::new().unwrap();
//! table.add("hello".to_string(), 42).unwrap();
//! assert_eq!(table.get(&"hello".to_string()), Ok(&42));
//! ```

use std::fmt;
use std::hash::Hash;
use std::mem;

use super::hash_functions::{general_hash, EqualsFn, HashFn, KeyLength};
use crate::common::{upper_pow_two, MAX_POW_TWO};
use crate::config::CollectionSettings;
use crate::containers::{Array, ArrayConfig};
use crate::error::{NutError, Result};
use crate::memory::{AllocatorRef, NodeArena, NodeId, SlotBuf};

/// Construction parameters for [`HashTable`]
pub struct HashTableConfig<K> {
    /// Initial bucket count; rounded up to a power of two
    pub capacity: usize,
    /// Fill ratio at which the bucket array doubles
    pub load_factor: f32,
    /// Key width handed to the hash callback
    pub key_length: KeyLength,
    /// Seed handed to the hash callback
    pub hash_seed: u32,
    pub hash: HashFn<K>,
    pub equals: EqualsFn<K>,
    /// Allocator for buckets and entries
    pub allocator: AllocatorRef,
}

impl<K: Hash + Eq> HashTableConfig<K> {
    /// Default configuration: 16 buckets, load factor 0.75, seeded ahash
    pub const DEFAULT: Self = Self {
        capacity: 16,
        load_factor: 0.75,
        key_length: KeyLength::Variable,
        hash_seed: 0,
        hash: general_hash::<K>,
        equals: <K as PartialEq>::eq,
        allocator: AllocatorRef::System,
    };

    /// Defaults with capacity, load factor and seed taken from `settings`
    pub fn from_settings(settings: &CollectionSettings) -> Self {
        Self {
            capacity: settings.hash_capacity,
            load_factor: settings.load_factor,
            hash_seed: settings.hash_seed,
            ..Self::DEFAULT
        }
    }
}

impl<K> HashTableConfig<K> {
    /// Default sizing with caller-supplied callbacks, for keys that are not
    /// `Hash + Eq` or need a different notion of equality
    pub fn with_callbacks(hash: HashFn<K>, equals: EqualsFn<K>) -> Self {
        Self {
            capacity: 16,
            load_factor: 0.75,
            key_length: KeyLength::Variable,
            hash_seed: 0,
            hash,
            equals,
            allocator: AllocatorRef::System,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_load_factor(mut self, load_factor: f32) -> Self {
        self.load_factor = load_factor;
        self
    }

    pub fn with_key_length(mut self, key_length: KeyLength) -> Self {
        self.key_length = key_length;
        self
    }

    pub fn with_hash_seed(mut self, hash_seed: u32) -> Self {
        self.hash_seed = hash_seed;
        self
    }

    pub fn with_allocator(mut self, allocator: AllocatorRef) -> Self {
        self.allocator = allocator;
        self
    }
}

impl<K: Hash + Eq> Default for HashTableConfig<K> {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl<K> Clone for HashTableConfig<K> {
    fn clone(&self) -> Self {
        Self {
            capacity: self.capacity,
            load_factor: self.load_factor,
            key_length: self.key_length,
            hash_seed: self.hash_seed,
            hash: self.hash,
            equals: self.equals,
            allocator: self.allocator.clone(),
        }
    }
}

impl<K> fmt::Debug for HashTableConfig<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashTableConfig")
            .field("capacity", &self.capacity)
            .field("load_factor", &self.load_factor)
            .field("key_length", &self.key_length)
            .field("hash_seed", &self.hash_seed)
            .field("allocator", &self.allocator)
            .finish()
    }
}

struct Entry<K, V> {
    key: K,
    value: V,
    hash: u64,
    next: Option<NodeId>,
}

/// Separate-chaining hash table
pub struct HashTable<K, V> {
    buckets: SlotBuf<NodeId>,
    entries: NodeArena<Entry<K, V>>,
    threshold: usize,
    load_factor: f32,
    key_length: KeyLength,
    hash_seed: u32,
    hash: HashFn<K>,
    equals: EqualsFn<K>,
}

fn threshold_for(capacity: usize, load_factor: f32) -> usize {
    ((capacity as f64 * load_factor as f64) as usize).max(1)
}

impl<K: Hash + Eq, V> HashTable<K, V> {
    /// Create a table with [`HashTableConfig::DEFAULT`]
    pub fn new() -> Result<Self> {
        Self::with_config(HashTableConfig::DEFAULT)
    }
}

impl<K, V> HashTable<K, V> {
    /// Create a table from `config`
    ///
    /// Fails with `Configuration` when the load factor is not a positive
    /// finite number.
    pub fn with_config(config: HashTableConfig<K>) -> Result<Self> {
        if !(config.load_factor.is_finite() && config.load_factor > 0.0) {
            return Err(NutError::configuration(format!(
                "load factor must be positive, got {}",
                config.load_factor
            )));
        }

        let capacity = upper_pow_two(config.capacity);
        Ok(Self {
            buckets: SlotBuf::new(capacity, config.allocator.clone())?,
            entries: NodeArena::new(config.allocator),
            threshold: threshold_for(capacity, config.load_factor),
            load_factor: config.load_factor,
            key_length: config.key_length,
            hash_seed: config.hash_seed,
            hash: config.hash,
            equals: config.equals,
        })
    }

    /// Number of entries
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of buckets
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buckets.capacity()
    }

    #[inline]
    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    #[inline]
    pub fn allocator(&self) -> &AllocatorRef {
        self.buckets.allocator()
    }

    #[inline]
    fn hash_of(&self, key: &K) -> u64 {
        (self.hash)(key, self.key_length, self.hash_seed)
    }

    #[inline]
    fn bucket_of(&self, hash: u64) -> usize {
        (hash as usize) & (self.buckets.capacity() - 1)
    }

    /// Entry holding `key` and its chain predecessor
    fn find(&self, key: &K, hash: u64) -> Option<(Option<NodeId>, NodeId)> {
        let mut prev = None;
        let mut cursor = self.buckets[self.bucket_of(hash)];
        while let Some(id) = cursor {
            let entry = &self.entries[id];
            if entry.hash == hash && (self.equals)(&entry.key, key) {
                return Some((prev, id));
            }
            prev = Some(id);
            cursor = entry.next;
        }
        None
    }

    /// Insert `key` → `value`
    ///
    /// An equal key keeps its entry and has its value replaced; the old value
    /// is returned. If the table must grow and cannot, nothing is inserted.
    pub fn add(&mut self, key: K, value: V) -> Result<Option<V>> {
        let hash = self.hash_of(&key);
        if let Some((_, id)) = self.find(&key, hash) {
            return Ok(Some(mem::replace(&mut self.entries[id].value, value)));
        }

        if self.len() >= self.threshold {
            self.resize(self.capacity().saturating_mul(2))?;
        }

        let bucket = self.bucket_of(hash);
        let id = self.entries.insert(Entry {
            key,
            value,
            hash,
            next: self.buckets[bucket],
        })?;
        self.buckets[bucket] = Some(id);
        Ok(None)
    }

    /// Rehash into `new_capacity` buckets
    ///
    /// The new bucket array is allocated before any entry is touched.
    fn resize(&mut self, new_capacity: usize) -> Result<()> {
        let capacity = self.capacity();
        if capacity >= MAX_POW_TWO {
            log::warn!("hash table at maximum bucket count {}", capacity);
            return Err(NutError::max_capacity(capacity));
        }

        let mut buckets = self.buckets.sibling(new_capacity).map_err(|e| {
            log::warn!("hash table rehash to {} buckets failed: {}", new_capacity, e);
            e
        })?;

        let mask = new_capacity - 1;
        for b in 0..capacity {
            let mut cursor = self.buckets[b].take();
            while let Some(id) = cursor {
                let entry = &mut self.entries[id];
                cursor = entry.next;
                let target = (entry.hash as usize) & mask;
                entry.next = buckets[target];
                buckets[target] = Some(id);
            }
        }

        self.buckets = buckets;
        self.threshold = threshold_for(new_capacity, self.load_factor);
        log::debug!("hash table rehashed from {} to {} buckets", capacity, new_capacity);
        Ok(())
    }

    /// Value stored under `key`
    pub fn get(&self, key: &K) -> Result<&V> {
        let (_, id) = self
            .find(key, self.hash_of(key))
            .ok_or(NutError::KeyNotFound)?;
        Ok(&self.entries[id].value)
    }

    /// Mutable value stored under `key`
    pub fn get_mut(&mut self, key: &K) -> Result<&mut V> {
        let (_, id) = self
            .find(key, self.hash_of(key))
            .ok_or(NutError::KeyNotFound)?;
        Ok(&mut self.entries[id].value)
    }

    /// Whether an entry with `key` exists
    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key, self.hash_of(key)).is_some()
    }

    /// Remove the entry under `key`, returning its value
    pub fn remove(&mut self, key: &K) -> Result<V> {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Remove the entry under `key`, returning the stored key and value
    pub fn remove_entry(&mut self, key: &K) -> Result<(K, V)> {
        let hash = self.hash_of(key);
        let (prev, id) = self.find(key, hash).ok_or(NutError::KeyNotFound)?;
        let bucket = self.bucket_of(hash);
        self.unlink(bucket, prev, id).ok_or(NutError::KeyNotFound)
    }

    fn unlink(&mut self, bucket: usize, prev: Option<NodeId>, id: NodeId) -> Option<(K, V)> {
        let entry = self.entries.remove(id)?;
        match prev {
            Some(p) => self.entries[p].next = entry.next,
            None => self.buckets[bucket] = entry.next,
        }
        Some((entry.key, entry.value))
    }

    /// Drop every entry; the bucket count is kept
    pub fn clear(&mut self) {
        self.entries.clear();
        for bucket in self.buckets.iter_mut() {
            *bucket = None;
        }
    }

    /// Hand every entry to `f`, leaving the table empty
    pub fn clear_with<F: FnMut(K, V)>(&mut self, mut f: F) {
        self.entries.drain_with(|entry| f(entry.key, entry.value));
        for bucket in self.buckets.iter_mut() {
            *bucket = None;
        }
    }

    /// Consume the table, handing every entry to `f`
    pub fn destroy_with<F: FnMut(K, V)>(mut self, f: F) {
        self.clear_with(f);
    }

    /// Clone every key into an [`Array`] drawn from the table's allocator
    pub fn get_keys(&self) -> Result<Array<K>>
    where
        K: Clone,
    {
        self.collect_into(|key, _| key.clone())
    }

    /// Clone every value into an [`Array`] drawn from the table's allocator
    pub fn get_values(&self) -> Result<Array<V>>
    where
        V: Clone,
    {
        self.collect_into(|_, value| value.clone())
    }

    fn collect_into<T, F: FnMut(&K, &V) -> T>(&self, mut f: F) -> Result<Array<T>> {
        let config = ArrayConfig::DEFAULT
            .with_capacity(self.len().max(1))
            .with_allocator(self.allocator().clone());
        let mut array = Array::with_config(config)?;
        for (key, value) in self.iter() {
            array.add(f(key, value))?;
        }
        Ok(array)
    }

    /// Call `f` on every key
    pub fn foreach_key<F: FnMut(&K)>(&self, mut f: F) {
        self.iter().for_each(|(key, _)| f(key));
    }

    /// Call `f` on every value
    pub fn foreach_value<F: FnMut(&V)>(&self, mut f: F) {
        self.iter().for_each(|(_, value)| f(value));
    }

    /// Iterator over `(key, value)` pairs in bucket order
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            table: self,
            bucket: 0,
            next: None,
            remaining: self.len(),
        }
    }

    /// First entry in a bucket at or after `from`
    fn first_from(&self, from: usize) -> Option<(usize, NodeId)> {
        (from..self.capacity()).find_map(|b| self.buckets[b].map(|id| (b, id)))
    }

    /// Mutating cursor over the entries in bucket order
    pub fn cursor(&mut self) -> CursorMut<'_, K, V> {
        let (bucket, next) = match self.first_from(0) {
            Some((b, id)) => (b, Some(id)),
            None => (0, None),
        };
        CursorMut {
            table: self,
            bucket,
            next,
            next_prev: None,
            current: None,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for HashTable<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V> IntoIterator for &'a HashTable<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

/// Iterator over the entries of a [`HashTable`]
pub struct Iter<'a, K, V> {
    table: &'a HashTable<K, V>,
    bucket: usize,
    next: Option<NodeId>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        if self.remaining == 0 {
            return None;
        }
        let table = self.table;

        let id = match self.next {
            Some(id) => id,
            None => {
                let (b, id) = table.first_from(self.bucket)?;
                self.bucket = b;
                id
            }
        };

        let entry = &table.entries[id];
        self.next = entry.next;
        if self.next.is_none() {
            self.bucket += 1;
        }
        self.remaining -= 1;
        Some((&entry.key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Cursor over a [`HashTable`] that can remove the entry it last yielded
pub struct CursorMut<'a, K, V> {
    table: &'a mut HashTable<K, V>,
    /// Bucket of `next`
    bucket: usize,
    next: Option<NodeId>,
    /// Chain predecessor of `next`
    next_prev: Option<NodeId>,
    /// Bucket, id and chain predecessor of the entry last yielded
    current: Option<(usize, NodeId, Option<NodeId>)>,
}

impl<'a, K, V> CursorMut<'a, K, V> {
    /// Advance and yield the next entry
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<(&K, &mut V)> {
        let id = self.next?;
        self.current = Some((self.bucket, id, self.next_prev));

        match self.table.entries[id].next {
            Some(following) => {
                self.next = Some(following);
                self.next_prev = Some(id);
            }
            None => {
                let found = self.table.first_from(self.bucket + 1);
                self.next = found.map(|(_, n)| n);
                self.bucket = found.map_or(self.table.capacity(), |(b, _)| b);
                self.next_prev = None;
            }
        }

        let entry = &mut self.table.entries[id];
        Some((&entry.key, &mut entry.value))
    }

    /// Remove the entry last yielded, returning its key and value
    pub fn remove(&mut self) -> Result<(K, V)> {
        let (bucket, id, prev) = self.current.take().ok_or(NutError::ValueNotFound)?;
        let removed = self
            .table
            .unlink(bucket, prev, id)
            .ok_or(NutError::ValueNotFound)?;
        if self.next_prev == Some(id) {
            self.next_prev = prev;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash_map::hash_functions::{string_equals, string_hash};
    use crate::memory::BoundedAllocator;
    use std::sync::Arc;

    fn collide(_: &u32, _: KeyLength, _: u32) -> u64 {
        7
    }

    fn sorted_keys<V>(table: &HashTable<u32, V>) -> Vec<u32> {
        let mut keys: Vec<u32> = table.iter().map(|(k, _)| *k).collect();
        keys.sort_unstable();
        keys
    }

    #[test]
    fn test_add_get_replace() {
        let mut table = HashTable::new().unwrap();
        assert_eq!(table.add(1u32, "one"), Ok(None));
        assert_eq!(table.add(2u32, "two"), Ok(None));
        assert_eq!(table.add(1u32, "uno"), Ok(Some("one")));
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&1), Ok(&"uno"));
        assert_eq!(table.get(&3), Err(NutError::KeyNotFound));
        assert!(table.contains_key(&2));
        *table.get_mut(&2).unwrap() = "dos";
        assert_eq!(table.get(&2), Ok(&"dos"));
    }

    #[test]
    fn test_remove() {
        let mut table = HashTable::new().unwrap();
        for i in 0..10u32 {
            table.add(i, i * 10).unwrap();
        }
        assert_eq!(table.remove(&4), Ok(40));
        assert_eq!(table.remove(&4), Err(NutError::KeyNotFound));
        assert_eq!(table.remove_entry(&5), Ok((5, 50)));
        assert_eq!(table.len(), 8);
        assert_eq!(sorted_keys(&table), vec![0, 1, 2, 3, 6, 7, 8, 9]);
    }

    #[test]
    fn test_rehash_doubles_power_of_two() {
        let config = HashTableConfig::<u32>::DEFAULT.with_capacity(3).with_load_factor(0.75);
        let mut table = HashTable::with_config(config).unwrap();
        assert_eq!(table.capacity(), 4);

        for i in 0..100u32 {
            table.add(i, i).unwrap();
            assert!(table.capacity().is_power_of_two());
            assert!(table.len() as f64 <= table.capacity() as f64 * 0.75 + 1.0);
        }
        assert!(table.capacity() >= 128);
        for i in 0..100u32 {
            assert_eq!(table.get(&i), Ok(&i));
        }
    }

    #[test]
    fn test_colliding_chain() {
        let config = HashTableConfig::with_callbacks(collide, |a: &u32, b: &u32| a == b);
        let mut table = HashTable::with_config(config).unwrap();
        for i in 0..20u32 {
            table.add(i, i + 100).unwrap();
        }
        assert_eq!(table.remove(&0), Ok(100));
        assert_eq!(table.remove(&19), Ok(119));
        assert_eq!(table.remove(&10), Ok(110));
        assert_eq!(table.len(), 17);
        for i in (1..19u32).filter(|&i| i != 10) {
            assert_eq!(table.get(&i), Ok(&(i + 100)));
        }
    }

    #[test]
    fn test_string_keys_with_c_string_callbacks() {
        let config = HashTableConfig::with_callbacks(string_hash::<String>, string_equals::<String>);
        let mut table = HashTable::with_config(config).unwrap();
        table.add("alpha".to_string(), 1).unwrap();
        assert_eq!(table.get(&"alpha\0tail".to_string()), Ok(&1));
        assert_eq!(table.add("alpha\0x".to_string(), 2).unwrap(), Some(1));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_failed_rehash_leaves_table_usable() {
        let bounded = Arc::new(BoundedAllocator::unbounded());
        let config = HashTableConfig::<u32>::DEFAULT
            .with_capacity(4)
            .with_allocator(AllocatorRef::from_arc(bounded.clone()));
        let mut table = HashTable::with_config(config).unwrap();
        for i in 0..3u32 {
            table.add(i, i).unwrap();
        }
        bounded.freeze();

        assert!(matches!(table.add(3, 3), Err(NutError::OutOfMemory { .. })));
        assert_eq!(table.len(), 3);
        assert_eq!(table.capacity(), 4);
        assert_eq!(table.get(&2), Ok(&2));
        // Replacing needs no growth
        assert_eq!(table.add(1, 11), Ok(Some(1)));

        bounded.set_limit(usize::MAX);
        table.add(3, 3).unwrap();
        assert_eq!(table.capacity(), 8);
        assert_eq!(sorted_keys(&table), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_invalid_load_factor() {
        let config = HashTableConfig::<u32>::DEFAULT.with_load_factor(0.0);
        assert!(matches!(
            HashTable::<u32, u32>::with_config(config),
            Err(NutError::Configuration { .. })
        ));
    }

    #[test]
    fn test_keys_values_and_foreach() {
        let mut table = HashTable::new().unwrap();
        for i in 1..=4u32 {
            table.add(i, i * 2).unwrap();
        }
        let mut keys: Vec<u32> = table.get_keys().unwrap().iter().copied().collect();
        keys.sort_unstable();
        assert_eq!(keys, vec![1, 2, 3, 4]);

        let values = table.get_values().unwrap();
        assert_eq!(values.iter().sum::<u32>(), 20);

        let mut key_sum = 0;
        table.foreach_key(|k| key_sum += *k);
        assert_eq!(key_sum, 10);
        let mut count = 0;
        table.foreach_value(|_| count += 1);
        assert_eq!(count, 4);
        assert_eq!(table.iter().len(), 4);
    }

    #[test]
    fn test_cursor_remove_every_second() {
        let config = HashTableConfig::with_callbacks(collide, |a: &u32, b: &u32| a == b);
        let mut chained = HashTable::with_config(config).unwrap();
        let mut spread = HashTable::new().unwrap();
        for i in 0..16u32 {
            chained.add(i, ()).unwrap();
            spread.add(i, ()).unwrap();
        }

        for table in [&mut chained, &mut spread] {
            let mut visited = Vec::new();
            let mut removed = Vec::new();
            let mut cursor = table.cursor();
            let mut n = 0;
            while let Some((key, _)) = cursor.next() {
                visited.push(*key);
                if n % 2 == 1 {
                    removed.push(cursor.remove().unwrap().0);
                }
                n += 1;
            }
            assert_eq!(visited.len(), 16);
            assert_eq!(table.len(), 8);
            for key in removed {
                assert!(!table.contains_key(&key));
            }
        }
    }

    #[test]
    fn test_clear_with() {
        let mut table = HashTable::new().unwrap();
        for i in 0..5u32 {
            table.add(i, i).unwrap();
        }
        let mut total = 0;
        table.clear_with(|k, v| total += k + v);
        assert_eq!(total, 20);
        assert!(table.is_empty());
        assert_eq!(table.get(&1), Err(NutError::KeyNotFound));
        table.add(1, 1).unwrap();
        assert_eq!(table.get(&1), Ok(&1));
    }
}
