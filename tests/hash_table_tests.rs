//! Integration tests for the separate-chaining hash table and hash set

use std::collections::{HashMap, HashSet as StdHashSet};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use nut_collections::hash_map::{
    bytes_hash, pointer_equals, pointer_hash, string_equals, string_hash,
};
use nut_collections::memory::{AllocatorRef, BoundedAllocator};
use nut_collections::{
    CollectionSettings, HashSet, HashSetConfig, HashTable, HashTableConfig, KeyLength, NutError,
};

// =============================================================================
// REFERENCE-MODEL TESTS
// =============================================================================

#[test]
fn test_random_operations_match_std_hashmap() {
    let mut rng = StdRng::seed_from_u64(1234);
    let config = HashTableConfig::<u64>::DEFAULT.with_capacity(2);
    let mut table = HashTable::with_config(config).unwrap();
    let mut reference = HashMap::new();

    for step in 0..10_000u64 {
        let key = rng.gen_range(0..2_000u64);
        match rng.gen_range(0..3) {
            0 | 1 => assert_eq!(table.add(key, step).unwrap(), reference.insert(key, step)),
            _ => assert_eq!(table.remove(&key).ok(), reference.remove(&key)),
        }
    }

    assert_eq!(table.len(), reference.len());
    for (key, value) in &reference {
        assert_eq!(table.get(key), Ok(value));
    }
    assert_eq!(table.iter().count(), reference.len());
    assert!(table.capacity().is_power_of_two());
    assert!(table.len() as f32 <= table.capacity() as f32 * table.load_factor());
}

// =============================================================================
// REHASHING
// =============================================================================

#[test]
fn test_rehash_threshold() {
    let config = HashTableConfig::<u32>::DEFAULT
        .with_capacity(4)
        .with_load_factor(0.75);
    let mut table = HashTable::with_config(config).unwrap();
    for k in 0..3 {
        table.add(k, ()).unwrap();
    }
    assert_eq!(table.capacity(), 4);
    table.add(3, ()).unwrap();
    assert_eq!(table.capacity(), 8);

    // Replacing never rehashes
    for _ in 0..10 {
        table.add(3, ()).unwrap();
    }
    assert_eq!(table.capacity(), 8);
}

#[test]
fn test_failed_rehash_keeps_table_usable() {
    let allocator = Arc::new(BoundedAllocator::unbounded());
    let config = HashTableConfig::<u32>::DEFAULT
        .with_capacity(4)
        .with_allocator(AllocatorRef::from_arc(allocator.clone()));
    let mut table = HashTable::with_config(config).unwrap();
    for k in 0..3 {
        table.add(k, k * 100).unwrap();
    }

    allocator.freeze();
    assert!(matches!(table.add(3, 300), Err(NutError::OutOfMemory { .. })));
    assert_eq!(table.len(), 3);
    assert_eq!(table.capacity(), 4);
    assert!(!table.contains_key(&3));

    assert_eq!(table.add(1, 111), Ok(Some(100)));
    assert_eq!(table.get(&1), Ok(&111));
    assert_eq!(table.remove(&0), Ok(0));

    allocator.set_limit(usize::MAX);
    table.add(3, 300).unwrap();
    table.add(4, 400).unwrap();
    assert_eq!(table.capacity(), 8);
    assert_eq!(table.len(), 4);

    drop(table);
    assert_eq!(allocator.stats().in_use, 0);
}

#[test]
fn test_invalid_load_factor() {
    for load_factor in [0.0, -1.0, f32::NAN, f32::INFINITY] {
        let config = HashTableConfig::<u32>::DEFAULT.with_load_factor(load_factor);
        assert!(matches!(
            HashTable::<u32, u32>::with_config(config),
            Err(NutError::Configuration { .. })
        ));
    }
}

// =============================================================================
// CALLBACKS
// =============================================================================

#[test]
fn test_c_string_keys() {
    let config = HashTableConfig::with_callbacks(string_hash::<String>, string_equals::<String>);
    let mut table = HashTable::with_config(config).unwrap();
    table.add("alpha\0one".to_string(), 1).unwrap();
    assert_eq!(table.add("alpha\0two".to_string(), 2), Ok(Some(1)));
    assert_eq!(table.len(), 1);
    assert_eq!(table.get(&"alpha".to_string()), Ok(&2));
}

#[test]
fn test_fixed_width_keys() {
    fn prefix_equals(a: &Vec<u8>, b: &Vec<u8>) -> bool {
        a[..2] == b[..2]
    }
    let config = HashTableConfig::with_callbacks(bytes_hash::<Vec<u8>>, prefix_equals)
        .with_key_length(KeyLength::Fixed(2));
    let mut table = HashTable::with_config(config).unwrap();
    table.add(vec![1, 2, 3], "first").unwrap();
    assert_eq!(table.add(vec![1, 2, 9], "second"), Ok(Some("first")));
    table.add(vec![2, 2, 3], "third").unwrap();
    assert_eq!(table.len(), 2);
}

#[test]
fn test_identity_keys() {
    let a = String::from("same");
    let b = String::from("same");
    let config = HashTableConfig::with_callbacks(pointer_hash::<String>, pointer_equals::<String>)
        .with_key_length(KeyLength::POINTER);
    let mut table = HashTable::with_config(config).unwrap();
    table.add(&a, 1).unwrap();
    table.add(&b, 2).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.get(&&a), Ok(&1));
    assert_eq!(table.get(&&b), Ok(&2));
}

#[test]
fn test_seed_and_settings() {
    let settings = CollectionSettings {
        hash_capacity: 5,
        load_factor: 0.5,
        hash_seed: 99,
        ..CollectionSettings::default()
    };
    let table: HashTable<String, u8> =
        HashTable::with_config(HashTableConfig::from_settings(&settings)).unwrap();
    assert_eq!(table.capacity(), 8);
    assert_eq!(table.load_factor(), 0.5);
}

// =============================================================================
// BULK ACCESS AND CURSORS
// =============================================================================

#[test]
fn test_keys_values_and_foreach() {
    let mut table = HashTable::new().unwrap();
    for k in 0..10u32 {
        table.add(k, k * k).unwrap();
    }
    let keys = table.get_keys().unwrap();
    let values = table.get_values().unwrap();
    assert_eq!(keys.len(), 10);
    assert_eq!(values.len(), 10);
    for (k, v) in keys.iter().zip(values.iter()) {
        assert_eq!(k * k, *v);
    }

    let mut total = 0;
    table.foreach_value(|v| total += v);
    assert_eq!(total, 285);

    let mut dropped = Vec::new();
    table.clear_with(|k, _| dropped.push(k));
    dropped.sort_unstable();
    assert_eq!(dropped, (0..10).collect::<Vec<_>>());
    assert!(table.is_empty());
}

#[test]
fn test_cursor_removes_while_walking() {
    let mut table = HashTable::new().unwrap();
    for k in 0..300u32 {
        table.add(k, k).unwrap();
    }
    let mut visited = 0;
    let mut cursor = table.cursor();
    while let Some((key, value)) = cursor.next() {
        visited += 1;
        if key % 3 == 0 {
            let key = *key;
            assert_eq!(cursor.remove(), Ok((key, key)));
        } else {
            *value += 1;
        }
    }
    assert_eq!(visited, 300);
    assert_eq!(table.len(), 200);
    assert!(table.iter().all(|(k, v)| k % 3 != 0 && *v == k + 1));
}

// =============================================================================
// HASH SET
// =============================================================================

#[test]
fn test_hash_set_matches_std() {
    let mut rng = StdRng::seed_from_u64(99);
    let config = HashSetConfig::<u16>::DEFAULT.with_capacity(1);
    let mut set = HashSet::with_config(config).unwrap();
    let mut reference = StdHashSet::new();

    for _ in 0..4_000 {
        let v = rng.gen_range(0..500u16);
        if rng.gen_bool(0.7) {
            assert_eq!(set.add(v).unwrap(), reference.insert(v));
        } else {
            assert_eq!(set.remove(&v).is_ok(), reference.remove(&v));
        }
    }
    assert_eq!(set.len(), reference.len());
    assert!(set.iter().all(|v| reference.contains(v)));
    assert_eq!(set.remove(&1_000), Err(NutError::KeyNotFound));
}
