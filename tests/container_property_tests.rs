//! Property-based testing for the core containers
//!
//! Random operation sequences are replayed against std reference collections;
//! structural invariants are checked after every sequence.

use proptest::prelude::*;
use std::collections::{BTreeMap, VecDeque};

use nut_collections::{Deque, DequeConfig, HashTable, List, RbCheck, SList, TreeTable};

// =============================================================================
// PROPERTY TEST GENERATORS
// =============================================================================

/// Deque operations
#[derive(Debug, Clone)]
enum DequeOp {
    AddFirst(i32),
    AddLast(i32),
    AddAt(usize, i32),
    RemoveFirst,
    RemoveLast,
    RemoveAt(usize),
}

fn deque_ops_strategy() -> impl Strategy<Value = Vec<DequeOp>> {
    prop::collection::vec(
        prop_oneof![
            any::<i32>().prop_map(DequeOp::AddFirst),
            any::<i32>().prop_map(DequeOp::AddLast),
            (any::<usize>(), any::<i32>()).prop_map(|(i, v)| DequeOp::AddAt(i, v)),
            Just(DequeOp::RemoveFirst),
            Just(DequeOp::RemoveLast),
            any::<usize>().prop_map(DequeOp::RemoveAt),
        ],
        0..400,
    )
}

/// Keyed-map operations
#[derive(Debug, Clone)]
enum MapOp {
    Add(u16, u32),
    Remove(u16),
}

fn map_ops_strategy() -> impl Strategy<Value = Vec<MapOp>> {
    prop::collection::vec(
        prop_oneof![
            3 => (0..256u16, any::<u32>()).prop_map(|(k, v)| MapOp::Add(k, v)),
            2 => (0..256u16).prop_map(MapOp::Remove),
        ],
        0..600,
    )
}

// =============================================================================
// DEQUE PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn prop_deque_matches_vecdeque(ops in deque_ops_strategy(), capacity in 0usize..6) {
        let mut deque = Deque::with_config(DequeConfig::DEFAULT.with_capacity(capacity)).unwrap();
        let mut reference = VecDeque::new();

        for op in ops {
            match op {
                DequeOp::AddFirst(v) => {
                    deque.add_first(v).unwrap();
                    reference.push_front(v);
                }
                DequeOp::AddLast(v) => {
                    deque.add_last(v).unwrap();
                    reference.push_back(v);
                }
                DequeOp::AddAt(i, v) => {
                    let index = i % (reference.len() + 1);
                    deque.add_at(index, v).unwrap();
                    reference.insert(index, v);
                }
                DequeOp::RemoveFirst => {
                    prop_assert_eq!(deque.remove_first().ok(), reference.pop_front());
                }
                DequeOp::RemoveLast => {
                    prop_assert_eq!(deque.remove_last().ok(), reference.pop_back());
                }
                DequeOp::RemoveAt(i) => {
                    if reference.is_empty() {
                        prop_assert!(deque.remove_at(i).is_err());
                    } else {
                        let index = i % reference.len();
                        prop_assert_eq!(deque.remove_at(index).ok(), reference.remove(index));
                    }
                }
            }

            prop_assert!(deque.capacity().is_power_of_two());
            prop_assert!(deque.len() <= deque.capacity());
        }

        prop_assert_eq!(deque.len(), reference.len());
        for (i, expected) in reference.iter().enumerate() {
            prop_assert_eq!(deque.get_at(i), Ok(expected));
        }
    }

    #[test]
    fn prop_deque_mid_insert_round_trip(
        prefix in prop::collection::vec(any::<i16>(), 0..64),
        rotation in 0usize..16,
        at in any::<usize>(),
        element in any::<i16>(),
    ) {
        let mut deque = Deque::with_config(DequeConfig::DEFAULT.with_capacity(4)).unwrap();
        for _ in 0..rotation {
            deque.add_last(0).unwrap();
            deque.remove_first().unwrap();
        }
        for v in &prefix {
            deque.add_last(*v).unwrap();
        }

        let index = at % (prefix.len() + 1);
        deque.add_at(index, element).unwrap();
        prop_assert_eq!(deque.get_at(index), Ok(&element));
        prop_assert_eq!(deque.remove_at(index), Ok(element));
        prop_assert_eq!(deque.iter().copied().collect::<Vec<_>>(), prefix);
    }
}

// =============================================================================
// TREE TABLE PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn prop_tree_table_invariants(ops in map_ops_strategy()) {
        let mut table = TreeTable::new().unwrap();
        let mut reference = BTreeMap::new();

        for op in ops {
            match op {
                MapOp::Add(k, v) => {
                    prop_assert_eq!(table.add(k, v).unwrap(), reference.insert(k, v));
                }
                MapOp::Remove(k) => {
                    prop_assert_eq!(table.remove(&k).ok(), reference.remove(&k));
                }
            }
        }

        prop_assert_eq!(table.assert_rb_rules(), RbCheck::Ok);
        let keys: Vec<u16> = table.iter().map(|(k, _)| *k).collect();
        prop_assert!(keys.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(keys, reference.keys().copied().collect::<Vec<_>>());
    }

    #[test]
    fn prop_tree_table_replace_keeps_size(
        keys in prop::collection::btree_set(any::<u32>(), 1..100),
        first in any::<u64>(),
        second in any::<u64>(),
    ) {
        let mut table = TreeTable::new().unwrap();
        for k in &keys {
            table.add(*k, first).unwrap();
        }
        let probe = *keys.iter().next().unwrap();
        prop_assert_eq!(table.add(probe, second), Ok(Some(first)));
        prop_assert_eq!(table.len(), keys.len());
        prop_assert_eq!(table.get(&probe), Ok(&second));
    }

    #[test]
    fn prop_tree_cursor_remove_every_second(keys in prop::collection::btree_set(any::<i32>(), 0..300)) {
        let mut table = TreeTable::new().unwrap();
        for k in &keys {
            table.add(*k, ()).unwrap();
        }

        let mut cursor = table.cursor();
        let mut n = 0;
        while cursor.next().is_some() {
            if n % 2 == 1 {
                cursor.remove().unwrap();
            }
            n += 1;
        }

        let expected: Vec<i32> = keys.iter().copied().step_by(2).collect();
        prop_assert_eq!(table.len(), keys.len() - keys.len() / 2);
        prop_assert_eq!(table.iter().map(|(k, _)| *k).collect::<Vec<_>>(), expected);
        prop_assert_eq!(table.assert_rb_rules(), RbCheck::Ok);
    }
}

// =============================================================================
// ITERATOR-REMOVE CONSISTENCY ACROSS CONTAINERS
// =============================================================================

proptest! {
    #[test]
    fn prop_list_cursor_remove_every_second(values in prop::collection::vec(any::<u8>(), 0..200)) {
        let mut list = List::new().unwrap();
        let mut slist = SList::new().unwrap();
        for v in &values {
            list.add(*v).unwrap();
            slist.add(*v).unwrap();
        }

        let mut cursor = list.cursor();
        let mut n = 0;
        while cursor.next().is_some() {
            if n % 2 == 1 {
                cursor.remove().unwrap();
            }
            n += 1;
        }
        let mut cursor = slist.cursor();
        let mut n = 0;
        while cursor.next().is_some() {
            if n % 2 == 1 {
                cursor.remove().unwrap();
            }
            n += 1;
        }

        let expected: Vec<u8> = values.iter().copied().step_by(2).collect();
        prop_assert_eq!(list.iter().copied().collect::<Vec<_>>(), expected.clone());
        prop_assert_eq!(slist.iter().copied().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn prop_list_sort_matches_stable_sort(values in prop::collection::vec((0u8..8, any::<u16>()), 0..200)) {
        let mut list = List::new().unwrap();
        let mut slist = SList::new().unwrap();
        for v in &values {
            list.add(*v).unwrap();
            slist.add(*v).unwrap();
        }
        list.sort(|a, b| a.0.cmp(&b.0));
        slist.sort(|a, b| a.0.cmp(&b.0));

        let mut expected = values.clone();
        expected.sort_by(|a, b| a.0.cmp(&b.0));
        prop_assert_eq!(list.iter().copied().collect::<Vec<_>>(), expected.clone());
        prop_assert_eq!(list.iter().rev().copied().collect::<Vec<_>>(),
                        expected.iter().rev().copied().collect::<Vec<_>>());
        prop_assert_eq!(slist.iter().copied().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn prop_hash_table_matches_btreemap(ops in map_ops_strategy()) {
        let mut table = HashTable::new().unwrap();
        let mut reference = BTreeMap::new();

        for op in ops {
            match op {
                MapOp::Add(k, v) => {
                    prop_assert_eq!(table.add(k, v).unwrap(), reference.insert(k, v));
                }
                MapOp::Remove(k) => {
                    prop_assert_eq!(table.remove(&k).ok(), reference.remove(&k));
                }
            }
        }

        prop_assert_eq!(table.len(), reference.len());
        let mut entries: Vec<(u16, u32)> = table.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_unstable();
        prop_assert_eq!(entries, reference.into_iter().collect::<Vec<_>>());
    }
}
