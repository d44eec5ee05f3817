//! Hashed containers
//!
//! - `HashTable<K, V>`: separate chaining over power-of-two buckets, callbacks
//!   for hashing and key equality captured at construction
//! - `HashSet<K>`: a `HashTable` with unit values
//!
//! The hash callbacks in [`hash_functions`] cover the usual key shapes: any
//! `Hash` key (seeded ahash), NUL-terminated strings, fixed-width byte keys
//! and reference identity.

pub mod hash_functions;
pub mod hash_set;
pub mod hash_table;

pub use hash_functions::{
    bytes_hash, general_hash, murmur_hash64a, pointer_equals, pointer_hash, string_equals,
    string_hash, EqualsFn, HashFn, KeyLength,
};
pub use hash_set::{HashSet, HashSetConfig};
pub use hash_table::{HashTable, HashTableConfig};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_exports() {
        let _table = HashTable::<u32, String>::new().unwrap();
        let _set = HashSet::<String>::new().unwrap();

        let h = general_hash(&1u8, KeyLength::Variable, 0);
        assert_eq!(h, general_hash(&1u8, KeyLength::Variable, 0));
    }
}
