//! Hash callbacks for [`HashTable`](super::HashTable)
//!
//! Every callback has the [`HashFn`] shape `(key, key_length, seed) -> u64`.
//! The key length tells byte-oriented hashes how much of the key to read:
//! [`KeyLength::Variable`] means "up to the first NUL", [`KeyLength::Fixed`]
//! means "exactly this many leading bytes".
//!
//! # Usage
//!
//! ```rust
//! use nut_collections::hash_map::{string_hash, KeyLength};
//!
//! let a = string_hash("key\0ignored", KeyLength::Variable, 7);
//! let b = string_hash("key", KeyLength::Variable, 7);
//! assert_eq!(a, b);
//! ```

use std::hash::{BuildHasher, Hash};
use std::mem;

use crate::common::c_str_bytes;

/// How many bytes of a key a byte-oriented hash reads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum KeyLength {
    /// NUL-terminated key; bytes up to (not including) the first NUL
    #[default]
    Variable,
    /// Fixed-width binary key of this many bytes
    Fixed(usize),
}

impl KeyLength {
    /// Width of a pointer-sized key
    pub const POINTER: Self = Self::Fixed(mem::size_of::<usize>());

    /// Slice of `bytes` this length selects
    pub fn select(self, bytes: &[u8]) -> &[u8] {
        match self {
            Self::Variable => c_str_bytes(bytes),
            Self::Fixed(n) => &bytes[..n.min(bytes.len())],
        }
    }
}

/// Key hash callback: `(key, key_length, seed) -> hash`
pub type HashFn<K> = fn(&K, KeyLength, u32) -> u64;

/// Key equality callback
pub type EqualsFn<K> = fn(&K, &K) -> bool;

// Fixed ahash keys; the caller's seed is mixed into the first one
const AHASH_K1: u64 = 0x243f_6a88_85a3_08d3;
const AHASH_K2: u64 = 0x1319_8a2e_0370_7344;
const AHASH_K3: u64 = 0xa409_3822_299f_31d0;

/// General-purpose hash for any `Hash` key, seeded ahash
///
/// The key length is ignored; the key's own `Hash` impl decides what is read.
pub fn general_hash<K: Hash + ?Sized>(key: &K, _length: KeyLength, seed: u32) -> u64 {
    let state = ahash::RandomState::with_seeds(seed as u64, AHASH_K1, AHASH_K2, AHASH_K3);
    BuildHasher::hash_one(&state, key)
}

/// MurmurHash64A over `data`
pub fn murmur_hash64a(data: &[u8], seed: u64) -> u64 {
    const M: u64 = 0xc6a4_a793_5bd1_e995;
    const R: u32 = 47;

    let mut h = seed ^ (data.len() as u64).wrapping_mul(M);

    let mut chunks = data.chunks_exact(8);
    for chunk in &mut chunks {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        let mut k = u64::from_le_bytes(word);

        k = k.wrapping_mul(M);
        k ^= k >> R;
        k = k.wrapping_mul(M);

        h ^= k;
        h = h.wrapping_mul(M);
    }

    let tail = chunks.remainder();
    if !tail.is_empty() {
        for (i, &byte) in tail.iter().enumerate() {
            h ^= (byte as u64) << (8 * i);
        }
        h = h.wrapping_mul(M);
    }

    h ^= h >> R;
    h = h.wrapping_mul(M);
    h ^= h >> R;
    h
}

/// Byte-key hash honouring `length`
pub fn bytes_hash<K: AsRef<[u8]> + ?Sized>(key: &K, length: KeyLength, seed: u32) -> u64 {
    murmur_hash64a(length.select(key.as_ref()), seed as u64)
}

/// C-string hash: bytes up to the first NUL, whatever `length` says
pub fn string_hash<K: AsRef<[u8]> + ?Sized>(key: &K, _length: KeyLength, seed: u32) -> u64 {
    murmur_hash64a(c_str_bytes(key.as_ref()), seed as u64)
}

/// Identity hash of a reference: hashes the address it points at
pub fn pointer_hash<T: ?Sized>(key: &&T, _length: KeyLength, seed: u32) -> u64 {
    let addr = *key as *const T as *const () as usize;
    murmur_hash64a(&addr.to_le_bytes(), seed as u64)
}

/// Identity equality of references, the partner of [`pointer_hash`]
pub fn pointer_equals<T: ?Sized>(a: &&T, b: &&T) -> bool {
    std::ptr::eq(*a as *const T as *const (), *b as *const T as *const ())
}

/// C-string equality: bytes up to the first NUL
pub fn string_equals<K: AsRef<[u8]> + ?Sized>(a: &K, b: &K) -> bool {
    c_str_bytes(a.as_ref()) == c_str_bytes(b.as_ref())
}
