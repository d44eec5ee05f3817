//! # nut-collections: Allocator-Pluggable Collections
//!
//! General-purpose containers for memory-constrained targets. Every container
//! draws its storage from an allocator captured at construction, reports each
//! failure as one [`NutError`] variant and never aborts on exhaustion.
//!
//! ## Containers
//!
//! - **Sequences**: [`Array`] (growable), [`Deque`] (circular buffer),
//!   [`List`] (doubly linked), [`SList`] (singly linked)
//! - **Adapters**: [`Stack`] over `Array`, [`Queue`] over `Deque`, [`PQueue`]
//!   binary heap ordered by a comparator
//! - **Hashed**: [`HashTable`] with pluggable hash and equality callbacks,
//!   [`HashSet`]
//! - **Ordered**: [`TreeTable`] red-black tree map, [`TreeSet`]
//!
//! ## Memory
//!
//! [`AllocatorRef`] selects between the global allocator and any
//! [`MemoryAllocator`]. [`BoundedAllocator`] caps the bytes a container may
//! hold, which makes out-of-memory paths testable; [`PoolAllocator`] recycles
//! fixed-size chunks.
//!
//! ## Quick Start
//!
//! ```rust
//! use nut_collections::{Deque, HashTable, TreeTable, NutError};
//!
//! let mut deque = Deque::new().unwrap();
//! deque.add_last(1).unwrap();
//! deque.add_first(0).unwrap();
//! assert_eq!(deque.get_at(0), Ok(&0));
//!
//! let mut table = HashTable::new().unwrap();
//! table.add("one", 1).unwrap();
//! assert_eq!(table.get(&"one"), Ok(&1));
//! assert_eq!(table.get(&"two"), Err(NutError::KeyNotFound));
//!
//! let mut tree = TreeTable::new().unwrap();
//! for k in [5, 1, 3] {
//!     tree.add(k, ()).unwrap();
//! }
//! assert_eq!(tree.get_greater_than(&3), Ok(&5));
//! ```

#![deny(unsafe_op_in_unsafe_fn)]

pub mod common;
pub mod config;
pub mod containers;
pub mod error;
pub mod hash_map;
pub mod memory;
pub mod tree_map;

pub use common::CompareFn;
pub use config::{CollectionSettings, Config};
pub use containers::{
    Array, ArrayConfig, Deque, DequeConfig, List, ListConfig, PQueue, PQueueConfig, Queue,
    QueueConfig, SList, Stack, StackConfig,
};
pub use error::{NutError, Result};
pub use hash_map::{HashSet, HashSetConfig, HashTable, HashTableConfig, KeyLength};
pub use memory::{
    AllocatorRef, BoundedAllocator, MemoryAllocator, NodeArena, NodeId, PoolAllocator,
    PoolConfig, SystemAllocator,
};
pub use tree_map::{RbCheck, TreeSet, TreeSetConfig, TreeTable, TreeTableConfig};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the library version; no other setup is required
pub fn init() {
    log::debug!("Initializing nut-collections v{}", VERSION);
}
