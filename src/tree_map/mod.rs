//! Ordered containers
//!
//! - `TreeTable<K, V>`: red-black tree map ordered by a comparator
//! - `TreeSet<K>`: a `TreeTable` with unit values
//!
//! Both iterate in ascending key order and support neighbour queries
//! (`get_greater_than`, `get_lesser_than`) for keys that need not be stored.

pub mod tree_set;
pub mod tree_table;

pub use tree_set::{TreeSet, TreeSetConfig};
pub use tree_table::{RbCheck, TreeTable, TreeTableConfig};
