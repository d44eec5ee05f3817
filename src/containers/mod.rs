//! Sequence containers
//!
//! ## Contiguous
//!
//! - **`Array<T>`** - Growable buffer with configurable growth factor
//! - **`Deque<T>`** - Power-of-two ring buffer with shortest-side mid insertion
//! - **`Stack<T>`** - LIFO adapter over `Array`
//! - **`Queue<T>`** - FIFO adapter over `Deque`
//! - **`PQueue<T>`** - Binary max-heap by caller comparator
//!
//! ## Linked
//!
//! - **`List<T>`** - Doubly linked list with splicing and both-way cursors
//! - **`SList<T>`** - Singly linked list
//!
//! Every container draws its storage from the [`AllocatorRef`] in its config
//! and never from anywhere else, so a failed allocation surfaces as
//! `NutError::OutOfMemory` and leaves the container as it was.
//!
//! Cursors (`cursor()`, `zip_cursor()`) walk a container while editing it
//! around the element last yielded. Editing the container through any other
//! path while a cursor is alive is ruled out by the borrow checker.
//!
//! [`AllocatorRef`]: crate::memory::AllocatorRef

pub mod array;
pub mod deque;
pub mod list;
pub mod pqueue;
pub mod queue;
pub mod slist;
pub mod stack;

pub use array::{Array, ArrayConfig};
pub use deque::{Deque, DequeConfig};
pub use list::{List, ListConfig};
pub use pqueue::{PQueue, PQueueConfig};
pub use queue::{Queue, QueueConfig};
pub use slist::SList;
pub use stack::{Stack, StackConfig};
