//! TreeTable: red-black tree ordered map
//!
//! Nodes live in a [`NodeArena`] and link to their parent and children by
//! [`NodeId`]; absent children are the conceptual black leaves. Keys are
//! ordered by the [`CompareFn`] captured at construction.
//!
//! Removing a node with two children first swaps its key and value with its
//! in-order successor, then physically unlinks the successor's node. Node ids
//! of every other entry stay valid across insertions, removals and the
//! rotations of either fixup, which is what keeps [`CursorMut`] stable.
//!
//! # Examples
//!
//! ```rust
//! use nut_collections::tree_map::TreeTable;
//!
//! let mut table = TreeTable::new().unwrap();
//! table.add(5, "a").unwrap();
//! table.add(3, "b").unwrap();
//! table.add(8, "c").unwrap();
//! table.add(3, "d").unwrap();
//!
//! assert_eq!(table.len(), 3);
//! assert_eq!(table.get(&3), Ok(&"d"));
//! assert_eq!(table.iter().map(|(k, _)| *k).collect::<Vec<_>>(), vec![3, 5, 8]);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use std::mem;

use crate::common::{cmp_ord, CompareFn};
use crate::error::{NutError, Result};
use crate::memory::{AllocatorRef, NodeArena, NodeId};

/// Construction parameters for [`TreeTable`]
pub struct TreeTableConfig<K> {
    /// Node slots to allocate up front; 0 defers allocation to the first add
    pub capacity: usize,
    /// Key order
    pub cmp: CompareFn<K>,
    /// Allocator for the node arena
    pub allocator: AllocatorRef,
}

impl<K: Ord> TreeTableConfig<K> {
    /// Default configuration: `Ord` key order, lazy allocation, system allocator
    pub const DEFAULT: Self = Self {
        capacity: 0,
        cmp: cmp_ord::<K>,
        allocator: AllocatorRef::System,
    };
}

impl<K> TreeTableConfig<K> {
    /// Default configuration ordered by `cmp`
    pub fn with_comparator(cmp: CompareFn<K>) -> Self {
        Self {
            capacity: 0,
            cmp,
            allocator: AllocatorRef::System,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_allocator(mut self, allocator: AllocatorRef) -> Self {
        self.allocator = allocator;
        self
    }
}

impl<K: Ord> Default for TreeTableConfig<K> {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl<K> Clone for TreeTableConfig<K> {
    fn clone(&self) -> Self {
        Self {
            capacity: self.capacity,
            cmp: self.cmp,
            allocator: self.allocator.clone(),
        }
    }
}

impl<K> fmt::Debug for TreeTableConfig<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeTableConfig")
            .field("capacity", &self.capacity)
            .field("allocator", &self.allocator)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

struct Node<K, V> {
    key: K,
    value: V,
    color: Color,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

/// Outcome of [`TreeTable::assert_rb_rules`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RbCheck {
    /// Every red-black rule holds
    Ok,
    /// A red node has a red child
    ConsecutiveRed,
    /// Two paths to null leaves cross different numbers of black nodes
    BlackHeight,
    /// Broken parent links, out-of-order keys, a red root or a node count
    /// that disagrees with `len()`
    TreeStructure,
}

/// Red-black tree ordered map
pub struct TreeTable<K, V> {
    nodes: NodeArena<Node<K, V>>,
    root: Option<NodeId>,
    cmp: CompareFn<K>,
}

impl<K: Ord, V> TreeTable<K, V> {
    /// Create a table ordered by `K`'s `Ord`
    pub fn new() -> Result<Self> {
        Self::with_config(TreeTableConfig::DEFAULT)
    }
}

impl<K, V> TreeTable<K, V> {
    /// Create a table ordered by `cmp`
    pub fn with_comparator(cmp: CompareFn<K>) -> Result<Self> {
        Self::with_config(TreeTableConfig::with_comparator(cmp))
    }

    /// Create a table from `config`
    pub fn with_config(config: TreeTableConfig<K>) -> Result<Self> {
        let nodes = if config.capacity == 0 {
            NodeArena::new(config.allocator)
        } else {
            NodeArena::with_capacity(config.capacity, config.allocator)?
        };
        Ok(Self {
            nodes,
            root: None,
            cmp: config.cmp,
        })
    }

    /// Number of entries
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Comparator the keys are ordered by
    #[inline]
    pub fn comparator(&self) -> CompareFn<K> {
        self.cmp
    }

    #[inline]
    pub fn allocator(&self) -> &AllocatorRef {
        self.nodes.allocator()
    }

    #[inline]
    fn color(&self, node: Option<NodeId>) -> Color {
        node.map_or(Color::Black, |id| self.nodes[id].color)
    }

    #[inline]
    fn set_color(&mut self, node: Option<NodeId>, color: Color) {
        if let Some(id) = node {
            self.nodes[id].color = color;
        }
    }

    fn find(&self, key: &K) -> Option<NodeId> {
        let mut cursor = self.root;
        while let Some(id) = cursor {
            let node = &self.nodes[id];
            cursor = match (self.cmp)(key, &node.key) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(id),
            };
        }
        None
    }

    fn min_from(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.nodes[id].left {
            id = left;
        }
        id
    }

    fn max_from(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self.nodes[id].right {
            id = right;
        }
        id
    }

    fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(right) = self.nodes[id].right {
            return Some(self.min_from(right));
        }
        let mut child = id;
        let mut parent = self.nodes[id].parent;
        while let Some(p) = parent {
            if self.nodes[p].left == Some(child) {
                return Some(p);
            }
            child = p;
            parent = self.nodes[p].parent;
        }
        None
    }

    fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(left) = self.nodes[id].left {
            return Some(self.max_from(left));
        }
        let mut child = id;
        let mut parent = self.nodes[id].parent;
        while let Some(p) = parent {
            if self.nodes[p].right == Some(child) {
                return Some(p);
            }
            child = p;
            parent = self.nodes[p].parent;
        }
        None
    }

    /// Point `parent`'s link that held `old` at `new` (or the root link)
    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
        match parent {
            None => self.root = new,
            Some(p) => {
                if self.nodes[p].left == Some(old) {
                    self.nodes[p].left = new;
                } else {
                    self.nodes[p].right = new;
                }
            }
        }
    }

    fn rotate_left(&mut self, x: NodeId) {
        let Some(y) = self.nodes[x].right else {
            return;
        };

        let y_left = self.nodes[y].left;
        self.nodes[x].right = y_left;
        if let Some(yl) = y_left {
            self.nodes[yl].parent = Some(x);
        }

        let x_parent = self.nodes[x].parent;
        self.nodes[y].parent = x_parent;
        self.replace_child(x_parent, x, Some(y));

        self.nodes[y].left = Some(x);
        self.nodes[x].parent = Some(y);
    }

    fn rotate_right(&mut self, x: NodeId) {
        let Some(y) = self.nodes[x].left else {
            return;
        };

        let y_right = self.nodes[y].right;
        self.nodes[x].left = y_right;
        if let Some(yr) = y_right {
            self.nodes[yr].parent = Some(x);
        }

        let x_parent = self.nodes[x].parent;
        self.nodes[y].parent = x_parent;
        self.replace_child(x_parent, x, Some(y));

        self.nodes[y].right = Some(x);
        self.nodes[x].parent = Some(y);
    }

    /// Insert `key` → `value`
    ///
    /// An equal key keeps its node and has its value replaced; the old value
    /// is returned and the tree shape is untouched.
    pub fn add(&mut self, key: K, value: V) -> Result<Option<V>> {
        let mut parent = None;
        let mut went_left = false;
        let mut cursor = self.root;

        while let Some(id) = cursor {
            let node = &self.nodes[id];
            parent = Some(id);
            match (self.cmp)(&key, &node.key) {
                Ordering::Less => {
                    went_left = true;
                    cursor = node.left;
                }
                Ordering::Greater => {
                    went_left = false;
                    cursor = node.right;
                }
                Ordering::Equal => {
                    return Ok(Some(mem::replace(&mut self.nodes[id].value, value)));
                }
            }
        }

        let id = self.nodes.insert(Node {
            key,
            value,
            color: Color::Red,
            parent,
            left: None,
            right: None,
        })?;

        match parent {
            None => self.root = Some(id),
            Some(p) if went_left => self.nodes[p].left = Some(id),
            Some(p) => self.nodes[p].right = Some(id),
        }

        self.insert_fixup(id);
        Ok(None)
    }

    fn insert_fixup(&mut self, mut z: NodeId) {
        while let Some(mut p) = self.nodes[z].parent {
            if self.nodes[p].color == Color::Black {
                break;
            }
            // A red parent is never the root, so the grandparent exists
            let Some(g) = self.nodes[p].parent else {
                break;
            };

            if self.nodes[g].left == Some(p) {
                let uncle = self.nodes[g].right;
                if self.color(uncle) == Color::Red {
                    self.nodes[p].color = Color::Black;
                    self.set_color(uncle, Color::Black);
                    self.nodes[g].color = Color::Red;
                    z = g;
                    continue;
                }
                if self.nodes[p].right == Some(z) {
                    z = p;
                    self.rotate_left(z);
                    let Some(np) = self.nodes[z].parent else {
                        break;
                    };
                    p = np;
                }
                self.nodes[p].color = Color::Black;
                self.nodes[g].color = Color::Red;
                self.rotate_right(g);
            } else {
                let uncle = self.nodes[g].left;
                if self.color(uncle) == Color::Red {
                    self.nodes[p].color = Color::Black;
                    self.set_color(uncle, Color::Black);
                    self.nodes[g].color = Color::Red;
                    z = g;
                    continue;
                }
                if self.nodes[p].left == Some(z) {
                    z = p;
                    self.rotate_right(z);
                    let Some(np) = self.nodes[z].parent else {
                        break;
                    };
                    p = np;
                }
                self.nodes[p].color = Color::Black;
                self.nodes[g].color = Color::Red;
                self.rotate_left(g);
            }
        }

        let root = self.root;
        self.set_color(root, Color::Black);
    }

    /// Remove node `z`
    ///
    /// Returns the removed key and value, plus the node that now carries the
    /// in-order successor's entry when a payload swap took place.
    fn remove_node(&mut self, z: NodeId) -> Option<(K, V, Option<NodeId>)> {
        let (target, moved_into) = match (self.nodes[z].left, self.nodes[z].right) {
            (Some(_), Some(right)) => {
                let successor = self.min_from(right);
                let (a, b) = self.nodes.pair_mut(z, successor)?;
                mem::swap(&mut a.key, &mut b.key);
                mem::swap(&mut a.value, &mut b.value);
                (successor, Some(z))
            }
            _ => (z, None),
        };

        let node = self.unlink(target)?;
        Some((node.key, node.value, moved_into))
    }

    /// Physically remove `y`, which has at most one child
    fn unlink(&mut self, y: NodeId) -> Option<Node<K, V>> {
        let child = self.nodes[y].left.or(self.nodes[y].right);
        let parent = self.nodes[y].parent;

        if let Some(c) = child {
            self.nodes[c].parent = parent;
        }
        self.replace_child(parent, y, child);

        let node = self.nodes.remove(y)?;
        if node.color == Color::Black {
            self.delete_fixup(child, parent);
        }
        Some(node)
    }

    /// Absorb the extra black left at `x` (possibly a null leaf under `parent`)
    fn delete_fixup(&mut self, mut x: Option<NodeId>, mut parent: Option<NodeId>) {
        while x != self.root && self.color(x) == Color::Black {
            let Some(p) = parent else {
                break;
            };

            if self.nodes[p].left == x {
                // The sibling of a double-black node always exists
                let Some(mut w) = self.nodes[p].right else {
                    break;
                };
                if self.nodes[w].color == Color::Red {
                    self.nodes[w].color = Color::Black;
                    self.nodes[p].color = Color::Red;
                    self.rotate_left(p);
                    let Some(nw) = self.nodes[p].right else {
                        break;
                    };
                    w = nw;
                }

                let (wl, wr) = (self.nodes[w].left, self.nodes[w].right);
                if self.color(wl) == Color::Black && self.color(wr) == Color::Black {
                    self.nodes[w].color = Color::Red;
                    x = Some(p);
                    parent = self.nodes[p].parent;
                } else {
                    if self.color(wr) == Color::Black {
                        self.set_color(wl, Color::Black);
                        self.nodes[w].color = Color::Red;
                        self.rotate_right(w);
                        let Some(nw) = self.nodes[p].right else {
                            break;
                        };
                        w = nw;
                    }
                    self.nodes[w].color = self.nodes[p].color;
                    self.nodes[p].color = Color::Black;
                    let wr = self.nodes[w].right;
                    self.set_color(wr, Color::Black);
                    self.rotate_left(p);
                    x = self.root;
                    parent = None;
                }
            } else {
                let Some(mut w) = self.nodes[p].left else {
                    break;
                };
                if self.nodes[w].color == Color::Red {
                    self.nodes[w].color = Color::Black;
                    self.nodes[p].color = Color::Red;
                    self.rotate_right(p);
                    let Some(nw) = self.nodes[p].left else {
                        break;
                    };
                    w = nw;
                }

                let (wl, wr) = (self.nodes[w].left, self.nodes[w].right);
                if self.color(wl) == Color::Black && self.color(wr) == Color::Black {
                    self.nodes[w].color = Color::Red;
                    x = Some(p);
                    parent = self.nodes[p].parent;
                } else {
                    if self.color(wl) == Color::Black {
                        self.set_color(wr, Color::Black);
                        self.nodes[w].color = Color::Red;
                        self.rotate_left(w);
                        let Some(nw) = self.nodes[p].left else {
                            break;
                        };
                        w = nw;
                    }
                    self.nodes[w].color = self.nodes[p].color;
                    self.nodes[p].color = Color::Black;
                    let wl = self.nodes[w].left;
                    self.set_color(wl, Color::Black);
                    self.rotate_right(p);
                    x = self.root;
                    parent = None;
                }
            }
        }

        self.set_color(x, Color::Black);
    }

    /// Remove the entry under `key`, returning its value
    pub fn remove(&mut self, key: &K) -> Result<V> {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Remove the entry under `key`, returning the stored key and value
    pub fn remove_entry(&mut self, key: &K) -> Result<(K, V)> {
        let id = self.find(key).ok_or(NutError::KeyNotFound)?;
        let (k, v, _) = self.remove_node(id).ok_or(NutError::KeyNotFound)?;
        Ok((k, v))
    }

    /// Remove the entry with the smallest key
    pub fn remove_first(&mut self) -> Result<(K, V)> {
        let root = self.root.ok_or(NutError::KeyNotFound)?;
        let first = self.min_from(root);
        let (k, v, _) = self.remove_node(first).ok_or(NutError::KeyNotFound)?;
        Ok((k, v))
    }

    /// Remove the entry with the largest key
    pub fn remove_last(&mut self) -> Result<(K, V)> {
        let root = self.root.ok_or(NutError::KeyNotFound)?;
        let last = self.max_from(root);
        let (k, v, _) = self.remove_node(last).ok_or(NutError::KeyNotFound)?;
        Ok((k, v))
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Hand every entry to `f`, leaving the table empty
    pub fn clear_with<F: FnMut(K, V)>(&mut self, mut f: F) {
        self.nodes.drain_with(|node| f(node.key, node.value));
        self.root = None;
    }

    /// Consume the table, handing every entry to `f`
    pub fn destroy_with<F: FnMut(K, V)>(mut self, f: F) {
        self.clear_with(f);
    }

    /// Value stored under `key`
    pub fn get(&self, key: &K) -> Result<&V> {
        let id = self.find(key).ok_or(NutError::KeyNotFound)?;
        Ok(&self.nodes[id].value)
    }

    /// Mutable value stored under `key`
    pub fn get_mut(&mut self, key: &K) -> Result<&mut V> {
        let id = self.find(key).ok_or(NutError::KeyNotFound)?;
        Ok(&mut self.nodes[id].value)
    }

    fn first_node(&self) -> Result<&Node<K, V>> {
        let root = self.root.ok_or(NutError::KeyNotFound)?;
        Ok(&self.nodes[self.min_from(root)])
    }

    fn last_node(&self) -> Result<&Node<K, V>> {
        let root = self.root.ok_or(NutError::KeyNotFound)?;
        Ok(&self.nodes[self.max_from(root)])
    }

    /// Smallest key
    pub fn get_first_key(&self) -> Result<&K> {
        self.first_node().map(|node| &node.key)
    }

    /// Value of the smallest key
    pub fn get_first_value(&self) -> Result<&V> {
        self.first_node().map(|node| &node.value)
    }

    /// Largest key
    pub fn get_last_key(&self) -> Result<&K> {
        self.last_node().map(|node| &node.key)
    }

    /// Value of the largest key
    pub fn get_last_value(&self) -> Result<&V> {
        self.last_node().map(|node| &node.value)
    }

    /// Smallest stored key strictly greater than `key`
    ///
    /// `key` need not be present.
    pub fn get_greater_than(&self, key: &K) -> Result<&K> {
        let mut best = None;
        let mut cursor = self.root;
        while let Some(id) = cursor {
            let node = &self.nodes[id];
            if (self.cmp)(key, &node.key) == Ordering::Less {
                best = Some(id);
                cursor = node.left;
            } else {
                cursor = node.right;
            }
        }
        best.map(|id| &self.nodes[id].key)
            .ok_or(NutError::KeyNotFound)
    }

    /// Largest stored key strictly less than `key`
    ///
    /// `key` need not be present.
    pub fn get_lesser_than(&self, key: &K) -> Result<&K> {
        let mut best = None;
        let mut cursor = self.root;
        while let Some(id) = cursor {
            let node = &self.nodes[id];
            if (self.cmp)(key, &node.key) == Ordering::Greater {
                best = Some(id);
                cursor = node.right;
            } else {
                cursor = node.left;
            }
        }
        best.map(|id| &self.nodes[id].key)
            .ok_or(NutError::KeyNotFound)
    }

    /// Whether an entry with `key` exists
    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Number of entries whose value equals `value`
    ///
    /// Unlike the keyed lookups this scans the whole tree.
    pub fn contains_value(&self, value: &V) -> usize
    where
        V: PartialEq,
    {
        self.iter().filter(|(_, v)| *v == value).count()
    }

    /// Call `f` on every key in ascending order
    pub fn foreach_key<F: FnMut(&K)>(&self, mut f: F) {
        self.iter().for_each(|(key, _)| f(key));
    }

    /// Call `f` on every value in ascending key order
    pub fn foreach_value<F: FnMut(&V)>(&self, mut f: F) {
        self.iter().for_each(|(_, value)| f(value));
    }

    /// In-order iterator over `(key, value)` pairs
    pub fn iter(&self) -> Iter<'_, K, V> {
        let front = self.root.map(|root| self.min_from(root));
        let back = self.root.map(|root| self.max_from(root));
        Iter {
            table: self,
            front,
            back,
            remaining: self.len(),
        }
    }

    /// In-order cursor that can remove the entry it last yielded
    pub fn cursor(&mut self) -> CursorMut<'_, K, V> {
        let next = self.root.map(|root| self.min_from(root));
        CursorMut {
            table: self,
            current: None,
            next,
        }
    }

    /// Check every red-black rule by walking the whole tree
    pub fn assert_rb_rules(&self) -> RbCheck {
        if self.color(self.root) == Color::Red {
            return RbCheck::TreeStructure;
        }
        if let Some(root) = self.root {
            if self.nodes[root].parent.is_some() {
                return RbCheck::TreeStructure;
            }
        }

        let mut visited = 0;
        match self.check_subtree(self.root, None, None, None, &mut visited) {
            Err(failure) => failure,
            Ok(_) if visited != self.len() => RbCheck::TreeStructure,
            Ok(_) => RbCheck::Ok,
        }
    }

    /// Black height of the subtree at `node`, or the first rule it breaks
    fn check_subtree(
        &self,
        node: Option<NodeId>,
        parent: Option<NodeId>,
        lower: Option<NodeId>,
        upper: Option<NodeId>,
        visited: &mut usize,
    ) -> std::result::Result<usize, RbCheck> {
        let Some(id) = node else {
            return Ok(1);
        };
        *visited += 1;
        let n = self.nodes.get(id).ok_or(RbCheck::TreeStructure)?;

        if n.parent != parent {
            return Err(RbCheck::TreeStructure);
        }
        if let Some(lo) = lower {
            if (self.cmp)(&n.key, &self.nodes[lo].key) != Ordering::Greater {
                return Err(RbCheck::TreeStructure);
            }
        }
        if let Some(hi) = upper {
            if (self.cmp)(&n.key, &self.nodes[hi].key) != Ordering::Less {
                return Err(RbCheck::TreeStructure);
            }
        }
        if n.color == Color::Red
            && (self.color(n.left) == Color::Red || self.color(n.right) == Color::Red)
        {
            return Err(RbCheck::ConsecutiveRed);
        }

        let left = self.check_subtree(n.left, Some(id), lower, Some(id), visited)?;
        let right = self.check_subtree(n.right, Some(id), Some(id), upper, visited)?;
        if left != right {
            return Err(RbCheck::BlackHeight);
        }
        Ok(left + usize::from(n.color == Color::Black))
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for TreeTable<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V> IntoIterator for &'a TreeTable<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

/// In-order iterator over a [`TreeTable`]
pub struct Iter<'a, K, V> {
    table: &'a TreeTable<K, V>,
    front: Option<NodeId>,
    back: Option<NodeId>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        if self.remaining == 0 {
            return None;
        }
        let table = self.table;
        let id = self.front?;
        self.front = table.successor(id);
        self.remaining -= 1;
        let node = &table.nodes[id];
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<(&'a K, &'a V)> {
        if self.remaining == 0 {
            return None;
        }
        let table = self.table;
        let id = self.back?;
        self.back = table.predecessor(id);
        self.remaining -= 1;
        let node = &table.nodes[id];
        Some((&node.key, &node.value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// In-order cursor over a [`TreeTable`]
///
/// Caches the successor of the entry last yielded. Removing that entry may
/// move the successor's key and value into the removed entry's node, in
/// which case the cache is redirected to that node.
pub struct CursorMut<'a, K, V> {
    table: &'a mut TreeTable<K, V>,
    current: Option<NodeId>,
    next: Option<NodeId>,
}

impl<'a, K, V> CursorMut<'a, K, V> {
    /// Advance and yield the next entry
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<(&K, &mut V)> {
        let id = self.next?;
        self.current = Some(id);
        self.next = self.table.successor(id);
        let node = &mut self.table.nodes[id];
        Some((&node.key, &mut node.value))
    }

    /// Remove the entry last yielded, returning its key and value
    pub fn remove(&mut self) -> Result<(K, V)> {
        let id = self.current.take().ok_or(NutError::ValueNotFound)?;
        let (key, value, moved_into) = self
            .table
            .remove_node(id)
            .ok_or(NutError::ValueNotFound)?;
        if moved_into.is_some() {
            self.next = moved_into;
        }
        Ok((key, value))
    }
}
