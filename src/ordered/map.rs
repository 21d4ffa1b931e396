//! The ordered map.
//!
//! [`AvlMap`] keeps its entries in a height-balanced binary search tree whose
//! nodes carry parent links. Lookups descend from the sentinel's left slot;
//! insertions and erasures change one node and then walk back up the parent
//! links, restoring heights and balance with the rotations in
//! `rotation.rs`.
//!
//! # Overview
//!
//! - O(log N) `insert`, `find`, `at`, `erase`, `remove`
//! - O(1) amortized cursor advance and retreat, O(log N) worst case
//! - O(1) `len` and `is_empty`
//!
//! # Invariants
//!
//! After every public operation returns:
//! 1. An in-order walk yields keys in strictly ascending comparator order.
//! 2. At every node the subtree heights differ by at most one.
//! 3. Every node's height is one more than its taller child's.
//! 4. `len()` equals the number of entries reachable from the sentinel.

use std::fmt;
use std::iter::FromIterator;
use std::ops::Index;

use super::comparator::{Comparator, NaturalOrder};
use super::cursor::{Cursor, MapId};
use super::error::{IteratorFault, MapError};
use super::iter::{IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
use super::node::{Link, NodeId, NodeStore, Side};
use crate::trace::trace_event;

/// An ordered map backed by a parent-linked AVL tree.
///
/// Keys are ordered by a [`Comparator`] (by default [`NaturalOrder`], i.e.
/// [`Ord`]). Keys the comparator considers equivalent are the same key: the
/// map holds at most one of them.
///
/// Positions are addressed with [`Cursor`]s, which can be dereferenced,
/// moved in both directions and erased through the map, and which report
/// misuse as [`MapError::InvalidIterator`] instead of panicking.
///
/// # Time Complexity
///
/// | Operation                | Complexity |
/// |--------------------------|------------|
/// | `new`                    | O(1)       |
/// | `insert`                 | O(log N)   |
/// | `find` / `at` / `get`    | O(log N)   |
/// | `erase` / `remove`       | O(log N)   |
/// | `begin`                  | O(log N)   |
/// | `end`                    | O(1)       |
/// | `next_cursor`            | O(log N)   |
/// | `len` / `is_empty`       | O(1)       |
/// | `clone`                  | O(N)       |
///
/// # Examples
///
/// ```rust
/// use avlmap::ordered::AvlMap;
///
/// let mut map = AvlMap::new();
/// for key in [5, 3, 8, 1, 4, 7, 9, 2, 6] {
///     map.insert(key, key * 10);
/// }
///
/// let keys: Vec<&i32> = map.keys().collect();
/// assert_eq!(keys, vec![&1, &2, &3, &4, &5, &6, &7, &8, &9]);
///
/// map.erase(map.find(&5)).unwrap();
/// assert_eq!(map.len(), 8);
/// assert!(map.is_balanced());
/// ```
pub struct AvlMap<K, V, C = NaturalOrder> {
    store: NodeStore<K, V>,
    comparator: C,
    id: MapId,
}

static_assertions::assert_impl_all!(AvlMap<i32, String>: Send, Sync, Clone, Default);

impl<K, V> AvlMap<K, V> {
    /// Creates an empty map ordered by [`Ord`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlmap::ordered::AvlMap;
    ///
    /// let map: AvlMap<i32, String> = AvlMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }

    /// Creates an empty map with room for `capacity` entries before its node
    /// arena reallocates.
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_comparator(capacity, NaturalOrder)
    }
}

impl<K, V, C> AvlMap<K, V, C> {
    /// Creates an empty map ordered by `comparator`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlmap::ordered::{AvlMap, ReverseOrder};
    ///
    /// let mut map = AvlMap::with_comparator(ReverseOrder);
    /// map.insert(1, "one");
    /// map.insert(3, "three");
    /// map.insert(2, "two");
    ///
    /// let keys: Vec<&i32> = map.keys().collect();
    /// assert_eq!(keys, vec![&3, &2, &1]);
    /// ```
    #[must_use]
    pub fn with_comparator(comparator: C) -> Self {
        Self {
            store: NodeStore::new(),
            comparator,
            id: MapId::fresh(),
        }
    }

    /// Creates an empty map ordered by `comparator` with room for `capacity`
    /// entries.
    #[must_use]
    pub fn with_capacity_and_comparator(capacity: usize, comparator: C) -> Self {
        Self {
            store: NodeStore::with_capacity(capacity),
            comparator,
            id: MapId::fresh(),
        }
    }

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if the map holds no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.store.len() == 0
    }

    /// Returns the map's comparator.
    #[inline]
    pub const fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Height of the tree: 0 when empty, 1 for a single entry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlmap::ordered::AvlMap;
    ///
    /// let map: AvlMap<i32, ()> = (1..=1000).map(|key| (key, ())).collect();
    /// // An AVL tree of N entries is at most about 1.44 log2(N) high.
    /// assert!(map.height() <= 14);
    /// ```
    #[must_use]
    pub fn height(&self) -> usize {
        self.store.height(self.store.root())
    }

    /// Checks every node for balance, correct height bookkeeping and
    /// consistent parent links, and that [`len`](Self::len) matches the node
    /// count.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.store.is_consistent()
    }

    /// Removes every entry. The node arena keeps its capacity.
    ///
    /// Cursors to entries become stale; the end cursor stays valid.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlmap::ordered::AvlMap;
    ///
    /// let mut map: AvlMap<i32, i32> = (0..10).map(|key| (key, key)).collect();
    /// let first = map.begin();
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert!(map.entry_at(first).is_err());
    /// assert_eq!(map.begin(), map.end());
    /// ```
    pub fn clear(&mut self) {
        self.store.clear();
    }

    // -------------------------------------------------------------------------
    // Cursors
    // -------------------------------------------------------------------------

    /// Cursor to the first entry, or [`end`](Self::end) when empty.
    #[must_use]
    pub fn begin(&self) -> Cursor {
        Cursor::from_link(self.id, &self.store, self.store.first())
    }

    /// The end cursor: one past the last entry.
    ///
    /// It never holds an entry. Retreating from it yields the last entry.
    #[inline]
    #[must_use]
    pub const fn end(&self) -> Cursor {
        Cursor::end(self.id)
    }

    /// Dereferences a cursor.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidIterator`] if `cursor` is the end position, comes
    /// from another map, or denotes an erased entry.
    pub fn entry_at(&self, cursor: Cursor) -> Result<(&K, &V), MapError> {
        let id = cursor.resolve_entry(self.id, &self.store)?;
        let node = self.store.node(id);
        Ok((&node.key, &node.value))
    }

    /// The key a cursor denotes.
    ///
    /// # Errors
    ///
    /// As for [`entry_at`](Self::entry_at).
    pub fn key_at(&self, cursor: Cursor) -> Result<&K, MapError> {
        self.entry_at(cursor).map(|(key, _)| key)
    }

    /// Mutable access to the value a cursor denotes.
    ///
    /// # Errors
    ///
    /// As for [`entry_at`](Self::entry_at).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlmap::ordered::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// let (cursor, _) = map.insert("answer", 41);
    /// *map.value_at_mut(cursor).unwrap() += 1;
    /// assert_eq!(map.at(&"answer"), Ok(&42));
    /// ```
    pub fn value_at_mut(&mut self, cursor: Cursor) -> Result<&mut V, MapError> {
        let id = cursor.resolve_entry(self.id, &self.store)?;
        Ok(&mut self.store.node_mut(id).value)
    }

    /// The cursor after `cursor`. Advancing from the last entry yields the
    /// end cursor.
    ///
    /// # Errors
    ///
    /// [`IteratorFault::PastEnd`] when `cursor` already is the end position,
    /// and the faults of [`entry_at`](Self::entry_at) other than `End`.
    pub fn next_cursor(&self, cursor: Cursor) -> Result<Cursor, MapError> {
        match cursor.resolve(self.id, &self.store)? {
            Link::Sentinel => Err(IteratorFault::PastEnd.into()),
            Link::Node(id) => Ok(Cursor::from_link(
                self.id,
                &self.store,
                self.store.successor(id),
            )),
        }
    }

    /// The cursor before `cursor`. Retreating from the end cursor yields the
    /// last entry.
    ///
    /// # Errors
    ///
    /// [`IteratorFault::BeforeBegin`] when `cursor` is the first entry, or the
    /// end cursor of an empty map, and the faults of
    /// [`entry_at`](Self::entry_at) other than `End`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlmap::ordered::{AvlMap, IteratorFault, MapError};
    ///
    /// let map: AvlMap<i32, ()> = (1..=3).map(|key| (key, ())).collect();
    /// let last = map.prev_cursor(map.end()).unwrap();
    /// assert_eq!(last, map.find(&3));
    ///
    /// assert_eq!(
    ///     map.prev_cursor(map.begin()),
    ///     Err(MapError::InvalidIterator(IteratorFault::BeforeBegin))
    /// );
    /// ```
    pub fn prev_cursor(&self, cursor: Cursor) -> Result<Cursor, MapError> {
        let link = cursor.resolve(self.id, &self.store)?;
        self.store
            .predecessor(link)
            .map(|id| Cursor::at(self.id, &self.store, id))
            .ok_or(MapError::InvalidIterator(IteratorFault::BeforeBegin))
    }

    /// Removes the entry a cursor denotes and returns it.
    ///
    /// Cursors to other entries stay valid, including the cursor to the
    /// erased entry's in-order successor: when the erased node has two
    /// children, the successor's node is moved into its place rather than
    /// copied.
    ///
    /// # Errors
    ///
    /// As for [`entry_at`](Self::entry_at). The map is unchanged on error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlmap::ordered::AvlMap;
    ///
    /// let mut map: AvlMap<i32, &str> =
    ///     [(1, "one"), (2, "two"), (3, "three")].into_iter().collect();
    /// let two = map.find(&2);
    /// let three = map.find(&3);
    ///
    /// assert_eq!(map.erase(two), Ok((2, "two")));
    /// assert!(map.erase(two).is_err());
    /// assert_eq!(map.entry_at(three), Ok((&3, &"three")));
    /// ```
    pub fn erase(&mut self, cursor: Cursor) -> Result<(K, V), MapError> {
        let id = cursor.resolve_entry(self.id, &self.store)?;
        Ok(self.remove_node(id))
    }

    /// The first entry in key order.
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        match self.store.first() {
            Link::Sentinel => None,
            Link::Node(id) => Some(self.entry(id)),
        }
    }

    /// The last entry in key order, found by retreating from the end.
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.store
            .predecessor(Link::Sentinel)
            .map(|id| self.entry(id))
    }

    // -------------------------------------------------------------------------
    // Iteration
    // -------------------------------------------------------------------------

    /// Iterates over entries in key order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlmap::ordered::AvlMap;
    ///
    /// let map: AvlMap<i32, char> = [(2, 'b'), (1, 'a'), (3, 'c')].into_iter().collect();
    /// let forward: Vec<(&i32, &char)> = map.iter().collect();
    /// assert_eq!(forward, vec![(&1, &'a'), (&2, &'b'), (&3, &'c')]);
    ///
    /// let backward: Vec<&i32> = map.iter().rev().map(|(key, _)| key).collect();
    /// assert_eq!(backward, vec![&3, &2, &1]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.store)
    }

    /// Iterates over entries in key order with mutable values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(self.store.entries_in_order_mut())
    }

    /// Iterates over keys in order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.iter())
    }

    /// Iterates over values in key order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.iter())
    }

    /// Iterates over mutable values in key order.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut::new(self.iter_mut())
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn entry(&self, id: NodeId) -> (&K, &V) {
        let node = self.store.node(id);
        (&node.key, &node.value)
    }

    /// Unlinks `id`, frees it and rebalances on the way to the root.
    fn remove_node(&mut self, id: NodeId) -> (K, V) {
        let node = self.store.node(id);
        let (left, right, parent, height) = (node.left, node.right, node.parent, node.height);

        let ascent_start = match (left, right) {
            (Some(left), Some(right)) => {
                let successor = self.store.leftmost(right);
                trace_event!(erased = ?id, successor = ?successor, "relink successor");
                let start = if successor == right {
                    Link::Node(successor)
                } else {
                    // The successor has no left child; its right subtree
                    // takes its old slot.
                    let successor_parent = self.store.node(successor).parent;
                    let successor_right = self.store.node(successor).right;
                    self.store.replace_child(successor, successor_right);
                    self.store.attach(Link::Node(successor), Side::Right, Some(right));
                    successor_parent
                };
                self.store.replace_child(id, Some(successor));
                self.store.attach(Link::Node(successor), Side::Left, Some(left));
                // Inherit the erased node's height so the ascent can tell
                // whether this position's subtree changed height.
                self.store.node_mut(successor).height = height;
                start
            }
            (child, None) | (None, child) => {
                self.store.replace_child(id, child);
                parent
            }
        };

        let entry = self.store.release(id);
        self.rebalance_after_remove(ascent_start);
        entry
    }

    /// Deletion ascent: rebalance every ancestor until one's subtree height
    /// comes out unchanged.
    fn rebalance_after_remove(&mut self, start: Link) {
        let mut link = start;
        while let Link::Node(id) = link {
            let before = self.store.node(id).height;
            let parent = self.store.node(id).parent;
            let top = self.store.rebalance(id);
            if self.store.node(top).height == before {
                break;
            }
            link = parent;
        }
    }

    /// Insertion ascent: stop at the first rotation, or as soon as a height
    /// is unchanged.
    fn rebalance_after_insert(&mut self, start: Link) {
        let mut link = start;
        while let Link::Node(id) = link {
            let before = self.store.node(id).height;
            let parent = self.store.node(id).parent;
            let top = self.store.rebalance(id);
            if top != id || self.store.node(id).height == before {
                break;
            }
            link = parent;
        }
    }
}

impl<K, V, C: Comparator<K>> AvlMap<K, V, C> {
    /// Descends from the root. `Ok` holds the node with an equivalent key,
    /// `Err` the parent and side where such a key would be linked.
    fn search(&self, key: &K) -> Result<NodeId, (Link, Side)> {
        let mut parent = Link::Sentinel;
        let mut side = Side::Left;
        let mut current = self.store.root();
        while let Some(id) = current {
            let node = self.store.node(id);
            parent = Link::Node(id);
            if self.comparator.less(key, &node.key) {
                side = Side::Left;
                current = node.left;
            } else if self.comparator.less(&node.key, key) {
                side = Side::Right;
                current = node.right;
            } else {
                return Ok(id);
            }
        }
        Err((parent, side))
    }

    fn insert_with<F>(&mut self, key: K, make_value: F) -> (NodeId, bool)
    where
        F: FnOnce() -> V,
    {
        match self.search(&key) {
            Ok(id) => (id, false),
            Err((parent, side)) => {
                let id = self.store.allocate(key, make_value(), parent);
                self.store.attach(parent, side, Some(id));
                self.rebalance_after_insert(parent);
                (id, true)
            }
        }
    }

    /// Inserts `key` with `value` unless an equivalent key is present.
    ///
    /// Returns a cursor to the entry holding the key and whether an insertion
    /// took place. When the key is already present the map is left untouched
    /// and `value` is dropped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlmap::ordered::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// let (cursor, inserted) = map.insert(1, "one");
    /// assert!(inserted);
    ///
    /// let (existing, inserted) = map.insert(1, "ONE");
    /// assert!(!inserted);
    /// assert_eq!(existing, cursor);
    /// assert_eq!(map.at(&1), Ok(&"one"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> (Cursor, bool) {
        let (id, inserted) = self.insert_with(key, || value);
        (Cursor::at(self.id, &self.store, id), inserted)
    }

    /// Returns the value for `key`, inserting `V::default()` first if the
    /// key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlmap::ordered::AvlMap;
    ///
    /// let mut counts: AvlMap<&str, usize> = AvlMap::new();
    /// for word in ["a", "b", "a"] {
    ///     *counts.get_or_insert_default(word) += 1;
    /// }
    /// assert_eq!(counts.at(&"a"), Ok(&2));
    /// assert_eq!(counts.at(&"b"), Ok(&1));
    /// ```
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let (id, _) = self.insert_with(key, V::default);
        &mut self.store.node_mut(id).value
    }

    /// Cursor to the entry for `key`, or [`end`](Self::end) if absent.
    #[must_use]
    pub fn find(&self, key: &K) -> Cursor {
        match self.search(key) {
            Ok(id) => Cursor::at(self.id, &self.store, id),
            Err(_) => self.end(),
        }
    }

    /// The value for `key`.
    ///
    /// # Errors
    ///
    /// [`MapError::OutOfBound`] if the key is absent.
    pub fn at(&self, key: &K) -> Result<&V, MapError> {
        self.get(key).ok_or(MapError::OutOfBound)
    }

    /// Mutable access to the value for `key`.
    ///
    /// # Errors
    ///
    /// [`MapError::OutOfBound`] if the key is absent.
    pub fn at_mut(&mut self, key: &K) -> Result<&mut V, MapError> {
        self.get_mut(key).ok_or(MapError::OutOfBound)
    }

    /// The value for `key`, if present.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.search(key)
            .ok()
            .map(|id| &self.store.node(id).value)
    }

    /// Mutable access to the value for `key`, if present.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let id = self.search(key).ok()?;
        Some(&mut self.store.node_mut(id).value)
    }

    /// Returns `true` if an equivalent key is present.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.search(key).is_ok()
    }

    /// Number of entries with a key equivalent to `key`: 0 or 1.
    #[must_use]
    pub fn count(&self, key: &K) -> usize {
        usize::from(self.contains_key(key))
    }

    /// Removes the entry for `key` and returns its value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlmap::ordered::AvlMap;
    ///
    /// let mut map: AvlMap<i32, &str> = [(1, "one")].into_iter().collect();
    /// assert_eq!(map.remove(&1), Some("one"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let id = self.search(key).ok()?;
        Some(self.remove_node(id).1)
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V, C: Default> Default for AvlMap<K, V, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

/// Copies every node. The copy is a distinct map: cursors from one are
/// foreign to the other.
impl<K: Clone, V: Clone, C: Clone> Clone for AvlMap<K, V, C> {
    fn clone(&self) -> Self {
        let mut store = NodeStore::with_capacity(self.len());
        store.clone_tree_from(&self.store);
        Self {
            store,
            comparator: self.comparator.clone(),
            id: MapId::fresh(),
        }
    }

    /// Reuses `self`'s node arena. Cursors into `self` become stale.
    fn clone_from(&mut self, source: &Self) {
        self.store.clone_tree_from(&source.store);
        self.comparator = source.comparator.clone();
    }
}

/// Collects entries; of several equivalent keys the first one wins.
impl<K, V, C: Comparator<K> + Default> FromIterator<(K, V)> for AvlMap<K, V, C> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K, V, C: Comparator<K>> Extend<(K, V)> for AvlMap<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V, C> IntoIterator for AvlMap<K, V, C> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.store.into_sorted_entries())
    }
}

impl<'a, K, V, C> IntoIterator for &'a AvlMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, C> IntoIterator for &'a mut AvlMap<K, V, C> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// # Panics
///
/// Panics if the key is absent. Use [`AvlMap::at`] for a fallible lookup.
impl<K, V, C: Comparator<K>> Index<&K> for AvlMap<K, V, C> {
    type Output = V;

    fn index(&self, key: &K) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

/// Maps are equal when they hold equal entries in the same order.
impl<K: PartialEq, V: PartialEq, C> PartialEq for AvlMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, C> Eq for AvlMap<K, V, C> {}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for AvlMap<K, V, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display, C> fmt::Display for AvlMap<K, V, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for (key, value) in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{key}: {value}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Tests
// =============================================================================
