//! Positions inside an [`AvlMap`](super::AvlMap).
//!
//! A [`Cursor`] is a small `Copy` handle naming one entry of one map, or that
//! map's end position. It does not borrow the map: every operation that reads
//! through or moves a cursor takes the map as an argument and checks that the
//! cursor still denotes a live position in *that* map.
//!
//! Cursors survive any mutation that does not remove their own entry.
//! Rotations relink nodes but never move an entry to a different node, and
//! erasing an entry with two children relinks its successor's node into the
//! erased position, so a cursor to the successor stays valid as well.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use super::error::IteratorFault;
use super::node::{Link, NodeId, NodeStore};

static NEXT_MAP_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique identity of one map instance.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct MapId(u64);

impl MapId {
    pub(crate) fn fresh() -> Self {
        Self(NEXT_MAP_ID.fetch_add(1, AtomicOrdering::Relaxed))
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum Position {
    End,
    Node { index: usize, generation: u32 },
}

/// A bidirectional position in an [`AvlMap`](super::AvlMap).
///
/// Two cursors are equal when they belong to the same map and denote the same
/// position.
///
/// # Examples
///
/// ```rust
/// use avlmap::ordered::AvlMap;
///
/// let map: AvlMap<i32, &str> = [(2, "two"), (1, "one")].into_iter().collect();
///
/// let first = map.begin();
/// assert_eq!(map.entry_at(first), Ok((&1, &"one")));
///
/// let second = map.next_cursor(first).unwrap();
/// assert_eq!(map.key_at(second), Ok(&2));
///
/// let end = map.next_cursor(second).unwrap();
/// assert!(end.is_end());
/// assert_eq!(end, map.end());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Cursor {
    owner: MapId,
    position: Position,
}

impl Cursor {
    pub(crate) const fn end(owner: MapId) -> Self {
        Self {
            owner,
            position: Position::End,
        }
    }

    pub(crate) fn at<K, V>(owner: MapId, store: &NodeStore<K, V>, id: NodeId) -> Self {
        Self {
            owner,
            position: Position::Node {
                index: id.index(),
                generation: store.generation(id),
            },
        }
    }

    pub(crate) fn from_link<K, V>(owner: MapId, store: &NodeStore<K, V>, link: Link) -> Self {
        match link {
            Link::Sentinel => Self::end(owner),
            Link::Node(id) => Self::at(owner, store, id),
        }
    }

    /// Returns `true` if this cursor is the end position of its map.
    #[inline]
    #[must_use]
    pub const fn is_end(&self) -> bool {
        matches!(self.position, Position::End)
    }

    /// Resolves the cursor against the map it is used with.
    ///
    /// Fails with [`IteratorFault::Foreign`] if the cursor came from another
    /// map and [`IteratorFault::Stale`] if its node has been removed.
    pub(crate) fn resolve<K, V>(
        self,
        owner: MapId,
        store: &NodeStore<K, V>,
    ) -> Result<Link, IteratorFault> {
        if self.owner != owner {
            return Err(IteratorFault::Foreign);
        }
        match self.position {
            Position::End => Ok(Link::Sentinel),
            Position::Node { index, generation } => store
                .live(index, generation)
                .map(Link::Node)
                .ok_or(IteratorFault::Stale),
        }
    }

    /// Like [`resolve`](Self::resolve), but the end position is an error.
    pub(crate) fn resolve_entry<K, V>(
        self,
        owner: MapId,
        store: &NodeStore<K, V>,
    ) -> Result<NodeId, IteratorFault> {
        match self.resolve(owner, store)? {
            Link::Sentinel => Err(IteratorFault::End),
            Link::Node(id) => Ok(id),
        }
    }
}
