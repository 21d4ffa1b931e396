//! Node storage for the AVL tree.
//!
//! Nodes live in an arena (`Vec` of slots) and refer to each other through
//! [`NodeId`] indices, so parent back-links never form ownership cycles. A
//! released slot goes onto a free list and its generation counter is bumped;
//! cursors remember the generation they were created with and are rejected
//! once it no longer matches.
//!
//! The sentinel is not a slot. It is represented by [`Link::Sentinel`] and by
//! the store's `sentinel_left` field, which holds the data root.

use crate::trace::trace_event;

/// Index of a node slot in the arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct NodeId(usize);

impl NodeId {
    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0
    }
}

/// A structural position: the sentinel or a real node.
///
/// Used for parent links (the root's parent is the sentinel) and for cursor
/// targets (the sentinel is the end position).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) enum Link {
    Sentinel,
    Node(NodeId),
}

/// Which child slot of a parent a node occupies.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Side {
    Left,
    Right,
}

#[derive(Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) parent: Link,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
    pub(crate) height: usize,
}

#[derive(Debug)]
enum SlotState<K, V> {
    Occupied(Node<K, V>),
    Vacant { next_free: Option<NodeId> },
}

#[derive(Debug)]
struct Slot<K, V> {
    generation: u32,
    state: SlotState<K, V>,
}

#[derive(Debug)]
pub(crate) struct NodeStore<K, V> {
    slots: Vec<Slot<K, V>>,
    free_head: Option<NodeId>,
    sentinel_left: Option<NodeId>,
    length: usize,
}

impl<K, V> NodeStore<K, V> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            sentinel_left: None,
            length: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            sentinel_left: None,
            length: 0,
        }
    }

    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.length
    }

    /// The data root, i.e. the sentinel's left child.
    #[inline]
    pub(crate) const fn root(&self) -> Option<NodeId> {
        self.sentinel_left
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node<K, V> {
        match &self.slots[id.index()].state {
            SlotState::Occupied(node) => node,
            SlotState::Vacant { .. } => unreachable!("link to vacant slot {id:?}"),
        }
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        match &mut self.slots[id.index()].state {
            SlotState::Occupied(node) => node,
            SlotState::Vacant { .. } => unreachable!("link to vacant slot {id:?}"),
        }
    }

    /// Current generation of the slot behind `id`.
    #[inline]
    pub(crate) fn generation(&self, id: NodeId) -> u32 {
        self.slots[id.index()].generation
    }

    /// Returns the node id if `index` is an occupied slot of the given
    /// generation.
    pub(crate) fn live(&self, index: usize, generation: u32) -> Option<NodeId> {
        self.slots.get(index).and_then(|slot| match slot.state {
            SlotState::Occupied(_) if slot.generation == generation => Some(NodeId(index)),
            _ => None,
        })
    }

    /// Creates a detached leaf (height 1) under `parent`. The caller links it
    /// into the parent's child slot.
    pub(crate) fn allocate(&mut self, key: K, value: V, parent: Link) -> NodeId {
        let node = Node {
            key,
            value,
            parent,
            left: None,
            right: None,
            height: 1,
        };
        self.length += 1;
        match self.free_head {
            Some(id) => {
                let slot = &mut self.slots[id.index()];
                self.free_head = match slot.state {
                    SlotState::Vacant { next_free } => next_free,
                    SlotState::Occupied(_) => unreachable!("free list holds occupied slot {id:?}"),
                };
                slot.state = SlotState::Occupied(node);
                id
            }
            None => {
                let id = NodeId(self.slots.len());
                self.slots.push(Slot {
                    generation: 0,
                    state: SlotState::Occupied(node),
                });
                id
            }
        }
    }

    /// Frees a node that is no longer linked into the tree and returns its
    /// entry.
    pub(crate) fn release(&mut self, id: NodeId) -> (K, V) {
        let slot = &mut self.slots[id.index()];
        let state = std::mem::replace(
            &mut slot.state,
            SlotState::Vacant {
                next_free: self.free_head,
            },
        );
        slot.generation = slot.generation.wrapping_add(1);
        self.free_head = Some(id);
        self.length -= 1;
        match state {
            SlotState::Occupied(node) => (node.key, node.value),
            SlotState::Vacant { .. } => unreachable!("double release of slot {id:?}"),
        }
    }

    /// Drops every node, keeping the arena's capacity. Every slot generation
    /// moves on, so cursors into the old tree become stale.
    pub(crate) fn clear(&mut self) {
        trace_event!(length = self.length, "clear");
        let mut free_head = None;
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            if matches!(slot.state, SlotState::Occupied(_)) {
                slot.generation = slot.generation.wrapping_add(1);
            }
            slot.state = SlotState::Vacant {
                next_free: free_head,
            };
            free_head = Some(NodeId(index));
        }
        self.free_head = free_head;
        self.sentinel_left = None;
        self.length = 0;
    }

    /// Copies `source`'s tree into `self`, reusing `self`'s arena.
    pub(crate) fn clone_tree_from(&mut self, source: &Self)
    where
        K: Clone,
        V: Clone,
    {
        self.clear();
        let Some(root) = source.root() else {
            return;
        };
        // Pre-order walk: each source node is copied after its parent, so the
        // parent's copy already exists when the child is linked.
        let mut pending = vec![(root, Link::Sentinel, Side::Left)];
        while let Some((source_id, parent, side)) = pending.pop() {
            let source_node = source.node(source_id);
            let id = self.allocate(source_node.key.clone(), source_node.value.clone(), parent);
            self.node_mut(id).height = source_node.height;
            self.attach(parent, side, Some(id));
            if let Some(right) = source_node.right {
                pending.push((right, Link::Node(id), Side::Right));
            }
            if let Some(left) = source_node.left {
                pending.push((left, Link::Node(id), Side::Left));
            }
        }
    }

    /// Takes every entry out of the store in ascending order.
    pub(crate) fn into_sorted_entries(mut self) -> Vec<(K, V)> {
        let mut order = Vec::with_capacity(self.length);
        let mut current = self.first();
        while let Link::Node(id) = current {
            order.push(id);
            current = self.successor(id);
        }
        order
            .into_iter()
            .map(|id| {
                let slot = &mut self.slots[id.index()];
                match std::mem::replace(&mut slot.state, SlotState::Vacant { next_free: None }) {
                    SlotState::Occupied(node) => (node.key, node.value),
                    SlotState::Vacant { .. } => unreachable!("in-order walk reached vacant slot {id:?}"),
                }
            })
            .collect()
    }

    /// Borrows every entry with a mutable value, in ascending key order.
    pub(crate) fn entries_in_order_mut(&mut self) -> Vec<(&K, &mut V)> {
        let mut rank = vec![0; self.slots.len()];
        let mut position = 0;
        let mut current = self.first();
        while let Link::Node(id) = current {
            rank[id.index()] = position;
            position += 1;
            current = self.successor(id);
        }
        let mut ordered: Vec<Option<(&K, &mut V)>> =
            std::iter::repeat_with(|| None).take(self.length).collect();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let SlotState::Occupied(node) = &mut slot.state {
                ordered[rank[index]] = Some((&node.key, &mut node.value));
            }
        }
        ordered.into_iter().flatten().collect()
    }

    // -------------------------------------------------------------------------
    // Heights
    // -------------------------------------------------------------------------

    /// Height of an optional subtree; an absent child has height 0.
    #[inline]
    pub(crate) fn height(&self, link: Option<NodeId>) -> usize {
        link.map_or(0, |id| self.node(id).height)
    }

    pub(crate) fn update_height(&mut self, id: NodeId) {
        let node = self.node(id);
        let height = 1 + self.height(node.left).max(self.height(node.right));
        self.node_mut(id).height = height;
    }

    /// Left height minus right height.
    #[allow(clippy::cast_possible_wrap)]
    pub(crate) fn balance_factor(&self, id: NodeId) -> isize {
        let node = self.node(id);
        self.height(node.left) as isize - self.height(node.right) as isize
    }

    // -------------------------------------------------------------------------
    // Linking
    // -------------------------------------------------------------------------

    /// Stores `child` in `parent`'s `side` slot and points the child's parent
    /// link back at `parent`.
    pub(crate) fn attach(&mut self, parent: Link, side: Side, child: Option<NodeId>) {
        match parent {
            Link::Sentinel => self.sentinel_left = child,
            Link::Node(parent_id) => {
                let parent_node = self.node_mut(parent_id);
                match side {
                    Side::Left => parent_node.left = child,
                    Side::Right => parent_node.right = child,
                }
            }
        }
        if let Some(child_id) = child {
            self.node_mut(child_id).parent = parent;
        }
    }

    /// The side of `parent` on which `child` hangs. The sentinel only has a
    /// left slot.
    pub(crate) fn side_of(&self, parent: Link, child: NodeId) -> Side {
        match parent {
            Link::Sentinel => Side::Left,
            Link::Node(parent_id) if self.node(parent_id).left == Some(child) => Side::Left,
            Link::Node(_) => Side::Right,
        }
    }

    /// Puts `replacement` into the slot that currently holds `old`.
    pub(crate) fn replace_child(&mut self, old: NodeId, replacement: Option<NodeId>) {
        let parent = self.node(old).parent;
        let side = self.side_of(parent, old);
        self.attach(parent, side, replacement);
    }

    // -------------------------------------------------------------------------
    // Shape traversal
    // -------------------------------------------------------------------------

    pub(crate) fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.node(id).left {
            id = left;
        }
        id
    }

    pub(crate) fn rightmost(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self.node(id).right {
            id = right;
        }
        id
    }

    /// The first entry, or the sentinel when empty.
    pub(crate) fn first(&self) -> Link {
        self.root()
            .map_or(Link::Sentinel, |root| Link::Node(self.leftmost(root)))
    }

    /// The in-order successor of `id`; the sentinel after the last entry.
    pub(crate) fn successor(&self, id: NodeId) -> Link {
        if let Some(right) = self.node(id).right {
            return Link::Node(self.leftmost(right));
        }
        let mut child = id;
        loop {
            match self.node(child).parent {
                // The root hangs on the sentinel's left, so climbing out of
                // the root lands on the end position.
                Link::Sentinel => return Link::Sentinel,
                Link::Node(parent) if self.node(parent).left == Some(child) => {
                    return Link::Node(parent);
                }
                Link::Node(parent) => child = parent,
            }
        }
    }

    /// The in-order predecessor of `link`. The predecessor of the sentinel is
    /// the last entry. `None` means there is nothing before `link`.
    pub(crate) fn predecessor(&self, link: Link) -> Option<NodeId> {
        let id = match link {
            Link::Sentinel => return self.root().map(|root| self.rightmost(root)),
            Link::Node(id) => id,
        };
        if let Some(left) = self.node(id).left {
            return Some(self.rightmost(left));
        }
        let mut child = id;
        loop {
            match self.node(child).parent {
                Link::Sentinel => return None,
                Link::Node(parent) if self.node(parent).right == Some(child) => {
                    return Some(parent);
                }
                Link::Node(parent) => child = parent,
            }
        }
    }

    /// Checks balance, height bookkeeping and parent back-links at every node
    /// and that the length matches the reachable node count.
    pub(crate) fn is_consistent(&self) -> bool {
        let Some(root) = self.root() else {
            return self.length == 0;
        };
        if self.node(root).parent != Link::Sentinel {
            return false;
        }
        let mut reachable = 0;
        let mut pending = vec![root];
        while let Some(id) = pending.pop() {
            reachable += 1;
            let node = self.node(id);
            let expected = 1 + self.height(node.left).max(self.height(node.right));
            if node.height != expected || self.balance_factor(id).abs() > 1 {
                return false;
            }
            for child in [node.left, node.right].into_iter().flatten() {
                if self.node(child).parent != Link::Node(id) {
                    return false;
                }
                pending.push(child);
            }
        }
        reachable == self.length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// Builds `2` with children `1` and `3` by hand.
    fn three_node_store() -> (NodeStore<i32, &'static str>, [NodeId; 3]) {
        let mut store = NodeStore::new();
        let two = store.allocate(2, "two", Link::Sentinel);
        store.attach(Link::Sentinel, Side::Left, Some(two));
        let one = store.allocate(1, "one", Link::Node(two));
        store.attach(Link::Node(two), Side::Left, Some(one));
        let three = store.allocate(3, "three", Link::Node(two));
        store.attach(Link::Node(two), Side::Right, Some(three));
        store.update_height(two);
        (store, [one, two, three])
    }

    #[rstest]
    fn test_height_of_absent_child_is_zero() {
        let store: NodeStore<i32, i32> = NodeStore::new();
        assert_eq!(store.height(None), 0);
    }

    #[rstest]
    fn test_update_height_from_children() {
        let (store, [one, two, three]) = three_node_store();
        assert_eq!(store.node(one).height, 1);
        assert_eq!(store.node(three).height, 1);
        assert_eq!(store.node(two).height, 2);
        assert_eq!(store.balance_factor(two), 0);
        assert!(store.is_consistent());
    }

    #[rstest]
    fn test_successor_walk_ends_on_sentinel() {
        let (store, [one, two, three]) = three_node_store();
        assert_eq!(store.first(), Link::Node(one));
        assert_eq!(store.successor(one), Link::Node(two));
        assert_eq!(store.successor(two), Link::Node(three));
        assert_eq!(store.successor(three), Link::Sentinel);
    }

    #[rstest]
    fn test_predecessor_walk_starts_at_sentinel() {
        let (store, [one, two, three]) = three_node_store();
        assert_eq!(store.predecessor(Link::Sentinel), Some(three));
        assert_eq!(store.predecessor(Link::Node(three)), Some(two));
        assert_eq!(store.predecessor(Link::Node(two)), Some(one));
        assert_eq!(store.predecessor(Link::Node(one)), None);
    }

    #[rstest]
    fn test_predecessor_of_sentinel_on_empty_store() {
        let store: NodeStore<i32, i32> = NodeStore::new();
        assert_eq!(store.predecessor(Link::Sentinel), None);
        assert_eq!(store.first(), Link::Sentinel);
    }

    #[rstest]
    fn test_release_bumps_generation_and_reuses_slot() {
        let (mut store, [one, _, _]) = three_node_store();
        let generation = store.generation(one);
        store.replace_child(one, None);
        assert_eq!(store.release(one), (1, "one"));
        assert_eq!(store.generation(one), generation + 1);
        assert_eq!(store.live(one.index(), generation), None);

        let reused = store.allocate(0, "zero", Link::Sentinel);
        assert_eq!(reused, one);
        assert_eq!(store.live(reused.index(), generation), None);
        assert_eq!(store.live(reused.index(), generation + 1), Some(reused));
    }

    #[rstest]
    fn test_clear_invalidates_all_nodes() {
        let (mut store, ids) = three_node_store();
        let generations = ids.map(|id| store.generation(id));
        store.clear();
        assert_eq!(store.len(), 0);
        assert_eq!(store.root(), None);
        for (id, generation) in ids.into_iter().zip(generations) {
            assert_eq!(store.live(id.index(), generation), None);
        }
        assert!(store.is_consistent());
    }

    #[rstest]
    fn test_clone_tree_from_copies_shape() {
        let (source, _) = three_node_store();
        let mut copy = NodeStore::new();
        copy.clone_tree_from(&source);
        assert_eq!(copy.len(), 3);
        assert!(copy.is_consistent());
        assert_eq!(
            copy.into_sorted_entries(),
            vec![(1, "one"), (2, "two"), (3, "three")]
        );
    }

    #[rstest]
    fn test_entries_in_order_mut_follow_keys_not_slots() {
        // Slot order is 2, 1, 3; key order must win.
        let (mut store, _) = three_node_store();
        let keys: Vec<i32> = store
            .entries_in_order_mut()
            .into_iter()
            .map(|(key, value)| {
                *value = "seen";
                *key
            })
            .collect();
        assert_eq!(keys, vec![1, 2, 3]);
        assert!(store.into_sorted_entries().iter().all(|(_, value)| *value == "seen"));
    }

    #[rstest]
    fn test_detects_broken_parent_link() {
        let (mut store, [one, _, three]) = three_node_store();
        store.node_mut(one).parent = Link::Node(three);
        assert!(!store.is_consistent());
    }
}
