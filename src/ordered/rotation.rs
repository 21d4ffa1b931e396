//! Rotation primitives and the rebalancing step built on them.
//!
//! Every rotation takes the top `x` of an unbalanced subtree, installs a new
//! top in the slot that held `x` (including the sentinel's slot when `x` is
//! the root) and fixes the parent links of all moved nodes. Heights are
//! recomputed child first, then the new top.

use super::node::{Link, NodeId, NodeStore, Side};
use crate::trace::trace_event;

impl<K, V> NodeStore<K, V> {
    /// `LL`: promotes `x.left`. Returns the new top.
    pub(crate) fn rotate_right(&mut self, x: NodeId) -> NodeId {
        let Some(pivot) = self.node(x).left else {
            unreachable!("rotate_right on {x:?} without a left child");
        };
        trace_event!(top = ?x, pivot = ?pivot, "rotate right");
        let inner = self.node(pivot).right;
        self.replace_child(x, Some(pivot));
        self.attach(Link::Node(x), Side::Left, inner);
        self.attach(Link::Node(pivot), Side::Right, Some(x));
        self.update_height(x);
        self.update_height(pivot);
        pivot
    }

    /// `RR`: promotes `x.right`. Returns the new top.
    pub(crate) fn rotate_left(&mut self, x: NodeId) -> NodeId {
        let Some(pivot) = self.node(x).right else {
            unreachable!("rotate_left on {x:?} without a right child");
        };
        trace_event!(top = ?x, pivot = ?pivot, "rotate left");
        let inner = self.node(pivot).left;
        self.replace_child(x, Some(pivot));
        self.attach(Link::Node(x), Side::Right, inner);
        self.attach(Link::Node(pivot), Side::Left, Some(x));
        self.update_height(x);
        self.update_height(pivot);
        pivot
    }

    /// `LR`: `x` leans left while `x.left` leans right.
    pub(crate) fn rotate_left_right(&mut self, x: NodeId) -> NodeId {
        if let Some(left) = self.node(x).left {
            self.rotate_left(left);
        }
        self.rotate_right(x)
    }

    /// `RL`: `x` leans right while `x.right` leans left.
    pub(crate) fn rotate_right_left(&mut self, x: NodeId) -> NodeId {
        if let Some(right) = self.node(x).right {
            self.rotate_right(right);
        }
        self.rotate_left(x)
    }

    /// Recomputes `x`'s height and, if its balance factor left `{-1, 0, 1}`,
    /// applies one single or double rotation. Returns the subtree's top.
    ///
    /// A heavy child that is level or leans the same way as `x` takes a
    /// single rotation; a heavy child leaning the other way takes a double.
    pub(crate) fn rebalance(&mut self, x: NodeId) -> NodeId {
        self.update_height(x);
        let balance = self.balance_factor(x);
        if balance > 1 {
            match self.node(x).left {
                Some(left) if self.balance_factor(left) < 0 => self.rotate_left_right(x),
                _ => self.rotate_right(x),
            }
        } else if balance < -1 {
            match self.node(x).right {
                Some(right) if self.balance_factor(right) > 0 => self.rotate_right_left(x),
                _ => self.rotate_left(x),
            }
        } else {
            x
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// Links `keys` as a chain, each key hanging on `side` of the previous.
    fn chain(keys: &[i32], sides: &[Side]) -> (NodeStore<i32, ()>, Vec<NodeId>) {
        let mut store = NodeStore::new();
        let mut ids = Vec::new();
        let mut parent = Link::Sentinel;
        let mut side = Side::Left;
        for (position, key) in keys.iter().enumerate() {
            let id = store.allocate(*key, (), parent);
            store.attach(parent, side, Some(id));
            ids.push(id);
            parent = Link::Node(id);
            if let Some(next) = sides.get(position) {
                side = *next;
            }
        }
        for id in ids.iter().rev() {
            store.update_height(*id);
        }
        (store, ids)
    }

    fn in_order(store: &NodeStore<i32, ()>) -> Vec<i32> {
        let mut keys = Vec::new();
        let mut current = store.first();
        while let Link::Node(id) = current {
            keys.push(store.node(id).key);
            current = store.successor(id);
        }
        keys
    }

    #[rstest]
    fn test_rotate_right_relinks_parents() {
        // 3 -> 2 -> 1 down the left spine.
        let (mut store, ids) = chain(&[3, 2, 1], &[Side::Left, Side::Left]);
        let top = store.rotate_right(ids[0]);
        assert_eq!(top, ids[1]);
        assert_eq!(store.root(), Some(ids[1]));
        assert_eq!(store.node(ids[1]).parent, Link::Sentinel);
        assert_eq!(store.node(ids[0]).parent, Link::Node(ids[1]));
        assert_eq!(store.node(ids[2]).parent, Link::Node(ids[1]));
        assert_eq!(store.node(ids[1]).height, 2);
        assert!(store.is_consistent());
        assert_eq!(in_order(&store), vec![1, 2, 3]);
    }

    #[rstest]
    fn test_rotate_left_relinks_parents() {
        let (mut store, ids) = chain(&[1, 2, 3], &[Side::Right, Side::Right]);
        let top = store.rotate_left(ids[0]);
        assert_eq!(top, ids[1]);
        assert_eq!(store.root(), Some(ids[1]));
        assert!(store.is_consistent());
        assert_eq!(in_order(&store), vec![1, 2, 3]);
    }

    #[rstest]
    fn test_rotate_moves_inner_grandchild() {
        // 4 with left 2, 2 with children 1 and 3; rotating 4 right moves 3
        // under 4.
        let mut store = NodeStore::new();
        let four = store.allocate(4, (), Link::Sentinel);
        store.attach(Link::Sentinel, Side::Left, Some(four));
        let two = store.allocate(2, (), Link::Node(four));
        store.attach(Link::Node(four), Side::Left, Some(two));
        let one = store.allocate(1, (), Link::Node(two));
        store.attach(Link::Node(two), Side::Left, Some(one));
        let three = store.allocate(3, (), Link::Node(two));
        store.attach(Link::Node(two), Side::Right, Some(three));
        store.update_height(two);
        store.update_height(four);

        store.rotate_right(four);
        assert_eq!(store.node(four).left, Some(three));
        assert_eq!(store.node(three).parent, Link::Node(four));
        assert_eq!(store.node(two).right, Some(four));
        assert_eq!(in_order(&store), vec![1, 2, 3, 4]);
    }

    #[rstest]
    fn test_rotate_left_right() {
        let (mut store, ids) = chain(&[3, 1, 2], &[Side::Left, Side::Right]);
        let top = store.rotate_left_right(ids[0]);
        assert_eq!(store.node(top).key, 2);
        assert!(store.is_consistent());
        assert_eq!(in_order(&store), vec![1, 2, 3]);
    }

    #[rstest]
    fn test_rotate_right_left() {
        let (mut store, ids) = chain(&[1, 3, 2], &[Side::Right, Side::Left]);
        let top = store.rotate_right_left(ids[0]);
        assert_eq!(store.node(top).key, 2);
        assert!(store.is_consistent());
        assert_eq!(in_order(&store), vec![1, 2, 3]);
    }

    #[rstest]
    #[case(&[3, 2, 1], &[Side::Left, Side::Left])]
    #[case(&[1, 2, 3], &[Side::Right, Side::Right])]
    #[case(&[3, 1, 2], &[Side::Left, Side::Right])]
    #[case(&[1, 3, 2], &[Side::Right, Side::Left])]
    fn test_rebalance_picks_rotation(#[case] keys: &[i32], #[case] sides: &[Side]) {
        let (mut store, ids) = chain(keys, sides);
        let top = store.rebalance(ids[0]);
        assert_eq!(store.node(top).key, 2);
        assert_eq!(store.node(top).height, 2);
        assert!(store.is_consistent());
    }

    #[rstest]
    fn test_rebalance_leaves_balanced_node() {
        let (mut store, ids) = chain(&[2, 1], &[Side::Left]);
        assert_eq!(store.rebalance(ids[0]), ids[0]);
        assert_eq!(store.node(ids[0]).height, 2);
    }
}
