use std::cmp::Ordering;
use std::fmt;

use log::trace;


/// Handle to a node slot in an [`Arena`].
///
/// A `NodeId` is only meaningful for the arena that handed it out, and only
/// until the node is freed (the slot gets reused by the next insertion).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Left => "left",
            Side::Right => "right",
        })
    }
}

/// A tree node. Balancing strategies see its metadata and links; keys and
/// values are only written by the tree itself, so no strategy can break the
/// ordering.
///
/// ```compile_fail
/// use bstree::non_concurrent::bst::arena::{Arena, NodeId};
///
/// fn rekey(arena: &mut Arena<i32, (), ()>, id: NodeId) {
///     arena.node_mut(id).key = 0;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Node<K, V, M> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub meta: M,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
    // NOTE: non-owning. Only valid between mutations; every structural edit
    //       below rewrites it before anyone walks upward again.
    pub(crate) parent: Option<NodeId>,
}

/// Owning storage for every node of one tree.
///
/// Children are owned through the slot they occupy; parent links are plain
/// handles. Freed slots go on a free list and get reused.
#[derive(Debug, Clone)]
pub struct Arena<K, V, M> {
    slots: Vec<Option<Node<K, V, M>>>,
    free: Vec<usize>,
    root: Option<NodeId>,
    len: usize,
}

impl<K, V, M> Default for Arena<K, V, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, M> Arena<K, V, M> {
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
        }
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.root = None;
        self.len = 0;
    }

    pub fn node(&self, id: NodeId) -> &Node<K, V, M> {
        self.slots[id.0].as_ref().expect("live node ids always point at occupied slots")
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V, M> {
        self.slots[id.0].as_mut().expect("live node ids always point at occupied slots")
    }

    /// Mutable access to two distinct nodes at once.
    pub(crate) fn pair_mut(&mut self, a: NodeId, b: NodeId) -> (&mut Node<K, V, M>, &mut Node<K, V, M>) {
        assert_ne!(a, b, "pair_mut needs two distinct nodes");
        let (lo, hi, flipped) = if a.0 < b.0 { (a.0, b.0, false) } else { (b.0, a.0, true) };
        let (head, tail) = self.slots.split_at_mut(hi);
        let lo_node = head[lo].as_mut().expect("live node ids always point at occupied slots");
        let hi_node = tail[0].as_mut().expect("live node ids always point at occupied slots");
        if flipped { (hi_node, lo_node) } else { (lo_node, hi_node) }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn child(&self, id: NodeId, side: Side) -> Option<NodeId> {
        let node = self.node(id);
        match side {
            Side::Left => node.left,
            Side::Right => node.right,
        }
    }

    pub fn left(&self, id: NodeId) -> Option<NodeId> {
        self.child(id, Side::Left)
    }

    pub fn right(&self, id: NodeId) -> Option<NodeId> {
        self.child(id, Side::Right)
    }

    pub(crate) fn set_child(&mut self, id: NodeId, side: Side, child: Option<NodeId>) {
        let node = self.node_mut(id);
        match side {
            Side::Left => node.left = child,
            Side::Right => node.right = child,
        }
    }

    pub(crate) fn set_parent(&mut self, id: Option<NodeId>, parent: Option<NodeId>) {
        if let Some(id) = id {
            self.node_mut(id).parent = parent;
        }
    }

    /// Which side of `parent` the (possibly empty) position `child` hangs off.
    ///
    /// An empty `child` is only unambiguous when the parent has exactly one
    /// empty slot, which holds for every caller (a removed black leaf always
    /// has a sibling).
    pub fn side_of(&self, parent: NodeId, child: Option<NodeId>) -> Side {
        if self.left(parent) == child { Side::Left } else { Side::Right }
    }

    pub fn meta(&self, id: NodeId) -> &M {
        &self.node(id).meta
    }

    pub fn meta_mut(&mut self, id: NodeId) -> &mut M {
        &mut self.node_mut(id).meta
    }

    pub(crate) fn alloc(&mut self, key: K, value: V, meta: M, parent: Option<NodeId>) -> NodeId {
        let node = Node { key, value, meta, left: None, right: None, parent };
        self.len += 1;
        match self.free.pop() {
            Some(index) => {
                debug_assert!(self.slots[index].is_none());
                self.slots[index] = Some(node);
                NodeId(index)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Allocates a node and links it into the empty position `under`
    /// (`None` meaning the root of an empty tree).
    pub(crate) fn attach(&mut self, under: Option<(NodeId, Side)>, key: K, value: V, meta: M) -> NodeId {
        let parent = under.map(|(p, _)| p);
        let id = self.alloc(key, value, meta, parent);
        match under {
            None => {
                debug_assert!(self.root.is_none());
                self.root = Some(id);
            }
            Some((p, side)) => {
                debug_assert!(self.child(p, side).is_none());
                self.set_child(p, side, Some(id));
            }
        }
        id
    }

    /// Releases a slot. The caller must already have unlinked the node.
    pub(crate) fn free(&mut self, id: NodeId) -> Node<K, V, M> {
        let node = self.slots[id.0].take().expect("double free of a tree node");
        self.free.push(id.0);
        self.len -= 1;
        if self.len == 0 {
            // nothing live, so drop the bookkeeping instead of growing it forever
            self.slots.clear();
            self.free.clear();
        }
        node
    }

    /// Points whatever referenced `old` (its parent's child slot, or the root)
    /// at `new` instead. Does not touch `new`'s parent link.
    pub(crate) fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
        match parent {
            None => self.root = new,
            Some(p) => {
                let side = if self.left(p) == Some(old) { Side::Left } else { Side::Right };
                debug_assert_eq!(self.child(p, side), Some(old));
                self.set_child(p, side, new);
            }
        }
    }

    /// Rotates `pivot` down towards `side`; its child on the opposite side
    /// takes its place. Returns the new subtree root.
    ///
    /// ```text
    ///       x                      y
    ///      / \    rotate(x, L)    / \
    ///     a   y   ---------->    x   c
    ///        / \                / \
    ///       b   c              a   b
    /// ```
    ///
    /// Metadata is left untouched.
    pub fn rotate(&mut self, pivot: NodeId, side: Side) -> NodeId {
        let riser = self.child(pivot, side.opposite())
            .expect("rotation needs a child on the rising side");
        trace!("rotating {pivot} {side}, {riser} rises");

        let inner = self.child(riser, side);
        self.set_child(pivot, side.opposite(), inner);
        self.set_parent(inner, Some(pivot));

        let grandparent = self.parent(pivot);
        self.replace_child(grandparent, pivot, Some(riser));
        self.node_mut(riser).parent = grandparent;

        self.set_child(riser, side, Some(pivot));
        self.node_mut(pivot).parent = Some(riser);
        riser
    }

    /// Leftmost node of the subtree rooted at `id`.
    pub fn minimum(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.left(id) {
            id = left;
        }
        id
    }

    /// Rightmost node of the subtree rooted at `id`.
    pub fn maximum(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self.right(id) {
            id = right;
        }
        id
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(NodeId, usize)> = self.root.into_iter().map(|r| (r, 1)).collect();
        while let Some((id, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            let node = self.node(id);
            stack.extend(node.left.map(|c| (c, depth + 1)));
            stack.extend(node.right.map(|c| (c, depth + 1)));
        }
        deepest
    }

    /// Consumes the arena, yielding entries in key order.
    pub(crate) fn into_entries(mut self) -> Vec<(K, V)> {
        self.in_order().into_iter()
            .map(|id| {
                let node = self.slots[id.0].take().expect("in-order walk visits each node once");
                (node.key, node.value)
            })
            .collect()
    }

    /// Node ids in key order.
    pub fn in_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack = Vec::new();
        let mut cursor = self.root;
        loop {
            while let Some(id) = cursor {
                stack.push(id);
                cursor = self.left(id);
            }
            let Some(id) = stack.pop() else { break };
            out.push(id);
            cursor = self.right(id);
        }
        out
    }
}

impl<K: Ord, V, M> Arena<K, V, M> {
    /// Binary search walk for `key`.
    pub fn search<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: std::borrow::Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cursor = self.root;
        while let Some(id) = cursor {
            let node = self.node(id);
            cursor = match key.cmp(node.key.borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(id),
            };
        }
        None
    }

    /// Where `key` lives, or the empty slot it would be placed in.
    pub fn locate(&self, key: &K) -> Slot {
        let mut cursor = self.root;
        let mut slot = Slot::Root;
        while let Some(id) = cursor {
            let node = self.node(id);
            let side = match key.cmp(&node.key) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return Slot::Occupied(id),
            };
            slot = Slot::Vacant(id, side);
            cursor = self.child(id, side);
        }
        slot
    }
}

/// Result of [`Arena::locate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The tree is empty.
    Root,
    /// The key belongs under this parent, on this side.
    Vacant(NodeId, Side),
    /// The key is already present.
    Occupied(NodeId),
}


#[cfg(test)]
mod tests {
    use super::*;

    // builds   2
    //         / \
    //        1   4
    //           / \
    //          3   5
    fn sample() -> (Arena<i32, (), ()>, [NodeId; 5]) {
        let mut arena = Arena::new();
        let two = arena.alloc(2, (), (), None);
        arena.root = Some(two);
        let one = arena.alloc(1, (), (), Some(two));
        let four = arena.alloc(4, (), (), Some(two));
        arena.set_child(two, Side::Left, Some(one));
        arena.set_child(two, Side::Right, Some(four));
        let three = arena.alloc(3, (), (), Some(four));
        let five = arena.alloc(5, (), (), Some(four));
        arena.set_child(four, Side::Left, Some(three));
        arena.set_child(four, Side::Right, Some(five));
        (arena, [one, two, three, four, five])
    }

    fn keys(arena: &Arena<i32, (), ()>) -> Vec<i32> {
        arena.in_order().into_iter().map(|id| arena.node(id).key).collect()
    }

    #[test]
    fn rotate_left_at_root() {
        let (mut arena, [one, two, three, four, five]) = sample();
        let top = arena.rotate(two, Side::Left);

        assert_eq!(top, four);
        assert_eq!(arena.root(), Some(four));
        assert_eq!(arena.parent(four), None);
        assert_eq!(arena.left(four), Some(two));
        assert_eq!(arena.right(four), Some(five));
        assert_eq!(arena.left(two), Some(one));
        assert_eq!(arena.right(two), Some(three));
        assert_eq!(arena.parent(three), Some(two));
        assert_eq!(arena.parent(two), Some(four));
        assert_eq!(keys(&arena), [1, 2, 3, 4, 5]);
    }

    #[test]
    fn rotate_back_restores_shape() {
        let (mut arena, [one, two, three, four, five]) = sample();
        arena.rotate(two, Side::Left);
        arena.rotate(four, Side::Right);

        assert_eq!(arena.root(), Some(two));
        assert_eq!(arena.left(two), Some(one));
        assert_eq!(arena.right(two), Some(four));
        assert_eq!(arena.left(four), Some(three));
        assert_eq!(arena.right(four), Some(five));
        assert_eq!(arena.parent(four), Some(two));
    }

    #[test]
    fn rotate_below_root_relinks_grandparent() {
        let (mut arena, [_, two, three, four, five]) = sample();
        let top = arena.rotate(four, Side::Right);

        assert_eq!(top, three);
        assert_eq!(arena.right(two), Some(three));
        assert_eq!(arena.parent(three), Some(two));
        assert_eq!(arena.right(three), Some(four));
        assert_eq!(arena.left(four), None);
        assert_eq!(arena.right(four), Some(five));
        assert_eq!(keys(&arena), [1, 2, 3, 4, 5]);
    }

    #[test]
    fn locate_and_search() {
        let (arena, [one, _, three, four, _]) = sample();
        assert_eq!(arena.locate(&3), Slot::Occupied(three));
        assert_eq!(arena.locate(&0), Slot::Vacant(one, Side::Left));
        assert_eq!(arena.locate(&6), Slot::Vacant(arena.maximum(four), Side::Right));
        assert_eq!(arena.search(&4), Some(four));
        assert_eq!(arena.search(&7), None);
        assert_eq!(Arena::<i32, (), ()>::new().locate(&1), Slot::Root);
    }

    #[test]
    fn freed_slots_are_reused() {
        let (mut arena, [_, _, three, four, _]) = sample();
        arena.set_child(four, Side::Left, None);
        let freed = arena.free(three);
        assert_eq!(freed.key, 3);
        assert_eq!(arena.len(), 4);

        let again = arena.alloc(7, (), (), None);
        assert_eq!(again, three);
        assert_eq!(arena.height(), 3);
    }

    #[test]
    fn pair_mut_keeps_argument_order() {
        let (mut arena, [one, _, _, _, five]) = sample();
        let (a, b) = arena.pair_mut(five, one);
        assert_eq!((a.key, b.key), (5, 1));
        std::mem::swap(&mut a.key, &mut b.key);
        assert_eq!(arena.node(one).key, 5);
    }
}
