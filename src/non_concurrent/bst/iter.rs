use std::iter::FusedIterator;

use super::arena::{Arena, NodeId, Side};
use super::{Balance, BinarySearchTree};


/// In-order iterator over a tree's entries.
///
/// Keeps the unvisited spine on each end, so both directions cost
/// O(height) space and amortized O(1) per step.
pub struct Iter<'a, K, V, M> {
    arena: &'a Arena<K, V, M>,
    front: Vec<NodeId>,
    back: Vec<NodeId>,
    remaining: usize,
}

impl<'a, K, V, M> Iter<'a, K, V, M> {
    pub(crate) fn new(arena: &'a Arena<K, V, M>) -> Self {
        let mut iter = Self { arena, front: Vec::new(), back: Vec::new(), remaining: arena.len() };
        iter.push_spine(arena.root(), Side::Left);
        iter.push_spine(arena.root(), Side::Right);
        iter
    }

    fn push_spine(&mut self, mut cursor: Option<NodeId>, side: Side) {
        let stack = match side {
            Side::Left => &mut self.front,
            Side::Right => &mut self.back,
        };
        while let Some(id) = cursor {
            stack.push(id);
            cursor = self.arena.child(id, side);
        }
    }

    fn entry(&self, id: NodeId) -> (&'a K, &'a V) {
        let node = self.arena.node(id);
        (&node.key, &node.value)
    }
}

impl<'a, K, V, M> Iterator for Iter<'a, K, V, M> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None
        }
        let id = self.front.pop()?;
        self.push_spine(self.arena.right(id), Side::Left);
        self.remaining -= 1;
        Some(self.entry(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, M> DoubleEndedIterator for Iter<'_, K, V, M> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None
        }
        let id = self.back.pop()?;
        self.push_spine(self.arena.left(id), Side::Right);
        self.remaining -= 1;
        Some(self.entry(id))
    }
}

impl<K, V, M> ExactSizeIterator for Iter<'_, K, V, M> {}

impl<K, V, M> FusedIterator for Iter<'_, K, V, M> {}

/// Owning in-order iterator.
pub struct IntoIter<K, V> {
    inner: std::vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<'a, K, V, B: Balance> IntoIterator for &'a BinarySearchTree<K, V, B> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, B::Meta>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, B: Balance> IntoIterator for BinarySearchTree<K, V, B> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { inner: self.arena.into_entries().into_iter() }
    }
}
