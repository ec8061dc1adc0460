//! A binary search tree with a pluggable balancing strategy.
//!
//! [`BinarySearchTree`] does the plain BST work (walking, placing, unlinking)
//! and then hands the affected spot to its [`Balance`] strategy, which
//! restores whatever invariant it maintains. The strategy is a type
//! parameter, so a red-black tree and an AVL tree are different types and
//! can't be assigned to one another.

use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;
use std::mem;

use log::debug;

use crate::error::{InvariantViolation, TreeError};

pub mod arena;
pub mod avl;
pub mod balance;
pub mod iter;
pub mod red_black;
mod render;

#[cfg(test)]
mod fuzz;

use arena::{Arena, NodeId, Slot};
pub use avl::Avl;
pub use balance::{Audit, Balance, Removal, Unbalanced};
pub use iter::{IntoIter, Iter};
pub use red_black::{Color, RedBlack};

pub type PlainTree<K, V> = BinarySearchTree<K, V, Unbalanced>;
pub type RedBlackTree<K, V> = BinarySearchTree<K, V, RedBlack>;
pub type AvlTree<K, V> = BinarySearchTree<K, V, Avl>;

pub struct BinarySearchTree<K, V, B: Balance = Unbalanced> {
    pub(crate) arena: Arena<K, V, B::Meta>,
    _balance: PhantomData<B>,
}

impl<K, V, B: Balance> BinarySearchTree<K, V, B> {
    pub const fn new() -> Self {
        Self {
            arena: Arena::new(),
            _balance: PhantomData,
        }
    }

    /// Number of entries (tracked, not counted).
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Number of nodes on the longest root-to-leaf path; 0 for an empty tree.
    pub fn height(&self) -> usize {
        self.arena.height()
    }

    pub fn clear(&mut self) {
        self.arena.clear();
    }

    /// Moves the contents out, leaving `self` empty.
    pub fn take(&mut self) -> Self {
        mem::take(self)
    }

    /// Entry with the smallest key.
    pub fn first(&self) -> Option<(&K, &V)> {
        let node = self.arena.node(self.arena.minimum(self.arena.root()?));
        Some((&node.key, &node.value))
    }

    /// Entry with the largest key.
    pub fn last(&self) -> Option<(&K, &V)> {
        let node = self.arena.node(self.arena.maximum(self.arena.root()?));
        Some((&node.key, &node.value))
    }

    /// In-order iterator over the entries.
    pub fn iter(&self) -> Iter<'_, K, V, B::Meta> {
        Iter::new(&self.arena)
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + ExactSizeIterator + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// Rebuilds the same entries under another balancing strategy.
    pub fn rebuild<B2: Balance>(self) -> BinarySearchTree<K, V, B2>
    where
        K: Ord,
    {
        self.into_iter().collect()
    }
}

impl<K: Ord, V, B: Balance> BinarySearchTree<K, V, B> {
    pub fn with_root(key: K, value: V) -> Self {
        let mut tree = Self::new();
        tree.add_or_update(key, value);
        tree
    }

    /// Inserts every key, in order, each bound to a clone of `value`.
    pub fn from_keys<I>(keys: I, value: V) -> Self
    where
        I: IntoIterator<Item = K>,
        V: Clone,
    {
        let mut tree = Self::new();
        for key in keys {
            tree.add_or_update(key, value.clone());
        }
        debug!("built tree of {} entries from keys", tree.len());
        tree
    }

    /// Inserts `keys[i] => values[i]` in order.
    ///
    /// Panics if the two lists differ in length; see [`Self::try_from_pairs`]
    /// for the checked version.
    pub fn from_pairs<KI, VI>(keys: KI, values: VI) -> Self
    where
        KI: IntoIterator<Item = K>,
        VI: IntoIterator<Item = V>,
    {
        match Self::try_from_pairs(keys, values) {
            Ok(tree) => tree,
            Err(e) => panic!("invalid tree construction: {e}"),
        }
    }

    pub fn try_from_pairs<KI, VI>(keys: KI, values: VI) -> Result<Self, TreeError>
    where
        KI: IntoIterator<Item = K>,
        VI: IntoIterator<Item = V>,
    {
        let keys: Vec<K> = keys.into_iter().collect();
        let values: Vec<V> = values.into_iter().collect();
        if keys.len() != values.len() {
            return Err(TreeError::LengthMismatch { keys: keys.len(), values: values.len() })
        }
        Ok(keys.into_iter().zip(values).collect())
    }

    /// Inserts `key`, or overwrites its value if it's already present.
    ///
    /// Returns the replaced value. Updating never changes the tree's shape.
    pub fn add_or_update(&mut self, key: K, value: V) -> Option<V> {
        self.place(key, value).1
    }

    /// Returns the node now holding `key`, and the value it replaced if it was already there.
    fn place(&mut self, key: K, value: V) -> (NodeId, Option<V>) {
        let under = match self.arena.locate(&key) {
            Slot::Occupied(id) => {
                let old = mem::replace(&mut self.arena.node_mut(id).value, value);
                return (id, Some(old))
            }
            Slot::Root => None,
            Slot::Vacant(parent, side) => Some((parent, side)),
        };
        let id = self.arena.attach(under, key, value, B::fresh_meta());
        B::after_insert(&mut self.arena, id);
        self.audit_mutation();
        (id, None)
    }

    /// Removes `key`, returning its value. Absent keys are a no-op.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let Some(mut id) = self.arena.search(key) else {
            debug!("remove: key not present, nothing to do");
            return None
        };

        // two children: trade places with the in-order successor, which has no left child
        if let (Some(_), Some(right)) = (self.arena.left(id), self.arena.right(id)) {
            let successor = self.arena.minimum(right);
            let (victim, next) = self.arena.pair_mut(id, successor);
            mem::swap(&mut victim.key, &mut next.key);
            mem::swap(&mut victim.value, &mut next.value);
            id = successor;
        }

        let replacement = self.arena.left(id).or(self.arena.right(id));
        let parent = self.arena.parent(id);
        self.arena.replace_child(parent, id, replacement);
        self.arena.set_parent(replacement, parent);
        let removed = self.arena.free(id);

        B::after_remove(&mut self.arena, Removal { meta: removed.meta, replacement, parent });
        self.audit_mutation();
        Some(removed.value)
    }

    pub fn find<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.arena.search(key).map(|id| &self.arena.node(id).value)
    }

    pub fn find_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.arena.search(key)?;
        Some(&mut self.arena.node_mut(id).value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.arena.search(key).is_some()
    }

    /// Audits key order, parent links, the tracked size, and the balancing
    /// strategy's own invariant.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let order = self.arena.in_order();
        if order.len() != self.arena.len() {
            return Err(InvariantViolation::SizeMismatch { tracked: self.arena.len(), counted: order.len() })
        }

        for (position, pair) in order.windows(2).enumerate() {
            if self.arena.node(pair[0]).key >= self.arena.node(pair[1]).key {
                return Err(InvariantViolation::OutOfOrder { position: position + 1 })
            }
        }

        for (position, &id) in order.iter().enumerate() {
            let linked = match self.arena.parent(id) {
                None => self.arena.root() == Some(id),
                Some(parent) => {
                    self.arena.left(parent) == Some(id) || self.arena.right(parent) == Some(id)
                }
            };
            if !linked {
                return Err(InvariantViolation::BrokenParentLink { position })
            }
        }

        B::check(&self.arena, &Audit::new(&order))
    }

    /// Full O(n) re-check after each mutation, only with the `audit` feature.
    #[cfg(feature = "audit")]
    fn audit_mutation(&self) {
        if let Err(e) = self.check_invariants() {
            panic!("tree invariant broken by the last mutation: {e}");
        }
    }

    #[cfg(not(feature = "audit"))]
    #[inline]
    fn audit_mutation(&self) {}
}

impl<K, V, B: Balance> Default for BinarySearchTree<K, V, B> {
    fn default() -> Self {
        Self::new()
    }
}

// deep copy: the arena owns every node, so cloning it clones the whole graph
impl<K: Clone, V: Clone, B: Balance> Clone for BinarySearchTree<K, V, B> {
    fn clone(&self) -> Self {
        Self {
            arena: self.arena.clone(),
            _balance: PhantomData,
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.arena.clone_from(&source.arena);
    }
}

impl<K: fmt::Debug, V: fmt::Debug, B: Balance> fmt::Debug for BinarySearchTree<K, V, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V, B: Balance> FromIterator<(K, V)> for BinarySearchTree<K, V, B> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord, V, B: Balance> Extend<(K, V)> for BinarySearchTree<K, V, B> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.add_or_update(key, value);
        }
    }
}
