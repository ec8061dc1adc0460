use std::fmt;

use super::arena::{Arena, NodeId};
use crate::error::InvariantViolation;


/// What a structural removal left behind, handed to [`Balance::after_remove`].
#[derive(Debug, Clone)]
pub struct Removal<M> {
    /// Metadata of the node that was physically unlinked.
    pub meta: M,
    /// The node that moved into the vacated position, if any.
    pub replacement: Option<NodeId>,
    /// Parent of the vacated position (`None` if it was the root).
    pub parent: Option<NodeId>,
}

/// Maps arena nodes to their in-order position, for error reports.
pub struct Audit {
    positions: Vec<usize>,
}

impl Audit {
    /// `order` is the tree's in-order node sequence.
    pub(crate) fn new(order: &[NodeId]) -> Self {
        let slots = order.iter().map(|id| id.index() + 1).max().unwrap_or(0);
        let mut positions = vec![usize::MAX; slots];
        for (position, id) in order.iter().enumerate() {
            positions[id.index()] = position;
        }
        Self { positions }
    }

    /// In-order position of `id`, or `usize::MAX` for a node that isn't in the tree.
    pub fn position(&self, id: NodeId) -> usize {
        self.positions.get(id.index()).copied().unwrap_or(usize::MAX)
    }
}

/// A balancing strategy, run by the tree after every structural change.
///
/// The tree performs the plain BST placement or unlinking and then hands the
/// affected spot to the strategy, which restores its own invariant through
/// rotations and metadata updates.
pub trait Balance {
    /// Per-node bookkeeping (color, height, ...).
    type Meta: Clone + fmt::Debug;

    fn fresh_meta() -> Self::Meta;

    /// Called once a brand new node has been linked in. Not called for updates.
    fn after_insert<K, V>(arena: &mut Arena<K, V, Self::Meta>, inserted: NodeId);

    /// Called once a node has been unlinked and freed.
    fn after_remove<K, V>(arena: &mut Arena<K, V, Self::Meta>, removal: Removal<Self::Meta>);

    /// Audits the strategy's own invariant over the whole tree.
    fn check<K, V>(arena: &Arena<K, V, Self::Meta>, audit: &Audit) -> Result<(), InvariantViolation>;

    /// Short tag appended to a node in the textual dump.
    fn meta_tag(meta: &Self::Meta, f: &mut dyn fmt::Write) -> fmt::Result;
}

/// No balancing at all: a plain binary search tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbalanced;

impl Balance for Unbalanced {
    type Meta = ();

    fn fresh_meta() {}

    fn after_insert<K, V>(_: &mut Arena<K, V, ()>, _: NodeId) {}

    fn after_remove<K, V>(_: &mut Arena<K, V, ()>, _: Removal<()>) {}

    fn check<K, V>(_: &Arena<K, V, ()>, _: &Audit) -> Result<(), InvariantViolation> {
        Ok(())
    }

    fn meta_tag(_: &(), _: &mut dyn fmt::Write) -> fmt::Result {
        Ok(())
    }
}
