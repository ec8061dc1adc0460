use std::fmt;

use log::trace;

use super::arena::{Arena, NodeId, Side};
use super::balance::{Audit, Balance, Removal};
use crate::error::InvariantViolation;


/// AVL balancing: the heights of a node's two subtrees differ by at most one.
///
/// Each node stores the height of its subtree, counting a leaf as 1 and an
/// empty child as 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct Avl;

fn height<K, V>(arena: &Arena<K, V, i32>, id: Option<NodeId>) -> i32 {
    id.map_or(0, |id| *arena.meta(id))
}

fn update_height<K, V>(arena: &mut Arena<K, V, i32>, id: NodeId) -> i32 {
    let h = 1 + height(arena, arena.left(id)).max(height(arena, arena.right(id)));
    *arena.meta_mut(id) = h;
    h
}

/// Left height minus right height.
fn balance_factor<K, V>(arena: &Arena<K, V, i32>, id: NodeId) -> i32 {
    height(arena, arena.left(id)) - height(arena, arena.right(id))
}

/// Rotation plus height bookkeeping for the two nodes that moved.
fn rotate<K, V>(arena: &mut Arena<K, V, i32>, pivot: NodeId, side: Side) -> NodeId {
    let riser = arena.rotate(pivot, side);
    // the pivot is now below the riser, so it goes first
    update_height(arena, pivot);
    update_height(arena, riser);
    riser
}

/// Fixes `id` if it is out of balance, returning the root of its subtree afterwards.
fn rebalance<K, V>(arena: &mut Arena<K, V, i32>, id: NodeId) -> NodeId {
    let factor = balance_factor(arena, id);
    let heavy = match factor {
        2.. => Side::Left,
        ..=-2 => Side::Right,
        _ => return id,
    };
    let child = arena.child(id, heavy).expect("the heavy side of an unbalanced node is never empty");

    // left-right / right-left: turn the child's inner grandchild into an outer one first
    let inner = height(arena, arena.child(child, heavy.opposite()));
    let outer = height(arena, arena.child(child, heavy));
    if inner > outer {
        trace!("rebalancing {id}: {heavy}-{} case", heavy.opposite());
        rotate(arena, child, heavy);
    } else {
        trace!("rebalancing {id}: {heavy}-{heavy} case");
    }
    rotate(arena, id, heavy.opposite())
}

impl Balance for Avl {
    type Meta = i32;

    fn fresh_meta() -> i32 {
        1
    }

    fn after_insert<K, V>(arena: &mut Arena<K, V, i32>, inserted: NodeId) {
        let mut cursor = arena.parent(inserted);
        while let Some(id) = cursor {
            update_height(arena, id);
            if balance_factor(arena, id).abs() > 1 {
                // one rotation restores the height this subtree had before the insert
                rebalance(arena, id);
                break
            }
            cursor = arena.parent(id);
        }
    }

    fn after_remove<K, V>(arena: &mut Arena<K, V, i32>, removal: Removal<i32>) {
        // unlike insertion, every ancestor may need its own rotation
        let mut cursor = removal.parent;
        while let Some(id) = cursor {
            update_height(arena, id);
            let top = rebalance(arena, id);
            cursor = arena.parent(top);
        }
    }

    fn check<K, V>(arena: &Arena<K, V, i32>, audit: &Audit) -> Result<(), InvariantViolation> {
        // children come before parents in post-order, so stored child heights are verified first
        for id in post_order(arena) {
            let position = audit.position(id);
            let stored = *arena.meta(id);
            let computed = 1 + height(arena, arena.left(id)).max(height(arena, arena.right(id)));
            if stored != computed {
                return Err(InvariantViolation::StaleHeight { position, stored, computed })
            }
            let factor = balance_factor(arena, id);
            if factor.abs() > 1 {
                return Err(InvariantViolation::Unbalanced { position, factor })
            }
        }
        Ok(())
    }

    fn meta_tag(meta: &i32, f: &mut dyn fmt::Write) -> fmt::Result {
        write!(f, "[h{meta}]")
    }
}

fn post_order<K, V, M>(arena: &Arena<K, V, M>) -> Vec<NodeId> {
    // reversed (node, right, left) pre-order is (left, right, node) post-order
    let mut out = Vec::with_capacity(arena.len());
    let mut stack: Vec<NodeId> = arena.root().into_iter().collect();
    while let Some(id) = stack.pop() {
        out.push(id);
        stack.extend(arena.left(id));
        stack.extend(arena.right(id));
    }
    out.reverse();
    out
}
