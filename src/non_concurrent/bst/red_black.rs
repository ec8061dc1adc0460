// PROVE: any node with height `h` has black height at least `h/2`
// PROVE: the subtree located at any node `x` contains at least `2^bh(x) - 1` nodes (use induction)
// LEMMA: An RBTree with `n` internal nodes has height at most `2*log₂(n+1)`

use std::fmt;

use log::trace;

use super::arena::{Arena, NodeId, Side};
use super::balance::{Audit, Balance, Removal};
use crate::error::InvariantViolation;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

/// Red-black balancing.
///
/// Requirements:
/// 1. The root is black (empty children count as black leaves)
/// 2. A red node does not have a red child
/// 3. Every path from a node down to an empty child has the same number of black nodes
#[derive(Debug, Clone, Copy, Default)]
pub struct RedBlack;

fn color<K, V>(arena: &Arena<K, V, Color>, id: Option<NodeId>) -> Color {
    id.map_or(Color::Black, |id| *arena.meta(id))
}

fn paint<K, V>(arena: &mut Arena<K, V, Color>, id: Option<NodeId>, color: Color) {
    if let Some(id) = id {
        *arena.meta_mut(id) = color;
    }
}

impl Balance for RedBlack {
    type Meta = Color;

    fn fresh_meta() -> Color {
        Color::Red
    }

    fn after_insert<K, V>(arena: &mut Arena<K, V, Color>, inserted: NodeId) {
        let mut node = inserted;
        loop {
            let Some(parent) = arena.parent(node) else { break };
            if *arena.meta(parent) == Color::Black {
                break
            }
            let grandparent = arena.parent(parent).expect("a red parent is never the root");
            let side = arena.side_of(grandparent, Some(parent));
            let uncle = arena.child(grandparent, side.opposite());

            if color(arena, uncle) == Color::Red {
                trace!("insert fixup at {node}: red uncle, recoloring");
                paint(arena, Some(parent), Color::Black);
                paint(arena, uncle, Color::Black);
                paint(arena, Some(grandparent), Color::Red);
                node = grandparent;
                continue
            }

            // zig-zag: straighten it out first so `node` and its parent line up with the grandparent
            let mut parent = parent;
            if arena.child(parent, side.opposite()) == Some(node) {
                trace!("insert fixup at {node}: zig-zag");
                arena.rotate(parent, side);
                node = parent;
                parent = arena.parent(node).expect("rotation leaves the old child above");
            }

            trace!("insert fixup at {node}: zig-zig");
            paint(arena, Some(parent), Color::Black);
            paint(arena, Some(grandparent), Color::Red);
            arena.rotate(grandparent, side.opposite());
            break
        }
        paint(arena, arena.root(), Color::Black);
    }

    fn after_remove<K, V>(arena: &mut Arena<K, V, Color>, removal: Removal<Color>) {
        // removing a red node never changes any black height
        if removal.meta == Color::Red {
            return
        }

        // `node` carries an extra black until we can get rid of it
        let mut node = removal.replacement;
        let mut parent = removal.parent;
        while color(arena, node) == Color::Black {
            let Some(p) = parent else { break };
            let side = arena.side_of(p, node);
            let mut sibling = arena.child(p, side.opposite())
                .expect("a doubly black position always has a sibling");

            if *arena.meta(sibling) == Color::Red {
                trace!("remove fixup below {p}: red sibling");
                paint(arena, Some(sibling), Color::Black);
                paint(arena, Some(p), Color::Red);
                arena.rotate(p, side);
                sibling = arena.child(p, side.opposite())
                    .expect("a doubly black position always has a sibling");
            }

            let near = arena.child(sibling, side);
            let far = arena.child(sibling, side.opposite());
            if color(arena, near) == Color::Black && color(arena, far) == Color::Black {
                trace!("remove fixup below {p}: black sibling with black children, moving up");
                paint(arena, Some(sibling), Color::Red);
                node = Some(p);
                parent = arena.parent(p);
                continue
            }

            if color(arena, far) == Color::Black {
                trace!("remove fixup below {p}: near red nephew");
                paint(arena, near, Color::Black);
                paint(arena, Some(sibling), Color::Red);
                arena.rotate(sibling, side.opposite());
                sibling = arena.child(p, side.opposite())
                    .expect("the near nephew rose into the sibling position");
            }

            trace!("remove fixup below {p}: far red nephew");
            let parent_color = *arena.meta(p);
            paint(arena, Some(sibling), parent_color);
            paint(arena, Some(p), Color::Black);
            paint(arena, arena.child(sibling, side.opposite()), Color::Black);
            arena.rotate(p, side);
            node = arena.root();
            break
        }
        paint(arena, node, Color::Black);
    }

    fn check<K, V>(arena: &Arena<K, V, Color>, audit: &Audit) -> Result<(), InvariantViolation> {
        let Some(root) = arena.root() else { return Ok(()) };
        if *arena.meta(root) == Color::Red {
            return Err(InvariantViolation::RedRoot)
        }
        black_height(arena, Some(root), audit).map(|_| ())
    }

    fn meta_tag(meta: &Color, f: &mut dyn fmt::Write) -> fmt::Result {
        f.write_str(match meta {
            Color::Red => "[R]",
            Color::Black => "[B]",
        })
    }
}

/// Black nodes on every path from `id` down to an empty child, empty child included.
fn black_height<K, V>(arena: &Arena<K, V, Color>, id: Option<NodeId>, audit: &Audit) -> Result<usize, InvariantViolation> {
    let Some(id) = id else { return Ok(1) };
    let position = audit.position(id);
    let own = *arena.meta(id);
    let (left, right) = (arena.left(id), arena.right(id));

    if own == Color::Red && (color(arena, left) == Color::Red || color(arena, right) == Color::Red) {
        return Err(InvariantViolation::RedChildOfRed { position })
    }

    let left = black_height(arena, left, audit)?;
    let right = black_height(arena, right, audit)?;
    if left != right {
        return Err(InvariantViolation::BlackHeightMismatch { position, left, right })
    }
    Ok(left + usize::from(own == Color::Black))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::non_concurrent::bst::RedBlackTree;

    fn colors(tree: &RedBlackTree<i32, ()>) -> Vec<(i32, Color)> {
        tree.arena.in_order().into_iter()
            .map(|id| (tree.arena.node(id).key, *tree.arena.meta(id)))
            .collect()
    }

    #[test]
    fn new_root_is_black() {
        let tree = RedBlackTree::with_root(1, ());
        assert_eq!(colors(&tree), [(1, Color::Black)]);
    }

    #[test]
    fn red_uncle_recolors() {
        let mut tree = RedBlackTree::from_keys([2, 1, 3], ());
        assert_eq!(tree.to_string(), "2[B](1[R], 3[R])");

        // both 1 and 3 are red, so inserting below them only recolors
        tree.add_or_update(4, ());
        assert_eq!(tree.to_string(), "2[B](1[B], 3[B](., 4[R]))");
        tree.check_invariants().unwrap();
    }

    #[test]
    fn straight_line_rotates_once() {
        let tree = RedBlackTree::from_keys([1, 2, 3], ());
        assert_eq!(tree.to_string(), "2[B](1[R], 3[R])");
    }

    #[test]
    fn zig_zag_rotates_twice() {
        let tree = RedBlackTree::from_keys([3, 1, 2], ());
        assert_eq!(tree.to_string(), "2[B](1[R], 3[R])");
        let tree = RedBlackTree::from_keys([1, 3, 2], ());
        assert_eq!(tree.to_string(), "2[B](1[R], 3[R])");
    }

    #[test]
    fn remove_root_of_three() {
        let mut tree = RedBlackTree::from_keys([2, 1, 3], ());
        tree.remove(&2);

        tree.check_invariants().unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.keys().copied().collect::<Vec<_>>(), [1, 3]);
        // the successor took the root's place, the remaining red child stays red below it
        assert_eq!(tree.to_string(), "3[B](1[R], .)");
    }

    #[test]
    fn remove_leaves_of_three() {
        let mut tree = RedBlackTree::from_keys([2, 1, 3], ());
        tree.remove(&1);
        tree.remove(&3);
        assert_eq!(tree.to_string(), "2[B]");
        tree.remove(&2);
        assert!(tree.is_empty());
        assert_eq!(tree.to_string(), ".");
    }

    #[test]
    fn remove_black_leaf_with_red_sibling() {
        // 2B(1B, 4R(3B, 5B))
        let mut tree = RedBlackTree::from_keys([2, 1, 4, 3, 5, 6], ());
        tree.remove(&6);
        assert_eq!(tree.to_string(), "2[B](1[B], 4[R](3[B], 5[B]))");

        tree.remove(&1);
        tree.check_invariants().unwrap();
        assert_eq!(tree.keys().copied().collect::<Vec<_>>(), [2, 3, 4, 5]);
        assert_eq!(tree.to_string(), "4[B](2[B](., 3[R]), 5[B])");
    }

    #[test]
    fn remove_black_leaf_with_far_red_nephew() {
        // 2B(1B, 3B(., 4R))
        let mut tree = RedBlackTree::from_keys([2, 1, 3, 4], ());
        tree.remove(&1);
        tree.check_invariants().unwrap();
        assert_eq!(tree.to_string(), "3[B](2[B], 4[B])");
    }

    #[test]
    fn remove_black_leaf_with_near_red_nephew() {
        // 2B(1B, 4B(3R, .))
        let mut tree = RedBlackTree::from_keys([2, 1, 4, 3], ());
        assert_eq!(tree.to_string(), "2[B](1[B], 4[B](3[R], .))");
        tree.remove(&1);
        tree.check_invariants().unwrap();
        assert_eq!(tree.to_string(), "3[B](2[B], 4[B])");
    }

    #[test]
    fn remove_black_leaf_with_black_sibling_moves_up() {
        let mut tree = RedBlackTree::from_keys([2, 1, 3, 4], ());
        tree.remove(&4);
        assert_eq!(tree.to_string(), "2[B](1[B], 3[B])");
        tree.remove(&1);
        tree.check_invariants().unwrap();
        assert_eq!(tree.to_string(), "2[B](., 3[R])");
    }

    #[test]
    fn ascending_inserts_stay_shallow() {
        let tree = RedBlackTree::from_keys(0..1000, ());
        tree.check_invariants().unwrap();
        // 2*log2(n+1) bound
        assert!(tree.height() <= 20, "height was {}", tree.height());
    }

    #[test]
    fn audit_catches_broken_coloring() {
        let mut tree = RedBlackTree::from_keys([2, 1, 3], ());
        let root = tree.arena.root().unwrap();
        *tree.arena.meta_mut(root) = Color::Red;
        assert_eq!(tree.check_invariants(), Err(InvariantViolation::RedRoot));

        *tree.arena.meta_mut(root) = Color::Black;
        let left = tree.arena.left(root).unwrap();
        *tree.arena.meta_mut(left) = Color::Black;
        assert_eq!(
            tree.check_invariants(),
            Err(InvariantViolation::BlackHeightMismatch { position: 1, left: 2, right: 1 })
        );
    }
}
