use std::fmt::{self, Display, Write};

use super::arena::NodeId;
use super::{Balance, BinarySearchTree};


enum Step {
    Node(Option<NodeId>),
    Text(&'static str),
}

impl<K: Display, V, B: Balance> BinarySearchTree<K, V, B> {
    /// Writes the tree's shape in pre-order without recursing.
    ///
    /// A node is `token(left, right)`, a leaf is just `token` and an empty
    /// position is `.`. The token is the key, whatever `value` writes, and
    /// the strategy's tag (`[R]`/`[B]`, `[h<n>]`, or nothing).
    fn render<W: Write>(&self, out: &mut W, mut value: impl FnMut(&V, &mut W) -> fmt::Result) -> fmt::Result {
        let mut stack = vec![Step::Node(self.arena.root())];
        while let Some(step) = stack.pop() {
            let id = match step {
                Step::Text(text) => {
                    out.write_str(text)?;
                    continue
                }
                Step::Node(None) => {
                    out.write_char('.')?;
                    continue
                }
                Step::Node(Some(id)) => id,
            };

            let node = self.arena.node(id);
            write!(out, "{}", node.key)?;
            value(&node.value, out)?;
            B::meta_tag(&node.meta, out)?;

            if node.left.is_some() || node.right.is_some() {
                out.write_char('(')?;
                stack.push(Step::Text(")"));
                stack.push(Step::Node(node.right));
                stack.push(Step::Text(", "));
                stack.push(Step::Node(node.left));
            }
        }
        Ok(())
    }

    /// Deterministic dump of the tree's structure, keys and balancing
    /// metadata only. Works for any value type; same text as `Display`.
    pub fn shape_string(&self) -> String {
        self.to_string()
    }

    /// Like [`Self::shape_string`], optionally with values (`key=value`).
    /// Two trees with the same dump have the same shape, contents and
    /// balancing metadata.
    pub fn tree_string(&self, include_values: bool) -> String
    where
        V: Display,
    {
        if !include_values {
            return self.shape_string()
        }
        let mut out = String::new();
        let rendered = self.render(&mut out, |v, out| write!(out, "={v}"));
        debug_assert!(rendered.is_ok(), "writing to a String can't fail");
        out
    }
}

/// Prints the structural dump without values.
impl<K: Display, V, B: Balance> Display for BinarySearchTree<K, V, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, |_, _| Ok(()))
    }
}


#[cfg(test)]
mod tests {
    use crate::non_concurrent::bst::{AvlTree, PlainTree, RedBlackTree};

    #[test]
    fn empty_tree() {
        assert_eq!(PlainTree::<i32, i32>::new().tree_string(true), ".");
    }

    #[test]
    fn values_are_optional() {
        let tree = PlainTree::from_pairs([2, 1, 3], ["b", "a", "c"]);
        assert_eq!(tree.tree_string(false), "2(1, 3)");
        assert_eq!(tree.tree_string(true), "2=b(1=a, 3=c)");
    }

    #[test]
    fn missing_children_are_dots() {
        let tree = PlainTree::from_keys([1, 3, 2, 0], 'x');
        assert_eq!(tree.tree_string(true), "1=x(0=x, 3=x(2=x, .))");
    }

    #[test]
    fn strategy_tags() {
        let red_black = RedBlackTree::from_pairs([1, 2], [10, 20]);
        assert_eq!(red_black.tree_string(true), "1=10[B](., 2=20[R])");

        let avl = AvlTree::from_pairs([1, 2], [10, 20]);
        assert_eq!(avl.tree_string(true), "1=10[h2](., 2=20[h1])");
    }

    #[test]
    fn shape_needs_no_displayable_values() {
        let tree = RedBlackTree::<i32, ()>::from_keys([1, 2, 3], ());
        assert_eq!(tree.shape_string(), "2[B](1[R], 3[R])");
        assert_eq!(tree.shape_string(), tree.to_string());

        struct Opaque;
        let opaque = AvlTree::from_pairs([2, 1], [Opaque, Opaque]);
        assert_eq!(opaque.shape_string(), "2[h2](1[h1], .)");
    }

    #[test]
    fn stable_across_calls() {
        let tree = AvlTree::from_keys(0..50, ());
        assert_eq!(tree.to_string(), tree.to_string());
        assert_eq!(format!("{tree}"), tree.to_string());
    }

    #[test]
    fn deep_plain_tree_does_not_recurse() {
        // ascending keys make one long right spine
        let tree = PlainTree::from_keys(0..5000, ());
        assert_eq!(tree.height(), 5000);
        let dump = tree.to_string();
        assert!(dump.starts_with("0(., 1(., 2(., "));
        assert!(dump.ends_with(&format!("4998(., 4999{}", ")".repeat(4999))));
    }
}
