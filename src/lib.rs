#![deny(unsafe_code)]

pub mod error;
pub mod logging;

// not concurrent
pub mod non_concurrent;

pub use error::{InvariantViolation, TreeError};
pub use non_concurrent::bst::{
    Avl, AvlTree, Balance, BinarySearchTree, Color, PlainTree, RedBlack, RedBlackTree, Unbalanced,
};
