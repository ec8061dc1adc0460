use thiserror::Error;


/// Rejected construction input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("got {keys} keys but {values} values")]
    LengthMismatch { keys: usize, values: usize },
}

/// A broken structural invariant, reported by `check_invariants`.
///
/// Nodes are identified by their position in the in-order sequence, so the
/// report doesn't depend on how the arena happens to lay out its slots.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("keys are not strictly increasing at in-order position {position}")]
    OutOfOrder { position: usize },

    #[error("node at in-order position {position} disagrees with its parent link")]
    BrokenParentLink { position: usize },

    #[error("tree tracks {tracked} nodes but {counted} are reachable")]
    SizeMismatch { tracked: usize, counted: usize },

    #[error("root is red")]
    RedRoot,

    #[error("red node at in-order position {position} has a red child")]
    RedChildOfRed { position: usize },

    #[error("black height differs below in-order position {position} ({left} vs {right})")]
    BlackHeightMismatch { position: usize, left: usize, right: usize },

    #[error("node at in-order position {position} stores height {stored}, expected {computed}")]
    StaleHeight { position: usize, stored: i32, computed: i32 },

    #[error("node at in-order position {position} has balance factor {factor}")]
    Unbalanced { position: usize, factor: i32 },
}
