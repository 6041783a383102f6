use thiserror::Error;

use crate::document::{NodeId, NodeKind};

/// Core error types for deps-gradle.
///
/// Raised by [`ScriptDocument`](crate::ScriptDocument) implementations when a
/// write cannot be applied to the tree. Reads never fail; they return `None`
/// for nodes that are missing or of the wrong kind.
///
/// # Examples
///
/// ```
/// use deps_core::error::{DepsError, Result};
/// use deps_core::{NodeKind, ScriptDocument, ScriptTree, Slot};
///
/// fn rename(tree: &mut ScriptTree) -> Result<()> {
///     let node = tree.insert_reference(Slot::list("implementation"), "libs.guava")?;
///     // References carry no literal text, so this write is rejected
///     tree.set_literal(node, "com.google.guava:guava:18.0")
/// }
///
/// let mut tree = ScriptTree::new();
/// assert!(matches!(
///     rename(&mut tree),
///     Err(DepsError::NodeKindMismatch { expected: NodeKind::Literal, .. })
/// ));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DepsError {
    #[error("node {0} does not exist in the document")]
    UnknownNode(NodeId),

    #[error("node {node} is a {actual} expression, expected {expected}")]
    NodeKindMismatch {
        node: NodeId,
        expected: NodeKind,
        actual: NodeKind,
    },

    #[error("node {argument} is not an argument of call {call}")]
    NotAnArgument { call: NodeId, argument: NodeId },
}

/// Convenience type alias for `Result<T, DepsError>`.
pub type Result<T> = std::result::Result<T, DepsError>;

impl DepsError {
    /// Create a kind mismatch error.
    pub fn kind_mismatch(node: NodeId, expected: NodeKind, actual: NodeKind) -> Self {
        Self::NodeKindMismatch {
            node,
            expected,
            actual,
        }
    }
}
