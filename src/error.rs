//! Error types for tree models and accessors.

use crate::document::model::NodeId;

/// Errors raised by structural operations on a tree model.
///
/// Lookups and navigation never produce these; they return `Option` or a
/// default instead. A `TreeError` means the caller asked for something the
/// node cannot do (pushing onto an object, removing the root, ...).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TreeError {
    /// No node with this id exists in the tree.
    #[error("Unknown node '{0}'")]
    UnknownNode(NodeId),

    /// An array operation was requested on a node that is not an array.
    #[error("Node '{0}' is not an array")]
    NotAnArray(NodeId),

    /// An object operation was requested on a node that is not an object.
    #[error("Node '{0}' is not an object")]
    NotAnObject(NodeId),

    /// A value operation was requested on a container node.
    #[error("Node '{0}' is not a primitive")]
    NotAPrimitive(NodeId),

    /// Index outside of the container bounds.
    #[error("Index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Cannot remove the root node")]
    CannotRemoveRoot,

    /// The model refuses to remove this node (e.g. an array's item schema).
    #[error("Node '{0}' cannot be removed")]
    CannotRemove(NodeId),

    /// A sibling with this name already exists.
    #[error("A field named '{0}' already exists")]
    DuplicateName(String),

    /// The model does not support the requested mutation.
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),

    /// Formula text was rejected by the schema model.
    #[error("{0}")]
    Formula(String),

    /// A schema document could not be turned into a schema tree.
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// The accessor outlived the editor tree that created it.
    #[error("Accessor is detached from its tree")]
    Detached,
}

impl TreeError {
    pub fn out_of_bounds(index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds { index, len }
    }
}

pub type Result<T> = std::result::Result<T, TreeError>;
