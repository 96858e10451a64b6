//! Error types for content stores

use crate::node::NodeKind;
use crate::path::PathError;

/// Errors reported by a [`ResourceStore`](crate::ResourceStore)
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Malformed path
    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),

    /// Parent of a node to create does not exist
    #[error("parent of '{path}' does not exist")]
    ParentMissing { path: String },

    /// Node already exists
    #[error("node already exists: {path}")]
    AlreadyExists { path: String },

    /// Node does not exist
    #[error("node not found: {path}")]
    NotFound { path: String },

    /// The root node cannot be created or modified
    #[error("the root node is read-only")]
    RootReadOnly,

    /// `jcr:primaryType` names an unknown node kind
    #[error("unknown primary type '{primary_type}' for {path}")]
    UnknownPrimaryType { path: String, primary_type: String },

    /// `jcr:primaryType` is present but not a string
    #[error("primary type of {path} must be a string, got {actual}")]
    PrimaryTypeNotString { path: String, actual: &'static str },

    /// Node type constraint rejected a child
    #[error("{parent_kind} at {parent} does not accept {child_kind} child '{child}'")]
    ConstraintViolation {
        parent: String,
        parent_kind: NodeKind,
        child: String,
        child_kind: NodeKind,
    },

    /// Node exists with a different kind than required
    #[error("expected {expected} at {path}, found {actual}")]
    KindMismatch {
        path: String,
        expected: NodeKind,
        actual: NodeKind,
    },

    /// Page creation request rejected
    #[error("invalid page request: {0}")]
    InvalidPage(String),

    /// Store has been closed
    #[error("store is closed")]
    Closed,
}

impl StoreError {
    /// Check if the error means the store can no longer be used
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}
