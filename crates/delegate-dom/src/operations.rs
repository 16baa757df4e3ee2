//! DOM Node Operations
//!
//! Errors raised by tree mutation: appendChild, attachShadow.

use crate::NodeId;

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Node not found
    #[error("Node not found: {0}")]
    NotFound(NodeId),

    /// Hierarchy error (e.g., inserting an ancestor into its descendant)
    #[error("Hierarchy request error")]
    HierarchyRequest,

    /// Node type cannot take part in this operation
    #[error("Invalid node type")]
    InvalidNodeType,

    /// Operation requires an element
    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),

    /// attachShadow on an element that already hosts a shadow root
    #[error("Element {0} already has a shadow root")]
    ShadowRootExists(NodeId),
}
