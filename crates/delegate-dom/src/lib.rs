//! Delegate DOM - Document Object Model host
//!
//! Arena DOM tree with shadow roots, selector matching and a window that
//! owns native event listeners. This is the host the delegation layer runs on.

mod node;
mod tree;
mod document;
mod operations;
mod selector;
mod element;
mod shadow;
mod events;
mod window;

pub use node::{Node, NodeData, NodeType, ElementData, ShadowRootData};
pub use tree::DomTree;
pub use document::{Document, ReadyState};
pub use operations::{DomError, DomResult};
pub use selector::{SelectorList, SelectorError};
pub use element::ElementQuery;
pub use shadow::ShadowRootMode;
pub use events::{EventTarget, ListenerOptions, NativeEvent};
pub use window::{native_listener, HostCapabilities, NativeListener, Window};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID (the document)
    pub const ROOT: NodeId = NodeId(0);

    /// Raw arena index
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
