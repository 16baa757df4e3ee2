//! Shadow DOM
//!
//! Shadow roots, event retargeting and the composed propagation path.

use crate::{DomError, DomResult, DomTree, EventTarget, Node, NodeId};

/// Shadow root mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadowRootMode {
    #[default]
    Open,
    Closed,
}

impl DomTree {
    /// Attach a shadow root to an element
    pub fn attach_shadow(&mut self, host: NodeId, mode: ShadowRootMode) -> DomResult<NodeId> {
        let element = self.get(host)
            .ok_or(DomError::NotFound(host))?
            .as_element()
            .ok_or(DomError::NotAnElement(host))?;
        if element.shadow_root.is_some() {
            return Err(DomError::ShadowRootExists(host));
        }

        let root = self.push(Node::shadow_root(host, mode));
        if let Some(element) = self.get_mut(host).and_then(Node::as_element_mut) {
            element.shadow_root = Some(root);
        }
        tracing::debug!("Attached {:?} shadow root {} to {}", mode, root, host);
        Ok(root)
    }

    /// Shadow root of `host`, visible only when open
    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        let root = self.get(host)?.as_element()?.shadow_root?;
        match self.get(root)?.as_shadow_root()?.mode {
            ShadowRootMode::Open => Some(root),
            ShadowRootMode::Closed => None,
        }
    }

    /// Host element of a shadow root
    pub fn host_of(&self, root: NodeId) -> Option<NodeId> {
        self.get(root)?.as_shadow_root().map(|s| s.host)
    }

    /// Root of the tree containing `id` (the document, a shadow root or a
    /// detached subtree root)
    pub fn root_node(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent_node(current) {
            current = parent;
        }
        current
    }

    /// Whether `id` lives inside a closed shadow tree at any nesting level
    fn hidden_by_closed_root(&self, id: NodeId) -> bool {
        let mut root = self.root_node(id);
        while let Some(node) = self.get(root) {
            let Some(data) = node.as_shadow_root() else {
                return false;
            };
            if data.mode == ShadowRootMode::Closed {
                return true;
            }
            root = self.root_node(data.host);
        }
        false
    }

    /// Retarget `origin` as seen from the document: the outermost shadow host
    /// enclosing it, or the origin itself when it lives in the light tree.
    pub fn retarget(&self, origin: NodeId) -> NodeId {
        let mut target = origin;
        while let Some(host) = self.host_of(self.root_node(target)) {
            target = host;
        }
        target
    }

    /// Composed propagation path from `origin` outwards, as observed by a
    /// listener on the document. Shadow roots and hosts are included; nodes
    /// inside closed shadow trees are hidden. Ends with the window when the
    /// origin is connected to the document.
    pub fn composed_path(&self, origin: NodeId) -> Vec<EventTarget> {
        let mut path = Vec::new();
        let mut cursor = self.get(origin).map(|_| origin);
        let mut last = origin;
        while let Some(id) = cursor {
            if !self.hidden_by_closed_root(id) {
                path.push(EventTarget::Node(id));
            }
            last = id;
            cursor = self.parent_node(id).or_else(|| self.host_of(id));
        }
        if last == NodeId::ROOT {
            path.push(EventTarget::Window);
        }
        path
    }
}
