//! Ancestor Matcher
//!
//! "Closest ancestor matching a selector". Hosts normally provide it as
//! `closest`; older hosts only have `matches`, so a fallback walk is kept
//! here. The choice is made once from the host capabilities.

use std::rc::Rc;

use delegate_dom::{DomTree, ElementQuery, HostCapabilities, NodeId, SelectorList};

/// Nearest inclusive ancestor satisfying a selector
pub trait AncestorMatcher {
    fn closest(&self, tree: &DomTree, node: NodeId, selector: &SelectorList) -> Option<NodeId>;
}

/// Uses the host's native `closest`
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeClosest;

impl AncestorMatcher for NativeClosest {
    fn closest(&self, tree: &DomTree, node: NodeId, selector: &SelectorList) -> Option<NodeId> {
        tree.closest(node, selector)
    }
}

/// Fallback walk built on `matches` alone
#[derive(Debug, Clone, Copy, Default)]
pub struct PolyfillClosest;

impl AncestorMatcher for PolyfillClosest {
    fn closest(&self, tree: &DomTree, node: NodeId, selector: &SelectorList) -> Option<NodeId> {
        closest_matching(tree, node, selector)
    }
}

/// Test `node`, then its element parent (or plain parent), until a node has
/// no parent or is not an element.
pub fn closest_matching(tree: &DomTree, node: NodeId, selector: &SelectorList) -> Option<NodeId> {
    let mut current = node;
    loop {
        if tree.matches(current, selector) {
            return Some(current);
        }
        let next = tree
            .parent_element(current)
            .or_else(|| tree.parent_node(current));
        match next {
            Some(parent) if tree.is_element(parent) => current = parent,
            _ => return None,
        }
    }
}

/// Pick the matcher for a host
pub fn matcher_for(capabilities: &HostCapabilities) -> Rc<dyn AncestorMatcher> {
    if capabilities.native_closest {
        Rc::new(NativeClosest)
    } else {
        tracing::debug!("Host lacks closest(), using fallback ancestor walk");
        Rc::new(PolyfillClosest)
    }
}
