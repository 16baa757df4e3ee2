//! Element Query and Methods
//!
//! querySelector, querySelectorAll, closest, matches.

use crate::{DomTree, NodeId, SelectorList};

/// Element query trait
pub trait ElementQuery {
    /// Check if element matches selector
    fn matches(&self, element: NodeId, selector: &SelectorList) -> bool;

    /// Find closest inclusive ancestor matching selector (host `closest`)
    fn closest(&self, element: NodeId, selector: &SelectorList) -> Option<NodeId>;

    /// First element below `root` matching selector, in tree order
    fn query_selector(&self, root: NodeId, selector: &SelectorList) -> Option<NodeId>;

    /// All elements below `root` matching selector, in tree order
    fn query_selector_all(&self, root: NodeId, selector: &SelectorList) -> Vec<NodeId>;
}

impl ElementQuery for DomTree {
    fn matches(&self, element: NodeId, selector: &SelectorList) -> bool {
        selector.matches(self, element)
    }

    fn closest(&self, element: NodeId, selector: &SelectorList) -> Option<NodeId> {
        // Character data starts the search at its parent element
        let mut cursor = if self.is_element(element) {
            Some(element)
        } else {
            self.parent_element(element)
        };
        while let Some(id) = cursor {
            if selector.matches(self, id) {
                return Some(id);
            }
            cursor = self.parent_element(id);
        }
        None
    }

    fn query_selector(&self, root: NodeId, selector: &SelectorList) -> Option<NodeId> {
        self.descendants(root).into_iter().find(|&id| selector.matches(self, id))
    }

    fn query_selector_all(&self, root: NodeId, selector: &SelectorList) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&id| selector.matches(self, id))
            .collect()
    }
}
