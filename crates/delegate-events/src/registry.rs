//! Registry
//!
//! Per event type table from handle to registration. Handles come from a
//! monotonic counter and are never reused within a registry, so a stale
//! handle can never remove a newer registration.

use std::collections::BTreeMap;
use std::rc::Rc;

use delegate_dom::{Document, NodeId, SelectorError, SelectorList};

use crate::DelegatedEvent;

/// Delegated callback: the event and the element that matched
pub type Callback = Rc<dyn Fn(&mut DelegatedEvent<'_>, NodeId)>;

/// Selector strings that would match globally and are refused
const RESERVED_SELECTORS: [&str; 4] = ["*", "window", "document", "document.documentElement"];

/// Registration handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(pub u64);

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registration target exactly as the caller passed it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Element(NodeId),
    Selector(String),
    Window,
    Document,
}

impl From<NodeId> for Target {
    fn from(id: NodeId) -> Self {
        Target::Element(id)
    }
}

impl From<&str> for Target {
    fn from(selector: &str) -> Self {
        Target::Selector(selector.to_string())
    }
}

impl From<String> for Target {
    fn from(selector: String) -> Self {
        Target::Selector(selector)
    }
}

impl From<&SelectorList> for Target {
    fn from(selector: &SelectorList) -> Self {
        Target::Selector(selector.as_str().to_string())
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Element(id) => write!(f, "element {id}"),
            Target::Selector(s) => f.write_str(s),
            Target::Window => f.write_str("window"),
            Target::Document => f.write_str("document"),
        }
    }
}

/// Normalized target, decided once at registration time
#[derive(Debug, Clone, PartialEq)]
pub enum TargetDescriptor {
    Element(NodeId),
    Selector { text: String, parsed: SelectorList },
}

impl TargetDescriptor {
    /// Validate and normalize a caller target against `document`
    pub fn resolve(target: &Target, document: &Document) -> Result<Self, RegisterError> {
        match target {
            Target::Window | Target::Document => Err(RegisterError::ReservedTarget(target.to_string())),
            Target::Element(id) => {
                let id = *id;
                if id == document.node() || id == document.document_element() {
                    return Err(RegisterError::ReservedTarget(target.to_string()));
                }
                match document.tree().get(id) {
                    None => Err(RegisterError::UnknownNode(id)),
                    Some(node) if !node.is_element() => Err(RegisterError::NotAnElement(id)),
                    Some(_) => Ok(TargetDescriptor::Element(id)),
                }
            }
            Target::Selector(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Err(RegisterError::EmptySelector);
                }
                if RESERVED_SELECTORS.contains(&trimmed) {
                    return Err(RegisterError::ReservedTarget(trimmed.to_string()));
                }
                let parsed = SelectorList::parse(text)?;
                Ok(TargetDescriptor::Selector { text: text.clone(), parsed })
            }
        }
    }
}

/// Registration rejection reasons
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegisterError {
    #[error("Empty selector")]
    EmptySelector,

    #[error("Reserved target: {0}")]
    ReservedTarget(String),

    #[error("Unknown node {0}")]
    UnknownNode(NodeId),

    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),

    #[error("Invalid selector: {0}")]
    InvalidSelector(#[from] SelectorError),
}

/// One delegated registration
#[derive(Clone)]
pub struct Registration {
    /// Normalized target used for matching
    pub target: TargetDescriptor,
    /// Target as the caller gave it, exposed on the event as `selector`
    pub origin: Target,
    pub callback: Callback,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("target", &self.target)
            .field("origin", &self.origin)
            .finish()
    }
}

/// Result of a successful registration
#[derive(Clone)]
pub struct Subscription<C = Callback> {
    pub callback: C,
    pub handle: Handle,
}

impl<C> std::fmt::Debug for Subscription<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("handle", &self.handle).finish()
    }
}

/// Handle-keyed table for one event type
#[derive(Debug)]
pub struct Registry<T> {
    installed: bool,
    next_handle: u64,
    entries: BTreeMap<Handle, T>,
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self {
            installed: false,
            next_handle: 0,
            entries: BTreeMap::new(),
        }
    }

    /// Store an entry under the next handle
    pub fn insert(&mut self, entry: T) -> Handle {
        let handle = Handle(self.next_handle);
        self.next_handle += 1;
        self.entries.insert(handle, entry);
        handle
    }

    /// Delete an entry. False when the handle is not live.
    pub fn remove(&mut self, handle: Handle) -> bool {
        self.entries.remove(&handle).is_some()
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.entries.get(&handle)
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.entries.contains_key(&handle)
    }

    /// Live handles, ascending
    pub fn handles(&self) -> Vec<Handle> {
        self.entries.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the native listener for this registry is attached
    pub fn is_installed(&self) -> bool {
        self.installed
    }

    /// Record the native listener as attached. True only the first time.
    pub fn mark_installed(&mut self) -> bool {
        !std::mem::replace(&mut self.installed, true)
    }
}

impl<T: Clone> Registry<T> {
    /// Copy of the live entries in handle order
    pub fn snapshot(&self) -> Vec<(Handle, T)> {
        self.entries.iter().map(|(h, e)| (*h, e.clone())).collect()
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry<Registration> {
    /// Validate `target`, store the registration and hand back its handle
    pub fn register(
        &mut self,
        document: &Document,
        target: Target,
        callback: Callback,
    ) -> Result<Subscription, RegisterError> {
        let descriptor = TargetDescriptor::resolve(&target, document)?;
        let handle = self.insert(Registration {
            target: descriptor,
            origin: target,
            callback: callback.clone(),
        });
        Ok(Subscription { callback, handle })
    }

    /// Remove a registration. False for unknown or already removed handles.
    pub fn unregister(&mut self, handle: Handle) -> bool {
        self.remove(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Callback {
        Rc::new(|_: &mut DelegatedEvent<'_>, _: NodeId| {})
    }

    #[test]
    fn test_handles_are_monotonic() {
        let mut registry: Registry<u32> = Registry::new();
        let a = registry.insert(1);
        let b = registry.insert(2);
        assert_eq!((a, b), (Handle(0), Handle(1)));

        assert!(registry.remove(a));
        let c = registry.insert(3);
        assert_eq!(c, Handle(2));
        assert_eq!(registry.handles(), vec![b, c]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut registry: Registry<u32> = Registry::new();
        let a = registry.insert(1);
        let b = registry.insert(2);

        assert!(registry.remove(a));
        assert!(!registry.remove(a));
        assert!(!registry.remove(Handle(42)));
        assert_eq!(registry.get(b), Some(&2));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_mark_installed_once() {
        let mut registry: Registry<u32> = Registry::new();
        assert!(!registry.is_installed());
        assert!(registry.mark_installed());
        assert!(!registry.mark_installed());
        assert!(registry.is_installed());
    }

    #[test]
    fn test_snapshot_order() {
        let mut registry: Registry<&str> = Registry::new();
        let a = registry.insert("a");
        registry.insert("b");
        registry.insert("c");
        registry.remove(a);
        let values: Vec<_> = registry.snapshot().into_iter().map(|(_, v)| v).collect();
        assert_eq!(values, vec!["b", "c"]);
    }

    #[test]
    fn test_register_rejects_reserved() {
        let doc = Document::new();
        let mut registry: Registry<Registration> = Registry::new();
        let reserved = [
            Target::from("*"),
            Target::from(" window "),
            Target::from("document"),
            Target::from("document.documentElement"),
            Target::Window,
            Target::Document,
            Target::Element(doc.node()),
            Target::Element(doc.document_element()),
        ];
        for target in reserved {
            let err = registry.register(&doc, target.clone(), noop()).unwrap_err();
            assert!(matches!(err, RegisterError::ReservedTarget(_)), "{target} gave {err}");
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_rejects_bad_targets() {
        let mut doc = Document::new();
        let text = doc.tree_mut().create_text("hi");
        let mut registry: Registry<Registration> = Registry::new();

        assert_eq!(registry.register(&doc, "".into(), noop()).unwrap_err(), RegisterError::EmptySelector);
        assert_eq!(registry.register(&doc, "  ".into(), noop()).unwrap_err(), RegisterError::EmptySelector);
        assert!(matches!(
            registry.register(&doc, "div >".into(), noop()).unwrap_err(),
            RegisterError::InvalidSelector(_)
        ));
        assert_eq!(
            registry.register(&doc, Target::Element(text), noop()).unwrap_err(),
            RegisterError::NotAnElement(text)
        );
        let mut other = Document::new();
        for _ in 0..16 {
            other.tree_mut().create_element("p");
        }
        let missing = Target::Element(other.tree_mut().create_element("p"));
        assert!(matches!(
            registry.register(&doc, missing, noop()).unwrap_err(),
            RegisterError::UnknownNode(_)
        ));
    }

    #[test]
    fn test_register_normalizes() {
        let doc = Document::new();
        let mut registry: Registry<Registration> = Registry::new();
        let sub = registry.register(&doc, ".btn".into(), noop()).unwrap();
        let body = registry.register(&doc, doc.body().into(), noop()).unwrap();

        let entry = registry.get(sub.handle).unwrap();
        assert_eq!(entry.origin, Target::Selector(".btn".to_string()));
        assert!(matches!(&entry.target, TargetDescriptor::Selector { text, .. } if text == ".btn"));
        assert_eq!(registry.get(body.handle).unwrap().target, TargetDescriptor::Element(doc.body()));

        assert!(registry.unregister(sub.handle));
        assert!(!registry.unregister(sub.handle));
        assert!(registry.contains(body.handle));
    }
}
