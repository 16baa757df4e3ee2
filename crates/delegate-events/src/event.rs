//! Delegated Event
//!
//! The native event as handed to delegated callbacks, annotated with the
//! registration being evaluated.

use delegate_dom::{EventTarget, NativeEvent, NodeId};

use crate::{EventType, Target};

/// Native event plus delegation annotations
#[derive(Debug)]
pub struct DelegatedEvent<'a> {
    event_type: EventType,
    native: &'a mut NativeEvent,
    pub(crate) selector: Option<Target>,
    pub(crate) tag_target: Option<NodeId>,
    pub(crate) custom_element: Option<NodeId>,
}

impl<'a> DelegatedEvent<'a> {
    pub(crate) fn new(event_type: EventType, native: &'a mut NativeEvent) -> Self {
        Self {
            event_type,
            native,
            selector: None,
            tag_target: None,
            custom_element: None,
        }
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    /// Native event name (may differ from the type name on legacy hosts)
    pub fn name(&self) -> &str {
        &self.native.name
    }

    /// Event target as seen by the document (retargeted out of shadow trees)
    pub fn target(&self) -> Option<NodeId> {
        self.native.target_node()
    }

    /// Composed propagation path
    pub fn path(&self) -> &[EventTarget] {
        self.native.composed_path()
    }

    /// Original target of the registration currently being evaluated
    pub fn selector(&self) -> Option<&Target> {
        self.selector.as_ref()
    }

    /// Element matched for the current registration
    pub fn tag_target(&self) -> Option<NodeId> {
        self.tag_target
    }

    /// Shadow host, set only when the match was found inside its open
    /// shadow tree
    pub fn custom_element(&self) -> Option<NodeId> {
        self.custom_element
    }

    pub fn prevent_default(&mut self) {
        self.native.prevent_default();
    }

    pub fn is_default_prevented(&self) -> bool {
        self.native.is_default_prevented()
    }

    pub fn native(&self) -> &NativeEvent {
        &*self.native
    }

    pub fn native_mut(&mut self) -> &mut NativeEvent {
        &mut *self.native
    }
}
