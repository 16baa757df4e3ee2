//! Native Events
//!
//! Event objects delivered by the host to native listeners.

use crate::NodeId;

/// Something a native listener can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Node(NodeId),
    Window,
}

impl EventTarget {
    /// Node id, unless this is the window
    pub fn node(self) -> Option<NodeId> {
        match self {
            Self::Node(id) => Some(id),
            Self::Window => None,
        }
    }
}

/// Listener options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    /// preventDefault() is ignored while a passive listener runs
    pub passive: bool,
    /// Remove the listener after its first invocation
    pub once: bool,
}

impl ListenerOptions {
    pub fn once() -> Self {
        Self { passive: false, once: true }
    }
}

/// Native event as seen by a listener
#[derive(Debug, Clone)]
pub struct NativeEvent {
    /// Native event name ("click", "textinput", "load", ...)
    pub name: String,
    /// Event target, retargeted out of shadow trees
    pub target: EventTarget,
    /// Composed propagation path, origin first
    pub path: Vec<EventTarget>,
    pub cancelable: bool,
    pub timestamp: f64,
    default_prevented: bool,
    pub(crate) in_passive_listener: bool,
}

impl NativeEvent {
    /// Create an event
    pub fn new(name: &str, target: EventTarget, path: Vec<EventTarget>, cancelable: bool) -> Self {
        Self {
            name: name.to_string(),
            target,
            path,
            cancelable,
            timestamp: 0.0,
            default_prevented: false,
            in_passive_listener: false,
        }
    }

    /// Node target, if the event was not fired at the window
    pub fn target_node(&self) -> Option<NodeId> {
        self.target.node()
    }

    /// composedPath()
    pub fn composed_path(&self) -> &[EventTarget] {
        &self.path
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        if self.cancelable && !self.in_passive_listener {
            self.default_prevented = true;
        }
    }

    /// Check if default was prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}
