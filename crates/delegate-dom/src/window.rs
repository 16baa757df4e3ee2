//! Window - the host environment
//!
//! Owns the document, the native listener table and the ready state, and
//! performs native event delivery. Shared as `Rc<Window>`; every method takes
//! `&self` so listeners can re-enter the window while they run.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::{Document, DomError, DomResult, EventTarget, ListenerOptions, NativeEvent, NodeId, ReadyState};

/// Native listener callback
pub type NativeListener = Rc<dyn Fn(&Window, &mut NativeEvent)>;

/// Wrap a closure as a native listener
pub fn native_listener<F>(f: F) -> NativeListener
where
    F: Fn(&Window, &mut NativeEvent) + 'static,
{
    Rc::new(f)
}

/// Feature detection results for the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostCapabilities {
    /// Host implements `Element::closest`
    pub native_closest: bool,
    /// Host fires the standard `input` event (legacy engines fire `textinput`)
    pub standard_input_event: bool,
}

impl HostCapabilities {
    /// A legacy engine: no native closest, `textinput` instead of `input`
    pub fn legacy() -> Self {
        Self {
            native_closest: false,
            standard_input_event: false,
        }
    }
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self {
            native_closest: true,
            standard_input_event: true,
        }
    }
}

struct ListenerEntry {
    id: u64,
    target: EventTarget,
    name: String,
    options: ListenerOptions,
    listener: NativeListener,
}

/// Browser window
pub struct Window {
    document: RefCell<Document>,
    ready_state: Cell<ReadyState>,
    capabilities: HostCapabilities,
    listeners: RefCell<Vec<ListenerEntry>>,
    next_listener_id: Cell<u64>,
}

impl Window {
    /// Create a window around a document, on a modern host
    pub fn new(document: Document) -> Rc<Self> {
        Self::with_capabilities(document, HostCapabilities::default())
    }

    /// Create a window with explicit host capabilities
    pub fn with_capabilities(document: Document, capabilities: HostCapabilities) -> Rc<Self> {
        tracing::debug!("Creating window with {:?}", capabilities);
        Rc::new(Self {
            document: RefCell::new(document),
            ready_state: Cell::new(ReadyState::Loading),
            capabilities,
            listeners: RefCell::new(Vec::new()),
            next_listener_id: Cell::new(0),
        })
    }

    /// Borrow the document
    pub fn document(&self) -> Ref<'_, Document> {
        self.document.borrow()
    }

    /// Borrow the document mutably. Do not hold the guard across a dispatch.
    pub fn document_mut(&self) -> RefMut<'_, Document> {
        self.document.borrow_mut()
    }

    /// Host capabilities
    pub fn capabilities(&self) -> HostCapabilities {
        self.capabilities
    }

    /// Current `document.readyState`
    pub fn ready_state(&self) -> ReadyState {
        self.ready_state.get()
    }

    // === Listeners ===

    /// addEventListener
    pub fn add_event_listener(
        &self,
        target: EventTarget,
        name: &str,
        options: ListenerOptions,
        listener: NativeListener,
    ) {
        let id = self.next_listener_id.get();
        self.next_listener_id.set(id + 1);
        tracing::trace!("addEventListener({:?}, {}, {:?})", target, name, options);
        self.listeners.borrow_mut().push(ListenerEntry {
            id,
            target,
            name: name.to_string(),
            options,
            listener,
        });
    }

    /// Number of native listeners for `name` on `target`
    pub fn listener_count(&self, target: EventTarget, name: &str) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|l| l.target == target && l.name == name)
            .count()
    }

    fn invoke(&self, target: EventTarget, event: &mut NativeEvent) {
        // Snapshot so listeners may add or remove listeners while running
        let snapshot: Vec<(u64, ListenerOptions, NativeListener)> = self
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.target == target && l.name == event.name)
            .map(|l| (l.id, l.options, l.listener.clone()))
            .collect();

        for (id, options, listener) in snapshot {
            if options.once {
                self.listeners.borrow_mut().retain(|l| l.id != id);
            }
            event.in_passive_listener = options.passive;
            listener(self, event);
            event.in_passive_listener = false;
        }
    }

    // === Dispatch ===

    /// Deliver a UI event that originated at `origin` to the listeners on the
    /// document. Events on nodes detached from the document reach nobody.
    pub fn dispatch(&self, name: &str, origin: NodeId) -> DomResult<NativeEvent> {
        let (target, path) = {
            let document = self.document.borrow();
            let tree = document.tree();
            if tree.get(origin).is_none() {
                return Err(DomError::NotFound(origin));
            }
            (tree.retarget(origin), tree.composed_path(origin))
        };

        let mut event = NativeEvent::new(name, EventTarget::Node(target), path, true);
        let document = EventTarget::Node(NodeId::ROOT);
        if event.path.contains(&document) {
            tracing::trace!("Dispatching {} at {} (origin {})", name, target, origin);
            self.invoke(document, &mut event);
        }
        Ok(event)
    }

    /// Fire a non-cancelable event directly at `target`
    pub fn fire(&self, target: EventTarget, name: &str) -> NativeEvent {
        let path = match target {
            EventTarget::Node(id) => self.document.borrow().tree().composed_path(id),
            EventTarget::Window => vec![EventTarget::Window],
        };
        let mut event = NativeEvent::new(name, target, path, false);
        self.invoke(target, &mut event);
        event
    }

    /// Fire `resize` at the window
    pub fn resize(&self) -> NativeEvent {
        self.fire(EventTarget::Window, "resize")
    }

    /// Advance the ready state, firing `DOMContentLoaded` and `load` on the
    /// way. The state never moves backwards.
    pub fn set_ready_state(&self, state: ReadyState) {
        let previous = self.ready_state.get();
        if state <= previous {
            return;
        }
        tracing::debug!("readyState {} -> {}", previous.as_str(), state.as_str());

        if previous < ReadyState::Interactive {
            self.ready_state.set(ReadyState::Interactive);
            self.fire(EventTarget::Node(NodeId::ROOT), "DOMContentLoaded");
        }
        if state == ReadyState::Complete {
            self.ready_state.set(ReadyState::Complete);
            self.fire(EventTarget::Window, "load");
        }
    }
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("ready_state", &self.ready_state.get())
            .field("capabilities", &self.capabilities)
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter(window: &Window, target: EventTarget, name: &str, options: ListenerOptions) -> Rc<Cell<u32>> {
        let hits = Rc::new(Cell::new(0));
        let seen = hits.clone();
        window.add_event_listener(target, name, options, native_listener(move |_, _| seen.set(seen.get() + 1)));
        hits
    }

    #[test]
    fn test_dispatch_reaches_document_listener() {
        let window = Window::new(Document::new());
        let body = window.document().body();
        let hits = counter(&window, EventTarget::Node(NodeId::ROOT), "click", ListenerOptions::default());

        let event = window.dispatch("click", body).unwrap();
        assert_eq!(hits.get(), 1);
        assert_eq!(event.target, EventTarget::Node(body));

        window.dispatch("keyup", body).unwrap();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_dispatch_detached_node() {
        let window = Window::new(Document::new());
        let orphan = window.document_mut().tree_mut().create_element("div");
        let hits = counter(&window, EventTarget::Node(NodeId::ROOT), "click", ListenerOptions::default());

        window.dispatch("click", orphan).unwrap();
        assert_eq!(hits.get(), 0);
        assert!(window.dispatch("click", NodeId(999)).is_err());
    }

    #[test]
    fn test_once_listener() {
        let window = Window::new(Document::new());
        let hits = counter(&window, EventTarget::Window, "resize", ListenerOptions::once());

        window.resize();
        window.resize();
        assert_eq!(hits.get(), 1);
        assert_eq!(window.listener_count(EventTarget::Window, "resize"), 0);
    }

    #[test]
    fn test_passive_listener_cannot_prevent_default() {
        let window = Window::new(Document::new());
        let body = window.document().body();
        window.add_event_listener(
            EventTarget::Node(NodeId::ROOT),
            "touchmove",
            ListenerOptions { passive: true, once: false },
            native_listener(|_, event| event.prevent_default()),
        );
        assert!(!window.dispatch("touchmove", body).unwrap().is_default_prevented());

        window.add_event_listener(
            EventTarget::Node(NodeId::ROOT),
            "touchstart",
            ListenerOptions::default(),
            native_listener(|_, event| event.prevent_default()),
        );
        assert!(window.dispatch("touchstart", body).unwrap().is_default_prevented());
    }

    #[test]
    fn test_ready_state_transitions() {
        let window = Window::new(Document::new());
        let ready = counter(&window, EventTarget::Node(NodeId::ROOT), "DOMContentLoaded", ListenerOptions::once());
        let load = counter(&window, EventTarget::Window, "load", ListenerOptions::once());

        window.set_ready_state(ReadyState::Complete);
        assert_eq!((ready.get(), load.get()), (1, 1));
        assert_eq!(window.ready_state(), ReadyState::Complete);

        window.set_ready_state(ReadyState::Interactive);
        assert_eq!(window.ready_state(), ReadyState::Complete);
        assert_eq!(ready.get(), 1);
    }

    #[test]
    fn test_listener_may_reenter_window() {
        let window = Window::new(Document::new());
        let body = window.document().body();
        window.add_event_listener(
            EventTarget::Node(NodeId::ROOT),
            "click",
            ListenerOptions::default(),
            native_listener(|window, _| {
                window.add_event_listener(EventTarget::Window, "resize", ListenerOptions::default(), native_listener(|_, _| {}));
            }),
        );

        window.dispatch("click", body).unwrap();
        assert_eq!(window.listener_count(EventTarget::Window, "resize"), 1);
    }

    #[test]
    fn test_capability_presets() {
        let caps = HostCapabilities::legacy();
        assert!(!caps.native_closest);
        assert!(!caps.standard_input_event);
        assert!(HostCapabilities::default().standard_input_event);
    }
}
