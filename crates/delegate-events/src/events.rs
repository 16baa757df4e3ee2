//! Registration API
//!
//! `Events` binds each delegated event type to its registry and lazily
//! installs the dispatch listener on the document. Invalid registrations are
//! refused with `None` rather than an error; the reason is logged.

use std::cell::RefCell;
use std::rc::Rc;

use delegate_dom::{
    native_listener, EventTarget, HostCapabilities, ListenerOptions, NativeEvent, NodeId, ReadyState, Window,
};

use crate::dispatch::delegate_listener;
use crate::lifecycle::drain;
use crate::{
    matcher_for, AncestorMatcher, Callback, Config, DelegatedEvent, EventType, Handle, LifecycleCallback,
    LifecycleQueue, LifecycleTarget, Registration, Registry, Subscription, Target,
};

/// Resize callback: the native event and the window
pub type ResizeCallback = Rc<dyn Fn(&NativeEvent, &Window)>;

struct Inner {
    window: Rc<Window>,
    config: Config,
    capabilities: HostCapabilities,
    matcher: Rc<dyn AncestorMatcher>,
    registries: [Rc<RefCell<Registry<Registration>>>; EventType::COUNT],
    resize: Rc<RefCell<Registry<ResizeCallback>>>,
    ready: Rc<RefCell<LifecycleQueue>>,
    load: Rc<RefCell<LifecycleQueue>>,
}

/// Delegated event registration for one window
#[derive(Clone)]
pub struct Events {
    inner: Rc<Inner>,
}

impl Events {
    /// Create the registration API with the default configuration
    pub fn new(window: Rc<Window>) -> Self {
        Self::with_config(window, Config::default())
    }

    /// Create the registration API. Host capabilities are resolved here,
    /// once; dispatch never re-checks them.
    pub fn with_config(window: Rc<Window>, config: Config) -> Self {
        let capabilities = config.resolve_capabilities(window.capabilities());
        let matcher = matcher_for(&capabilities);
        tracing::debug!("Event delegation ready ({:?})", capabilities);

        Self {
            inner: Rc::new(Inner {
                window,
                config,
                capabilities,
                matcher,
                registries: std::array::from_fn(|_| Rc::new(RefCell::new(Registry::new()))),
                resize: Rc::new(RefCell::new(Registry::new())),
                ready: Rc::new(RefCell::new(LifecycleQueue::new(LifecycleTarget::Document))),
                load: Rc::new(RefCell::new(LifecycleQueue::new(LifecycleTarget::Window))),
            }),
        }
    }

    pub fn window(&self) -> &Rc<Window> {
        &self.inner.window
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Capabilities in effect
    pub fn capabilities(&self) -> HostCapabilities {
        self.inner.capabilities
    }

    fn registry(&self, event_type: EventType) -> &Rc<RefCell<Registry<Registration>>> {
        &self.inner.registries[event_type.index()]
    }

    // === Delegated events ===

    /// Register `callback` for `event_type` events whose origin matches
    /// `target`. `None` when the target is rejected.
    pub fn on<F>(&self, event_type: EventType, target: impl Into<Target>, callback: F) -> Option<Subscription>
    where
        F: Fn(&mut DelegatedEvent<'_>, NodeId) + 'static,
    {
        self.add(event_type, target.into(), Rc::new(callback))
    }

    /// Register an already shared callback
    pub fn add(&self, event_type: EventType, target: Target, callback: Callback) -> Option<Subscription> {
        let registry = self.registry(event_type);
        let result = {
            let document = self.inner.window.document();
            registry.borrow_mut().register(&document, target.clone(), callback)
        };

        match result {
            Ok(subscription) => {
                tracing::debug!("{} registered for {} as handle {}", event_type, target, subscription.handle);
                self.install(event_type);
                Some(subscription)
            }
            Err(err) => {
                tracing::debug!("{} registration rejected: {}", event_type, err);
                None
            }
        }
    }

    /// Remove a registration. False when the handle is not live.
    pub fn off(&self, event_type: EventType, handle: Handle) -> bool {
        let removed = self.registry(event_type).borrow_mut().unregister(handle);
        tracing::debug!("{} handle {} removed: {}", event_type, handle, removed);
        removed
    }

    /// Attach the document listener the first time a type gets an entry
    fn install(&self, event_type: EventType) {
        let registry = self.registry(event_type);
        if !registry.borrow_mut().mark_installed() {
            return;
        }

        let name = event_type.native_name(&self.inner.capabilities);
        let options = ListenerOptions {
            passive: self.inner.config.passive_listeners,
            once: false,
        };
        tracing::info!("Installing delegated {} listener on document", name);
        self.inner.window.add_event_listener(
            EventTarget::Node(NodeId::ROOT),
            name,
            options,
            delegate_listener(event_type, registry.clone(), self.inner.matcher.clone()),
        );
    }

    /// Whether the document listener for `event_type` is attached
    pub fn is_installed(&self, event_type: EventType) -> bool {
        self.registry(event_type).borrow().is_installed()
    }

    /// Live registrations for `event_type`
    pub fn len(&self, event_type: EventType) -> usize {
        self.registry(event_type).borrow().len()
    }

    pub fn is_empty(&self, event_type: EventType) -> bool {
        self.registry(event_type).borrow().is_empty()
    }

    pub fn click<F>(&self, target: impl Into<Target>, callback: F) -> Option<Subscription>
    where
        F: Fn(&mut DelegatedEvent<'_>, NodeId) + 'static,
    {
        self.on(EventType::Click, target, callback)
    }

    pub fn remove_click(&self, handle: Handle) -> bool {
        self.off(EventType::Click, handle)
    }

    /// Text entry (`textinput` on legacy hosts)
    pub fn input<F>(&self, target: impl Into<Target>, callback: F) -> Option<Subscription>
    where
        F: Fn(&mut DelegatedEvent<'_>, NodeId) + 'static,
    {
        self.on(EventType::Input, target, callback)
    }

    pub fn remove_input(&self, handle: Handle) -> bool {
        self.off(EventType::Input, handle)
    }

    pub fn touch_start<F>(&self, target: impl Into<Target>, callback: F) -> Option<Subscription>
    where
        F: Fn(&mut DelegatedEvent<'_>, NodeId) + 'static,
    {
        self.on(EventType::TouchStart, target, callback)
    }

    pub fn remove_touch_start(&self, handle: Handle) -> bool {
        self.off(EventType::TouchStart, handle)
    }

    pub fn touch_move<F>(&self, target: impl Into<Target>, callback: F) -> Option<Subscription>
    where
        F: Fn(&mut DelegatedEvent<'_>, NodeId) + 'static,
    {
        self.on(EventType::TouchMove, target, callback)
    }

    pub fn remove_touch_move(&self, handle: Handle) -> bool {
        self.off(EventType::TouchMove, handle)
    }

    pub fn touch_end<F>(&self, target: impl Into<Target>, callback: F) -> Option<Subscription>
    where
        F: Fn(&mut DelegatedEvent<'_>, NodeId) + 'static,
    {
        self.on(EventType::TouchEnd, target, callback)
    }

    pub fn remove_touch_end(&self, handle: Handle) -> bool {
        self.off(EventType::TouchEnd, handle)
    }

    pub fn mouse_down<F>(&self, target: impl Into<Target>, callback: F) -> Option<Subscription>
    where
        F: Fn(&mut DelegatedEvent<'_>, NodeId) + 'static,
    {
        self.on(EventType::MouseDown, target, callback)
    }

    pub fn remove_mouse_down(&self, handle: Handle) -> bool {
        self.off(EventType::MouseDown, handle)
    }

    pub fn mouse_move<F>(&self, target: impl Into<Target>, callback: F) -> Option<Subscription>
    where
        F: Fn(&mut DelegatedEvent<'_>, NodeId) + 'static,
    {
        self.on(EventType::MouseMove, target, callback)
    }

    pub fn remove_mouse_move(&self, handle: Handle) -> bool {
        self.off(EventType::MouseMove, handle)
    }

    pub fn mouse_up<F>(&self, target: impl Into<Target>, callback: F) -> Option<Subscription>
    where
        F: Fn(&mut DelegatedEvent<'_>, NodeId) + 'static,
    {
        self.on(EventType::MouseUp, target, callback)
    }

    pub fn remove_mouse_up(&self, handle: Handle) -> bool {
        self.off(EventType::MouseUp, handle)
    }

    pub fn key_down<F>(&self, target: impl Into<Target>, callback: F) -> Option<Subscription>
    where
        F: Fn(&mut DelegatedEvent<'_>, NodeId) + 'static,
    {
        self.on(EventType::KeyDown, target, callback)
    }

    pub fn remove_key_down(&self, handle: Handle) -> bool {
        self.off(EventType::KeyDown, handle)
    }

    pub fn key_up<F>(&self, target: impl Into<Target>, callback: F) -> Option<Subscription>
    where
        F: Fn(&mut DelegatedEvent<'_>, NodeId) + 'static,
    {
        self.on(EventType::KeyUp, target, callback)
    }

    pub fn remove_key_up(&self, handle: Handle) -> bool {
        self.off(EventType::KeyUp, handle)
    }

    // === Window resize ===

    /// Register a window resize callback. Callbacks run in handle order.
    pub fn resize<F>(&self, callback: F) -> Subscription<ResizeCallback>
    where
        F: Fn(&NativeEvent, &Window) + 'static,
    {
        let callback: ResizeCallback = Rc::new(callback);
        let handle = self.inner.resize.borrow_mut().insert(callback.clone());

        if self.inner.resize.borrow_mut().mark_installed() {
            tracing::info!("Installing resize listener on window");
            let registry = self.inner.resize.clone();
            self.inner.window.add_event_listener(
                EventTarget::Window,
                "resize",
                ListenerOptions::default(),
                native_listener(move |window, event| {
                    let callbacks = registry.borrow().snapshot();
                    for (_, callback) in callbacks {
                        callback(&*event, window);
                    }
                }),
            );
        }

        Subscription { callback, handle }
    }

    pub fn remove_resize(&self, handle: Handle) -> bool {
        self.inner.resize.borrow_mut().remove(handle)
    }

    // === Lifecycle ===

    /// Run `callback` once the DOM is ready. Runs immediately, with the
    /// document, when the document is already interactive or complete.
    pub fn ready<F>(&self, callback: F) -> LifecycleCallback
    where
        F: Fn(&Window, LifecycleTarget) + 'static,
    {
        let callback: LifecycleCallback = Rc::new(callback);
        let window = &self.inner.window;

        if window.ready_state() >= ReadyState::Interactive || self.inner.ready.borrow().is_drained() {
            callback(window, LifecycleTarget::Document);
            return callback;
        }

        if self.inner.ready.borrow_mut().push(callback.clone()) {
            let queue = self.inner.ready.clone();
            window.add_event_listener(
                EventTarget::Node(NodeId::ROOT),
                "DOMContentLoaded",
                ListenerOptions::once(),
                native_listener(move |window, _| drain(&queue, window)),
            );
        }
        callback
    }

    /// Run `callback` once the window has loaded. Runs immediately, with the
    /// window, when loading already completed.
    pub fn load<F>(&self, callback: F) -> LifecycleCallback
    where
        F: Fn(&Window, LifecycleTarget) + 'static,
    {
        let callback: LifecycleCallback = Rc::new(callback);
        let window = &self.inner.window;

        if window.ready_state() == ReadyState::Complete || self.inner.load.borrow().is_drained() {
            callback(window, LifecycleTarget::Window);
            return callback;
        }

        if self.inner.load.borrow_mut().push(callback.clone()) {
            let queue = self.inner.load.clone();
            window.add_event_listener(
                EventTarget::Window,
                "load",
                ListenerOptions::once(),
                native_listener(move |window, _| drain(&queue, window)),
            );
        }
        callback
    }
}

impl std::fmt::Debug for Events {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: Vec<(EventType, usize)> = EventType::ALL.iter().map(|&t| (t, self.len(t))).collect();
        f.debug_struct("Events")
            .field("capabilities", &self.inner.capabilities)
            .field("registrations", &counts)
            .field("resize", &self.inner.resize.borrow().len())
            .finish()
    }
}
