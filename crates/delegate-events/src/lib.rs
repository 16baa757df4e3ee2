//! Delegate Events - root-level event delegation
//!
//! Instead of one listener per element, a single native listener per event
//! type is attached to the document. Each native event is re-dispatched to
//! the registered (descriptor, callback) pairs whose descriptor matches the
//! event origin: a selector matched against the nearest ancestor, or an
//! element that contains the origin. Open shadow trees are reached through
//! the composed path.
//!
//! # Example
//! ```rust,ignore
//! use delegate_dom::{Document, Window};
//! use delegate_events::Events;
//!
//! let window = Window::new(Document::new());
//! let events = Events::new(window.clone());
//! let sub = events.click(".button", |event, button| {
//!     event.prevent_default();
//!     println!("clicked {button}");
//! });
//! events.remove_click(sub.unwrap().handle);
//! ```

mod config;
mod event_type;
mod ancestor;
mod registry;
mod event;
mod dispatch;
mod lifecycle;
mod events;

pub use config::Config;
pub use event_type::EventType;
pub use ancestor::{closest_matching, matcher_for, AncestorMatcher, NativeClosest, PolyfillClosest};
pub use registry::{
    Callback, Handle, RegisterError, Registration, Registry, Subscription, Target, TargetDescriptor,
};
pub use event::DelegatedEvent;
pub use lifecycle::{LifecycleCallback, LifecycleQueue, LifecycleTarget};
pub use events::{Events, ResizeCallback};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
