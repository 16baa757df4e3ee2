//! Dispatch Engine
//!
//! The single native listener behind each delegated event type. Every
//! native event walks the whole registry for its type; several callbacks
//! may fire for one event, in handle order.
//!
//! The registry is snapshotted when the event arrives. Callbacks may add or
//! remove registrations freely: additions take effect from the next event,
//! and entries removed mid-dispatch still run for the current one.

use std::cell::RefCell;
use std::rc::Rc;

use delegate_dom::{native_listener, EventTarget, NativeEvent, NativeListener, NodeId, Window};

use crate::{AncestorMatcher, DelegatedEvent, EventType, Registration, Registry, TargetDescriptor};

/// Build the native listener for one event type
pub(crate) fn delegate_listener(
    event_type: EventType,
    registry: Rc<RefCell<Registry<Registration>>>,
    matcher: Rc<dyn AncestorMatcher>,
) -> NativeListener {
    native_listener(move |window, native| {
        dispatch(window, event_type, &registry, matcher.as_ref(), native);
    })
}

/// Re-dispatch one native event to the matching registrations
pub(crate) fn dispatch(
    window: &Window,
    event_type: EventType,
    registry: &RefCell<Registry<Registration>>,
    matcher: &dyn AncestorMatcher,
    native: &mut NativeEvent,
) {
    let Some(target) = native.target_node() else {
        return;
    };
    let entries = registry.borrow().snapshot();
    if !event_type.is_high_frequency() {
        tracing::trace!("{} at {}: {} registrations", event_type, target, entries.len());
    }

    let mut event = DelegatedEvent::new(event_type, native);
    for (handle, registration) in entries {
        event.selector = Some(registration.origin.clone());
        event.custom_element = None;

        match &registration.target {
            TargetDescriptor::Selector { parsed, .. } => {
                let found = matcher.closest(window.document().tree(), target, parsed);
                event.tag_target = found;

                if let Some(matched) = found {
                    tracing::trace!("{} handle {} matched {}", event_type, handle, matched);
                    (registration.callback)(&mut event, matched);
                } else if has_open_shadow_root(window, target) {
                    for node in shadow_path(event.path(), target) {
                        let found = matcher.closest(window.document().tree(), node, parsed);
                        if let Some(matched) = found {
                            tracing::trace!("{} handle {} matched {} inside {}", event_type, handle, matched, target);
                            event.tag_target = Some(matched);
                            event.custom_element = Some(target);
                            (registration.callback)(&mut event, matched);
                        }
                    }
                }
            }
            TargetDescriptor::Element(element) => {
                let element = *element;
                event.tag_target = Some(element);

                let contains = window.document().tree().contains(element, target);
                if contains {
                    tracing::trace!("{} handle {} matched {}", event_type, handle, element);
                    (registration.callback)(&mut event, element);
                } else if has_open_shadow_root(window, target) {
                    for node in shadow_path(event.path(), target) {
                        if node == element {
                            event.custom_element = Some(target);
                            (registration.callback)(&mut event, element);
                        }
                    }
                }
            }
        }
    }
}

fn has_open_shadow_root(window: &Window, node: NodeId) -> bool {
    window.document().tree().shadow_root(node).is_some()
}

/// Path entries strictly inside the target's shadow tree: everything before
/// the target except the shadow root itself, origin first.
fn shadow_path(path: &[EventTarget], target: NodeId) -> Vec<NodeId> {
    let Some(index) = path.iter().position(|t| *t == EventTarget::Node(target)) else {
        return Vec::new();
    };
    path[..index.saturating_sub(1)]
        .iter()
        .filter_map(|t| t.node())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use delegate_dom::{Document, ShadowRootMode};

    use crate::{NativeClosest, Registry, Target};

    fn window_with_list() -> (Rc<Window>, NodeId, NodeId) {
        let window = Window::new(Document::new());
        let (list, item) = {
            let mut doc = window.document_mut();
            let body = doc.body();
            let tree = doc.tree_mut();
            let list = tree.create_element("ul");
            let item = tree.create_element("li");
            tree.set_attribute(item, "class", "item").unwrap();
            tree.append_child(body, list).unwrap();
            tree.append_child(list, item).unwrap();
            (list, item)
        };
        (window, list, item)
    }

    fn register(registry: &RefCell<Registry<Registration>>, window: &Window, target: Target, hits: &Rc<Cell<u32>>) {
        let hits = hits.clone();
        registry
            .borrow_mut()
            .register(&window.document(), target, Rc::new(move |_: &mut DelegatedEvent<'_>, _: NodeId| {
                hits.set(hits.get() + 1)
            }))
            .unwrap();
    }

    fn fire(window: &Window, registry: &RefCell<Registry<Registration>>, origin: NodeId) {
        let mut native = NativeEvent::new(
            "click",
            EventTarget::Node(window.document().tree().retarget(origin)),
            window.document().tree().composed_path(origin),
            true,
        );
        dispatch(window, EventType::Click, registry, &NativeClosest, &mut native);
    }

    #[test]
    fn test_selector_and_element_matches() {
        let (window, list, item) = window_with_list();
        let registry = RefCell::new(Registry::new());
        let by_selector = Rc::new(Cell::new(0));
        let by_element = Rc::new(Cell::new(0));
        register(&registry, &window, ".item".into(), &by_selector);
        register(&registry, &window, list.into(), &by_element);

        fire(&window, &registry, item);
        fire(&window, &registry, list);
        assert_eq!(by_selector.get(), 1);
        assert_eq!(by_element.get(), 2);
    }

    #[test]
    fn test_shadow_path_excludes_root_and_target() {
        let (window, list, _) = window_with_list();
        let (root, inner, leaf) = {
            let mut doc = window.document_mut();
            let tree = doc.tree_mut();
            let root = tree.attach_shadow(list, ShadowRootMode::Open).unwrap();
            let inner = tree.create_element("div");
            let leaf = tree.create_element("b");
            tree.append_child(root, inner).unwrap();
            tree.append_child(inner, leaf).unwrap();
            (root, inner, leaf)
        };

        let path = window.document().tree().composed_path(leaf);
        assert_eq!(shadow_path(&path, list), vec![leaf, inner]);
        assert!(!shadow_path(&path, list).contains(&root));
        assert!(shadow_path(&path, NodeId::ROOT).len() > 2);
        assert!(shadow_path(&[], list).is_empty());
    }
}
