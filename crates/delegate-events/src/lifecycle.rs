//! Lifecycle Queues
//!
//! One-shot deferred callback queues for "document ready" and "window load".

use std::rc::Rc;

use delegate_dom::Window;

/// What a lifecycle callback is being invoked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleTarget {
    /// DOM ready: invoked with the document
    Document,
    /// Window load: invoked with the window
    Window,
}

/// Lifecycle callback
pub type LifecycleCallback = Rc<dyn Fn(&Window, LifecycleTarget)>;

enum QueueState {
    Idle,
    Pending(Vec<LifecycleCallback>),
    Drained,
}

/// Append-only queue drained exactly once
pub struct LifecycleQueue {
    kind: LifecycleTarget,
    state: QueueState,
}

impl LifecycleQueue {
    pub fn new(kind: LifecycleTarget) -> Self {
        Self {
            kind,
            state: QueueState::Idle,
        }
    }

    pub fn kind(&self) -> LifecycleTarget {
        self.kind
    }

    /// Queue a callback. True for the first callback, when the caller must
    /// install the native one-shot listener. Must not be called once drained.
    pub fn push(&mut self, callback: LifecycleCallback) -> bool {
        match &mut self.state {
            QueueState::Pending(queue) => {
                queue.push(callback);
                false
            }
            QueueState::Idle | QueueState::Drained => {
                self.state = QueueState::Pending(vec![callback]);
                true
            }
        }
    }

    /// Take every queued callback in append order and discard the queue
    pub fn take(&mut self) -> Vec<LifecycleCallback> {
        match std::mem::replace(&mut self.state, QueueState::Drained) {
            QueueState::Pending(queue) => queue,
            QueueState::Idle | QueueState::Drained => Vec::new(),
        }
    }

    pub fn is_drained(&self) -> bool {
        matches!(self.state, QueueState::Drained)
    }

    /// Number of callbacks waiting
    pub fn len(&self) -> usize {
        match &self.state {
            QueueState::Pending(queue) => queue.len(),
            QueueState::Idle | QueueState::Drained => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for LifecycleQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleQueue")
            .field("kind", &self.kind)
            .field("pending", &self.len())
            .field("drained", &self.is_drained())
            .finish()
    }
}

/// Drain `queue`, invoking each callback in append order. The queue is not
/// borrowed while callbacks run.
pub(crate) fn drain(queue: &std::cell::RefCell<LifecycleQueue>, window: &Window) {
    let (kind, callbacks) = {
        let mut queue = queue.borrow_mut();
        (queue.kind(), queue.take())
    };
    tracing::debug!("Draining {} {:?} callbacks", callbacks.len(), kind);
    for callback in callbacks {
        callback(window, kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> LifecycleCallback {
        Rc::new(|_: &Window, _: LifecycleTarget| {})
    }

    #[test]
    fn test_first_push_requests_install() {
        let mut queue = LifecycleQueue::new(LifecycleTarget::Document);
        assert!(queue.push(noop()));
        assert!(!queue.push(noop()));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_take_discards_queue() {
        let mut queue = LifecycleQueue::new(LifecycleTarget::Window);
        queue.push(noop());
        assert_eq!(queue.take().len(), 1);
        assert!(queue.is_drained());
        assert!(queue.is_empty());
        assert!(queue.take().is_empty());
    }
}
