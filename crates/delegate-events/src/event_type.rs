//! Delegated event types
//!
//! The fixed set of event types that can be delegated to the document.

use delegate_dom::HostCapabilities;

/// Event type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventType {
    Click,
    Input,
    TouchStart,
    TouchMove,
    TouchEnd,
    MouseDown,
    MouseMove,
    MouseUp,
    KeyDown,
    KeyUp,
}

impl EventType {
    /// Number of delegated event types
    pub const COUNT: usize = 10;

    /// Every delegated event type, in registry order
    pub const ALL: [EventType; Self::COUNT] = [
        EventType::Click,
        EventType::Input,
        EventType::TouchStart,
        EventType::TouchMove,
        EventType::TouchEnd,
        EventType::MouseDown,
        EventType::MouseMove,
        EventType::MouseUp,
        EventType::KeyDown,
        EventType::KeyUp,
    ];

    /// Slot in per-type tables
    pub fn index(self) -> usize {
        self as usize
    }

    /// Standard event name
    pub fn name(self) -> &'static str {
        match self {
            EventType::Click => "click",
            EventType::Input => "input",
            EventType::TouchStart => "touchstart",
            EventType::TouchMove => "touchmove",
            EventType::TouchEnd => "touchend",
            EventType::MouseDown => "mousedown",
            EventType::MouseMove => "mousemove",
            EventType::MouseUp => "mouseup",
            EventType::KeyDown => "keydown",
            EventType::KeyUp => "keyup",
        }
    }

    /// Name the host actually fires. Legacy engines report text entry as
    /// `textinput`.
    pub fn native_name(self, capabilities: &HostCapabilities) -> &'static str {
        match self {
            EventType::Input if !capabilities.standard_input_event => "textinput",
            other => other.name(),
        }
    }

    /// Parse a standard event name
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Check if this is a high-frequency event
    pub fn is_high_frequency(self) -> bool {
        matches!(self, EventType::MouseMove | EventType::TouchMove)
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
