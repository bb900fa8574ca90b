//! Events dispatched to elements.

/// Event type fired when a CSS transition completes.
pub const TRANSITION_END: &str = "transitionend";

/// An event delivered to an element's listeners.
///
/// Transition events carry the name of the CSS property whose transition
/// finished in [`Event::property_name`]; other events leave it unset.
///
/// # Examples
///
/// ```rust
/// use toprogress::dom::{Event, TRANSITION_END};
///
/// let event = Event::new(TRANSITION_END).with_property_name("width");
/// assert_eq!(event.event_type(), "transitionend");
/// assert_eq!(event.property_name(), Some("width"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    event_type: String,
    property_name: Option<String>,
}

impl Event {
    /// Creates an event of the given type.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            property_name: None,
        }
    }

    /// Shorthand for a standard `transitionend` event for `property`.
    pub fn transition_end(property: impl Into<String>) -> Self {
        Self::new(TRANSITION_END).with_property_name(property)
    }

    /// Sets the transitioned property name.
    pub fn with_property_name(mut self, property: impl Into<String>) -> Self {
        self.property_name = Some(property.into());
        self
    }

    /// The event type listeners are registered under.
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The CSS property a transition event refers to.
    pub fn property_name(&self) -> Option<&str> {
        self.property_name.as_deref()
    }
}

/// What a listener wants done with itself after handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerAction {
    /// Stay registered.
    Keep,
    /// Deregister; the listener will not be called again.
    Remove,
}

/// Handle returned by `add_event_listener`, used to remove the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);
