//! CSS transition plumbing.
//!
//! The bar animates purely through CSS: the widget writes a `transition` rule
//! and a new `width` or `opacity`, and the host fires a transition-end event
//! when the property settles. This module formats the rule, works out which
//! event name the host fires, and turns "the next transition-end for property
//! X" into a one-shot channel.

use crate::dom::{Document, Element, ListenerAction, ListenerId, TRANSITION_END};
use tokio::sync::oneshot;

/// Easing used by every transition except `start()`.
pub const DEFAULT_EASING: &str = "ease-out";

/// Longest opacity transition, in seconds.
pub const MAX_OPACITY_DURATION: f64 = 1.0;

/// Style properties the transition rule is written to.
pub const TRANSITION_PROPERTIES: [&str; 3] = ["transition", "-moz-transition", "-webkit-transition"];

// Probed in this order; the first property the host exposes decides the event.
const VENDOR_EVENTS: [(&str, &str); 2] = [
    ("OTransition", "oTransitionEnd"),
    ("WebkitTransition", "webkitTransitionEnd"),
];

/// A transitioned property the widget waits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionProperty {
    /// The bar's `width`, driven by progress changes.
    Width,
    /// The bar's `opacity`, driven by show/hide.
    Opacity,
}

impl TransitionProperty {
    /// CSS name, as reported in the event's `propertyName`.
    pub fn as_str(self) -> &'static str {
        match self {
            TransitionProperty::Width => "width",
            TransitionProperty::Opacity => "opacity",
        }
    }
}

/// Returns the transition-end event name the host fires.
///
/// Hosts exposing a vendor-prefixed `transition` style property fire the
/// matching prefixed event; everything else fires `transitionend`.
///
/// ```rust
/// use toprogress::dom::Document;
/// use toprogress::progress::transition_end_event;
///
/// assert_eq!(transition_end_event(&Document::new()), "transitionend");
///
/// let webkit = Document::with_vendor_properties(["WebkitTransition"]);
/// assert_eq!(transition_end_event(&webkit), "webkitTransitionEnd");
/// ```
pub fn transition_end_event(document: &Document) -> &'static str {
    VENDOR_EVENTS
        .iter()
        .find(|(property, _)| document.supports_vendor_property(property))
        .map_or(TRANSITION_END, |&(_, event)| event)
}

/// Opacity runs three times slower than width, capped at one second.
pub fn opacity_duration(duration: f64) -> f64 {
    (duration * 3.0).min(MAX_OPACITY_DURATION)
}

/// Formats `width <d>s <easing>, opacity <od>s`.
///
/// ```rust
/// use toprogress::progress::transition_rule;
///
/// assert_eq!(transition_rule(0.2, "ease-out"), "width 0.2s ease-out, opacity 0.6000000000000001s");
/// assert_eq!(transition_rule(5.0, "linear"), "width 5s linear, opacity 1s");
/// ```
pub fn transition_rule(duration: f64, easing: &str) -> String {
    format!(
        "width {}s {}, opacity {}s",
        duration,
        easing,
        opacity_duration(duration)
    )
}

/// Runs `f` once, the next time `property` finishes transitioning on
/// `element`, then deregisters.
pub(crate) fn on_transition_end<F>(
    element: &Element,
    event_type: &str,
    property: TransitionProperty,
    f: F,
) -> ListenerId
where
    F: FnOnce() + Send + 'static,
{
    let mut f = Some(f);
    element.add_event_listener(event_type, move |event| {
        if event.property_name() != Some(property.as_str()) {
            return ListenerAction::Keep;
        }
        if let Some(f) = f.take() {
            f();
        }
        ListenerAction::Remove
    })
}

/// One-shot wait for the next end of `property`'s transition.
///
/// The listener also deregisters on any transition event once the receiver
/// has been dropped, since nobody can observe it any more.
pub(crate) fn wait_for(
    element: &Element,
    event_type: &str,
    property: TransitionProperty,
) -> oneshot::Receiver<()> {
    let (tx, rx) = oneshot::channel();
    let mut tx = Some(tx);
    element.add_event_listener(event_type, move |event| {
        let Some(sender) = tx.as_ref() else {
            return ListenerAction::Remove;
        };
        if sender.is_closed() {
            return ListenerAction::Remove;
        }
        if event.property_name() != Some(property.as_str()) {
            return ListenerAction::Keep;
        }
        if let Some(sender) = tx.take() {
            // the receiver may be dropped between the check and the send
            let _ = sender.send(());
        }
        ListenerAction::Remove
    });
    rx
}
