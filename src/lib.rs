#![warn(missing_docs)]
#![doc(html_root_url = "https://docs.rs/toprogress/")]

//! # toprogress
//!
//! A thin, CSS-transition driven progress bar for web pages, in the spirit of
//! the YouTube/Medium loading bar.
//!
//! ## Overview
//!
//! The widget creates a single `<div>`, pins it to the top or bottom edge of a
//! container, and animates it by writing `width`, `opacity` and `transition`
//! inline styles. It never runs a timer of its own: the host reports when a
//! transition has finished, and the widget's completion commands resolve from
//! that signal.
//!
//! The host page is modelled by the [`dom`] module, an in-memory document with
//! elements, inline styles, simple selectors and synchronous event dispatch.
//!
//! ## Components
//!
//! - **`progress`**: the widget ([`Progress`]), its options and completion
//!   messages
//! - **`dom`**: the host document the widget lives in
//! - **`error`**: the construction error
//!
//! ## Quick Start
//!
//! ```rust
//! use toprogress::prelude::*;
//!
//! # tokio_test();
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn tokio_test() {
//! let doc = Document::new();
//! let mut bar = progress_new(&doc, &[with_color("#2196F3")]).expect("body exists");
//!
//! // Something long-running started
//! let _crawl = bar.start();
//!
//! // ...and finished
//! let reset = bar.finish();
//! assert_eq!(bar.progress(), 100.0);
//!
//! // The browser reports the fade-out, then the shrink back to 0%
//! bar.element().dispatch_event(&Event::transition_end("opacity"));
//! bar.element().dispatch_event(&Event::transition_end("width"));
//!
//! let msg = reset.await.expect("reset completed");
//! assert!(msg.downcast_ref::<ResetMsg>().is_some());
//! assert_eq!(bar.progress(), 0.0);
//! # }
//! ```
//!
//! ## Integration with bubbletea-rs
//!
//! Completion is reported through `bubbletea_rs::Cmd`, so a bar can be driven
//! from a bubbletea-rs model and its messages routed like any other:
//!
//! ```rust
//! use toprogress::progress::{TransitionEndMsg, ResetMsg};
//! use bubbletea_rs::Msg;
//!
//! fn describe(msg: &Msg) -> &'static str {
//!     if msg.downcast_ref::<TransitionEndMsg>().is_some() {
//!         "moved"
//!     } else if msg.downcast_ref::<ResetMsg>().is_some() {
//!         "reset"
//!     } else {
//!         "other"
//!     }
//! }
//!
//! let msg: Msg = Box::new(ResetMsg { id: 1 });
//! assert_eq!(describe(&msg), "reset");
//! ```
//!
//! ## Logging
//!
//! The crate emits `tracing` events (`debug` on create/destroy, `trace` on
//! style writes and event dispatch) and never installs a subscriber.

pub mod dom;
pub mod error;
pub mod progress;

pub use error::{Error, Result};
pub use progress::Model as Progress;
pub use progress::{
    new as progress_new, with_color, with_duration, with_height, with_id, with_position,
    with_selector, Options as ProgressOptions, Position, ProgressOption, ResetMsg,
    TransitionEndMsg, TransitionProperty,
};

/// Prelude module for convenient imports.
///
/// ```rust
/// use toprogress::prelude::*;
///
/// let doc = Document::new();
/// let bar: Progress = progress_new(&doc, &[with_height("3px")])?;
/// assert_eq!(bar.options().height, "3px");
/// # Ok::<(), toprogress::Error>(())
/// ```
pub mod prelude {
    pub use crate::dom::{Document, Element, Event, ListenerAction, TRANSITION_END};
    pub use crate::error::{Error, Result};
    pub use crate::progress::Model as Progress;
    pub use crate::progress::{
        new as progress_new, with_color, with_duration, with_height, with_id, with_position,
        with_selector, Options as ProgressOptions, Position, ProgressOption, ResetMsg,
        TransitionEndMsg, TransitionProperty,
    };
}
